use std::sync::Arc;

use domain::{Message, MessageKind, ParticipantId, ValidationError, ValidationResult};

use crate::clock::Clock;

/// 消息工厂：校验原始输入字段并打上时间戳。
///
/// 时间戳总是从注入的时钟读取，调用者无法指定。
#[derive(Clone)]
pub struct MessageFactory {
    clock: Arc<dyn Clock>,
}

impl MessageFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// 创建消息。
    ///
    /// 发送者为空时无论其他字段如何都返回 `EmptySender`；
    /// 空的接收者视为广播。
    pub fn create(
        &self,
        content: impl Into<String>,
        sender: &str,
        receiver: Option<&str>,
        kind: MessageKind,
    ) -> ValidationResult<Message> {
        let sender = ParticipantId::parse(sender).ok_or(ValidationError::EmptySender)?;
        let receiver = receiver.and_then(ParticipantId::parse);

        Message::new(content, sender, receiver, kind, self.clock.now())
    }

    /// 参与者加入的广播消息
    pub fn join(&self, sender: &ParticipantId) -> Message {
        Message::join(sender.clone(), self.clock.now())
    }

    /// 参与者离开的广播消息
    pub fn leave(&self, sender: &ParticipantId) -> Message {
        Message::leave(sender.clone(), self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, MockClock};
    use chrono::{TimeZone, Utc};

    fn factory_at(seconds: i64) -> MessageFactory {
        let at = Utc.timestamp_opt(seconds, 0).unwrap();
        MessageFactory::new(Arc::new(FixedClock(at)))
    }

    #[test]
    fn test_create_reads_clock_at_call_time() {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 5).unwrap();

        let mut clock = MockClock::new();
        let mut seq = mockall::Sequence::new();
        clock
            .expect_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(first);
        clock
            .expect_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(second);

        let factory = MessageFactory::new(Arc::new(clock));
        let a = factory
            .create("hello", "alice", None, MessageKind::Chat)
            .unwrap();
        let b = factory
            .create("again", "alice", None, MessageKind::Chat)
            .unwrap();

        assert_eq!(a.timestamp(), first);
        assert_eq!(b.timestamp(), second);
    }

    #[test]
    fn test_empty_sender_always_fails() {
        let factory = factory_at(0);
        for kind in [MessageKind::Chat, MessageKind::Join, MessageKind::Leave] {
            for content in ["", "hello"] {
                for receiver in [None, Some(""), Some("bob")] {
                    let result = factory.create(content, "", receiver, kind);
                    assert_eq!(result, Err(ValidationError::EmptySender));
                }
            }
        }
        assert_eq!(
            factory.create("hello", "   ", None, MessageKind::Chat),
            Err(ValidationError::EmptySender)
        );
    }

    #[test]
    fn test_empty_chat_content_fails() {
        let factory = factory_at(0);
        let result = factory.create("", "alice", Some("bob"), MessageKind::Chat);
        assert_eq!(result, Err(ValidationError::EmptyContent));
    }

    #[test]
    fn test_join_and_leave_accept_empty_content() {
        let factory = factory_at(0);
        let join = factory.create("", "alice", None, MessageKind::Join).unwrap();
        let leave = factory.create("", "alice", None, MessageKind::Leave).unwrap();
        assert_eq!(join.kind(), MessageKind::Join);
        assert_eq!(leave.kind(), MessageKind::Leave);
    }

    #[test]
    fn test_empty_receiver_means_broadcast() {
        let factory = factory_at(0);
        let message = factory
            .create("hi", "alice", Some(" "), MessageKind::Chat)
            .unwrap();
        assert!(message.receiver().is_none());
        assert!(message.is_broadcast());
    }

    #[test]
    fn test_presence_helpers() {
        let factory = factory_at(42);
        let alice = ParticipantId::parse("alice").unwrap();

        let join = factory.join(&alice);
        assert_eq!(join.kind(), MessageKind::Join);
        assert_eq!(join.sender(), &alice);
        assert!(join.receiver().is_none());
        assert_eq!(join.timestamp().timestamp(), 42);

        assert_eq!(factory.leave(&alice).kind(), MessageKind::Leave);
    }
}
