use std::sync::Arc;

use crate::message::Message;
use crate::value_objects::ParticipantId;

/// 单个目标的投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 已完整发送
    Delivered,
    /// 目标不在注册表中
    Unreachable,
    /// 发送失败，附带原因
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// 一次路由的投递结果汇总。
///
/// 按尝试顺序记录每个目标的结果，并保留原始消息便于追踪。
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    message: Arc<Message>,
    outcomes: Vec<(ParticipantId, DeliveryOutcome)>,
}

impl DeliveryResult {
    pub fn new(message: Arc<Message>, outcomes: Vec<(ParticipantId, DeliveryOutcome)>) -> Self {
        Self { message, outcomes }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// 查询某个目标的结果；没有尝试过的目标返回 `None`
    pub fn outcome(&self, id: &ParticipantId) -> Option<&DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(destination, _)| destination == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &DeliveryOutcome)> {
        self.outcomes.iter().map(|(id, outcome)| (id, outcome))
    }

    pub fn destinations(&self) -> impl Iterator<Item = &ParticipantId> {
        self.outcomes.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Delivered))
    }

    pub fn unreachable_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Unreachable))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Failed(_)))
    }

    /// 所有目标都已送达（没有目标时也为真）
    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_delivered())
    }

    fn count(&self, predicate: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use chrono::Utc;

    fn id(value: &str) -> ParticipantId {
        ParticipantId::parse(value).unwrap()
    }

    #[test]
    fn test_delivery_result_counts() {
        let message =
            Arc::new(Message::new("hi", id("alice"), None, MessageKind::Chat, Utc::now()).unwrap());
        let result = DeliveryResult::new(
            message,
            vec![
                (id("bob"), DeliveryOutcome::Delivered),
                (id("carol"), DeliveryOutcome::Failed("closed".into())),
                (id("dave"), DeliveryOutcome::Unreachable),
            ],
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result.delivered_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.unreachable_count(), 1);
        assert!(!result.all_delivered());
        assert_eq!(result.outcome(&id("bob")), Some(&DeliveryOutcome::Delivered));
        assert_eq!(result.outcome(&id("alice")), None);
        assert_eq!(result.message().content(), "hi");

        let order: Vec<&str> = result.destinations().map(ParticipantId::as_str).collect();
        assert_eq!(order, ["bob", "carol", "dave"]);
    }
}
