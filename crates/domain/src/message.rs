use serde::Serialize;

use crate::errors::{ValidationError, ValidationResult};
use crate::value_objects::{ParticipantId, Timestamp};

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// 普通聊天消息
    Chat,
    /// 参与者加入
    Join,
    /// 参与者离开
    Leave,
}

/// 聊天消息。
///
/// 构造后不可变：字段只暴露只读访问器，需要修改时通过
/// [`Message::retarget`] 等方法生成新的消息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    content: String,
    sender: ParticipantId,
    receiver: Option<ParticipantId>,
    #[serde(rename = "type")]
    kind: MessageKind,
    timestamp: Timestamp,
}

impl Message {
    /// 创建消息，CHAT 消息的内容不能为空。
    pub fn new(
        content: impl Into<String>,
        sender: ParticipantId,
        receiver: Option<ParticipantId>,
        kind: MessageKind,
        timestamp: Timestamp,
    ) -> ValidationResult<Self> {
        let content = content.into();
        if kind == MessageKind::Chat && content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        Ok(Self {
            content,
            sender,
            receiver,
            kind,
            timestamp,
        })
    }

    /// 参与者加入的广播消息，内容为空
    pub fn join(sender: ParticipantId, timestamp: Timestamp) -> Self {
        Self::presence(sender, MessageKind::Join, timestamp)
    }

    /// 参与者离开的广播消息，内容为空
    pub fn leave(sender: ParticipantId, timestamp: Timestamp) -> Self {
        Self::presence(sender, MessageKind::Leave, timestamp)
    }

    fn presence(sender: ParticipantId, kind: MessageKind, timestamp: Timestamp) -> Self {
        Self {
            content: String::new(),
            sender,
            receiver: None,
            kind,
            timestamp,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> &ParticipantId {
        &self.sender
    }

    pub fn receiver(&self) -> Option<&ParticipantId> {
        self.receiver.as_ref()
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// 是否为广播消息（没有指定接收者，或者是 JOIN/LEAVE）
    pub fn is_broadcast(&self) -> bool {
        self.kind != MessageKind::Chat || self.receiver.is_none()
    }

    /// 生成一条接收者不同的新消息，其余字段保持不变
    pub fn retarget(&self, receiver: Option<ParticipantId>) -> Self {
        Self {
            receiver,
            ..self.clone()
        }
    }
}
