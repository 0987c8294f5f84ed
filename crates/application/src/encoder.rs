use domain::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encode failed: {0}")]
    Failed(String),
}

impl EncodeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 将消息编码为发送给会话的字节负载
pub trait MessageEncoder: Send + Sync {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl MessageEncoder for JsonEncoder {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(message).map_err(|err| EncodeError::failed(err.to_string()))
    }
}
