use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("session closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}

impl SendError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// 单个参与者的可发送会话（由外部传输层实现）。
///
/// `send` 要么完整发送整条负载，要么返回错误。
#[async_trait]
pub trait SessionHandle: Send + Sync {
    async fn send(&self, payload: &[u8]) -> Result<(), SendError>;

    /// 关闭会话，重复调用无副作用
    async fn close(&self);
}

/// 基于有界 mpsc 通道的进程内会话
///
/// 通道满时 `send` 会等待，形成背压；`close` 后接收端在读完剩余消息后结束。
pub struct ChannelSession {
    sender: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
}

impl ChannelSession {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let session = Self {
            sender: Mutex::new(Some(sender)),
        };
        (session, receiver)
    }

    pub fn is_closed(&self) -> bool {
        self.current_sender().is_none()
    }

    fn current_sender(&self) -> Option<mpsc::Sender<Vec<u8>>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|sender| !sender.is_closed())
            .cloned()
    }
}

#[async_trait]
impl SessionHandle for ChannelSession {
    async fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        let sender = self.current_sender().ok_or(SendError::Closed)?;
        sender
            .send(payload.to_vec())
            .await
            .map_err(|_| SendError::Closed)
    }

    async fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_session_delivers_payload() {
        let (session, mut receiver) = ChannelSession::new(4);

        session.send(b"hello").await.unwrap();

        assert_eq!(receiver.recv().await.unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (session, mut receiver) = ChannelSession::new(4);
        session.send(b"before").await.unwrap();

        session.close().await;
        session.close().await;

        assert!(session.is_closed());
        assert_eq!(session.send(b"after").await, Err(SendError::Closed));
        assert_eq!(receiver.recv().await.unwrap(), b"before".to_vec());
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_reports_closed() {
        let (session, receiver) = ChannelSession::new(1);
        drop(receiver);

        assert_eq!(session.send(b"lost").await, Err(SendError::Closed));
    }
}
