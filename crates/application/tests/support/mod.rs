//! 测试用会话替身

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use application::{
    FixedClock, JsonEncoder, RelayService, RelayServiceDependencies, RouterSettings, SendError,
    SessionHandle, SessionRegistry,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{ParticipantId, Timestamp};

pub fn id(value: &str) -> ParticipantId {
    ParticipantId::parse(value).unwrap()
}

pub fn fixed_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

/// 记录收到的负载和关闭次数；`broken` 时发送总是失败
#[derive(Default)]
pub struct RecordingSession {
    received: Mutex<Vec<Vec<u8>>>,
    closes: AtomicUsize,
    broken: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        let session = Self::default();
        session.broken.store(true, Ordering::SeqCst);
        Arc::new(session)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn received(&self) -> Vec<serde_json::Value> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|payload| serde_json::from_slice(payload).unwrap())
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionHandle for RecordingSession {
    async fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.broken.load(Ordering::SeqCst) {
            return Err(SendError::transport("connection reset"));
        }
        self.received.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn relay_with(registry: Arc<SessionRegistry>, send_timeout: Duration) -> RelayService {
    RelayService::new(RelayServiceDependencies {
        registry,
        clock: Arc::new(FixedClock(fixed_time())),
        encoder: Arc::new(JsonEncoder),
        settings: RouterSettings { send_timeout },
    })
}
