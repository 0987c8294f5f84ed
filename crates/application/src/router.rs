//! 消息路由
//!
//! 根据消息类型和注册表快照选出目标会话，并发扇出发送，
//! 每个目标的结果独立记录在 [`DeliveryResult`] 中。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use domain::{DeliveryOutcome, DeliveryResult, Message, MessageKind, ParticipantId};
use futures_util::future::{self, join_all, Either};
use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::encoder::MessageEncoder;
use crate::registry::{SessionRegistry, SharedSession};

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// 路由器设置
#[derive(Debug, Clone, Copy)]
pub struct RouterSettings {
    /// 单个目标的发送超时，超时记为失败
    pub send_timeout: Duration,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl From<&config::DeliveryConfig> for RouterSettings {
    fn from(config: &config::DeliveryConfig) -> Self {
        Self {
            send_timeout: config.send_timeout(),
        }
    }
}

/// 路由选出的目标
enum Destination {
    /// 指定的接收者不在注册表中
    Missing(ParticipantId),
    Session(ParticipantId, SharedSession),
}

pub struct Router {
    registry: Arc<SessionRegistry>,
    encoder: Arc<dyn MessageEncoder>,
    settings: RouterSettings,
}

impl Router {
    pub fn new(
        registry: Arc<SessionRegistry>,
        encoder: Arc<dyn MessageEncoder>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            registry,
            encoder,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// 路由一条消息并等待所有目标的发送结果。
    ///
    /// 投递阶段的失败只记录在结果中，不会作为错误返回。
    /// 如果调用方取消了这个 future，已经发出的发送任务会继续独立完成。
    pub async fn route(&self, message: Message) -> DeliveryResult {
        let message = Arc::new(message);
        let destinations = select_destinations(&message, &self.registry);

        tracing::debug!(
            sender = %message.sender(),
            kind = ?message.kind(),
            destinations = destinations.len(),
            "路由消息"
        );

        let payload: Arc<[u8]> = match self.encoder.encode(&message) {
            Ok(bytes) => bytes.into(),
            Err(err) => {
                tracing::error!(error = %err, sender = %message.sender(), "消息编码失败");
                let reason = format!("encode: {err}");
                let outcomes = destinations
                    .into_iter()
                    .map(|destination| match destination {
                        Destination::Missing(id) => (id, DeliveryOutcome::Unreachable),
                        Destination::Session(id, _) => {
                            (id, DeliveryOutcome::Failed(reason.clone()))
                        }
                    })
                    .collect();
                return DeliveryResult::new(message, outcomes);
            }
        };

        let pending = destinations
            .into_iter()
            .map(|destination| match destination {
                Destination::Missing(id) => {
                    tracing::debug!(participant_id = %id, "接收者不可达");
                    Either::Left(future::ready((id, DeliveryOutcome::Unreachable)))
                }
                Destination::Session(id, handle) => {
                    let task = tokio::spawn(deliver(
                        self.registry.clone(),
                        id.clone(),
                        handle,
                        payload.clone(),
                        self.settings.send_timeout,
                    ));
                    Either::Right(await_outcome(id, task))
                }
            });

        let outcomes = join_all(pending).await;
        DeliveryResult::new(message, outcomes)
    }
}

async fn await_outcome(
    id: ParticipantId,
    task: JoinHandle<DeliveryOutcome>,
) -> (ParticipantId, DeliveryOutcome) {
    match task.await {
        Ok(outcome) => (id, outcome),
        // 只有运行时关闭时才会走到这里
        Err(err) => {
            tracing::warn!(participant_id = %id, error = %err, "发送任务被取消");
            (id, DeliveryOutcome::Failed(format!("send task aborted: {err}")))
        }
    }
}

/// 目标选择策略：
/// - 指定接收者的 CHAT 只发给该接收者
/// - 广播 CHAT 发给除发送者以外的所有会话
/// - JOIN/LEAVE 发给所有会话
///
/// 顺序与注册表快照一致。
fn select_destinations(message: &Message, registry: &SessionRegistry) -> Vec<Destination> {
    match (message.kind(), message.receiver()) {
        (MessageKind::Chat, Some(receiver)) => {
            let destination = match registry.lookup(receiver) {
                Some(handle) => Destination::Session(receiver.clone(), handle),
                None => Destination::Missing(receiver.clone()),
            };
            vec![destination]
        }
        (MessageKind::Chat, None) => registry
            .all()
            .into_iter()
            .filter(|(id, _)| id != message.sender())
            .map(|(id, handle)| Destination::Session(id, handle))
            .collect(),
        (MessageKind::Join | MessageKind::Leave, _) => registry
            .all()
            .into_iter()
            .map(|(id, handle)| Destination::Session(id, handle))
            .collect(),
    }
}

/// 向单个会话发送负载；失败、超时或 panic 时把该会话从注册表移除并关闭
async fn deliver(
    registry: Arc<SessionRegistry>,
    id: ParticipantId,
    handle: SharedSession,
    payload: Arc<[u8]>,
    send_timeout: Duration,
) -> DeliveryOutcome {
    let send = AssertUnwindSafe(handle.send(&payload)).catch_unwind();
    let reason = match tokio::time::timeout(send_timeout, send).await {
        Ok(Ok(Ok(()))) => return DeliveryOutcome::Delivered,
        Ok(Ok(Err(err))) => err.to_string(),
        Ok(Err(panic)) => format!("send panicked: {}", panic_message(&*panic)),
        Err(_) => format!("send timed out after {}ms", send_timeout.as_millis()),
    };

    tracing::warn!(participant_id = %id, reason = %reason, "发送失败");
    if registry.unregister_if_current(&id, &handle) {
        tracing::warn!(participant_id = %id, "移除失效会话");
        handle.close().await;
    }

    DeliveryOutcome::Failed(reason)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
