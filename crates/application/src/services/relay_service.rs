use std::sync::Arc;

use domain::{DeliveryResult, MessageKind, ParticipantId};

use crate::{
    clock::Clock,
    encoder::MessageEncoder,
    error::ApplicationError,
    factory::MessageFactory,
    registry::{SessionRegistry, SharedSession},
    router::{Router, RouterSettings},
};

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub content: String,
    pub sender: String,
    pub receiver: Option<String>, // 为空表示广播
    pub kind: MessageKind,
}

impl SendMessageRequest {
    pub fn chat(
        sender: impl Into<String>,
        receiver: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            sender: sender.into(),
            receiver,
            kind: MessageKind::Chat,
        }
    }
}

pub struct RelayServiceDependencies {
    pub registry: Arc<SessionRegistry>,
    pub clock: Arc<dyn Clock>,
    pub encoder: Arc<dyn MessageEncoder>,
    pub settings: RouterSettings,
}

/// 聊天中继服务：串起消息工厂、会话注册表和路由器。
///
/// 对应聊天服务中的发送消息、加入、离开三个入口。
pub struct RelayService {
    factory: MessageFactory,
    router: Router,
}

impl RelayService {
    pub fn new(deps: RelayServiceDependencies) -> Self {
        Self {
            factory: MessageFactory::new(deps.clock),
            router: Router::new(deps.registry, deps.encoder, deps.settings),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.router.registry()
    }

    /// 参与者上线：注册会话并广播 JOIN（包括新参与者自己）
    pub async fn connect(
        &self,
        participant: &str,
        handle: SharedSession,
    ) -> Result<DeliveryResult, ApplicationError> {
        let id = parse_participant(participant)?;
        self.registry().register(id.clone(), handle).await;

        tracing::info!(participant_id = %id, "参与者加入");
        Ok(self.router.route(self.factory.join(&id)).await)
    }

    /// 参与者下线：注销并关闭会话，然后向剩余参与者广播 LEAVE。
    ///
    /// 参与者本来就不在线时返回 `None`。
    pub async fn disconnect(
        &self,
        participant: &str,
    ) -> Result<Option<DeliveryResult>, ApplicationError> {
        let id = parse_participant(participant)?;
        let Some(handle) = self.registry().unregister(&id) else {
            tracing::debug!(participant_id = %id, "参与者不在线，忽略离开请求");
            return Ok(None);
        };
        handle.close().await;

        tracing::info!(participant_id = %id, "参与者离开");
        Ok(Some(self.router.route(self.factory.leave(&id)).await))
    }

    /// 提交消息：校验、打时间戳后路由。只有校验失败会返回错误。
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<DeliveryResult, ApplicationError> {
        let message = self.factory.create(
            request.content,
            &request.sender,
            request.receiver.as_deref(),
            request.kind,
        )?;

        let result = self.router.route(message).await;
        if result.failed_count() > 0 || result.unreachable_count() > 0 {
            tracing::warn!(
                sender = %result.message().sender(),
                delivered = result.delivered_count(),
                failed = result.failed_count(),
                unreachable = result.unreachable_count(),
                "部分目标投递失败"
            );
        }
        Ok(result)
    }

    pub async fn shutdown(&self) {
        self.registry().shutdown().await;
    }
}

fn parse_participant(value: &str) -> Result<ParticipantId, ApplicationError> {
    ParticipantId::parse(value).ok_or_else(|| ApplicationError::invalid_participant(value))
}
