//! 应用层实现。
//!
//! 围绕领域模型提供消息创建、会话注册和消息路由，
//! 以及对外部适配器（会话连接、时钟、消息编码）的抽象。

pub mod clock;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod registry;
pub mod router;
pub mod services;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use encoder::{EncodeError, JsonEncoder, MessageEncoder};
pub use error::ApplicationError;
pub use factory::MessageFactory;
pub use registry::{SessionRegistry, SharedSession};
pub use router::{Router, RouterSettings};
pub use services::{RelayService, RelayServiceDependencies, SendMessageRequest};
pub use session::{ChannelSession, SendError, SessionHandle};
