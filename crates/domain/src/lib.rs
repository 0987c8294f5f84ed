//! 聊天中继核心领域模型
//!
//! 包含消息、参与者标识、校验错误以及投递结果等值类型。

pub mod errors;
pub mod message;
pub mod message_delivery;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::*;
pub use message_delivery::*;
pub use value_objects::*;
