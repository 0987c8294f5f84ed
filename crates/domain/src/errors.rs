//! 领域模型错误定义

use thiserror::Error;

/// 消息构造时的校验错误。
///
/// 在创建阶段同步返回给提交者，不会自动重试。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// 发送者为空
    #[error("sender must not be empty")]
    EmptySender,

    /// CHAT 消息内容为空
    #[error("chat content must not be empty")]
    EmptyContent,
}

/// 领域模型结果类型
pub type ValidationResult<T> = Result<T, ValidationError>;
