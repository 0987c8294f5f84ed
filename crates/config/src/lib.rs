//! 统一配置中心
//!
//! 提供中继服务的全局配置，包括：
//! - 消息投递（发送超时、会话缓冲）
//! - 日志过滤
//!
//! 加载顺序：默认值 -> 可选的 TOML 文件（`CHAT_RELAY_CONFIG`）-> 环境变量（`CHAT_RELAY_*`）。

use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// 配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "CHAT_RELAY_CONFIG";
/// 环境变量前缀，嵌套字段用 `__` 分隔，例如 `CHAT_RELAY_DELIVERY__SEND_TIMEOUT_MS`
pub const ENV_PREFIX: &str = "CHAT_RELAY_";

/// 全局应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 投递配置
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// 默认日志过滤规则，`RUST_LOG` 优先
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

/// 投递配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// 单个会话的发送超时（毫秒）
    pub send_timeout_ms: u64,
    /// 进程内会话通道的缓冲条数
    pub session_buffer: usize,
}

impl DeliveryConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 5_000,
            session_buffer: 64,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl RelayConfig {
    /// 从默认值、可选配置文件和环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_ENV).ok();
        Self::figment(file.as_deref()).extract::<Self>()?.validated()
    }

    fn figment(file: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(RelayConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidDeliveryConfig(
                "send timeout must be greater than 0".to_string(),
            ));
        }

        if self.delivery.session_buffer == 0 {
            return Err(ConfigError::InvalidDeliveryConfig(
                "session buffer must be greater than 0".to_string(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidLogFilter(
                "log filter cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid delivery configuration: {0}")]
    InvalidDeliveryConfig(String),
    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}
