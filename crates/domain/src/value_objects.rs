use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

/// 参与者唯一标识（会话注册表的键）。
///
/// 只能通过 [`ParticipantId::parse`] 构造，不提供反序列化：
///
/// ```compile_fail
/// let id: domain::ParticipantId = serde_json::from_str("\"\"").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// 解析参与者标识，去除首尾空白，空字符串返回 `None`。
    pub fn parse(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return None;
        }
        Some(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = ParticipantId::parse("  alice ").unwrap();
        assert_eq!(id.as_str(), "alice");
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ParticipantId::parse("alice").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(ParticipantId::parse("").is_none());
        assert!(ParticipantId::parse("   ").is_none());
    }
}
