//! Command types - 커맨드 설정과 원격 선언 형태

use serde::{Deserialize, Serialize};

// ============================================================================
// PermissionType - 커맨드 노출 범위
// ============================================================================

/// 커맨드 권한 범위
///
/// `Public`/`Restricted`는 글로벌 스코프에, `DevOnly`는 개발 서버
/// 스코프에만 선언된다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    #[default]
    Public,
    Restricted,
    DevOnly,
}

impl PermissionType {
    /// 기본 노출 여부 (`Public`만 true)
    pub fn default_permission(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl std::fmt::Display for PermissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Restricted => write!(f, "restricted"),
            Self::DevOnly => write!(f, "dev_only"),
        }
    }
}

// ============================================================================
// CommandType - 호출 표면
// ============================================================================

/// 커맨드 호출 형태 (원격 API의 정수 코드와 대응)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// 슬래시 커맨드
    #[default]
    ChatInput,
    /// 유저 컨텍스트 메뉴
    User,
    /// 메시지 컨텍스트 메뉴
    Message,
}

impl CommandType {
    pub fn code(&self) -> u8 {
        match self {
            Self::ChatInput => 1,
            Self::User => 2,
            Self::Message => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::ChatInput),
            2 => Some(Self::User),
            3 => Some(Self::Message),
            _ => None,
        }
    }
}

// ============================================================================
// CommandConfig - 로컬 선언
// ============================================================================

/// 커맨드 설정 (로드 시 한 번 생성, 이후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CommandType>,

    #[serde(rename = "permission", default, skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<PermissionType>,
}

impl CommandConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: None,
            permission_type: None,
        }
    }

    pub fn with_kind(mut self, kind: CommandType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_permission(mut self, permission: PermissionType) -> Self {
        self.permission_type = Some(permission);
        self
    }

    pub fn kind(&self) -> CommandType {
        self.kind.unwrap_or_default()
    }

    pub fn permission(&self) -> PermissionType {
        self.permission_type.unwrap_or_default()
    }
}

// ============================================================================
// CommandData - 원격에 선언되는 형태
// ============================================================================

/// 원격 스코프에 전송되는 커맨드 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandData {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", serialize_with = "serialize_type_code")]
    pub kind: CommandType,
    pub default_permission: bool,
}

impl From<&CommandConfig> for CommandData {
    fn from(config: &CommandConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            kind: config.kind(),
            default_permission: config.permission().default_permission(),
        }
    }
}

fn serialize_type_code<S>(kind: &CommandType, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(kind.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permission() {
        assert!(PermissionType::Public.default_permission());
        assert!(!PermissionType::Restricted.default_permission());
        assert!(!PermissionType::DevOnly.default_permission());
    }

    #[test]
    fn test_command_data_from_config() {
        let config = CommandConfig::new("secret", "dev stuff").with_permission(PermissionType::DevOnly);
        let data = CommandData::from(&config);

        assert_eq!(data.kind, CommandType::ChatInput);
        assert!(!data.default_permission);
    }

    #[test]
    fn test_command_data_wire_shape() {
        let data = CommandData::from(&CommandConfig::new("ping", "Pong!").with_kind(CommandType::User));
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "ping",
                "description": "Pong!",
                "type": 2,
                "default_permission": true
            })
        );
    }

    #[test]
    fn test_config_from_toml() {
        let config: CommandConfig = toml::from_str(
            r#"
            name = "pin"
            description = "Pin a message"
            type = "message"
            permission = "restricted"
            "#,
        )
        .unwrap();

        assert_eq!(config.kind(), CommandType::Message);
        assert_eq!(config.permission(), PermissionType::Restricted);
    }
}
