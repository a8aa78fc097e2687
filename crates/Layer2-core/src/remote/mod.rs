//! # Remote
//!
//! 원격 시스템에 선언된 커맨드를 가져오고 교체하는 전송 계층 인터페이스
//!
//! - [`MemoryTransport`]: 메모리 내 구현 (테스트, 오프라인 실행)
//! - [`RestTransport`]: Discord HTTP API 구현

mod memory;
mod rest;

pub use memory::MemoryTransport;
pub use rest::RestTransport;

use crate::command::{CommandData, CommandType};
use async_trait::async_trait;
use pinboard_foundation::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// CommandScope
// ============================================================================

/// 원격 커맨드 스코프
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandScope {
    /// 글로벌 스코프
    Global,
    /// 개발 서버(길드) 스코프
    Guild(String),
}

impl std::fmt::Display for CommandScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Guild(id) => write!(f, "guild {}", id),
        }
    }
}

// ============================================================================
// RemoteCommand - 원격 스냅샷 레코드
// ============================================================================

/// 원격에 선언된 커맨드 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_permission: Option<bool>,
}

impl RemoteCommand {
    /// 로컬 선언과 구조적으로 같은지 비교
    ///
    /// 원격에서 생략된 `type`은 ChatInput, `default_permission`은 true로 본다.
    pub fn matches(&self, local: &CommandData) -> bool {
        self.name == local.name
            && self.description == local.description
            && self.kind.unwrap_or(CommandType::ChatInput.code()) == local.kind.code()
            && self.default_permission.unwrap_or(true) == local.default_permission
    }
}

impl From<&CommandData> for RemoteCommand {
    fn from(data: &CommandData) -> Self {
        Self {
            id: None,
            name: data.name.clone(),
            description: data.description.clone(),
            kind: Some(data.kind.code()),
            default_permission: Some(data.default_permission),
        }
    }
}

// ============================================================================
// CommandTransport
// ============================================================================

/// 원격 커맨드 전송 계층
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// 세션 수립 (이후 `is_ready`가 true)
    async fn login(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// 스코프에 선언된 커맨드 조회
    async fn fetch_commands(&self, scope: &CommandScope) -> Result<Vec<RemoteCommand>>;

    /// 스코프의 커맨드 전체 교체
    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandData],
    ) -> Result<Vec<RemoteCommand>>;

    /// 봇이 속한 길드 ID 목록
    async fn guild_ids(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
