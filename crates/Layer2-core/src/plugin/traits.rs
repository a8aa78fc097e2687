//! Plugin traits - 플러그인/이벤트 소스 인터페이스
//!
//! 소스가 어떻게 디스크립터로 해석되는지 (디렉토리, 내장 목록 등)는
//! 구현체에 맡기고, 로더는 이 트레이트만 사용한다.

use super::events::EventHandler;
use crate::command::{Command, CommandHandler};
use async_trait::async_trait;
use pinboard_foundation::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// PluginConfig - 플러그인 설정
// ============================================================================

/// 플러그인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// 설정된 이름 (레지스트리 키)
    pub name: String,

    /// 도움말 등에서 숨김
    #[serde(default)]
    pub hidden: bool,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

// ============================================================================
// PluginSource / EventSource
// ============================================================================

/// 플러그인 소스
///
/// 각 단계는 독립적으로 실패할 수 있으며, 실패는 해당 항목에만 영향을 준다.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// 발견된 플러그인 소스 ID 목록
    async fn plugin_ids(&self) -> Result<Vec<String>>;

    /// 플러그인 설정 로드
    async fn load_config(&self, plugin_id: &str) -> Result<PluginConfig>;

    /// 플러그인에 속한 커맨드 소스 목록
    async fn command_sources(&self, plugin_id: &str) -> Result<Vec<String>>;

    /// 커맨드 소스 하나를 디스크립터로 로드
    async fn load_command(&self, plugin_id: &str, source: &str) -> Result<Arc<Command>>;
}

/// 이벤트 핸들러 소스 (소스 이름 = 이벤트 이름)
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn event_sources(&self) -> Result<Vec<String>>;

    async fn load_handler(&self, source: &str) -> Result<Arc<dyn EventHandler>>;
}

// ============================================================================
// HandlerTable - 이름 → 네이티브 핸들러
// ============================================================================

/// 선언 파일의 `handler` 키를 실제 구현으로 해석하는 테이블
pub struct HandlerTable<T: ?Sized + Send + Sync> {
    entries: HashMap<String, Arc<T>>,
}

/// 커맨드 콜백 테이블
pub type CommandTable = HandlerTable<dyn CommandHandler>;

/// 이벤트 핸들러 테이블
pub type EventTable = HandlerTable<dyn EventHandler>;

impl<T: ?Sized + Send + Sync> HandlerTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// 핸들러 등록 (같은 이름은 덮어씀)
    pub fn with(mut self, name: impl Into<String>, handler: Arc<T>) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<T>) {
        self.entries.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 등록된 이름 (정렬됨)
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: ?Sized + Send + Sync> Default for HandlerTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handler_fn;

    #[test]
    fn test_plugin_config_from_toml() {
        let config: PluginConfig = toml::from_str(r#"name = "Core""#).unwrap();
        assert_eq!(config, PluginConfig::new("Core"));

        let config: PluginConfig = toml::from_str("name = \"Admin\"\nhidden = true").unwrap();
        assert!(config.hidden);
    }

    #[test]
    fn test_handler_table() {
        let table = CommandTable::new()
            .with("ping", handler_fn(|_| async { anyhow::Ok(()) }))
            .with("echo", handler_fn(|_| async { anyhow::Ok(()) }));

        assert_eq!(table.len(), 2);
        assert!(table.get("ping").is_some());
        assert!(table.get("missing").is_none());
        assert_eq!(table.names(), vec!["echo", "ping"]);
    }
}
