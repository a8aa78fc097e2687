//! Plugin Registry - 플러그인 집합과 커맨드 레지스트리
//!
//! [`PluginSet`]은 로드가 끝난 뒤 한 번에 만들어지는 불변 값이고,
//! [`CommandRegistry`]는 현재 집합을 가리키는 포인터를 원자적으로 교체한다.
//! 읽는 쪽은 항상 완성된 집합 하나만 본다.

use super::loader::{load_plugins, PluginLoadReport};
use super::traits::{PluginConfig, PluginSource};
use crate::command::Command;
use parking_lot::RwLock;
use pinboard_foundation::{channels, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// Plugin
// ============================================================================

/// 로드된 플러그인
#[derive(Debug)]
pub struct Plugin {
    /// 소스 ID
    pub id: String,
    pub config: PluginConfig,
    /// 선언된 이름 → 커맨드
    pub commands: BTreeMap<String, Arc<Command>>,
}

impl Plugin {
    pub fn new(id: impl Into<String>, config: PluginConfig) -> Self {
        Self {
            id: id.into(),
            config,
            commands: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, command: Arc<Command>) -> Self {
        self.commands.insert(command.name().to_string(), command);
        self
    }
}

// ============================================================================
// PluginSet - 불변 플러그인 집합
// ============================================================================

/// 삽입 순서를 유지하는 플러그인 집합
#[derive(Debug, Default)]
pub struct PluginSet {
    plugins: Vec<Arc<Plugin>>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 추가
    ///
    /// 같은 설정 이름이 이미 있으면 그 자리에서 교체한다 (병합하지 않음).
    pub fn insert(&mut self, plugin: Plugin) {
        let plugin = Arc::new(plugin);
        match self
            .plugins
            .iter_mut()
            .find(|p| p.config.name == plugin.config.name)
        {
            Some(slot) => {
                warn!(
                    target: channels::PLUGINS,
                    "Plugin {} from {} replaces the one loaded from {}",
                    plugin.config.name,
                    plugin.id,
                    slot.id
                );
                *slot = plugin;
            }
            None => self.plugins.push(plugin),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Plugin>> {
        self.plugins.iter().find(|p| p.config.name == name)
    }

    pub fn plugins(&self) -> &[Arc<Plugin>] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// 이름으로 커맨드 조회 (플러그인 순서상 첫 번째가 우선)
    pub fn find_command(&self, name: &str) -> Option<Arc<Command>> {
        self.plugins
            .iter()
            .find_map(|p| p.commands.get(name).map(Arc::clone))
    }

    /// 평탄화된 커맨드 목록
    ///
    /// 조회와 같은 규칙으로 이름이 겹치면 앞선 플러그인의 것만 남긴다.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let mut flattened = Vec::new();

        for plugin in &self.plugins {
            for (name, command) in &plugin.commands {
                match seen.get(name.as_str()) {
                    Some(owner) => warn!(
                        target: channels::CMDS,
                        "Command {} in plugin {} is shadowed by plugin {}",
                        name,
                        plugin.config.name,
                        owner
                    ),
                    None => {
                        seen.insert(name, &plugin.config.name);
                        flattened.push(Arc::clone(command));
                    }
                }
            }
        }

        flattened
    }
}

// ============================================================================
// CommandRegistry - 원자적 교체 레지스트리
// ============================================================================

/// 커맨드 레지스트리
pub struct CommandRegistry {
    current: RwLock<Arc<PluginSet>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(PluginSet::new())),
        }
    }

    /// 현재 집합의 스냅샷
    pub fn snapshot(&self) -> Arc<PluginSet> {
        Arc::clone(&self.current.read())
    }

    /// 집합 전체 교체
    pub fn replace(&self, set: PluginSet) {
        *self.current.write() = Arc::new(set);
    }

    /// 빈 집합으로 초기화
    pub fn reset(&self) {
        self.replace(PluginSet::new());
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    pub fn get_command(&self, name: &str) -> Option<Arc<Command>> {
        self.snapshot().find_command(name)
    }

    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.snapshot().commands()
    }

    /// 소스에서 플러그인을 로드해 레지스트리를 교체
    ///
    /// 이미 내용이 있으면 경고 후 통째로 교체한다.
    pub async fn load_from(&self, source: &dyn PluginSource) -> Result<PluginLoadReport> {
        if !self.is_empty() {
            warn!(
                target: channels::PLUGINS,
                "At least one plugin has already been registered! Re-loading is not supported."
            );
        }

        let (set, report) = load_plugins(source).await?;
        self.replace(set);

        info!(
            target: channels::PLUGINS,
            "Registry now holds {} command(s).",
            self.commands().len()
        );
        Ok(report)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
