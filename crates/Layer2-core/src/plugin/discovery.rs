//! Plugin Discovery - 디렉토리 기반 소스
//!
//! ```text
//! plugins/
//! ├── core/
//! │   ├── plugin.toml      name, hidden
//! │   ├── ping.toml        name, description, type, permission, handler
//! │   └── echo.toml
//! └── admin/
//!     └── ...
//! events/
//! ├── guild_create.toml    handler
//! └── ready.toml
//! ```
//!
//! `handler` 키는 [`HandlerTable`]에 등록된 네이티브 구현의 이름이다.

use super::events::EventHandler;
use super::traits::{
    CommandTable, EventSource, EventTable, HandlerTable, PluginConfig, PluginSource,
};
use crate::command::{Command, CommandConfig, CommandType, PermissionType};
use async_trait::async_trait;
use pinboard_foundation::{channels, Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// 플러그인 설정 파일 이름
pub const PLUGIN_CONFIG_FILE: &str = "plugin.toml";

const SOURCE_EXTENSION: &str = "toml";

// ============================================================================
// 선언 파일 구조
// ============================================================================

/// 커맨드 선언 파일
#[derive(Debug, Clone, Deserialize)]
struct CommandManifest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    kind: Option<CommandType>,
    #[serde(default)]
    permission: Option<PermissionType>,
    handler: String,
}

impl CommandManifest {
    fn config(&self) -> CommandConfig {
        CommandConfig {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            permission_type: self.permission,
        }
    }
}

/// 이벤트 선언 파일
#[derive(Debug, Clone, Deserialize)]
struct EventManifest {
    handler: String,
}

// ============================================================================
// DirectorySource
// ============================================================================

/// 디렉토리에서 플러그인과 이벤트를 찾는 소스
pub struct DirectorySource {
    plugins_dir: PathBuf,
    events_dir: PathBuf,
    commands: CommandTable,
    events: EventTable,
}

impl DirectorySource {
    pub fn new(plugins_dir: impl Into<PathBuf>, events_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            events_dir: events_dir.into(),
            commands: HandlerTable::new(),
            events: HandlerTable::new(),
        }
    }

    /// 커맨드 콜백 테이블 지정
    pub fn with_commands(mut self, table: CommandTable) -> Self {
        self.commands = table;
        self
    }

    /// 이벤트 핸들러 테이블 지정
    pub fn with_events(mut self, table: EventTable) -> Self {
        self.events = table;
        self
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    pub fn events_dir(&self) -> &Path {
        &self.events_dir
    }

    fn plugin_dir(&self, plugin_id: &str) -> PathBuf {
        self.plugins_dir.join(plugin_id)
    }
}

/// 디렉토리 항목 나열 (정렬됨). 디렉토리가 없으면 빈 목록.
async fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<String>> {
    if fs::metadata(dir).await.is_err() {
        warn!(target: channels::PLUGINS, "Directory {} does not exist, skipping", dir.display());
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_dir = entry.file_type().await?.is_dir();

        if want_dirs {
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            continue;
        }

        if is_dir || path.extension().map_or(true, |e| e != SOURCE_EXTENSION) {
            debug!(target: channels::PLUGINS, "Skipping {}", path.display());
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

async fn read_toml<T: serde::de::DeserializeOwned>(path: &Path, source_id: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| Error::load(source_id, format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::load(source_id, format!("invalid {}: {}", path.display(), e)))
}

fn resolve<T: ?Sized + Send + Sync>(
    table: &HandlerTable<T>,
    handler: &str,
    source_id: &str,
) -> Result<Arc<T>> {
    table
        .get(handler)
        .ok_or_else(|| Error::load(source_id, format!("unknown handler '{}'", handler)))
}

#[async_trait]
impl PluginSource for DirectorySource {
    async fn plugin_ids(&self) -> Result<Vec<String>> {
        list_entries(&self.plugins_dir, true).await
    }

    async fn load_config(&self, plugin_id: &str) -> Result<PluginConfig> {
        let path = self.plugin_dir(plugin_id).join(PLUGIN_CONFIG_FILE);
        read_toml(&path, plugin_id).await
    }

    async fn command_sources(&self, plugin_id: &str) -> Result<Vec<String>> {
        let mut sources = list_entries(&self.plugin_dir(plugin_id), false).await?;
        sources.retain(|s| s != PLUGIN_CONFIG_FILE);
        Ok(sources)
    }

    async fn load_command(&self, plugin_id: &str, source: &str) -> Result<Arc<Command>> {
        let path = self.plugin_dir(plugin_id).join(source);
        let manifest: CommandManifest = read_toml(&path, source).await?;
        let handler = resolve(&self.commands, &manifest.handler, source)?;

        let command = Command::new(manifest.config(), handler)
            .map_err(|_| Error::load(source, "command name must not be empty"))?;
        Ok(Arc::new(command))
    }
}

#[async_trait]
impl EventSource for DirectorySource {
    async fn event_sources(&self) -> Result<Vec<String>> {
        let files = list_entries(&self.events_dir, false).await?;
        Ok(files
            .into_iter()
            .filter_map(|f| {
                Path::new(&f)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .collect())
    }

    async fn load_handler(&self, source: &str) -> Result<Arc<dyn EventHandler>> {
        let path = self
            .events_dir
            .join(format!("{}.{}", source, SOURCE_EXTENSION));
        let manifest: EventManifest = read_toml(&path, source).await?;
        resolve(&self.events, &manifest.handler, source)
    }
}
