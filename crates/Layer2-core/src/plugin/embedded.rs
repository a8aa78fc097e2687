//! Embedded source - 코드에 직접 등록하는 플러그인/이벤트 목록

use super::events::EventHandler;
use super::traits::{EventSource, PluginConfig, PluginSource};
use crate::command::Command;
use async_trait::async_trait;
use pinboard_foundation::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

type Entry<T> = std::result::Result<T, String>;

struct EmbeddedPlugin {
    config: Entry<PluginConfig>,
    commands: BTreeMap<String, Entry<Arc<Command>>>,
}

/// 내장 목록 소스
///
/// 각 항목은 식별자 순으로 나열된다. `with_broken_*`로 등록된 항목은
/// 로드 시 주어진 메시지로 실패한다.
#[derive(Default)]
pub struct EmbeddedSource {
    plugins: BTreeMap<String, EmbeddedPlugin>,
    events: BTreeMap<String, Entry<Arc<dyn EventHandler>>>,
}

impl EmbeddedSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn plugin_entry(&mut self, id: &str) -> &mut EmbeddedPlugin {
        self.plugins
            .entry(id.to_string())
            .or_insert_with(|| EmbeddedPlugin {
                config: Ok(PluginConfig::new(id)),
                commands: BTreeMap::new(),
            })
    }

    pub fn with_plugin(mut self, id: &str, config: PluginConfig) -> Self {
        self.plugin_entry(id).config = Ok(config);
        self
    }

    pub fn with_broken_plugin(mut self, id: &str, message: impl Into<String>) -> Self {
        self.plugin_entry(id).config = Err(message.into());
        self
    }

    pub fn with_command(mut self, plugin_id: &str, source: &str, command: Arc<Command>) -> Self {
        self.plugin_entry(plugin_id)
            .commands
            .insert(source.to_string(), Ok(command));
        self
    }

    pub fn with_broken_command(
        mut self,
        plugin_id: &str,
        source: &str,
        message: impl Into<String>,
    ) -> Self {
        self.plugin_entry(plugin_id)
            .commands
            .insert(source.to_string(), Err(message.into()));
        self
    }

    pub fn with_event(mut self, event: &str, handler: Arc<dyn EventHandler>) -> Self {
        self.events.insert(event.to_string(), Ok(handler));
        self
    }

    pub fn with_broken_event(mut self, event: &str, message: impl Into<String>) -> Self {
        self.events.insert(event.to_string(), Err(message.into()));
        self
    }

    fn plugin(&self, id: &str) -> Result<&EmbeddedPlugin> {
        self.plugins
            .get(id)
            .ok_or_else(|| Error::load(id, "no such plugin"))
    }
}

#[async_trait]
impl PluginSource for EmbeddedSource {
    async fn plugin_ids(&self) -> Result<Vec<String>> {
        Ok(self.plugins.keys().cloned().collect())
    }

    async fn load_config(&self, plugin_id: &str) -> Result<PluginConfig> {
        self.plugin(plugin_id)?
            .config
            .clone()
            .map_err(|msg| Error::load(plugin_id, msg))
    }

    async fn command_sources(&self, plugin_id: &str) -> Result<Vec<String>> {
        Ok(self.plugin(plugin_id)?.commands.keys().cloned().collect())
    }

    async fn load_command(&self, plugin_id: &str, source: &str) -> Result<Arc<Command>> {
        match self.plugin(plugin_id)?.commands.get(source) {
            Some(Ok(command)) => Ok(Arc::clone(command)),
            Some(Err(msg)) => Err(Error::load(source, msg)),
            None => Err(Error::load(source, "no such command source")),
        }
    }
}

#[async_trait]
impl EventSource for EmbeddedSource {
    async fn event_sources(&self) -> Result<Vec<String>> {
        Ok(self.events.keys().cloned().collect())
    }

    async fn load_handler(&self, source: &str) -> Result<Arc<dyn EventHandler>> {
        match self.events.get(source) {
            Some(Ok(handler)) => Ok(Arc::clone(handler)),
            Some(Err(msg)) => Err(Error::load(source, msg)),
            None => Err(Error::load(source, "no such event source")),
        }
    }
}
