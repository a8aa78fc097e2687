//! Plugin Loader - 플러그인/커맨드 일괄 로드
//!
//! 플러그인 소스마다 설정 → Plugin 생성 → 커맨드 로드 순으로 진행하며,
//! 각 단계의 실패는 해당 플러그인(또는 커맨드)에만 기록된다.
//! 배치는 항상 끝까지 실행되고, 결과는 소스 순서대로 모인다.

use super::registry::{Plugin, PluginSet};
use super::traits::PluginSource;
use crate::command::Command;
use futures::future::join_all;
use pinboard_foundation::{channels, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ============================================================================
// LoadOutcome - 성공/실패 분할
// ============================================================================

/// 일괄 로드 결과
///
/// `succeeded`와 `failed`는 시도한 식별자 전체를 겹침 없이 나눈다.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub succeeded: Vec<String>,
    pub failed: BTreeMap<String, Error>,
}

impl LoadOutcome {
    pub fn record_success(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.failed.remove(&id);
        if !self.succeeded.contains(&id) {
            self.succeeded.push(id);
        }
    }

    pub fn record_failure(&mut self, id: impl Into<String>, cause: Error) {
        let id = id.into();
        self.succeeded.retain(|s| s != &id);
        self.failed.insert(id, cause);
    }

    /// 시도한 식별자 수
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// 통계
// ============================================================================

/// 플러그인 로드 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginLoadStats {
    pub total: usize,
    pub loaded: usize,
    pub total_commands: usize,
    pub loaded_commands: usize,
}

/// 플러그인 로드 결과 전체
#[derive(Debug, Default)]
pub struct PluginLoadReport {
    pub stats: PluginLoadStats,
    /// 플러그인 소스 ID 단위 결과
    pub plugins: LoadOutcome,
    /// 플러그인 소스 ID → 커맨드 소스 단위 결과
    pub commands: BTreeMap<String, LoadOutcome>,
}

// ============================================================================
// 로드
// ============================================================================

/// 단일 플러그인 로드 결과 (내부용)
struct LoadedPlugin {
    plugin: Plugin,
    commands: LoadOutcome,
}

/// 모든 플러그인을 병렬로 로드
///
/// 플러그인 목록 조회 실패만 에러로 반환된다. 반환된 [`PluginSet`]은
/// 소스 순서대로 구성되며, 같은 설정 이름의 플러그인은 뒤의 것이 대체한다.
pub async fn load_plugins(source: &dyn PluginSource) -> Result<(PluginSet, PluginLoadReport)> {
    info!(target: channels::PLUGINS, "Loading plugins...");

    let ids = source.plugin_ids().await?;
    let results = join_all(ids.iter().map(|id| load_plugin(source, id))).await;

    let mut set = PluginSet::new();
    let mut report = PluginLoadReport::default();

    for (id, result) in ids.into_iter().zip(results) {
        report.stats.total += 1;
        match result {
            Ok(loaded) => {
                report.stats.total_commands += loaded.commands.total();
                report.stats.loaded_commands += loaded.commands.succeeded.len();
                report.stats.loaded += 1;

                debug!(
                    target: channels::PLUGINS,
                    "Loaded plugin {} ({} command(s))",
                    loaded.plugin.config.name,
                    loaded.plugin.commands.len()
                );
                set.insert(loaded.plugin);
                report.commands.insert(id.clone(), loaded.commands);
                report.plugins.record_success(id);
            }
            Err(e) => {
                error!(target: channels::PLUGINS, "Failed to load plugin {}:\n{}", id, e);
                report.plugins.record_failure(id, e);
            }
        }
    }

    let stats = report.stats;
    info!(
        target: channels::PLUGINS,
        "Loaded {}/{} plugin(s) with {}/{} command(s).",
        stats.loaded,
        stats.total,
        stats.loaded_commands,
        stats.total_commands
    );
    if stats.loaded < stats.total || stats.loaded_commands < stats.total_commands {
        warn!(target: channels::PLUGINS, "Some plugins or commands failed to load.");
    }

    Ok((set, report))
}

async fn load_plugin(source: &dyn PluginSource, id: &str) -> Result<LoadedPlugin> {
    let config = source.load_config(id).await.map_err(|e| wrap(id, e))?;
    let mut plugin = Plugin::new(id, config);

    let sources = source.command_sources(id).await.map_err(|e| wrap(id, e))?;
    let results = join_all(sources.iter().map(|s| source.load_command(id, s))).await;

    let mut commands = LoadOutcome::default();
    for (command_source, result) in sources.into_iter().zip(results) {
        match result {
            Ok(command) => {
                add_command(&mut plugin, &command_source, command);
                commands.record_success(command_source);
            }
            Err(e) => {
                error!(
                    target: channels::CMDS,
                    "Failed to load command {} in plugin {}:\n{}",
                    command_source,
                    id,
                    e
                );
                commands.record_failure(command_source.clone(), wrap(&command_source, e));
            }
        }
    }

    Ok(LoadedPlugin { plugin, commands })
}

/// 선언된 이름으로 커맨드 추가 (소스 이름과 다를 수 있음)
fn add_command(plugin: &mut Plugin, command_source: &str, command: Arc<Command>) {
    let name = command.name().to_string();
    if plugin.commands.contains_key(&name) {
        warn!(
            target: channels::CMDS,
            "Command {} from {} replaces an earlier definition in plugin {}",
            name,
            command_source,
            plugin.id
        );
    }
    plugin.commands.insert(name, command);
}

fn wrap(id: &str, e: Error) -> Error {
    match e {
        Error::Load { .. } => e,
        other => Error::load(id, other),
    }
}
