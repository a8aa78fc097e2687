//! # Command Sync
//!
//! 로컬 레지스트리와 원격 스코프(글로벌 / 개발 서버)의 비교 및 전체 교체
//!
//! ## 분할 규칙
//!
//! | 설정                    | 글로벌                | 개발 서버      |
//! |-------------------------|-----------------------|----------------|
//! | 기본                    | DevOnly 제외 전부     | DevOnly만      |
//! | `treat_dev_as_global`   | 전부                  | 빈 목록        |
//!
//! 개발 서버가 설정되지 않으면 개발 서버 스코프는 건드리지 않는다.
//! 비교와 교체가 같은 분할을 사용하므로, 교체 직후의 비교는 항상 false다.

use crate::command::{Command, CommandData};
use crate::remote::{CommandScope, CommandTransport, RemoteCommand};
use pinboard_foundation::{channels, DeployConfig, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// SyncPlan - 스코프별 로컬 선언
// ============================================================================

/// 스코프별로 나뉜 로컬 커맨드 선언
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub global: Vec<CommandData>,
    /// (개발 서버 ID, 선언 목록). 개발 서버가 없으면 None.
    pub developer: Option<(String, Vec<CommandData>)>,
}

/// 비교 중 발견된 첫 차이
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// 로컬에는 있지만 원격에 없음
    Missing(String),
    /// 양쪽에 있지만 내용이 다름
    Outdated(String),
    /// 원격에만 있음 (제거 대상)
    Stale(String),
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "command {} is missing", name),
            Self::Outdated(name) => write!(f, "command {} is outdated", name),
            Self::Stale(name) => write!(f, "command {} is no longer declared locally", name),
        }
    }
}

/// 교체 결과 (스코프별 전송한 커맨드 수)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub global: usize,
    pub developer: Option<usize>,
}

/// 로컬 선언과 원격 스냅샷 비교 (첫 차이에서 중단)
pub fn diff(local: &[CommandData], remote: &[RemoteCommand]) -> Option<Mismatch> {
    let by_name: HashMap<&str, &RemoteCommand> =
        remote.iter().map(|r| (r.name.as_str(), r)).collect();

    for command in local {
        match by_name.get(command.name.as_str()) {
            None => return Some(Mismatch::Missing(command.name.clone())),
            Some(record) if !record.matches(command) => {
                return Some(Mismatch::Outdated(command.name.clone()))
            }
            Some(_) => {}
        }
    }

    remote
        .iter()
        .find(|r| !local.iter().any(|l| l.name == r.name))
        .map(|r| Mismatch::Stale(r.name.clone()))
}

// ============================================================================
// CommandSynchronizer
// ============================================================================

/// 원격 커맨드 동기화
pub struct CommandSynchronizer {
    transport: Arc<dyn CommandTransport>,
    deploy: DeployConfig,
    dev_server: Option<String>,
}

impl CommandSynchronizer {
    pub fn new(
        transport: Arc<dyn CommandTransport>,
        deploy: DeployConfig,
        dev_server: Option<String>,
    ) -> Self {
        Self {
            transport,
            deploy,
            dev_server,
        }
    }

    /// 로컬 커맨드를 스코프별로 분할
    pub fn plan(&self, commands: &[Arc<Command>]) -> SyncPlan {
        let promote = self.deploy.treat_dev_as_global;

        let global = commands
            .iter()
            .filter(|c| promote || !c.is_dev_only())
            .map(|c| c.to_command_data())
            .collect();

        let developer = self.dev_server.as_ref().map(|guild| {
            let dev = commands
                .iter()
                .filter(|c| !promote && c.is_dev_only())
                .map(|c| c.to_command_data())
                .collect();
            (guild.clone(), dev)
        });

        SyncPlan { global, developer }
    }

    fn ensure_ready(&self, action: &str) -> Result<()> {
        if self.transport.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady(format!(
                "Pinboard must be logged in to {}.",
                action
            )))
        }
    }

    /// 업데이트가 필요한지 판단
    pub async fn should_update(&self, commands: &[Arc<Command>]) -> Result<bool> {
        self.ensure_ready("check if commands should be updated")?;

        if self.deploy.force {
            info!(target: channels::CMDS, "Forcing command update (deploy.force is set)");
            return Ok(true);
        }

        let plan = self.plan(commands);

        let remote = self.transport.fetch_commands(&CommandScope::Global).await?;
        if let Some(mismatch) = diff(&plan.global, &remote) {
            info!(target: channels::CMDS, "Global commands need an update: {}", mismatch);
            return Ok(true);
        }

        if let Some((guild, dev)) = &plan.developer {
            let scope = CommandScope::Guild(guild.clone());
            let remote = self.transport.fetch_commands(&scope).await?;
            if let Some(mismatch) = diff(dev, &remote) {
                info!(
                    target: channels::CMDS,
                    "Developer commands in {} need an update: {}",
                    scope,
                    mismatch
                );
                return Ok(true);
            }
        }

        debug!(target: channels::CMDS, "Remote commands are up to date");
        Ok(false)
    }

    /// 각 스코프의 커맨드를 전체 교체
    pub async fn update(&self, commands: &[Arc<Command>]) -> Result<SyncReport> {
        self.ensure_ready("update commands")?;

        let plan = self.plan(commands);
        info!(target: channels::CMDS, "Updating commands...");

        self.transport
            .replace_commands(&CommandScope::Global, &plan.global)
            .await?;
        info!(
            target: channels::CMDS,
            "Deployed {} global command(s)",
            plan.global.len()
        );

        let developer = match &plan.developer {
            Some((guild, dev)) => {
                self.transport
                    .replace_commands(&CommandScope::Guild(guild.clone()), dev)
                    .await?;
                info!(
                    target: channels::CMDS,
                    "Deployed {} developer command(s) to guild {}",
                    dev.len(),
                    guild
                );
                Some(dev.len())
            }
            None => None,
        };

        Ok(SyncReport {
            global: plan.global.len(),
            developer,
        })
    }

    /// 필요할 때만 교체
    pub async fn sync(&self, commands: &[Arc<Command>]) -> Result<Option<SyncReport>> {
        if self.should_update(commands).await? {
            Ok(Some(self.update(commands).await?))
        } else {
            info!(target: channels::CMDS, "Commands are already up to date.");
            Ok(None)
        }
    }
}
