//! 메모리 내 전송 계층

use super::{CommandScope, CommandTransport, RemoteCommand};
use crate::command::CommandData;
use async_trait::async_trait;
use parking_lot::Mutex;
use pinboard_foundation::{channels, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// 스코프별 커맨드를 메모리에 보관하는 전송 계층
#[derive(Default)]
pub struct MemoryTransport {
    ready: AtomicBool,
    scopes: Mutex<HashMap<CommandScope, Vec<RemoteCommand>>>,
    replaced: Mutex<Vec<(CommandScope, Vec<String>)>>,
    guilds: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그인된 상태로 생성
    pub fn ready() -> Self {
        let transport = Self::new();
        transport.ready.store(true, Ordering::SeqCst);
        transport
    }

    /// 스코프 초기 상태 지정
    pub fn seed(&self, scope: CommandScope, commands: Vec<RemoteCommand>) {
        self.scopes.lock().insert(scope, commands);
    }

    pub fn set_guilds(&self, guilds: Vec<String>) {
        *self.guilds.lock() = guilds;
    }

    /// 이후 모든 원격 호출을 실패시킴
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock() = Some(message.into());
    }

    pub fn commands(&self, scope: &CommandScope) -> Vec<RemoteCommand> {
        self.scopes.lock().get(scope).cloned().unwrap_or_default()
    }

    /// 교체 호출 기록 (스코프, 커맨드 이름들)
    pub fn replacements(&self) -> Vec<(CommandScope, Vec<String>)> {
        self.replaced.lock().clone()
    }

    fn check(&self) -> Result<()> {
        match self.fail_with.lock().as_ref() {
            Some(message) => Err(Error::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CommandTransport for MemoryTransport {
    async fn login(&self) -> Result<()> {
        self.check()?;
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn fetch_commands(&self, scope: &CommandScope) -> Result<Vec<RemoteCommand>> {
        self.check()?;
        Ok(self.commands(scope))
    }

    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandData],
    ) -> Result<Vec<RemoteCommand>> {
        self.check()?;

        let records: Vec<RemoteCommand> = commands
            .iter()
            .enumerate()
            .map(|(i, data)| RemoteCommand {
                id: Some((i + 1).to_string()),
                ..RemoteCommand::from(data)
            })
            .collect();

        debug!(
            target: channels::TRANSPORT,
            "Replacing {} command(s) in {}",
            records.len(),
            scope
        );

        self.replaced.lock().push((
            scope.clone(),
            commands.iter().map(|c| c.name.clone()).collect(),
        ));
        self.scopes.lock().insert(scope.clone(), records.clone());
        Ok(records)
    }

    async fn guild_ids(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.guilds.lock().clone())
    }
}
