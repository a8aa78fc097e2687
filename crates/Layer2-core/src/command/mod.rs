//! # Command
//!
//! 커맨드 디스크립터: 이름, 설명, 타입, 권한 범위, 콜백
//!
//! 디스크립터는 로드 시 한 번 생성되고 이후 변경되지 않는다.
//! 콜백 실행은 [`Command::run`]이 감싸며, 실패는 호출 경계에서
//! 로그와 사용자 응답으로 변환된다.

mod interaction;
mod types;

pub use interaction::{
    Completion, Interaction, InteractionResponder, InteractionUser, RecordingResponder,
    ResponseState,
};
pub use types::{CommandConfig, CommandData, CommandType, PermissionType};

use crate::guard::{guarded, Failure};
use async_trait::async_trait;
use pinboard_foundation::{channels, Error, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

/// DM에서 호출되었을 때의 응답
pub const DM_DENIED_MESSAGE: &str = "Sorry, Pinboard commands cannot be used in DMs.";

/// 콜백 실패 시 응답
pub const FAILURE_MESSAGE: &str = "Sorry, there was an issue on our side. Maybe try again?";

// ============================================================================
// CommandHandler - 콜백 인터페이스
// ============================================================================

/// 커맨드 콜백
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, interaction: Interaction) -> anyhow::Result<()>;
}

/// 클로저 기반 콜백
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Interaction) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn run(&self, interaction: Interaction) -> anyhow::Result<()> {
        (self.0)(interaction).await
    }
}

/// 클로저를 콜백으로 변환
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Interaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

// ============================================================================
// Command - 디스크립터
// ============================================================================

/// 커맨드 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// 길드 밖(DM)에서 호출되어 거부됨
    DeniedInDm,
    /// 콜백 실패 (사용자에게는 사과 메시지가 전송됨)
    Failed(Failure),
}

/// 커맨드 디스크립터
pub struct Command {
    config: CommandConfig,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    /// 새 디스크립터 생성 (이름은 비어 있을 수 없음)
    pub fn new(config: CommandConfig, handler: Arc<dyn CommandHandler>) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(Error::load("<command>", "command name must not be empty"));
        }
        Ok(Self { config, handler })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    pub fn permission(&self) -> PermissionType {
        self.config.permission()
    }

    pub fn is_dev_only(&self) -> bool {
        self.permission() == PermissionType::DevOnly
    }

    /// 원격 선언 형태로 변환
    pub fn to_command_data(&self) -> CommandData {
        CommandData::from(&self.config)
    }

    /// 콜백 실행
    ///
    /// 콜백의 에러와 panic은 여기서 잡히고, 상태에 맞는 프리미티브로
    /// 사과 메시지를 보낸다.
    pub async fn run(&self, interaction: Interaction) -> RunOutcome {
        if interaction.guild_id().is_none() {
            debug!(target: channels::CMDS, "Denying command {} sent via DM", self.name());
            if let Err(e) = interaction.respond(DM_DENIED_MESSAGE).await {
                error!(target: channels::CMDS, "Failed to deny DM command {}: {}", self.name(), e);
            }
            return RunOutcome::DeniedInDm;
        }

        match guarded(self.handler.run(interaction.clone())).await {
            Ok(()) => RunOutcome::Completed,
            Err(failure) => {
                error!(
                    target: channels::CMDS,
                    "Error while running command {} for {} ({}):\n{}",
                    self.name(),
                    interaction.user().tag,
                    interaction.user().id,
                    failure
                );
                if let Err(e) = interaction.respond(FAILURE_MESSAGE).await {
                    error!(
                        target: channels::CMDS,
                        "Failed to report error for command {}: {}",
                        self.name(),
                        e
                    );
                }
                RunOutcome::Failed(failure)
            }
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("config", &self.config).finish()
    }
}
