//! Dispatch - 이름으로 커맨드를 찾아 실행

use crate::command::{Interaction, RunOutcome};
use crate::guard::Failure;
use crate::plugin::CommandRegistry;
use pinboard_foundation::channels;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 커맨드를 찾지 못했을 때의 응답
pub const NOT_FOUND_MESSAGE: &str =
    "Sorry, that command isn't available right now. Maybe try again later?";

/// 디스패치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    CommandNotFound,
    DeniedInDm,
    Failed(Failure),
}

impl From<RunOutcome> for DispatchOutcome {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => Self::Completed,
            RunOutcome::DeniedInDm => Self::DeniedInDm,
            RunOutcome::Failed(failure) => Self::Failed(failure),
        }
    }
}

/// 커맨드 디스패처
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// 호출 처리
    ///
    /// 어떤 경우에도 에러를 반환하지 않으며, 사용자에게는 항상 응답이 간다.
    pub async fn dispatch(&self, interaction: Interaction) -> DispatchOutcome {
        let name = interaction.command_name().to_string();

        let Some(command) = self.registry.get_command(&name) else {
            warn!(
                target: channels::CMDS,
                "Command {} requested by {} was not found",
                name,
                interaction.user().tag
            );
            if let Err(e) = interaction.respond(NOT_FOUND_MESSAGE).await {
                error!(target: channels::CMDS, "Failed to answer missing command {}: {}", name, e);
            }
            return DispatchOutcome::CommandNotFound;
        };

        debug!(
            target: channels::CMDS,
            "Running command {} for {} ({})",
            name,
            interaction.user().tag,
            interaction.user().id
        );
        command.run(interaction).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{
        handler_fn, Command, CommandConfig, Completion, InteractionResponder, InteractionUser,
        RecordingResponder, FAILURE_MESSAGE,
    };
    use crate::plugin::{Plugin, PluginConfig, PluginSet};

    fn registry() -> Arc<CommandRegistry> {
        let ping = Command::new(
            CommandConfig::new("ping", "Pong!"),
            handler_fn(|interaction: Interaction| async move {
                interaction.defer().await?;
                interaction.respond("pong").await?;
                anyhow::Ok(())
            }),
        )
        .unwrap();
        let broken = Command::new(
            CommandConfig::new("broken", "Always fails"),
            handler_fn(|interaction: Interaction| async move {
                interaction.defer().await?;
                Err::<(), _>(anyhow::anyhow!("no such row"))
            }),
        )
        .unwrap();

        let mut set = PluginSet::new();
        set.insert(
            Plugin::new("core", PluginConfig::new("Core"))
                .with_command(Arc::new(ping))
                .with_command(Arc::new(broken)),
        );

        let registry = Arc::new(CommandRegistry::new());
        registry.replace(set);
        registry
    }

    fn invoke(name: &str, responder: &Arc<RecordingResponder>) -> Interaction {
        Interaction::new(
            name,
            InteractionUser::new("5", "someone#0005"),
            Arc::clone(responder) as Arc<dyn InteractionResponder>,
        )
        .in_guild("1")
    }

    #[tokio::test]
    async fn test_dispatch_deferred_command() {
        let dispatcher = Dispatcher::new(registry());
        let responder = Arc::new(RecordingResponder::new());

        let outcome = dispatcher.dispatch(invoke("ping", &responder)).await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert!(responder.was_deferred().await);
        assert_eq!(responder.sent().await, vec![(Completion::EditReply, "pong".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_command_is_graceful() {
        let dispatcher = Dispatcher::new(registry());
        let responder = Arc::new(RecordingResponder::new());

        let outcome = dispatcher.dispatch(invoke("nope", &responder)).await;

        assert_eq!(outcome, DispatchOutcome::CommandNotFound);
        assert_eq!(
            responder.sent().await,
            vec![(Completion::Reply, NOT_FOUND_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_after_defer_edits_reply() {
        let dispatcher = Dispatcher::new(registry());
        let responder = Arc::new(RecordingResponder::new());

        let outcome = dispatcher.dispatch(invoke("broken", &responder)).await;

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(
            responder.sent().await,
            vec![(Completion::EditReply, FAILURE_MESSAGE.to_string())]
        );
    }
}
