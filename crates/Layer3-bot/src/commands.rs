//! 내장 커맨드 콜백
//!
//! 선언 파일의 `handler` 키가 여기 등록된 이름을 가리킨다.

use pinboard_core::{handler_fn, CommandTable, Interaction};

/// 내장 콜백 테이블
pub fn command_table() -> CommandTable {
    CommandTable::new()
        .with(
            "ping",
            handler_fn(|interaction: Interaction| async move {
                interaction.respond("Pong!").await?;
                anyhow::Ok(())
            }),
        )
        .with(
            "test",
            handler_fn(|interaction: Interaction| async move {
                let mention = interaction.user().mention().repeat(10);
                interaction.respond(&mention).await?;
                anyhow::Ok(())
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::{
        Command, CommandConfig, Completion, InteractionResponder, InteractionUser,
        RecordingResponder, RunOutcome,
    };
    use std::sync::Arc;

    async fn run(handler: &str) -> Vec<(Completion, String)> {
        let table = command_table();
        let command = Command::new(
            CommandConfig::new(handler, "builtin"),
            table.get(handler).unwrap(),
        )
        .unwrap();

        let responder = Arc::new(RecordingResponder::new());
        let interaction = Interaction::new(
            handler,
            InteractionUser::new("12", "alice#0001"),
            Arc::clone(&responder) as Arc<dyn InteractionResponder>,
        )
        .in_guild("1");

        assert_eq!(command.run(interaction).await, RunOutcome::Completed);
        responder.sent().await
    }

    #[test]
    fn test_table_names() {
        assert_eq!(command_table().names(), vec!["ping", "test"]);
    }

    #[tokio::test]
    async fn test_ping() {
        assert_eq!(run("ping").await, vec![(Completion::Reply, "Pong!".to_string())]);
    }

    #[tokio::test]
    async fn test_mentions_user_ten_times() {
        let sent = run("test").await;
        assert_eq!(sent[0].1, "<@12>".repeat(10));
    }
}
