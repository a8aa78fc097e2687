//! 로드 → 비교 → 교체 전체 흐름 테스트

use pinboard_core::{
    handler_fn, Command, CommandConfig, CommandScope, CommandSynchronizer, CommandTransport,
    Completion, Dispatcher, DispatchOutcome, EmbeddedSource, Interaction, InteractionResponder,
    InteractionUser, MemoryTransport, PermissionType, PluginConfig, RecordingResponder,
    RemoteCommand, CommandRegistry, NOT_FOUND_MESSAGE,
};
use pinboard_foundation::DeployConfig;
use std::sync::Arc;

fn command(name: &str, description: &str, permission: PermissionType) -> Arc<Command> {
    Arc::new(
        Command::new(
            CommandConfig::new(name, description).with_permission(permission),
            handler_fn(|_| async { anyhow::Ok(()) }),
        )
        .unwrap(),
    )
}

fn ping_and_secret() -> Vec<Arc<Command>> {
    vec![
        command("ping", "Pong!", PermissionType::Public),
        command("secret", "Developer tools", PermissionType::DevOnly),
    ]
}

fn synchronizer(
    transport: &Arc<MemoryTransport>,
    deploy: DeployConfig,
    dev_server: Option<&str>,
) -> CommandSynchronizer {
    CommandSynchronizer::new(
        Arc::clone(transport) as Arc<dyn CommandTransport>,
        deploy,
        dev_server.map(String::from),
    )
}

fn names(records: &[RemoteCommand]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

// ============================================================================
// 로드
// ============================================================================

#[tokio::test]
async fn malformed_sources_partition_outcome() {
    for broken_first in [true, false] {
        let mut source = EmbeddedSource::new().with_plugin("core", PluginConfig::new("Core"));
        let sources = ["a.toml", "b.toml", "c.toml", "d.toml", "e.toml"];
        for (i, name) in sources.iter().enumerate() {
            let broken = if broken_first { i < 2 } else { i >= 3 };
            source = if broken {
                source.with_broken_command("core", name, "malformed")
            } else {
                let cmd = name.trim_end_matches(".toml");
                source.with_command("core", name, command(cmd, "ok", PermissionType::Public))
            };
        }

        let registry = CommandRegistry::new();
        let report = registry.load_from(&source).await.unwrap();
        let outcome = &report.commands["core"];

        assert_eq!(outcome.succeeded.len(), 3);
        assert_eq!(outcome.failed.len(), 2);
        assert!(outcome.succeeded.iter().all(|s| !outcome.failed.contains_key(s)));
        assert_eq!(report.stats.total_commands, 5);
        assert_eq!(report.stats.loaded_commands, 3);
    }
}

// ============================================================================
// 비교 / 교체
// ============================================================================

#[tokio::test]
async fn applying_twice_is_a_noop() {
    let transport = Arc::new(MemoryTransport::ready());
    let commands = ping_and_secret();

    for deploy in [
        DeployConfig::default(),
        DeployConfig {
            treat_dev_as_global: true,
            ..Default::default()
        },
    ] {
        let sync = synchronizer(&transport, deploy, Some("42"));
        sync.update(&commands).await.unwrap();
        assert!(!sync.should_update(&commands).await.unwrap());
        assert!(sync.sync(&commands).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn description_change_requires_update() {
    let transport = Arc::new(MemoryTransport::ready());
    let sync = synchronizer(&transport, DeployConfig::default(), None);

    sync.update(&[command("ping", "Pong!", PermissionType::Public)])
        .await
        .unwrap();

    let changed = vec![command("ping", "Pong again!", PermissionType::Public)];
    assert!(sync.should_update(&changed).await.unwrap());
}

#[tokio::test]
async fn permission_change_requires_update() {
    let transport = Arc::new(MemoryTransport::ready());
    let sync = synchronizer(&transport, DeployConfig::default(), None);

    sync.update(&[command("mod", "Moderation", PermissionType::Public)])
        .await
        .unwrap();

    let restricted = vec![command("mod", "Moderation", PermissionType::Restricted)];
    assert!(sync.should_update(&restricted).await.unwrap());
}

#[tokio::test]
async fn stale_remote_command_requires_update() {
    let transport = Arc::new(MemoryTransport::ready());
    let commands = vec![command("ping", "Pong!", PermissionType::Public)];
    let sync = synchronizer(&transport, DeployConfig::default(), Some("42"));
    sync.update(&commands).await.unwrap();
    assert!(!sync.should_update(&commands).await.unwrap());

    let mut dev = transport.commands(&CommandScope::Guild("42".into()));
    dev.push(RemoteCommand {
        id: Some("9".into()),
        name: "old".into(),
        description: "Removed long ago".into(),
        kind: Some(1),
        default_permission: Some(false),
    });
    transport.seed(CommandScope::Guild("42".into()), dev);

    assert!(sync.should_update(&commands).await.unwrap());
}

#[tokio::test]
async fn no_dev_server_skips_developer_scope() {
    let transport = Arc::new(MemoryTransport::ready());
    let commands = ping_and_secret();
    let sync = synchronizer(&transport, DeployConfig::default(), None);

    assert!(sync.should_update(&commands).await.unwrap());
    let report = sync.update(&commands).await.unwrap();

    assert_eq!(report.global, 1);
    assert_eq!(report.developer, None);
    assert_eq!(
        transport.replacements(),
        vec![(CommandScope::Global, vec!["ping".to_string()])]
    );
    assert_eq!(names(&transport.commands(&CommandScope::Global)), vec!["ping"]);
}

#[tokio::test]
async fn promoted_dev_commands_go_global() {
    let transport = Arc::new(MemoryTransport::ready());
    let commands = ping_and_secret();
    let deploy = DeployConfig {
        treat_dev_as_global: true,
        ..Default::default()
    };
    let sync = synchronizer(&transport, deploy, Some("42"));

    sync.update(&commands).await.unwrap();

    assert_eq!(
        transport.replacements(),
        vec![
            (
                CommandScope::Global,
                vec!["ping".to_string(), "secret".to_string()]
            ),
            (CommandScope::Guild("42".into()), vec![]),
        ]
    );
}

#[tokio::test]
async fn transport_errors_propagate() {
    let transport = Arc::new(MemoryTransport::ready());
    transport.fail_with("gateway closed");
    let sync = synchronizer(&transport, DeployConfig::default(), None);

    assert!(sync.should_update(&ping_and_secret()).await.is_err());
    assert!(sync.update(&ping_and_secret()).await.is_err());
}

// ============================================================================
// 디스패치
// ============================================================================

#[tokio::test]
async fn unknown_command_gets_graceful_reply() {
    let dispatcher = Dispatcher::new(Arc::new(CommandRegistry::new()));
    let responder = Arc::new(RecordingResponder::new());
    let interaction = Interaction::new(
        "ghost",
        InteractionUser::new("1", "user#0001"),
        Arc::clone(&responder) as Arc<dyn InteractionResponder>,
    )
    .in_guild("42");

    assert_eq!(
        dispatcher.dispatch(interaction).await,
        DispatchOutcome::CommandNotFound
    );
    assert_eq!(
        responder.sent().await,
        vec![(Completion::Reply, NOT_FOUND_MESSAGE.to_string())]
    );
}
