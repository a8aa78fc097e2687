//! PinboardClient - 시작 시퀀스 조율
//!
//! ```text
//! login()
//!   ├─ load_plugins ─┐
//!   ├─ load_events  ─┼─ tokio::join!
//!   └─ transport    ─┘
//!            │
//!            ▼
//!   should_update → update (필요할 때만)
//!            │
//!            ▼
//!   emit("ready")
//! ```

use crate::command::Interaction;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::plugin::{
    load_events, CommandRegistry, EmitReport, EventBus, EventLoadReport, EventSource,
    PluginLoadReport, PluginSource,
};
use crate::remote::CommandTransport;
use crate::sync::{CommandSynchronizer, SyncReport};
use pinboard_foundation::{channels, PinboardConfig, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// 준비 완료 이벤트 이름
pub const READY_EVENT: &str = "ready";

/// 시작 시퀀스 결과
#[derive(Debug)]
pub struct StartupReport {
    pub plugins: PluginLoadReport,
    pub events: EventLoadReport,
    /// 교체가 일어났을 때만 Some
    pub sync: Option<SyncReport>,
    pub ready: EmitReport,
}

/// Pinboard 클라이언트
pub struct PinboardClient {
    config: PinboardConfig,
    registry: Arc<CommandRegistry>,
    events: Arc<EventBus>,
    transport: Arc<dyn CommandTransport>,
    synchronizer: CommandSynchronizer,
    dispatcher: Dispatcher,
}

impl PinboardClient {
    pub fn new(config: PinboardConfig, transport: Arc<dyn CommandTransport>) -> Self {
        let registry = Arc::new(CommandRegistry::new());
        let synchronizer = CommandSynchronizer::new(
            Arc::clone(&transport),
            config.deploy,
            config.dev_server.clone(),
        );

        Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry)),
            events: Arc::new(EventBus::new()),
            config,
            registry,
            transport,
            synchronizer,
        }
    }

    pub fn config(&self) -> &PinboardConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn synchronizer(&self) -> &CommandSynchronizer {
        &self.synchronizer
    }

    /// 전체 시작 시퀀스
    ///
    /// 로드 중 항목 단위 실패는 보고서에만 남고, 전송 계층 실패와
    /// 준비 전 호출은 에러로 반환된다.
    pub async fn login(
        &self,
        plugins: &dyn PluginSource,
        events: &dyn EventSource,
    ) -> Result<StartupReport> {
        let (plugin_report, event_report) = self.load_and_login(plugins, events).await?;

        let commands = self.registry.commands();
        let sync = self.synchronizer.sync(&commands).await?;

        let guilds = match self.transport.guild_ids().await {
            Ok(guilds) => guilds,
            Err(e) => {
                warn!(target: channels::TRANSPORT, "Could not list guilds: {}", e);
                Vec::new()
            }
        };
        let ready = self.emit(READY_EVENT, json!({ "guilds": guilds })).await;

        info!(target: channels::PLUGINS, "Pinboard is ready.");
        Ok(StartupReport {
            plugins: plugin_report,
            events: event_report,
            sync,
            ready,
        })
    }

    /// 로드 후 업데이트 필요 여부만 판단 (원격 변경 없음)
    pub async fn check(&self, plugins: &dyn PluginSource, events: &dyn EventSource) -> Result<bool> {
        self.load_and_login(plugins, events).await?;
        self.synchronizer
            .should_update(&self.registry.commands())
            .await
    }

    async fn load_and_login(
        &self,
        plugins: &dyn PluginSource,
        events: &dyn EventSource,
    ) -> Result<(PluginLoadReport, EventLoadReport)> {
        let (plugin_report, event_report, login) = tokio::join!(
            self.registry.load_from(plugins),
            load_events(&self.events, events),
            self.transport.login(),
        );

        login?;
        Ok((plugin_report?, event_report?))
    }

    /// 커맨드 호출 처리
    pub async fn dispatch(&self, interaction: Interaction) -> DispatchOutcome {
        self.dispatcher.dispatch(interaction).await
    }

    /// 이벤트 발행
    pub async fn emit(&self, event: &str, payload: Value) -> EmitReport {
        self.events.emit(event, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{handler_fn, Command, CommandConfig, PermissionType};
    use crate::plugin::{event_fn, EmbeddedSource, PluginConfig};
    use crate::remote::{CommandScope, MemoryTransport};
    use pinboard_foundation::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn command(name: &str, permission: PermissionType) -> Arc<Command> {
        Arc::new(
            Command::new(
                CommandConfig::new(name, "test").with_permission(permission),
                handler_fn(|_| async { anyhow::Ok(()) }),
            )
            .unwrap(),
        )
    }

    fn source(ready_calls: &Arc<AtomicUsize>) -> EmbeddedSource {
        let ready_calls = Arc::clone(ready_calls);
        EmbeddedSource::new()
            .with_plugin("core", PluginConfig::new("Core"))
            .with_command("core", "ping.toml", command("ping", PermissionType::Public))
            .with_command("core", "secret.toml", command("secret", PermissionType::DevOnly))
            .with_event(
                READY_EVENT,
                event_fn(move |payload| {
                    let ready_calls = Arc::clone(&ready_calls);
                    async move {
                        assert_eq!(payload["guilds"], json!(["10", "11"]));
                        ready_calls.fetch_add(1, Ordering::SeqCst);
                        anyhow::Ok(())
                    }
                }),
            )
    }

    fn config(dev_server: Option<&str>) -> PinboardConfig {
        PinboardConfig {
            token: "token".into(),
            dev_server: dev_server.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_login_syncs_and_emits_ready() {
        let transport = Arc::new(MemoryTransport::new());
        transport.set_guilds(vec!["10".into(), "11".into()]);
        let client = PinboardClient::new(config(Some("42")), transport.clone());

        let ready_calls = Arc::new(AtomicUsize::new(0));
        let src = source(&ready_calls);
        let report = assert_ok!(client.login(&src, &src).await);

        assert_eq!(report.plugins.stats.loaded_commands, 2);
        assert_eq!(report.events.stats.loaded, 1);
        assert_eq!(
            report.sync,
            Some(SyncReport {
                global: 1,
                developer: Some(1)
            })
        );
        assert_eq!(report.ready.invoked, 1);
        assert_eq!(report.ready.failed, 0);
        assert_eq!(ready_calls.load(Ordering::SeqCst), 1);

        let global = transport.commands(&CommandScope::Global);
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].name, "ping");
    }

    #[tokio::test]
    async fn test_second_login_is_noop() {
        let transport = Arc::new(MemoryTransport::new());
        let ready_calls = Arc::new(AtomicUsize::new(0));
        let src = source(&ready_calls);

        let client = PinboardClient::new(config(Some("42")), transport.clone());
        client.login(&src, &src).await.unwrap();

        let client = PinboardClient::new(config(Some("42")), transport.clone());
        assert!(!client.check(&src, &src).await.unwrap());
        assert_eq!(transport.replacements().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_startup() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_with("connection reset");
        let client = PinboardClient::new(config(None), transport);

        let src = EmbeddedSource::new();
        let err = assert_err!(client.login(&src, &src).await);
        assert!(matches!(err, Error::Transport(_)));
    }
}
