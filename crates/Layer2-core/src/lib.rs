//! pinboard-core: Core Runtime for Pinboard
//!
//! Layer2 - 플러그인 로드, 커맨드 레지스트리, 원격 동기화 레이어
//!
//! # 주요 모듈
//!
//! - `command`: 커맨드 디스크립터와 호출 컨텍스트 (응답 상태 머신)
//! - `plugin`: 플러그인/이벤트 소스, 로더, 레지스트리, 이벤트 버스
//! - `remote`: 원격 커맨드 전송 계층 (메모리, REST)
//! - `sync`: 원격 스코프 비교 및 전체 교체
//! - `dispatch`: 이름 기반 커맨드 디스패치
//! - `client`: 시작 시퀀스 조율
//!
//! # 사용 예시
//!
//! ```ignore
//! use pinboard_core::{DirectorySource, PinboardClient, RestTransport};
//!
//! let transport = Arc::new(RestTransport::new(&config.token, &config.discord.api_base)?);
//! let client = PinboardClient::new(config, transport);
//!
//! let source = DirectorySource::new("plugins", "events")
//!     .with_commands(commands)
//!     .with_events(events);
//!
//! // 로드 → 로그인 → 동기화 → ready
//! let report = client.login(&source, &source).await?;
//! ```

pub mod client;
pub mod command;
pub mod dispatch;
pub mod guard;
pub mod plugin;
pub mod remote;
pub mod sync;

// Re-exports: Command
pub use command::{
    handler_fn, Command, CommandConfig, CommandData, CommandHandler, CommandType, Completion,
    Interaction, InteractionResponder, InteractionUser, PermissionType, RecordingResponder,
    ResponseState, RunOutcome, DM_DENIED_MESSAGE, FAILURE_MESSAGE,
};

// Re-exports: Plugin
pub use plugin::{
    event_fn, load_events, load_plugins, CommandRegistry, CommandTable, DirectorySource,
    EmbeddedSource, EmitReport, EventBus, EventHandler, EventLoadReport, EventLoadStats,
    EventSource, EventTable, HandlerTable, LoadOutcome, Plugin, PluginConfig, PluginLoadReport,
    PluginLoadStats, PluginSet, PluginSource,
};

// Re-exports: Remote / Sync
pub use remote::{CommandScope, CommandTransport, MemoryTransport, RemoteCommand, RestTransport};
pub use sync::{CommandSynchronizer, Mismatch, SyncPlan, SyncReport};

// Re-exports: Dispatch / Client
pub use client::{PinboardClient, StartupReport, READY_EVENT};
pub use dispatch::{DispatchOutcome, Dispatcher, NOT_FOUND_MESSAGE};
pub use guard::Failure;

// Layer1 re-exports
pub use pinboard_foundation::{Error, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
