//! # Plugin System
//!
//! 플러그인(커맨드 묶음)과 이벤트 핸들러의 발견, 로드, 등록
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  PluginSource / EventSource                              │
//! │  (DirectorySource, EmbeddedSource)                       │
//! └───────────────┬───────────────────────────┬──────────────┘
//!                 │ load_plugins              │ load_events
//!                 ▼                           ▼
//! ┌───────────────────────────┐   ┌──────────────────────────┐
//! │  CommandRegistry          │   │  EventBus                │
//! │  RwLock<Arc<PluginSet>>   │   │  event → guarded handler │
//! │  ┌────────┬────────┐      │   └──────────────────────────┘
//! │  │ Core   │ Admin  │ ...  │
//! │  └────────┴────────┘      │
//! └───────────────────────────┘
//! ```
//!
//! 모든 일괄 로드는 항목 단위로 실패가 격리되며, 결과는
//! [`LoadOutcome`]과 통계로 보고된다.

mod discovery;
mod embedded;
mod events;
mod loader;
mod registry;
mod traits;

pub use discovery::{DirectorySource, PLUGIN_CONFIG_FILE};
pub use embedded::EmbeddedSource;
pub use events::{
    event_fn, load_events, EmitReport, EventBus, EventHandler, EventLoadReport, EventLoadStats,
    FnEventHandler,
};
pub use loader::{load_plugins, LoadOutcome, PluginLoadReport, PluginLoadStats};
pub use registry::{CommandRegistry, Plugin, PluginSet};
pub use traits::{
    CommandTable, EventSource, EventTable, HandlerTable, PluginConfig, PluginSource,
};
