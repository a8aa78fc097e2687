//! # pinboard-foundation
//!
//! Foundation layer for Pinboard:
//! - Error: 공통 에러 타입 (`Error`, `Result`)
//! - Config: `pinboard.toml` 로드 및 검증
//! - Logging: tracing 채널 로거 + 민감 정보 마스킹
//! - Storage: SQLite 길드 레코드
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  pinboard-bot (binary)                                  │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  pinboard-core (plugins, registry, sync, dispatch)      │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  pinboard-foundation (error, config, logging, storage)  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    DeployConfig, DiscordConfig, LoggerConfig, PinboardConfig, DEFAULT_API_BASE,
    PINBOARD_CONFIG_FILE,
};

// ============================================================================
// Logging (로깅)
// ============================================================================
pub use logging::{channels, Censor, CensoredMakeWriter, DEBUG_ENV};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::GuildStore;
