//! Config - 통합 설정 관리
//!
//! - `pinboard.rs` - PinboardConfig (토큰, 배포, 로거, 원격 API)

mod pinboard;

pub use pinboard::{
    DeployConfig, DiscordConfig, LoggerConfig, PinboardConfig, DEFAULT_API_BASE,
    PINBOARD_CONFIG_FILE,
};
