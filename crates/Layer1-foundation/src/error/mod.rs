//! Error types for Pinboard
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pinboard 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to validate Pinboard config file @ {path}: {}", .problems.join("; "))]
    ConfigValidation { path: String, problems: Vec<String> },

    // ========================================================================
    // 로드 관련 (플러그인/커맨드/이벤트 단위로 격리됨)
    // ========================================================================
    #[error("Failed to load {source_id}: {message}")]
    Load { source_id: String, message: String },

    // ========================================================================
    // 실행 관련 (커맨드 콜백, 이벤트 핸들러)
    // ========================================================================
    #[error("Invocation of {name} failed: {message}")]
    Invocation { name: String, message: String },

    // ========================================================================
    // 원격 동기화 관련
    // ========================================================================
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 로드 실패 에러 생성 헬퍼
    pub fn load(source_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Load {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }

    /// 실행 실패 에러 생성 헬퍼
    pub fn invocation(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Invocation {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// 시작 시퀀스를 중단해야 하는 에러인지 확인
    ///
    /// 로드/실행 실패는 항목 단위로 복구되지만, 원격 호출 실패와
    /// 준비되지 않은 상태에서의 동기화는 호출자에게 전파된다.
    pub fn is_fatal_to_startup(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::NotReady(_) | Error::Config(_) | Error::ConfigValidation { .. }
        )
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
