//! Pinboard Config - 봇 설정
//!
//! `pinboard.toml` 하나로 관리되는 설정. 키는 camelCase (`devServer`,
//! `treatDevAsGlobal`, `logFile` ...)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 설정 파일명
pub const PINBOARD_CONFIG_FILE: &str = "pinboard.toml";

/// Discord REST API 기본 주소
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

// ============================================================================
// PinboardConfig (통합)
// ============================================================================

/// Pinboard 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinboardConfig {
    /// 봇 토큰 (필수)
    #[serde(default)]
    pub token: String,

    /// 개발 모드 여부
    #[serde(default)]
    pub development: bool,

    /// 개발자 전용 커맨드가 등록될 길드 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<String>,

    /// 길드 레코드 데이터베이스 경로 (없으면 메모리)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// 커맨드 배포 설정
    #[serde(default)]
    pub deploy: DeployConfig,

    /// 로거 설정
    #[serde(default)]
    pub logger: LoggerConfig,

    /// 원격 API 설정
    #[serde(default)]
    pub discord: DiscordConfig,
}

/// 커맨드 배포 설정
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// 비교 없이 항상 업데이트
    #[serde(default)]
    pub force: bool,

    /// DEV_ONLY 커맨드도 글로벌 스코프에 배포
    #[serde(default)]
    pub treat_dev_as_global: bool,
}

/// 로거 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// 컬러 출력 (없으면 NO_COLOR 환경 변수로 결정)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// debug 레벨을 켤 채널 목록
    #[serde(default)]
    pub debug: Vec<String>,

    /// stdout 출력 여부 (기본 true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<bool>,

    /// 로그 파일 경로 (append)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// 원격 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl PinboardConfig {
    // ========================================================================
    // Load
    // ========================================================================

    /// 파일에서 설정 로드 + 검증
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            Error::Config(format!(
                "Cannot read Pinboard config file @ {}",
                path.display()
            ))
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigValidation { problems, .. } => Error::ConfigValidation {
                path: path.display().to_string(),
                problems,
            },
            other => other,
        })?;

        debug!(
            "Loaded config from {} (dev server: {:?}, deploy: {:?})",
            path.display(),
            config.dev_server,
            config.deploy
        );

        Ok(config)
    }

    /// TOML 문자열에서 설정 파싱 + 검증
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PinboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 필수 항목 검증 (발견된 문제를 모두 모아서 보고)
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.token.trim().is_empty() {
            problems.push("`token` is required and must be a non-empty string".to_string());
        }

        if let Some(dev_server) = &self.dev_server {
            if dev_server.trim().is_empty() {
                problems.push("`devServer` must not be empty when present".to_string());
            }
        }

        if self.discord.api_base.trim().is_empty() {
            problems.push("`discord.apiBase` must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation {
                path: "<inline>".to_string(),
                problems,
            })
        }
    }

    /// 토큰에서 비밀 부분 추출 (로그 마스킹용)
    ///
    /// 봇 토큰은 `id.timestamp.hmac` 형태이며 마지막 부분이 비밀이다.
    /// 점이 없는 토큰은 전체를 마스킹한다.
    pub fn token_secret(&self) -> &str {
        self.token.split('.').nth(2).unwrap_or(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = PinboardConfig::from_toml_str(
            r#"
            token = "abc.def.ghi"
            devServer = "1234"

            [deploy]
            force = true
            treatDevAsGlobal = true

            [logger]
            color = false
            debug = ["plugins", "cmds"]
            logFile = "pinboard.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.token, "abc.def.ghi");
        assert_eq!(config.dev_server.as_deref(), Some("1234"));
        assert!(config.deploy.force);
        assert!(config.deploy.treat_dev_as_global);
        assert_eq!(config.logger.color, Some(false));
        assert_eq!(config.logger.debug, vec!["plugins", "cmds"]);
        assert_eq!(config.logger.log_file, Some(PathBuf::from("pinboard.log")));
        assert_eq!(config.discord.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_defaults() {
        let config = PinboardConfig::from_toml_str(r#"token = "t""#).unwrap();
        assert!(!config.deploy.force);
        assert!(!config.deploy.treat_dev_as_global);
        assert!(config.dev_server.is_none());
        assert!(config.logger.debug.is_empty());
    }

    #[test]
    fn test_missing_token_rejected() {
        let err = PinboardConfig::from_toml_str(r#"devServer = """#).unwrap_err();
        match err {
            Error::ConfigValidation { problems, .. } => assert_eq!(problems.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PINBOARD_CONFIG_FILE);
        fs::write(&path, "development = true\n").unwrap();

        let err = PinboardConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_load_unreadable() {
        let err = PinboardConfig::load(Path::new("/nonexistent/pinboard.toml")).unwrap_err();
        assert!(err.to_string().contains("Cannot read Pinboard config file"));
    }

    #[test]
    fn test_token_secret() {
        let mut config = PinboardConfig {
            token: "MTIz.abc.s3cr3t".into(),
            ..Default::default()
        };
        assert_eq!(config.token_secret(), "s3cr3t");

        config.token = "plain".into();
        assert_eq!(config.token_secret(), "plain");
    }
}
