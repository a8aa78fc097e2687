//! Logging - tracing 기반 채널 로거
//!
//! 채널은 tracing target으로 표현한다 (`plugins`, `cmds`, `events`,
//! `transport`). 기본 레벨은 `info`이고, 설정의 `logger.debug` 또는
//! `PINBOARD_DEBUG` 환경 변수에 나열된 채널만 `debug`까지 출력한다.
//!
//! 모든 출력은 [`Censor`]를 거쳐 토큰과 홈 디렉토리가 가려진다.

use crate::config::PinboardConfig;
use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 디버그 채널 환경 변수
pub const DEBUG_ENV: &str = "PINBOARD_DEBUG";

/// 로그 채널 이름 (tracing target)
pub mod channels {
    pub const PLUGINS: &str = "plugins";
    pub const CMDS: &str = "cmds";
    pub const EVENTS: &str = "events";
    pub const TRANSPORT: &str = "transport";
    pub const LOGGER: &str = "logger";
}

// ============================================================================
// Censor - 민감 정보 마스킹
// ============================================================================

/// 로그 문자열에서 민감한 값을 치환
#[derive(Debug, Clone, Default)]
pub struct Censor {
    replacements: Vec<(String, String)>,
}

impl Censor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 치환 규칙 추가 (빈 문자열은 무시)
    pub fn with(mut self, secret: impl Into<String>, replacement: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.replacements.push((secret, replacement.into()));
        }
        self
    }

    /// 설정에서 기본 규칙 생성: 토큰 비밀 부분, 홈 디렉토리
    pub fn for_config(config: &PinboardConfig) -> Self {
        let mut censor = Self::new().with(config.token_secret(), "*".repeat(10));
        if let Some(home) = dirs::home_dir() {
            censor = censor.with(home.to_string_lossy(), "~");
        }
        censor
    }

    pub fn apply(&self, input: &str) -> String {
        self.replacements
            .iter()
            .fold(input.to_string(), |acc, (secret, replacement)| {
                acc.replace(secret.as_str(), replacement)
            })
    }
}

// ============================================================================
// CensoredMakeWriter - stdout / 로그 파일 출력
// ============================================================================

/// 이벤트마다 버퍼를 만들고, drop 시 마스킹 후 각 싱크로 출력
#[derive(Clone)]
pub struct CensoredMakeWriter {
    censor: Arc<Censor>,
    stdout: bool,
    file: Option<Arc<Mutex<File>>>,
}

impl CensoredMakeWriter {
    pub fn new(censor: Censor, stdout: bool, file: Option<File>) -> Self {
        Self {
            censor: Arc::new(censor),
            stdout,
            file: file.map(|f| Arc::new(Mutex::new(f))),
        }
    }
}

/// 한 줄(이벤트) 단위 버퍼
pub struct CensoredLine {
    buf: Vec<u8>,
    target: CensoredMakeWriter,
}

impl Write for CensoredLine {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        let line = self.target.censor.apply(&String::from_utf8_lossy(&self.buf));
        self.buf.clear();

        if self.target.stdout {
            io::stdout().write_all(line.as_bytes())?;
        }
        if let Some(file) = &self.target.file {
            let mut file = file
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

impl Drop for CensoredLine {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for CensoredMakeWriter {
    type Writer = CensoredLine;

    fn make_writer(&'a self) -> Self::Writer {
        CensoredLine {
            buf: Vec::new(),
            target: self.clone(),
        }
    }
}

// ============================================================================
// 필터 / 초기화
// ============================================================================

/// debug 레벨을 켤 채널 목록 (설정 + 환경 변수)
pub fn debug_channels(config: &PinboardConfig, env_value: Option<&str>) -> Vec<String> {
    let mut channels: Vec<String> = config.logger.debug.clone();
    if let Some(value) = env_value {
        channels.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    channels.sort();
    channels.dedup();
    channels
}

/// 채널 목록으로 EnvFilter 지시어 생성
pub fn filter_directives(channels: &[String]) -> String {
    std::iter::once("info".to_string())
        .chain(channels.iter().map(|c| format!("{}=debug", c)))
        .collect::<Vec<_>>()
        .join(",")
}

/// 전역 subscriber 초기화
///
/// `RUST_LOG`가 설정되어 있으면 채널 설정보다 우선한다.
pub fn init(config: &PinboardConfig, force_debug: bool) -> Result<()> {
    let env_debug = std::env::var(DEBUG_ENV).ok();
    let mut enabled = debug_channels(config, env_debug.as_deref());
    if force_debug {
        enabled = vec![
            channels::PLUGINS.to_string(),
            channels::CMDS.to_string(),
            channels::EVENTS.to_string(),
            channels::TRANSPORT.to_string(),
            channels::LOGGER.to_string(),
        ];
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(&enabled)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let color = config
        .logger
        .color
        .unwrap_or_else(|| std::env::var_os("NO_COLOR").is_none());

    let file = match &config.logger.log_file {
        Some(path) => Some(open_log_file(path)?),
        None => None,
    };

    let writer = CensoredMakeWriter::new(
        Censor::for_config(config),
        config.logger.stdout.unwrap_or(true),
        file,
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(color)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(target: channels::LOGGER, "Debug channels: {:?}", enabled);
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Config(format!("Cannot open log file @ {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn config_with_token(token: &str) -> PinboardConfig {
        PinboardConfig {
            token: token.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_censor_token_secret() {
        let censor = Censor::for_config(&config_with_token("MTIz.abc.s3cr3t"));
        let out = censor.apply("Authorization: Bot MTIz.abc.s3cr3t");
        assert_eq!(out, "Authorization: Bot MTIz.abc.**********");
    }

    #[test]
    fn test_censor_ignores_empty_secret() {
        let censor = Censor::new().with("", "x");
        assert_eq!(censor.apply("unchanged"), "unchanged");
    }

    #[test]
    fn test_debug_channels_merge_env() {
        let mut config = config_with_token("t");
        config.logger.debug = vec!["plugins".into()];

        let channels = debug_channels(&config, Some("cmds, plugins,,events"));
        assert_eq!(channels, vec!["cmds", "events", "plugins"]);
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(&[]), "info");
        assert_eq!(
            filter_directives(&["cmds".to_string(), "events".to_string()]),
            "info,cmds=debug,events=debug"
        );
    }

    #[test]
    fn test_writer_censors_file_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinboard.log");
        let file = open_log_file(&path).unwrap();

        let writer = CensoredMakeWriter::new(Censor::new().with("hunter2", "*******"), false, Some(file));
        {
            let mut line = writer.make_writer();
            line.write_all(b"password is hunter2\n").unwrap();
        }

        let mut content = String::new();
        File::open(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "password is *******\n");
    }
}
