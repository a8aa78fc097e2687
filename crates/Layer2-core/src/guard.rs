//! Invocation guard - 콜백/핸들러 실행 경계
//!
//! 에러와 panic을 모두 잡아 문자열 원인으로 변환한다.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// 실행 실패 원인
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Error(String),
    Panic(String),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(msg) => write!(f, "{}", msg),
            Self::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// future를 실행하고 에러/panic을 [`Failure`]로 변환
pub async fn guarded<F>(fut: F) -> Result<(), Failure>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Failure::Error(format!("{:#}", e))),
        Err(payload) => Err(Failure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
