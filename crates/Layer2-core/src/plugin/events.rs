//! Plugin Events - 이벤트 디스패치 표면과 이벤트 로더

use super::loader::LoadOutcome;
use super::traits::EventSource;
use crate::guard::guarded;
use async_trait::async_trait;
use futures::future::join_all;
use pinboard_foundation::{channels, Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

// ============================================================================
// EventHandler - 이벤트 핸들러 트레이트
// ============================================================================

/// 이벤트 핸들러
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> anyhow::Result<()>;
}

/// 클로저 기반 핸들러
pub struct FnEventHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnEventHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, payload: Value) -> anyhow::Result<()> {
        (self.0)(payload).await
    }
}

/// 클로저를 이벤트 핸들러로 변환
pub fn event_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnEventHandler(f))
}

// ============================================================================
// GuardedHandler - 호출마다 실패를 잡는 래퍼
// ============================================================================

/// 등록 시 감싸지는 핸들러. 실행 중 실패는 로그로만 남는다.
struct GuardedHandler {
    event: String,
    inner: Arc<dyn EventHandler>,
}

impl GuardedHandler {
    async fn invoke(&self, payload: Value) -> bool {
        match guarded(self.inner.handle(payload)).await {
            Ok(()) => true,
            Err(failure) => {
                error!(
                    target: channels::EVENTS,
                    "Handler for event {} errored:\n{}",
                    self.event,
                    failure
                );
                false
            }
        }
    }
}

// ============================================================================
// EventBus - 디스패치 표면
// ============================================================================

/// emit 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub invoked: usize,
    pub failed: usize,
}

/// 이벤트 버스 - 이벤트 이름별 핸들러 목록
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<GuardedHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// 핸들러 등록
    pub async fn on(&self, event: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event = event.into();
        let guarded = Arc::new(GuardedHandler {
            event: event.clone(),
            inner: handler,
        });

        let mut handlers = self.handlers.write().await;
        handlers.entry(event).or_default().push(guarded);
    }

    /// 이벤트 발행
    ///
    /// 핸들러 실패는 호출자에게 전파되지 않는다.
    pub async fn emit(&self, event: &str, payload: Value) -> EmitReport {
        let targets: Vec<_> = {
            let handlers = self.handlers.read().await;
            handlers.get(event).cloned().unwrap_or_default()
        };

        debug!(
            target: channels::EVENTS,
            "Emitting {} to {} handler(s)",
            event,
            targets.len()
        );

        let mut report = EmitReport::default();
        for handler in targets {
            report.invoked += 1;
            if !handler.invoke(payload.clone()).await {
                report.failed += 1;
            }
        }
        report
    }

    pub async fn handler_count(&self, event: &str) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(event).map_or(0, Vec::len)
    }

    /// 핸들러가 등록된 이벤트 이름 (정렬됨)
    pub async fn events(&self) -> Vec<String> {
        let handlers = self.handlers.read().await;
        let mut names: Vec<_> = handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 이벤트 로더
// ============================================================================

/// 이벤트 로드 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventLoadStats {
    pub total: usize,
    pub loaded: usize,
}

/// 이벤트 로드 결과
#[derive(Debug, Default)]
pub struct EventLoadReport {
    pub stats: EventLoadStats,
    pub outcome: LoadOutcome,
}

/// 모든 이벤트 소스를 병렬로 로드하고 버스에 등록
///
/// 소스 목록 조회 실패만 에러로 반환되며, 개별 소스 실패는 격리된다.
pub async fn load_events(bus: &EventBus, source: &dyn EventSource) -> Result<EventLoadReport> {
    info!(target: channels::EVENTS, "Loading events...");

    let sources = source.event_sources().await?;
    let results = join_all(sources.iter().map(|name| source.load_handler(name))).await;

    let mut report = EventLoadReport::default();
    for (name, result) in sources.into_iter().zip(results) {
        report.stats.total += 1;
        match result {
            Ok(handler) => {
                bus.on(name.clone(), handler).await;
                report.stats.loaded += 1;
                debug!(target: channels::EVENTS, "Registered handler for event {}", name);
                report.outcome.record_success(name);
            }
            Err(e) => {
                error!(target: channels::EVENTS, "Failed to load event {}:\n{}", name, e);
                let cause = match e {
                    Error::Load { .. } => e,
                    other => Error::load(name.clone(), other),
                };
                report.outcome.record_failure(name, cause);
            }
        }
    }

    info!(
        target: channels::EVENTS,
        "Loaded {}/{} event(s).",
        report.stats.loaded,
        report.stats.total
    );
    Ok(report)
}
