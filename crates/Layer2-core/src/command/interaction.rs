//! Interaction - 커맨드 호출 컨텍스트와 응답 상태 머신
//!
//! ```text
//! NotResponded ──defer()──▶ Deferred
//!      │                       │
//!   reply()               edit_reply()
//!      ▼                       ▼
//!  Responded ◀─────────────────┘
//!      │
//!  follow_up() (Responded 유지)
//! ```

use async_trait::async_trait;
use pinboard_foundation::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// ResponseState - 응답 상태
// ============================================================================

/// 호출 컨텍스트의 응답 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseState {
    #[default]
    NotResponded,
    Deferred,
    Responded,
}

/// 상태에 따라 선택되는 완료 프리미티브
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Reply,
    EditReply,
    FollowUp,
}

impl ResponseState {
    /// 현재 상태에서 응답할 때 사용할 프리미티브
    pub fn completion(&self) -> Completion {
        match self {
            Self::NotResponded => Completion::Reply,
            Self::Deferred => Completion::EditReply,
            Self::Responded => Completion::FollowUp,
        }
    }

    /// `NotResponded -> Deferred` (한 번만 가능)
    pub fn defer(self) -> Option<Self> {
        match self {
            Self::NotResponded => Some(Self::Deferred),
            _ => None,
        }
    }

    /// 어떤 상태에서든 응답 후에는 `Responded`
    pub fn respond(self) -> Self {
        Self::Responded
    }

    pub fn is_acknowledged(&self) -> bool {
        !matches!(self, Self::NotResponded)
    }
}

// ============================================================================
// InteractionResponder - 응답 전송 (외부 협력자)
// ============================================================================

/// 호출에 대한 응답을 실제로 전송하는 인터페이스
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn reply(&self, content: &str) -> Result<()>;

    async fn defer(&self) -> Result<()>;

    async fn edit_reply(&self, content: &str) -> Result<()>;

    async fn follow_up(&self, content: &str) -> Result<()>;
}

// ============================================================================
// Interaction - 호출 컨텍스트
// ============================================================================

/// 호출한 사용자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionUser {
    pub id: String,
    pub tag: String,
}

impl InteractionUser {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }

    /// 멘션 문자열
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

struct InteractionInner {
    command_name: String,
    user: InteractionUser,
    guild_id: Option<String>,
    options: Value,
    state: Mutex<ResponseState>,
    responder: Arc<dyn InteractionResponder>,
}

/// 커맨드 호출 컨텍스트 (복제해도 같은 상태를 공유)
#[derive(Clone)]
pub struct Interaction {
    inner: Arc<InteractionInner>,
}

impl Interaction {
    pub fn new(
        command_name: impl Into<String>,
        user: InteractionUser,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self::build(command_name.into(), user, None, Value::Null, responder)
    }

    fn build(
        command_name: String,
        user: InteractionUser,
        guild_id: Option<String>,
        options: Value,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            inner: Arc::new(InteractionInner {
                command_name,
                user,
                guild_id,
                options,
                state: Mutex::new(ResponseState::NotResponded),
                responder,
            }),
        }
    }

    /// 길드 ID 지정 (생성 직후에만 사용)
    pub fn in_guild(self, guild_id: impl Into<String>) -> Self {
        let inner = &self.inner;
        Self::build(
            inner.command_name.clone(),
            inner.user.clone(),
            Some(guild_id.into()),
            inner.options.clone(),
            Arc::clone(&inner.responder),
        )
    }

    /// 옵션 지정 (생성 직후에만 사용)
    pub fn with_options(self, options: Value) -> Self {
        let inner = &self.inner;
        Self::build(
            inner.command_name.clone(),
            inner.user.clone(),
            inner.guild_id.clone(),
            options,
            Arc::clone(&inner.responder),
        )
    }

    pub fn command_name(&self) -> &str {
        &self.inner.command_name
    }

    pub fn user(&self) -> &InteractionUser {
        &self.inner.user
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.inner.guild_id.as_deref()
    }

    pub fn options(&self) -> &Value {
        &self.inner.options
    }

    pub async fn state(&self) -> ResponseState {
        *self.inner.state.lock().await
    }

    /// 응답 지연 (`NotResponded`에서만 가능)
    pub async fn defer(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let next = state.defer().ok_or_else(|| {
            Error::invocation(
                self.command_name(),
                format!("cannot defer an interaction in state {:?}", *state),
            )
        })?;

        self.inner.responder.defer().await?;
        *state = next;
        Ok(())
    }

    /// 상태에 맞는 프리미티브로 응답
    ///
    /// 전송이 실패하면 상태는 바뀌지 않는다.
    pub async fn respond(&self, content: &str) -> Result<Completion> {
        let mut state = self.inner.state.lock().await;
        let completion = state.completion();

        match completion {
            Completion::Reply => self.inner.responder.reply(content).await?,
            Completion::EditReply => self.inner.responder.edit_reply(content).await?,
            Completion::FollowUp => self.inner.responder.follow_up(content).await?,
        }

        *state = state.respond();
        Ok(completion)
    }

    /// 추가 메시지 전송 (첫 응답 이후에만 가능)
    pub async fn follow_up(&self, content: &str) -> Result<()> {
        let state = self.inner.state.lock().await;
        if *state != ResponseState::Responded {
            return Err(Error::invocation(
                self.command_name(),
                format!("cannot follow up an interaction in state {:?}", *state),
            ));
        }

        self.inner.responder.follow_up(content).await
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("command_name", &self.inner.command_name)
            .field("user", &self.inner.user)
            .field("guild_id", &self.inner.guild_id)
            .finish()
    }
}

// ============================================================================
// RecordingResponder - 응답 기록 (테스트/로컬 호출용)
// ============================================================================

/// 전송된 응답을 메모리에 기록하는 responder
#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<(Completion, String)>>,
    deferred: Mutex<bool>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(Completion, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn was_deferred(&self) -> bool {
        *self.deferred.lock().await
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn reply(&self, content: &str) -> Result<()> {
        self.sent.lock().await.push((Completion::Reply, content.to_string()));
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        *self.deferred.lock().await = true;
        Ok(())
    }

    async fn edit_reply(&self, content: &str) -> Result<()> {
        self.sent.lock().await.push((Completion::EditReply, content.to_string()));
        Ok(())
    }

    async fn follow_up(&self, content: &str) -> Result<()> {
        self.sent.lock().await.push((Completion::FollowUp, content.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(responder: &Arc<RecordingResponder>) -> Interaction {
        Interaction::new(
            "ping",
            InteractionUser::new("1", "user#0001"),
            Arc::clone(responder) as Arc<dyn InteractionResponder>,
        )
        .in_guild("42")
    }

    #[test]
    fn test_state_transitions() {
        let state = ResponseState::NotResponded;
        assert_eq!(state.completion(), Completion::Reply);

        let deferred = state.defer().unwrap();
        assert_eq!(deferred.completion(), Completion::EditReply);
        assert!(deferred.defer().is_none());

        let responded = deferred.respond();
        assert_eq!(responded.completion(), Completion::FollowUp);
        assert!(responded.defer().is_none());
    }

    #[tokio::test]
    async fn test_reply_then_follow_up() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = interaction(&responder);

        assert_eq!(ctx.respond("first").await.unwrap(), Completion::Reply);
        assert_eq!(ctx.respond("second").await.unwrap(), Completion::FollowUp);

        let sent = responder.sent().await;
        assert_eq!(
            sent,
            vec![
                (Completion::Reply, "first".to_string()),
                (Completion::FollowUp, "second".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_deferred_uses_edit_reply() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = interaction(&responder);

        ctx.defer().await.unwrap();
        assert!(responder.was_deferred().await);
        assert_eq!(ctx.state().await, ResponseState::Deferred);

        assert_eq!(ctx.respond("done").await.unwrap(), Completion::EditReply);
        assert_eq!(ctx.state().await, ResponseState::Responded);
        assert!(ctx.defer().await.is_err());
    }

    #[tokio::test]
    async fn test_follow_up_requires_response() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = interaction(&responder);

        assert!(ctx.follow_up("too early").await.is_err());
        ctx.respond("hi").await.unwrap();
        ctx.follow_up("later").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = interaction(&responder);
        let other = ctx.clone();

        ctx.respond("hi").await.unwrap();
        assert_eq!(other.state().await, ResponseState::Responded);
        assert_eq!(other.guild_id(), Some("42"));
    }
}
