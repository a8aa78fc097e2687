//! Discord HTTP API 전송 계층

use super::{CommandScope, CommandTransport, RemoteCommand};
use crate::command::CommandData;
use async_trait::async_trait;
use parking_lot::RwLock;
use pinboard_foundation::{channels, Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Application {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PartialGuild {
    id: String,
}

/// REST 기반 전송 계층
///
/// `login()`이 애플리케이션 ID를 가져온 뒤부터 준비 상태가 된다.
pub struct RestTransport {
    client: Client,
    api_base: String,
    token: String,
    application_id: RwLock<Option<String>>,
}

impl RestTransport {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            application_id: RwLock::new(None),
        })
    }

    pub fn application_id(&self) -> Option<String> {
        self.application_id.read().clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn scope_path(&self, scope: &CommandScope) -> Result<String> {
        let app = self.application_id().ok_or_else(|| {
            Error::NotReady("Pinboard must be logged in before calling the command API.".into())
        })?;

        Ok(match scope {
            CommandScope::Global => format!("/applications/{}/commands", app),
            CommandScope::Guild(guild) => {
                format!("/applications/{}/guilds/{}/commands", app, guild)
            }
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response: Response = request
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "{} {}",
                status,
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid response body: {}", e)))
    }
}

#[async_trait]
impl CommandTransport for RestTransport {
    async fn login(&self) -> Result<()> {
        let app: Application = self
            .send(self.client.get(self.url("/oauth2/applications/@me")))
            .await?;

        info!(target: channels::TRANSPORT, "Logged in as application {}", app.id);
        *self.application_id.write() = Some(app.id);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.application_id.read().is_some()
    }

    async fn fetch_commands(&self, scope: &CommandScope) -> Result<Vec<RemoteCommand>> {
        let path = self.scope_path(scope)?;
        debug!(target: channels::TRANSPORT, "GET {}", path);
        self.send(self.client.get(self.url(&path))).await
    }

    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandData],
    ) -> Result<Vec<RemoteCommand>> {
        let path = self.scope_path(scope)?;
        debug!(
            target: channels::TRANSPORT,
            "PUT {} ({} command(s))",
            path,
            commands.len()
        );
        self.send(self.client.put(self.url(&path)).json(commands))
            .await
    }

    async fn guild_ids(&self) -> Result<Vec<String>> {
        let guilds: Vec<PartialGuild> = self
            .send(self.client.get(self.url("/users/@me/guilds")))
            .await?;
        Ok(guilds.into_iter().map(|g| g.id).collect())
    }
}
