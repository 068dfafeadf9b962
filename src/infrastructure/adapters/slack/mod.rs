//! Slack adapter
//!
//! Slash commands arrive over Socket Mode; replies go out through the Web API.

mod socket;

pub use socket::{Envelope, SocketConnection, SocketEvent};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::TransportError;
use crate::application::messaging::CommandDispatcher;
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::SlackConfig;

/// Common envelope of every Web API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    mrkdwn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ts: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    user_id: String,
    user: String,
    #[serde(default)]
    team: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    url: String,
}

/// Slack bot adapter
pub struct SlackAdapter {
    bot_token: String,
    app_token: String,
    api_base: String,
    command: String,
    reconnect_delay: Duration,
    client: Client,
    info: BotInfo,
}

impl SlackAdapter {
    pub fn new(
        bot_token: impl Into<String>,
        app_token: impl Into<String>,
        command: impl Into<String>,
        config: &SlackConfig,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            app_token: app_token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            command: command.into(),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_seconds),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "crispr-bot".to_string(),
                team: String::new(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// POST to a Web API method and unwrap the `ok` envelope
    async fn call<T, B>(&self, method: &str, token: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let mut request = self.client.post(self.api_url(method)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        if !data.ok {
            let error = data.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(TransportError::Rejected(format!("{}: {}", method, error)));
        }

        data.data
            .ok_or_else(|| TransportError::Parse(format!("{}: empty response", method)))
    }

    /// Verify the bot token and fetch identity via `auth.test`
    pub async fn fetch_bot_info(&mut self) -> Result<(), TransportError> {
        let data: AuthTestResponse = self
            .call("auth.test", &self.bot_token, None::<&()>)
            .await?;

        self.info = BotInfo {
            id: data.user_id,
            name: data.user,
            team: data.team,
        };

        Ok(())
    }

    /// Obtain a fresh Socket Mode WebSocket URL
    pub async fn open_connection(&self) -> Result<String, TransportError> {
        let data: ConnectionsOpenResponse = self
            .call("apps.connections.open", &self.app_token, None::<&()>)
            .await?;
        Ok(data.url)
    }

    async fn post_message(&self, request: &PostMessageRequest<'_>) -> Result<String, TransportError> {
        let data: PostMessageResponse = self
            .call("chat.postMessage", &self.bot_token, Some(request))
            .await?;
        Ok(data.ts)
    }

    /// Serve Socket Mode until the task is cancelled, reconnecting whenever
    /// the connection drops.
    pub async fn run(&self, dispatcher: Arc<CommandDispatcher>) {
        loop {
            match self.serve_connection(&dispatcher).await {
                Ok(()) => tracing::info!("Socket Mode connection ended, reconnecting"),
                Err(e) => tracing::error!("Socket Mode error: {}", e),
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn serve_connection(&self, dispatcher: &Arc<CommandDispatcher>) -> Result<(), TransportError> {
        let url = self.open_connection().await?;
        let mut socket = SocketConnection::connect(&url).await?;

        while let Some(envelope) = socket.next_envelope().await? {
            match SocketEvent::classify(envelope, &self.command) {
                SocketEvent::Hello => tracing::info!("Socket Mode ready as {}", self.info.name),
                SocketEvent::Disconnect(reason) => {
                    tracing::info!("Slack requested disconnect: {}", reason);
                    return Ok(());
                }
                SocketEvent::SlashCommand { envelope_id, invocation } => {
                    socket.ack(&envelope_id).await?;
                    dispatcher.spawn(invocation);
                }
                SocketEvent::Mention { envelope_id, channel, thread_ts } => {
                    socket.ack(&envelope_id).await?;
                    let dispatcher = Arc::clone(dispatcher);
                    tokio::spawn(async move { dispatcher.reply_help(&channel, &thread_ts).await });
                }
                SocketEvent::Ignored { envelope_id } => {
                    if let Some(id) = envelope_id {
                        socket.ack(&id).await?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Bot for SlackAdapter {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, TransportError> {
        self.post_message(&PostMessageRequest {
            channel: channel_id,
            text,
            mrkdwn: true,
            thread_ts: None,
        })
        .await
    }

    async fn send_thread_reply(&self, channel_id: &str, thread_ts: &str, text: &str) -> Result<String, TransportError> {
        self.post_message(&PostMessageRequest {
            channel: channel_id,
            text,
            mrkdwn: true,
            thread_ts: Some(thread_ts),
        })
        .await
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
