//! Slack Socket Mode WebSocket connection and envelope handling

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::application::errors::TransportError;
use crate::domain::entities::Invocation;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Raw Socket Mode envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub envelope_id: Option<String>,
    pub payload: Option<Value>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlashCommandPayload {
    command: String,
    #[serde(default)]
    text: String,
    channel_id: String,
    user_id: Option<String>,
    user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsApiPayload {
    event: EventPayload,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "type")]
    kind: String,
    channel: Option<String>,
    ts: Option<String>,
    thread_ts: Option<String>,
}

/// What the bot should do with an envelope
#[derive(Debug)]
pub enum SocketEvent {
    Hello,
    Disconnect(String),
    SlashCommand { envelope_id: String, invocation: Invocation },
    Mention { envelope_id: String, channel: String, thread_ts: String },
    Ignored { envelope_id: Option<String> },
}

impl SocketEvent {
    /// Classify an envelope. Slash commands other than `command` are ignored.
    pub fn classify(envelope: Envelope, command: &str) -> Self {
        match envelope.kind.as_str() {
            "hello" => SocketEvent::Hello,
            "disconnect" => SocketEvent::Disconnect(envelope.reason.unwrap_or_else(|| "unspecified".to_string())),
            "slash_commands" => Self::slash_command(envelope, command),
            "events_api" => Self::event(envelope),
            _ => SocketEvent::Ignored { envelope_id: envelope.envelope_id },
        }
    }

    fn slash_command(envelope: Envelope, command: &str) -> Self {
        let (Some(envelope_id), Some(payload)) = (envelope.envelope_id.clone(), envelope.payload) else {
            return SocketEvent::Ignored { envelope_id: envelope.envelope_id };
        };

        match serde_json::from_value::<SlashCommandPayload>(payload) {
            Ok(p) if p.command.eq_ignore_ascii_case(command) => {
                let invocation = Invocation::new(p.channel_id, p.text)
                    .with_command(p.command)
                    .with_platform("slack");
                let invocation = match p.user_id {
                    Some(id) => invocation.with_user(id, p.user_name),
                    None => invocation,
                };
                SocketEvent::SlashCommand { envelope_id, invocation }
            }
            Ok(p) => {
                tracing::debug!("Ignoring slash command {}", p.command);
                SocketEvent::Ignored { envelope_id: Some(envelope_id) }
            }
            Err(e) => {
                tracing::warn!("Malformed slash command payload: {}", e);
                SocketEvent::Ignored { envelope_id: Some(envelope_id) }
            }
        }
    }

    fn event(envelope: Envelope) -> Self {
        let (Some(envelope_id), Some(payload)) = (envelope.envelope_id.clone(), envelope.payload) else {
            return SocketEvent::Ignored { envelope_id: envelope.envelope_id };
        };

        match serde_json::from_value::<EventsApiPayload>(payload) {
            Ok(EventsApiPayload { event }) if event.kind == "app_mention" => {
                match (event.channel, event.thread_ts.or(event.ts)) {
                    (Some(channel), Some(thread_ts)) => SocketEvent::Mention { envelope_id, channel, thread_ts },
                    _ => SocketEvent::Ignored { envelope_id: Some(envelope_id) },
                }
            }
            _ => SocketEvent::Ignored { envelope_id: Some(envelope_id) },
        }
    }
}

pub struct SocketConnection {
    stream: WsStream,
}

impl SocketConnection {
    /// Connect to the URL returned by `apps.connections.open`
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        tracing::info!("Connecting to Slack Socket Mode");
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Network(format!("WebSocket connection failed: {}", e)))?;
        tracing::info!("WebSocket connected (status={})", response.status());
        Ok(Self { stream })
    }

    /// Acknowledge an envelope so Slack does not redeliver it
    pub async fn ack(&mut self, envelope_id: &str) -> Result<(), TransportError> {
        let ack = serde_json::json!({ "envelope_id": envelope_id }).to_string();
        self.stream
            .send(Message::Text(ack))
            .await
            .map_err(|e| TransportError::Network(format!("Failed to ack envelope: {}", e)))
    }

    /// Receive the next envelope, answering pings along the way.
    /// Returns `None` when the socket closes.
    pub async fn next_envelope(&mut self) -> Result<Option<Envelope>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => return Ok(Some(envelope)),
                    Err(e) => tracing::warn!("Unparseable Socket Mode frame: {}", e),
                },
                Some(Ok(Message::Ping(data))) => {
                    self.stream
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| TransportError::Network(format!("Failed to send pong: {}", e)))?;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("WebSocket closed: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(other)) => {
                    tracing::debug!("WS frame (ignored): {:?}", other);
                }
                Some(Err(e)) => {
                    return Err(TransportError::Network(format!("WebSocket receive error: {}", e)));
                }
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_slash_command() {
        let env = envelope(json!({
            "type": "slash_commands",
            "envelope_id": "env-1",
            "payload": {
                "command": "/crispr",
                "text": "check ATGGCAGATTCCCAGTTGGA human",
                "channel_id": "C123",
                "user_id": "U42",
                "user_name": "ada",
                "response_url": "https://hooks.slack.com/commands/x"
            }
        }));

        match SocketEvent::classify(env, "/crispr") {
            SocketEvent::SlashCommand { envelope_id, invocation } => {
                assert_eq!(envelope_id, "env-1");
                assert_eq!(invocation.channel_id, "C123");
                assert_eq!(invocation.text, "check ATGGCAGATTCCCAGTTGGA human");
                assert_eq!(invocation.display_user(), "ada");
                assert_eq!(invocation.platform, "slack");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_other_command_is_acked_but_ignored() {
        let env = envelope(json!({
            "type": "slash_commands",
            "envelope_id": "env-2",
            "payload": {"command": "/deploy", "text": "", "channel_id": "C1"}
        }));
        assert!(matches!(
            SocketEvent::classify(env, "/crispr"),
            SocketEvent::Ignored { envelope_id: Some(ref id) } if id == "env-2"
        ));
    }

    #[test]
    fn test_classify_mention_uses_thread() {
        let env = envelope(json!({
            "type": "events_api",
            "envelope_id": "env-3",
            "payload": {"event": {"type": "app_mention", "channel": "C9", "ts": "171.01", "text": "<@B1> hi"}}
        }));
        match SocketEvent::classify(env, "/crispr") {
            SocketEvent::Mention { channel, thread_ts, .. } => {
                assert_eq!(channel, "C9");
                assert_eq!(thread_ts, "171.01");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_classify_control_frames() {
        assert!(matches!(
            SocketEvent::classify(envelope(json!({"type": "hello"})), "/crispr"),
            SocketEvent::Hello
        ));
        assert!(matches!(
            SocketEvent::classify(envelope(json!({"type": "disconnect", "reason": "refresh_requested"})), "/crispr"),
            SocketEvent::Disconnect(ref r) if r == "refresh_requested"
        ));
    }
}
