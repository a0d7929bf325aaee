//! Gemini Live WebSocket channel.
//!
//! Speaks the BidiGenerateContent protocol: one setup message after the
//! handshake, then `realtimeInput` audio chunks outbound and
//! `serverContent` transcription events inbound. Response modality must be
//! AUDIO for the native-audio model; the audio parts are acknowledged and
//! discarded since only the input transcription is used.

use anyhow::{Context, Result};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::info;

use super::channel::{ChannelConfig, LiveChannel, LiveConnector, LiveEvent};
use crate::audio::AudioEnvelope;

/// Model used for the live audio channel
pub const LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-09-2025";

const WS_ENDPOINT: &str =
    "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Opens Gemini Live channels.
pub struct GeminiLiveConnector {
    api_key: String,
    model: String,
}

impl GeminiLiveConnector {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

#[async_trait::async_trait]
impl LiveConnector for GeminiLiveConnector {
    async fn connect(
        &self,
        config: &ChannelConfig,
        events: mpsc::Sender<LiveEvent>,
    ) -> Result<Box<dyn LiveChannel>> {
        let url = format!("{}?key={}", WS_ENDPOINT, self.api_key);

        info!("Connecting to live transcription service ({})", self.model);
        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .context("WebSocket handshake with live service failed")?;

        let (mut write, mut read) = socket.split();

        let setup = serde_json::json!({
            "setup": {
                "model": format!("models/{}", self.model),
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                },
                "systemInstruction": {
                    "parts": [{ "text": config.system_instruction }],
                },
                "inputAudioTranscription": {},
            }
        });

        write
            .send(Message::Text(setup.to_string()))
            .await
            .context("Failed to send channel setup message")?;

        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(payload)) => {
                        if !deliver(&events, parse_server_message(&payload)).await {
                            return;
                        }
                    }
                    Ok(Message::Binary(payload)) => {
                        let payload = String::from_utf8_lossy(&payload);
                        if !deliver(&events, parse_server_message(&payload)).await {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        let _ = events.send(LiveEvent::Closed).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = events.send(LiveEvent::Error(e.to_string())).await;
                        return;
                    }
                }
            }
            let _ = events.send(LiveEvent::Closed).await;
        });

        Ok(Box::new(GeminiLiveChannel { write, reader }))
    }
}

/// An open Gemini Live channel (outbound half).
pub struct GeminiLiveChannel {
    write: WsSink,
    reader: JoinHandle<()>,
}

#[async_trait::async_trait]
impl LiveChannel for GeminiLiveChannel {
    async fn send_audio(&mut self, envelope: &AudioEnvelope) -> Result<()> {
        let msg = serde_json::json!({
            "realtimeInput": {
                "mediaChunks": [envelope],
            }
        });

        self.write
            .send(Message::Text(msg.to_string()))
            .await
            .context("Failed to send audio envelope")?;

        Ok(())
    }

    async fn close(&mut self) {
        let _ = self.write.send(Message::Close(None)).await;
        self.reader.abort();
    }
}

/// Map one server message onto channel events.
fn parse_server_message(payload: &str) -> Vec<LiveEvent> {
    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return Vec::new();
    };

    let mut parsed = Vec::new();

    if value.get("setupComplete").is_some() {
        parsed.push(LiveEvent::Opened);
    }

    if let Some(server_content) = value.get("serverContent") {
        // Model audio parts under `modelTurn` also land here; receiving the
        // message is enough to keep the stream alive, so they are dropped.
        if let Some(text) = server_content
            .pointer("/inputTranscription/text")
            .and_then(|t| t.as_str())
        {
            parsed.push(LiveEvent::Fragment(text.to_string()));
        }

        if server_content.get("turnComplete").and_then(Value::as_bool) == Some(true) {
            parsed.push(LiveEvent::TurnComplete);
        }
    }

    parsed
}

async fn deliver(events: &mpsc::Sender<LiveEvent>, parsed: Vec<LiveEvent>) -> bool {
    for event in parsed {
        if events.send(event).await.is_err() {
            return false;
        }
    }
    true
}
