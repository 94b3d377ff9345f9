use axum::{
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio::time;
use tracing::debug;

/// Pause before the first word, as if the assistant were thinking
const THINKING_DELAY: Duration = Duration::from_millis(500);
const WORD_DELAY: Duration = Duration::from_millis(100);

/// Terminates the event stream
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// One streamed piece of the reply
#[derive(Debug, Serialize, Deserialize)]
pub struct TextDelta {
    #[serde(rename = "type")]
    pub kind: String,
    pub delta: String,
}

fn canned_reply(language: &str) -> &'static str {
    match language {
        "es" => "Hola, soy el asistente de soporte de emergencia. ¿Cómo puedo ayudarte hoy?",
        _ => "Hello, I am the emergency support assistant. How can I help you today?",
    }
}

/// Emergency support chat. Streams a canned reply word by word as server-sent
/// events, each carrying a `text-delta` JSON body, then a final `[DONE]`.
pub async fn stream_chat(
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(
        "Chat request with {} messages ({})",
        request.messages.len(),
        request.language
    );
    let reply = canned_reply(&request.language);

    let stream = async_stream::stream! {
        time::sleep(THINKING_DELAY).await;

        for word in reply.split_whitespace() {
            let delta = TextDelta {
                kind: "text-delta".to_string(),
                delta: format!("{} ", word),
            };
            if let Ok(data) = serde_json::to_string(&delta) {
                yield Ok(Event::default().data(data));
            }
            time::sleep(WORD_DELAY).await;
        }

        yield Ok(Event::default().data(DONE_MARKER));
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
