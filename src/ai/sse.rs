//! Server-sent-event decoding for the streaming completion endpoints.

use super::{AiError, Provider};
use serde::Deserialize;
use std::io::BufRead;

/// One decoded `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    /// OpenAI's `data: [DONE]` end marker.
    End,
}

/// Reads `data:` lines from an SSE body, joining multi-line payloads and
/// ignoring comments and other fields.
pub fn read_events<R: BufRead>(
    reader: R,
    provider: Provider,
    mut on_event: impl FnMut(SseEvent) -> Result<(), AiError>,
) -> Result<(), AiError> {
    let mut pending: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| AiError::Transport {
            provider,
            reason: e.to_string(),
        })?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if let Some(event) = flush(&mut pending) {
                let end = event == SseEvent::End;
                on_event(event)?;
                if end {
                    return Ok(());
                }
            }
            continue;
        }
        if let Some(data) = line.strip_prefix("data:") {
            pending.push(data.strip_prefix(' ').unwrap_or(data).to_string());
        }
    }
    if let Some(event) = flush(&mut pending) {
        on_event(event)?;
    }
    Ok(())
}

fn flush(pending: &mut Vec<String>) -> Option<SseEvent> {
    if pending.is_empty() {
        return None;
    }
    let payload = pending.join("\n");
    pending.clear();
    if payload.trim() == "[DONE]" {
        return Some(SseEvent::End);
    }
    Some(SseEvent::Data(payload))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChunk {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    #[serde(default)]
    delta: OpenAiDelta,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// Extracts the text delta carried by one streamed payload.
pub fn chunk_text(provider: Provider, payload: &str) -> Result<String, AiError> {
    let decode_err = |e: serde_json::Error| AiError::Decode {
        provider,
        reason: e.to_string(),
    };
    match provider {
        Provider::OpenAi => {
            let chunk: OpenAiChunk = serde_json::from_str(payload).map_err(decode_err)?;
            if let Some(error) = chunk.error {
                return Err(AiError::Api {
                    provider,
                    message: error.message,
                });
            }
            Ok(chunk
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect())
        }
        Provider::Google => {
            let chunk: GeminiChunk = serde_json::from_str(payload).map_err(decode_err)?;
            if let Some(error) = chunk.error {
                return Err(AiError::Api {
                    provider,
                    message: error.message,
                });
            }
            Ok(chunk
                .candidates
                .into_iter()
                .take(1)
                .filter_map(|candidate| candidate.content)
                .flat_map(|content| content.parts)
                .filter_map(|part| part.text)
                .collect())
        }
    }
}
