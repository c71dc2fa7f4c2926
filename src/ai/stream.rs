use super::{AiError, GenerationRequest, Provider, ProviderCredential, StreamError, StreamMessage};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

/// The provider operations the UI drives. [`super::AiClient`] talks HTTP;
/// tests substitute scripted backends.
pub trait AiBackend: Send + Sync + 'static {
    /// Streams generated text through `on_chunk` and returns the full text.
    fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, AiError>;

    fn list_models(&self, provider: Provider, api_key: &str) -> Result<Vec<String>, AiError>;
}

impl<T: AiBackend + ?Sized> AiBackend for Arc<T> {
    fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, AiError> {
        (**self).generate(credential, prompt, on_chunk)
    }

    fn list_models(&self, provider: Provider, api_key: &str) -> Result<Vec<String>, AiError> {
        (**self).list_models(provider, api_key)
    }
}

pub const WORKER_EXITED: &str = "generation worker exited";

/// Terminal message for a stream whose worker went away without sending one.
pub fn worker_exited() -> StreamMessage {
    StreamMessage::Error(StreamError::Failed(WORKER_EXITED.to_string()))
}

/// Runs one generation on a worker thread. The receiver yields the chunks in
/// order, then exactly one terminal message, then disconnects.
pub fn spawn_generation<B>(backend: B, request: GenerationRequest) -> Receiver<StreamMessage>
where
    B: AiBackend,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let terminal = match &request.credential {
            None => StreamMessage::Error(StreamError::MissingCredential),
            Some(credential) => {
                let chunk_tx = tx.clone();
                let mut on_chunk = |chunk: &str| {
                    if !chunk.is_empty() {
                        let _ = chunk_tx.send(StreamMessage::Chunk(chunk.to_string()));
                    }
                };
                match backend.generate(credential, &request.prompt, &mut on_chunk) {
                    Ok(_) => StreamMessage::Done,
                    Err(err) => StreamMessage::Error(StreamError::Failed(err.to_string())),
                }
            }
        };
        let _ = tx.send(terminal);
    });
    rx
}
