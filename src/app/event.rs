use crate::ai::{GenerationRequest, Provider, StreamMessage};
use crossterm::event::KeyEvent;

/// Everything the state machine reacts to: operator input plus the results
/// background workers report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    /// Terminal size changed; forces a detail refetch for re-wrapping.
    Resize,
    DetailLoaded {
        task: String,
        content: String,
    },
    ModelsListed {
        provider: Provider,
        result: Result<Vec<String>, String>,
    },
    /// Captured picker output, `None` when the picker was cancelled.
    PickerFinished(Option<String>),
    Stream(StreamMessage),
}

/// Work the state machine asks its host to run. None of these block the
/// state machine; their outcomes come back as [`AppEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchDetail(String),
    StartGeneration(GenerationRequest),
    ListModels { provider: Provider, api_key: String },
    LaunchPicker,
}
