use crate::ai::{spawn_generation, worker_exited, AiBackend, StreamMessage};
use crate::app::{AppEvent, Effect};
use crate::catalog::RunnerSpec;
use crate::shared::logging::Logger;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Runs detail fetches, model listings and generations off the UI thread
/// and hands their results back as [`AppEvent`]s.
pub struct Workers {
    runner: RunnerSpec,
    backend: Arc<dyn AiBackend>,
    logger: Logger,
    events_tx: Sender<AppEvent>,
    events_rx: Receiver<AppEvent>,
    generation: Option<Receiver<StreamMessage>>,
}

impl Workers {
    pub fn new(runner: RunnerSpec, backend: Arc<dyn AiBackend>, logger: Logger) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            runner,
            backend,
            logger,
            events_tx,
            events_rx,
            generation: None,
        }
    }

    pub fn has_generation(&self) -> bool {
        self.generation.is_some()
    }

    /// Starts the background work for `effect`. The picker needs the
    /// terminal and is run by the event loop itself.
    pub fn spawn(&mut self, effect: Effect) {
        match effect {
            Effect::FetchDetail(task) => {
                let runner = self.runner.clone();
                let tx = self.events_tx.clone();
                thread::spawn(move || {
                    let content = runner.show_task(&task);
                    let _ = tx.send(AppEvent::DetailLoaded { task, content });
                });
            }
            Effect::ListModels { provider, api_key } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.events_tx.clone();
                thread::spawn(move || {
                    let result = backend
                        .list_models(provider, &api_key)
                        .map_err(|err| err.to_string());
                    let _ = tx.send(AppEvent::ModelsListed { provider, result });
                });
            }
            Effect::StartGeneration(request) => {
                // A new generation replaces any unfinished one; its later
                // messages are never read.
                self.generation = Some(spawn_generation(Arc::clone(&self.backend), request));
            }
            Effect::LaunchPicker => {
                self.logger
                    .warn("picker.unsupported", "picker launch reached background workers");
            }
        }
    }

    /// Everything finished workers reported, plus at most one stream
    /// message so the loop redraws between chunks.
    pub fn poll(&mut self) -> Vec<AppEvent> {
        let mut events: Vec<AppEvent> = self.events_rx.try_iter().collect();
        if let Some(rx) = &self.generation {
            match rx.try_recv() {
                Ok(message) => {
                    if message.is_terminal() {
                        self.generation = None;
                    }
                    events.push(AppEvent::Stream(message));
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.generation = None;
                    self.logger
                        .warn("ai.generation.disconnected", "worker exited without a result");
                    events.push(AppEvent::Stream(worker_exited()));
                }
            }
        }
        events
    }
}
