use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use fixit_core::{Classification, RequestId};

use crate::classify::{classify_or_fallback, Classifier};
use crate::{EngineEvent, FailureKind};

enum EngineCommand {
    Classify {
        request_id: RequestId,
        description: String,
        image: Option<String>,
    },
}

/// Runs classification requests on a background tokio runtime and reports
/// results as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(runtime) => {
                while let Ok(command) = cmd_rx.recv() {
                    let classifier = classifier.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(classifier.as_ref(), command, event_tx).await;
                    });
                }
            }
            Err(err) => {
                engine_error!("Failed to start engine runtime: {}", err);
                // Classification must never block posting; answer with fallbacks.
                while let Ok(command) = cmd_rx.recv() {
                    let EngineCommand::Classify {
                        request_id,
                        description,
                        ..
                    } = command;
                    let _ = event_tx.send(EngineEvent::Classified {
                        request_id,
                        classification: Classification::fallback(&description),
                        fallback: Some(FailureKind::Network),
                    });
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn classify(
        &self,
        request_id: RequestId,
        description: impl Into<String>,
        image: Option<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Classify {
            request_id,
            description: description.into(),
            image,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    classifier: &dyn Classifier,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Classify {
            request_id,
            description,
            image,
        } => {
            let outcome = classify_or_fallback(classifier, &description, image.as_deref()).await;
            engine_info!(
                "Classification {} done category={} urgency={} fallback={:?}",
                request_id,
                outcome.classification.category,
                outcome.classification.urgency,
                outcome.fallback
            );
            let _ = event_tx.send(EngineEvent::Classified {
                request_id,
                classification: outcome.classification,
                fallback: outcome.fallback,
            });
        }
    }
}
