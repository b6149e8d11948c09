use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use fixit_core::{Effect, Msg};
use fixit_engine::{Classifier, EngineEvent, EngineHandle};

/// Hands reducer effects to the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            engine: EngineHandle::new(classifier),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClassifyIssue {
                    request_id,
                    description,
                    image,
                } => {
                    engine_info!(
                        "ClassifyIssue request_id={} chars={} image={}",
                        request_id,
                        description.chars().count(),
                        image.is_some()
                    );
                    self.engine.classify(request_id, description, image);
                }
            }
        }
    }

    /// Collects every engine event that is ready without blocking.
    pub fn drain_messages(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Classified {
            request_id,
            classification,
            fallback,
        } => {
            if let Some(kind) = fallback {
                engine_warn!(
                    "Request {} classified with fallback after {}",
                    request_id,
                    kind
                );
            }
            Msg::ClassificationFinished {
                request_id,
                classification,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use fixit_core::{Classification, TradeType, UrgencyLevel};
    use fixit_engine::{ClassifyError, GeminiClassifier, ClassifierSettings};
    use pretty_assertions::assert_eq;

    struct Plumber;

    #[async_trait::async_trait]
    impl Classifier for Plumber {
        async fn classify(
            &self,
            _description: &str,
            _image: Option<&str>,
        ) -> Result<Classification, ClassifyError> {
            Ok(Classification {
                category: TradeType::Plumbing,
                urgency: UrgencyLevel::High,
                estimated_price_range: "$150 - $300".to_string(),
                summary: "Burst pipe".to_string(),
            })
        }
    }

    fn wait_for_messages(runner: &EffectRunner) -> Vec<Msg> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let msgs = runner.drain_messages();
            if !msgs.is_empty() || Instant::now() > deadline {
                return msgs;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn classify_effect_comes_back_as_message() {
        let runner = EffectRunner::new(Arc::new(Plumber));
        runner.enqueue(vec![Effect::ClassifyIssue {
            request_id: 4,
            description: "Pipe burst under the sink".to_string(),
            image: None,
        }]);

        let msgs = wait_for_messages(&runner);
        assert_eq!(msgs.len(), 1);
        let Msg::ClassificationFinished {
            request_id,
            classification,
        } = &msgs[0]
        else {
            panic!("expected classification");
        };
        assert_eq!(*request_id, 4);
        assert_eq!(classification.summary, "Burst pipe");
    }

    #[test]
    fn missing_api_key_yields_fallback_message() {
        let runner = EffectRunner::new(Arc::new(GeminiClassifier::new(
            ClassifierSettings::default(),
        )));
        runner.enqueue(vec![Effect::ClassifyIssue {
            request_id: 1,
            description: "Porch light flickers".to_string(),
            image: None,
        }]);

        let msgs = wait_for_messages(&runner);
        assert_eq!(
            msgs,
            vec![Msg::ClassificationFinished {
                request_id: 1,
                classification: Classification::fallback("Porch light flickers"),
            }]
        );
    }
}
