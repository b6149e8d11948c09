//! FixItNow engine: issue classification and effect execution.
mod classify;
mod engine;
mod types;

pub use classify::{
    classify_or_fallback, parse_classification, strip_data_url, Classifier, ClassifierSettings,
    ClassifyOutcome, GeminiClassifier, DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
pub use engine::EngineHandle;
pub use types::{ClassifyError, EngineEvent, FailureKind};
