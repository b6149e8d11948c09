use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use fixit_core::{Classification, TradeType};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ClassifyError, FailureKind};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub endpoint: String,
    pub model: String,
    /// Without a key every request fails fast with `MissingApiKey`.
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// Infers category, urgency, price range and summary from an issue report.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        description: &str,
        image: Option<&str>,
    ) -> Result<Classification, ClassifyError>;
}

/// Result of a classification that never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub classification: Classification,
    pub fallback: Option<FailureKind>,
}

/// Runs the classifier and degrades to [`Classification::fallback`] on any error.
pub async fn classify_or_fallback(
    classifier: &dyn Classifier,
    description: &str,
    image: Option<&str>,
) -> ClassifyOutcome {
    match classifier.classify(description, image).await {
        Ok(classification) => ClassifyOutcome {
            classification,
            fallback: None,
        },
        Err(err) => {
            engine_warn!("Classification failed, using fallback: {}", err);
            ClassifyOutcome {
                classification: Classification::fallback(description),
                fallback: Some(err.kind),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    settings: ClassifierSettings,
}

impl GeminiClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ClassifyError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ClassifyError::new(FailureKind::Network, err.to_string()))
    }

    fn request_url(&self) -> Result<reqwest::Url, ClassifyError> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        );
        reqwest::Url::parse(&raw)
            .map_err(|err| ClassifyError::new(FailureKind::InvalidEndpoint, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ClassifyError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClassifyError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClassifyError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        description: &str,
        image: Option<&str>,
    ) -> Result<Classification, ClassifyError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClassifyError::new(FailureKind::MissingApiKey, "no api key configured"))?;
        let url = self.request_url()?;
        let client = self.build_client()?;
        let body = serde_json::to_vec(&request_body(description, image))
            .map_err(|err| ClassifyError::new(FailureKind::MalformedResponse, err.to_string()))?;

        engine_debug!(
            "Classifying issue via {} (chars={}, image={})",
            self.settings.model,
            description.chars().count(),
            image.is_some()
        );
        let response = client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", api_key)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = self.read_body(response).await?;
        parse_generate_response(&bytes)
    }
}

fn request_body(description: &str, image: Option<&str>) -> Value {
    let mut parts = vec![json!({
        "text": format!(
            "Analyze this home maintenance issue description: \"{description}\". \
             Categorize it, determine urgency, and estimate price."
        )
    })];
    if let Some(image) = image {
        parts.push(json!({
            "inline_data": {
                "mime_type": "image/jpeg",
                "data": strip_data_url(image),
            }
        }));
    }

    let categories: Vec<&str> = TradeType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "category": {
                        "type": "STRING",
                        "enum": categories,
                        "description": "The type of tradesperson required based on the issue."
                    },
                    "urgency": {
                        "type": "STRING",
                        "enum": ["LOW", "NORMAL", "HIGH", "EMERGENCY"],
                        "description": "The urgency level. Water leaks, gas, or power outages are EMERGENCY."
                    },
                    "estimatedPriceRange": {
                        "type": "STRING",
                        "description": "A realistic price range estimation (e.g. '$100 - $200') for this specific task."
                    },
                    "summary": {
                        "type": "STRING",
                        "description": "A professional, concise summary of the issue for a contractor."
                    }
                },
                "required": ["category", "urgency", "estimatedPriceRange", "summary"]
            }
        }
    })
}

/// Drops a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(image: &str) -> &str {
    match image.split_once(',') {
        Some((_, data)) if !data.is_empty() => data,
        _ => image,
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn parse_generate_response(bytes: &[u8]) -> Result<Classification, ClassifyError> {
    let response: GenerateResponse = serde_json::from_slice(bytes)
        .map_err(|err| ClassifyError::new(FailureKind::MalformedResponse, err.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    parse_classification(&text)
}

/// Parses the model's text answer, tolerating prose around the JSON object.
pub fn parse_classification(text: &str) -> Result<Classification, ClassifyError> {
    serde_json::from_str(extract_json(text))
        .map_err(|err| ClassifyError::new(FailureKind::MalformedResponse, err.to_string()))
}

fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClassifyError {
    if err.is_timeout() {
        return ClassifyError::new(FailureKind::Timeout, err.to_string());
    }
    ClassifyError::new(FailureKind::Network, err.to_string())
}
