//! RON configuration for the terminal front end.
//!
//! Looks for `./fixit.ron` unless a path is given on the command line. A
//! missing file means built-in defaults; a broken one is reported and also
//! falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_warn, LogDestination, DEFAULT_LOG_FILE};
use fixit_core::{
    Classification, Client, ClientId, Marketplace, Principal, Provider, Timestamp, TradeType,
    UrgencyLevel,
};
use fixit_engine::{ClassifierSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "fixit.ron";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogSettings,
    pub classifier: ClassifierConfig,
    pub seed: SeedData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub destination: LogDestination,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            destination: LogDestination::File,
            level: "info".to_string(),
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogSettings {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl ClassifierConfig {
    pub fn to_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: std::env::var(&self.api_key_env).ok(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..ClassifierSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedJob {
    pub client_id: ClientId,
    pub description: String,
    pub classification: Classification,
    /// How long ago the job was posted.
    #[serde(default)]
    pub age_minutes: i64,
    #[serde(default)]
    pub scheduled_in_hours: Option<i64>,
}

impl SeedJob {
    /// Creation and schedule times relative to `now`, or `None` on overflow.
    fn timestamps(&self, now: Timestamp) -> Option<(Timestamp, Option<Timestamp>)> {
        let created_at = now.checked_sub(self.age_minutes.checked_mul(MINUTE_MS)?)?;
        let scheduled_at = match self.scheduled_in_hours {
            Some(hours) => Some(now.checked_add(hours.checked_mul(HOUR_MS)?)?),
            None => None,
        };
        Some((created_at, scheduled_at))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub clients: Vec<Client>,
    pub providers: Vec<Provider>,
    pub jobs: Vec<SeedJob>,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            clients: vec![
                Client {
                    id: 1,
                    name: "Sarah Jenkins".to_string(),
                    address: "123 Maple Ave, Springfield".to_string(),
                },
                Client {
                    id: 2,
                    name: "Robert Miller".to_string(),
                    address: "45 Oak Lane, Springfield".to_string(),
                },
            ],
            providers: vec![
                seed_provider(3, "Mike Torque", TradeType::Plumbing, 4.8, 142),
                seed_provider(4, "Elena Watts", TradeType::Electrical, 4.9, 87),
                seed_provider(5, "Tom Chill", TradeType::Hvac, 4.5, 210),
            ],
            jobs: vec![
                SeedJob {
                    client_id: 1,
                    description: "Main circuit breaker keeps tripping when AC is on.".to_string(),
                    classification: Classification {
                        category: TradeType::Electrical,
                        urgency: UrgencyLevel::High,
                        estimated_price_range: "$200 - $450".to_string(),
                        summary: "Electrical Panel Overload".to_string(),
                    },
                    age_minutes: 60,
                    scheduled_in_hours: Some(24),
                },
                SeedJob {
                    client_id: 2,
                    description: "Kitchen sink drain is completely clogged.".to_string(),
                    classification: Classification {
                        category: TradeType::Plumbing,
                        urgency: UrgencyLevel::Normal,
                        estimated_price_range: "$100 - $200".to_string(),
                        summary: "Clogged Kitchen Drain".to_string(),
                    },
                    age_minutes: 120,
                    scheduled_in_hours: None,
                },
            ],
        }
    }
}

fn seed_provider(
    id: u64,
    name: &str,
    trade: TradeType,
    rating: f32,
    jobs_completed: u32,
) -> Provider {
    Provider {
        id,
        name: name.to_string(),
        trade,
        rating,
        jobs_completed,
        is_available: true,
    }
}

impl SeedData {
    /// Builds the session store, posting seed jobs oldest first so the newest
    /// ends up at the front. Invalid seed jobs are skipped with a warning.
    pub fn build_marketplace(&self, now: Timestamp) -> Marketplace {
        let mut market = Marketplace::new(self.clients.clone(), self.providers.clone());
        let mut jobs: Vec<&SeedJob> = self.jobs.iter().collect();
        jobs.sort_by_key(|job| std::cmp::Reverse(job.age_minutes));

        for seed in jobs {
            let Some((created_at, scheduled_at)) = seed.timestamps(now) else {
                engine_warn!(
                    "Skipping seed job for client {}: time offset out of range",
                    seed.client_id
                );
                continue;
            };
            let request = fixit_core::JobRequest {
                description: seed.description.clone(),
                classification: seed.classification.clone(),
                scheduled_at,
                image: None,
            };
            if let Err(err) =
                market.create_job(Principal::Client(seed.client_id), request, created_at)
            {
                engine_warn!("Skipping seed job for client {}: {}", seed.client_id, err);
            }
        }
        market
    }

    /// The principal a fresh session starts as.
    pub fn initial_principal(&self) -> Principal {
        self.clients
            .first()
            .map(|c| Principal::Client(c.id))
            .unwrap_or(Principal::Admin)
    }
}

/// Reads the config file. `Ok(None)` means there is no file.
pub fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
