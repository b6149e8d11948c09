use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type JobId = u64;
pub type ClientId = u64;
pub type ProviderId = u64;
pub type OfferId = u64;
pub type MessageId = u64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    Plumbing,
    Electrical,
    Hvac,
    Painting,
    General,
    Other,
}

impl TradeType {
    pub const ALL: [TradeType; 6] = [
        TradeType::Plumbing,
        TradeType::Electrical,
        TradeType::Hvac,
        TradeType::Painting,
        TradeType::General,
        TradeType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TradeType::Plumbing => "PLUMBING",
            TradeType::Electrical => "ELECTRICAL",
            TradeType::Hvac => "HVAC",
            TradeType::Painting => "PAINTING",
            TradeType::General => "GENERAL",
            TradeType::Other => "OTHER",
        }
    }

    /// Catch-all categories are routed to every trade.
    pub fn is_catch_all(self) -> bool {
        matches!(self, TradeType::General | TradeType::Other)
    }

    /// Whether a provider of this trade sees jobs of `category` in the feed.
    pub fn serves(self, category: TradeType) -> bool {
        category == self || category.is_catch_all()
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TradeType::ALL
            .into_iter()
            .find(|trade| trade.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown trade '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Low,
    Normal,
    High,
    Emergency,
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UrgencyLevel::Low => "LOW",
            UrgencyLevel::Normal => "NORMAL",
            UrgencyLevel::High => "HIGH",
            UrgencyLevel::Emergency => "EMERGENCY",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Matched,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Statuses in which a job carries an assigned provider.
    pub fn has_provider(self) -> bool {
        matches!(
            self,
            JobStatus::Matched | JobStatus::InProgress | JobStatus::Completed
        )
    }

    /// The single transition table for the job lifecycle.
    ///
    /// `Matched -> Matched` is an administrative reassignment.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Matched)
                | (JobStatus::Matched, JobStatus::Matched)
                | (JobStatus::Matched, JobStatus::InProgress)
                | (JobStatus::InProgress, JobStatus::Completed)
                | (JobStatus::Pending, JobStatus::Cancelled)
                | (JobStatus::Matched, JobStatus::Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Matched => "MATCHED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Client,
    Provider,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserRole::Client => "client",
            UserRole::Provider => "provider",
            UserRole::Admin => "admin",
        };
        f.write_str(label)
    }
}

/// The user acting in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Principal {
    Client(ClientId),
    Provider(ProviderId),
    #[default]
    Admin,
}

impl Principal {
    pub fn role(self) -> UserRole {
        match self {
            Principal::Client(_) => UserRole::Client,
            Principal::Provider(_) => UserRole::Provider,
            Principal::Admin => UserRole::Admin,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Client(id) => write!(f, "client {id}"),
            Principal::Provider(id) => write!(f, "provider {id}"),
            Principal::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub trade: TradeType,
    pub rating: f32,
    pub jobs_completed: u32,
    pub is_available: bool,
}

/// Structured result of the issue classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: TradeType,
    pub urgency: UrgencyLevel,
    pub estimated_price_range: String,
    pub summary: String,
}

impl Classification {
    pub const UNAVAILABLE_PRICE: &'static str = "$100 - $300 (Est. Unavailable)";

    /// Deterministic result used whenever the classifier fails.
    pub fn fallback(description: &str) -> Self {
        Self {
            category: TradeType::General,
            urgency: UrgencyLevel::Normal,
            estimated_price_range: Self::UNAVAILABLE_PRICE.to_string(),
            summary: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub client_id: ClientId,
    pub description: String,
    pub category: TradeType,
    pub urgency: UrgencyLevel,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub scheduled_at: Option<Timestamp>,
    pub provider_id: Option<ProviderId>,
    pub price_estimate: Option<String>,
    pub location: String,
    pub image: Option<String>,
    pub ai_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub job_id: JobId,
    pub provider_id: ProviderId,
    pub price: String,
    pub message: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub job_id: JobId,
    pub sender: Principal,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn sender_role(&self) -> UserRole {
        self.sender.role()
    }
}

/// Input for posting a new job or editing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub description: String,
    pub classification: Classification,
    pub scheduled_at: Option<Timestamp>,
    pub image: Option<String>,
}

/// A provider's bid, validated before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRequest {
    pub price: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEdit {
    pub provider_id: ProviderId,
    pub name: String,
    pub trade: TradeType,
    pub rating: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEdit {
    pub client_id: ClientId,
    pub name: String,
    pub address: String,
}
