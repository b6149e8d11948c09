use crate::{
    AppState, ChatMessage, DraftStage, Job, JobId, JobStatus, Marketplace, OfferId, Principal,
    ProviderId, Timestamp, TradeType, UrgencyLevel, UserRole,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub principal: Principal,
    pub principal_name: String,
    pub dashboard: Dashboard,
    pub draft: Option<DraftView>,
    pub chat: Option<ChatView>,
    pub notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dashboard {
    Client(ClientDashboard),
    Provider(ProviderDashboard),
    Admin(AdminDashboard),
    /// The session principal no longer exists in the store.
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDashboard {
    pub name: String,
    pub address: String,
    pub active: Vec<JobRowView>,
    pub history: Vec<JobRowView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDashboard {
    pub name: String,
    pub trade: TradeType,
    pub rating: f32,
    pub jobs_completed: u32,
    pub available: bool,
    pub feed: Vec<JobRowView>,
    pub active: Vec<JobRowView>,
    pub history: Vec<JobRowView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub jobs: Vec<JobRowView>,
    pub providers: Vec<ProviderRowView>,
    pub clients: Vec<ClientRowView>,
    pub conversations: Vec<ConversationRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub description: String,
    pub summary: Option<String>,
    pub category: TradeType,
    pub urgency: UrgencyLevel,
    pub status: JobStatus,
    pub location: String,
    pub price_estimate: Option<String>,
    pub scheduled_at: Option<Timestamp>,
    pub provider_name: Option<String>,
    pub has_image: bool,
    pub offer_count: usize,
    /// Populated only for the owning client while the job is PENDING.
    pub offers: Vec<OfferRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRowView {
    pub offer_id: OfferId,
    pub provider_id: ProviderId,
    pub provider_name: String,
    /// Rating formatted with one decimal, e.g. "4.8".
    pub provider_rating: String,
    pub provider_jobs_completed: u32,
    pub price: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRowView {
    pub provider_id: ProviderId,
    pub name: String,
    pub trade: TradeType,
    pub rating: f32,
    pub jobs_completed: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRowView {
    pub client_id: u64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRowView {
    pub job_id: JobId,
    pub client_name: String,
    pub provider_name: Option<String>,
    pub message_count: usize,
    pub last_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub editing: Option<JobId>,
    pub description: String,
    pub scheduled_at: Option<Timestamp>,
    pub review: Option<ReviewView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub category: TradeType,
    pub urgency: UrgencyLevel,
    pub estimated_price_range: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub job_id: JobId,
    pub title: String,
    pub lines: Vec<ChatLineView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLineView {
    pub sender_label: String,
    pub sender_role: UserRole,
    pub mine: bool,
    pub text: String,
    pub timestamp: Timestamp,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let market = self.market();
        let principal = self.principal();
        AppViewModel {
            principal,
            principal_name: principal_name(market, principal),
            dashboard: dashboard(market, principal),
            draft: self.draft().map(|draft| DraftView {
                editing: draft.editing,
                description: draft.description.clone(),
                scheduled_at: draft.scheduled_at,
                review: match &draft.stage {
                    DraftStage::Classifying => None,
                    DraftStage::Review(c) => Some(ReviewView {
                        category: c.category,
                        urgency: c.urgency,
                        estimated_price_range: c.estimated_price_range.clone(),
                        summary: c.summary.clone(),
                    }),
                },
            }),
            chat: self
                .chat_job()
                .and_then(|job_id| chat_view(market, principal, job_id)),
            notice: self.notice().map(ToString::to_string),
            dirty: self.is_dirty(),
        }
    }
}

fn principal_name(market: &Marketplace, principal: Principal) -> String {
    match principal {
        Principal::Client(id) => market
            .client(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("client {id}")),
        Principal::Provider(id) => market
            .provider(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("provider {id}")),
        Principal::Admin => "Admin".to_string(),
    }
}

fn dashboard(market: &Marketplace, principal: Principal) -> Dashboard {
    match principal {
        Principal::Client(id) => {
            let Some(client) = market.client(id) else {
                return Dashboard::Unknown;
            };
            let jobs = market.client_jobs(id);
            Dashboard::Client(ClientDashboard {
                name: client.name.clone(),
                address: client.address.clone(),
                active: rows(market, &jobs.active, true),
                history: rows(market, &jobs.history, false),
            })
        }
        Principal::Provider(id) => {
            let (Some(provider), Some(feed)) = (market.provider(id), market.provider_feed(id))
            else {
                return Dashboard::Unknown;
            };
            let schedule = market.provider_schedule(id);
            Dashboard::Provider(ProviderDashboard {
                name: provider.name.clone(),
                trade: provider.trade,
                rating: provider.rating,
                jobs_completed: provider.jobs_completed,
                available: feed.available,
                feed: rows(market, &feed.jobs, false),
                active: rows(market, &schedule.active, false),
                history: rows(market, &schedule.history, false),
            })
        }
        Principal::Admin => {
            let overview = market.admin_overview();
            let all: Vec<&Job> = overview.jobs.iter().collect();
            Dashboard::Admin(AdminDashboard {
                jobs: rows(market, &all, false),
                providers: overview
                    .providers
                    .iter()
                    .map(|p| ProviderRowView {
                        provider_id: p.id,
                        name: p.name.clone(),
                        trade: p.trade,
                        rating: p.rating,
                        jobs_completed: p.jobs_completed,
                        available: p.is_available,
                    })
                    .collect(),
                clients: overview
                    .clients
                    .iter()
                    .map(|c| ClientRowView {
                        client_id: c.id,
                        name: c.name.clone(),
                        address: c.address.clone(),
                    })
                    .collect(),
                conversations: overview
                    .conversations
                    .iter()
                    .map(|conv| ConversationRowView {
                        job_id: conv.job.id,
                        client_name: market
                            .client(conv.job.client_id)
                            .map(|c| c.name.clone())
                            .unwrap_or_default(),
                        provider_name: provider_name(market, conv.job.provider_id),
                        message_count: conv.message_count,
                        last_message: conv.last_message.text.clone(),
                    })
                    .collect(),
            })
        }
    }
}

fn rows(market: &Marketplace, jobs: &[&Job], with_offers: bool) -> Vec<JobRowView> {
    jobs.iter().map(|job| row(market, job, with_offers)).collect()
}

fn row(market: &Marketplace, job: &Job, with_offers: bool) -> JobRowView {
    let offers = if with_offers {
        market
            .job_offers(job.id)
            .into_iter()
            .map(|view| OfferRowView {
                offer_id: view.offer.id,
                provider_id: view.offer.provider_id,
                provider_name: view
                    .provider
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("provider {}", view.offer.provider_id)),
                provider_rating: view
                    .provider
                    .map(|p| format!("{:.1}", p.rating))
                    .unwrap_or_default(),
                provider_jobs_completed: view.provider.map_or(0, |p| p.jobs_completed),
                price: view.offer.price.clone(),
                message: view.offer.message.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };
    JobRowView {
        job_id: job.id,
        description: job.description.clone(),
        summary: job.ai_summary.clone(),
        category: job.category,
        urgency: job.urgency,
        status: job.status,
        location: job.location.clone(),
        price_estimate: job.price_estimate.clone(),
        scheduled_at: job.scheduled_at,
        provider_name: provider_name(market, job.provider_id),
        has_image: job.image.is_some(),
        offer_count: market.offer_count(job.id),
        offers,
    }
}

fn provider_name(market: &Marketplace, provider_id: Option<ProviderId>) -> Option<String> {
    provider_id.map(|id| {
        market
            .provider(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("provider {id}"))
    })
}

fn chat_view(market: &Marketplace, viewer: Principal, job_id: JobId) -> Option<ChatView> {
    market.ensure_participant(viewer, job_id).ok()?;
    let job = market.job(job_id)?;
    let title = match provider_name(market, job.provider_id) {
        Some(name) => format!("Job {} with {}", job.id, name),
        None => format!("Job {}", job.id),
    };
    let lines = market
        .job_messages(job_id)
        .into_iter()
        .map(|message| chat_line(market, viewer, message))
        .collect();
    Some(ChatView {
        job_id,
        title,
        lines,
    })
}

fn chat_line(market: &Marketplace, viewer: Principal, message: &ChatMessage) -> ChatLineView {
    ChatLineView {
        sender_label: principal_name(market, message.sender),
        sender_role: message.sender_role(),
        mine: message.sender == viewer,
        text: message.text.clone(),
        timestamp: message.timestamp,
    }
}
