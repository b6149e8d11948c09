//! FixItNow core: marketplace store, job lifecycle, role feeds, and the pure
//! reducer with its view models.
mod effect;
mod error;
mod feed;
mod market;
mod model;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::MarketError;
pub use feed::{AdminOverview, Conversation, JobPartition, OfferView, ProviderFeed};
pub use market::Marketplace;
pub use model::{
    ChatMessage, Classification, Client, ClientEdit, ClientId, Job, JobId, JobRequest, JobStatus,
    MessageId, Offer, OfferId, OfferRequest, Principal, Provider, ProviderEdit, ProviderId,
    Timestamp, TradeType, UrgencyLevel, UserRole,
};
pub use msg::Msg;
pub use state::{AppState, Draft, DraftStage, RequestId, MIN_DESCRIPTION_LEN};
pub use update::update;
pub use view_model::{
    AdminDashboard, AppViewModel, ChatLineView, ChatView, ClientDashboard, ClientRowView,
    ConversationRowView, Dashboard, DraftView, JobRowView, OfferRowView, ProviderDashboard,
    ProviderRowView, ReviewView,
};
