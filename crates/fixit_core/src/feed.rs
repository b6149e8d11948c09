//! Read-only, role-scoped views over the marketplace store.
use std::collections::BTreeSet;

use crate::{
    ChatMessage, Client, ClientId, Job, JobId, JobStatus, Marketplace, Offer, Provider, ProviderId,
};

/// Jobs split into ones still in play and finished ones, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPartition<'a> {
    pub active: Vec<&'a Job>,
    pub history: Vec<&'a Job>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFeed<'a> {
    /// Unavailable providers still get the list but cannot act on it.
    pub available: bool,
    pub jobs: Vec<&'a Job>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferView<'a> {
    pub offer: &'a Offer,
    pub provider: Option<&'a Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation<'a> {
    pub job: &'a Job,
    pub message_count: usize,
    pub last_message: &'a ChatMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview<'a> {
    pub jobs: &'a [Job],
    pub providers: &'a [Provider],
    pub clients: &'a [Client],
    pub conversations: Vec<Conversation<'a>>,
}

impl Marketplace {
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    pub fn provider(&self, provider_id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == provider_id)
    }

    pub fn client(&self, client_id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == client_id)
    }

    pub fn declined_jobs(&self, provider_id: ProviderId) -> Option<&BTreeSet<JobId>> {
        self.declined.get(&provider_id)
    }

    pub fn client_jobs(&self, client_id: ClientId) -> JobPartition<'_> {
        let (history, active): (Vec<&Job>, Vec<&Job>) = self
            .jobs
            .iter()
            .filter(|j| j.client_id == client_id)
            .partition(|j| j.status.is_terminal());
        JobPartition { active, history }
    }

    /// Open jobs routed to the provider's trade (plus catch-all categories),
    /// minus the ones the provider declined. `None` for an unknown provider.
    pub fn provider_feed(&self, provider_id: ProviderId) -> Option<ProviderFeed<'_>> {
        let provider = self.provider(provider_id)?;
        let declined = self.declined.get(&provider_id);
        let jobs = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .filter(|j| provider.trade.serves(j.category))
            .filter(|j| declined.map_or(true, |set| !set.contains(&j.id)))
            .collect();
        Some(ProviderFeed {
            available: provider.is_available,
            jobs,
        })
    }

    pub fn provider_schedule(&self, provider_id: ProviderId) -> JobPartition<'_> {
        let mut schedule = JobPartition::default();
        for job in self.jobs.iter().filter(|j| j.provider_id == Some(provider_id)) {
            match job.status {
                JobStatus::Matched | JobStatus::InProgress => schedule.active.push(job),
                JobStatus::Completed => schedule.history.push(job),
                JobStatus::Pending | JobStatus::Cancelled => {}
            }
        }
        schedule
    }

    /// Live offers on a PENDING job, resolved to their providers.
    pub fn job_offers(&self, job_id: JobId) -> Vec<OfferView<'_>> {
        match self.job(job_id) {
            Some(job) if job.status == JobStatus::Pending => self
                .offers
                .iter()
                .filter(|o| o.job_id == job_id)
                .map(|offer| OfferView {
                    offer,
                    provider: self.provider(offer.provider_id),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn offer_count(&self, job_id: JobId) -> usize {
        self.offers.iter().filter(|o| o.job_id == job_id).count()
    }

    pub fn job_messages(&self, job_id: JobId) -> Vec<&ChatMessage> {
        self.messages.iter().filter(|m| m.job_id == job_id).collect()
    }

    /// Jobs with at least one chat message, in store order.
    pub fn active_conversations(&self) -> Vec<Conversation<'_>> {
        self.jobs
            .iter()
            .filter_map(|job| {
                let thread = self.job_messages(job.id);
                thread.last().map(|last| Conversation {
                    job,
                    message_count: thread.len(),
                    last_message: *last,
                })
            })
            .collect()
    }

    pub fn admin_overview(&self) -> AdminOverview<'_> {
        AdminOverview {
            jobs: &self.jobs,
            providers: &self.providers,
            clients: &self.clients,
            conversations: self.active_conversations(),
        }
    }
}
