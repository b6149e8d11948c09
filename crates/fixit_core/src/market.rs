use std::collections::{BTreeMap, BTreeSet};

use engine_logging::{engine_debug, engine_info};

use crate::{
    ChatMessage, Client, ClientEdit, ClientId, Job, JobId, JobRequest, JobStatus, MarketError,
    MessageId, Offer, OfferId, OfferRequest, Principal, Provider, ProviderEdit, ProviderId,
    Timestamp, UserRole,
};

/// In-memory marketplace store: clients, providers, jobs, offers, chat and
/// per-provider decline sets.
///
/// Every mutation validates against the current state before touching it, so
/// a rejected call leaves the store exactly as it was.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marketplace {
    pub(crate) clients: Vec<Client>,
    pub(crate) providers: Vec<Provider>,
    /// Most recent first.
    pub(crate) jobs: Vec<Job>,
    pub(crate) offers: Vec<Offer>,
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) declined: BTreeMap<ProviderId, BTreeSet<JobId>>,
    next_id: u64,
}

impl Marketplace {
    pub fn new(clients: Vec<Client>, providers: Vec<Provider>) -> Self {
        let max_seeded = clients
            .iter()
            .map(|c| c.id)
            .chain(providers.iter().map(|p| p.id))
            .max()
            .unwrap_or(0);
        Self {
            clients,
            providers,
            next_id: max_seeded + 1,
            ..Self::default()
        }
    }

    pub fn create_job(
        &mut self,
        actor: Principal,
        request: JobRequest,
        now: Timestamp,
    ) -> Result<JobId, MarketError> {
        let client_id = require_client(actor, "post a job")?;
        let location = self.find_client(client_id)?.address.clone();
        require_text("description", &request.description)?;

        let id = self.allocate_id();
        let JobRequest {
            description,
            classification,
            scheduled_at,
            image,
        } = request;
        let job = Job {
            id,
            client_id,
            description,
            category: classification.category,
            urgency: classification.urgency,
            status: JobStatus::Pending,
            created_at: now,
            scheduled_at,
            provider_id: None,
            price_estimate: Some(classification.estimated_price_range),
            location,
            image,
            ai_summary: Some(classification.summary),
        };
        engine_info!(
            "Job {} posted by client {} category={} urgency={}",
            id,
            client_id,
            job.category,
            job.urgency
        );
        self.jobs.insert(0, job);
        Ok(id)
    }

    /// Replaces the editable fields of a PENDING job owned by `actor`.
    pub fn update_job(
        &mut self,
        actor: Principal,
        job_id: JobId,
        request: JobRequest,
    ) -> Result<(), MarketError> {
        let client_id = require_client(actor, "edit a job")?;
        let idx = self.editable_job_index(client_id, job_id)?;
        require_text("description", &request.description)?;

        let job = &mut self.jobs[idx];
        job.description = request.description;
        job.category = request.classification.category;
        job.urgency = request.classification.urgency;
        job.scheduled_at = request.scheduled_at;
        job.image = request.image;
        job.price_estimate = Some(request.classification.estimated_price_range);
        job.ai_summary = Some(request.classification.summary);
        engine_info!("Job {} edited by client {}", job_id, client_id);
        Ok(())
    }

    /// Checks that `client_id` may still edit `job_id`.
    pub fn ensure_editable(&self, client_id: ClientId, job_id: JobId) -> Result<(), MarketError> {
        self.editable_job_index(client_id, job_id).map(|_| ())
    }

    /// Checks that `actor` may read and write the chat thread of `job_id`:
    /// the owning client, the assigned provider, or the admin.
    pub fn ensure_participant(&self, actor: Principal, job_id: JobId) -> Result<(), MarketError> {
        let job = &self.jobs[self.job_index(job_id)?];
        let participant = match actor {
            Principal::Client(id) => job.client_id == id,
            Principal::Provider(id) => job.provider_id == Some(id),
            Principal::Admin => true,
        };
        if participant {
            Ok(())
        } else {
            Err(MarketError::NotParticipant {
                principal: actor,
                job_id,
            })
        }
    }

    pub fn submit_offer(
        &mut self,
        actor: Principal,
        job_id: JobId,
        request: OfferRequest,
        now: Timestamp,
    ) -> Result<OfferId, MarketError> {
        let provider_id = require_provider(actor, "submit an offer")?;
        let provider = self.find_provider(provider_id)?;
        let job = &self.jobs[self.job_index(job_id)?];
        if job.status != JobStatus::Pending {
            return Err(MarketError::NotPending {
                job_id,
                status: job.status,
            });
        }
        if !provider.is_available {
            return Err(MarketError::ProviderUnavailable(provider_id));
        }
        require_text("price", &request.price)?;
        require_text("message", &request.message)?;
        if self
            .offers
            .iter()
            .any(|o| o.job_id == job_id && o.provider_id == provider_id)
        {
            return Err(MarketError::DuplicateOffer {
                provider_id,
                job_id,
            });
        }

        let id = self.allocate_id();
        engine_info!(
            "Offer {} on job {} from provider {} price={}",
            id,
            job_id,
            provider_id,
            request.price
        );
        self.offers.push(Offer {
            id,
            job_id,
            provider_id,
            price: request.price,
            message: request.message,
            timestamp: now,
        });
        Ok(id)
    }

    /// Hides a job from the provider's feed. Returns `false` if it was already
    /// declined.
    pub fn decline_job(&mut self, actor: Principal, job_id: JobId) -> Result<bool, MarketError> {
        let provider_id = require_provider(actor, "decline a job")?;
        self.find_provider(provider_id)?;
        self.job_index(job_id)?;
        let inserted = self.declined.entry(provider_id).or_default().insert(job_id);
        engine_debug!(
            "Provider {} declined job {} (new={})",
            provider_id,
            job_id,
            inserted
        );
        Ok(inserted)
    }

    /// Matches the job to the offering provider at the offered price and
    /// discards every offer on the job.
    pub fn accept_offer(
        &mut self,
        actor: Principal,
        job_id: JobId,
        offer_id: OfferId,
    ) -> Result<(), MarketError> {
        let client_id = require_client(actor, "accept an offer")?;
        let idx = self.owned_job_index(client_id, job_id)?;
        let offer = self
            .offers
            .iter()
            .find(|o| o.id == offer_id)
            .ok_or(MarketError::UnknownOffer(offer_id))?;
        if offer.job_id != job_id {
            return Err(MarketError::OfferJobMismatch { offer_id, job_id });
        }
        let status = self.jobs[idx].status;
        if status != JobStatus::Pending {
            return Err(MarketError::InvalidTransition {
                job_id,
                from: status,
                to: JobStatus::Matched,
            });
        }
        let provider_id = offer.provider_id;
        let price = offer.price.clone();

        let job = &mut self.jobs[idx];
        job.status = JobStatus::Matched;
        job.provider_id = Some(provider_id);
        job.price_estimate = Some(price);
        self.purge_offers(job_id);
        engine_info!(
            "Job {} matched to provider {} via offer {}",
            job_id,
            provider_id,
            offer_id
        );
        Ok(())
    }

    /// Administrative direct assignment, bypassing offers.
    pub fn assign_job(
        &mut self,
        actor: Principal,
        job_id: JobId,
        provider_id: ProviderId,
    ) -> Result<(), MarketError> {
        require_admin(actor, "assign a job")?;
        let idx = self.job_index(job_id)?;
        self.find_provider(provider_id)?;
        self.check_transition(idx, JobStatus::Matched)?;

        let job = &mut self.jobs[idx];
        job.status = JobStatus::Matched;
        job.provider_id = Some(provider_id);
        self.purge_offers(job_id);
        engine_info!("Job {} assigned to provider {} by admin", job_id, provider_id);
        Ok(())
    }

    pub fn start_job(&mut self, actor: Principal, job_id: JobId) -> Result<(), MarketError> {
        let provider_id = require_provider(actor, "start a job")?;
        let idx = self.assigned_job_index(provider_id, job_id)?;
        self.check_transition(idx, JobStatus::InProgress)?;
        self.jobs[idx].status = JobStatus::InProgress;
        engine_info!("Job {} started by provider {}", job_id, provider_id);
        Ok(())
    }

    /// Completes an IN_PROGRESS job and credits the provider.
    pub fn complete_job(&mut self, actor: Principal, job_id: JobId) -> Result<(), MarketError> {
        let provider_id = require_provider(actor, "complete a job")?;
        let idx = self.assigned_job_index(provider_id, job_id)?;
        let provider_idx = self.provider_index(provider_id)?;
        self.check_transition(idx, JobStatus::Completed)?;

        self.jobs[idx].status = JobStatus::Completed;
        self.providers[provider_idx].jobs_completed += 1;
        engine_info!("Job {} completed by provider {}", job_id, provider_id);
        Ok(())
    }

    pub fn cancel_job(&mut self, actor: Principal, job_id: JobId) -> Result<(), MarketError> {
        let client_id = require_client(actor, "cancel a job")?;
        let idx = self.owned_job_index(client_id, job_id)?;
        self.check_transition(idx, JobStatus::Cancelled)?;

        let job = &mut self.jobs[idx];
        job.status = JobStatus::Cancelled;
        job.provider_id = None;
        self.purge_offers(job_id);
        engine_info!("Job {} cancelled by client {}", job_id, client_id);
        Ok(())
    }

    pub fn post_message(
        &mut self,
        actor: Principal,
        job_id: JobId,
        text: String,
        now: Timestamp,
    ) -> Result<MessageId, MarketError> {
        self.ensure_participant(actor, job_id)?;
        require_text("message", &text)?;

        let id = self.allocate_id();
        engine_debug!("Message {} on job {} from {}", id, job_id, actor);
        self.messages.push(ChatMessage {
            id,
            job_id,
            sender: actor,
            text,
            timestamp: now,
        });
        Ok(id)
    }

    pub fn set_provider_availability(
        &mut self,
        actor: Principal,
        available: bool,
    ) -> Result<(), MarketError> {
        let provider_id = require_provider(actor, "change availability")?;
        let idx = self.provider_index(provider_id)?;
        self.providers[idx].is_available = available;
        engine_info!("Provider {} available={}", provider_id, available);
        Ok(())
    }

    pub fn update_provider(
        &mut self,
        actor: Principal,
        edit: ProviderEdit,
    ) -> Result<(), MarketError> {
        require_admin(actor, "edit a provider")?;
        let idx = self.provider_index(edit.provider_id)?;
        require_text("name", &edit.name)?;
        if !(0.0..=5.0).contains(&edit.rating) {
            return Err(MarketError::InvalidRating(edit.rating));
        }

        let provider = &mut self.providers[idx];
        provider.name = edit.name;
        provider.trade = edit.trade;
        provider.rating = edit.rating;
        engine_info!("Provider {} updated by admin", edit.provider_id);
        Ok(())
    }

    pub fn update_client(&mut self, actor: Principal, edit: ClientEdit) -> Result<(), MarketError> {
        require_admin(actor, "edit a client")?;
        let idx = self
            .clients
            .iter()
            .position(|c| c.id == edit.client_id)
            .ok_or(MarketError::UnknownClient(edit.client_id))?;
        require_text("name", &edit.name)?;
        require_text("address", &edit.address)?;

        let client = &mut self.clients[idx];
        client.name = edit.name;
        client.address = edit.address;
        engine_info!("Client {} updated by admin", edit.client_id);
        Ok(())
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn purge_offers(&mut self, job_id: JobId) {
        self.offers.retain(|o| o.job_id != job_id);
    }

    fn job_index(&self, job_id: JobId) -> Result<usize, MarketError> {
        self.jobs
            .iter()
            .position(|j| j.id == job_id)
            .ok_or(MarketError::UnknownJob(job_id))
    }

    fn provider_index(&self, provider_id: ProviderId) -> Result<usize, MarketError> {
        self.providers
            .iter()
            .position(|p| p.id == provider_id)
            .ok_or(MarketError::UnknownProvider(provider_id))
    }

    fn find_provider(&self, provider_id: ProviderId) -> Result<&Provider, MarketError> {
        self.provider_index(provider_id).map(|idx| &self.providers[idx])
    }

    fn find_client(&self, client_id: ClientId) -> Result<&Client, MarketError> {
        self.clients
            .iter()
            .find(|c| c.id == client_id)
            .ok_or(MarketError::UnknownClient(client_id))
    }

    fn owned_job_index(&self, client_id: ClientId, job_id: JobId) -> Result<usize, MarketError> {
        let idx = self.job_index(job_id)?;
        if self.jobs[idx].client_id != client_id {
            return Err(MarketError::NotJobOwner { client_id, job_id });
        }
        Ok(idx)
    }

    fn editable_job_index(&self, client_id: ClientId, job_id: JobId) -> Result<usize, MarketError> {
        let idx = self.owned_job_index(client_id, job_id)?;
        let status = self.jobs[idx].status;
        if status != JobStatus::Pending {
            return Err(MarketError::NotPending { job_id, status });
        }
        Ok(idx)
    }

    fn assigned_job_index(
        &self,
        provider_id: ProviderId,
        job_id: JobId,
    ) -> Result<usize, MarketError> {
        let idx = self.job_index(job_id)?;
        if self.jobs[idx].provider_id != Some(provider_id) {
            return Err(MarketError::NotAssignedProvider {
                provider_id,
                job_id,
            });
        }
        Ok(idx)
    }

    fn check_transition(&self, idx: usize, to: JobStatus) -> Result<(), MarketError> {
        let job = &self.jobs[idx];
        if job.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(MarketError::InvalidTransition {
                job_id: job.id,
                from: job.status,
                to,
            })
        }
    }
}

fn require_client(actor: Principal, action: &'static str) -> Result<ClientId, MarketError> {
    match actor {
        Principal::Client(id) => Ok(id),
        other => Err(MarketError::Forbidden {
            role: other.role(),
            action,
        }),
    }
}

fn require_provider(actor: Principal, action: &'static str) -> Result<ProviderId, MarketError> {
    match actor {
        Principal::Provider(id) => Ok(id),
        other => Err(MarketError::Forbidden {
            role: other.role(),
            action,
        }),
    }
}

fn require_admin(actor: Principal, action: &'static str) -> Result<(), MarketError> {
    match actor.role() {
        UserRole::Admin => Ok(()),
        role => Err(MarketError::Forbidden { role, action }),
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), MarketError> {
    if value.trim().is_empty() {
        Err(MarketError::EmptyField { field })
    } else {
        Ok(())
    }
}
