use thiserror::Error;

use crate::{ClientId, JobId, JobStatus, OfferId, Principal, ProviderId, UserRole};

/// Why the marketplace rejected an operation. A rejected operation leaves the
/// store unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    #[error("unknown job {0}")]
    UnknownJob(JobId),
    #[error("unknown offer {0}")]
    UnknownOffer(OfferId),
    #[error("unknown provider {0}")]
    UnknownProvider(ProviderId),
    #[error("unknown client {0}")]
    UnknownClient(ClientId),
    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
    #[error("job {job_id} is {status}, not PENDING")]
    NotPending { job_id: JobId, status: JobStatus },
    #[error("client {client_id} does not own job {job_id}")]
    NotJobOwner { client_id: ClientId, job_id: JobId },
    #[error("provider {provider_id} is not assigned to job {job_id}")]
    NotAssignedProvider {
        provider_id: ProviderId,
        job_id: JobId,
    },
    #[error("{principal} is not part of the conversation on job {job_id}")]
    NotParticipant { principal: Principal, job_id: JobId },
    #[error("a {role} cannot {action}")]
    Forbidden {
        role: UserRole,
        action: &'static str,
    },
    #[error("provider {0} is not accepting jobs")]
    ProviderUnavailable(ProviderId),
    #[error("provider {provider_id} already has an offer on job {job_id}")]
    DuplicateOffer {
        provider_id: ProviderId,
        job_id: JobId,
    },
    #[error("offer {offer_id} does not belong to job {job_id}")]
    OfferJobMismatch { offer_id: OfferId, job_id: JobId },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("description must be at least {min} characters")]
    DescriptionTooShort { min: usize },
    #[error("rating {0} is outside 0.0..=5.0")]
    InvalidRating(f32),
}
