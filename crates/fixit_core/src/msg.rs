use crate::{
    Classification, ClientEdit, JobId, OfferId, OfferRequest, Principal, ProviderEdit, ProviderId,
    RequestId, Timestamp,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User switched the acting principal.
    RoleSwitched(Principal),
    /// Client submitted the request form; `editing` names the job being edited.
    IssueSubmitted {
        editing: Option<JobId>,
        description: String,
        scheduled_at: Option<Timestamp>,
        image: Option<String>,
    },
    /// Engine finished classifying a submitted draft (fallback already applied).
    ClassificationFinished {
        request_id: RequestId,
        classification: Classification,
    },
    /// Client confirmed the reviewed draft.
    DraftConfirmed { now: Timestamp },
    /// Client abandoned the draft.
    DraftDiscarded,
    /// Provider bid on a job.
    OfferSubmitted {
        job_id: JobId,
        offer: OfferRequest,
        now: Timestamp,
    },
    /// Provider hid a job from their feed.
    JobDeclined { job_id: JobId },
    /// Client accepted an offer.
    OfferAccepted { job_id: JobId, offer_id: OfferId },
    /// Admin directed a job to a provider.
    JobAssigned {
        job_id: JobId,
        provider_id: ProviderId,
    },
    /// Provider began work.
    JobStarted { job_id: JobId },
    /// Provider finished work.
    JobCompleted { job_id: JobId },
    /// Client cancelled a job.
    JobCancelled { job_id: JobId },
    /// User opened the chat thread of a job.
    ChatOpened { job_id: JobId },
    /// User closed the chat thread.
    ChatClosed,
    /// User sent a chat message.
    MessagePosted {
        job_id: JobId,
        text: String,
        now: Timestamp,
    },
    /// Provider toggled availability.
    AvailabilityToggled { available: bool },
    /// Admin edited a provider profile.
    ProviderEdited(ProviderEdit),
    /// Admin edited a client profile.
    ClientEdited(ClientEdit),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
