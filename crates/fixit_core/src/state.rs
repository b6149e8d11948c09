use engine_logging::engine_warn;

use crate::{Classification, JobId, MarketError, Marketplace, Principal, Timestamp};

/// Correlates a classification request with its result.
pub type RequestId = u64;

/// Minimum description length accepted by the request form.
pub const MIN_DESCRIPTION_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftStage {
    Classifying,
    Review(Classification),
}

/// A job request between form submission and confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub request_id: RequestId,
    pub editing: Option<JobId>,
    pub description: String,
    pub scheduled_at: Option<Timestamp>,
    pub image: Option<String>,
    pub stage: DraftStage,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    market: Marketplace,
    principal: Principal,
    draft: Option<Draft>,
    next_request_id: RequestId,
    chat_job: Option<JobId>,
    notice: Option<MarketError>,
    dirty: bool,
}

impl AppState {
    pub fn new(market: Marketplace, principal: Principal) -> Self {
        Self {
            market,
            principal,
            ..Self::default()
        }
    }

    pub fn market(&self) -> &Marketplace {
        &self.market
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn chat_job(&self) -> Option<JobId> {
        self.chat_job
    }

    /// The last rejected operation, cleared by the next successful one.
    pub fn notice(&self) -> Option<&MarketError> {
        self.notice.as_ref()
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn switch_principal(&mut self, principal: Principal) {
        self.principal = principal;
        self.draft = None;
        self.chat_job = None;
        self.notice = None;
        self.mark_dirty();
    }

    /// Runs a store operation as the current principal and records the outcome.
    pub(crate) fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut Marketplace, Principal) -> Result<T, MarketError>,
    ) -> Option<T> {
        let result = op(&mut self.market, self.principal);
        self.mark_dirty();
        match result {
            Ok(value) => {
                self.notice = None;
                Some(value)
            }
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    pub(crate) fn reject(&mut self, err: MarketError) {
        engine_warn!("Rejected operation for {}: {}", self.principal, err);
        self.notice = Some(err);
        self.mark_dirty();
    }

    pub(crate) fn begin_draft(
        &mut self,
        editing: Option<JobId>,
        description: String,
        scheduled_at: Option<Timestamp>,
        image: Option<String>,
    ) -> RequestId {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.draft = Some(Draft {
            request_id,
            editing,
            description,
            scheduled_at,
            image,
            stage: DraftStage::Classifying,
        });
        self.notice = None;
        self.mark_dirty();
        request_id
    }

    /// Moves the matching in-flight draft to review. Returns `false` for stale
    /// or unknown requests.
    pub(crate) fn finish_classification(
        &mut self,
        request_id: RequestId,
        classification: Classification,
    ) -> bool {
        match self.draft.as_mut() {
            Some(draft)
                if draft.request_id == request_id && draft.stage == DraftStage::Classifying =>
            {
                draft.stage = DraftStage::Review(classification);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_draft(&mut self) -> Option<Draft> {
        let draft = self.draft.take();
        if draft.is_some() {
            self.mark_dirty();
        }
        draft
    }

    pub(crate) fn set_chat_job(&mut self, job_id: Option<JobId>) {
        if self.chat_job != job_id {
            self.chat_job = job_id;
            self.mark_dirty();
        }
    }
}
