use engine_logging::{engine_debug, engine_info};

use crate::{
    AppState, Draft, DraftStage, Effect, JobId, JobRequest, MarketError, Msg, Principal,
    Timestamp, MIN_DESCRIPTION_LEN,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Rejected operations leave the marketplace untouched; the error is logged
/// and kept as the state's notice.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RoleSwitched(principal) => {
            engine_info!("Session switched to {}", principal);
            state.switch_principal(principal);
            Vec::new()
        }
        Msg::IssueSubmitted {
            editing,
            description,
            scheduled_at,
            image,
        } => match submit_issue(&mut state, editing, &description, scheduled_at, image) {
            Ok(effects) => effects,
            Err(err) => {
                state.reject(err);
                Vec::new()
            }
        },
        Msg::ClassificationFinished {
            request_id,
            classification,
        } => {
            if !state.finish_classification(request_id, classification) {
                engine_debug!("Ignoring stale classification result {}", request_id);
            }
            Vec::new()
        }
        Msg::DraftConfirmed { now } => {
            confirm_draft(&mut state, now);
            Vec::new()
        }
        Msg::DraftDiscarded => {
            state.take_draft();
            Vec::new()
        }
        Msg::OfferSubmitted { job_id, offer, now } => {
            state.apply(|market, actor| market.submit_offer(actor, job_id, offer, now));
            Vec::new()
        }
        Msg::JobDeclined { job_id } => {
            state.apply(|market, actor| market.decline_job(actor, job_id));
            Vec::new()
        }
        Msg::OfferAccepted { job_id, offer_id } => {
            state.apply(|market, actor| market.accept_offer(actor, job_id, offer_id));
            Vec::new()
        }
        Msg::JobAssigned {
            job_id,
            provider_id,
        } => {
            state.apply(|market, actor| market.assign_job(actor, job_id, provider_id));
            Vec::new()
        }
        Msg::JobStarted { job_id } => {
            state.apply(|market, actor| market.start_job(actor, job_id));
            Vec::new()
        }
        Msg::JobCompleted { job_id } => {
            state.apply(|market, actor| market.complete_job(actor, job_id));
            Vec::new()
        }
        Msg::JobCancelled { job_id } => {
            state.apply(|market, actor| market.cancel_job(actor, job_id));
            Vec::new()
        }
        Msg::ChatOpened { job_id } => {
            match state.market().ensure_participant(state.principal(), job_id) {
                Ok(()) => state.set_chat_job(Some(job_id)),
                Err(err) => state.reject(err),
            }
            Vec::new()
        }
        Msg::ChatClosed => {
            state.set_chat_job(None);
            Vec::new()
        }
        Msg::MessagePosted { job_id, text, now } => {
            state.apply(|market, actor| market.post_message(actor, job_id, text, now));
            Vec::new()
        }
        Msg::AvailabilityToggled { available } => {
            state.apply(|market, actor| market.set_provider_availability(actor, available));
            Vec::new()
        }
        Msg::ProviderEdited(edit) => {
            state.apply(|market, actor| market.update_provider(actor, edit));
            Vec::new()
        }
        Msg::ClientEdited(edit) => {
            state.apply(|market, actor| market.update_client(actor, edit));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_issue(
    state: &mut AppState,
    editing: Option<JobId>,
    description: &str,
    scheduled_at: Option<Timestamp>,
    image: Option<String>,
) -> Result<Vec<Effect>, MarketError> {
    let client_id = match state.principal() {
        Principal::Client(id) => id,
        other => {
            return Err(MarketError::Forbidden {
                role: other.role(),
                action: "post a job",
            })
        }
    };
    if let Some(job_id) = editing {
        state.market().ensure_editable(client_id, job_id)?;
    }
    if description.trim().is_empty() {
        return Err(MarketError::EmptyField {
            field: "description",
        });
    }
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(MarketError::DescriptionTooShort {
            min: MIN_DESCRIPTION_LEN,
        });
    }
    let image = image.filter(|data| !data.trim().is_empty());

    // A new submission supersedes whatever draft was in flight.
    let request_id =
        state.begin_draft(editing, description.to_string(), scheduled_at, image.clone());
    engine_info!(
        "Classification request {} for client {} (image={})",
        request_id,
        client_id,
        image.is_some()
    );
    Ok(vec![Effect::ClassifyIssue {
        request_id,
        description: description.to_string(),
        image,
    }])
}

fn confirm_draft(state: &mut AppState, now: Timestamp) {
    let ready = matches!(
        state.draft(),
        Some(Draft {
            stage: DraftStage::Review(_),
            ..
        })
    );
    if !ready {
        engine_debug!("Draft confirmation ignored: nothing to review");
        return;
    }
    let Some(Draft {
        editing,
        description,
        scheduled_at,
        image,
        stage: DraftStage::Review(classification),
        ..
    }) = state.take_draft()
    else {
        return;
    };

    let request = JobRequest {
        description,
        classification,
        scheduled_at,
        image,
    };
    match editing {
        Some(job_id) => {
            state.apply(|market, actor| market.update_job(actor, job_id, request));
        }
        None => {
            state.apply(|market, actor| market.create_job(actor, request, now));
        }
    }
}
