mod common;

use common::*;
use fixit_core::{
    update, AppState, Classification, Dashboard, Effect, JobStatus, MarketError, Msg, Principal,
    TradeType, UrgencyLevel,
};
use pretty_assertions::assert_eq;

const SINK: &str = "Kitchen sink drain is completely clogged";

fn client_session() -> AppState {
    AppState::new(marketplace(), SARAH)
}

fn submit(state: AppState, description: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::IssueSubmitted {
            editing: None,
            description: description.to_string(),
            scheduled_at: None,
            image: None,
        },
    )
}

fn request_id(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .map(|effect| match effect {
            Effect::ClassifyIssue { request_id, .. } => *request_id,
        })
        .next()
        .expect("classify effect")
}

fn post_via_flow(state: AppState, description: &str, classification: Classification) -> AppState {
    let (state, effects) = submit(state, description);
    let (state, _) = update(
        state,
        Msg::ClassificationFinished {
            request_id: request_id(&effects),
            classification,
        },
    );
    let (state, _) = update(state, Msg::DraftConfirmed { now: NOW });
    state
}

#[test]
fn submitting_issue_requests_classification() {
    init_logging();
    let (mut state, effects) = update(
        client_session(),
        Msg::IssueSubmitted {
            editing: None,
            description: format!("  {SINK}  "),
            scheduled_at: Some(NOW + 3_600_000),
            image: Some("data:image/jpeg;base64,AAAA".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::ClassifyIssue {
            request_id: 1,
            description: format!("  {SINK}  "),
            image: Some("data:image/jpeg;base64,AAAA".to_string()),
        }]
    );
    let view = state.view();
    let draft = view.draft.expect("draft");
    assert_eq!(draft.description, format!("  {SINK}  "));
    assert!(draft.review.is_none());
    assert!(state.consume_dirty());
    assert!(state.market().jobs().is_empty());
}

#[test]
fn short_descriptions_are_rejected_without_effects() {
    init_logging();
    let (state, effects) = submit(client_session(), "  leak   ");
    assert!(effects.is_empty());
    assert!(state.draft().is_none());
    assert_eq!(
        state.notice(),
        Some(&MarketError::DescriptionTooShort { min: 10 })
    );
}

#[test]
fn blank_descriptions_are_rejected_as_empty() {
    init_logging();
    let (state, effects) = submit(client_session(), "            ");
    assert!(effects.is_empty());
    assert_eq!(
        state.notice(),
        Some(&MarketError::EmptyField {
            field: "description"
        })
    );
}

#[test]
fn fallback_summary_keeps_the_description_as_typed() {
    init_logging();
    let typed = format!("  {SINK}  ");
    let state = post_via_flow(client_session(), &typed, Classification::fallback(&typed));

    let job = &state.market().jobs()[0];
    assert_eq!(job.description, typed);
    assert_eq!(job.ai_summary.as_deref(), Some(typed.as_str()));
}

#[test]
fn confirmed_draft_creates_job_visible_to_plumbers() {
    init_logging();
    let state = post_via_flow(
        client_session(),
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    assert!(state.draft().is_none());

    let Dashboard::Client(dashboard) = state.view().dashboard else {
        panic!("expected client dashboard");
    };
    assert_eq!(dashboard.active.len(), 1);
    assert_eq!(dashboard.active[0].status, JobStatus::Pending);
    assert_eq!(dashboard.active[0].category, TradeType::Plumbing);

    let (state, _) = update(state, Msg::RoleSwitched(MIKE));
    let Dashboard::Provider(plumber) = state.view().dashboard else {
        panic!("expected provider dashboard");
    };
    assert_eq!(plumber.feed.len(), 1);

    let (state, _) = update(state, Msg::RoleSwitched(ELENA));
    let Dashboard::Provider(electrician) = state.view().dashboard else {
        panic!("expected provider dashboard");
    };
    assert!(electrician.feed.is_empty());
}

#[test]
fn classifier_fallback_still_posts_the_job() {
    init_logging();
    let state = post_via_flow(client_session(), SINK, Classification::fallback(SINK));

    let job = &state.market().jobs()[0];
    assert_eq!(job.category, TradeType::General);
    assert_eq!(job.urgency, UrgencyLevel::Normal);
    assert_eq!(job.ai_summary.as_deref(), Some(SINK));
    assert_eq!(
        job.price_estimate.as_deref(),
        Some(Classification::UNAVAILABLE_PRICE)
    );
}

#[test]
fn stale_classification_results_are_ignored() {
    init_logging();
    let (state, first) = submit(client_session(), "Bathroom fan is very loud");
    let (state, second) = submit(state, SINK);
    let first_id = request_id(&first);
    let second_id = request_id(&second);
    assert_ne!(first_id, second_id);

    let (state, _) = update(
        state,
        Msg::ClassificationFinished {
            request_id: first_id,
            classification: classification(TradeType::Hvac, UrgencyLevel::Low),
        },
    );
    assert!(state.view().draft.unwrap().review.is_none());

    // Confirming before the review is ready does nothing.
    let (state, _) = update(state, Msg::DraftConfirmed { now: NOW });
    assert!(state.market().jobs().is_empty());

    let (state, _) = update(
        state,
        Msg::ClassificationFinished {
            request_id: second_id,
            classification: classification(TradeType::Plumbing, UrgencyLevel::High),
        },
    );
    let review = state.view().draft.unwrap().review.unwrap();
    assert_eq!(review.category, TradeType::Plumbing);
    assert_eq!(review.urgency, UrgencyLevel::High);
}

#[test]
fn editing_flow_updates_existing_job_in_place() {
    init_logging();
    let state = post_via_flow(
        client_session(),
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    let job_id = state.market().jobs()[0].id;

    let (state, effects) = update(
        state,
        Msg::IssueSubmitted {
            editing: Some(job_id),
            description: "Kitchen sink and dishwasher both backing up".to_string(),
            scheduled_at: None,
            image: None,
        },
    );
    let (state, _) = update(
        state,
        Msg::ClassificationFinished {
            request_id: request_id(&effects),
            classification: classification(TradeType::Plumbing, UrgencyLevel::High),
        },
    );
    let (state, _) = update(state, Msg::DraftConfirmed { now: NOW + 5 });

    assert_eq!(state.market().jobs().len(), 1);
    let job = &state.market().jobs()[0];
    assert_eq!(job.id, job_id);
    assert_eq!(job.urgency, UrgencyLevel::High);
    assert_eq!(job.created_at, NOW);
    assert_eq!(job.description, "Kitchen sink and dishwasher both backing up");
}

#[test]
fn offer_accept_scenario_through_messages() {
    init_logging();
    let state = AppState::new(marketplace(), ROBERT);
    let state = post_via_flow(
        state,
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    let job_id = state.market().jobs()[0].id;

    let (state, _) = update(state, Msg::RoleSwitched(MIKE));
    let (state, _) = update(
        state,
        Msg::OfferSubmitted {
            job_id,
            offer: offer("$250", "I can fix this today!"),
            now: NOW,
        },
    );

    let (state, _) = update(state, Msg::RoleSwitched(ROBERT));
    let Dashboard::Client(dashboard) = state.view().dashboard else {
        panic!("expected client dashboard");
    };
    let offers = &dashboard.active[0].offers;
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].provider_name, "Mike Torque");
    assert_eq!(offers[0].provider_rating, "4.8");
    let offer_id = offers[0].offer_id;

    let (state, _) = update(state, Msg::OfferAccepted { job_id, offer_id });
    let job = state.market().job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Matched);
    assert_eq!(job.provider_id, Some(3));
    assert_eq!(job.price_estimate.as_deref(), Some("$250"));
    assert!(state.market().job_offers(job_id).is_empty());
    assert!(state.notice().is_none());
}

#[test]
fn rejected_operations_leave_market_untouched() {
    init_logging();
    let state = post_via_flow(
        client_session(),
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    let job_id = state.market().jobs()[0].id;
    let before = state.market().clone();

    // A client cannot complete, and an unknown job is a no-op.
    let (state, effects) = update(state, Msg::JobCompleted { job_id });
    assert!(effects.is_empty());
    assert_eq!(state.market(), &before);
    assert!(matches!(
        state.notice(),
        Some(MarketError::Forbidden { .. })
    ));

    let (state, _) = update(state, Msg::JobCancelled { job_id: 999 });
    assert_eq!(state.market(), &before);
    assert_eq!(state.notice(), Some(&MarketError::UnknownJob(999)));
    assert_eq!(state.view().notice.as_deref(), Some("unknown job 999"));

    let (state, _) = update(state, Msg::RoleSwitched(Principal::Admin));
    assert!(state.notice().is_none());
}

#[test]
fn provider_workflow_and_chat_through_messages() {
    init_logging();
    let state = post_via_flow(
        client_session(),
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    let job_id = state.market().jobs()[0].id;

    let (state, _) = update(state, Msg::RoleSwitched(ADMIN));
    let (state, _) = update(
        state,
        Msg::JobAssigned {
            job_id,
            provider_id: 3,
        },
    );
    let (state, _) = update(state, Msg::RoleSwitched(MIKE));
    let (state, _) = update(state, Msg::ChatOpened { job_id });
    let (state, _) = update(
        state,
        Msg::MessagePosted {
            job_id,
            text: "On my way".to_string(),
            now: NOW,
        },
    );
    let chat = state.view().chat.expect("chat open");
    assert_eq!(chat.title, format!("Job {job_id} with Mike Torque"));
    assert_eq!(chat.lines.len(), 1);
    assert!(chat.lines[0].mine);

    let (state, _) = update(state, Msg::JobStarted { job_id });
    let (state, _) = update(state, Msg::JobCompleted { job_id });
    let Dashboard::Provider(dashboard) = state.view().dashboard else {
        panic!("expected provider dashboard");
    };
    assert!(dashboard.active.is_empty());
    assert_eq!(dashboard.history.len(), 1);
    assert_eq!(dashboard.jobs_completed, 143);

    let (state, _) = update(state, Msg::RoleSwitched(ADMIN));
    let Dashboard::Admin(admin) = state.view().dashboard else {
        panic!("expected admin dashboard");
    };
    assert_eq!(admin.conversations.len(), 1);
    assert_eq!(admin.conversations[0].client_name, "Sarah Jenkins");
    assert_eq!(admin.conversations[0].provider_name.as_deref(), Some("Mike Torque"));
}

#[test]
fn availability_toggle_marks_feed_inert() {
    init_logging();
    let state = AppState::new(marketplace(), MIKE);
    let (state, _) = update(state, Msg::AvailabilityToggled { available: false });
    let Dashboard::Provider(dashboard) = state.view().dashboard else {
        panic!("expected provider dashboard");
    };
    assert!(!dashboard.available);
}

#[test]
fn providers_cannot_submit_issues() {
    init_logging();
    let state = AppState::new(marketplace(), TOM);
    let (state, effects) = submit(state, SINK);
    assert!(effects.is_empty());
    assert!(matches!(
        state.notice(),
        Some(MarketError::Forbidden { .. })
    ));
}

#[test]
fn chat_threads_are_closed_to_outsiders() {
    init_logging();
    let state = post_via_flow(
        client_session(),
        SINK,
        classification(TradeType::Plumbing, UrgencyLevel::Normal),
    );
    let job_id = state.market().jobs()[0].id;
    let (state, _) = update(state, Msg::RoleSwitched(ADMIN));
    let (state, _) = update(
        state,
        Msg::JobAssigned {
            job_id,
            provider_id: 3,
        },
    );
    let (state, _) = update(state, Msg::RoleSwitched(SARAH));
    let (state, _) = update(
        state,
        Msg::MessagePosted {
            job_id,
            text: "private gate code 4321".to_string(),
            now: NOW,
        },
    );

    let (state, _) = update(state, Msg::RoleSwitched(ELENA));
    let (state, _) = update(state, Msg::ChatOpened { job_id });
    assert!(state.chat_job().is_none());
    assert!(state.view().chat.is_none());
    assert_eq!(
        state.notice(),
        Some(&MarketError::NotParticipant {
            principal: ELENA,
            job_id,
        })
    );

    let (state, _) = update(state, Msg::RoleSwitched(ROBERT));
    let (state, _) = update(state, Msg::ChatOpened { job_id });
    assert!(state.view().chat.is_none());

    let (state, _) = update(state, Msg::RoleSwitched(MIKE));
    let (state, _) = update(state, Msg::ChatOpened { job_id });
    let chat = state.view().chat.expect("assigned provider reads the thread");
    assert_eq!(chat.lines.len(), 1);
    assert_eq!(chat.lines[0].text, "private gate code 4321");
}
