mod common;

use common::*;
use fixit_core::{JobStatus, TradeType};
use pretty_assertions::assert_eq;

#[test]
fn kitchen_sink_scenario_routes_to_plumbers_only() {
    init_logging();
    let mut market = marketplace();
    let job_id = post(
        &mut market,
        SARAH,
        "Kitchen sink drain is completely clogged",
        TradeType::Plumbing,
    );

    let client = market.client_jobs(1);
    assert_eq!(client.active.len(), 1);
    assert_eq!(client.active[0].id, job_id);
    assert_eq!(client.active[0].status, JobStatus::Pending);
    assert!(client.history.is_empty());

    let plumber = market.provider_feed(3).unwrap();
    assert!(plumber.jobs.iter().any(|j| j.id == job_id));
    let electrician = market.provider_feed(4).unwrap();
    assert!(electrician.jobs.iter().all(|j| j.id != job_id));
}

#[test]
fn feed_includes_catch_all_categories_and_skips_declined() {
    init_logging();
    let mut market = marketplace();
    let plumbing = post(&mut market, SARAH, "Dripping tap in bathroom", TradeType::Plumbing);
    let general = post(&mut market, SARAH, "Door hinge is loose", TradeType::General);
    let other = post(&mut market, ROBERT, "Something odd in the attic", TradeType::Other);
    let hvac = post(&mut market, ROBERT, "AC blows warm air", TradeType::Hvac);
    let painting = post(&mut market, ROBERT, "Repaint the fence", TradeType::Painting);

    let ids: Vec<_> = market.provider_feed(3).unwrap().jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![other, general, plumbing]);

    market.decline_job(MIKE, general).unwrap();
    let ids: Vec<_> = market.provider_feed(3).unwrap().jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![other, plumbing]);

    // Declines are personal: other providers still see the job.
    let ids: Vec<_> = market.provider_feed(5).unwrap().jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![hvac, other, general]);
    assert!(ids.iter().all(|id| *id != painting));
}

#[test]
fn feed_never_leaks_out_of_trade_or_declined_jobs() {
    init_logging();
    let mut market = marketplace();
    for (i, trade) in TradeType::ALL.into_iter().cycle().take(18).enumerate() {
        let client = if i % 2 == 0 { SARAH } else { ROBERT };
        let id = post(&mut market, client, &format!("Issue number {i} needs a pro"), trade);
        if i % 3 == 0 {
            market.decline_job(ELENA, id).unwrap();
        }
    }

    let feed = market.provider_feed(4).unwrap();
    let declined = market.declined_jobs(4).unwrap();
    assert!(!feed.jobs.is_empty());
    for job in feed.jobs {
        assert!(TradeType::Electrical.serves(job.category), "{}", job.category);
        assert!(!declined.contains(&job.id));
        assert_eq!(job.status, JobStatus::Pending);
    }
}

#[test]
fn matched_jobs_leave_the_feed_and_enter_the_schedule() {
    init_logging();
    let mut market = marketplace();
    let job_id = post(&mut market, SARAH, "Garbage disposal jammed", TradeType::Plumbing);
    market.assign_job(ADMIN, job_id, 3).unwrap();

    assert!(market.provider_feed(3).unwrap().jobs.is_empty());
    let schedule = market.provider_schedule(3);
    assert_eq!(schedule.active.len(), 1);
    assert!(schedule.history.is_empty());

    market.start_job(MIKE, job_id).unwrap();
    market.complete_job(MIKE, job_id).unwrap();
    let schedule = market.provider_schedule(3);
    assert!(schedule.active.is_empty());
    assert_eq!(schedule.history[0].id, job_id);

    let client = market.client_jobs(1);
    assert!(client.active.is_empty());
    assert_eq!(client.history[0].id, job_id);
}

#[test]
fn unavailable_provider_gets_an_inert_feed() {
    init_logging();
    let mut market = marketplace();
    post(&mut market, SARAH, "Water pooling under sink", TradeType::Plumbing);
    market.set_provider_availability(MIKE, false).unwrap();

    let feed = market.provider_feed(3).unwrap();
    assert!(!feed.available);
    assert_eq!(feed.jobs.len(), 1);
    assert!(market.provider_feed(42).is_none());
}

#[test]
fn client_partition_keeps_store_order() {
    init_logging();
    let mut market = marketplace();
    let a = post(&mut market, SARAH, "First issue at home", TradeType::General);
    let b = post(&mut market, SARAH, "Second issue at home", TradeType::General);
    let c = post(&mut market, SARAH, "Third issue at home", TradeType::General);
    post(&mut market, ROBERT, "Robert's own issue", TradeType::General);
    market.cancel_job(SARAH, b).unwrap();

    let jobs = market.client_jobs(1);
    let active: Vec<_> = jobs.active.iter().map(|j| j.id).collect();
    let history: Vec<_> = jobs.history.iter().map(|j| j.id).collect();
    assert_eq!(active, vec![c, a]);
    assert_eq!(history, vec![b]);
}

#[test]
fn offers_resolve_to_provider_profiles_while_pending() {
    init_logging();
    let mut market = marketplace();
    let job_id = post(&mut market, SARAH, "Leaky shower head", TradeType::Plumbing);
    market
        .submit_offer(MIKE, job_id, offer("$250", "I can fix this today!"), NOW)
        .unwrap();

    let offers = market.job_offers(job_id);
    assert_eq!(offers.len(), 1);
    let provider = offers[0].provider.unwrap();
    assert_eq!(provider.name, "Mike Torque");
    assert_eq!(provider.jobs_completed, 142);
    assert_eq!(offers[0].offer.price, "$250");

    market.assign_job(ADMIN, job_id, 3).unwrap();
    assert!(market.job_offers(job_id).is_empty());
}

#[test]
fn admin_sees_conversations_with_messages_only() {
    init_logging();
    let mut market = marketplace();
    let quiet = post(&mut market, SARAH, "Squeaky floorboards", TradeType::General);
    let chatty = post(&mut market, ROBERT, "Furnace won't ignite", TradeType::Hvac);
    market.assign_job(ADMIN, chatty, 5).unwrap();
    market
        .post_message(ROBERT, chatty, "Is tonight ok?".to_string(), NOW)
        .unwrap();
    market
        .post_message(TOM, chatty, "Yes, 7pm".to_string(), NOW + 10)
        .unwrap();

    let overview = market.admin_overview();
    assert_eq!(overview.jobs.len(), 2);
    assert_eq!(overview.providers.len(), 3);
    assert_eq!(overview.clients.len(), 2);
    assert_eq!(overview.conversations.len(), 1);
    let conversation = &overview.conversations[0];
    assert_eq!(conversation.job.id, chatty);
    assert_eq!(conversation.message_count, 2);
    assert_eq!(conversation.last_message.text, "Yes, 7pm");
    assert!(overview.conversations.iter().all(|c| c.job.id != quiet));
}
