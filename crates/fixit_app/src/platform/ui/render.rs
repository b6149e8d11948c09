use chrono::{Local, TimeZone};
use fixit_core::{
    AdminDashboard, AppViewModel, ChatView, ClientDashboard, Dashboard, DraftView, JobRowView,
    ProviderDashboard, Timestamp,
};

/// Renders the view model as plain text lines for the terminal.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "== FixItNow | {} ({}) ==",
        view.principal_name, view.principal
    )];

    match &view.dashboard {
        Dashboard::Client(dashboard) => render_client(&mut lines, dashboard),
        Dashboard::Provider(dashboard) => render_provider(&mut lines, dashboard),
        Dashboard::Admin(dashboard) => render_admin(&mut lines, dashboard),
        Dashboard::Unknown => lines.push("No such user. Switch role with 'role ...'.".to_string()),
    }

    if let Some(draft) = &view.draft {
        render_draft(&mut lines, draft);
    }
    if let Some(chat) = &view.chat {
        render_chat(&mut lines, chat);
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("! {notice}"));
    }
    lines
}

fn render_client(lines: &mut Vec<String>, dashboard: &ClientDashboard) {
    lines.push(format!("Address: {}", dashboard.address));
    section(lines, "Active requests", &dashboard.active);
    for row in &dashboard.active {
        for offer in &row.offers {
            lines.push(format!(
                "    offer #{} from {} ({} stars, {} jobs): {} \"{}\"",
                offer.offer_id,
                offer.provider_name,
                offer.provider_rating,
                offer.provider_jobs_completed,
                offer.price,
                offer.message
            ));
        }
    }
    section(lines, "History", &dashboard.history);
}

fn render_provider(lines: &mut Vec<String>, dashboard: &ProviderDashboard) {
    lines.push(format!(
        "{} | rating {:.1} | {} jobs completed | {}",
        dashboard.trade,
        dashboard.rating,
        dashboard.jobs_completed,
        if dashboard.available {
            "available"
        } else {
            "offline"
        }
    ));
    if !dashboard.available {
        lines.push("(offline, actions disabled)".to_string());
    }
    section(lines, "Job feed", &dashboard.feed);
    section(lines, "My schedule", &dashboard.active);
    section(lines, "History", &dashboard.history);
}

fn render_admin(lines: &mut Vec<String>, dashboard: &AdminDashboard) {
    section(lines, "All jobs", &dashboard.jobs);
    lines.push(format!("Providers ({}):", dashboard.providers.len()));
    for provider in &dashboard.providers {
        lines.push(format!(
            "  [{}] {} {} {:.1} ({} jobs){}",
            provider.provider_id,
            provider.name,
            provider.trade,
            provider.rating,
            provider.jobs_completed,
            if provider.available { "" } else { " offline" }
        ));
    }
    lines.push(format!("Clients ({}):", dashboard.clients.len()));
    for client in &dashboard.clients {
        lines.push(format!(
            "  [{}] {}, {}",
            client.client_id, client.name, client.address
        ));
    }
    lines.push(format!("Conversations ({}):", dashboard.conversations.len()));
    for conversation in &dashboard.conversations {
        lines.push(format!(
            "  job {}: {} / {} ({} msgs) last: {}",
            conversation.job_id,
            conversation.client_name,
            conversation.provider_name.as_deref().unwrap_or("unassigned"),
            conversation.message_count,
            conversation.last_message
        ));
    }
}

fn section(lines: &mut Vec<String>, title: &str, rows: &[JobRowView]) {
    lines.push(format!("{title} ({}):", rows.len()));
    lines.extend(rows.iter().map(job_line));
}

fn job_line(row: &JobRowView) -> String {
    let mut line = format!(
        "  #{} [{}] {} {} | {} | {} | {}",
        row.job_id,
        row.status,
        row.category,
        row.urgency,
        row.summary.as_deref().unwrap_or(&row.description),
        row.price_estimate.as_deref().unwrap_or("-"),
        format_schedule(row.scheduled_at)
    );
    if let Some(provider) = &row.provider_name {
        line.push_str(&format!(" | pro: {provider}"));
    }
    if row.offer_count > 0 {
        line.push_str(&format!(" | {} offers", row.offer_count));
    }
    if row.has_image {
        line.push_str(" | photo");
    }
    line
}

fn render_draft(lines: &mut Vec<String>, draft: &DraftView) {
    let heading = match draft.editing {
        Some(job_id) => format!("Editing job #{job_id}"),
        None => "New request".to_string(),
    };
    lines.push(format!(
        "{heading}: \"{}\" ({})",
        draft.description,
        format_schedule(draft.scheduled_at)
    ));
    match &draft.review {
        None => lines.push("  analyzing issue...".to_string()),
        Some(review) => {
            lines.push(format!(
                "  {} | {} | {} | {}",
                review.category, review.urgency, review.estimated_price_range, review.summary
            ));
            lines.push("  'confirm' to post, 'discard' to drop".to_string());
        }
    }
}

fn render_chat(lines: &mut Vec<String>, chat: &ChatView) {
    lines.push(format!("-- {} --", chat.title));
    if chat.lines.is_empty() {
        lines.push("  (no messages yet)".to_string());
    }
    for line in &chat.lines {
        let who = if line.mine { "me" } else { line.sender_label.as_str() };
        lines.push(format!(
            "  {} {}: {}",
            format_time(line.timestamp),
            who,
            line.text
        ));
    }
}

fn format_schedule(scheduled_at: Option<Timestamp>) -> String {
    match scheduled_at {
        Some(ts) => format_time(ts),
        None => "ASAP".to_string(),
    }
}

fn format_time(ts: Timestamp) -> String {
    Local
        .timestamp_millis_opt(ts)
        .single()
        .map(|time| time.format("%a %d %b %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
