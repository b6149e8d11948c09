//! Line commands typed at the prompt, turned into reducer messages.

use chrono::{DateTime, Days, Local, NaiveDateTime, NaiveTime, TimeZone};
use fixit_core::{
    ClientEdit, JobId, Msg, OfferRequest, Principal, ProviderEdit, Timestamp, TradeType,
};

pub const HELP: &[&str] = &[
    "role client <id> | role provider <id> | role admin",
    "post [at=YYYY-MM-DDTHH:MM|tonight|tomorrow] [image=<data>] <description>",
    "edit <job> [at=...] [image=<data>] <description>",
    "confirm | discard",
    "offer <job> <price> | <message>",
    "decline <job> | start <job> | complete <job> | available on|off",
    "accept <job> <offer> | cancel <job>",
    "assign <job> <provider>",
    "edit-provider <id> <trade> <rating> <name>",
    "edit-client <id> <name> | <address>",
    "chat <job> | close | say <text>",
    "show | help | quit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Msg(Msg),
    /// Post to the open chat thread.
    Say(String),
    Show,
    Help,
    Quit,
}

/// Parses one input line. `now` stamps messages and anchors relative schedules.
pub fn parse(line: &str, now: DateTime<Local>) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let stamp = now.timestamp_millis();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "show" => Command::Show,
        "role" => Command::Msg(Msg::RoleSwitched(parse_principal(rest)?)),
        "post" => issue(None, rest, now)?,
        "edit" => {
            let (job, rest) = split_word(rest);
            issue(Some(parse_id(job, "job")?), rest, now)?
        }
        "confirm" => Command::Msg(Msg::DraftConfirmed { now: stamp }),
        "discard" => Command::Msg(Msg::DraftDiscarded),
        "offer" => {
            let (job, rest) = split_word(rest);
            let (price, message) = rest
                .split_once('|')
                .ok_or("usage: offer <job> <price> | <message>")?;
            Command::Msg(Msg::OfferSubmitted {
                job_id: parse_id(job, "job")?,
                offer: OfferRequest {
                    price: price.trim().to_string(),
                    message: message.trim().to_string(),
                },
                now: stamp,
            })
        }
        "decline" => Command::Msg(Msg::JobDeclined {
            job_id: parse_id(rest, "job")?,
        }),
        "start" => Command::Msg(Msg::JobStarted {
            job_id: parse_id(rest, "job")?,
        }),
        "complete" => Command::Msg(Msg::JobCompleted {
            job_id: parse_id(rest, "job")?,
        }),
        "cancel" => Command::Msg(Msg::JobCancelled {
            job_id: parse_id(rest, "job")?,
        }),
        "accept" => {
            let (job, offer) = split_word(rest);
            Command::Msg(Msg::OfferAccepted {
                job_id: parse_id(job, "job")?,
                offer_id: parse_id(offer, "offer")?,
            })
        }
        "assign" => {
            let (job, provider) = split_word(rest);
            Command::Msg(Msg::JobAssigned {
                job_id: parse_id(job, "job")?,
                provider_id: parse_id(provider, "provider")?,
            })
        }
        "available" => {
            let available = match rest.to_ascii_lowercase().as_str() {
                "on" | "yes" | "true" => true,
                "off" | "no" | "false" => false,
                _ => return Err("usage: available on|off".to_string()),
            };
            Command::Msg(Msg::AvailabilityToggled { available })
        }
        "edit-provider" => {
            let (id, rest) = split_word(rest);
            let (trade, rest) = split_word(rest);
            let (rating, name) = split_word(rest);
            Command::Msg(Msg::ProviderEdited(ProviderEdit {
                provider_id: parse_id(id, "provider")?,
                trade: trade.parse::<TradeType>()?,
                rating: rating
                    .parse()
                    .map_err(|_| format!("invalid rating '{rating}'"))?,
                name: name.to_string(),
            }))
        }
        "edit-client" => {
            let (id, rest) = split_word(rest);
            let (name, address) = rest
                .split_once('|')
                .ok_or("usage: edit-client <id> <name> | <address>")?;
            Command::Msg(Msg::ClientEdited(ClientEdit {
                client_id: parse_id(id, "client")?,
                name: name.trim().to_string(),
                address: address.trim().to_string(),
            }))
        }
        "chat" => Command::Msg(Msg::ChatOpened {
            job_id: parse_id(rest, "job")?,
        }),
        "close" => Command::Msg(Msg::ChatClosed),
        "say" => Command::Say(rest.to_string()),
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn issue(editing: Option<JobId>, rest: &str, now: DateTime<Local>) -> Result<Command, String> {
    let mut scheduled_at = None;
    let mut image = None;
    let mut rest = rest;
    loop {
        let (word, tail) = split_word(rest);
        if let Some(when) = word.strip_prefix("at=") {
            scheduled_at = Some(parse_schedule(when, now)?);
        } else if let Some(data) = word.strip_prefix("image=") {
            image = Some(data.to_string());
        } else {
            break;
        }
        rest = tail;
    }
    Ok(Command::Msg(Msg::IssueSubmitted {
        editing,
        description: rest.to_string(),
        scheduled_at,
        image,
    }))
}

/// Accepts `tonight` (19:00 today), `tomorrow` (09:00) or a local
/// `YYYY-MM-DDTHH:MM`.
pub fn parse_schedule(text: &str, now: DateTime<Local>) -> Result<Timestamp, String> {
    let local = match text.to_ascii_lowercase().as_str() {
        "tonight" => now.date_naive().and_time(at_hour(19)),
        "tomorrow" => now
            .date_naive()
            .checked_add_days(Days::new(1))
            .ok_or("date out of range")?
            .and_time(at_hour(9)),
        _ => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
            .map_err(|_| format!("invalid schedule '{text}', expected YYYY-MM-DDTHH:MM"))?,
    };
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|time| time.timestamp_millis())
        .ok_or_else(|| format!("'{text}' does not exist in the local time zone"))
}

fn at_hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn parse_principal(text: &str) -> Result<Principal, String> {
    let (role, id) = split_word(text);
    match role.to_ascii_lowercase().as_str() {
        "admin" => Ok(Principal::Admin),
        "client" => Ok(Principal::Client(parse_id(id, "client")?)),
        "provider" => Ok(Principal::Provider(parse_id(id, "provider")?)),
        _ => Err("usage: role client <id> | role provider <id> | role admin".to_string()),
    }
}

fn parse_id(text: &str, what: &str) -> Result<u64, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("expected a {what} id, got '{}'", text.trim()))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}
