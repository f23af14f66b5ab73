//! tockbot: a clock-chime bot built on the minibot framework.
//!
//! On the hour it posts one "BONG" per hour on a 12-hour clock. Anyone who
//! mentions it gets a favorite; mentions containing "tick" get a reply with
//! the current time. Quoted-tweet stream events get a favorite too.
//!
//! Meant to run from cron once a minute in batch mode, with a second
//! `--stream` process feeding the mailbox.

use std::process::ExitCode;

use chrono::{DateTime, Local, Timelike};
use clap::Parser;
use rand::RngCore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use minibot::mailbox::HandlerMap;
use minibot::policy::PostTiming;
use minibot::settings::Settings;
use minibot::types::{BotAction, Mention, PendingUpdate, StatusId};
use minibot::{BaseArgs, Bot};

struct Tockbot;

/// The chime count and message: one "BONG" per hour on a 12-hour clock,
/// newline-separated.
fn chime(at: DateTime<Local>) -> (u32, String) {
    let count = match at.hour() % 12 {
        0 => 12,
        h => h,
    };
    (count, vec!["BONG"; count as usize].join("\n"))
}

fn time_reply(at: DateTime<Local>, to: &Mention) -> PendingUpdate {
    let text = format!(
        "{} It's {}",
        to.author,
        at.format("%-I:%M %p on %A %B %d, %Y")
    );
    PendingUpdate::reply(text, to.id.clone())
}

impl Bot for Tockbot {
    fn name(&self) -> &str {
        "tockbot"
    }

    /// Chimes are clock-driven, not probability-driven: post exactly when
    /// the minute hand is on twelve.
    fn is_ready_for_update(&self, force: bool, _timing: &PostTiming, _rng: &mut dyn RngCore) -> bool {
        force || Local::now().minute() == 0
    }

    fn create_update(&self, _settings: &Settings) -> Vec<BotAction> {
        let (count, text) = chime(Local::now());
        vec![
            BotAction::log("Tweet", [format!("{count} o'clock")]),
            BotAction::Post(PendingUpdate::new(text)),
        ]
    }

    fn handle_mention(&self, mention: &Mention) -> Vec<BotAction> {
        let favorite = BotAction::Favorite {
            id: mention.id.clone(),
        };
        if mention.text.to_lowercase().contains("tick") {
            vec![
                BotAction::log("Reply", [mention.author.as_str()]),
                favorite,
                BotAction::Post(time_reply(Local::now(), mention)),
            ]
        } else {
            vec![
                BotAction::log("Mention", [mention.author.as_str()]),
                favorite,
            ]
        }
    }

    fn handlers(&self) -> HandlerMap {
        let mut handlers = HandlerMap::new();
        handlers.register("quoted_tweet", |event: &minibot::mailbox::StreamEvent| {
            match event
                .pointer("/target_object/id_str")
                .and_then(|v| v.as_str())
            {
                Some(id) => vec![BotAction::Favorite {
                    id: StatusId::new(id),
                }],
                None => vec![],
            }
        });
        handlers
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("minibot=info,tockbot=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = BaseArgs::parse();
    match minibot::run(&Tockbot, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "tockbot run failed");
            ExitCode::FAILURE
        }
    }
}
