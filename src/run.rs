//! The run orchestrator.
//!
//! A run is one invocation of a bot binary. In batch mode (the default,
//! meant to be cron-scheduled) it walks a fixed sequence: load settings,
//! maybe queue a scheduled update, handle new mentions, drain the mailbox,
//! flush the outbox, persist settings. In stream mode (`--stream`) it runs
//! the long-lived listener instead.
//!
//! A settings failure aborts the run before anything touches the network.
//! Transport failures mid-cycle are logged and the cycle continues; the
//! next scheduled invocation is the retry.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bot::Bot;
use crate::botlog::BotLog;
use crate::cli::BaseArgs;
use crate::client::{ConsoleClient, HttpStatusClient, StatusClient, TransportError};
use crate::mailbox::{drain, MailboxError};
use crate::outbox::Outbox;
use crate::policy::PostTiming;
use crate::settings::{Settings, SettingsError};
use crate::stream::{listen, HttpStreamSource, DEFAULT_STREAM_URL};
use crate::types::BotAction;

/// A failure that aborts the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Mailbox(#[from] MailboxError),
}

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Milestones of a run, in execution order. Named in trace output so an
/// aborted run shows how far it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    SettingsLoaded,
    Connected,
    Streaming,
    Updated,
    MentionsHandled,
    EventsDrained,
    Flushed,
    Persisted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::SettingsLoaded => "settings-loaded",
            RunPhase::Connected => "connected",
            RunPhase::Streaming => "streaming",
            RunPhase::Updated => "updated",
            RunPhase::MentionsHandled => "mentions-handled",
            RunPhase::EventsDrained => "events-drained",
            RunPhase::Flushed => "flushed",
            RunPhase::Persisted => "persisted",
        };
        write!(f, "{name}")
    }
}

/// Behavior toggles taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Diagnostic run: print instead of posting.
    pub debug: bool,
    /// Skip the rate-limit policy this cycle.
    pub force: bool,
}

/// Everything a run carries between phases and hands to the bot's hooks.
pub struct RunContext {
    /// Directory holding the settings file, mailbox files, and logs.
    pub bot_dir: PathBuf,
    pub settings: Settings,
    pub outbox: Outbox,
    pub log: BotLog,
    pub flags: RunFlags,
}

/// Runs the bot once, per the command-line flags.
///
/// # Errors
///
/// `Settings` when the settings file is missing (a default is written
/// first) or unreadable, `Transport` when the stream connection cannot be
/// opened, `Mailbox` when the mailbox directory cannot be listed. Whatever
/// the failure, it is appended to the bot log before this returns.
pub async fn run<B: Bot>(bot: &B, args: &BaseArgs) -> Result<()> {
    let bot_dir = args.bot_path.clone();
    let settings_path = bot_dir.join(format!("{}.json", bot.name()));
    debug!(phase = %RunPhase::Init, bot = bot.name(), settings = %settings_path.display(), "starting run");

    let settings = match Settings::load(&settings_path, bot.default_settings()) {
        Ok(settings) => settings,
        Err(err @ SettingsError::ConfigMissing { .. }) => {
            eprintln!(
                "There was no settings file at {}, so a default one has been created.\n\
                 Edit it, filling in the correct value for each setting, then start the bot again.",
                settings_path.display()
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };
    debug!(phase = %RunPhase::SettingsLoaded, "settings loaded");

    let log = BotLog::new(&bot_dir, settings.doc().log_file_path.clone());
    let mut ctx = RunContext {
        bot_dir,
        settings,
        outbox: Outbox::new(),
        log,
        flags: RunFlags {
            debug: args.debug,
            force: args.force,
        },
    };

    bot.pre_run(&mut ctx);

    let result = if args.stream {
        run_listener(&mut ctx).await
    } else if args.debug {
        run_cycle(bot, &mut ctx, &ConsoleClient::new()).await
    } else {
        match HttpStatusClient::from_settings(ctx.settings.doc()) {
            Ok(client) => run_cycle(bot, &mut ctx, &client).await,
            Err(err) => Err(err.into()),
        }
    };

    match result {
        Ok(()) => {
            bot.post_run(&mut ctx);
            Ok(())
        }
        Err(err) => {
            error!(%err, "run aborted");
            if let Err(log_err) = ctx.log.append("ERROR", &[&err.to_string()]) {
                warn!(%log_err, "failed to record the abort in the bot log");
            }
            Err(err)
        }
    }
}

/// Stream mode: connect, then spool events until ctrl-c or disconnect.
async fn run_listener(ctx: &mut RunContext) -> Result<()> {
    let url = ctx.settings.get_or("streamUrl", DEFAULT_STREAM_URL.to_string());
    info!(phase = %RunPhase::Connected, url = %url, "opening stream");
    let mut source = HttpStreamSource::connect(&url, &ctx.settings.doc().access_token).await?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    debug!(phase = %RunPhase::Streaming, "listening");
    let summary = listen(&mut source, &ctx.bot_dir, cancel).await;
    info!(
        spooled = summary.spooled,
        ignored = summary.ignored,
        disconnect = ?summary.disconnect,
        "listener finished"
    );
    Ok(())
}

/// Batch mode: one full cycle against the given client.
///
/// # Errors
///
/// `Mailbox` when the mailbox directory cannot be listed, `Settings` when
/// the final persist fails. Transport failures inside the cycle are
/// logged, never returned.
pub async fn run_cycle<B: Bot, C: StatusClient>(
    bot: &B,
    ctx: &mut RunContext,
    client: &C,
) -> Result<()> {
    let timing = {
        let doc = ctx.settings.doc();
        PostTiming {
            now: epoch_now(),
            last_update: doc.last_update,
            probability: doc.tweet_probability,
            min_spacing: doc.minimum_spacing,
            max_spacing: doc.maximum_spacing,
        }
    };
    let mut rng = rand::thread_rng();
    if bot.is_ready_for_update(ctx.flags.force, &timing, &mut rng) {
        for action in bot.create_update(&ctx.settings) {
            execute_action(action, ctx, client).await;
        }
    }
    debug!(phase = %RunPhase::Updated, queued = ctx.outbox.len(), "update step done");

    handle_mentions(bot, ctx, client).await;
    debug!(phase = %RunPhase::MentionsHandled, "mention step done");

    let handlers = bot.handlers();
    let outcome = drain(&ctx.bot_dir, &handlers, &ctx.log)?;
    for action in outcome.actions {
        execute_action(action, ctx, client).await;
    }
    debug!(
        phase = %RunPhase::EventsDrained,
        handled = outcome.handled,
        unknown = outcome.unknown,
        quarantined = outcome.quarantined,
        "mailbox drained"
    );

    let report = ctx.outbox.flush_all(client).await;
    if report.sent > 0 {
        ctx.settings.record_update(epoch_now());
    }
    debug!(phase = %RunPhase::Flushed, sent = report.sent, failed = report.failed, "outbox flushed");

    ctx.settings.doc_mut().last_executed =
        Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    ctx.settings.write()?;
    debug!(phase = %RunPhase::Persisted, "settings persisted");

    Ok(())
}

/// Fetches mentions past the cursor and lets the bot react to each.
///
/// The cursor advances to the newest fetched mention *before* any of them
/// are processed: a crash mid-batch then skips the batch on the next run
/// instead of replaying it forever.
async fn handle_mentions<B: Bot, C: StatusClient>(bot: &B, ctx: &mut RunContext, client: &C) {
    let cursor = ctx.settings.doc().last_mention_id.clone();
    let mentions = match client.fetch_mentions_since(cursor.as_ref()).await {
        Ok(mentions) => mentions,
        Err(err) => {
            warn!(%err, "failed to fetch mentions; skipping until next cycle");
            return;
        }
    };

    if let Some(newest) = mentions.first() {
        ctx.settings.doc_mut().last_mention_id = Some(newest.id.clone());
    }

    for mention in &mentions {
        for action in bot.handle_mention(mention) {
            execute_action(action, ctx, client).await;
        }
    }
}

/// Performs one bot action. Failures are per-action: a failed favorite
/// never takes the rest of the cycle down with it.
async fn execute_action<C: StatusClient>(action: BotAction, ctx: &mut RunContext, client: &C) {
    match action {
        BotAction::Post(update) => ctx.outbox.append(update),
        BotAction::Favorite { id } => {
            if let Err(err) = client.favorite(&id).await {
                warn!(%id, %err, "failed to favorite status");
            }
        }
        BotAction::Log { event, fields } => {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            if let Err(err) = ctx.log.append(&event, &fields) {
                warn!(%err, "failed to append bot log entry");
            }
        }
    }
}

fn epoch_now() -> u64 {
    let now = Utc::now().timestamp();
    if now < 0 {
        0
    } else {
        now as u64
    }
}
