//! The capability interface a concrete bot supplies.
//!
//! The orchestrator depends only on this trait. Defaults cover the common
//! case (post on the rate-limit policy's say-so, log and favorite every
//! mention, handle no stream events), so a minimal bot only has to name
//! itself and produce update text.

use rand::RngCore;

use crate::mailbox::HandlerMap;
use crate::policy::{should_post_now, PostTiming};
use crate::run::RunContext;
use crate::settings::{Settings, SettingsDoc};
use crate::types::{BotAction, Mention, PendingUpdate};

/// Bot-specific behavior plugged into the run orchestrator.
pub trait Bot {
    /// The bot's name. Names the settings file (`<botPath>/<name>.json`).
    fn name(&self) -> &str;

    /// Defaults used to seed a fresh settings file. Override to add
    /// bot-specific keys for the operator to edit.
    fn default_settings(&self) -> SettingsDoc {
        SettingsDoc::default()
    }

    /// Decides whether this cycle should produce an update.
    ///
    /// The default defers to the rate-limit policy. Overrides are free to
    /// use their own timing logic; they should still honor `force`.
    fn is_ready_for_update(&self, force: bool, timing: &PostTiming, rng: &mut dyn RngCore) -> bool {
        should_post_now(force, timing, rng)
    }

    /// Produces this cycle's update, if the bot has something to say.
    ///
    /// Typically one `Post` action plus a `Log` entry describing it; an
    /// empty vector means nothing to post this cycle.
    fn create_update(&self, settings: &Settings) -> Vec<BotAction>;

    /// Reacts to one mention. The default logs a `Mention` line and
    /// favorites it.
    fn handle_mention(&self, mention: &Mention) -> Vec<BotAction> {
        vec![
            BotAction::log("Mention", [mention.author.as_str()]),
            BotAction::Favorite {
                id: mention.id.clone(),
            },
        ]
    }

    /// The stream-event handlers this bot registers, keyed by event tag.
    fn handlers(&self) -> HandlerMap {
        HandlerMap::new()
    }

    /// Runs before the main body of a run (either mode).
    fn pre_run(&self, _ctx: &mut RunContext) {}

    /// Runs after the main body of a run completes.
    fn post_run(&self, _ctx: &mut RunContext) {}
}
