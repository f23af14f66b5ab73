//! minibot: a small framework for scheduled social-media bots.
//!
//! A bot built on this crate implements the [`Bot`] trait and runs in one
//! of two modes:
//!
//! - **batch** (default): one bounded cycle, meant to be invoked on a
//!   schedule (e.g. cron, once a minute). Maybe post, react to new
//!   mentions, drain spooled stream events, flush queued updates, persist
//!   state. See [`run`].
//! - **stream** (`--stream`): a long-lived listener that spools inbound
//!   stream events to disk for the next batch cycle to consume. The two
//!   modes run as separate processes and coordinate only through files in
//!   the bot directory.
//!
//! State that must survive between cycles lives in a single JSON settings
//! file ([`settings`]); everything else is rebuilt per run.

pub mod bot;
pub mod botlog;
pub mod cli;
pub mod client;
mod fsync;
pub mod mailbox;
pub mod outbox;
pub mod policy;
pub mod run;
pub mod settings;
pub mod stream;
pub mod types;

pub use bot::Bot;
pub use cli::BaseArgs;
pub use run::{run, run_cycle, RunContext, RunError};
