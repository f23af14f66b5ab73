//! File-based event mailbox between the streaming listener and the batch
//! worker.
//!
//! The two deployment modes run as separate processes and coordinate only
//! through a shared directory. The listener writes one file per inbound
//! event:
//!
//! ```text
//! <botPath>/<unique-token>.stream      - one JSON event, ready to consume
//! <botPath>/<unique-token>.stream.tmp  - in-flight write, ignored by drain
//! <botPath>/<unique-token>.stream.bad  - quarantined (unparseable) event
//! ```
//!
//! The batch worker drains the directory on each run: parse, dispatch by
//! the `event` tag, then delete. Deletion is the acknowledgment; there is
//! no separate ack step. If a deletion fails the event may be seen again on
//! the next cycle; at-least-once delivery is accepted.
//!
//! # Concurrency
//!
//! Unique filenames (uuid v4) make writer/writer collisions impossible, and
//! file presence is the only synchronization primitive between writer and
//! reader. At most one reader runs at a time; that is an operational
//! invariant (the scheduling interval must exceed the worst-case runtime),
//! not something this module enforces.

mod drain;
mod event;
mod handlers;
mod spool;

pub use drain::{drain, DrainOutcome};
pub use event::StreamEvent;
pub use handlers::HandlerMap;
pub use spool::{spool_event, STREAM_EXTENSION};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during mailbox operations.
#[derive(Debug, Error)]
pub enum MailboxError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event body was valid JSON but not an object.
    #[error("event file is not a JSON object: {path}")]
    NotAnObject { path: PathBuf },

    /// The event object has no string `event` tag.
    #[error("event file has no \"event\" tag: {path}")]
    MissingEventTag { path: PathBuf },
}

/// Result type for mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;
