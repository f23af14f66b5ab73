//! Core domain types shared across the framework.

pub mod ids;

pub use ids::{Handle, StatusId};

use serde::{Deserialize, Serialize};

/// A status update waiting to be sent.
///
/// Pending updates are transient: they accumulate in the outbox during a
/// single run and are consumed exactly once at flush time. They are never
/// persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    /// The status text to post.
    pub text: String,

    /// The status this update replies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<StatusId>,
}

impl PendingUpdate {
    /// Creates a plain (non-reply) status update.
    pub fn new(text: impl Into<String>) -> Self {
        PendingUpdate {
            text: text.into(),
            reply_to: None,
        }
    }

    /// Creates a reply to an existing status.
    pub fn reply(text: impl Into<String>, reply_to: StatusId) -> Self {
        PendingUpdate {
            text: text.into(),
            reply_to: Some(reply_to),
        }
    }
}

/// A status that mentions the bot, fetched from the network.
///
/// Mentions are read-only and never persisted; only the cursor (the ID of
/// the newest processed mention) survives across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub id: StatusId,
    pub author: Handle,
    pub text: String,
}

/// An action a bot wants the orchestrator to perform.
///
/// Mention handlers and mailbox event handlers are pure: they describe what
/// should happen as data, and the orchestrator executes it. This keeps the
/// handlers testable without any network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// Favorite (like) the status with the given ID.
    Favorite { id: StatusId },

    /// Queue a status update in the outbox.
    Post(PendingUpdate),

    /// Append one entry to the bot log. Bots choose their own log
    /// vocabulary this way (`Tweet`, `Reply`, `Mention`, ...).
    Log { event: String, fields: Vec<String> },
}

impl BotAction {
    /// Convenience constructor for the log-entry action.
    pub fn log(
        event: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        BotAction::Log {
            event: event.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}
