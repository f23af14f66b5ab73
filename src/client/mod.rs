//! The posting/reading collaborator.
//!
//! [`StatusClient`] is the seam between the framework and the social
//! network. The orchestrator depends only on this trait; production runs
//! use [`HttpStatusClient`], `--debug` runs use [`ConsoleClient`] (prints,
//! no network side effects), and tests script their own implementations.

mod console;
mod error;
mod http;

pub use console::ConsoleClient;
pub use error::TransportError;
pub use http::HttpStatusClient;

use crate::types::{Mention, PendingUpdate, StatusId};

/// Operations the framework needs from the social network.
///
/// `fetch_mentions_since` returns mentions newer than the cursor,
/// newest-first; the orchestrator relies on that ordering to advance the
/// cursor from index zero. All operations may fail with a
/// [`TransportError`]; none of them retry.
pub trait StatusClient {
    /// Fetches mentions newer than `cursor` (all available when `None`),
    /// ordered newest-first.
    async fn fetch_mentions_since(
        &self,
        cursor: Option<&StatusId>,
    ) -> Result<Vec<Mention>, TransportError>;

    /// Posts one status update.
    async fn post_update(&self, update: &PendingUpdate) -> Result<(), TransportError>;

    /// Favorites (likes) the status with the given ID.
    async fn favorite(&self, id: &StatusId) -> Result<(), TransportError>;
}
