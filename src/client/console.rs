//! Debug-mode client: prints instead of touching the network.
//!
//! Used for `--debug` runs, which must be diagnostic-only. Mentions read as
//! empty (there is nothing to fetch without the network), and writes go to
//! stdout in an obvious form.

use crate::types::{Mention, PendingUpdate, StatusId};

use super::error::TransportError;
use super::StatusClient;

/// A [`StatusClient`] with no network side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleClient;

impl ConsoleClient {
    pub fn new() -> Self {
        ConsoleClient
    }
}

impl StatusClient for ConsoleClient {
    async fn fetch_mentions_since(
        &self,
        _cursor: Option<&StatusId>,
    ) -> Result<Vec<Mention>, TransportError> {
        Ok(Vec::new())
    }

    async fn post_update(&self, update: &PendingUpdate) -> Result<(), TransportError> {
        match &update.reply_to {
            Some(reply_to) => println!("REPLY to {}: {}", reply_to, update.text),
            None => println!("TWEET: {}", update.text),
        }
        Ok(())
    }

    async fn favorite(&self, id: &StatusId) -> Result<(), TransportError> {
        println!("FAVE: {id}");
        Ok(())
    }
}
