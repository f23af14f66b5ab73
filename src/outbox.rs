//! The batched outbound update queue.
//!
//! Updates created during a run accumulate here and are sent in one pass at
//! the end, in insertion order, one at a time.
//!
//! # Flush policy
//!
//! Flushing is **best-effort**: a transport failure on one update is logged
//! and does not abort the remaining sends. After the pass the batch is
//! cleared regardless of per-item outcome: there is no retry layer in this
//! system, so holding failed updates would only post stale content on some
//! later cycle.

use tracing::{debug, warn};

use crate::client::StatusClient;
use crate::types::PendingUpdate;

/// In-memory ordered batch of pending updates. Never persisted.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<PendingUpdate>,
}

/// Per-item tally of one flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub sent: usize,
    pub failed: usize,
}

impl Outbox {
    pub fn new() -> Self {
        Outbox::default()
    }

    /// Queues an update. Insertion order is send order.
    pub fn append(&mut self, update: PendingUpdate) {
        self.pending.push(update);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The queued updates, oldest first.
    pub fn pending(&self) -> &[PendingUpdate] {
        &self.pending
    }

    /// Sends every pending update through `client`, best-effort, and clears
    /// the batch.
    pub async fn flush_all<C: StatusClient>(&mut self, client: &C) -> FlushReport {
        let mut report = FlushReport::default();

        for update in self.pending.drain(..) {
            match client.post_update(&update).await {
                Ok(()) => {
                    debug!(text = %update.text, "posted update");
                    report.sent += 1;
                }
                Err(err) => {
                    warn!(text = %update.text, %err, "failed to post update");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::types::{Mention, StatusId};
    use std::sync::Mutex;

    /// Scripted client: fails the sends whose (zero-based) ordinal is listed.
    struct ScriptedClient {
        fail_on: Vec<usize>,
        sent: Mutex<Vec<String>>,
        attempts: Mutex<usize>,
    }

    impl ScriptedClient {
        fn failing_on(fail_on: Vec<usize>) -> Self {
            ScriptedClient {
                fail_on,
                sent: Mutex::new(Vec::new()),
                attempts: Mutex::new(0),
            }
        }
    }

    impl StatusClient for ScriptedClient {
        async fn fetch_mentions_since(
            &self,
            _cursor: Option<&StatusId>,
        ) -> Result<Vec<Mention>, TransportError> {
            Ok(Vec::new())
        }

        async fn post_update(&self, update: &PendingUpdate) -> Result<(), TransportError> {
            let mut attempts = self.attempts.lock().unwrap();
            let ordinal = *attempts;
            *attempts += 1;
            if self.fail_on.contains(&ordinal) {
                return Err(TransportError::api(503, "server flaked"));
            }
            self.sent.lock().unwrap().push(update.text.clone());
            Ok(())
        }

        async fn favorite(&self, _id: &StatusId) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn best_effort_flush_continues_past_failures() {
        let client = ScriptedClient::failing_on(vec![0]);
        let mut outbox = Outbox::new();
        outbox.append(PendingUpdate::new("first"));
        outbox.append(PendingUpdate::new("second"));

        let report = outbox.flush_all(&client).await;

        // First send failed transport-wise, second still went out.
        assert_eq!(report, FlushReport { sent: 1, failed: 1 });
        assert_eq!(*client.sent.lock().unwrap(), vec!["second".to_string()]);
        assert!(outbox.is_empty(), "batch is cleared regardless of outcome");
    }

    #[tokio::test]
    async fn flush_preserves_insertion_order() {
        let client = ScriptedClient::failing_on(vec![]);
        let mut outbox = Outbox::new();
        for text in ["a", "b", "c"] {
            outbox.append(PendingUpdate::new(text));
        }

        let report = outbox.flush_all(&client).await;

        assert_eq!(report.sent, 3);
        assert_eq!(*client.sent.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn flushing_empty_outbox_is_a_no_op() {
        let client = ScriptedClient::failing_on(vec![]);
        let mut outbox = Outbox::new();

        let report = outbox.flush_all(&client).await;
        assert_eq!(report, FlushReport::default());
    }
}
