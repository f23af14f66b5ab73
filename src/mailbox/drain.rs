//! Reader side of the mailbox: drain, dispatch, delete.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::botlog::BotLog;
use crate::types::BotAction;

use super::event::StreamEvent;
use super::handlers::HandlerMap;
use super::{Result, STREAM_EXTENSION};

/// What one drain pass did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Actions collected from dispatched handlers, in event order.
    pub actions: Vec<BotAction>,

    /// Events dispatched to a registered handler.
    pub handled: usize,

    /// Events with no registered handler (logged and discarded).
    pub unknown: usize,

    /// Unparseable files renamed aside for inspection.
    pub quarantined: usize,
}

/// Drains every `*.stream` file in `dir`.
///
/// Files are processed in filename order: the uuid tokens carry no meaning,
/// but sorting keeps repeated drains deterministic instead of depending on
/// directory-listing order. Per file:
///
/// - parse, dispatch to the handler registered for the `event` tag, and
///   delete the file. Deletion is the acknowledgment.
/// - no handler for the tag: append an `UnknownStreamEvent` line to the bot
///   log and delete the file anyway; unknown events are not retried.
/// - unparseable body: rename to `*.stream.bad` and keep going. One bad
///   event must not block the rest of the mailbox.
///
/// A failed deletion is logged and skipped; the event may be seen again on
/// the next cycle (accepted at-least-once duplication).
///
/// # Errors
///
/// Only a directory listing failure is fatal. A missing directory counts as
/// an empty mailbox.
pub fn drain(dir: &Path, handlers: &HandlerMap, log: &BotLog) -> Result<DrainOutcome> {
    let mut outcome = DrainOutcome::default();

    if !dir.exists() {
        return Ok(outcome);
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e == STREAM_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read mailbox file");
                continue;
            }
        };

        match StreamEvent::from_slice(&bytes, &path) {
            Ok(event) => {
                match handlers.get(&event.kind) {
                    Some(handler) => {
                        outcome.actions.extend(handler(&event));
                        outcome.handled += 1;
                    }
                    None => {
                        if let Err(err) = log.append("UnknownStreamEvent", &[&event.kind]) {
                            warn!(%err, "failed to append UnknownStreamEvent log line");
                        }
                        outcome.unknown += 1;
                    }
                }
                remove_acknowledged(&path);
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "quarantining malformed mailbox file");
                quarantine(&path);
                outcome.quarantined += 1;
            }
        }
    }

    Ok(outcome)
}

/// Deletes a processed event file. Failure is non-fatal: the file will be
/// reprocessed next cycle.
fn remove_acknowledged(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        warn!(path = %path.display(), %err, "failed to delete processed mailbox file");
    }
}

/// Renames an unparseable file to `<name>.bad` so it stops matching the
/// drain glob but stays available for inspection.
fn quarantine(path: &Path) {
    let mut quarantined = path.as_os_str().to_owned();
    quarantined.push(".bad");
    if let Err(err) = std::fs::rename(path, PathBuf::from(&quarantined)) {
        warn!(path = %path.display(), %err, "failed to quarantine mailbox file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::spool_event;
    use crate::types::StatusId;
    use serde_json::json;
    use tempfile::tempdir;

    fn test_log(dir: &Path) -> BotLog {
        BotLog::new(dir, "drain-test.txt")
    }

    fn favoriting_handlers() -> HandlerMap {
        let mut handlers = HandlerMap::new();
        handlers.register("quoted_tweet", |event: &StreamEvent| {
            let id = event
                .pointer("/target_object/id_str")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            vec![BotAction::Favorite {
                id: StatusId::new(id),
            }]
        });
        handlers
    }

    #[test]
    fn drain_dispatches_deletes_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let handlers = favoriting_handlers();

        spool_event(
            dir.path(),
            &json!({"event": "quoted_tweet", "target_object": {"id_str": "123"}}),
        )
        .unwrap();

        let first = drain(dir.path(), &handlers, &log).unwrap();
        assert_eq!(first.handled, 1);
        assert_eq!(
            first.actions,
            vec![BotAction::Favorite {
                id: StatusId::new("123")
            }]
        );

        // A second drain after a complete drain processes zero files.
        let second = drain(dir.path(), &handlers, &log).unwrap();
        assert_eq!(second, DrainOutcome::default());
    }

    #[test]
    fn unknown_event_is_logged_and_discarded() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let handlers = HandlerMap::new(); // nothing registered

        let path = spool_event(
            dir.path(),
            &json!({"event": "quoted_tweet", "target_object": {"id_str": "123"}}),
        )
        .unwrap();

        let outcome = drain(dir.path(), &handlers, &log).unwrap();

        assert_eq!(outcome.unknown, 1);
        assert!(outcome.actions.is_empty());
        assert!(!path.exists(), "unknown events are still deleted");

        let contents =
            std::fs::read_to_string(dir.path().join("drain-test.txt")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("\tUnknownStreamEvent\tquoted_tweet"));
    }

    #[test]
    fn malformed_file_is_quarantined_and_others_still_processed() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let handlers = favoriting_handlers();

        std::fs::write(dir.path().join("00000000bad.stream"), b"{not json").unwrap();
        spool_event(
            dir.path(),
            &json!({"event": "quoted_tweet", "target_object": {"id_str": "9"}}),
        )
        .unwrap();

        let outcome = drain(dir.path(), &handlers, &log).unwrap();

        assert_eq!(outcome.quarantined, 1);
        assert_eq!(outcome.handled, 1);
        assert!(dir.path().join("00000000bad.stream.bad").exists());
        assert!(!dir.path().join("00000000bad.stream").exists());

        // Quarantined files do not match the glob, so they are not retried.
        let again = drain(dir.path(), &handlers, &log).unwrap();
        assert_eq!(again.quarantined, 0);
    }

    #[test]
    fn files_are_processed_in_filename_order() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let handlers = favoriting_handlers();

        // Write in reverse name order; drain must sort.
        for (name, id) in [("bb.stream", "2"), ("aa.stream", "1"), ("cc.stream", "3")] {
            std::fs::write(
                dir.path().join(name),
                serde_json::to_vec(
                    &json!({"event": "quoted_tweet", "target_object": {"id_str": id}}),
                )
                .unwrap(),
            )
            .unwrap();
        }

        let outcome = drain(dir.path(), &handlers, &log).unwrap();
        let ids: Vec<&str> = outcome
            .actions
            .iter()
            .map(|a| match a {
                BotAction::Favorite { id } => id.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn drain_ignores_temp_and_unrelated_files() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let handlers = HandlerMap::new();

        std::fs::write(dir.path().join("inflight.stream.tmp"), b"{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"unrelated").unwrap();
        std::fs::write(dir.path().join("old.stream.bad"), b"quarantined").unwrap();

        let outcome = drain(dir.path(), &handlers, &log).unwrap();
        assert_eq!(outcome, DrainOutcome::default());
        assert!(dir.path().join("inflight.stream.tmp").exists());
    }

    #[test]
    fn missing_directory_is_an_empty_mailbox() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path());
        let missing = dir.path().join("nonexistent");

        let outcome = drain(&missing, &HandlerMap::new(), &log).unwrap();
        assert_eq!(outcome, DrainOutcome::default());
    }
}
