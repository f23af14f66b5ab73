//! The streaming listener: the writer side of the mailbox.
//!
//! Runs as its own long-lived process (`--stream`). It reads records off a
//! live feed and spools the ones carrying an event tag into the mailbox
//! directory for the next batch cycle to drain. It never dispatches
//! handlers and never posts; reacting is the batch worker's job.
//!
//! There is no reconnect logic. When the feed drops, the listener exits and
//! the process supervisor is expected to restart it.

use std::path::Path;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::TransportError;
use crate::mailbox::spool_event;

/// Endpoint the listener connects to when the settings file does not name
/// one under `streamUrl`.
pub const DEFAULT_STREAM_URL: &str = "https://userstream.twitter.com/1.1/user.json";

/// A source of decoded stream records.
///
/// `next_record` yields `Ok(None)` when the feed ends cleanly and an error
/// when the transport fails mid-stream.
pub trait StreamSource {
    async fn next_record(&mut self) -> Result<Option<Value>, TransportError>;
}

/// Why the listener stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// Cancelled from outside (usually ctrl-c).
    Interrupted,
    /// The feed ended cleanly.
    FeedClosed,
    /// The transport failed mid-stream.
    TransportFailed,
}

/// Tally of one listener session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenSummary {
    /// Records spooled into the mailbox.
    pub spooled: usize,
    /// Records without an event tag, dropped.
    pub ignored: usize,
    pub disconnect: Disconnect,
}

/// Consumes `source` until cancellation, clean close, or transport failure,
/// spooling every record that carries an `"event"` tag into `mailbox_dir`.
///
/// Records without the tag (timeline statuses, deletions, friend lists) are
/// not this framework's concern and are dropped. A spool failure is logged
/// and the record is dropped; the session keeps going.
pub async fn listen<S: StreamSource>(
    source: &mut S,
    mailbox_dir: &Path,
    cancel: CancellationToken,
) -> ListenSummary {
    let mut spooled = 0;
    let mut ignored = 0;

    let disconnect = loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("interrupt received, disconnecting from stream");
                break Disconnect::Interrupted;
            }

            record = source.next_record() => match record {
                Ok(Some(value)) => {
                    if value.get("event").is_some() {
                        match spool_event(mailbox_dir, &value) {
                            Ok(path) => {
                                debug!(path = %path.display(), "spooled stream event");
                                spooled += 1;
                            }
                            Err(err) => warn!(%err, "failed to spool stream event"),
                        }
                    } else {
                        ignored += 1;
                    }
                }
                Ok(None) => {
                    info!("stream feed closed");
                    break Disconnect::FeedClosed;
                }
                Err(err) => {
                    error!(%err, "stream transport failed");
                    break Disconnect::TransportFailed;
                }
            }
        }
    };

    info!(spooled, ignored, ?disconnect, "listener session ended");
    ListenSummary {
        spooled,
        ignored,
        disconnect,
    }
}

type ByteChunks = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// [`StreamSource`] over a line-delimited JSON HTTP stream.
///
/// Empty lines are keep-alives and are skipped; lines that fail to parse
/// are logged and skipped.
pub struct HttpStreamSource {
    chunks: ByteChunks,
    buffer: Vec<u8>,
    done: bool,
}

impl HttpStreamSource {
    /// Opens the stream. Fails on connection errors or a non-success
    /// response status.
    pub async fn connect(url: &str, token: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("minibot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let resp = client.get(url).bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::api(status.as_u16(), status.to_string()));
        }
        info!(url, "connected to stream");
        Ok(HttpStreamSource {
            chunks: Box::pin(resp.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec()))),
            buffer: Vec::new(),
            done: false,
        })
    }

    /// Takes one complete line out of the buffer, without its terminator.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }
}

impl StreamSource for HttpStreamSource {
    async fn next_record(&mut self) -> Result<Option<Value>, TransportError> {
        loop {
            while let Some(line) = self.take_line() {
                if line.is_empty() {
                    // Keep-alive.
                    continue;
                }
                match serde_json::from_slice(&line) {
                    Ok(value) => return Ok(Some(value)),
                    Err(err) => warn!(%err, "skipping unparseable stream line"),
                }
            }
            if self.done {
                return Ok(None);
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => return Err(TransportError::from(err)),
                None => self.done = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::STREAM_EXTENSION;
    use serde_json::json;
    use std::collections::VecDeque;

    struct ScriptedSource {
        records: VecDeque<Result<Option<Value>, TransportError>>,
    }

    impl ScriptedSource {
        fn new(records: Vec<Result<Option<Value>, TransportError>>) -> Self {
            ScriptedSource {
                records: records.into(),
            }
        }
    }

    impl StreamSource for ScriptedSource {
        async fn next_record(&mut self) -> Result<Option<Value>, TransportError> {
            self.records.pop_front().unwrap_or(Ok(None))
        }
    }

    fn spooled_files(dir: &Path) -> Vec<std::path::PathBuf> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == STREAM_EXTENSION))
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn tagged_records_are_spooled_and_untagged_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(Some(json!({"event": "favorite", "source": {"screen_name": "alice"}}))),
            Ok(Some(json!({"text": "just a timeline status"}))),
            Ok(Some(json!({"event": "quoted_tweet"}))),
            Ok(None),
        ]);

        let summary = listen(&mut source, dir.path(), CancellationToken::new()).await;

        assert_eq!(summary.spooled, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.disconnect, Disconnect::FeedClosed);
        assert_eq!(spooled_files(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_ends_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(Some(json!({"event": "follow"}))),
            Err(TransportError::message("connection reset")),
            Ok(Some(json!({"event": "never_reached"}))),
        ]);

        let summary = listen(&mut source, dir.path(), CancellationToken::new()).await;

        assert_eq!(summary.disconnect, Disconnect::TransportFailed);
        assert_eq!(summary.spooled, 1);
        assert_eq!(spooled_files(dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn cancellation_disconnects_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![Ok(Some(json!({"event": "favorite"})))]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = listen(&mut source, dir.path(), cancel).await;

        assert_eq!(summary.disconnect, Disconnect::Interrupted);
        assert_eq!(summary.spooled, 0);
    }

    #[tokio::test]
    async fn line_buffer_handles_split_and_batched_lines() {
        let parts: Vec<Result<Vec<u8>, reqwest::Error>> = vec![
            Ok(b"{\"event\":".to_vec()),
            Ok(b"\"favorite\"}\n\r\n{\"text\":\"x\"}\n".to_vec()),
        ];
        let mut source = HttpStreamSource {
            chunks: Box::pin(futures::stream::iter(parts)),
            buffer: Vec::new(),
            done: false,
        };

        let first = source.next_record().await.unwrap().unwrap();
        assert_eq!(first, json!({"event": "favorite"}));
        // The blank keep-alive line in between is skipped.
        let second = source.next_record().await.unwrap().unwrap();
        assert_eq!(second, json!({"text": "x"}));
        assert!(source.next_record().await.unwrap().is_none());
    }
}
