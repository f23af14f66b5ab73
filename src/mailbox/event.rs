//! The parsed form of one mailbox event file.

use std::path::Path;

use serde_json::Value;

use super::MailboxError;

/// One inbound stream event: a JSON object carrying an `event` type tag
/// plus arbitrary payload fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    /// The `event` tag, used to select a handler.
    pub kind: String,

    // The full event object, tag included. Always a Value::Object.
    payload: Value,
}

impl StreamEvent {
    /// Parses an event from raw file bytes.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not JSON, not an object, or the object has no
    /// string `event` field. `origin` is only used to name the offending
    /// file in the error.
    pub fn from_slice(bytes: &[u8], origin: &Path) -> Result<Self, MailboxError> {
        let payload: Value = serde_json::from_slice(bytes)?;
        if !payload.is_object() {
            return Err(MailboxError::NotAnObject {
                path: origin.to_path_buf(),
            });
        }

        let kind = match payload.get("event").and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => {
                return Err(MailboxError::MissingEventTag {
                    path: origin.to_path_buf(),
                })
            }
        };

        Ok(StreamEvent { kind, payload })
    }

    /// Returns a top-level payload field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Returns a nested value by JSON pointer (e.g. `/target_object/id_str`),
    /// with standard `~0`/`~1` token escaping.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.payload.pointer(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("test.stream")
    }

    #[test]
    fn parses_tag_and_payload() {
        let body = br#"{"event":"quoted_tweet","target_object":{"id_str":"123"}}"#;
        let event = StreamEvent::from_slice(body, &origin()).unwrap();
        assert_eq!(event.kind, "quoted_tweet");
        assert_eq!(
            event.pointer("/target_object/id_str").and_then(|v| v.as_str()),
            Some("123")
        );
        assert!(event.field("target_object").is_some());
    }

    #[test]
    fn pointer_handles_escaped_tokens() {
        let body = br#"{"event":"x","a/b":{"m~n":7}}"#;
        let event = StreamEvent::from_slice(body, &origin()).unwrap();
        assert_eq!(
            event.pointer("/a~1b/m~0n").and_then(|v| v.as_i64()),
            Some(7)
        );
        assert!(event.pointer("/a/b").is_none());
    }

    #[test]
    fn rejects_non_object() {
        let err = StreamEvent::from_slice(b"[1,2,3]", &origin()).unwrap_err();
        assert!(matches!(err, MailboxError::NotAnObject { .. }));
    }

    #[test]
    fn rejects_missing_tag() {
        let err = StreamEvent::from_slice(br#"{"source":"x"}"#, &origin()).unwrap_err();
        assert!(matches!(err, MailboxError::MissingEventTag { .. }));
    }

    #[test]
    fn rejects_non_string_tag() {
        let err = StreamEvent::from_slice(br#"{"event":7}"#, &origin()).unwrap_err();
        assert!(matches!(err, MailboxError::MissingEventTag { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = StreamEvent::from_slice(b"{not json", &origin()).unwrap_err();
        assert!(matches!(err, MailboxError::Json(_)));
    }
}
