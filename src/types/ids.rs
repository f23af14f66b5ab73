//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifier kinds (e.g.
//! using an author handle where a status ID is expected). Status IDs are
//! opaque strings: the network assigns them and the bot only ever stores,
//! compares, and echoes them back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque status (or mention) identifier assigned by the network.
///
/// Also used as the mention cursor: the settings store persists the ID of
/// the most recently processed mention so the next run can fetch only the
/// unseen batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub String);

impl StatusId {
    pub fn new(s: impl Into<String>) -> Self {
        StatusId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StatusId {
    fn from(s: String) -> Self {
        StatusId(s)
    }
}

impl From<&str> for StatusId {
    fn from(s: &str) -> Self {
        StatusId(s.to_string())
    }
}

/// An author handle (screen name), without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub String);

impl Handle {
    pub fn new(s: impl Into<String>) -> Self {
        Handle(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<&str> for Handle {
    fn from(s: &str) -> Self {
        Handle(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn status_id_serde_roundtrip(s in "[0-9]{1,19}") {
            let id = StatusId::new(&s);
            let json = serde_json::to_string(&id).unwrap();
            let parsed: StatusId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(id, parsed);
        }

        #[test]
        fn handle_display_prefixes_at(s in "[a-zA-Z0-9_]{1,15}") {
            let handle = Handle::new(&s);
            prop_assert_eq!(format!("{}", handle), format!("@{}", s));
        }
    }

    #[test]
    fn status_id_is_transparent_in_json() {
        let id = StatusId::new("1234567890");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""1234567890""#);
    }
}
