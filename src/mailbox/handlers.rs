//! Explicit event-tag to handler mapping.
//!
//! Handlers are registered under the exact `event` tag string they serve.
//! They are pure: given the parsed event they return the [`BotAction`]s the
//! orchestrator should perform. Unregistered tags fall through to the
//! drain's "unknown event" branch.

use std::collections::HashMap;

use crate::types::BotAction;

use super::StreamEvent;

/// A registered stream-event handler.
pub type HandlerFn = Box<dyn Fn(&StreamEvent) -> Vec<BotAction> + Send + Sync>;

/// The handler set the mailbox dispatches over, keyed by event tag.
#[derive(Default)]
pub struct HandlerMap {
    handlers: HashMap<String, HandlerFn>,
}

impl HandlerMap {
    pub fn new() -> Self {
        HandlerMap::default()
    }

    /// Registers `handler` for the given event tag, replacing any previous
    /// registration for that tag.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        handler: impl Fn(&StreamEvent) -> Vec<BotAction> + Send + Sync + 'static,
    ) {
        self.handlers.insert(tag.into(), Box::new(handler));
    }

    /// Looks up the handler for a tag.
    pub fn get(&self, tag: &str) -> Option<&HandlerFn> {
        self.handlers.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("HandlerMap").field("tags", &tags).finish()
    }
}
