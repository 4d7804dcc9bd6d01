//! Warning sink
//!
//! Non-fatal conditions (skipped archive members, dropped components) are
//! reported through an injected sink scoped to the invocation, so batch
//! callers and tests can capture them deterministically instead of
//! scraping process-wide logs.

use std::sync::{Arc, Mutex};

/// Receiver for non-fatal read warnings.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default sink: forwards to `tracing::warn!`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Sink that collects warnings in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    messages: Mutex<Vec<String>>,
}

impl CollectSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl WarningSink for CollectSink {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Shared sink handle used throughout the readers.
pub type SharedSink = Arc<dyn WarningSink>;

pub(crate) fn default_sink() -> SharedSink {
    Arc::new(TracingSink)
}
