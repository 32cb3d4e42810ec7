//! Click event model for asynchronous click counting.

/// A successful resolve waiting to be counted.
///
/// Sent from the resolver to the background worker through a bounded
/// channel so redirects never wait on the increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub short_key: String,
}

impl ClickEvent {
    pub fn new(short_key: impl Into<String>) -> Self {
        Self {
            short_key: short_key.into(),
        }
    }
}
