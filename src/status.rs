//! Progress notification seam
//!
//! The builder and fetch layers emit human-readable progress lines through
//! this trait. Notification is fire-and-forget and never required for
//! correctness; callers without an observer pass [`NullSink`].

/// Receiver for human-readable progress messages.
pub trait StatusSink {
    fn notify(&self, message: &str);
}

/// No-op sink used when no observer is attached.
#[derive(Debug, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn notify(&self, _message: &str) {}
}
