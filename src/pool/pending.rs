use tokio::sync::oneshot;

use super::Blob;

/// A suspended caller waiting for a chunk.
///
/// Wraps a single-fulfillment slot: the pool completes it at most once, and
/// the waiting side observes the granted blob when it resumes.
pub(crate) struct PendingRequest {
    slot: oneshot::Sender<Blob>,
}

impl PendingRequest {
    /// Create a request and the receiver its caller awaits.
    pub(crate) fn new() -> (Self, oneshot::Receiver<Blob>) {
        let (slot, rx) = oneshot::channel();
        (Self { slot }, rx)
    }

    /// Complete the request with a blob.
    ///
    /// Hands the blob back if the waiter has gone away.
    pub(crate) fn fulfill(self, blob: Blob) -> Result<(), Blob> {
        self.slot.send(blob)
    }

    /// True once the waiting side dropped its receiver.
    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.slot.is_closed()
    }
}
