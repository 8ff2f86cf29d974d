//! The outbound link abstraction.
//!
//! Everything the client sends travels over a [`PadLink`]: a short-range
//! wireless transport with a small maximum write size and two delivery
//! modes. The real radio binding lives outside this crate; the
//! implementations here are an in-memory loopback (used by the demo
//! binary and integration tests) and a recording double for unit tests.
//!
//! Acknowledged writes ([`WriteMode::WithAck`]) are used for clicks, app
//! requests, and chunked transfers where a lost packet would corrupt
//! state on the host. Unacknowledged writes ([`WriteMode::WithoutAck`])
//! are used for the high-rate pointer stream, where retransmitting a
//! stale delta is worse than dropping it.

pub mod loopback;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Delivery guarantee requested for a single link write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The transport confirms delivery before the write resolves.
    WithAck,
    /// Fire-and-forget. Lower latency, may be silently dropped.
    WithoutAck,
}

/// Error type for link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No peer is currently connected.
    #[error("link unavailable: no connected peer")]
    Unavailable,

    /// The transport reported a write failure.
    #[error("link write failed: {0}")]
    WriteFailed(String),
}

/// Outbound transport for all client traffic.
///
/// Implementations wrap a platform radio API. They must be cheap to
/// share behind an `Arc` because the pointer pump, transfer helpers,
/// and app-sync session all hold the same link.
#[async_trait]
pub trait PadLink: Send + Sync {
    /// Largest payload a single `write` may carry, in bytes.
    ///
    /// Chunked transfers use this to size their frames; callers must
    /// never pass a larger buffer to [`PadLink::write`].
    fn max_write_len(&self) -> usize;

    /// Sends one frame to the connected peer.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Unavailable`] when no peer is connected and
    /// [`LinkError::WriteFailed`] when the transport rejects the write.
    async fn write(&self, bytes: &[u8], mode: WriteMode) -> Result<(), LinkError>;
}
