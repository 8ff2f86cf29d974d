//! Recording link double for unit and integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LinkError, PadLink, WriteMode};

/// A [`PadLink`] that records every write instead of transmitting.
///
/// Failure injection: `fail_after(n)` makes the n-th and all later
/// writes fail, and `set_unavailable(true)` makes every write report a
/// missing peer.
pub struct RecordingLink {
    max_write_len: usize,
    writes: Mutex<Vec<(Vec<u8>, WriteMode)>>,
    fail_after: Mutex<Option<usize>>,
    unavailable: AtomicBool,
}

impl RecordingLink {
    pub fn new(max_write_len: usize) -> Self {
        Self {
            max_write_len,
            writes: Mutex::new(Vec::new()),
            fail_after: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Snapshot of all recorded writes, in order.
    pub fn writes(&self) -> Vec<(Vec<u8>, WriteMode)> {
        self.writes.lock().expect("writes lock").clone()
    }

    /// Number of writes recorded so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("writes lock").len()
    }

    /// Makes writes fail once `n` writes have been recorded.
    pub fn fail_after(&self, n: usize) {
        *self.fail_after.lock().expect("fail_after lock") = Some(n);
    }

    /// Toggles the no-peer state.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }
}

#[async_trait]
impl PadLink for RecordingLink {
    fn max_write_len(&self) -> usize {
        self.max_write_len
    }

    async fn write(&self, bytes: &[u8], mode: WriteMode) -> Result<(), LinkError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(LinkError::Unavailable);
        }

        let mut writes = self.writes.lock().expect("writes lock");
        if let Some(limit) = *self.fail_after.lock().expect("fail_after lock") {
            if writes.len() >= limit {
                return Err(LinkError::WriteFailed("injected failure".to_string()));
            }
        }

        assert!(
            bytes.len() <= self.max_write_len,
            "write of {} bytes exceeds link maximum of {}",
            bytes.len(),
            self.max_write_len
        );
        writes.push((bytes.to_vec(), mode));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
