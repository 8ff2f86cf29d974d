//! In-memory loopback link.
//!
//! Forwards every write into a Tokio channel so a "host" task in the
//! same process can consume the frames. Used by the demo binary and the
//! integration tests; it models an ideal radio that never drops.

use tokio::sync::mpsc;

use async_trait::async_trait;

use super::{LinkError, PadLink, WriteMode};

/// A frame delivered through the loopback, tagged with its write mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackFrame {
    pub bytes: Vec<u8>,
    pub mode: WriteMode,
}

/// A [`PadLink`] that delivers frames to an in-process receiver.
pub struct LoopbackLink {
    max_write_len: usize,
    tx: mpsc::UnboundedSender<LoopbackFrame>,
}

impl LoopbackLink {
    /// Creates a loopback link and the receiving end of its frame stream.
    pub fn new(max_write_len: usize) -> (Self, mpsc::UnboundedReceiver<LoopbackFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { max_write_len, tx }, rx)
    }
}

#[async_trait]
impl PadLink for LoopbackLink {
    fn max_write_len(&self) -> usize {
        self.max_write_len
    }

    async fn write(&self, bytes: &[u8], mode: WriteMode) -> Result<(), LinkError> {
        let frame = LoopbackFrame {
            bytes: bytes.to_vec(),
            mode,
        };
        // A dropped receiver means the peer side went away.
        self.tx.send(frame).map_err(|_| LinkError::Unavailable)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_delivers_frames_in_order() {
        // Arrange
        let (link, mut rx) = LoopbackLink::new(20);

        // Act
        link.write(&[1, 2], WriteMode::WithoutAck).await.unwrap();
        link.write(&[3], WriteMode::WithAck).await.unwrap();

        // Assert
        assert_eq!(
            rx.recv().await.unwrap(),
            LoopbackFrame { bytes: vec![1, 2], mode: WriteMode::WithoutAck }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            LoopbackFrame { bytes: vec![3], mode: WriteMode::WithAck }
        );
    }

    #[tokio::test]
    async fn test_loopback_reports_unavailable_after_receiver_drops() {
        // Arrange
        let (link, rx) = LoopbackLink::new(20);
        drop(rx);

        // Act
        let result = link.write(&[0], WriteMode::WithAck).await;

        // Assert
        assert!(matches!(result, Err(LinkError::Unavailable)));
    }
}
