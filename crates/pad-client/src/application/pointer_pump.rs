//! Pointer send pipeline.
//!
//! Gesture and scroll events are produced on the input side faster than
//! a small-packet radio should be asked to carry them. The pump decouples
//! the two: producers push [`GestureEvent`]s into a channel without
//! blocking, and a consumer task encodes each one into the 3-byte
//! trackpad frame and writes it to the link.
//!
//! Move frames are rate limited on the consumer side. A move that
//! arrives before the minimum interval has elapsed since the last
//! transmitted move is dropped, not queued; the next move carries the
//! fresher deltas anyway. Clicks, scrolls, and space switches are never
//! dropped and are sent acknowledged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use pad_core::{encode_trackpad_frame, GestureEvent, GestureKind, PadError};

use crate::infrastructure::link::{PadLink, WriteMode};

/// Producer handle for the pointer pump.
///
/// Cloneable; dropping every handle closes the channel and stops the
/// consumer task once the backlog drains.
#[derive(Clone)]
pub struct PointerPumpHandle {
    tx: mpsc::UnboundedSender<GestureEvent>,
}

impl PointerPumpHandle {
    /// Queues an event for transmission.
    ///
    /// Returns `false` when the pump task has already stopped.
    pub fn send(&self, event: GestureEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Spawns the pointer pump consumer task.
///
/// `move_sends_per_second` caps the rate of transmitted move frames.
/// The returned [`JoinHandle`] resolves when every producer handle has
/// been dropped and the backlog is drained.
///
/// # Errors
///
/// Returns [`PadError::InvalidConfiguration`] when
/// `move_sends_per_second` is zero.
pub fn spawn_pointer_pump(
    link: Arc<dyn PadLink>,
    move_sends_per_second: u32,
) -> Result<(PointerPumpHandle, JoinHandle<()>), PadError> {
    if move_sends_per_second == 0 {
        return Err(PadError::InvalidConfiguration(
            "move_sends_per_second must be at least 1".to_string(),
        ));
    }
    let min_move_interval = Duration::from_secs_f64(1.0 / f64::from(move_sends_per_second));

    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(pump_loop(link, rx, min_move_interval));
    Ok((PointerPumpHandle { tx }, task))
}

async fn pump_loop(
    link: Arc<dyn PadLink>,
    mut rx: mpsc::UnboundedReceiver<GestureEvent>,
    min_move_interval: Duration,
) {
    let mut last_move_sent: Option<Instant> = None;

    while let Some(event) = rx.recv().await {
        let kind = event.kind();

        if kind == GestureKind::Move {
            let now = Instant::now();
            let too_soon = last_move_sent
                .is_some_and(|sent| now.duration_since(sent) < min_move_interval);
            if too_soon {
                trace!("move frame dropped by rate limit");
                continue;
            }
            last_move_sent = Some(now);
        }

        let (dx, dy) = event.deltas();
        let frame = encode_trackpad_frame(dx, dy, kind);
        let mode = if kind == GestureKind::Move {
            WriteMode::WithoutAck
        } else {
            WriteMode::WithAck
        };

        // A failed pointer write is not fatal; the stream continues and
        // the host catches up from the next frame.
        if let Err(e) = link.write(&frame, mode).await {
            warn!(gesture = ?kind, "pointer frame write failed: {e}");
        }
    }

    debug!("pointer pump stopped");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::link::mock::RecordingLink;
    use pad_core::decode_trackpad_frame;

    fn spawn_with_link(moves_per_second: u32) -> (Arc<RecordingLink>, PointerPumpHandle, JoinHandle<()>) {
        let link = Arc::new(RecordingLink::new(8));
        let (handle, task) =
            spawn_pointer_pump(Arc::clone(&link) as Arc<dyn PadLink>, moves_per_second)
                .expect("spawn pump");
        (link, handle, task)
    }

    #[tokio::test]
    async fn test_click_events_are_sent_with_ack() {
        // Arrange
        let (link, handle, task) = spawn_with_link(120);

        // Act
        assert!(handle.send(GestureEvent::LeftClick));
        drop(handle);
        task.await.unwrap();

        // Assert
        let writes = link.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, WriteMode::WithAck);
        let frame = decode_trackpad_frame(&writes[0].0).unwrap();
        assert_eq!(frame.gesture, GestureKind::LeftClick);
    }

    #[tokio::test]
    async fn test_move_events_are_sent_without_ack() {
        // Arrange
        let (link, handle, task) = spawn_with_link(120);

        // Act
        assert!(handle.send(GestureEvent::Move { dx: 4.0, dy: -2.0 }));
        drop(handle);
        task.await.unwrap();

        // Assert
        let writes = link.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, WriteMode::WithoutAck);
        let frame = decode_trackpad_frame(&writes[0].0).unwrap();
        assert_eq!(frame.gesture, GestureKind::Move);
        assert_eq!(frame.delta_x, 6); // 4.0 scaled by 1.5
    }

    #[tokio::test]
    async fn test_back_to_back_moves_are_rate_limited() {
        // Arrange: 1 move per second makes the second immediate move stale
        let (link, handle, task) = spawn_with_link(1);

        // Act
        handle.send(GestureEvent::Move { dx: 1.0, dy: 0.0 });
        handle.send(GestureEvent::Move { dx: 2.0, dy: 0.0 });
        handle.send(GestureEvent::Move { dx: 3.0, dy: 0.0 });
        drop(handle);
        task.await.unwrap();

        // Assert: only the first move goes out
        assert_eq!(link.write_count(), 1);
    }

    #[tokio::test]
    async fn test_non_move_events_bypass_the_rate_limit() {
        // Arrange
        let (link, handle, task) = spawn_with_link(1);

        // Act: a move, then clicks well inside the move interval
        handle.send(GestureEvent::Move { dx: 1.0, dy: 0.0 });
        handle.send(GestureEvent::LeftClick);
        handle.send(GestureEvent::RightClick);
        drop(handle);
        task.await.unwrap();

        // Assert
        assert_eq!(link.write_count(), 3);
    }

    #[tokio::test]
    async fn test_pump_survives_link_write_failures() {
        // Arrange
        let (link, handle, task) = spawn_with_link(120);
        link.set_unavailable(true);

        // Act
        handle.send(GestureEvent::LeftClick);
        drop(handle);
        task.await.unwrap();
        link.set_unavailable(false);

        // Assert: the task exited cleanly despite the failure
        assert_eq!(link.write_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_rate_is_rejected() {
        // Arrange
        let link = Arc::new(RecordingLink::new(8));

        // Act
        let result = spawn_pointer_pump(link as Arc<dyn PadLink>, 0);

        // Assert
        assert!(matches!(result, Err(PadError::InvalidConfiguration(_))));
    }
}
