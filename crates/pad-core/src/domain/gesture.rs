//! Touch-to-gesture classification.
//!
//! Turns a continuous stream of timestamped pointer samples into discrete
//! input events. The classifier is pure state-machine logic: timestamps are
//! injected with each call and the long-press timer is modelled as a
//! deadline the driver polls (or arms a one-shot timer for), which keeps the
//! transitions independently testable without a live timer.
//!
//! States: Idle → Tracking → (Idle | LongPressFired).
//!
//! - A touch that stays within `move_threshold` and ends within
//!   `tap_threshold` is a left click.
//! - A touch that stays within `move_threshold` past `long_tap_threshold`
//!   fires a right click immediately at the deadline; nothing further is
//!   emitted on release.
//! - A touch that travels beyond `move_threshold` disarms the long-press
//!   deadline and emits a `Move` per sample from that point on. Distance
//!   wins over duration: such a touch is never classified as a tap, however
//!   quickly it is released.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::PadError;
use crate::protocol::wire::GestureKind;

/// One touch sample in the 2-D input plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub at: Instant,
}

/// A classified discrete input action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer motion; deltas are already scaled by the configured sensitivity.
    Move { dx: f32, dy: f32 },
    LeftClick,
    RightClick,
    /// Scroll motion from the momentum engine; sign follows natural scrolling.
    Scroll { dx: f32, dy: f32 },
    SwitchSpaceLeft,
    SwitchSpaceRight,
}

impl GestureEvent {
    /// Wire discriminant for this event.
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Move { .. } => GestureKind::Move,
            GestureEvent::LeftClick => GestureKind::LeftClick,
            GestureEvent::RightClick => GestureKind::RightClick,
            GestureEvent::Scroll { .. } => GestureKind::Scroll,
            GestureEvent::SwitchSpaceLeft => GestureKind::SwitchSpaceLeft,
            GestureEvent::SwitchSpaceRight => GestureKind::SwitchSpaceRight,
        }
    }

    /// Deltas to encode into the trackpad frame; zero for click-like events.
    pub fn deltas(&self) -> (f32, f32) {
        match self {
            GestureEvent::Move { dx, dy } | GestureEvent::Scroll { dx, dy } => (*dx, *dy),
            _ => (0.0, 0.0),
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Runtime-tunable gesture thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// A touch released within this many milliseconds counts as a tap.
    #[serde(default = "default_tap_threshold_ms")]
    pub tap_threshold_ms: u64,
    /// A stationary touch held this long fires a right click.
    #[serde(default = "default_long_tap_threshold_ms")]
    pub long_tap_threshold_ms: u64,
    /// Accumulated distance (in scaled units) beyond which a touch is a drag.
    #[serde(default = "default_move_threshold")]
    pub move_threshold: f32,
    /// Multiplier applied to raw deltas before accumulation and emission.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

fn default_tap_threshold_ms() -> u64 {
    200
}
fn default_long_tap_threshold_ms() -> u64 {
    750
}
fn default_move_threshold() -> f32 {
    5.0
}
fn default_sensitivity() -> f32 {
    3.0
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold_ms: default_tap_threshold_ms(),
            long_tap_threshold_ms: default_long_tap_threshold_ms(),
            move_threshold: default_move_threshold(),
            sensitivity: default_sensitivity(),
        }
    }
}

impl GestureConfig {
    /// Checks every threshold for validity.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::InvalidConfiguration`] on any zero or
    /// non-positive value. Construction is the only place this can fail; a
    /// built classifier never hits configuration errors at runtime.
    pub fn validate(&self) -> Result<(), PadError> {
        if self.tap_threshold_ms == 0 {
            return Err(PadError::InvalidConfiguration(
                "tap_threshold_ms must be positive".to_string(),
            ));
        }
        if self.long_tap_threshold_ms == 0 {
            return Err(PadError::InvalidConfiguration(
                "long_tap_threshold_ms must be positive".to_string(),
            ));
        }
        if !(self.move_threshold > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "move_threshold must be positive".to_string(),
            ));
        }
        if !(self.sensitivity > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "sensitivity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Tap window as a [`Duration`].
    pub fn tap_threshold(&self) -> Duration {
        Duration::from_millis(self.tap_threshold_ms)
    }

    /// Long-press window as a [`Duration`].
    pub fn long_tap_threshold(&self) -> Duration {
        Duration::from_millis(self.long_tap_threshold_ms)
    }
}

// ── Classifier ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Tracking,
    LongPressFired,
}

/// Classifies a stream of pointer samples into [`GestureEvent`]s.
///
/// All methods mutate classifier state and must be called from a single
/// input-handling timeline; no two samples may be processed concurrently.
#[derive(Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    phase: Phase,
    started_at: Option<Instant>,
    last_position: Option<(f32, f32)>,
    long_press_deadline: Option<Instant>,
    total_distance: f32,
}

impl GestureClassifier {
    /// Creates a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::InvalidConfiguration`] if any threshold is
    /// invalid; see [`GestureConfig::validate`].
    pub fn new(config: GestureConfig) -> Result<Self, PadError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            started_at: None,
            last_position: None,
            long_press_deadline: None,
            total_distance: 0.0,
        })
    }

    /// Feeds one pointer sample of an active touch.
    ///
    /// The first sample of a touch starts tracking and arms the long-press
    /// deadline. Subsequent samples accumulate travelled distance; once the
    /// touch qualifies as a drag the deadline is disarmed and every sample
    /// yields a `Move`.
    pub fn sample(&mut self, sample: PointerSample) -> Option<GestureEvent> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Tracking;
                self.started_at = Some(sample.at);
                self.last_position = Some((sample.x, sample.y));
                self.long_press_deadline = Some(sample.at + self.config.long_tap_threshold());
                self.total_distance = 0.0;
                None
            }
            Phase::LongPressFired => {
                // Right click already sent; move detection is disarmed for
                // the remainder of this touch.
                self.last_position = Some((sample.x, sample.y));
                None
            }
            Phase::Tracking => {
                let (last_x, last_y) = self.last_position?;
                let dx = (sample.x - last_x) * self.config.sensitivity;
                let dy = (sample.y - last_y) * self.config.sensitivity;
                self.total_distance += (dx * dx + dy * dy).sqrt();
                self.last_position = Some((sample.x, sample.y));

                if self.total_distance > self.config.move_threshold {
                    // The touch is a drag, not a stationary hold.
                    self.long_press_deadline = None;
                    Some(GestureEvent::Move { dx, dy })
                } else {
                    None
                }
            }
        }
    }

    /// Deadline at which the long press fires, for drivers that arm a
    /// one-shot timer. `None` while idle, after a drag disarmed it, or once
    /// the long press has fired.
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.long_press_deadline
    }

    /// Checks the long-press deadline against `now`.
    ///
    /// Emits `RightClick` exactly once when the deadline has passed while
    /// the touch is still stationary. A stale call after the touch ended is
    /// a no-op because [`end`](Self::end) clears the deadline synchronously.
    pub fn poll_long_press(&mut self, now: Instant) -> Option<GestureEvent> {
        if self.phase != Phase::Tracking {
            return None;
        }
        let deadline = self.long_press_deadline?;
        if now < deadline {
            return None;
        }
        self.phase = Phase::LongPressFired;
        self.long_press_deadline = None;
        Some(GestureEvent::RightClick)
    }

    /// Ends the touch and resets to idle.
    ///
    /// Emits `LeftClick` only when the touch stayed within `move_threshold`
    /// and was released within `tap_threshold`, and the long press did not
    /// already fire. The distance check takes priority: a touch that moved
    /// past the threshold is never a tap, even if released quickly.
    pub fn end(&mut self, now: Instant) -> Option<GestureEvent> {
        let phase = self.phase;
        let started_at = self.started_at;
        let total_distance = self.total_distance;

        self.phase = Phase::Idle;
        self.started_at = None;
        self.last_position = None;
        self.long_press_deadline = None;
        self.total_distance = 0.0;

        if phase != Phase::Tracking {
            return None;
        }
        let started_at = started_at?;
        if total_distance <= self.config.move_threshold
            && now.duration_since(started_at) < self.config.tap_threshold()
        {
            Some(GestureEvent::LeftClick)
        } else {
            None
        }
    }

    /// True while a touch is being tracked (including after long-press fire).
    pub fn is_touch_active(&self) -> bool {
        self.phase != Phase::Idle
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
