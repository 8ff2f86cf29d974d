//! Scroll momentum: drag-phase batching plus post-release decay.
//!
//! While a drag is active, vertical deltas accumulate and are flushed as
//! scroll events whenever the accumulator reaches the configured threshold
//! (batching keeps the packet rate bounded). On release, the mean of the
//! last few instantaneous speeds becomes a synthetic velocity that a 60 Hz
//! tick decays exponentially until it falls below the floor, producing a
//! physically plausible coasting scroll.
//!
//! Scroll signs are inverted on emission to match the natural-scroll
//! convention: dragging down moves content down.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::domain::gesture::GestureEvent;
use crate::error::PadError;

/// How many instantaneous speeds feed the release-velocity average.
const RECENT_SPEED_WINDOW: usize = 5;

/// Runtime-tunable momentum parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Multiplier applied to every emitted scroll delta.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Per-tick velocity multiplier during post-release decay.
    #[serde(default = "default_deceleration")]
    pub deceleration: f32,
    /// Decay stops (and velocity snaps to 0) once |velocity| falls to this.
    #[serde(default = "default_min_velocity")]
    pub min_velocity: f32,
    /// Accumulated drag distance that triggers a flush.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Scales the averaged release speed down to a per-tick velocity.
    #[serde(default = "default_release_velocity_factor")]
    pub release_velocity_factor: f32,
}

fn default_sensitivity() -> f32 {
    1.0
}
fn default_deceleration() -> f32 {
    0.86
}
fn default_min_velocity() -> f32 {
    0.1
}
fn default_threshold() -> f32 {
    1.0
}
fn default_release_velocity_factor() -> f32 {
    0.01
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            deceleration: default_deceleration(),
            min_velocity: default_min_velocity(),
            threshold: default_threshold(),
            release_velocity_factor: default_release_velocity_factor(),
        }
    }
}

impl ScrollConfig {
    /// Checks every parameter for validity.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::InvalidConfiguration`] on non-positive values or
    /// a deceleration factor that would not decay (≥ 1.0).
    pub fn validate(&self) -> Result<(), PadError> {
        if !(self.sensitivity > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "scroll sensitivity must be positive".to_string(),
            ));
        }
        if !(self.deceleration > 0.0 && self.deceleration < 1.0) {
            return Err(PadError::InvalidConfiguration(
                "deceleration must be in (0, 1)".to_string(),
            ));
        }
        if !(self.min_velocity > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "min_velocity must be positive".to_string(),
            ));
        }
        if !(self.threshold > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "scroll threshold must be positive".to_string(),
            ));
        }
        if !(self.release_velocity_factor > 0.0) {
            return Err(PadError::InvalidConfiguration(
                "release_velocity_factor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts drag positions on the scroll surface into batched scroll events
/// and post-release momentum.
///
/// State is owned by the single input-handling timeline: drag samples and
/// decay ticks must never run concurrently.
#[derive(Debug)]
pub struct ScrollMomentumEngine {
    config: ScrollConfig,
    dragging: bool,
    accumulator: f32,
    recent_speeds: Vec<f32>,
    velocity: f32,
    last_sample: Option<(f32, Instant)>,
}

impl ScrollMomentumEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::InvalidConfiguration`] if any parameter is
    /// invalid; see [`ScrollConfig::validate`].
    pub fn new(config: ScrollConfig) -> Result<Self, PadError> {
        config.validate()?;
        Ok(Self {
            config,
            dragging: false,
            accumulator: 0.0,
            recent_speeds: Vec::with_capacity(RECENT_SPEED_WINDOW),
            velocity: 0.0,
            last_sample: None,
        })
    }

    /// Feeds one drag position on the scroll surface.
    ///
    /// The first sample of a drag resets all scroll state and emits nothing.
    /// Later samples accumulate the vertical delta and flush a `Scroll`
    /// event once `|accumulator| >= threshold`.
    pub fn drag_sample(&mut self, position_y: f32, at: Instant) -> Option<GestureEvent> {
        if !self.dragging {
            self.dragging = true;
            self.accumulator = 0.0;
            self.recent_speeds.clear();
            self.velocity = 0.0;
            self.last_sample = Some((position_y, at));
            return None;
        }

        let (last_y, last_at) = self.last_sample?;
        let delta_y = position_y - last_y;
        let delta_time = at.duration_since(last_at).as_secs_f32();

        if delta_time > 0.0 {
            if self.recent_speeds.len() == RECENT_SPEED_WINDOW {
                self.recent_speeds.remove(0);
            }
            self.recent_speeds.push(delta_y / delta_time);
        }

        self.accumulator += delta_y;
        self.last_sample = Some((position_y, at));

        if self.accumulator.abs() >= self.config.threshold {
            let amount = self.accumulator;
            self.accumulator = 0.0;
            Some(GestureEvent::Scroll {
                dx: 0.0,
                dy: -amount * self.config.sensitivity,
            })
        } else {
            None
        }
    }

    /// Ends the drag, flushing any residual accumulator and converting the
    /// recent speed history into a release velocity for the decay phase.
    pub fn end_drag(&mut self) -> Option<GestureEvent> {
        self.dragging = false;
        self.last_sample = None;

        let residual = if self.accumulator.abs() > 0.0 {
            let amount = self.accumulator;
            self.accumulator = 0.0;
            Some(GestureEvent::Scroll {
                dx: 0.0,
                dy: -amount * self.config.sensitivity,
            })
        } else {
            None
        };

        self.velocity = if self.recent_speeds.is_empty() {
            0.0
        } else {
            let mean: f32 =
                self.recent_speeds.iter().sum::<f32>() / self.recent_speeds.len() as f32;
            mean * self.config.sensitivity * self.config.release_velocity_factor
        };

        residual
    }

    /// One step of the fixed-rate (60 Hz) decay tick.
    ///
    /// The tick is ambient: it runs regardless of drag state and becomes a
    /// no-op while dragging or once the velocity has reached the floor.
    /// Below the floor the velocity snaps to exactly 0 so stale momentum
    /// can never bleed into a later drag.
    pub fn tick(&mut self) -> Option<GestureEvent> {
        if self.dragging || self.velocity.abs() <= self.config.min_velocity {
            if !self.dragging {
                self.velocity = 0.0;
            }
            return None;
        }

        self.velocity *= self.config.deceleration;
        Some(GestureEvent::Scroll {
            dx: 0.0,
            dy: -self.velocity,
        })
    }

    /// Current post-release velocity; 0 once decay has finished.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// True while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
