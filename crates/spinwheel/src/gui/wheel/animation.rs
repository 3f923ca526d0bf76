//! Spin timing. Pure state machine: the caller supplies the clock and the
//! random source, the widget supplies the frame ticks.

use crate::config::SpinConfig;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use wheelkit::select::normalize_angle;

#[derive(Debug, Clone, PartialEq)]
pub struct SpinSettings {
    /// Seconds
    pub duration: RangeInclusive<f64>,
    /// Degrees
    pub rotation: RangeInclusive<f64>,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            duration: 3.0..=5.0,
            rotation: 720.0..=1440.0,
        }
    }
}

/// Upper bounds for configured spins: one minute, one hundred turns.
const MAX_DURATION_SECS: f64 = 60.0;
const MAX_ROTATION: f64 = 36_000.0;

fn ordered_range(a: f64, b: f64, max: f64) -> RangeInclusive<f64> {
    let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, max) };
    let (a, b) = (clamp(a), clamp(b));
    a.min(b)..=a.max(b)
}

impl SpinSettings {
    pub fn from_config(cfg: &SpinConfig) -> Self {
        Self {
            duration: ordered_range(
                cfg.min_duration.as_secs_f64(),
                cfg.max_duration.as_secs_f64(),
                MAX_DURATION_SECS,
            ),
            rotation: ordered_range(cfg.min_rotation, cfg.max_rotation, MAX_ROTATION),
        }
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinFrame {
    InFlight(f64),
    Finished(f64),
}

impl SpinFrame {
    pub fn angle(&self) -> f64 {
        match self {
            Self::InFlight(a) | Self::Finished(a) => *a,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub start_angle: f64,
    pub total_rotation: f64,
    pub duration: Duration,
}

impl SpinPlan {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, start_angle: f64, settings: &SpinSettings) -> Self {
        Self {
            start_angle,
            total_rotation: rng.gen_range(settings.rotation.clone()),
            duration: Duration::from_secs_f64(rng.gen_range(settings.duration.clone())),
        }
    }

    /// The exact resting angle; frame timing never shifts it.
    pub fn final_angle(&self) -> f64 {
        normalize_angle(self.start_angle + self.total_rotation)
    }

    pub fn frame_at(&self, elapsed: Duration) -> SpinFrame {
        if elapsed >= self.duration {
            return SpinFrame::Finished(self.final_angle());
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let rotation = self.total_rotation * ease_out_cubic(t);
        SpinFrame::InFlight(normalize_angle(self.start_angle + rotation))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum AnimatorState {
    #[default]
    Idle,
    Spinning {
        plan: SpinPlan,
        started: Instant,
    },
}

/// `Idle -> Spinning -> Idle`, one spin at a time.
#[derive(Debug, Default)]
pub struct Animator {
    state: AnimatorState,
}

impl Animator {
    pub fn is_spinning(&self) -> bool {
        matches!(self.state, AnimatorState::Spinning { .. })
    }

    /// Returns false, leaving the running spin alone, if one is in flight.
    pub fn start(&mut self, plan: SpinPlan, now: Instant) -> bool {
        if self.is_spinning() {
            return false;
        }
        self.state = AnimatorState::Spinning { plan, started: now };
        true
    }

    /// Frame for `now`; the finishing frame returns the animator to idle.
    pub fn advance(&mut self, now: Instant) -> Option<SpinFrame> {
        let AnimatorState::Spinning { plan, started } = self.state else {
            return None;
        };

        let frame = plan.frame_at(now.saturating_duration_since(started));
        if let SpinFrame::Finished(_) = frame {
            self.state = AnimatorState::Idle;
        }
        Some(frame)
    }

    pub fn cancel(&mut self) -> bool {
        let was_spinning = self.is_spinning();
        self.state = AnimatorState::Idle;
        was_spinning
    }
}
