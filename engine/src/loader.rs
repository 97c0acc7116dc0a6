//! Smiling-face loading animation.
//!
//! Purely decorative: the face blinks and its smile widens and relaxes on a
//! fixed cycle. The TUI reads a [`LoaderFrame`] each draw.

use std::time::Duration;

pub const LOADER_CYCLE: Duration = Duration::from_millis(1200);

const BLINK_START: f32 = 0.82;
const BLINK_END: f32 = 0.94;
const MAX_SMILE: u8 = 3;

fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// One rendered pose of the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderFrame {
    pub eyes_open: bool,
    /// Smile width, `0..=3`.
    pub smile: u8,
}

impl LoaderFrame {
    pub const RESTING: Self = Self {
        eyes_open: true,
        smile: 2,
    };
}

#[derive(Debug, Clone)]
pub struct LoaderAnimation {
    elapsed: Duration,
    cycle: Duration,
    reduced_motion: bool,
}

impl LoaderAnimation {
    #[must_use]
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            elapsed: Duration::ZERO,
            cycle: LOADER_CYCLE,
            reduced_motion,
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        if self.reduced_motion || self.cycle.is_zero() {
            return;
        }
        let cycle_nanos = self.cycle.as_nanos();
        let wrapped = (self.elapsed + delta).as_nanos() % cycle_nanos;
        self.elapsed = Duration::from_nanos(u64::try_from(wrapped).unwrap_or(0));
    }

    /// Restart from the first pose.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Position within the current cycle, `0.0..1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        normalized_progress(self.elapsed, self.cycle)
    }

    #[must_use]
    pub fn frame(&self) -> LoaderFrame {
        if self.reduced_motion {
            return LoaderFrame::RESTING;
        }
        let t = self.progress();
        let eyes_open = !(BLINK_START..BLINK_END).contains(&t);
        let wave = (t * std::f32::consts::TAU).sin().mul_add(0.5, 0.5);
        let smile = (wave * f32::from(MAX_SMILE)).round() as u8;
        LoaderFrame {
            eyes_open,
            smile: smile.min(MAX_SMILE),
        }
    }
}
