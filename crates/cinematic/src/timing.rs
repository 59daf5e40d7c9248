//! Elapsed-time bookkeeping and easing shared by leaf sequences.

/// Cubic ease-in/ease-out over `t` in `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Elapsed time and completion flag of one leaf sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceClock {
    duration: f32,
    elapsed: f32,
    complete: bool,
}

impl SequenceClock {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            complete: false,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advances by `delta_time`; returns `true` only on the completing frame.
    pub fn advance(&mut self, delta_time: f32) -> bool {
        if self.complete {
            return false;
        }
        self.elapsed += delta_time.max(0.0);
        if self.elapsed >= self.duration {
            self.complete = true;
            return true;
        }
        false
    }

    /// Linear progress `min(elapsed / duration, 1)`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.complete { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn eased_progress(&self) -> f32 {
        ease_in_out_cubic(self.progress())
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.complete = false;
    }
}
