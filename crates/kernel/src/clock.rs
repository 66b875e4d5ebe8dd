/// Fixed-step accumulator: converts variable frame times into a whole number
/// of simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    /// Upper bound on ticks per frame; time beyond it is dropped.
    pub max_steps_per_frame: u32,
    dropped: f32,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        assert!(step > 0.0, "step must be positive");
        Self {
            step,
            accumulator: 0.0,
            max_steps_per_frame: 5,
            dropped: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's elapsed time and return how many ticks to run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_steps_per_frame {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if self.accumulator >= self.step {
            // Too far behind to catch up; keep only the sub-step remainder.
            let keep = self.accumulator % self.step;
            self.dropped += self.accumulator - keep;
            tracing::warn!(
                dropped_ms = (self.accumulator - keep) * 1000.0,
                "simulation falling behind, dropping time"
            );
            self.accumulator = keep;
        }
        ticks
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Total seconds discarded by the catch-up clamp.
    pub fn dropped(&self) -> f32 {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
