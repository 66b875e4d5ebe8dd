use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of the most recent frame times, for the HUD's FPS readout.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
}

impl FrameTimer {
    /// A window of `capacity` frames; zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a frame time, dropping the oldest once the window is full.
    pub fn record(&mut self, frame: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(frame);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        match self.window.len() {
            0 => Duration::ZERO,
            n => self.window.iter().sum::<Duration>() / n as u32,
        }
    }

    /// Slowest frame in the window.
    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or_default()
    }

    /// Frames per second over the window; zero before the first frame.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fresh_timer_reads_zero() {
        let timer = FrameTimer::new(120);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.max(), Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn steady_sixty_hz() {
        let mut timer = FrameTimer::new(60);
        for _ in 0..90 {
            timer.record(Duration::from_micros(16_667));
        }
        assert_eq!(timer.count(), 60);
        assert!((timer.fps() - 60.0).abs() < 0.1);
    }

    #[test]
    fn hitch_shows_in_max_then_ages_out() {
        let mut timer = FrameTimer::new(4);
        for frame in [ms(16), ms(16), ms(100), ms(16)] {
            timer.record(frame);
        }
        assert_eq!(timer.max(), ms(100));
        assert_eq!(timer.min(), ms(16));
        assert_eq!(timer.average(), Duration::from_micros(37_000));

        for _ in 0..3 {
            timer.record(ms(16));
        }
        assert_eq!(timer.max(), ms(16));
    }

    #[test]
    fn zero_capacity_keeps_last_frame() {
        let mut timer = FrameTimer::new(0);
        timer.record(ms(10));
        timer.record(ms(40));
        assert_eq!(timer.count(), 1);
        assert_eq!(timer.average(), ms(40));
    }
}
