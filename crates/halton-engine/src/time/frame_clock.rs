use std::time::{Duration, Instant};

/// Timing for one frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to the clock's bounds.
    pub dt: f32,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Frame rate measured over the last half second.
    pub fps: f32,
}

/// Wall-clock frame timer.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    min_dt: Duration,
    max_dt: Duration,
    fps: FpsWindow,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::with_bounds(Duration::from_micros(100), Duration::from_millis(250))
    }
}

impl FrameClock {
    /// `dt` is clamped into `[min_dt, max_dt]` so debugger pauses and
    /// minimized stretches do not produce huge steps.
    pub fn with_bounds(min_dt: Duration, max_dt: Duration) -> Self {
        let now = Instant::now();
        Self { start: now, last: now, min_dt, max_dt: max_dt.max(min_dt), fps: FpsWindow::new(0.5) }
    }

    /// Forgets the time since the last tick, e.g. after a device switch.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = now.saturating_duration_since(std::mem::replace(&mut self.last, now));
        self.fps.push(raw.as_secs_f32());
        FrameTime {
            dt: raw.clamp(self.min_dt, self.max_dt).as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f64(),
            fps: self.fps.rate,
        }
    }
}

/// Frames counted over a fixed span of seconds; `rate` updates when a span completes.
#[derive(Debug, Clone)]
struct FpsWindow {
    span: f32,
    seconds: f32,
    frames: u32,
    rate: f32,
}

impl FpsWindow {
    fn new(span: f32) -> Self {
        Self { span, seconds: 0.0, frames: 0, rate: 0.0 }
    }

    fn push(&mut self, dt: f32) {
        self.seconds += dt;
        self.frames += 1;
        if self.seconds >= self.span {
            self.rate = self.frames as f32 / self.seconds;
            self.seconds = 0.0;
            self.frames = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_stays_within_bounds() {
        let mut clock = FrameClock::with_bounds(Duration::from_millis(5), Duration::from_millis(10));
        for _ in 0..3 {
            let t = clock.tick();
            assert!((0.005..=0.010).contains(&t.dt), "dt = {}", t.dt);
        }
    }

    #[test]
    fn elapsed_never_decreases() {
        let mut clock = FrameClock::default();
        let a = clock.tick().elapsed;
        let b = clock.tick().elapsed;
        assert!(b >= a);
    }

    #[test]
    fn rate_is_zero_before_the_first_span() {
        let mut w = FpsWindow::new(0.5);
        w.push(0.1);
        w.push(0.1);
        assert_eq!(w.rate, 0.0);
    }

    #[test]
    fn rate_counts_frames_per_span() {
        let mut w = FpsWindow::new(0.5);
        for _ in 0..40 {
            w.push(1.0 / 60.0);
        }
        assert!((w.rate - 60.0).abs() < 0.5, "rate = {}", w.rate);
    }
}
