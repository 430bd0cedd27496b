use std::thread;
use std::time::{Duration, Instant};

/// Rolling average over the last `window` frame durations.
/// Reports a rate in frames per second.
#[derive(Debug, Clone)]
pub struct RateMeter {
    samples: Vec<f32>,
    next: usize,
}

impl RateMeter {
    /// A window of at least one sample, initially all zero.
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![0.0; window.max(1)],
            next: 0,
        }
    }

    /// Overwrite the oldest sample with `dt` seconds.
    pub fn record(&mut self, dt: f32) {
        self.samples[self.next] = dt;
        self.next = (self.next + 1) % self.samples.len();
    }

    /// `1 / mean(window)`, or 0 while the mean is 0.
    pub fn rate(&self) -> f32 {
        let mean = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    pub fn window(&self) -> usize {
        self.samples.len()
    }
}

/// Longest iteration budget a [`Pacer`] will wait out.
pub const MAX_BUDGET: Duration = Duration::from_secs(3600);

/// Paces a loop to a fixed iteration budget.
pub struct Pacer {
    budget: Duration,
    last: Instant,
}

impl Pacer {
    /// A pacer targeting `fps` iterations per second. A rate of zero or less
    /// (or NaN) means "as fast as possible"; the budget never exceeds
    /// [`MAX_BUDGET`].
    pub fn new(fps: f32) -> Self {
        let budget = if fps > 0.0 {
            Duration::try_from_secs_f32(1.0 / fps).map_or(MAX_BUDGET, |b| b.min(MAX_BUDGET))
        } else {
            Duration::ZERO
        };
        Self {
            budget,
            last: Instant::now(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Sleep until the budget since the previous call has elapsed, then
    /// return the real elapsed seconds.
    pub fn wait(&mut self) -> f32 {
        let elapsed = self.last.elapsed();
        if elapsed < self.budget {
            thread::sleep(self.budget - elapsed);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}
