//! Running RMS estimate.
//!
//! A one-pole low-pass over the squared signal.  The pole is placed from a
//! half-power frequency: the lower it is, the slower the estimate follows
//! the signal.

/// Exponentially-weighted mean-square follower.
#[derive(Debug, Clone)]
pub struct RmsFollower {
    /// Weight of the new squared sample.
    c1: f32,
    /// Weight of the previous state.
    c2: f32,
    mean_square: f32,
}

impl RmsFollower {
    pub fn new(half_power_hz: f32, sample_rate: u32) -> Self {
        // f64: at high sample rates the cosine sits within an f32 ulp of 1.
        let sr = f64::from(sample_rate.max(1));
        let b = 2.0 - (2.0 * std::f64::consts::PI * f64::from(half_power_hz) / sr).cos();
        let c2 = b - (b * b - 1.0).sqrt();
        Self {
            c1: (1.0 - c2) as f32,
            c2: c2 as f32,
            mean_square: 0.0,
        }
    }

    /// Feed one sample and return the updated mean square.
    #[inline]
    pub fn update(&mut self, x: f32) -> f32 {
        self.mean_square = self.c1 * x * x + self.c2 * self.mean_square;
        self.mean_square
    }

    pub fn rms(&self) -> f32 {
        self.mean_square.sqrt()
    }
}
