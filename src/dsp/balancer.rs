//! Level rebalancing.
//!
//! Band-limiting throws away most of a voice's energy.  [`Balancer`] tracks
//! the RMS of the filtered signal and of a reference (the boosted input
//! before filtering) and scales the filtered signal so both have the same
//! level.  The spectral shape of the band survives; only its loudness is
//! restored.

use super::rms::RmsFollower;

/// Floor under the filtered mean square, so silence is not divided by zero.
const MIN_MEAN_SQUARE: f32 = 1e-12;

#[derive(Debug, Clone)]
pub struct Balancer {
    signal: RmsFollower,
    reference: RmsFollower,
}

impl Balancer {
    pub fn new(half_power_hz: f32, sample_rate: u32) -> Self {
        Self {
            signal: RmsFollower::new(half_power_hz, sample_rate),
            reference: RmsFollower::new(half_power_hz, sample_rate),
        }
    }

    /// Scale `signal` to the level of `reference`.
    #[inline]
    pub fn process(&mut self, signal: f32, reference: f32) -> f32 {
        let sig_ms = self.signal.update(signal);
        let ref_ms = self.reference.update(reference);
        if sig_ms <= MIN_MEAN_SQUARE {
            return 0.0;
        }
        signal * (ref_ms / sig_ms).sqrt()
    }
}
