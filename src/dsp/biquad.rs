//! Second-order IIR filters (RBJ audio-EQ cookbook).
//!
//! Only the two responses the band-pass stage needs are provided.  Both use
//! the transposed direct form II, which stays well behaved in `f32` at the
//! low cutoffs used here.

use std::f32::consts::PI;

/// A single biquad section with its own state.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// Second-order high-pass at `cutoff_hz`.
    pub fn high_pass(cutoff_hz: f32, q: f32, sample_rate: u32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff_hz, q, sample_rate);
        let b1 = -(1.0 + cos_w0);
        Self::normalised(-b1 / 2.0, b1, -b1 / 2.0, cos_w0, alpha)
    }

    /// Second-order low-pass at `cutoff_hz`.
    pub fn low_pass(cutoff_hz: f32, q: f32, sample_rate: u32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff_hz, q, sample_rate);
        let b1 = 1.0 - cos_w0;
        Self::normalised(b1 / 2.0, b1, b1 / 2.0, cos_w0, alpha)
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    /// Cutoffs at or past Nyquist are pulled just below it.
    fn prewarp(cutoff_hz: f32, q: f32, sample_rate: u32) -> (f32, f32) {
        let sr = sample_rate.max(1) as f32;
        let cutoff = cutoff_hz.min(sr * 0.49);
        let w0 = 2.0 * PI * cutoff / sr;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    fn normalised(b0: f32, b1: f32, b2: f32, cos_w0: f32, alpha: f32) -> Self {
        let a0 = 1.0 + alpha;
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    const SR: u32 = 48_000;

    /// RMS of a unit sine at `freq` after one second of settling.
    fn steady_state_rms(filter: &mut Biquad, freq: f32) -> f32 {
        let step = 2.0 * PI * freq / SR as f32;
        let n = SR as usize;
        for i in 0..n {
            filter.process((i as f32 * step).sin());
        }
        let sum_sq: f32 = (n..n + SR as usize / 2)
            .map(|i| filter.process((i as f32 * step).sin()).powi(2))
            .sum();
        (sum_sq / (SR / 2) as f32).sqrt()
    }

    #[test]
    fn high_pass_blocks_rumble_passes_band() {
        let low = steady_state_rms(&mut Biquad::high_pass(55.0, FRAC_1_SQRT_2, SR), 10.0);
        let mid = steady_state_rms(&mut Biquad::high_pass(55.0, FRAC_1_SQRT_2, SR), 440.0);

        // Unit sine RMS is 1/sqrt(2).
        assert!(low < 0.05, "10 Hz leaked through: {low}");
        assert!((mid - FRAC_1_SQRT_2).abs() < 0.02, "440 Hz attenuated: {mid}");
    }

    #[test]
    fn low_pass_blocks_highs_passes_band() {
        let mid = steady_state_rms(&mut Biquad::low_pass(255.0, FRAC_1_SQRT_2, SR), 60.0);
        let high = steady_state_rms(&mut Biquad::low_pass(255.0, FRAC_1_SQRT_2, SR), 4_000.0);

        assert!((mid - FRAC_1_SQRT_2).abs() < 0.02, "60 Hz attenuated: {mid}");
        assert!(high < 0.01, "4 kHz leaked through: {high}");
    }

    #[test]
    fn cutoff_half_power() {
        let at_cutoff = steady_state_rms(&mut Biquad::low_pass(255.0, FRAC_1_SQRT_2, SR), 255.0);
        // -3 dB of a unit sine: 0.5
        assert!((at_cutoff - 0.5).abs() < 0.02, "cutoff gain off: {at_cutoff}");
    }

    #[test]
    fn cutoff_above_nyquist_stays_stable() {
        let mut lp = Biquad::low_pass(30_000.0, FRAC_1_SQRT_2, 8_000);
        for i in 0..8_000 {
            let y = lp.process(if i % 2 == 0 { 1.0 } else { -1.0 });
            assert!(y.is_finite());
        }
    }
}
