//! Lock-free amplitude snapshot shared between the audio thread and the
//! scheduler.

use std::sync::atomic::{AtomicU32, Ordering};

/// Anything that can report the instantaneous amplitude of a signal.
///
/// `read` must be a fast, non-blocking snapshot; the scheduler calls it from
/// its tick and accepts a value that is up to one audio buffer old.
pub trait AmplitudeSource: Send + Sync {
    fn read(&self) -> f32;
}

/// Latest amplitude published by the tracker stage.
#[derive(Debug, Default)]
pub struct AmplitudeMeter {
    bits: AtomicU32,
}

impl AmplitudeMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new reading.  Non-finite and negative readings are stored as
    /// `0.0` so they never reach the smoothing window.
    pub fn publish(&self, amplitude: f32) {
        let amplitude = if amplitude.is_finite() && amplitude > 0.0 {
            amplitude
        } else {
            0.0
        };
        self.bits.store(amplitude.to_bits(), Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.bits.store(0.0_f32.to_bits(), Ordering::Relaxed);
    }
}

impl AmplitudeSource for AmplitudeMeter {
    #[inline]
    fn read(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_silent() {
        assert_eq!(AmplitudeMeter::new().read(), 0.0);
    }

    #[test]
    fn publish_then_read() {
        let m = AmplitudeMeter::new();
        m.publish(0.42);
        assert_eq!(m.read(), 0.42);
        m.reset();
        assert_eq!(m.read(), 0.0);
    }

    #[test]
    fn bad_readings_are_zeroed() {
        let m = AmplitudeMeter::new();
        for bad in [f32::NAN, f32::INFINITY, -0.5] {
            m.publish(bad);
            assert_eq!(m.read(), 0.0);
        }
    }
}
