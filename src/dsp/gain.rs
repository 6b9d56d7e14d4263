//! Runtime-adjustable gain.
//!
//! [`GainControl`] is the only parameter of the chain that may change while
//! audio is flowing.  It is an `f32` stored as bits in an `AtomicU32`, so the
//! audio thread reads it with a single relaxed load and writers on any other
//! thread never block it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared handle to a gain value.  Cheap to clone; all clones see the same
/// value.
#[derive(Debug, Clone)]
pub struct GainControl {
    bits: Arc<AtomicU32>,
}

impl GainControl {
    pub fn new(gain: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(Self::sanitise(gain).to_bits())),
        }
    }

    /// Current gain.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Replace the gain.  Negative and non-finite values are stored as `0.0`.
    pub fn set(&self, gain: f32) {
        self.bits
            .store(Self::sanitise(gain).to_bits(), Ordering::Relaxed);
    }

    fn sanitise(gain: f32) -> f32 {
        if gain.is_finite() && gain >= 0.0 {
            gain
        } else {
            0.0
        }
    }
}

impl Default for GainControl {
    fn default() -> Self {
        Self::new(1.0)
    }
}
