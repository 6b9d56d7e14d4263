//! Fixed-capacity rolling window of amplitude readings.
//!
//! The window always holds exactly `capacity` values.  It starts out filled
//! with zeros, and every [`push`](RollingAverageBuffer::push) overwrites the
//! oldest reading, so the mean ramps up from silence instead of jumping on
//! the first tick.
//!
//! # Example
//!
//! ```rust
//! use gen_audio::audio::RollingAverageBuffer;
//!
//! let mut buf = RollingAverageBuffer::new(4);
//! assert_eq!(buf.average(), 0.0);
//!
//! buf.push(2.0);
//! assert_eq!(buf.average(), 0.5); // [2, 0, 0, 0]
//!
//! for v in [1.0, 1.0, 1.0, 1.0] {
//!     buf.push(v);
//! }
//! assert_eq!(buf.average(), 1.0); // 2.0 has been evicted
//! ```

// ---------------------------------------------------------------------------
// RollingAverageBuffer
// ---------------------------------------------------------------------------

/// Sliding window of the last `capacity` amplitude samples.
///
/// Insertion is O(1): a write cursor walks a fixed `Vec` and overwrites the
/// oldest slot.  [`average`](Self::average) sums the whole window, which
/// keeps the result free of the drift a running total would accumulate.
#[derive(Debug, Clone)]
pub struct RollingAverageBuffer {
    buf: Vec<f64>,
    /// Slot the *next* push will overwrite, i.e. the oldest sample.
    write_pos: usize,
}

impl RollingAverageBuffer {
    /// Create a window of `capacity` zeros.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RollingAverageBuffer capacity must be > 0");
        Self {
            buf: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Insert `value` as the newest sample, evicting the oldest.
    ///
    /// `value` must be finite and non-negative; readings are expected to be
    /// filtered upstream.  Debug builds assert this.
    pub fn push(&mut self, value: f64) {
        debug_assert!(
            value.is_finite() && value >= 0.0,
            "amplitude sample must be finite and non-negative, got {value}"
        );
        self.buf[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.buf.len();
    }

    /// Arithmetic mean of every slot in the window.
    pub fn average(&self) -> f64 {
        self.buf.iter().sum::<f64>() / self.buf.len() as f64
    }

    /// The most recently pushed sample (`0.0` before the first push).
    pub fn latest(&self) -> f64 {
        let len = self.buf.len();
        self.buf[(self.write_pos + len - 1) % len]
    }

    /// Iterate the window newest-first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let len = self.buf.len();
        (1..=len).map(move |i| self.buf[(self.write_pos + len - i) % len])
    }

    /// Number of samples averaged.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Zero every slot.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.write_pos = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
