//! The fixed signal chain.
//!
//! ```text
//! mic ─▶ boost ─┬─▶ high-pass ─▶ low-pass ─▶ balance ─▶ tracker ─▶ mute ─▶ out
//!               └──────────── reference ───────┘           │
//!                                                          ▼
//!                                                   AmplitudeMeter
//! ```
//!
//! [`SignalChain::build`] designs every stage for the device sample rate but
//! starts nothing.  It returns the chain together with its
//! [`ChainProcessor`], which the capture layer moves onto the audio thread.
//! The chain keeps the meter and a `connected` flag so it can read the
//! amplitude and cut the processor off from the outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::FrameSink;
use crate::config::ChainConfig;

use super::balancer::Balancer;
use super::biquad::Biquad;
use super::gain::GainControl;
use super::meter::{AmplitudeMeter, AmplitudeSource};
use super::rms::RmsFollower;

// ---------------------------------------------------------------------------
// SignalChain
// ---------------------------------------------------------------------------

/// One built chain.  Owned by the pipeline while it runs.
pub struct SignalChain {
    meter: Arc<AmplitudeMeter>,
    connected: Arc<AtomicBool>,
}

impl SignalChain {
    /// Wire a fresh chain for `sample_rate`.  `boost` is read on every audio
    /// buffer, so changing it later takes effect without a rebuild.
    pub fn build(
        config: &ChainConfig,
        sample_rate: u32,
        boost: GainControl,
    ) -> (Self, ChainProcessor) {
        let meter = Arc::new(AmplitudeMeter::new());
        let connected = Arc::new(AtomicBool::new(true));

        let processor = ChainProcessor {
            boost,
            high_pass: Biquad::high_pass(config.high_pass_cutoff_hz, config.filter_q, sample_rate),
            low_pass: Biquad::low_pass(config.low_pass_cutoff_hz, config.filter_q, sample_rate),
            balancer: Balancer::new(config.balance_half_power_hz, sample_rate),
            tracker: RmsFollower::new(config.tracker_half_power_hz, sample_rate),
            mute_gain: config.mute_gain,
            meter: Arc::clone(&meter),
            connected: Arc::clone(&connected),
        };

        log::debug!(
            "signal chain built: {} Hz, band {}-{} Hz, boost {}",
            sample_rate,
            config.high_pass_cutoff_hz,
            config.low_pass_cutoff_hz,
            processor.boost.get()
        );

        (Self { meter, connected }, processor)
    }

    /// Meter fed by the tracker stage.
    pub fn meter(&self) -> Arc<AmplitudeMeter> {
        Arc::clone(&self.meter)
    }

    /// Instantaneous, unsmoothed amplitude.
    pub fn current_amplitude(&self) -> f32 {
        self.meter.read()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Detach every stage.  From now on the processor emits silence and never
    /// touches the meter again, even if the platform keeps calling it.
    /// Idempotent.
    pub fn disconnect(&mut self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            log::debug!("signal chain disconnected");
        }
        self.meter.reset();
    }
}

impl Drop for SignalChain {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ---------------------------------------------------------------------------
// ChainProcessor
// ---------------------------------------------------------------------------

/// The per-sample half of the chain.  Runs on the audio thread.
pub struct ChainProcessor {
    boost: GainControl,
    high_pass: Biquad,
    low_pass: Biquad,
    balancer: Balancer,
    tracker: RmsFollower,
    mute_gain: f32,
    meter: Arc<AmplitudeMeter>,
    connected: Arc<AtomicBool>,
}

impl ChainProcessor {
    /// Run one mono buffer through every stage, publish the tracked
    /// amplitude, and overwrite `frame` with the muted output.
    ///
    /// On cpal the muted frame goes nowhere; the capture layer drops it.  The
    /// mute stage only matters to a [`FrameSink`] host that routes output.
    pub fn process(&mut self, frame: &mut [f32]) {
        if !self.connected.load(Ordering::Acquire) {
            frame.fill(0.0);
            return;
        }

        let boost = self.boost.get();
        for sample in frame.iter_mut() {
            let boosted = *sample * boost;
            let band = self.low_pass.process(self.high_pass.process(boosted));
            let balanced = self.balancer.process(band, boosted);
            self.tracker.update(balanced);
            *sample = balanced * self.mute_gain;
        }

        self.meter.publish(self.tracker.rms());
    }
}

impl FrameSink for ChainProcessor {
    fn process(&mut self, frame: &mut [f32]) {
        ChainProcessor::process(self, frame);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
