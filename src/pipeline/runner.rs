//! Pipeline lifecycle.  Builds, starts, stops and rebuilds the analysis
//! pipeline.
//!
//! [`AudioAnalyzer`] owns everything that exists while analysis runs: the
//! [`SignalChain`], the opened [`CaptureHandle`] and the
//! [`AnalysisScheduler`].  Platform access comes in through the injected
//! [`MicrophoneCapture`] and [`AudioSession`]; nothing here assumes a global
//! audio engine.
//!
//! # Start sequence
//!
//! ```text
//! start()
//!   ├─ Running? → stop()                         restart, never additive
//!   ├─ session.configure(category)               failure → warn, continue
//!   ├─ microphone.acquire()                      failure → Err, stay Idle
//!   ├─ boost ← config.chain.boost_gain
//!   ├─ SignalChain::build(sample_rate)           nothing flows yet
//!   ├─ capture.begin(processor)                  failure → release, Err
//!   └─ scheduler.arm(fresh RollingAverageBuffer) → Running
//!
//! stop()
//!   ├─ scheduler.disarm()
//!   ├─ chain.disconnect()
//!   └─ microphone.release(capture)               → Idle
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;

use crate::audio::{
    AudioSession, CaptureError, CaptureHandle, MicrophoneCapture, RollingAverageBuffer,
};
use crate::config::{AppConfig, ConfigError};
use crate::dsp::{GainControl, SignalChain};

use super::observer::{AmplitudeObserver, ObserverSlot};
use super::scheduler::AnalysisScheduler;
use super::state::PipelineState;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors surfaced to the caller of [`AudioAnalyzer`].
///
/// Session negotiation problems are not here: they are logged and the
/// pipeline carries on.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("could not acquire microphone: {0}")]
    DeviceAcquisition(#[from] CaptureError),
}

// ---------------------------------------------------------------------------
// AudioAnalyzer
// ---------------------------------------------------------------------------

/// Resources that only exist while running.
struct LivePipeline {
    chain: SignalChain,
    capture: Box<dyn CaptureHandle>,
}

/// Start/stop orchestration of the amplitude pipeline.
///
/// ```rust,no_run
/// use gen_audio::audio::{CpalMicrophone, HostSession};
/// use gen_audio::config::AppConfig;
/// use gen_audio::pipeline::AudioAnalyzer;
///
/// # async fn example() -> Result<(), gen_audio::pipeline::AnalysisError> {
/// let mut analyzer = AudioAnalyzer::new(
///     AppConfig::default(),
///     Box::new(CpalMicrophone::new()),
///     Box::new(HostSession),
///     tokio::runtime::Handle::current(),
/// )?;
/// analyzer.register_observer(|v: f32| println!("{v:.3}"));
/// analyzer.start()?;
/// // ... later, e.g. when the app goes to the background
/// analyzer.stop();
/// # Ok(())
/// # }
/// ```
pub struct AudioAnalyzer {
    config: AppConfig,
    microphone: Box<dyn MicrophoneCapture>,
    session: Box<dyn AudioSession>,
    runtime: Handle,
    boost: GainControl,
    observers: ObserverSlot,
    scheduler: AnalysisScheduler,
    live: Option<LivePipeline>,
    state: PipelineState,
}

impl AudioAnalyzer {
    /// Create an idle analyzer.  The scheduler task will be spawned on
    /// `runtime` when [`start`](Self::start) is called.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidConfig`] when `config` fails
    /// [`AppConfig::validate`].
    pub fn new(
        config: AppConfig,
        microphone: Box<dyn MicrophoneCapture>,
        session: Box<dyn AudioSession>,
        runtime: Handle,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        let boost = GainControl::new(config.chain.boost_gain);
        Ok(Self {
            config,
            microphone,
            session,
            runtime,
            boost,
            observers: ObserverSlot::new(),
            scheduler: AnalysisScheduler::new(),
            live: None,
            state: PipelineState::Idle,
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Build a fresh chain, start capture and arm the scheduler.
    ///
    /// Calling this while running performs a full [`stop`](Self::stop) first.
    /// On error the analyzer is `Idle` and no observer callback fires.
    pub fn start(&mut self) -> Result<(), AnalysisError> {
        if self.state.is_running() {
            log::info!("audio analysis already running; restarting");
            self.stop();
        }

        let category = self.config.audio.session_category;
        if let Err(e) = self.session.configure(category) {
            log::warn!("could not configure audio session ({e}); continuing");
        }

        let mut capture = self.microphone.acquire().inspect_err(|e| {
            log::error!("microphone acquisition failed: {e}");
        })?;

        self.boost.set(self.config.chain.boost_gain);
        let sample_rate = capture.sample_rate();
        let (mut chain, processor) =
            SignalChain::build(&self.config.chain, sample_rate, self.boost.clone());

        if let Err(e) = capture.begin(Box::new(processor)) {
            log::error!("could not start capture: {e}");
            chain.disconnect();
            self.microphone.release(capture);
            return Err(e.into());
        }

        self.scheduler.arm(
            &self.runtime,
            self.config.analysis.tick_interval(),
            chain.meter(),
            RollingAverageBuffer::new(self.config.analysis.buffer_capacity),
            self.observers.clone(),
        );

        self.live = Some(LivePipeline { chain, capture });
        self.state = PipelineState::Running;
        log::info!(
            "audio analysis started ({} Hz, every {} ms over {} samples)",
            sample_rate,
            self.config.analysis.tick_interval_ms,
            self.config.analysis.buffer_capacity
        );
        Ok(())
    }

    /// Disarm the scheduler, disconnect the chain and release the
    /// microphone.  Safe to call in any state.
    pub fn stop(&mut self) {
        self.scheduler.disarm();

        if let Some(LivePipeline { mut chain, capture }) = self.live.take() {
            chain.disconnect();
            self.microphone.release(capture);
            log::info!("audio analysis stopped");
        }

        self.state = PipelineState::Idle;
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    // -----------------------------------------------------------------------
    // Observer
    // -----------------------------------------------------------------------

    /// Receive every smoothed amplitude from now on, replacing any previous
    /// observer.  Allowed in any state.
    pub fn register_observer<O>(&self, observer: O)
    where
        O: AmplitudeObserver + 'static,
    {
        self.observers.register(Arc::new(observer));
    }

    /// Stop delivering values.  Ticks continue while running.
    pub fn clear_observer(&self) {
        self.observers.clear();
    }

    // -----------------------------------------------------------------------
    // Gain
    // -----------------------------------------------------------------------

    /// Change the pre-filter boost immediately.  Reset to the configured
    /// value on every [`start`](Self::start).
    pub fn set_boost_gain(&self, gain: f32) {
        self.boost.set(gain);
        log::debug!("boost gain set to {}", self.boost.get());
    }

    pub fn boost_gain(&self) -> f32 {
        self.boost.get()
    }

    /// Handle for adjusting the boost from another thread.
    pub fn gain_control(&self) -> GainControl {
        self.boost.clone()
    }

    /// Unsmoothed amplitude of the live chain, `0.0` when idle.
    pub fn current_amplitude(&self) -> f32 {
        self.live
            .as_ref()
            .map_or(0.0, |live| live.chain.current_amplitude())
    }

}

impl Drop for AudioAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
