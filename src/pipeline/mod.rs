//! Pipeline lifecycle and periodic analysis.
//!
//! This module wires the signal chain, the microphone capture and the tick
//! scheduler together and exposes the single smoothed amplitude value that
//! callers observe.
//!
//! # Architecture
//!
//! ```text
//! AudioAnalyzer::start()
//!        │
//!        ├─ AudioSession::configure        (warn on failure)
//!        ├─ MicrophoneCapture::acquire     → CaptureHandle
//!        ├─ SignalChain::build             → ChainProcessor ─▶ audio thread
//!        └─ AnalysisScheduler::arm         ← tokio task, every 10 ms
//!                 │
//!                 ├─ AmplitudeMeter::read
//!                 ├─ RollingAverageBuffer::push / average
//!                 └─ ObserverSlot::notify  → AmplitudeObserver
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use gen_audio::audio::{CpalMicrophone, HostSession};
//! use gen_audio::config::AppConfig;
//! use gen_audio::pipeline::AudioAnalyzer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let microphone = CpalMicrophone::with_device(config.audio.input_device.clone())
//!         .with_buffer_frames(config.audio.buffer_frames);
//!
//!     let mut analyzer = AudioAnalyzer::new(
//!         config,
//!         Box::new(microphone),
//!         Box::new(HostSession),
//!         tokio::runtime::Handle::current(),
//!     )?;
//!     analyzer.register_observer(|amplitude: f32| println!("{amplitude:.4}"));
//!     analyzer.start()?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     analyzer.stop();
//!     Ok(())
//! }
//! ```

pub mod observer;
pub mod runner;
pub mod scheduler;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use observer::{AmplitudeObserver, ObserverSlot};
pub use runner::{AnalysisError, AudioAnalyzer};
pub use scheduler::{tick, AnalysisScheduler};
pub use state::PipelineState;
