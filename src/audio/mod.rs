//! Audio plumbing: microphone capture, session negotiation, channel mixing
//! and the rolling amplitude window.
//!
//! # Flow
//!
//! ```text
//! Microphone → cpal callback → downmix_into (mono) → FrameSink (signal chain)
//! scheduler tick → RollingAverageBuffer::push → average
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gen_audio::audio::{CpalMicrophone, FrameSink, MicrophoneCapture};
//!
//! struct Print;
//! impl FrameSink for Print {
//!     fn process(&mut self, frame: &mut [f32]) {
//!         println!("{} samples", frame.len());
//!     }
//! }
//!
//! let mic = CpalMicrophone::new();
//! let mut handle = mic.acquire().unwrap();
//! handle.begin(Box::new(Print)).unwrap();
//! // ...
//! mic.release(handle);
//! ```

pub mod buffer;
pub mod capture;
pub mod mix;
pub mod session;

pub use buffer::RollingAverageBuffer;
pub use capture::{CaptureError, CaptureHandle, CpalMicrophone, FrameSink, MicrophoneCapture};
pub use mix::downmix_into;
pub use session::{AudioSession, HostSession, SessionCategory, SessionError};
