//! Signal-conditioning stages and the chain that wires them.
//!
//! # Pipeline
//!
//! ```text
//! mono frame → boost (GainControl) → Biquad HP → Biquad LP
//!            → Balancer (vs. boosted) → RmsFollower → AmplitudeMeter
//!            → mute → discarded output
//! ```
//!
//! Everything per-sample lives in [`ChainProcessor`], which the capture
//! layer runs on the audio thread.  The rest of the program only ever sees
//! two atomics: the boost gain it may write, and the meter it may read.

pub mod balancer;
pub mod biquad;
pub mod chain;
pub mod gain;
pub mod meter;
pub mod rms;

pub use balancer::Balancer;
pub use biquad::Biquad;
pub use chain::{ChainProcessor, SignalChain};
pub use gain::GainControl;
pub use meter::{AmplitudeMeter, AmplitudeSource};
pub use rms::RmsFollower;
