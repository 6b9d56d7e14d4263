//! Live microphone amplitude analysis.
//!
//! The microphone signal is boosted, band-limited to the voice fundamental
//! range, rebalanced against the unfiltered level and tracked as RMS.  A
//! scheduler samples that amplitude every few milliseconds, smooths it over
//! a short rolling window and reports the result to a registered observer.
//!
//! - [`audio`]: capture, session negotiation, the rolling window
//! - [`dsp`]: filters, followers and the signal chain
//! - [`pipeline`]: lifecycle, scheduler and observer
//! - [`config`]: TOML settings

pub mod audio;
pub mod config;
pub mod dsp;
pub mod pipeline;
