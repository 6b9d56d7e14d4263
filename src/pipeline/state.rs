//! Pipeline state machine.
//!
//! ```text
//! Idle ──start()──▶ Running
//! Running ──start()──▶ (stop) ──▶ Running     restart, never additive
//! Running ──stop()───▶ Idle
//! Idle ──stop()──▶ Idle                       no-op
//! Idle ──start() fails──▶ Idle                device acquisition error
//! ```

/// Whether the analysis pipeline is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No chain, no capture, no scheduler.
    #[default]
    Idle,
    /// One chain is connected, capture is running and the scheduler is armed.
    Running,
}

impl PipelineState {
    /// A short human-readable label suitable for status output.
    ///
    /// ```
    /// use gen_audio::pipeline::PipelineState;
    ///
    /// assert_eq!(PipelineState::Idle.label(), "idle");
    /// assert_eq!(PipelineState::Running.label(), "running");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
        assert!(!PipelineState::Idle.is_running());
        assert!(PipelineState::Running.is_running());
    }
}
