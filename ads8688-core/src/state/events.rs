//! Events that drive sampler transitions

/// Sampler events, raised by the scan controller as it observes hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleEvent {
    /// Arguments validated, scan registers being written
    Configure,
    /// `sample_req` asserted and auto-mode enabled
    Armed,
    /// Registers written with a zero period; nothing armed
    Disarmed,
    /// Bridge reported the scan finished cleanly
    Finished,
    /// Bridge reported an error flag or residual count
    Failed,
}
