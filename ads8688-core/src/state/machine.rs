//! Sampler state definition

use super::events::SampleEvent;

/// Sampler states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleState {
    /// No scan armed
    #[default]
    Idle,
    /// Scan period and sample count being programmed
    Configuring,
    /// Bridge sampling autonomously
    AutoScanning,
    /// Last scan ended with an error; status flags already cleared
    Errored,
}

/// Outcome of a successful scan poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleStatus {
    /// Scan still running
    InProgress,
    /// Scan finished with every sample taken
    Complete,
}

impl SampleState {
    /// Process an event and return the next state
    pub fn transition(self, event: SampleEvent) -> Self {
        use SampleEvent::*;
        use SampleState::*;

        match (self, event) {
            // A new configuration may start from any settled state,
            // including over a running scan that is being reprogrammed
            (Idle | AutoScanning | Errored, Configure) => Configuring,

            (Configuring, Armed) => AutoScanning,
            (Configuring, Disarmed) => Idle,

            // Rate changes outside a configuration pass
            (Idle | Errored, Armed) => AutoScanning,
            (AutoScanning | Errored, Disarmed) => Idle,

            (AutoScanning, Finished) => Idle,
            (AutoScanning, Failed) => Errored,
            // Completion observed without an armed scan in this session
            (Idle | Errored, Finished) => Idle,
            (Idle, Failed) => Errored,

            // Default: stay in current state
            _ => self,
        }
    }
}
