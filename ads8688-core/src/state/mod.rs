//! Sampler state machine
//!
//! Tracks where an auto-scan acquisition is in its life. The bridge status
//! register stays authoritative; this machine records what the driver has
//! observed so callers can reason about it without another register read.

pub mod events;
pub mod machine;

pub use events::SampleEvent;
pub use machine::{SampleState, SampleStatus};
