use thiserror::Error;

/// The hardware capability cannot enumerate ports at all.
///
/// Permission refusal and a missing/busy MIDI subsystem are reported the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("MIDI unavailable: {0}")]
    Unavailable(String),
}

/// A single open or close request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PortIoError {
    pub reason: String,
}

impl PortIoError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
