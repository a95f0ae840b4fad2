pub mod backend;
pub mod dispatch;
#[cfg(test)]
pub mod fake;
pub mod monitor;

pub use backend::MidirBackend;

use crate::error::{CapabilityError, PortIoError};
use crate::port::{PortDescriptor, PortKey};
use std::fmt;

/// Which request a toggle issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Open,
    Close,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Open => write!(f, "open"),
            RequestKind::Close => write!(f, "close"),
        }
    }
}

/// Access to the system's MIDI ports.
///
/// `open` and `close` may block for as long as the hardware takes;
/// callers run them off the UI thread (see [`dispatch`]).
pub trait MidiCapability: Send + Sync {
    fn enumerate(&self) -> Result<Vec<PortDescriptor>, CapabilityError>;

    fn open(&self, key: &PortKey) -> Result<(), PortIoError>;

    fn close(&self, key: &PortKey) -> Result<(), PortIoError>;

    fn perform(&self, kind: RequestKind, key: &PortKey) -> Result<(), PortIoError> {
        match kind {
            RequestKind::Open => self.open(key),
            RequestKind::Close => self.close(key),
        }
    }
}
