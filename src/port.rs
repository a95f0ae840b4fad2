use serde::Serialize;
use std::fmt;

/// Which side of a device a port sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Unique identifier for a MIDI port endpoint.
///
/// Backends may hand out the same id for both sides of one device,
/// so the direction is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PortKey {
    pub direction: Direction,
    pub id: String,
}

impl PortKey {
    pub fn new(direction: Direction, id: impl Into<String>) -> Self {
        Self {
            direction,
            id: id.into(),
        }
    }

    pub fn input(id: impl Into<String>) -> Self {
        Self::new(Direction::Input, id)
    }

    pub fn output(id: impl Into<String>) -> Self {
        Self::new(Direction::Output, id)
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.id)
    }
}

/// Connection status as reported by the hardware capability.
///
/// midir only ever reports `Open` or `Closed`, the pending and error
/// statuses come from capabilities that track them.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortStatus {
    Closed,
    Open,
    PendingOpen,
    PendingClose,
    Error,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortStatus::Closed => "closed",
            PortStatus::Open => "open",
            PortStatus::PendingOpen => "pending-open",
            PortStatus::PendingClose => "pending-close",
            PortStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One entry of a capability enumeration, before it is sorted into buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub key: PortKey,
    pub manufacturer: String,
    pub name: String,
    pub status: PortStatus,
}

/// A port as seen by the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub key: PortKey,
    pub manufacturer: String,
    pub name: String,
    pub status: PortStatus,
}

impl Port {
    pub fn direction(&self) -> Direction {
        self.key.direction
    }

    /// "manufacturer name", or just the name when no manufacturer is known
    pub fn label(&self) -> String {
        format!("{} {}", self.manufacturer, self.name).trim().to_string()
    }
}

impl From<PortDescriptor> for Port {
    fn from(d: PortDescriptor) -> Self {
        Self {
            key: d.key,
            manufacturer: d.manufacturer,
            name: d.name,
            status: d.status,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
