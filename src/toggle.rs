use crate::error::PortIoError;
use crate::midi::RequestKind;
use crate::port::{Port, PortStatus};
use std::fmt;
use tracing::{debug, info, warn};

/// Identifies one dispatched open/close request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the toggle for one port displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    /// The last request failed. Behaves like `Disconnected` for toggling.
    Failed(String),
}

impl ToggleState {
    fn from_status(status: PortStatus) -> Self {
        match status {
            PortStatus::Open => ToggleState::Connected,
            _ => ToggleState::Disconnected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ToggleState::Connecting | ToggleState::Disconnecting)
    }

    /// Whether the toggle accepts input
    pub fn is_enabled(&self) -> bool {
        !self.is_pending()
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            ToggleState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            ToggleState::Disconnected | ToggleState::Failed(_) => "Connect",
            ToggleState::Connected => "Disconnect",
            ToggleState::Connecting => "Connecting...",
            ToggleState::Disconnecting => "Disconnecting...",
        }
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::Disconnected => write!(f, "disconnected"),
            ToggleState::Connecting => write!(f, "connecting"),
            ToggleState::Connected => write!(f, "connected"),
            ToggleState::Disconnecting => write!(f, "disconnecting"),
            ToggleState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Connection intent for a single port.
///
/// At most one request is in flight, and only while the state is
/// `Connecting` or `Disconnecting`.
#[derive(Debug)]
pub struct ToggleController {
    port: Port,
    state: ToggleState,
    in_flight: Option<(RequestTicket, RequestKind)>,
}

impl ToggleController {
    pub fn new(port: Port) -> Self {
        let state = ToggleState::from_status(port.status);
        Self {
            port,
            state,
            in_flight: None,
        }
    }

    pub fn port(&self) -> &Port {
        &self.port
    }

    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<RequestTicket> {
        self.in_flight.map(|(ticket, _)| ticket)
    }

    /// Starts a transition in response to a user toggle.
    ///
    /// Returns the request to issue, or `None` while a request is in flight.
    pub fn begin_toggle(&mut self, ticket: RequestTicket) -> Option<RequestKind> {
        let (next, kind) = match self.state {
            ToggleState::Connecting | ToggleState::Disconnecting => {
                debug!(port = %self.port.key, "toggle ignored, request in flight");
                return None;
            }
            ToggleState::Connected => (ToggleState::Disconnecting, RequestKind::Close),
            ToggleState::Disconnected | ToggleState::Failed(_) => {
                (ToggleState::Connecting, RequestKind::Open)
            }
        };

        self.state = next;
        self.in_flight = Some((ticket, kind));
        Some(kind)
    }

    /// Applies the outcome of a request. Outcomes for any other ticket are ignored.
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<(), PortIoError>) -> bool {
        let kind = match self.in_flight {
            Some((pending, kind)) if pending == ticket => kind,
            _ => {
                debug!(port = %self.port.key, %ticket, "ignoring outcome of an unknown request");
                return false;
            }
        };

        self.in_flight = None;
        self.state = match (kind, result) {
            (RequestKind::Open, Ok(())) => ToggleState::Connected,
            (RequestKind::Close, Ok(())) => ToggleState::Disconnected,
            (_, Err(e)) => {
                warn!(port = %self.port.key, %kind, error = %e, "port request failed");
                ToggleState::Failed(e.reason)
            }
        };
        info!(port = %self.port.key, state = %self.state, "port request resolved");
        true
    }

    /// Follows the hardware-reported status unless a request is in flight.
    ///
    /// Returns whether the displayed state changed.
    pub fn reconcile(&mut self, status: PortStatus) -> bool {
        if self.in_flight.is_some() {
            return false;
        }

        let next = match (status, &self.state) {
            (PortStatus::Open, ToggleState::Connected) => return false,
            (PortStatus::Open, _) => ToggleState::Connected,
            (PortStatus::Closed, ToggleState::Connected) => ToggleState::Disconnected,
            (PortStatus::Closed, _) => return false,
            (PortStatus::Error, ToggleState::Failed(_)) => return false,
            (PortStatus::Error, _) => ToggleState::Failed("port reported an error".to_string()),
            (PortStatus::PendingOpen | PortStatus::PendingClose, _) => return false,
        };

        info!(port = %self.port.key, %status, from = %self.state, to = %next, "external state change");
        self.state = next;
        true
    }

    /// Takes the labels and status of a newer snapshot of the same port
    pub fn update_port(&mut self, port: Port) -> bool {
        debug_assert_eq!(port.key, self.port.key);
        let status = port.status;
        self.port = port;
        self.reconcile(status)
    }
}
