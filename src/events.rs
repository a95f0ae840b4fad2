use crate::error::PortIoError;
use crate::midi::RequestKind;
use crate::port::PortKey;
use crate::toggle::RequestTicket;

/// Events sent from worker threads to the thread owning the port table
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// An open/close request finished on its worker thread
    RequestResolved {
        key: PortKey,
        ticket: RequestTicket,
        kind: RequestKind,
        result: Result<(), PortIoError>,
    },

    /// The watcher saw the enumeration change (ports, status or availability)
    PortsChanged,
}
