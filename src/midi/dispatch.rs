use crate::error::PortIoError;
use crate::events::AppEvent;
use crate::midi::{MidiCapability, RequestKind};
use crate::port::PortKey;
use crate::toggle::RequestTicket;
use crossbeam::channel::Sender;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Runs one open/close request on its own worker thread.
///
/// The outcome comes back as [`AppEvent::RequestResolved`]. There is no
/// timeout: a capability call that never returns keeps its port pending.
/// Returns an error only if the worker could not be started.
pub fn dispatch(
    capability: Arc<dyn MidiCapability>,
    key: PortKey,
    kind: RequestKind,
    ticket: RequestTicket,
    event_tx: Sender<AppEvent>,
) -> Result<(), PortIoError> {
    let thread_name = format!("port-{}-{}", kind, ticket);

    thread::Builder::new()
        .name(thread_name)
        .spawn(move || {
            debug!(port = %key, %kind, %ticket, "request started");
            let result = capability.perform(kind, &key);
            if let Err(e) = &result {
                warn!(port = %key, %kind, error = %e, "request failed");
            }

            // The table may already be gone, nobody is left to care
            let _ = event_tx.send(AppEvent::RequestResolved {
                key,
                ticket,
                kind,
                result,
            });
        })
        .map(|_| ())
        .map_err(|e| PortIoError::new(format!("failed to start worker: {}", e)))
}
