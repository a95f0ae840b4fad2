//! Port change detection by polling.
//! midir has no hot-plug notifications, so a background thread enumerates
//! at a fixed cadence and tells the owner when the result differs.

use crate::error::CapabilityError;
use crate::events::AppEvent;
use crate::midi::MidiCapability;
use crate::port::PortDescriptor;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

pub type Enumeration = Result<Vec<PortDescriptor>, CapabilityError>;

/// Handle for a running watcher thread. Dropping it stops the thread.
pub struct PortWatcher {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PortWatcher {
    /// Starts polling `capability` every `interval`.
    ///
    /// `baseline` is the enumeration the owner last applied. Anything that
    /// differs from it, including changes made before this call, is reported.
    pub fn spawn(
        capability: Arc<dyn MidiCapability>,
        interval: Duration,
        baseline: Enumeration,
        event_tx: Sender<AppEvent>,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("port-watcher".to_string())
            .spawn(move || {
                let mut previous = baseline;
                loop {
                    // A stop message or a dropped handle both end the loop
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        _ => break,
                    }

                    let current = capability.enumerate();
                    if changed(&previous, &current) {
                        debug!("port enumeration changed");
                        if event_tx.send(AppEvent::PortsChanged).is_err() {
                            break;
                        }
                    }
                    previous = current;
                }
                debug!("port watcher stopped");
            })?;

        info!(interval_ms = interval.as_millis() as u64, "port watcher started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PortWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn changed(previous: &Enumeration, current: &Enumeration) -> bool {
    match (previous, current) {
        (Ok(a), Ok(b)) => a != b,
        (Err(a), Err(b)) => a != b,
        _ => true,
    }
}
