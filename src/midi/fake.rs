//! In-memory capability for tests.
//!
//! Every open/close blocks its worker thread until the test answers the
//! matching [`PendingCall`], so in-flight states can be observed.

use crate::error::{CapabilityError, PortIoError};
use crate::midi::{MidiCapability, RequestKind};
use crate::port::{PortDescriptor, PortKey, PortStatus};
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

pub fn descriptor(key: PortKey, name: &str, status: PortStatus) -> PortDescriptor {
    PortDescriptor {
        key,
        manufacturer: "Fake".to_string(),
        name: name.to_string(),
        status,
    }
}

pub struct PendingCall {
    pub kind: RequestKind,
    pub key: PortKey,
    reply: Sender<Result<(), PortIoError>>,
}

impl PendingCall {
    pub fn succeed(self) {
        let _ = self.reply.send(Ok(()));
    }

    pub fn fail(self, reason: &str) {
        let _ = self.reply.send(Err(PortIoError::new(reason)));
    }
}

pub struct FakeCapability {
    ports: Mutex<Vec<PortDescriptor>>,
    unavailable: Mutex<Option<String>>,
    call_tx: Sender<PendingCall>,
    call_rx: Receiver<PendingCall>,
}

impl FakeCapability {
    pub fn new() -> Self {
        Self::with_ports(Vec::new())
    }

    pub fn with_ports(ports: Vec<PortDescriptor>) -> Self {
        let (call_tx, call_rx) = channel::unbounded();
        Self {
            ports: Mutex::new(ports),
            unavailable: Mutex::new(None),
            call_tx,
            call_rx,
        }
    }

    pub fn set_ports(&self, ports: Vec<PortDescriptor>) {
        *self.ports.lock().unwrap() = ports;
    }

    pub fn remove_port(&self, key: &PortKey) {
        self.ports.lock().unwrap().retain(|p| &p.key != key);
    }

    pub fn set_status(&self, key: &PortKey, status: PortStatus) {
        for port in self.ports.lock().unwrap().iter_mut() {
            if &port.key == key {
                port.status = status;
            }
        }
    }

    pub fn status(&self, key: &PortKey) -> Option<PortStatus> {
        self.ports
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.key == key)
            .map(|p| p.status)
    }

    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self.unavailable.lock().unwrap() = reason.map(str::to_string);
    }

    /// Waits for the next open/close issued against this capability
    pub fn next_call(&self, timeout: Duration) -> Option<PendingCall> {
        self.call_rx.recv_timeout(timeout).ok()
    }

    fn call(&self, kind: RequestKind, key: &PortKey) -> Result<(), PortIoError> {
        let (reply, answer) = channel::bounded(1);
        self.call_tx
            .send(PendingCall {
                kind,
                key: key.clone(),
                reply,
            })
            .map_err(|_| PortIoError::new("fake capability dropped"))?;

        let result = answer
            .recv()
            .unwrap_or_else(|_| Err(PortIoError::new("call abandoned")));
        if result.is_ok() {
            let status = match kind {
                RequestKind::Open => PortStatus::Open,
                RequestKind::Close => PortStatus::Closed,
            };
            self.set_status(key, status);
        }
        result
    }
}

impl MidiCapability for FakeCapability {
    fn enumerate(&self) -> Result<Vec<PortDescriptor>, CapabilityError> {
        if let Some(reason) = self.unavailable.lock().unwrap().clone() {
            return Err(CapabilityError::Unavailable(reason));
        }
        Ok(self.ports.lock().unwrap().clone())
    }

    fn open(&self, key: &PortKey) -> Result<(), PortIoError> {
        self.call(RequestKind::Open, key)
    }

    fn close(&self, key: &PortKey) -> Result<(), PortIoError> {
        self.call(RequestKind::Close, key)
    }
}
