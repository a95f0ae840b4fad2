use crate::error::{CapabilityError, PortIoError};
use crate::midi::MidiCapability;
use crate::port::{Direction, PortDescriptor, PortKey, PortStatus};
use midir::{MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection, MidiOutputPort};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

/// `MidiCapability` backed by midir.
///
/// Every enumeration and every connect uses a fresh midir client, so the
/// port list always reflects the current system state. Open connections
/// are kept here until the port is closed, vanishes from an enumeration,
/// or the backend is dropped.
pub struct MidirBackend {
    client_name: String,
    open_inputs: Mutex<HashMap<String, MidiInputConnection<()>>>,
    open_outputs: Mutex<HashMap<String, MidiOutputConnection>>,
}

impl MidirBackend {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            open_inputs: Mutex::new(HashMap::new()),
            open_outputs: Mutex::new(HashMap::new()),
        }
    }

    fn input_client(&self) -> Result<MidiInput, PortIoError> {
        MidiInput::new(&self.client_name).map_err(|e| PortIoError::new(e.to_string()))
    }

    fn output_client(&self) -> Result<MidiOutput, PortIoError> {
        MidiOutput::new(&self.client_name).map_err(|e| PortIoError::new(e.to_string()))
    }

    fn is_open(&self, key: &PortKey) -> bool {
        match key.direction {
            Direction::Input => self
                .open_inputs
                .lock()
                .map(|m| m.contains_key(&key.id))
                .unwrap_or(false),
            Direction::Output => self
                .open_outputs
                .lock()
                .map(|m| m.contains_key(&key.id))
                .unwrap_or(false),
        }
    }

    fn descriptor(&self, key: PortKey, raw_name: String) -> PortDescriptor {
        let (manufacturer, name) = split_client_label(&raw_name);
        let status = if self.is_open(&key) {
            PortStatus::Open
        } else {
            PortStatus::Closed
        };
        PortDescriptor {
            key,
            manufacturer,
            name,
            status,
        }
    }

    /// Closes held connections whose port is no longer listed
    fn prune_vanished(&self, input_ids: &HashSet<String>, output_ids: &HashSet<String>) {
        let inputs = match self.open_inputs.lock() {
            Ok(mut open) => take_missing(&mut open, input_ids),
            Err(_) => Vec::new(),
        };
        for (id, connection) in inputs {
            debug!(port = %id, "input vanished, dropping its connection");
            connection.close();
        }

        let outputs = match self.open_outputs.lock() {
            Ok(mut open) => take_missing(&mut open, output_ids),
            Err(_) => Vec::new(),
        };
        for (id, connection) in outputs {
            debug!(port = %id, "output vanished, dropping its connection");
            connection.close();
        }
    }

    fn open_input(&self, id: &str) -> Result<(), PortIoError> {
        let midi_in = self.input_client()?;
        let port = find_input(&midi_in, id)?;
        // Message reception is not handled here, the connection only holds the port open
        let connection = midi_in
            .connect(&port, &self.client_name, |_timestamp, _message, _| {}, ())
            .map_err(|e| PortIoError::new(e.to_string()))?;

        let mut open = self
            .open_inputs
            .lock()
            .map_err(|_| PortIoError::new("input connection table poisoned"))?;
        open.insert(id.to_string(), connection);
        Ok(())
    }

    fn open_output(&self, id: &str) -> Result<(), PortIoError> {
        let midi_out = self.output_client()?;
        let port = find_output(&midi_out, id)?;
        let connection = midi_out
            .connect(&port, &self.client_name)
            .map_err(|e| PortIoError::new(e.to_string()))?;

        let mut open = self
            .open_outputs
            .lock()
            .map_err(|_| PortIoError::new("output connection table poisoned"))?;
        open.insert(id.to_string(), connection);
        Ok(())
    }

    fn close_input(&self, id: &str) -> Result<(), PortIoError> {
        let connection = self
            .open_inputs
            .lock()
            .map_err(|_| PortIoError::new("input connection table poisoned"))?
            .remove(id);

        match connection {
            Some(connection) => {
                connection.close();
            }
            None => debug!(port = id, "close requested for an input that is not open"),
        }
        Ok(())
    }

    fn close_output(&self, id: &str) -> Result<(), PortIoError> {
        let connection = self
            .open_outputs
            .lock()
            .map_err(|_| PortIoError::new("output connection table poisoned"))?
            .remove(id);

        match connection {
            Some(connection) => {
                connection.close();
            }
            None => debug!(port = id, "close requested for an output that is not open"),
        }
        Ok(())
    }
}

impl MidiCapability for MidirBackend {
    /// Lists inputs then outputs, each in the order the system reports them
    fn enumerate(&self) -> Result<Vec<PortDescriptor>, CapabilityError> {
        let midi_in =
            MidiInput::new(&self.client_name).map_err(|e| CapabilityError::Unavailable(e.to_string()))?;
        let midi_out =
            MidiOutput::new(&self.client_name).map_err(|e| CapabilityError::Unavailable(e.to_string()))?;

        let input_ports = midi_in.ports();
        let output_ports = midi_out.ports();

        // Connections to unplugged devices must go before statuses are read,
        // a replugged device may come back under the same id
        let input_ids: HashSet<String> = input_ports.iter().map(|p| p.id()).collect();
        let output_ids: HashSet<String> = output_ports.iter().map(|p| p.id()).collect();
        self.prune_vanished(&input_ids, &output_ids);

        let mut ports = Vec::new();

        for port in input_ports.iter() {
            // Ports can vanish between listing and querying, skip those
            if let Ok(name) = midi_in.port_name(port) {
                ports.push(self.descriptor(PortKey::input(port.id()), name));
            }
        }

        for port in output_ports.iter() {
            if let Ok(name) = midi_out.port_name(port) {
                ports.push(self.descriptor(PortKey::output(port.id()), name));
            }
        }

        Ok(ports)
    }

    fn open(&self, key: &PortKey) -> Result<(), PortIoError> {
        if self.is_open(key) {
            return Ok(());
        }
        match key.direction {
            Direction::Input => self.open_input(&key.id),
            Direction::Output => self.open_output(&key.id),
        }
    }

    fn close(&self, key: &PortKey) -> Result<(), PortIoError> {
        match key.direction {
            Direction::Input => self.close_input(&key.id),
            Direction::Output => self.close_output(&key.id),
        }
    }
}

fn find_input(midi_in: &MidiInput, id: &str) -> Result<MidiInputPort, PortIoError> {
    midi_in
        .ports()
        .into_iter()
        .find(|p| p.id() == id)
        .ok_or_else(|| PortIoError::new(format!("input port {} is no longer available", id)))
}

fn find_output(midi_out: &MidiOutput, id: &str) -> Result<MidiOutputPort, PortIoError> {
    midi_out
        .ports()
        .into_iter()
        .find(|p| p.id() == id)
        .ok_or_else(|| PortIoError::new(format!("output port {} is no longer available", id)))
}

/// Removes and returns the entries of `open` whose id is not in `present`
fn take_missing<C>(open: &mut HashMap<String, C>, present: &HashSet<String>) -> Vec<(String, C)> {
    let missing: Vec<String> = open
        .keys()
        .filter(|id| !present.contains(*id))
        .cloned()
        .collect();
    missing
        .into_iter()
        .filter_map(|id| open.remove(&id).map(|c| (id, c)))
        .collect()
}

/// Splits an ALSA style "Client:Port" name into (client, port).
///
/// midir does not report a manufacturer, the client name is the closest thing.
/// Names without a separator have no manufacturer.
fn split_client_label(raw: &str) -> (String, String) {
    match raw.split_once(':') {
        Some((client, port)) if !client.trim().is_empty() && !port.trim().is_empty() => {
            (client.trim().to_string(), port.trim().to_string())
        }
        _ => (String::new(), raw.trim().to_string()),
    }
}
