use crate::error::CapabilityError;
use crate::midi::MidiCapability;
use crate::port::{Direction, Port, PortDescriptor};
use std::collections::HashSet;

/// Read-only snapshot of the known ports, split by direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl RegistrySnapshot {
    /// Enumerates the capability and sorts the result into buckets
    pub fn capture(capability: &dyn MidiCapability) -> Result<Self, CapabilityError> {
        Ok(Self::from_descriptors(capability.enumerate()?))
    }

    /// Keeps enumeration order within each bucket; a repeated key keeps its first entry
    pub fn from_descriptors(descriptors: Vec<PortDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut snapshot = Self::default();

        for descriptor in descriptors {
            if !seen.insert(descriptor.key.clone()) {
                continue;
            }
            let port = Port::from(descriptor);
            match port.direction() {
                Direction::Input => snapshot.inputs.push(port),
                Direction::Output => snapshot.outputs.push(port),
            }
        }

        snapshot
    }
}
