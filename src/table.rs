use crate::error::{CapabilityError, PortIoError};
use crate::events::AppEvent;
use crate::midi::dispatch::dispatch;
use crate::midi::monitor::{Enumeration, PortWatcher};
use crate::midi::{MidiCapability, RequestKind};
use crate::port::{Direction, Port, PortKey};
use crate::registry::RegistrySnapshot;
use crate::toggle::{RequestTicket, ToggleController, ToggleState};
use crossbeam::channel::{self, Receiver, Sender};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// How often the watcher re-enumerates. `None` disables the watcher.
    pub poll_interval: Option<Duration>,
}

/// Notifications for whoever renders the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange {
    PortAdded(Port),
    PortRemoved(PortKey),
    StateChanged { key: PortKey, state: ToggleState },
    AvailabilityChanged(Option<CapabilityError>),
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A request was sent to the hardware
    Issued(RequestKind),
    /// The port already has a request in flight
    Busy,
    /// No such port (it disappeared or was never known)
    Stale,
}

/// One row of a pane
#[derive(Debug, Clone, Copy)]
pub struct PortRow<'a> {
    pub port: &'a Port,
    pub state: &'a ToggleState,
}

/// Keeps one toggle controller per known port, in step with the hardware.
///
/// Inputs and outputs are kept in two lists in discovery order. Request
/// outcomes and watcher notifications arrive on an internal channel and are
/// applied by [`PortTable::process_events`] on the owning thread.
pub struct PortTable {
    capability: Arc<dyn MidiCapability>,
    config: TableConfig,
    inputs: Vec<ToggleController>,
    outputs: Vec<ToggleController>,
    next_ticket: u64,
    unavailable: Option<CapabilityError>,
    started: bool,
    watcher: Option<PortWatcher>,
    subscribers: Vec<Sender<TableChange>>,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
}

impl PortTable {
    pub fn new(capability: Arc<dyn MidiCapability>, config: TableConfig) -> Self {
        let (event_tx, event_rx) = channel::unbounded();
        Self {
            capability,
            config,
            inputs: Vec::new(),
            outputs: Vec::new(),
            next_ticket: 0,
            unavailable: None,
            started: false,
            watcher: None,
            subscribers: Vec::new(),
            event_tx,
            event_rx,
        }
    }

    /// First enumeration, then change watching.
    ///
    /// The watcher starts even when the first enumeration fails so the
    /// table recovers once MIDI becomes available.
    pub fn start(&mut self) -> Result<(), CapabilityError> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        // The watcher compares against what the table applied, so a change
        // between the two enumerations is still reported
        let enumeration = self.capability.enumerate();
        let result = self.apply_enumeration(enumeration.clone());

        if let Some(interval) = self.config.poll_interval {
            let spawned = PortWatcher::spawn(
                self.capability.clone(),
                interval,
                enumeration,
                self.event_tx.clone(),
            );
            match spawned {
                Ok(watcher) => self.watcher = Some(watcher),
                Err(e) => warn!(error = %e, "could not start port watcher"),
            }
        }

        result
    }

    /// Stops watching and drops every controller.
    ///
    /// Requests still in flight finish on their worker threads; their
    /// outcomes are discarded.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;

        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }

        let retired: Vec<PortKey> = self
            .inputs
            .drain(..)
            .chain(self.outputs.drain(..))
            .map(|c| c.port().key.clone())
            .collect();
        for key in retired {
            self.notify(TableChange::PortRemoved(key));
        }
        info!("port table stopped");
    }

    /// Re-enumerates and applies the result.
    ///
    /// On failure the table is marked unavailable and the controllers are
    /// left as they were.
    pub fn refresh(&mut self) -> Result<(), CapabilityError> {
        let enumeration = self.capability.enumerate();
        self.apply_enumeration(enumeration)
    }

    fn apply_enumeration(&mut self, enumeration: Enumeration) -> Result<(), CapabilityError> {
        match enumeration {
            Ok(descriptors) => {
                self.set_unavailable(None);
                self.apply_snapshot(RegistrySnapshot::from_descriptors(descriptors));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "port enumeration failed");
                self.set_unavailable(Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Brings the controller set in line with `snapshot`
    pub fn apply_snapshot(&mut self, snapshot: RegistrySnapshot) {
        let RegistrySnapshot { inputs, outputs } = snapshot;
        self.apply_bucket(Direction::Input, inputs);
        self.apply_bucket(Direction::Output, outputs);
    }

    fn apply_bucket(&mut self, direction: Direction, ports: Vec<Port>) {
        let mut changes = Vec::new();
        let present: HashSet<PortKey> = ports.iter().map(|p| p.key.clone()).collect();
        let bucket = self.bucket_mut(direction);

        bucket.retain(|c| {
            let key = &c.port().key;
            if present.contains(key) {
                return true;
            }
            if let Some(ticket) = c.in_flight() {
                info!(port = %key, %ticket, "port vanished with a request in flight");
            } else {
                info!(port = %key, "port vanished");
            }
            changes.push(TableChange::PortRemoved(key.clone()));
            false
        });

        for port in ports {
            if port.direction() != direction {
                continue;
            }
            match bucket.iter_mut().find(|c| c.port().key == port.key) {
                Some(controller) => {
                    if controller.update_port(port) {
                        changes.push(TableChange::StateChanged {
                            key: controller.port().key.clone(),
                            state: controller.state().clone(),
                        });
                    }
                }
                None => {
                    info!(port = %port.key, label = %port.label(), status = %port.status, "port discovered");
                    changes.push(TableChange::PortAdded(port.clone()));
                    bucket.push(ToggleController::new(port));
                }
            }
        }

        for change in changes {
            self.notify(change);
        }
    }

    /// User intent for one port.
    ///
    /// Never fails: unknown ports are `Stale`, ports with a request in
    /// flight are `Busy`, and a request that cannot be started is recorded
    /// as a failure on the port.
    pub fn request_toggle(&mut self, key: &PortKey) -> ToggleOutcome {
        let ticket = RequestTicket(self.next_ticket);

        let Some(controller) = self.controller_mut(key) else {
            debug!(port = %key, "toggle for unknown port ignored");
            return ToggleOutcome::Stale;
        };
        let Some(kind) = controller.begin_toggle(ticket) else {
            return ToggleOutcome::Busy;
        };
        let state = controller.state().clone();

        self.next_ticket += 1;
        info!(port = %key, %kind, %ticket, "port request issued");
        self.notify(TableChange::StateChanged {
            key: key.clone(),
            state,
        });

        let dispatched = dispatch(
            self.capability.clone(),
            key.clone(),
            kind,
            ticket,
            self.event_tx.clone(),
        );
        if let Err(e) = dispatched {
            self.resolve(key, ticket, Err(e));
        }

        ToggleOutcome::Issued(kind)
    }

    /// Applies everything that has arrived so far. Returns the number of events handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Blocks until one event arrives or `timeout` passes
    #[cfg(test)]
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(_) => false,
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RequestResolved {
                key,
                ticket,
                kind,
                result,
            } => {
                debug!(port = %key, %kind, %ticket, ok = result.is_ok(), "request outcome received");
                self.resolve(&key, ticket, result);
            }
            AppEvent::PortsChanged => {
                if self.started {
                    // Failure is recorded on the table, nothing else to do here
                    let _ = self.refresh();
                }
            }
        }
    }

    fn resolve(
        &mut self,
        key: &PortKey,
        ticket: RequestTicket,
        result: Result<(), PortIoError>,
    ) {
        let Some(controller) = self.controller_mut(key) else {
            debug!(port = %key, %ticket, "discarding outcome for retired port");
            return;
        };
        if controller.resolve(ticket, result) {
            let state = controller.state().clone();
            self.notify(TableChange::StateChanged {
                key: key.clone(),
                state,
            });
        }
    }

    /// Receives every change from now on
    pub fn subscribe(&mut self) -> Receiver<TableChange> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: TableChange) {
        self.subscribers.retain(|s| s.send(change.clone()).is_ok());
    }

    fn set_unavailable(&mut self, unavailable: Option<CapabilityError>) {
        if self.unavailable != unavailable {
            self.unavailable = unavailable.clone();
            self.notify(TableChange::AvailabilityChanged(unavailable));
        }
    }

    /// Set while the last enumeration failed
    pub fn unavailable(&self) -> Option<&CapabilityError> {
        self.unavailable.as_ref()
    }

    pub fn rows(&self, direction: Direction) -> impl Iterator<Item = PortRow<'_>> {
        self.bucket(direction).iter().map(|c| PortRow {
            port: c.port(),
            state: c.state(),
        })
    }

    pub fn len(&self, direction: Direction) -> usize {
        self.bucket(direction).len()
    }

    pub fn state(&self, key: &PortKey) -> Option<&ToggleState> {
        self.bucket(key.direction)
            .iter()
            .find(|c| &c.port().key == key)
            .map(|c| c.state())
    }

    fn controller_mut(&mut self, key: &PortKey) -> Option<&mut ToggleController> {
        self.bucket_mut(key.direction)
            .iter_mut()
            .find(|c| &c.port().key == key)
    }

    fn bucket(&self, direction: Direction) -> &Vec<ToggleController> {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    fn bucket_mut(&mut self, direction: Direction) -> &mut Vec<ToggleController> {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }
}

impl Drop for PortTable {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::fake::{descriptor, FakeCapability};
    use crate::port::{PortDescriptor, PortStatus};

    const WAIT: Duration = Duration::from_secs(2);
    const QUIET: Duration = Duration::from_millis(50);

    fn table_with(ports: Vec<PortDescriptor>) -> (Arc<FakeCapability>, PortTable) {
        let fake = Arc::new(FakeCapability::with_ports(ports));
        let mut table = PortTable::new(fake.clone(), TableConfig::default());
        table.start().unwrap();
        (fake, table)
    }

    fn ids(table: &PortTable, direction: Direction) -> Vec<String> {
        table.rows(direction).map(|r| r.port.key.id.clone()).collect()
    }

    #[test]
    fn test_connect_succeeds() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Issued(RequestKind::Open));
        assert_eq!(table.state(&key), Some(&ToggleState::Connecting));

        let call = fake.next_call(WAIT).unwrap();
        assert_eq!((call.kind, call.key.clone()), (RequestKind::Open, key.clone()));
        call.succeed();

        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
        assert_eq!(fake.status(&key), Some(PortStatus::Open));
    }

    #[test]
    fn test_failed_open_can_be_retried() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        table.request_toggle(&key);
        fake.next_call(WAIT).unwrap().fail("access denied");
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Failed("access denied".to_string())));

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Issued(RequestKind::Open));
        assert_eq!(table.state(&key), Some(&ToggleState::Connecting));
        fake.next_call(WAIT).unwrap().succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
    }

    #[test]
    fn test_toggle_while_connecting_issues_nothing() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        table.request_toggle(&key);
        let call = fake.next_call(WAIT).unwrap();

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Busy);
        assert_eq!(table.request_toggle(&key), ToggleOutcome::Busy);
        assert!(fake.next_call(QUIET).is_none());

        call.succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
        assert!(fake.next_call(QUIET).is_none());
    }

    #[test]
    fn test_toggle_while_disconnecting_issues_nothing() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Open)]);

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Issued(RequestKind::Close));
        let call = fake.next_call(WAIT).unwrap();
        assert_eq!(call.kind, RequestKind::Close);

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Busy);
        assert_eq!(table.state(&key), Some(&ToggleState::Disconnecting));
        assert!(fake.next_call(QUIET).is_none());

        call.succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Disconnected));
        assert!(fake.next_call(QUIET).is_none());
    }

    #[test]
    fn test_full_round_trip() {
        let key = PortKey::output("5");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Synth", PortStatus::Closed)]);

        table.request_toggle(&key);
        fake.next_call(WAIT).unwrap().succeed();
        table.wait_for_event(WAIT);

        assert_eq!(table.request_toggle(&key), ToggleOutcome::Issued(RequestKind::Close));
        assert_eq!(table.state(&key), Some(&ToggleState::Disconnecting));
        fake.next_call(WAIT).unwrap().succeed();
        table.wait_for_event(WAIT);

        assert_eq!(table.state(&key), Some(&ToggleState::Disconnected));
        assert_eq!(fake.status(&key), Some(PortStatus::Closed));
    }

    #[test]
    fn test_removed_port_is_stale() {
        let keep = PortKey::input("1");
        let gone = PortKey::input("2");
        let (fake, mut table) = table_with(vec![
            descriptor(keep.clone(), "Keys", PortStatus::Closed),
            descriptor(gone.clone(), "Pads", PortStatus::Closed),
        ]);
        assert_eq!(table.len(Direction::Input), 2);

        fake.remove_port(&gone);
        table.refresh().unwrap();

        assert_eq!(ids(&table, Direction::Input), vec!["1"]);
        assert_eq!(table.request_toggle(&gone), ToggleOutcome::Stale);
        assert!(fake.next_call(QUIET).is_none());
    }

    #[test]
    fn test_external_open_needs_no_request() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        fake.set_status(&key, PortStatus::Open);
        table.refresh().unwrap();

        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
        assert!(fake.next_call(QUIET).is_none());
    }

    #[test]
    fn test_initial_state_from_open_port() {
        let key = PortKey::output("1");
        let (_fake, table) = table_with(vec![descriptor(key.clone(), "Synth", PortStatus::Open)]);
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
    }

    #[test]
    fn test_refresh_does_not_interrupt_request() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        table.request_toggle(&key);
        let call = fake.next_call(WAIT).unwrap();
        fake.set_status(&key, PortStatus::Error);
        table.refresh().unwrap();
        assert_eq!(table.state(&key), Some(&ToggleState::Connecting));

        call.succeed();
        table.wait_for_event(WAIT);
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
    }

    #[test]
    fn test_outcome_for_removed_port_is_discarded() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);

        table.request_toggle(&key);
        let call = fake.next_call(WAIT).unwrap();
        fake.remove_port(&key);
        table.refresh().unwrap();
        assert_eq!(table.state(&key), None);

        call.succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), None);
        assert_eq!(table.len(Direction::Input), 0);
    }

    #[test]
    fn test_old_outcome_does_not_reach_readded_port() {
        let key = PortKey::input("1");
        let port = descriptor(key.clone(), "Keys", PortStatus::Closed);
        let (fake, mut table) = table_with(vec![port.clone()]);

        table.request_toggle(&key);
        let first = fake.next_call(WAIT).unwrap();

        fake.set_ports(vec![]);
        table.refresh().unwrap();
        fake.set_ports(vec![port]);
        table.refresh().unwrap();
        assert_eq!(table.state(&key), Some(&ToggleState::Disconnected));

        table.request_toggle(&key);
        let second = fake.next_call(WAIT).unwrap();

        first.fail("unplugged");
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connecting));

        second.succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));
    }

    #[test]
    fn test_ports_resolve_independently() {
        let a = PortKey::input("a");
        let b = PortKey::output("b");
        let (fake, mut table) = table_with(vec![
            descriptor(a.clone(), "A", PortStatus::Closed),
            descriptor(b.clone(), "B", PortStatus::Open),
        ]);

        table.request_toggle(&a);
        table.request_toggle(&b);
        let mut calls = vec![fake.next_call(WAIT).unwrap(), fake.next_call(WAIT).unwrap()];
        calls.sort_by_key(|c| c.key.direction == Direction::Input);
        let call_a = calls.pop().unwrap();
        let call_b = calls.pop().unwrap();
        assert_eq!(call_a.kind, RequestKind::Open);
        assert_eq!(call_b.kind, RequestKind::Close);

        call_b.succeed();
        table.wait_for_event(WAIT);
        assert_eq!(table.state(&b), Some(&ToggleState::Disconnected));
        assert_eq!(table.state(&a), Some(&ToggleState::Connecting));

        call_a.fail("busy");
        table.wait_for_event(WAIT);
        assert_eq!(table.state(&a), Some(&ToggleState::Failed("busy".to_string())));
    }

    #[test]
    fn test_known_ports_keep_their_order() {
        let (fake, mut table) = table_with(vec![
            descriptor(PortKey::input("a"), "A", PortStatus::Closed),
            descriptor(PortKey::input("b"), "B", PortStatus::Closed),
        ]);

        fake.set_ports(vec![
            descriptor(PortKey::input("c"), "C", PortStatus::Closed),
            descriptor(PortKey::input("b"), "B", PortStatus::Closed),
            descriptor(PortKey::input("a"), "A", PortStatus::Closed),
            descriptor(PortKey::output("a"), "A", PortStatus::Closed),
        ]);
        table.refresh().unwrap();

        assert_eq!(ids(&table, Direction::Input), vec!["a", "b", "c"]);
        assert_eq!(ids(&table, Direction::Output), vec!["a"]);
    }

    #[test]
    fn test_unavailable_keeps_controllers() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);
        let changes = table.subscribe();

        fake.set_unavailable(Some("permission denied"));
        fake.set_ports(vec![]);
        assert!(table.refresh().is_err());

        let expected = CapabilityError::Unavailable("permission denied".to_string());
        assert_eq!(table.unavailable(), Some(&expected));
        assert_eq!(table.len(Direction::Input), 1);
        assert_eq!(changes.try_recv(), Ok(TableChange::AvailabilityChanged(Some(expected))));

        // a second failure is not a new change
        assert!(table.refresh().is_err());
        assert!(changes.try_recv().is_err());

        fake.set_unavailable(None);
        table.refresh().unwrap();
        assert_eq!(table.unavailable(), None);
        assert_eq!(table.len(Direction::Input), 0);
    }

    #[test]
    fn test_start_reports_unavailable() {
        let fake = Arc::new(FakeCapability::new());
        fake.set_unavailable(Some("no ALSA sequencer"));
        let mut table = PortTable::new(fake, TableConfig::default());

        assert!(table.start().is_err());
        assert!(table.unavailable().is_some());
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let key = PortKey::input("1");
        let fake = Arc::new(FakeCapability::with_ports(vec![descriptor(
            key.clone(),
            "Keys",
            PortStatus::Closed,
        )]));
        let mut table = PortTable::new(fake.clone(), TableConfig::default());
        let changes = table.subscribe();
        table.start().unwrap();

        assert!(matches!(changes.try_recv(), Ok(TableChange::PortAdded(p)) if p.key == key));

        table.request_toggle(&key);
        assert_eq!(
            changes.try_recv(),
            Ok(TableChange::StateChanged {
                key: key.clone(),
                state: ToggleState::Connecting
            })
        );

        fake.next_call(WAIT).unwrap().succeed();
        table.wait_for_event(WAIT);
        assert_eq!(
            changes.try_recv(),
            Ok(TableChange::StateChanged {
                key: key.clone(),
                state: ToggleState::Connected
            })
        );
    }

    #[test]
    fn test_stop_discards_controllers() {
        let key = PortKey::input("1");
        let (fake, mut table) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);
        let changes = table.subscribe();

        table.request_toggle(&key);
        let call = fake.next_call(WAIT).unwrap();
        changes.try_recv().unwrap();

        table.stop();
        assert_eq!(changes.try_recv(), Ok(TableChange::PortRemoved(key.clone())));
        assert_eq!(table.len(Direction::Input), 0);
        assert_eq!(table.request_toggle(&key), ToggleOutcome::Stale);

        call.succeed();
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), None);
    }

    #[test]
    fn test_watcher_drives_reconciliation() {
        let key = PortKey::input("1");
        let fake = Arc::new(FakeCapability::with_ports(vec![descriptor(
            key.clone(),
            "Keys",
            PortStatus::Closed,
        )]));
        let config = TableConfig {
            poll_interval: Some(Duration::from_millis(10)),
        };
        let mut table = PortTable::new(fake.clone(), config);
        table.start().unwrap();

        fake.set_status(&key, PortStatus::Open);
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), Some(&ToggleState::Connected));

        fake.remove_port(&key);
        assert!(table.wait_for_event(WAIT));
        assert_eq!(table.state(&key), None);
        table.stop();
    }

    #[test]
    fn test_watcher_reports_port_added_during_start() {
        let fake = Arc::new(FakeCapability::new());
        let config = TableConfig {
            poll_interval: Some(Duration::from_millis(10)),
        };
        let mut table = PortTable::new(fake.clone(), config);
        table.start().unwrap();
        assert_eq!(table.len(Direction::Input), 0);

        // the first poll compares against the enumeration start applied
        fake.set_ports(vec![descriptor(PortKey::input("1"), "Keys", PortStatus::Closed)]);
        assert!(table.wait_for_event(WAIT));
        assert_eq!(ids(&table, Direction::Input), vec!["1"]);
        table.stop();
    }

    #[test]
    fn test_independent_tables() {
        let key = PortKey::input("1");
        let (_fake_a, mut a) = table_with(vec![descriptor(key.clone(), "Keys", PortStatus::Closed)]);
        let (_fake_b, b) = table_with(vec![]);

        a.request_toggle(&key);
        assert_eq!(a.state(&key), Some(&ToggleState::Connecting));
        assert_eq!(b.state(&key), None);
    }
}
