use crate::midi::MidiCapability;
use crate::port::{Direction, PortKey};
use crate::table::{PortTable, TableChange, TableConfig, ToggleOutcome};
use crossbeam::channel::Receiver;
use std::collections::VecDeque;
use std::sync::Arc;

const MAX_LOG_MESSAGES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Inputs,
    Outputs,
}

impl PaneFocus {
    pub fn direction(self) -> Direction {
        match self {
            PaneFocus::Inputs => Direction::Input,
            PaneFocus::Outputs => Direction::Output,
        }
    }
}

pub struct App {
    pub table: PortTable,
    pub focus: PaneFocus,
    pub selected_input_idx: usize,
    pub selected_output_idx: usize,
    pub log_messages: VecDeque<String>,
    pub show_help: bool,
    pub should_quit: bool,

    changes: Receiver<TableChange>,
}

impl App {
    pub fn new(capability: Arc<dyn MidiCapability>, config: TableConfig) -> Self {
        let mut table = PortTable::new(capability, config);
        let changes = table.subscribe();

        Self {
            table,
            focus: PaneFocus::Inputs,
            selected_input_idx: 0,
            selected_output_idx: 0,
            log_messages: VecDeque::new(),
            show_help: false,
            should_quit: false,
            changes,
        }
    }

    /// Starts the table. An unavailable MIDI subsystem is shown, not returned.
    pub fn initialize(&mut self) {
        let _ = self.table.start();
        self.process_events();

        if self.table.unavailable().is_none() {
            let (inputs, outputs) = (self.table.len(Direction::Input), self.table.len(Direction::Output));
            if inputs == 0 && outputs == 0 {
                self.add_log("No MIDI devices found. Connect a MIDI device or enable IAC Driver.".to_string());
            } else {
                self.add_log(format!("Found {} input(s) and {} output(s)", inputs, outputs));
            }
        }
    }

    pub fn process_events(&mut self) {
        self.table.process_events();

        while let Ok(change) = self.changes.try_recv() {
            let line = match change {
                TableChange::PortAdded(port) => format!("+ {} {}", port.direction(), port.label()),
                TableChange::PortRemoved(key) => format!("- {}", key),
                TableChange::StateChanged { key, state } => {
                    format!("{}: {}", self.label_for(&key), state)
                }
                TableChange::AvailabilityChanged(Some(e)) => format!("ERROR: {}", e),
                TableChange::AvailabilityChanged(None) => "MIDI available".to_string(),
            };
            self.add_log(line);
        }

        self.clamp_selection();
    }

    fn add_log(&mut self, msg: String) {
        self.log_messages.push_back(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.pop_front();
        }
    }

    fn label_for(&self, key: &PortKey) -> String {
        self.table
            .rows(key.direction)
            .find(|row| &row.port.key == key)
            .map(|row| row.port.label())
            .unwrap_or_else(|| key.to_string())
    }

    fn clamp_selection(&mut self) {
        let last_input = self.table.len(Direction::Input).saturating_sub(1);
        let last_output = self.table.len(Direction::Output).saturating_sub(1);
        self.selected_input_idx = self.selected_input_idx.min(last_input);
        self.selected_output_idx = self.selected_output_idx.min(last_output);
    }

    pub fn selected_idx(&self, direction: Direction) -> Option<usize> {
        if self.focus.direction() != direction {
            return None;
        }
        Some(match direction {
            Direction::Input => self.selected_input_idx,
            Direction::Output => self.selected_output_idx,
        })
    }

    pub fn selected_key(&self) -> Option<PortKey> {
        let direction = self.focus.direction();
        let idx = self.selected_idx(direction)?;
        self.table
            .rows(direction)
            .nth(idx)
            .map(|row| row.port.key.clone())
    }

    // Keyboard input handlers

    pub fn handle_key_up(&mut self) {
        let idx = match self.focus {
            PaneFocus::Inputs => &mut self.selected_input_idx,
            PaneFocus::Outputs => &mut self.selected_output_idx,
        };
        *idx = idx.saturating_sub(1);
    }

    pub fn handle_key_down(&mut self) {
        let last = self.table.len(self.focus.direction()).saturating_sub(1);
        let idx = match self.focus {
            PaneFocus::Inputs => &mut self.selected_input_idx,
            PaneFocus::Outputs => &mut self.selected_output_idx,
        };
        if *idx < last {
            *idx += 1;
        }
    }

    pub fn handle_tab(&mut self) {
        self.focus = match self.focus {
            PaneFocus::Inputs => PaneFocus::Outputs,
            PaneFocus::Outputs => PaneFocus::Inputs,
        };
    }

    /// Toggles the selected port
    pub fn handle_enter(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        match self.table.request_toggle(&key) {
            ToggleOutcome::Issued(_) => {}
            ToggleOutcome::Busy => {
                if let Some(state) = self.table.state(&key) {
                    let line = format!("{}: still {}", self.label_for(&key), state);
                    self.add_log(line);
                }
            }
            ToggleOutcome::Stale => self.add_log(format!("{} is gone", key)),
        }
        self.process_events();
    }

    pub fn handle_refresh(&mut self) {
        let _ = self.table.refresh();
        self.process_events();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn handle_escape(&mut self) {
        self.show_help = false;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn shutdown(&mut self) {
        self.table.stop();
    }
}
