//! Monitoring channel owned by the shell and the text rendering of its events.

use control_host::{MonitorEvent, MonitorSink};
use futures::channel::mpsc::{self, UnboundedReceiver};

/// Receiving end of every monitoring subscription started from this shell.
///
/// Systems get clones of [`MonitorChannel::sink`]; the shell drains the receiver between prompts so
/// notifications never interleave with a half-written command result.
pub struct MonitorChannel {
    sender: MonitorSink,
    receiver: UnboundedReceiver<MonitorEvent>,
}

impl Default for MonitorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorChannel {
    /// Opens a fresh channel.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self { sender, receiver }
    }

    /// Sink handed to systems that start monitoring.
    pub fn sink(&self) -> &MonitorSink {
        &self.sender
    }

    /// Takes every event delivered so far, in delivery order.
    pub fn drain(&mut self) -> Vec<MonitorEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.receiver.try_next() {
            events.push(event);
        }
        events
    }
}

/// Renders one event as the lines printed to the console.
pub fn render_event(event: &MonitorEvent) -> Vec<String> {
    match event {
        MonitorEvent::StateChanged { participant, state } => vec![
            String::new(),
            "####### state changed! #######".to_string(),
            format!("        participant: {participant}"),
            format!("        state: {}", state.name()),
        ],
        MonitorEvent::NameChanged { old_name, new_name } => vec![
            String::new(),
            "####### name changed! #######".to_string(),
            format!("        old name: {old_name}"),
            format!("        new name: {new_name}"),
        ],
        MonitorEvent::Log {
            timestamp,
            severity,
            participant,
            logger,
            message,
        } => vec![format!(
            "    LOG {} {} {logger}@{participant} :{message}",
            severity.label(),
            timestamp.format("%H:%M:%S%.3f")
        )],
    }
}
