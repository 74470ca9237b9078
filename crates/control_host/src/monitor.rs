//! Monitoring events pushed by a subscribed system.

use chrono::{DateTime, Utc};
use futures::channel::mpsc::UnboundedSender;
use serde::{Deserialize, Serialize};

use crate::state::SystemState;

/// Severity attached to a remote log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    /// Unrecoverable failure.
    Fatal,
    /// Error.
    Error,
    /// Warning.
    Warning,
    /// Informational message.
    Info,
    /// Debug output.
    Debug,
}

impl LogSeverity {
    /// Fixed-width label used in monitor output.
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Fatal => "[FATAL]",
            LogSeverity::Error => "[ERROR]",
            LogSeverity::Warning => "[WARN ]",
            LogSeverity::Info => "[INFO ]",
            LogSeverity::Debug => "[DEBUG]",
        }
    }
}

/// One notification delivered to a monitoring subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MonitorEvent {
    /// A participant reached a new state.
    StateChanged {
        /// Participant name.
        participant: String,
        /// New state.
        state: SystemState,
    },
    /// A participant was renamed.
    NameChanged {
        /// Previous name.
        old_name: String,
        /// Current name.
        new_name: String,
    },
    /// A participant emitted a log record.
    Log {
        /// Time the record was produced.
        timestamp: DateTime<Utc>,
        /// Record severity.
        severity: LogSeverity,
        /// Emitting participant.
        participant: String,
        /// Logger name inside the participant.
        logger: String,
        /// Message text.
        message: String,
    },
}

/// Sending half of a monitoring subscription.
///
/// The subscriber owns the receiving half and drains it on its own schedule.
pub type MonitorSink = UnboundedSender<MonitorEvent>;
