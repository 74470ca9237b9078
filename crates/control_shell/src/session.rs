//! Session state shared by command actions and the completion engine.

use std::collections::BTreeMap;

use control_host::SystemHandle;

/// Token the operator types to address the system with the empty name.
pub const EMPTY_SYSTEM_TOKEN: &str = "-";

/// Session key for a system name reported by the control service.
pub fn system_key(name: &str) -> String {
    if name.is_empty() {
        EMPTY_SYSTEM_TOKEN.to_string()
    } else {
        name.to_string()
    }
}

/// System name to pass to the control service for an operator token.
pub fn service_system_name(token: &str) -> &str {
    if token == EMPTY_SYSTEM_TOKEN {
        ""
    } else {
        token
    }
}

/// Systems known to the shell plus the context used for completion.
///
/// Created empty at startup and cleared on a clean shutdown.
#[derive(Default)]
pub struct SessionState {
    known_systems: BTreeMap<String, SystemHandle>,
    last_system_name: String,
    auto_discovery: bool,
}

impl SessionState {
    /// Creates an empty session with auto-discovery disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle registered under `key`.
    pub fn system(&self, key: &str) -> Option<SystemHandle> {
        self.known_systems.get(key).cloned()
    }

    /// Whether a system is registered under `key`.
    pub fn contains_system(&self, key: &str) -> bool {
        self.known_systems.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn system_names(&self) -> Vec<String> {
        self.known_systems.keys().cloned().collect()
    }

    /// Registers `system` under `key`, replacing any previous handle.
    pub fn insert_system(&mut self, key: impl Into<String>, system: SystemHandle) {
        self.known_systems.insert(key.into(), system);
    }

    /// Registers `system` only if `key` is free. Returns whether it was inserted.
    pub fn insert_new_system(&mut self, key: impl Into<String>, system: SystemHandle) -> bool {
        match self.known_systems.entry(key.into()) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(system);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Forgets the system registered under `key`.
    pub fn remove_system(&mut self, key: &str) -> Option<SystemHandle> {
        self.known_systems.remove(key)
    }

    /// Most recently referenced system key.
    pub fn last_system_name(&self) -> &str {
        &self.last_system_name
    }

    /// Records the most recently referenced system key.
    pub fn set_last_system_name(&mut self, key: impl Into<String>) {
        self.last_system_name = key.into();
    }

    /// Handle of the most recently referenced system, if it is still known.
    pub fn last_system(&self) -> Option<SystemHandle> {
        self.system(&self.last_system_name)
    }

    /// Whether unknown system names trigger an implicit discovery.
    pub fn auto_discovery_enabled(&self) -> bool {
        self.auto_discovery
    }

    /// Toggles implicit discovery.
    pub fn set_auto_discovery(&mut self, enabled: bool) {
        self.auto_discovery = enabled;
    }

    /// Number of known systems.
    pub fn len(&self) -> usize {
        self.known_systems.len()
    }

    /// Whether no system is known.
    pub fn is_empty(&self) -> bool {
        self.known_systems.is_empty()
    }

    /// Drops every known system and the completion context.
    pub fn clear(&mut self) {
        self.known_systems.clear();
        self.last_system_name.clear();
    }
}
