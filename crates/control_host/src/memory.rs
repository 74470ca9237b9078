//! In-process control network used by the `system_control` binary and by tests.
//!
//! Systems become discoverable once they are announced, either from a [`SystemDescriptor`] value
//! or from a JSON descriptor file. Every handle handed out by [`MemoryControlService`] shares the
//! same network, so a transition made through one handle is visible through all others and is
//! published to the system's monitoring subscriber.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs,
    path::Path,
    rc::Rc,
};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ServiceError, ServiceResult},
    monitor::{LogSeverity, MonitorEvent, MonitorSink},
    service::{
        ControlService, ParticipantInfo, ParticipantStateMachine, RemoteParticipant,
        RemoteSystem, SystemHandle,
    },
    state::{AggregatedState, SystemState, Transition},
};

/// RPC object table: object name to interface id to interface definition.
pub type RpcObjectTable = BTreeMap<String, BTreeMap<String, String>>;

/// JSON system descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemDescriptor {
    /// System name; empty for the default system.
    pub name: String,
    /// Participants in declaration order.
    #[serde(default)]
    pub participants: Vec<ParticipantDescriptor>,
}

impl SystemDescriptor {
    /// Creates a descriptor from participant descriptors.
    pub fn new(
        name: impl Into<String>,
        participants: impl IntoIterator<Item = ParticipantDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            participants: participants.into_iter().collect(),
        }
    }

    /// Reads and parses a descriptor file.
    pub fn from_file(path: &Path) -> ServiceResult<Self> {
        let body = fs::read_to_string(path).map_err(|err| invalid_file(path, err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| invalid_file(path, err.to_string()))
    }
}

/// One participant entry of a [`SystemDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantDescriptor {
    /// Participant name, unique within its system.
    pub name: String,
    /// State the participant starts in when announced.
    #[serde(default = "default_initial_state")]
    pub state: SystemState,
    /// Whether the participant exposes a state machine.
    #[serde(default = "enabled")]
    pub state_machine: bool,
    /// Whether the participant exposes RPC introspection.
    #[serde(default = "enabled")]
    pub rpc_info: bool,
    /// RPC objects served; a standard set is used when absent.
    #[serde(default)]
    pub rpc_objects: Option<RpcObjectTable>,
}

impl ParticipantDescriptor {
    /// Participant with default capabilities, starting unloaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: default_initial_state(),
            state_machine: true,
            rpc_info: true,
            rpc_objects: None,
        }
    }

    /// Overrides the initial state.
    pub fn in_state(mut self, state: SystemState) -> Self {
        self.state = state;
        self
    }

    /// Removes the state machine capability.
    pub fn without_state_machine(mut self) -> Self {
        self.state_machine = false;
        self
    }

    /// Removes the RPC introspection capability.
    pub fn without_rpc_info(mut self) -> Self {
        self.rpc_info = false;
        self
    }
}

fn default_initial_state() -> SystemState {
    SystemState::Unloaded
}

fn enabled() -> bool {
    true
}

/// RPC objects served by a participant that does not declare its own.
pub fn standard_rpc_objects() -> RpcObjectTable {
    let mut objects = RpcObjectTable::new();
    for (object, iid, methods) in [
        (
            "participant_statemachine",
            "participant_statemachine.control.iid",
            "load unload initialize deinitialize start stop pause shutdown getState",
        ),
        (
            "participant_info",
            "participant_info.control.iid",
            "getName getSystemName getRPCComponents getRPCComponentIIDs",
        ),
        (
            "logging_service",
            "logging_service.control.iid",
            "registerRPCLoggingSink unregisterRPCLoggingSink",
        ),
    ] {
        let definition = format!("interface {iid} {{ {methods} }}");
        objects
            .entry(object.to_string())
            .or_default()
            .insert(iid.to_string(), definition);
    }
    objects
}

/// Timing configuration stored for a system.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TimingConfig {
    /// No timing master.
    #[default]
    NoSync,
    /// Clock synchronization to one master.
    SystemTime {
        /// Master participant.
        master: String,
        /// Interpolation period in milliseconds.
        interpolation_ms: u64,
    },
    /// Discrete stepping driven by one master.
    Discrete {
        /// Master participant.
        master: String,
        /// Step size in milliseconds.
        step_size_ms: f64,
        /// Time factor; `0.0` runs as fast as possible.
        factor: f64,
    },
}

impl TimingConfig {
    fn masters(&self) -> Vec<String> {
        match self {
            TimingConfig::NoSync => Vec::new(),
            TimingConfig::SystemTime { master, .. } | TimingConfig::Discrete { master, .. } => {
                vec![master.clone()]
            }
        }
    }
}

struct NetworkParticipant {
    state: SystemState,
    state_machine: bool,
    rpc_info: bool,
    rpc_objects: RpcObjectTable,
    properties: BTreeMap<String, Value>,
}

impl From<ParticipantDescriptor> for NetworkParticipant {
    fn from(descriptor: ParticipantDescriptor) -> Self {
        Self {
            state: descriptor.state,
            state_machine: descriptor.state_machine,
            rpc_info: descriptor.rpc_info,
            rpc_objects: descriptor.rpc_objects.unwrap_or_else(standard_rpc_objects),
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
struct NetworkSystem {
    participants: BTreeMap<String, NetworkParticipant>,
    timing: TimingConfig,
    monitor: Option<MonitorSink>,
}

impl NetworkSystem {
    fn publish(&mut self, event: MonitorEvent) {
        if let Some(sink) = &self.monitor {
            if sink.unbounded_send(event).is_err() {
                warn!("dropping closed monitoring subscription");
                self.monitor = None;
            }
        }
    }

    fn participant(&self, name: &str) -> ServiceResult<&NetworkParticipant> {
        self.participants
            .get(name)
            .ok_or_else(|| ServiceError::Unreachable(format!("participant \"{name}\"")))
    }

    fn check_transition(&self, name: &str, transition: Transition) -> ServiceResult<()> {
        let participant = self.participant(name)?;
        if !participant.state_machine {
            return Err(ServiceError::Rejected(format!(
                "participant \"{name}\" has no state machine"
            )));
        }
        if !transition.allowed_from(participant.state) {
            return Err(ServiceError::Rejected(format!(
                "participant \"{name}\" cannot {} from state {}",
                transition.verb(),
                participant.state
            )));
        }
        Ok(())
    }

    fn apply(&mut self, name: &str, transition: Transition) -> ServiceResult<()> {
        self.check_transition(name, transition)?;
        let target = transition.target();
        if transition == Transition::Shutdown {
            self.participants.remove(name);
        } else if let Some(participant) = self.participants.get_mut(name) {
            participant.state = target;
        }
        self.publish(MonitorEvent::StateChanged {
            participant: name.to_string(),
            state: target,
        });
        Ok(())
    }
}

#[derive(Default)]
struct NetworkState {
    systems: BTreeMap<String, NetworkSystem>,
}

impl NetworkState {
    fn system(&self, name: &str) -> ServiceResult<&NetworkSystem> {
        self.systems
            .get(name)
            .ok_or_else(|| ServiceError::Unreachable(format!("system \"{name}\"")))
    }

    fn system_mut(&mut self, name: &str) -> ServiceResult<&mut NetworkSystem> {
        self.systems
            .get_mut(name)
            .ok_or_else(|| ServiceError::Unreachable(format!("system \"{name}\"")))
    }
}

type SharedNetwork = Rc<RefCell<NetworkState>>;

#[derive(Clone, Default)]
/// In-memory control service backed by a simulated control network.
pub struct MemoryControlService {
    network: SharedNetwork,
}

impl MemoryControlService {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the participants of `descriptor` discoverable. Existing participants are replaced.
    pub fn announce(&self, descriptor: SystemDescriptor) {
        debug!(
            "announcing system {:?} with {} participants",
            descriptor.name,
            descriptor.participants.len()
        );
        let mut network = self.network.borrow_mut();
        let system = network.systems.entry(descriptor.name).or_default();
        for participant in descriptor.participants {
            let name = participant.name.clone();
            system.participants.insert(name, participant.into());
        }
    }

    /// Reads a descriptor file and announces it.
    pub fn announce_file(&self, path: &Path) -> ServiceResult<SystemDescriptor> {
        let descriptor = SystemDescriptor::from_file(path)?;
        self.announce(descriptor.clone());
        Ok(descriptor)
    }

    /// Current state of one participant, if it is on the network.
    pub fn participant_state(&self, system: &str, participant: &str) -> Option<SystemState> {
        let network = self.network.borrow();
        let system = network.systems.get(system)?;
        system.participants.get(participant).map(|p| p.state)
    }

    /// Properties applied to one participant.
    pub fn participant_properties(
        &self,
        system: &str,
        participant: &str,
    ) -> BTreeMap<String, Value> {
        let network = self.network.borrow();
        network
            .systems
            .get(system)
            .and_then(|system| system.participants.get(participant))
            .map(|participant| participant.properties.clone())
            .unwrap_or_default()
    }

    /// Timing configuration of one system.
    pub fn timing(&self, system: &str) -> Option<TimingConfig> {
        let network = self.network.borrow();
        network.systems.get(system).map(|system| system.timing.clone())
    }

    /// Emits a log record from `participant` to the system's monitoring subscriber.
    ///
    /// Returns whether a subscriber received it.
    pub fn publish_log(
        &self,
        system: &str,
        participant: &str,
        logger: &str,
        severity: LogSeverity,
        message: &str,
    ) -> bool {
        let mut network = self.network.borrow_mut();
        let Some(system) = network.systems.get_mut(system) else {
            return false;
        };
        if system.monitor.is_none() {
            return false;
        }
        system.publish(MonitorEvent::Log {
            timestamp: Utc::now(),
            severity,
            participant: participant.to_string(),
            logger: logger.to_string(),
            message: message.to_string(),
        });
        system.monitor.is_some()
    }

    /// Renames a participant and notifies the monitoring subscriber.
    pub fn rename_participant(
        &self,
        system: &str,
        old_name: &str,
        new_name: &str,
    ) -> ServiceResult<()> {
        let mut network = self.network.borrow_mut();
        let system = network.system_mut(system)?;
        if system.participants.contains_key(new_name) {
            return Err(ServiceError::Rejected(format!(
                "participant \"{new_name}\" already exists"
            )));
        }
        let participant = system
            .participants
            .remove(old_name)
            .ok_or_else(|| ServiceError::NotFound(format!("participant \"{old_name}\"")))?;
        system.participants.insert(new_name.to_string(), participant);
        system.publish(MonitorEvent::NameChanged {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    fn handle(&self, name: &str, members: Vec<String>) -> SystemHandle {
        Rc::new(MemorySystem {
            network: self.network.clone(),
            name: name.to_string(),
            members,
        })
    }
}

impl ControlService for MemoryControlService {
    fn discover_all_systems(&self) -> ServiceResult<Vec<SystemHandle>> {
        debug!("discovering all systems");
        let snapshot: Vec<(String, Vec<String>)> = {
            let network = self.network.borrow();
            network
                .systems
                .iter()
                .filter(|(_, system)| !system.participants.is_empty())
                .map(|(name, system)| (name.clone(), system.participants.keys().cloned().collect()))
                .collect()
        };
        Ok(snapshot
            .into_iter()
            .map(|(name, members)| self.handle(&name, members))
            .collect())
    }

    fn discover_system(&self, name: &str) -> ServiceResult<SystemHandle> {
        debug!("discovering system {name:?}");
        let members = {
            let network = self.network.borrow();
            network
                .systems
                .get(name)
                .map(|system| system.participants.keys().cloned().collect())
                .unwrap_or_default()
        };
        Ok(self.handle(name, members))
    }

    fn connect_system(&self, descriptor: &Path) -> ServiceResult<SystemHandle> {
        debug!("connecting system from {}", descriptor.display());
        let descriptor = SystemDescriptor::from_file(descriptor)?;
        {
            let network = self.network.borrow();
            let system = network.system(&descriptor.name)?;
            for participant in &descriptor.participants {
                system.participant(&participant.name)?;
            }
        }
        let members = descriptor
            .participants
            .iter()
            .map(|participant| participant.name.clone())
            .collect();
        Ok(self.handle(&descriptor.name, members))
    }
}

struct MemorySystem {
    network: SharedNetwork,
    name: String,
    members: Vec<String>,
}

impl MemorySystem {
    fn require_member(&self, participant: &str) -> ServiceResult<()> {
        if self.members.iter().any(|member| member == participant) {
            Ok(())
        } else {
            Err(ServiceError::Rejected(format!(
                "participant \"{participant}\" is not part of system \"{}\"",
                self.name
            )))
        }
    }

    fn require_members(&self) -> ServiceResult<()> {
        if self.members.is_empty() {
            return Err(ServiceError::Rejected(format!(
                "system \"{}\" has no participants",
                self.name
            )));
        }
        Ok(())
    }
}

impl RemoteSystem for MemorySystem {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn participants(&self) -> ServiceResult<Vec<String>> {
        Ok(self.members.clone())
    }

    fn participant(&self, name: &str) -> ServiceResult<Option<Rc<dyn RemoteParticipant>>> {
        if self.require_member(name).is_err() {
            return Ok(None);
        }
        Ok(Some(Rc::new(MemoryParticipant {
            network: self.network.clone(),
            system: self.name.clone(),
            name: name.to_string(),
        })))
    }

    fn state(&self) -> ServiceResult<AggregatedState> {
        let network = self.network.borrow();
        let system = network.systems.get(&self.name);
        Ok(AggregatedState::from_states(self.members.iter().map(
            |member| {
                system
                    .and_then(|system| system.participants.get(member))
                    .map(|participant| participant.state)
                    .unwrap_or(SystemState::Unreachable)
            },
        )))
    }

    fn transition(&self, transition: Transition) -> ServiceResult<()> {
        debug!("system {:?}: {}", self.name, transition.verb());
        self.require_members()?;
        let mut network = self.network.borrow_mut();
        let system = network.system_mut(&self.name)?;
        let mut pending = Vec::new();
        for member in &self.members {
            let participant = system.participant(member)?;
            if transition != Transition::Shutdown && participant.state == transition.target() {
                continue;
            }
            system.check_transition(member, transition)?;
            pending.push(member.as_str());
        }
        for member in pending {
            system.apply(member, transition)?;
        }
        Ok(())
    }

    fn set_state(&self, target: SystemState) -> ServiceResult<()> {
        debug!("system {:?}: set state {target}", self.name);
        if !target.is_lifecycle() {
            return Err(ServiceError::Rejected(format!(
                "state {target} cannot be requested"
            )));
        }
        self.require_members()?;
        let mut network = self.network.borrow_mut();
        let system = network.system_mut(&self.name)?;
        let mut plans = Vec::new();
        for member in &self.members {
            let participant = system.participant(member)?;
            let steps = participant.state.path_to(target).unwrap_or_default();
            if !steps.is_empty() && !participant.state_machine {
                return Err(ServiceError::Rejected(format!(
                    "participant \"{member}\" has no state machine"
                )));
            }
            plans.push((member.as_str(), steps));
        }
        for (member, steps) in plans {
            for step in steps {
                system.apply(member, step)?;
            }
        }
        Ok(())
    }

    fn subset(&self, participants: &[String]) -> ServiceResult<SystemHandle> {
        for participant in participants {
            self.require_member(participant)?;
        }
        Ok(Rc::new(MemorySystem {
            network: self.network.clone(),
            name: self.name.clone(),
            members: participants.to_vec(),
        }))
    }

    fn configure_properties(&self, properties_file: &Path) -> ServiceResult<()> {
        debug!(
            "system {:?}: configure properties from {}",
            self.name,
            properties_file.display()
        );
        let body = fs::read_to_string(properties_file)
            .map_err(|err| invalid_file(properties_file, err.to_string()))?;
        let table: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_str(&body)
            .map_err(|err| invalid_file(properties_file, err.to_string()))?;

        let mut assignments = Vec::new();
        for (target, properties) in table {
            for (path, value) in properties {
                if value.is_object() || value.is_array() {
                    return Err(ServiceError::Rejected(format!(
                        "property \"{path}\" must be a scalar value"
                    )));
                }
                if target == "*" {
                    for member in &self.members {
                        assignments.push((member.clone(), path.clone(), value.clone()));
                    }
                } else {
                    self.require_member(&target)?;
                    assignments.push((target.clone(), path, value));
                }
            }
        }

        let mut network = self.network.borrow_mut();
        let system = network.system_mut(&self.name)?;
        for (participant, _, _) in &assignments {
            system.participant(participant)?;
        }
        for (participant, path, value) in assignments {
            if let Some(entry) = system.participants.get_mut(&participant) {
                entry.properties.insert(path, value);
            }
        }
        Ok(())
    }

    fn configure_timing_system_time(
        &self,
        master: &str,
        interpolation_ms: u64,
    ) -> ServiceResult<()> {
        self.require_member(master)?;
        let mut network = self.network.borrow_mut();
        let system = network.system_mut(&self.name)?;
        system.participant(master)?;
        system.timing = TimingConfig::SystemTime {
            master: master.to_string(),
            interpolation_ms,
        };
        Ok(())
    }

    fn configure_timing_discrete(
        &self,
        master: &str,
        step_size: &str,
        factor: &str,
    ) -> ServiceResult<()> {
        self.require_member(master)?;
        let step_size_ms = parse_decimal("step size", step_size)?;
        if step_size_ms <= 0.0 {
            return Err(ServiceError::Rejected(
                "step size must be greater than zero".to_string(),
            ));
        }
        let factor = parse_decimal("factor", factor)?;
        let mut network = self.network.borrow_mut();
        let system = network.system_mut(&self.name)?;
        system.participant(master)?;
        system.timing = TimingConfig::Discrete {
            master: master.to_string(),
            step_size_ms,
            factor,
        };
        Ok(())
    }

    fn configure_timing_no_sync(&self) -> ServiceResult<()> {
        let mut network = self.network.borrow_mut();
        network.system_mut(&self.name)?.timing = TimingConfig::NoSync;
        Ok(())
    }

    fn timing_masters(&self) -> ServiceResult<Vec<String>> {
        let network = self.network.borrow();
        Ok(network.system(&self.name)?.timing.masters())
    }

    fn start_monitoring(&self, sink: MonitorSink) -> ServiceResult<()> {
        debug!("system {:?}: start monitoring", self.name);
        let mut network = self.network.borrow_mut();
        network.systems.entry(self.name.clone()).or_default().monitor = Some(sink);
        Ok(())
    }

    fn stop_monitoring(&self) -> ServiceResult<()> {
        let mut network = self.network.borrow_mut();
        let removed = network
            .systems
            .get_mut(&self.name)
            .and_then(|system| system.monitor.take());
        match removed {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!(
                "monitoring subscription for system \"{}\"",
                self.name
            ))),
        }
    }
}

struct MemoryParticipant {
    network: SharedNetwork,
    system: String,
    name: String,
}

impl MemoryParticipant {
    fn capability(&self, check: impl Fn(&NetworkParticipant) -> bool) -> bool {
        let network = self.network.borrow();
        network
            .systems
            .get(&self.system)
            .and_then(|system| system.participants.get(&self.name))
            .map(check)
            .unwrap_or(true)
    }

    fn endpoint(&self) -> ParticipantEndpoint {
        ParticipantEndpoint {
            network: self.network.clone(),
            system: self.system.clone(),
            name: self.name.clone(),
        }
    }
}

impl RemoteParticipant for MemoryParticipant {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn state_machine(&self) -> Option<Rc<dyn ParticipantStateMachine>> {
        if !self.capability(|participant| participant.state_machine) {
            return None;
        }
        Some(Rc::new(self.endpoint()))
    }

    fn rpc_info(&self) -> Option<Rc<dyn ParticipantInfo>> {
        if !self.capability(|participant| participant.rpc_info) {
            return None;
        }
        Some(Rc::new(self.endpoint()))
    }
}

struct ParticipantEndpoint {
    network: SharedNetwork,
    system: String,
    name: String,
}

impl ParticipantEndpoint {
    fn rpc_objects_table(&self) -> ServiceResult<RpcObjectTable> {
        let network = self.network.borrow();
        let participant = network.system(&self.system)?.participant(&self.name)?;
        Ok(participant.rpc_objects.clone())
    }
}

impl ParticipantStateMachine for ParticipantEndpoint {
    fn state(&self) -> ServiceResult<SystemState> {
        let network = self.network.borrow();
        Ok(network
            .systems
            .get(&self.system)
            .and_then(|system| system.participants.get(&self.name))
            .map(|participant| participant.state)
            .unwrap_or(SystemState::Unreachable))
    }

    fn transition(&self, transition: Transition) -> ServiceResult<()> {
        debug!(
            "participant {:?}@{:?}: {}",
            self.name,
            self.system,
            transition.verb()
        );
        let mut network = self.network.borrow_mut();
        network.system_mut(&self.system)?.apply(&self.name, transition)
    }
}

impl ParticipantInfo for ParticipantEndpoint {
    fn rpc_objects(&self) -> ServiceResult<Vec<String>> {
        Ok(self.rpc_objects_table()?.into_keys().collect())
    }

    fn rpc_object_iids(&self, object: &str) -> ServiceResult<Vec<String>> {
        let table = self.rpc_objects_table()?;
        let interfaces = table
            .get(object)
            .ok_or_else(|| ServiceError::NotFound(format!("RPC object \"{object}\"")))?;
        Ok(interfaces.keys().cloned().collect())
    }

    fn rpc_interface_definition(&self, object: &str, iid: &str) -> ServiceResult<String> {
        let table = self.rpc_objects_table()?;
        table
            .get(object)
            .and_then(|interfaces| interfaces.get(iid))
            .cloned()
            .ok_or_else(|| {
                ServiceError::NotFound(format!("interface \"{iid}\" of RPC object \"{object}\""))
            })
    }
}

fn invalid_file(path: &Path, message: String) -> ServiceError {
    ServiceError::InvalidFile {
        path: path.display().to_string(),
        message,
    }
}

fn parse_decimal(label: &str, raw: &str) -> ServiceResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ServiceError::Rejected(format!(
            "{label} \"{raw}\" is not a non-negative number"
        ))),
    }
}
