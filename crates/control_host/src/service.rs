//! Control service contracts and the baseline no-op adapter.

use std::{path::Path, rc::Rc};

use crate::{
    error::{ServiceError, ServiceResult},
    monitor::MonitorSink,
    state::{AggregatedState, SystemState, Transition},
};

/// Shared handle to a discovered or connected system.
pub type SystemHandle = Rc<dyn RemoteSystem>;

/// Entry point of the remote system control service.
pub trait ControlService {
    /// Discovers every system currently answering on the control network.
    fn discover_all_systems(&self) -> ServiceResult<Vec<SystemHandle>>;

    /// Discovers one system by name. The empty name addresses the default system.
    ///
    /// A handle is returned even when no participant answers; it then has no participants.
    fn discover_system(&self, name: &str) -> ServiceResult<SystemHandle>;

    /// Connects the system described by a descriptor file.
    fn connect_system(&self, descriptor: &Path) -> ServiceResult<SystemHandle>;
}

/// Handle to one remote system.
pub trait RemoteSystem {
    /// Name reported by the system itself (empty for the default system).
    fn name(&self) -> String;

    /// Participant names in a stable order.
    fn participants(&self) -> ServiceResult<Vec<String>>;

    /// Looks up one participant; `Ok(None)` when it is not part of this system.
    fn participant(&self, name: &str) -> ServiceResult<Option<Rc<dyn RemoteParticipant>>>;

    /// Aggregated state over all participants.
    fn state(&self) -> ServiceResult<AggregatedState>;

    /// Applies one transition to every participant that is not already in its target state.
    fn transition(&self, transition: Transition) -> ServiceResult<()>;

    /// Drives every participant to `target` along the lifecycle ladder.
    fn set_state(&self, target: SystemState) -> ServiceResult<()>;

    /// Temporary system made of some of this system's participants.
    fn subset(&self, participants: &[String]) -> ServiceResult<SystemHandle>;

    /// Applies participant properties read from a properties file.
    fn configure_properties(&self, properties_file: &Path) -> ServiceResult<()>;

    /// Synchronizes all participants to `master`'s clock with the given interpolation period.
    fn configure_timing_system_time(&self, master: &str, interpolation_ms: u64)
        -> ServiceResult<()>;

    /// Lets `master` drive discrete simulation steps.
    fn configure_timing_discrete(
        &self,
        master: &str,
        step_size: &str,
        factor: &str,
    ) -> ServiceResult<()>;

    /// Removes any timing master.
    fn configure_timing_no_sync(&self) -> ServiceResult<()>;

    /// Participants currently acting as timing masters.
    fn timing_masters(&self) -> ServiceResult<Vec<String>>;

    /// Subscribes `sink` to state, name, and log events; replaces any previous subscription.
    fn start_monitoring(&self, sink: MonitorSink) -> ServiceResult<()>;

    /// Drops the current subscription.
    fn stop_monitoring(&self) -> ServiceResult<()>;
}

/// Handle to one remote participant with lazily bound capabilities.
pub trait RemoteParticipant {
    /// Participant name.
    fn name(&self) -> String;

    /// State machine capability, when the participant exposes one.
    fn state_machine(&self) -> Option<Rc<dyn ParticipantStateMachine>>;

    /// RPC introspection capability, when the participant exposes one.
    fn rpc_info(&self) -> Option<Rc<dyn ParticipantInfo>>;
}

/// Per-participant lifecycle control.
pub trait ParticipantStateMachine {
    /// Current state.
    fn state(&self) -> ServiceResult<SystemState>;

    /// Applies one transition.
    fn transition(&self, transition: Transition) -> ServiceResult<()>;
}

/// RPC introspection of a participant.
pub trait ParticipantInfo {
    /// Names of the RPC objects the participant serves.
    fn rpc_objects(&self) -> ServiceResult<Vec<String>>;

    /// Interface ids implemented by one RPC object.
    fn rpc_object_iids(&self, object: &str) -> ServiceResult<Vec<String>>;

    /// Interface definition text of one interface id.
    fn rpc_interface_definition(&self, object: &str, iid: &str) -> ServiceResult<String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op control service for hosts without a control network.
pub struct NoopControlService;

impl ControlService for NoopControlService {
    fn discover_all_systems(&self) -> ServiceResult<Vec<SystemHandle>> {
        Ok(Vec::new())
    }

    fn discover_system(&self, _name: &str) -> ServiceResult<SystemHandle> {
        Err(ServiceError::Unavailable)
    }

    fn connect_system(&self, _descriptor: &Path) -> ServiceResult<SystemHandle> {
        Err(ServiceError::Unavailable)
    }
}
