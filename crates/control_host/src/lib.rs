//! Typed boundary to the remote system control service.
//!
//! The shell never talks to the control network directly. It goes through the
//! [`ControlService`] trait and the handle traits defined here, which keeps discovery, lifecycle
//! transitions, timing, property configuration, and monitoring behind one API. Concrete adapters
//! live next to the contracts:
//!
//! - [`NoopControlService`] for hosts without a control network
//! - [`MemoryControlService`] for an in-process simulated network
//!
//! Optional participant capabilities are modeled as `Option` returning lookups so callers branch
//! on absence explicitly.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod memory;
pub mod monitor;
pub mod service;
pub mod state;

pub use error::{ServiceError, ServiceResult};
pub use memory::{
    standard_rpc_objects, MemoryControlService, ParticipantDescriptor, RpcObjectTable,
    SystemDescriptor, TimingConfig,
};
pub use monitor::{LogSeverity, MonitorEvent, MonitorSink};
pub use service::{
    ControlService, NoopControlService, ParticipantInfo, ParticipantStateMachine,
    RemoteParticipant, RemoteSystem, SystemHandle,
};
pub use state::{AggregatedState, SystemState, Transition, REQUESTABLE_STATE_NAMES};
