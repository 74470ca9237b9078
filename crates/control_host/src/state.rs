//! Lifecycle states and transitions shared by systems and participants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a participant, or the aggregated state of a system.
///
/// The numeric codes are part of the shell's output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemState {
    /// No meaningful state (also the result of an unrecognized state name).
    Undefined,
    /// The participant does not answer or has been shut down.
    Unreachable,
    /// Running process, nothing loaded.
    Unloaded,
    /// Loaded, not yet initialized.
    Loaded,
    /// Initialized and ready to start.
    Initialized,
    /// Started and then paused.
    Paused,
    /// Running.
    Running,
}

/// State names an operator may request, in completion order.
///
/// `shutdowned` is not a remote state; requesting it means "unload, then shut down".
pub const REQUESTABLE_STATE_NAMES: [&str; 6] = [
    "shutdowned",
    "unloaded",
    "loaded",
    "initialized",
    "paused",
    "running",
];

impl SystemState {
    /// All states in code order.
    pub const ALL: [SystemState; 7] = [
        SystemState::Undefined,
        SystemState::Unreachable,
        SystemState::Unloaded,
        SystemState::Loaded,
        SystemState::Initialized,
        SystemState::Paused,
        SystemState::Running,
    ];

    /// Stable numeric code (0 to 6).
    pub fn code(self) -> i32 {
        match self {
            SystemState::Undefined => 0,
            SystemState::Unreachable => 1,
            SystemState::Unloaded => 2,
            SystemState::Loaded => 3,
            SystemState::Initialized => 4,
            SystemState::Paused => 5,
            SystemState::Running => 6,
        }
    }

    /// Looks up a state by numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    /// Lowercase state name.
    pub fn name(self) -> &'static str {
        match self {
            SystemState::Undefined => "undefined",
            SystemState::Unreachable => "unreachable",
            SystemState::Unloaded => "unloaded",
            SystemState::Loaded => "loaded",
            SystemState::Initialized => "initialized",
            SystemState::Paused => "paused",
            SystemState::Running => "running",
        }
    }

    /// Parses an operator-requested state name.
    ///
    /// `shutdowned` maps to [`SystemState::Unreachable`]; anything unrecognized maps to
    /// [`SystemState::Undefined`], which services reject as a target.
    pub fn from_requested(name: &str) -> Self {
        match name {
            "shutdowned" => SystemState::Unreachable,
            "unloaded" => SystemState::Unloaded,
            "loaded" => SystemState::Loaded,
            "initialized" => SystemState::Initialized,
            "paused" => SystemState::Paused,
            "running" => SystemState::Running,
            _ => SystemState::Undefined,
        }
    }

    /// Whether the state sits on the load/initialize/run ladder.
    pub fn is_lifecycle(self) -> bool {
        !matches!(self, SystemState::Undefined | SystemState::Unreachable)
    }

    /// Transition sequence leading from `self` to `target`.
    ///
    /// Returns `None` when either end is not a lifecycle state.
    pub fn path_to(self, target: SystemState) -> Option<Vec<Transition>> {
        if !self.is_lifecycle() || !target.is_lifecycle() {
            return None;
        }
        let mut current = self;
        let mut steps = Vec::new();
        while current != target {
            let step = match (current, target) {
                (SystemState::Running, SystemState::Paused) => Transition::Pause,
                (SystemState::Paused, SystemState::Running) => Transition::Start,
                (SystemState::Running | SystemState::Paused, _) => Transition::Stop,
                (SystemState::Initialized, SystemState::Running) => Transition::Start,
                (SystemState::Initialized, SystemState::Paused) => Transition::Pause,
                (SystemState::Initialized, _) => Transition::Deinitialize,
                (SystemState::Loaded, SystemState::Unloaded) => Transition::Unload,
                (SystemState::Loaded, _) => Transition::Initialize,
                (SystemState::Unloaded, _) => Transition::Load,
                _ => return None,
            };
            current = step.target();
            steps.push(step);
        }
        Some(steps)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// System-wide state derived from the participants' states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedState {
    /// Lowest participant state.
    pub state: SystemState,
    /// Whether every participant reports the same state.
    pub homogeneous: bool,
}

impl AggregatedState {
    /// Aggregates individual participant states. An empty set is `undefined` and homogeneous.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = SystemState>,
    {
        let mut lowest = None::<SystemState>;
        let mut homogeneous = true;
        for state in states {
            match lowest {
                None => lowest = Some(state),
                Some(current) => {
                    if current != state {
                        homogeneous = false;
                    }
                    lowest = Some(current.min(state));
                }
            }
        }
        Self {
            state: lowest.unwrap_or(SystemState::Undefined),
            homogeneous,
        }
    }
}

/// Lifecycle transition requested on a participant or a whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// unloaded -> loaded
    Load,
    /// loaded -> unloaded
    Unload,
    /// loaded -> initialized
    Initialize,
    /// initialized -> loaded
    Deinitialize,
    /// initialized or paused -> running
    Start,
    /// running or paused -> initialized
    Stop,
    /// initialized or running -> paused
    Pause,
    /// unloaded -> gone
    Shutdown,
}

impl Transition {
    /// Every transition, in command-table order.
    pub const ALL: [Transition; 8] = [
        Transition::Load,
        Transition::Unload,
        Transition::Initialize,
        Transition::Deinitialize,
        Transition::Start,
        Transition::Stop,
        Transition::Pause,
        Transition::Shutdown,
    ];

    /// Imperative verb, as in `cannot load system`.
    pub fn verb(self) -> &'static str {
        match self {
            Transition::Load => "load",
            Transition::Unload => "unload",
            Transition::Initialize => "initialize",
            Transition::Deinitialize => "deinitialize",
            Transition::Start => "start",
            Transition::Stop => "stop",
            Transition::Pause => "pause",
            Transition::Shutdown => "shutdown",
        }
    }

    /// Past tense used in success messages.
    pub fn past_tense(self) -> &'static str {
        match self {
            Transition::Load => "loaded",
            Transition::Unload => "unloaded",
            Transition::Initialize => "initialized",
            Transition::Deinitialize => "deinitialized",
            Transition::Start => "started",
            Transition::Stop => "stopped",
            Transition::Pause => "paused",
            Transition::Shutdown => "shutdowned",
        }
    }

    /// State reached after the transition.
    pub fn target(self) -> SystemState {
        match self {
            Transition::Load | Transition::Deinitialize => SystemState::Loaded,
            Transition::Unload => SystemState::Unloaded,
            Transition::Initialize | Transition::Stop => SystemState::Initialized,
            Transition::Start => SystemState::Running,
            Transition::Pause => SystemState::Paused,
            Transition::Shutdown => SystemState::Unreachable,
        }
    }

    /// Whether the transition may start from `state`.
    pub fn allowed_from(self, state: SystemState) -> bool {
        use SystemState::*;
        match self {
            Transition::Load => state == Unloaded,
            Transition::Unload => state == Loaded,
            Transition::Initialize => state == Loaded,
            Transition::Deinitialize => state == Initialized,
            Transition::Start => matches!(state, Initialized | Paused),
            Transition::Stop => matches!(state, Running | Paused),
            Transition::Pause => matches!(state, Initialized | Running),
            Transition::Shutdown => state == Unloaded,
        }
    }
}
