//! Shared command contracts used by the control shell engine and the `system_control` binary.
//!
//! This crate is runtime-agnostic. It defines serializable command metadata, the stable process
//! status codes reported by the dispatcher, and the shell error classification, without depending
//! on the control service or on any terminal library.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Candidate provider selected for one positional argument.
///
/// Providers are declarative here; the shell engine evaluates them against its session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgCompletion {
    /// No candidates.
    None,
    /// Files in the current working directory, quoted when they contain whitespace.
    LocalFiles,
    /// Names of the systems currently known to the session.
    KnownSystems,
    /// Participants of the most recently referenced system.
    LastSystemParticipants,
    /// The lifecycle state names accepted by state-setting commands.
    StateNames,
    /// Registered command names.
    CommandNames,
}

/// Positional argument specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgSpec {
    /// Short description shown in help output.
    pub summary: String,
    /// Completion provider for this position.
    pub completion: ArgCompletion,
}

impl CommandArgSpec {
    /// Creates an argument specification.
    pub fn new(summary: impl Into<String>, completion: ArgCompletion) -> Self {
        Self {
            summary: summary.into(),
            completion,
        }
    }
}

/// Full command registration metadata.
///
/// A command with `N` arguments of which the last `K` are optional accepts between `N - K` and
/// `N` supplied arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Case-sensitive command name used for lookup.
    pub name: String,
    /// One-line description.
    pub summary: String,
    /// Positional arguments in order.
    pub args: Vec<CommandArgSpec>,
    /// Number of trailing optional arguments.
    pub optional_args: usize,
}

impl CommandDescriptor {
    /// Creates a descriptor without arguments.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            args: Vec::new(),
            optional_args: 0,
        }
    }

    /// Appends one positional argument.
    pub fn arg(mut self, summary: impl Into<String>, completion: ArgCompletion) -> Self {
        self.args.push(CommandArgSpec::new(summary, completion));
        self
    }

    /// Marks the last `count` arguments as optional.
    pub fn optional_trailing(mut self, count: usize) -> Self {
        self.optional_args = count;
        self
    }

    /// Smallest accepted argument count.
    pub fn min_args(&self) -> usize {
        self.args.len().saturating_sub(self.optional_args)
    }

    /// Largest accepted argument count.
    pub fn max_args(&self) -> usize {
        self.args.len()
    }

    /// Returns whether `supplied` arguments satisfy the arity bounds.
    pub fn accepts(&self, supplied: usize) -> bool {
        (self.min_args()..=self.max_args()).contains(&supplied)
    }

    /// Renders the expected argument count as `N` or `N-K..N`.
    pub fn arity_label(&self) -> String {
        if self.optional_args == 0 {
            self.max_args().to_string()
        } else {
            format!("{}..{}", self.min_args(), self.max_args())
        }
    }

    /// Renders `name <arg> <arg> : summary` for per-command help.
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for arg in &self.args {
            usage.push_str(" <");
            usage.push_str(&arg.summary);
            usage.push('>');
        }
        usage.push_str(" : ");
        usage.push_str(&self.summary);
        usage
    }
}

/// Shell exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellExit {
    /// Numeric exit code.
    pub code: i32,
    /// Optional explanatory message.
    pub message: Option<String>,
}

impl ShellExit {
    /// Status of an action that completed successfully.
    pub const SUCCESS: i32 = 0;
    /// Status of an action that reported a failure.
    pub const FAILURE: i32 = 1;
    /// Status of a batch invocation whose argument shape was invalid.
    pub const INVALID_INVOCATION: i32 = -1;
    /// Status of an unknown command name.
    pub const UNKNOWN_COMMAND: i32 = -2;
    /// Status of a call with an out-of-range argument count.
    pub const INVALID_ARGUMENT_COUNT: i32 = -3;

    /// Successful command completion.
    pub fn success() -> Self {
        Self {
            code: Self::SUCCESS,
            message: None,
        }
    }

    /// Action-level failure; the action has already reported why.
    pub fn failure() -> Self {
        Self {
            code: Self::FAILURE,
            message: None,
        }
    }

    /// Maps an action's boolean result onto a status.
    pub fn from_action(succeeded: bool) -> Self {
        if succeeded {
            Self::success()
        } else {
            Self::failure()
        }
    }

    /// Returns whether this status reports success.
    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}

/// Structured shell error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShellErrorCode {
    /// User input violated command usage.
    Usage,
    /// The command was not found.
    NotFound,
}

/// Error emitted by command lookup or validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellError {
    /// Error category.
    pub code: ShellErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ShellError {
    /// Creates a new shell error.
    pub fn new(code: ShellErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unknown command name.
    pub fn unknown_command(name: &str) -> Self {
        Self::new(
            ShellErrorCode::NotFound,
            format!("Invalid command \"{name}\", use \"help\" for valid commands"),
        )
    }

    /// Argument count outside the descriptor's bounds.
    pub fn invalid_argument_count(descriptor: &CommandDescriptor, supplied: usize) -> Self {
        Self::new(
            ShellErrorCode::Usage,
            format!(
                "Invalid number of arguments for \"{}\" ({supplied} instead of {}), use \"help\" for more information",
                descriptor.name,
                descriptor.arity_label()
            ),
        )
    }

    /// Converts the error into its stable dispatcher status code.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ShellErrorCode::NotFound => ShellExit::UNKNOWN_COMMAND,
            ShellErrorCode::Usage => ShellExit::INVALID_ARGUMENT_COUNT,
        }
    }

    /// Converts the error into a shell exit carrying the message.
    pub fn to_exit(&self) -> ShellExit {
        ShellExit {
            code: self.exit_code(),
            message: Some(self.message.clone()),
        }
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ShellError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_args_one_optional() -> CommandDescriptor {
        CommandDescriptor::new("probe", "probes things")
            .arg("system name", ArgCompletion::KnownSystems)
            .arg("participant name", ArgCompletion::LastSystemParticipants)
            .optional_trailing(1)
    }

    #[test]
    fn arity_bounds_include_optional_tail() {
        let descriptor = two_args_one_optional();
        assert!(!descriptor.accepts(0));
        assert!(descriptor.accepts(1));
        assert!(descriptor.accepts(2));
        assert!(!descriptor.accepts(3));
        assert_eq!(descriptor.arity_label(), "1..2");
    }

    #[test]
    fn exact_arity_label_is_plain_count() {
        let descriptor = CommandDescriptor::new("getSystemState", "state")
            .arg("system name", ArgCompletion::KnownSystems);
        assert_eq!(descriptor.arity_label(), "1");
        assert!(descriptor.accepts(1));
        assert!(!descriptor.accepts(0));
    }

    #[test]
    fn usage_wraps_arguments_in_angle_brackets() {
        assert_eq!(
            two_args_one_optional().usage(),
            "probe <system name> <participant name> : probes things"
        );
        assert_eq!(
            CommandDescriptor::new("quit", "quits").usage(),
            "quit : quits"
        );
    }

    #[test]
    fn errors_map_to_stable_status_codes() {
        let unknown = ShellError::unknown_command("bogus");
        assert_eq!(unknown.exit_code(), -2);
        assert_eq!(
            unknown.message,
            "Invalid command \"bogus\", use \"help\" for valid commands"
        );

        let arity = ShellError::invalid_argument_count(&two_args_one_optional(), 3);
        assert_eq!(arity.to_exit().code, -3);
        assert_eq!(
            arity.message,
            "Invalid number of arguments for \"probe\" (3 instead of 1..2), use \"help\" for more information"
        );
    }

    #[test]
    fn action_results_map_to_zero_and_one() {
        assert_eq!(ShellExit::from_action(true).code, 0);
        assert_eq!(ShellExit::from_action(false).code, 1);
        assert!(ShellExit::success().is_success());
    }

    #[test]
    fn completion_provider_serializes_kebab_case() {
        let json = serde_json::to_value(CommandArgSpec::new(
            "system name",
            ArgCompletion::LastSystemParticipants,
        ))
        .expect("serialize");
        assert_eq!(json["completion"], "last-system-participants");
    }
}
