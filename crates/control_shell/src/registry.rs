//! Command registry and the execution context handed to command actions.

use std::{collections::BTreeMap, rc::Rc};

use control_host::{ControlService, MonitorSink};
use control_shell_contract::{CommandDescriptor, ShellExit};

use crate::{console::Console, session::SessionState};

/// Result of one command action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action succeeded.
    Success,
    /// The action failed and has already reported why.
    Failure,
    /// The action asked the interpreter to stop.
    Exit,
}

impl ActionOutcome {
    /// Dispatcher status for this outcome.
    pub fn exit(self) -> ShellExit {
        ShellExit::from_action(self != ActionOutcome::Failure)
    }
}

impl From<bool> for ActionOutcome {
    fn from(succeeded: bool) -> Self {
        if succeeded {
            ActionOutcome::Success
        } else {
            ActionOutcome::Failure
        }
    }
}

/// Everything an action may touch while it runs.
pub struct ActionContext<'a> {
    /// Mutable session state.
    pub session: &'a mut SessionState,
    /// Remote control service.
    pub service: &'a dyn ControlService,
    /// Registry the action was dispatched from.
    pub registry: &'a CommandRegistry,
    /// Sink handed to systems when monitoring starts.
    pub monitor: &'a MonitorSink,
    /// User-facing output.
    pub console: &'a mut Console,
}

impl ActionContext<'_> {
    /// Writes one line of user-facing output.
    pub fn say(&mut self, text: impl AsRef<str>) {
        self.console.line(text);
    }
}

/// Command action; receives the argument slice without the command name.
pub type CommandAction = Rc<dyn Fn(&mut ActionContext<'_>, &[String]) -> ActionOutcome>;

/// One registry entry.
#[derive(Clone)]
pub struct RegisteredCommand {
    /// Command metadata.
    pub descriptor: CommandDescriptor,
    /// Command behavior.
    pub action: CommandAction,
}

/// Ordered, lookup-by-name command table.
///
/// Registration happens once at startup; entries keep their registration order.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
    by_name: BTreeMap<String, usize>,
}

impl CommandRegistry {
    /// Registry holding the built-in control commands.
    pub fn builtin() -> Self {
        crate::commands::builtin_registry()
    }

    /// Registers one command.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name or when more arguments are optional than declared.
    pub fn register(&mut self, descriptor: CommandDescriptor, action: CommandAction) {
        assert!(
            !self.by_name.contains_key(&descriptor.name),
            "command {:?} registered twice",
            descriptor.name
        );
        assert!(
            descriptor.optional_args <= descriptor.args.len(),
            "command {:?} declares {} optional arguments but only {} arguments",
            descriptor.name,
            descriptor.optional_args,
            descriptor.args.len()
        );
        self.by_name
            .insert(descriptor.name.clone(), self.commands.len());
        self.commands.push(RegisteredCommand { descriptor, action });
    }

    /// Looks up a command by exact name.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredCommand> {
        self.by_name.get(name).map(|index| &self.commands[*index])
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter().map(|command| &command.descriptor)
    }

    /// Command names starting with `prefix`, in registration order.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.descriptors()
            .filter(|descriptor| descriptor.name.starts_with(prefix))
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
