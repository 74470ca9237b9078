//! Command interpreter for driving remote systems and their participants.
//!
//! [`ControlShell`] ties together the pieces an operator interacts with:
//!
//! - a [`CommandRegistry`] holding the built-in command table
//! - the [`SessionState`] of known systems and the completion context
//! - the dispatcher that validates arity and runs actions
//! - the completion engine used by interactive line editors
//! - the monitoring channel that collects remote notifications between prompts
//!
//! The shell is synchronous and single-threaded. Remote work goes through the
//! [`control_host::ControlService`] trait, so hosts choose the adapter.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod commands;
pub mod completion;
pub mod console;
pub mod dispatch;
pub mod interactive;
pub mod monitor;
pub mod registry;
pub mod session;

use std::{cell::RefCell, rc::Rc};

use control_host::ControlService;
use control_shell_contract::ShellExit;
use control_shell_headless::Tokenizer;

pub use completion::{local_file_candidates, CompletionEngine, ShellCompleter};
pub use console::{Console, MemoryOutput};
pub use dispatch::{dispatch, validate, Dispatched};
pub use interactive::{run_interactive, LineSource, LoopExit, ScriptedLines};
pub use monitor::{render_event, MonitorChannel};
pub use registry::{ActionContext, ActionOutcome, CommandAction, CommandRegistry, RegisteredCommand};
pub use session::{service_system_name, system_key, SessionState, EMPTY_SYSTEM_TOKEN};

/// Interpreter instance owning the session for one process.
pub struct ControlShell {
    registry: Rc<CommandRegistry>,
    session: Rc<RefCell<SessionState>>,
    service: Rc<dyn ControlService>,
    monitor: MonitorChannel,
    console: Console,
    tokenizer: Tokenizer,
    quit_requested: bool,
}

impl ControlShell {
    /// Shell with the built-in command table.
    pub fn new(service: Rc<dyn ControlService>, console: Console) -> Self {
        Self::with_registry(CommandRegistry::builtin(), service, console)
    }

    /// Shell with a caller-supplied command table.
    pub fn with_registry(
        registry: CommandRegistry,
        service: Rc<dyn ControlService>,
        console: Console,
    ) -> Self {
        Self {
            registry: Rc::new(registry),
            session: Rc::new(RefCell::new(SessionState::new())),
            service,
            monitor: MonitorChannel::new(),
            console,
            tokenizer: Tokenizer::default(),
            quit_requested: false,
        }
    }

    /// Dispatches one tokenized command line. An empty line is a no-op success.
    pub fn execute(&mut self, tokens: &[String]) -> ShellExit {
        if tokens.is_empty() {
            return ShellExit::success();
        }
        let dispatched = {
            let mut session = self.session.borrow_mut();
            let mut ctx = ActionContext {
                session: &mut session,
                service: self.service.as_ref(),
                registry: &self.registry,
                monitor: self.monitor.sink(),
                console: &mut self.console,
            };
            dispatch(&mut ctx, tokens)
        };
        if dispatched.quit_requested {
            self.quit_requested = true;
        }
        dispatched.exit
    }

    /// Tokenizes and dispatches one raw input line.
    pub fn execute_line(&mut self, line: &str) -> ShellExit {
        let tokens = self.tokenizer.tokenize(line);
        self.execute(&tokens)
    }

    /// Full-line completion candidates for `partial`.
    pub fn complete(&self, partial: &str) -> Vec<String> {
        self.completer().complete(partial)
    }

    /// Completion callback sharing this shell's registry and session.
    pub fn completer(&self) -> ShellCompleter {
        ShellCompleter::new(self.registry.clone(), self.session.clone(), self.tokenizer)
    }

    /// Prints every pending monitoring notification. Returns how many were printed.
    pub fn drain_notifications(&mut self) -> usize {
        let events = self.monitor.drain();
        for event in &events {
            for line in render_event(event) {
                self.console.line(line);
            }
        }
        events.len()
    }

    /// Sets the auto-discovery toggle without printing anything.
    pub fn set_auto_discovery(&mut self, enabled: bool) {
        self.session.borrow_mut().set_auto_discovery(enabled);
    }

    /// Read access to the session state.
    pub fn session(&self) -> std::cell::Ref<'_, SessionState> {
        self.session.borrow()
    }

    /// Registered commands.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Tokenizer used for raw input lines.
    pub fn tokenizer(&self) -> Tokenizer {
        self.tokenizer
    }

    /// Whether a command asked the interpreter to stop.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Clean teardown: flushes notifications and forgets every known system.
    pub fn shutdown(&mut self) {
        self.drain_notifications();
        self.session.borrow_mut().clear();
    }
}
