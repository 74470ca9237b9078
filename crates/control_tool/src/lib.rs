//! `system_control`: command-line host for the control shell.
//!
//! With no arguments the tool runs an interactive prompt with line editing, completion and
//! persistent history. With `-e/--execute` it runs one command and exits with its code.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cli;
pub mod line_editor;
pub mod runtime;

use std::rc::Rc;

use control_shell::{run_interactive, Console, ControlShell, LoopExit};
use control_shell_contract::ShellExit;
use log::{debug, info};

use crate::cli::Invocation;
use crate::line_editor::LineEditor;
use crate::runtime::config::{self, ToolConfig};
use crate::runtime::error::ToolResult;

/// Name used in usage text and the history file.
pub const PROGRAM_NAME: &str = "system_control";
/// Interactive prompt.
pub const PROMPT: &str = "ctl> ";

const BANNER_WIDTH: usize = 66;

/// Greeting printed when the interactive prompt starts.
pub fn banner() -> String {
    let border = "*".repeat(BANNER_WIDTH);
    let inner = BANNER_WIDTH - 2;
    format!(
        "{border}\n*{:<inner$}*\n*{:<inner$}*\n{border}",
        " Welcome to System Control", "  use help to print help"
    )
}

/// Runs with the process arguments and returns the exit code.
pub fn run_from_env() -> i32 {
    match run(std::env::args().skip(1).collect()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// Runs with `args` (program name excluded) and returns the exit code.
pub fn run(args: Vec<String>) -> ToolResult<i32> {
    let invocation = match cli::parse(args) {
        Ok(invocation) => invocation,
        Err(err) => {
            debug!("usage error: {err}");
            cli::print_usage();
            return Ok(ShellExit::INVALID_INVOCATION);
        }
    };

    let config = config::discover()?;
    runtime::init_logging(config.log_filter.as_deref());
    let service = runtime::memory_service(&config)?;
    let mut shell = ControlShell::new(Rc::new(service), Console::stdout());

    match invocation {
        Invocation::Execute {
            auto_discovery,
            command,
        } => {
            shell.set_auto_discovery(auto_discovery || config.auto_discovery);
            let exit = shell.execute(&command);
            shell.drain_notifications();
            info!("{} finished with code {}", command[0], exit.code);
            Ok(exit.code)
        }
        Invocation::Interactive => run_prompt(&mut shell, &config),
    }
}

fn run_prompt(shell: &mut ControlShell, config: &ToolConfig) -> ToolResult<i32> {
    shell.set_auto_discovery(config.auto_discovery);
    println!("{}", banner());
    let mut editor = LineEditor::new(config, shell.completer())?;
    let outcome = run_interactive(shell, &mut editor, PROMPT);
    editor.save_history();
    match outcome? {
        LoopExit::Quit => info!("quit requested"),
        LoopExit::EndOfInput => shell.shutdown(),
    }
    Ok(ShellExit::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn banner_is_a_closed_box() {
        let banner = banner();
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.len() == 66));
        assert!(lines[1].starts_with("* Welcome to System Control "));
        assert!(lines[2].starts_with("*  use help to print help "));
        assert!(lines[1].ends_with('*'));
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn malformed_arguments_return_invalid_invocation() {
        assert_eq!(run(args(&["bogus"])), Ok(-1));
    }

    #[test]
    fn batch_mode_exits_with_the_dispatcher_status() {
        assert_eq!(run(args(&["-e", "bogus"])), Ok(ShellExit::UNKNOWN_COMMAND));
        assert_eq!(
            run(args(&["-e", "startSystem"])),
            Ok(ShellExit::INVALID_ARGUMENT_COUNT)
        );
        assert_eq!(run(args(&["-e", "getSystemState", "x"])), Ok(ShellExit::FAILURE));
        assert_eq!(run(args(&["-e", "help"])), Ok(ShellExit::SUCCESS));
    }

    #[test]
    fn auto_discovery_flag_applies_before_the_command_runs() {
        assert_eq!(
            run(args(&["-ad", "-e", "getSystemState", "x"])),
            Ok(ShellExit::SUCCESS)
        );
        assert_eq!(
            run(args(&["--auto_discovery", "--execute", "getParticipants", "x"])),
            Ok(ShellExit::SUCCESS)
        );
    }
}
