//! Command-line parsing for `system_control`.

use crate::runtime::error::{ToolError, ToolResult};
use crate::PROGRAM_NAME;

const EXECUTE_FLAGS: [&str; 2] = ["-e", "--execute"];
const AUTO_DISCOVERY_FLAGS: [&str; 2] = ["-ad", "--auto_discovery"];

/// How the process should run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
    /// No arguments: interactive prompt.
    Interactive,
    /// Run one command and exit with its code.
    Execute {
        /// Enable auto-discovery before dispatching.
        auto_discovery: bool,
        /// Command name followed by its arguments, taken verbatim.
        command: Vec<String>,
    },
}

/// Parse process arguments (without the program name).
pub fn parse(args: Vec<String>) -> ToolResult<Invocation> {
    let Some(first) = args.first() else {
        return Ok(Invocation::Interactive);
    };

    let (auto_discovery, command_start) = if AUTO_DISCOVERY_FLAGS.contains(&first.as_str()) {
        match args.get(1) {
            Some(flag) if EXECUTE_FLAGS.contains(&flag.as_str()) => (true, 2),
            _ => {
                return Err(ToolError::usage(format!(
                    "{first} must be followed by -e/--execute"
                )))
            }
        }
    } else if EXECUTE_FLAGS.contains(&first.as_str()) {
        (false, 1)
    } else {
        return Err(ToolError::usage(format!("unknown argument: {first}")));
    };

    let command = args[command_start..].to_vec();
    if command.is_empty() {
        return Err(ToolError::usage("-e/--execute requires a command"));
    }
    Ok(Invocation::Execute {
        auto_discovery,
        command,
    })
}

/// Usage text, one entry per line.
pub fn usage_lines() -> [String; 3] {
    [
        format!(
            "invalid commandline, use: {PROGRAM_NAME} --auto_discovery --execute <execute_command>"
        ),
        format!("                     or:  {PROGRAM_NAME} --execute <execute_command>"),
        format!("                     or:  {PROGRAM_NAME} -ad -e <execute_command>"),
    ]
}

/// Print usage to stderr.
pub fn print_usage() {
    for line in usage_lines() {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::ToolErrorCategory;
    use pretty_assertions::assert_eq;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_means_interactive() {
        assert_eq!(parse(Vec::new()).expect("parse"), Invocation::Interactive);
    }

    #[test]
    fn execute_takes_the_remaining_arguments_verbatim() {
        assert_eq!(
            parse(args(&["--execute", "getSystemState", "my system"])).expect("parse"),
            Invocation::Execute {
                auto_discovery: false,
                command: args(&["getSystemState", "my system"]),
            }
        );
    }

    #[test]
    fn auto_discovery_must_precede_execute() {
        assert_eq!(
            parse(args(&["-ad", "-e", "startSystem", "-"])).expect("parse"),
            Invocation::Execute {
                auto_discovery: true,
                command: args(&["startSystem", "-"]),
            }
        );

        let parsed = parse(args(&["-e", "-ad", "startSystem"])).expect("flag is a command name");
        assert_eq!(
            parsed,
            Invocation::Execute {
                auto_discovery: false,
                command: args(&["-ad", "startSystem"]),
            }
        );

        let err = parse(args(&["--auto_discovery", "help"])).expect_err("missing -e");
        assert_eq!(err.category, ToolErrorCategory::Usage);
    }

    #[test]
    fn execute_without_command_is_rejected() {
        assert!(parse(args(&["-e"])).is_err());
        assert!(parse(args(&["-ad", "--execute"])).is_err());
    }

    #[test]
    fn stray_arguments_are_rejected() {
        let err = parse(args(&["help"])).expect_err("no flag");
        assert_eq!(err.to_string(), "unknown argument: help");
    }

    #[test]
    fn usage_names_the_program() {
        let lines = usage_lines();
        assert!(lines[0].starts_with("invalid commandline, use: system_control "));
        assert!(lines[1..]
            .iter()
            .all(|line| line.trim_start().starts_with("or:  system_control ")));
    }
}
