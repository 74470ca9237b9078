//! Read-dispatch loop over an abstract line source.

use std::io;

use log::debug;

use crate::ControlShell;

/// Source of interactive input lines.
pub trait LineSource {
    /// Reads one line after showing `prompt`. `Ok(None)` signals end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Records a non-blank line in the history.
    fn add_history(&mut self, line: &str);
}

/// Why the interactive loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A command asked the shell to stop.
    Quit,
    /// The line source ran out of input.
    EndOfInput,
}

/// Reads, records, and executes lines until a quit command or end of input.
///
/// Monitoring notifications are flushed before each prompt. Read errors end the loop.
pub fn run_interactive(
    shell: &mut ControlShell,
    source: &mut dyn LineSource,
    prompt: &str,
) -> io::Result<LoopExit> {
    loop {
        shell.drain_notifications();
        let Some(line) = source.read_line(prompt)? else {
            debug!("line source exhausted");
            return Ok(LoopExit::EndOfInput);
        };
        let tokens = shell.tokenizer().tokenize(&line);
        if tokens.is_empty() {
            continue;
        }
        source.add_history(&line);
        shell.execute(&tokens);
        if shell.quit_requested() {
            shell.drain_notifications();
            return Ok(LoopExit::Quit);
        }
    }
}

/// Line source replaying a fixed script; used by tests and non-terminal hosts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: std::collections::VecDeque<String>,
    history: Vec<String>,
}

impl ScriptedLines {
    /// Source yielding `lines` in order, then end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            history: Vec::new(),
        }
    }

    /// Lines recorded through [`LineSource::add_history`].
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryOutput;
    use control_host::NoopControlService;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn shell() -> (ControlShell, MemoryOutput) {
        let output = MemoryOutput::new();
        let shell = ControlShell::new(Rc::new(NoopControlService), output.console());
        (shell, output)
    }

    #[test]
    fn blank_lines_are_skipped_and_not_recorded() {
        let (mut shell, output) = shell();
        let mut source = ScriptedLines::new(["", "   ", "getCurrentWorkingDirectory"]);
        let exit = run_interactive(&mut shell, &mut source, "ctl> ").expect("loop");
        assert_eq!(exit, LoopExit::EndOfInput);
        assert_eq!(source.history(), ["getCurrentWorkingDirectory".to_string()]);
        assert!(output.contents().starts_with("working directory : "));
    }

    #[test]
    fn quit_stops_before_remaining_lines() {
        let (mut shell, output) = shell();
        let mut source = ScriptedLines::new(["quit", "help"]);
        let exit = run_interactive(&mut shell, &mut source, "ctl> ").expect("loop");
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(output.contents(), "bye bye\n");
    }

    #[test]
    fn failing_commands_keep_the_loop_alive() {
        let (mut shell, output) = shell();
        let mut source = ScriptedLines::new(["bogus", "getSystemState", "exit"]);
        let exit = run_interactive(&mut shell, &mut source, "ctl> ").expect("loop");
        assert_eq!(exit, LoopExit::Quit);
        let lines: Vec<String> = output.contents().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Invalid command \"bogus\""));
        assert!(lines[1].starts_with("Invalid number of arguments for \"getSystemState\""));
        assert_eq!(lines[2], "bye bye");
    }
}
