//! Terminal line editor backed by `rustyline`, completing through the shell.

use std::io;
use std::path::PathBuf;

use control_shell::{LineSource, ShellCompleter};
use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};

use crate::runtime::config::ToolConfig;
use crate::runtime::error::{ToolError, ToolResult};

/// `rustyline` helper delegating completion to the shell.
pub struct CompletionHelper {
    completer: ShellCompleter,
}

impl CompletionHelper {
    /// Helper completing through `completer`.
    pub fn new(completer: ShellCompleter) -> Self {
        Self { completer }
    }

    /// Whole-line replacements for the text left of the cursor.
    pub fn candidates(&self, line: &str, pos: usize) -> Vec<Pair> {
        let head = line.get(..pos).unwrap_or(line);
        self.completer
            .complete(head)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect()
    }
}

impl Completer for CompletionHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok((0, self.candidates(line, pos)))
    }
}

impl Hinter for CompletionHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CompletionHelper {}

impl Validator for CompletionHelper {}

impl Helper for CompletionHelper {}

/// Interactive line source with persistent history.
pub struct LineEditor {
    editor: Editor<CompletionHelper, DefaultHistory>,
    history_file: Option<PathBuf>,
}

impl LineEditor {
    /// Editor completing through `completer`, with history loaded from the configured file.
    pub fn new(config: &ToolConfig, completer: ShellCompleter) -> ToolResult<Self> {
        let editor_config = Config::builder()
            .max_history_size(config.history_size)
            .map_err(|err| ToolError::line_editor(format!("invalid history size: {err}")))?
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(editor_config).map_err(|err| {
            ToolError::line_editor(format!("failed to initialize line editor: {err}"))
        })?;
        editor.set_helper(Some(CompletionHelper::new(completer)));

        let history_file = config.history_path();
        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(err) = editor.load_history(path) {
                    warn!("cannot load history from {}: {err}", path.display());
                }
            }
        }
        Ok(Self {
            editor,
            history_file,
        })
    }

    /// Writes the history file, if one is configured. Failures are logged.
    pub fn save_history(&mut self) {
        let Some(path) = &self.history_file else {
            return;
        };
        match self.editor.save_history(path) {
            Ok(()) => debug!("history saved to {}", path.display()),
            Err(err) => warn!("cannot save history to {}: {err}", path.display()),
        }
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(err) = self.editor.add_history_entry(line) {
            warn!("cannot record history entry: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_host::NoopControlService;
    use control_shell::{ControlShell, MemoryOutput};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn helper() -> CompletionHelper {
        let shell = ControlShell::new(Rc::new(NoopControlService), MemoryOutput::new().console());
        CompletionHelper::new(shell.completer())
    }

    #[test]
    fn candidates_replace_the_whole_line() {
        let replacements: Vec<String> = helper()
            .candidates("getParticipantRPCObjectIID", 26)
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(
            replacements,
            vec![
                "getParticipantRPCObjectIIDs".to_string(),
                "getParticipantRPCObjectIIDDefinition".to_string(),
            ]
        );
    }

    #[test]
    fn text_right_of_the_cursor_is_ignored() {
        let pairs = helper().candidates("exitXYZ", 3);
        let displays: Vec<&str> = pairs.iter().map(|pair| pair.display.as_str()).collect();
        assert_eq!(displays, vec!["exit"]);
    }
}
