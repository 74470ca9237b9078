//! Argument-position-aware completion over the command registry.
//!
//! Every candidate is a full replacement line: the words already typed, rejoined with single
//! spaces, followed by one completed word.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use control_host::REQUESTABLE_STATE_NAMES;
use control_shell_contract::ArgCompletion;
use control_shell_headless::{quote_filename_if_necessary, Tokenizer};
use log::debug;

use crate::{registry::CommandRegistry, session::SessionState};

/// Completion engine borrowing the registry and the current session state.
pub struct CompletionEngine<'a> {
    registry: &'a CommandRegistry,
    session: &'a SessionState,
    tokenizer: Tokenizer,
    files_root: PathBuf,
}

impl<'a> CompletionEngine<'a> {
    /// Engine listing local files from the process working directory.
    pub fn new(registry: &'a CommandRegistry, session: &'a SessionState) -> Self {
        Self {
            registry,
            session,
            tokenizer: Tokenizer::default(),
            files_root: PathBuf::from("."),
        }
    }

    /// Uses `tokenizer` to split partial lines.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Lists local-file candidates from `root` instead of the working directory.
    pub fn with_files_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.files_root = root.into();
        self
    }

    /// Full-line candidates for `partial`.
    pub fn complete(&self, partial: &str) -> Vec<String> {
        let parsed = self.tokenizer.parse_line(partial);
        let mut words = parsed.argv;
        if parsed.opens_new_word {
            words.push(String::new());
        }
        debug!("completing {:?} as {} words", partial, words.len());

        if let [prefix] = words.as_slice() {
            return self.registry.names_with_prefix(prefix);
        }

        let Some(command) = self.registry.lookup(&words[0]) else {
            return Vec::new();
        };
        let index = words.len() - 2;
        let Some(arg) = command.descriptor.args.get(index) else {
            return Vec::new();
        };

        let Some((prefix, head)) = words.split_last() else {
            return Vec::new();
        };
        let candidates = self.candidates(arg.completion, prefix);
        if candidates.is_empty() {
            return candidates;
        }
        let line_head = format!("{} ", head.join(" "));
        candidates
            .into_iter()
            .map(|candidate| format!("{line_head}{candidate}"))
            .collect()
    }

    /// Candidate words of one provider for `prefix`.
    pub fn candidates(&self, provider: ArgCompletion, prefix: &str) -> Vec<String> {
        match provider {
            ArgCompletion::None => Vec::new(),
            ArgCompletion::LocalFiles => local_file_candidates(&self.files_root, prefix),
            ArgCompletion::KnownSystems => filter_prefix(self.session.system_names(), prefix),
            ArgCompletion::LastSystemParticipants => self.last_system_participants(prefix),
            ArgCompletion::StateNames => filter_prefix(
                REQUESTABLE_STATE_NAMES.iter().map(|name| name.to_string()),
                prefix,
            ),
            ArgCompletion::CommandNames => self.registry.names_with_prefix(prefix),
        }
    }

    fn last_system_participants(&self, prefix: &str) -> Vec<String> {
        let Some(system) = self.session.last_system() else {
            return Vec::new();
        };
        match system.participants() {
            Ok(participants) => filter_prefix(participants, prefix),
            Err(err) => {
                debug!(
                    "no participant candidates for {:?}: {err}",
                    self.session.last_system_name()
                );
                Vec::new()
            }
        }
    }
}

fn filter_prefix(names: impl IntoIterator<Item = String>, prefix: &str) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect()
}

/// Files in `dir` whose names start with `prefix`, sorted and quoted where needed.
///
/// Directories are skipped. Unreadable directories and non UTF-8 names yield no candidates.
pub fn local_file_candidates(dir: &Path, prefix: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
        .iter()
        .map(|name| quote_filename_if_necessary(name))
        .collect()
}

/// Completion callback that outlives a single borrow of the shell.
///
/// Line editors keep this around and call it while the shell is idle at the prompt.
#[derive(Clone)]
pub struct ShellCompleter {
    registry: Rc<CommandRegistry>,
    session: Rc<RefCell<SessionState>>,
    tokenizer: Tokenizer,
}

impl ShellCompleter {
    /// Creates a completer sharing the shell's registry and session.
    pub fn new(
        registry: Rc<CommandRegistry>,
        session: Rc<RefCell<SessionState>>,
        tokenizer: Tokenizer,
    ) -> Self {
        Self {
            registry,
            session,
            tokenizer,
        }
    }

    /// Full-line candidates for `partial`; empty while a command is mutating the session.
    pub fn complete(&self, partial: &str) -> Vec<String> {
        let Ok(session) = self.session.try_borrow() else {
            return Vec::new();
        };
        CompletionEngine::new(&self.registry, &session)
            .with_tokenizer(self.tokenizer)
            .complete(partial)
    }
}
