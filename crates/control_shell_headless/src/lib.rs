//! Headless line parser for the system control shell.
//!
//! This crate only splits input lines into words. It has no knowledge of commands, sessions, or
//! terminals, so the interactive loop, the dispatcher, and the completion engine can all share the
//! exact same quoting rules.
//!
//! Quoting rules:
//!
//! - whitespace separates words and is kept only inside a quoted span
//! - a word starting with `"` or `'` runs to the matching quote; the quotes are stripped and the
//!   word ends right after the closing quote
//! - a quote appearing in the middle of a bare word opens a span that may contain whitespace; the
//!   quotes stay part of the word (`foo"bar baz"` is one word)
//! - inside a span a backslash keeps the next character from closing it, unless that backslash
//!   itself follows a backslash
//! - an unterminated span runs to the end of the line
//!
//! Backslashes are never removed from the word text.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Word splitter for one shell input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    /// Whether a backslash inside a quoted span suppresses the next character's meaning.
    pub use_escape: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { use_escape: true }
    }
}

/// Result of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// Parsed words in reading order.
    pub argv: Vec<String>,
    /// Whether the line held no words at all.
    pub is_empty: bool,
    /// Whether the cursor sits at the start of a fresh word (empty line or trailing whitespace).
    pub opens_new_word: bool,
}

impl Tokenizer {
    /// Splits `line` into words. Never fails; malformed quoting is resolved leniently.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut pos = 0usize;
        let mut words = Vec::new();
        while let Some(word) = self.next_word(&chars, &mut pos) {
            words.push(word);
        }
        words
    }

    /// Splits `line` and reports whether the caller is positioned on a new word.
    pub fn parse_line(&self, line: &str) -> ParsedLine {
        let argv = self.tokenize(line);
        let opens_new_word = argv.is_empty() || line.ends_with(char::is_whitespace);
        ParsedLine {
            is_empty: argv.is_empty(),
            opens_new_word,
            argv,
        }
    }

    fn next_word(&self, chars: &[char], pos: &mut usize) -> Option<String> {
        while *pos < chars.len() && chars[*pos].is_whitespace() {
            *pos += 1;
        }
        let first = *chars.get(*pos)?;

        if is_quote(first) {
            let content_start = *pos + 1;
            let close = self.scan_quoted(chars, content_start, first);
            let word = chars[content_start..close].iter().collect();
            *pos = (close + 1).min(chars.len());
            return Some(word);
        }

        let start = *pos;
        while *pos < chars.len() && !chars[*pos].is_whitespace() {
            if is_quote(chars[*pos]) {
                *pos = self.scan_quoted(chars, *pos + 1, chars[*pos]);
                if *pos >= chars.len() {
                    break;
                }
            }
            *pos += 1;
        }
        Some(chars[start..*pos].iter().collect())
    }

    /// Returns the index of the closing `quote`, or `chars.len()` when the span is unterminated.
    fn scan_quoted(&self, chars: &[char], start: usize, quote: char) -> usize {
        let mut escaped = false;
        let mut last = None::<char>;
        let mut index = start;
        while index < chars.len() {
            let ch = chars[index];
            if ch == quote && !escaped {
                return index;
            }
            escaped = self.use_escape && ch == '\\' && last != Some('\\');
            last = Some(ch);
            index += 1;
        }
        chars.len()
    }
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Splits `line` with the default tokenizer (escapes enabled).
pub fn tokenize(line: &str) -> Vec<String> {
    Tokenizer::default().tokenize(line)
}

/// Parses `line` with the default tokenizer.
pub fn parse_line(line: &str) -> ParsedLine {
    Tokenizer::default().parse_line(line)
}

/// Quotes a file name so that [`tokenize`] reads it back as a single word.
///
/// Names that already start with `"` or that contain no whitespace are returned unchanged.
pub fn quote_filename_if_necessary(name: &str) -> String {
    if name.starts_with('"') || !name.contains(char::is_whitespace) {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}
