//! Structured errors for the `system_control` binary.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Coarse failure classes shown at startup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToolErrorCategory {
    /// Invalid or unreadable configuration.
    Config,
    /// Missing or malformed environment prerequisites.
    Environment,
    /// Invalid command-line shape.
    Usage,
    /// Filesystem or terminal I/O failure.
    Io,
    /// The line editor could not be set up.
    LineEditor,
}

/// Tool error with optional context attached while it propagates.
///
/// `Display` renders a single CLI-friendly line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolError {
    /// High-level error category.
    pub category: ToolErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Optional operation name.
    pub operation: Option<String>,
    /// Optional path target.
    pub target: Option<String>,
    /// Optional remediation hint.
    pub hint: Option<String>,
}

/// Convenience result type for the binary.
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    /// Create an error with the given category and message.
    pub fn new(category: ToolErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            operation: None,
            target: None,
            hint: None,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ToolErrorCategory::Config, message)
    }

    /// Create an environment error.
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(ToolErrorCategory::Environment, message)
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ToolErrorCategory::Usage, message)
    }

    /// Create a line editor error.
    pub fn line_editor(message: impl Into<String>) -> Self {
        Self::new(ToolErrorCategory::LineEditor, message)
    }

    /// Names the step that failed, e.g. `load config`.
    pub fn with_operation(self, operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..self
        }
    }

    /// Names the file the failure is about.
    pub fn with_path(self, path: &Path) -> Self {
        Self {
            target: Some(path.display().to_string()),
            ..self
        }
    }

    /// Suggests what the operator can do about it.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        Self {
            hint: Some(hint.into()),
            ..self
        }
    }

    fn context(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("operation", &self.operation),
            ("target", &self.target),
            ("hint", &self.hint),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|value| (label, value)))
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        self.context()
            .try_for_each(|(label, value)| write!(f, " [{label}: {value}]"))
    }
}

impl std::error::Error for ToolError {}

/// Terminal and working-directory failures surface as [`ToolErrorCategory::Io`].
impl From<std::io::Error> for ToolError {
    fn from(value: std::io::Error) -> Self {
        Self::new(ToolErrorCategory::Io, value.to_string())
    }
}
