// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
///
/// Every pipeline phase reports failures through this type. The `Display`
/// output is what the binary prints to stderr, so tool failures render the
/// captured stderr text verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The executable could not be launched at all
    #[error("command not found: '{command}'.")]
    CommandNotFound { command: String },

    /// Launch failure with installation guidance appended
    #[error("command not found: '{command}'.\n{hint}")]
    MissingTool { command: String, hint: String },

    /// The operating system refused the argument list as too long
    #[error("command line for '{command}' is too long ({args} arguments).")]
    ArgumentListTooLong { command: String, args: usize },

    /// The process ran but exited non-zero or wrote to stderr
    #[error("{}", failure_text(.command, .status, .stderr))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// Metadata payload did not match the expected structure
    #[error("{0}")]
    Schema(String),

    /// Metadata or working directory lacks a required entry
    #[error("{0}")]
    MissingData(String),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Attach installation guidance to a launch failure.
    ///
    /// Any other variant is returned unchanged.
    pub fn with_install_hint(self, hint: &str) -> Self {
        match self {
            DomainError::CommandNotFound { command } => DomainError::MissingTool {
                command,
                hint: hint.to_string(),
            },
            other => other,
        }
    }
}

fn failure_text(command: &str, status: &Option<i32>, stderr: &str) -> String {
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match status {
        Some(code) => format!("'{}' exited with status {}", command, code),
        None => format!("'{}' was terminated by a signal", command),
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
