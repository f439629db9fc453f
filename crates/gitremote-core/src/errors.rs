//! Error types.

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// Git command failed with an exit code.
    #[error("git {command} failed: {message}")]
    CommandFailed {
        /// The git subcommand that failed.
        command: String,
        /// Error message from stderr.
        message: String,
        /// Process exit code, if available.
        exit_code: Option<i32>,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point /)")]
    NotARepository,

    /// Git binary not found.
    #[error("git executable not found in PATH")]
    NotFound,

    /// I/O error from subprocess.
    #[error("git IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Get the exit code if this was a command failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Errors from reading settings.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A setting has a value that cannot be used.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Environment variable or flag name.
        key: String,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_command_failed() {
        let err = GitError::CommandFailed {
            command: "remote".to_string(),
            message: "fatal: not a git repository".to_string(),
            exit_code: Some(128),
        };
        let msg = err.to_string();
        assert!(msg.contains("remote"));
        assert!(msg.contains("fatal"));
    }

    #[test]
    fn test_should_display_not_found() {
        assert!(GitError::NotFound.to_string().contains("not found"));
    }

    #[test]
    fn test_should_return_exit_code() {
        let err = GitError::CommandFailed {
            command: "remote".to_string(),
            message: String::new(),
            exit_code: Some(128),
        };
        assert_eq!(err.exit_code(), Some(128));
        assert!(GitError::NotARepository.exit_code().is_none());
    }

    #[test]
    fn test_should_convert_io_error() {
        let git_err: GitError = std::io::Error::other("test").into();
        assert!(matches!(git_err, GitError::Io(_)));
    }

    #[test]
    fn test_should_display_invalid_config() {
        let err = ConfigError::Invalid {
            key: "GITREMOTE_SSH_TIMEOUT_MS".to_string(),
            value: "soon".to_string(),
            reason: "expected milliseconds".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GITREMOTE_SSH_TIMEOUT_MS"));
        assert!(msg.contains("\"soon\""));
    }
}
