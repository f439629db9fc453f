//! Git client that wraps the git command-line tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::instrument;

use crate::alias::AliasResolver;
use crate::errors::GitError;
use crate::remote::{RemoteDescriptor, RemoteParser};

/// Client for executing git commands.
#[derive(Debug, Clone)]
pub struct GitClient {
    /// Path to the git binary.
    git_path: PathBuf,
    /// Working directory for git commands.
    repo_dir: Option<PathBuf>,
}

impl GitClient {
    /// Create a new git client using the system git.
    ///
    /// # Errors
    ///
    /// Returns an error if git is not found in PATH.
    pub fn new() -> Result<Self, GitError> {
        let git_path = which::which("git").map_err(|_| GitError::NotFound)?;
        Ok(Self::with_git_path(git_path))
    }

    /// Create a client for an explicit git binary.
    pub fn with_git_path(git_path: impl Into<PathBuf>) -> Self {
        Self {
            git_path: git_path.into(),
            repo_dir: None,
        }
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(dir.into());
        self
    }

    /// Get the repository directory, if set.
    pub fn repo_dir(&self) -> Option<&Path> {
        self.repo_dir.as_deref()
    }

    /// Execute a git command and return stdout.
    #[instrument(skip(self), fields(args = ?args))]
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new(&self.git_path);
        cmd.args(args);

        if let Some(ref dir) = self.repo_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepository);
            }
            let command = args.first().copied().unwrap_or("").to_string();
            return Err(GitError::CommandFailed {
                command,
                message: stderr.trim().to_string(),
                exit_code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Get the raw `git remote -v` listing.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails or the directory is not a repository.
    pub async fn remote_listing(&self) -> Result<String, GitError> {
        self.run(&["remote", "-v"]).await
    }

    /// Get the top-level directory of the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if not in a git repo.
    pub async fn top_level_dir(&self) -> Result<PathBuf, GitError> {
        let output = self.run(&["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(first_line(&output)))
    }

    /// List and parse the remotes of the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if either git command fails. Parsing itself never fails.
    pub async fn remotes<R: AliasResolver>(
        &self,
        parser: &RemoteParser<R>,
    ) -> Result<Vec<RemoteDescriptor>, GitError> {
        let repo_path = self.top_level_dir().await?;
        let listing = self.remote_listing().await?;
        Ok(parser.parse(&listing, &repo_path).await)
    }
}

fn first_line(output: &str) -> &str {
    output.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::IdentityResolver;

    #[test]
    fn test_should_return_first_line_from_multiline() {
        assert_eq!(first_line("/home/me/repo\nextra\n"), "/home/me/repo");
    }

    #[test]
    fn test_should_return_empty_for_empty_string() {
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_should_keep_repo_dir() {
        let client = GitClient::with_git_path("git").with_repo_dir("/tmp/repo");
        assert_eq!(client.repo_dir(), Some(Path::new("/tmp/repo")));
    }

    #[tokio::test]
    async fn test_should_report_io_error_for_missing_git() {
        let client = GitClient::with_git_path("/nonexistent/bin/git-for-tests");
        let err = client.remote_listing().await.unwrap_err();
        assert!(matches!(err, GitError::Io(_)));
    }

    #[tokio::test]
    async fn test_should_list_remotes_of_real_repository() {
        let Ok(client) = GitClient::new() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let client = client.with_repo_dir(dir.path());

        client.run(&["init", "-q"]).await.unwrap();
        client
            .run(&["remote", "add", "origin", "https://github.com/org/repo.git"])
            .await
            .unwrap();

        let parser = RemoteParser::new(IdentityResolver);
        let remotes = client.remotes(&parser).await.unwrap();

        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name(), "origin");
        assert_eq!(remotes[0].domain(), "github.com");
        assert_eq!(remotes[0].path(), "org/repo");
        assert_eq!(remotes[0].entries().len(), 2);
    }

    #[tokio::test]
    async fn test_should_fail_outside_repository() {
        let Ok(client) = GitClient::new() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let err = client
            .with_repo_dir(dir.path())
            .top_level_dir()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GitError::NotARepository | GitError::CommandFailed { .. }
        ));
    }
}
