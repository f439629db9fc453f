//! SSH host alias resolution.
//!
//! Remotes written as `git@work:org/repo.git` often use a `Host` alias from
//! `~/.ssh/config`. The real hostname is obtained from `ssh -G`, which prints
//! the fully resolved configuration for a host without connecting.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::Settings;

/// Default bound on a single `ssh -G` invocation.
pub const DEFAULT_SSH_TIMEOUT: Duration = Duration::from_secs(3);

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^hostname (.*)$").expect("valid hostname regex"));

/// Resolves a host token that may be an SSH alias to a real hostname.
///
/// Implementations never fail: when nothing better is known they return the
/// alias unchanged.
pub trait AliasResolver: Send + Sync {
    /// Resolve `alias` to a hostname.
    fn resolve(&self, alias: &str) -> impl Future<Output = String> + Send;
}

/// Resolver that leaves every host untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl AliasResolver for IdentityResolver {
    async fn resolve(&self, alias: &str) -> String {
        alias.to_string()
    }
}

/// Resolver backed by the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshAliasResolver {
    /// Path to the ssh binary, if one was found.
    ssh_path: Option<PathBuf>,
    /// Upper bound for one `ssh -G` run.
    timeout: Duration,
}

impl Default for SshAliasResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SshAliasResolver {
    /// Create a resolver using `ssh` from `PATH`.
    ///
    /// A missing binary is not an error; every lookup then falls back to the alias.
    pub fn new() -> Self {
        let ssh_path = which::which("ssh").ok();
        if ssh_path.is_none() {
            debug!("ssh not found in PATH, alias resolution disabled");
        }
        Self {
            ssh_path,
            timeout: DEFAULT_SSH_TIMEOUT,
        }
    }

    /// Create a resolver for an explicit ssh program.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            ssh_path: Some(program.into()),
            timeout: DEFAULT_SSH_TIMEOUT,
        }
    }

    /// Create a resolver from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let resolver = match &settings.ssh_program {
            Some(program) => Self::with_program(program),
            None => Self::new(),
        };
        resolver.with_timeout(settings.ssh_timeout)
    }

    /// Set the per-invocation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the ssh binary in use, if any.
    pub fn ssh_path(&self) -> Option<&Path> {
        self.ssh_path.as_deref()
    }

    /// Run `ssh -T -G -- <alias>` and return its stdout, or `None` on any failure.
    #[instrument(skip(self))]
    async fn dump_config(&self, alias: &str) -> Option<String> {
        let ssh_path = self.ssh_path.as_deref()?;

        let mut cmd = Command::new(ssh_path);
        // -T avoids the "Pseudo-terminal will not be allocated" warning.
        // `--` keeps a host starting with `-` from being read as an option.
        cmd.args(["-T", "-G", "--", alias])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to run ssh -G");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "ssh -G timed out");
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ssh -G failed"
            );
            return None;
        }

        if output.stdout.is_empty() {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ssh -G produced no output"
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl AliasResolver for SshAliasResolver {
    async fn resolve(&self, alias: &str) -> String {
        let resolved = self
            .dump_config(alias)
            .await
            .and_then(|stdout| parse_hostname(&stdout).map(str::to_string));

        match resolved {
            Some(hostname) => {
                debug!(alias, hostname, "resolved ssh alias");
                hostname
            }
            None => alias.to_string(),
        }
    }
}

/// Extract the `hostname` value from `ssh -G` output.
///
/// Empty values and the literal `undefined` are treated as absent.
pub fn parse_hostname(ssh_config: &str) -> Option<&str> {
    let value = HOSTNAME_RE.captures(ssh_config)?.get(1)?.as_str().trim();
    if value.is_empty() || value == "undefined" {
        return None;
    }
    Some(value)
}
