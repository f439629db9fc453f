//! Git remote URL classification.
//!
//! Splits a remote URL into `(scheme, host, path)`. Five URL shapes are
//! recognized and tried in a fixed order; the first one that matches wins.

use std::fmt;

/// Prefix used to recover fully aliased remotes such as `foo:owner/repo.git`.
const SCP_USER_PREFIX: &str = "git@";

/// The recognized shapes of a remote URL, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlShape {
    /// `git://host[:port]/path`
    GitProtocol,
    /// `http(s)://[user@]host[:port]/path`
    HttpProtocol,
    /// `git@host:path`
    ScpShorthand,
    /// `ssh://[user@]host[:port][/|~]path`
    SshProtocol,
    /// `user@host:path`
    GenericAlias,
}

impl UrlShape {
    /// All shapes in the order they are tried.
    pub const ALL: [Self; 5] = [
        Self::GitProtocol,
        Self::HttpProtocol,
        Self::ScpShorthand,
        Self::SshProtocol,
        Self::GenericAlias,
    ];

    /// Whether the host of this shape may be an SSH config alias.
    pub fn may_use_alias(self) -> bool {
        matches!(self, Self::ScpShorthand | Self::GenericAlias)
    }

    fn try_match(self, url: &str) -> Option<RawMatch<'_>> {
        match self {
            Self::GitProtocol => match_git(url),
            Self::HttpProtocol => match_http(url),
            Self::ScpShorthand => match_scp(url),
            Self::SshProtocol => match_ssh(url),
            Self::GenericAlias => match_generic_alias(url),
        }
    }
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GitProtocol => "git",
            Self::HttpProtocol => "http",
            Self::ScpShorthand => "scp",
            Self::SshProtocol => "ssh",
            Self::GenericAlias => "alias",
        };
        f.write_str(name)
    }
}

/// A classified remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    /// Which shape matched.
    pub shape: UrlShape,
    /// `git`, `http`, `https`, `ssh`, or empty for the scp-like shapes.
    pub scheme: String,
    /// Host as written in the URL (possibly an SSH alias).
    pub host: String,
    /// Normalized repository path.
    pub path: String,
    resolve_host: bool,
}

impl ClassifiedUrl {
    /// Whether `host` should go through SSH alias resolution before use.
    ///
    /// True for the scp-like shapes when the URL contains `git@`.
    pub fn needs_alias_resolution(&self) -> bool {
        self.resolve_host
    }

    /// Consume into a `(scheme, host, path)` triple.
    pub fn into_triple(self) -> (String, String, String) {
        (self.scheme, self.host, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawMatch<'a> {
    shape: UrlShape,
    scheme: &'a str,
    host: &'a str,
    path: &'a str,
}

impl RawMatch<'_> {
    fn into_classified(self, source: &str) -> ClassifiedUrl {
        ClassifiedUrl {
            shape: self.shape,
            scheme: self.scheme.to_string(),
            host: self.host.to_string(),
            path: normalize_path(self.path).to_string(),
            resolve_host: self.shape.may_use_alias() && source.contains(SCP_USER_PREFIX),
        }
    }
}

/// Classify a remote URL.
///
/// Returns `None` when no shape matches. A URL with a `:` but no `@` is
/// retried as `git@<url>` so that bare aliases like `foo:owner/repo.git`
/// are recognized.
pub fn classify(url: &str) -> Option<ClassifiedUrl> {
    if let Some(m) = match_any(url) {
        return Some(m.into_classified(url));
    }

    if url.contains(':') && !url.contains('@') {
        let retried = format!("{SCP_USER_PREFIX}{url}");
        return match_any(&retried).map(|m| m.into_classified(&retried));
    }

    None
}

/// Strip leading slashes and a single trailing `.git` (optionally followed by `/`).
pub fn normalize_path(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    path.strip_suffix(".git/")
        .or_else(|| path.strip_suffix(".git"))
        .unwrap_or(path)
}

fn match_any(url: &str) -> Option<RawMatch<'_>> {
    UrlShape::ALL.into_iter().find_map(|shape| shape.try_match(url))
}

fn match_git(url: &str) -> Option<RawMatch<'_>> {
    let rest = url.strip_prefix("git://")?;
    let (host, path) = split_authority(rest, false)?;
    Some(RawMatch {
        shape: UrlShape::GitProtocol,
        scheme: "git",
        host,
        path,
    })
}

fn match_http(url: &str) -> Option<RawMatch<'_>> {
    let (scheme, rest) = if let Some(rest) = url.strip_prefix("https://") {
        ("https", rest)
    } else {
        ("http", url.strip_prefix("http://")?)
    };

    // Credentials end at the first `@`, and only count when a `/` follows.
    let rest = match rest.split_once('@') {
        Some((_, after)) if after.contains('/') => after,
        _ => rest,
    };

    let (host, path) = split_authority(rest, false)?;
    Some(RawMatch {
        shape: UrlShape::HttpProtocol,
        scheme,
        host,
        path,
    })
}

fn match_scp(url: &str) -> Option<RawMatch<'_>> {
    let rest = url.strip_prefix(SCP_USER_PREFIX)?;
    let (host, path) = rest.rsplit_once(':')?;
    Some(RawMatch {
        shape: UrlShape::ScpShorthand,
        scheme: "",
        host,
        path,
    })
}

fn match_ssh(url: &str) -> Option<RawMatch<'_>> {
    let rest = url.strip_prefix("ssh://")?;

    // Credentials end at the last `@` that still leaves a path separator.
    let rest = rest
        .rmatch_indices('@')
        .map(|(at, _)| &rest[at + 1..])
        .find(|after| after.contains(['/', '~']))
        .unwrap_or(rest);

    let (host, path) = split_authority(rest, true)?;
    Some(RawMatch {
        shape: UrlShape::SshProtocol,
        scheme: "ssh",
        host,
        path: path.strip_prefix('~').unwrap_or(path),
    })
}

fn match_generic_alias(url: &str) -> Option<RawMatch<'_>> {
    let (_, rest) = url.split_once('@')?;
    let (host, path) = rest.split_once(':')?;
    Some(RawMatch {
        shape: UrlShape::GenericAlias,
        scheme: "",
        host,
        path,
    })
}

/// Split `host[:port]<sep>path`.
///
/// The host ends at the first `:` or separator. A port runs up to the next
/// separator. `/` is consumed; `~` (only when `tilde` is set) stays on the path.
fn split_authority(s: &str, tilde: bool) -> Option<(&str, &str)> {
    let is_sep = |c: char| c == '/' || (tilde && c == '~');

    let end = s.find(|c: char| c == ':' || is_sep(c))?;
    let host = &s[..end];

    let after = &s[end..];
    let after = match after.strip_prefix(':') {
        Some(port_and_path) => &port_and_path[port_and_path.find(is_sep)?..],
        None => after,
    };

    Some((host, after.strip_prefix('/').unwrap_or(after)))
}
