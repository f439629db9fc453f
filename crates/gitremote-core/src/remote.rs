//! Git remote parsing.
//!
//! Turns `git remote -v` output into one [`RemoteDescriptor`] per distinct
//! `domain/path`, collecting every fetch and push URL listed for it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use futures::StreamExt;
use futures::stream;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::alias::AliasResolver;
use crate::config::{DEFAULT_MAX_CONCURRENT_RESOLUTIONS, Settings};
use crate::url_parser;

/// One record per line: `<name>\t<url> (<direction>)`.
static REMOTE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mR)^(.*)\t(.*)[ \t]\((fetch|push)\)$").expect("valid remote line regex")
});

/// Whether a remote URL is used for fetching or pushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `(fetch)`
    Fetch,
    /// `(push)`
    Push,
}

impl Direction {
    /// The token git prints for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fetch" => Ok(Self::Fetch),
            "push" => Ok(Self::Push),
            other => Err(format!("unknown remote direction: {other}")),
        }
    }
}

/// A URL together with the direction it was listed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionEntry {
    /// The remote URL exactly as listed.
    pub url: String,
    /// Fetch or push.
    pub direction: Direction,
}

/// A remote of a repository, unique by `domain/path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteDescriptor {
    repository_path: PathBuf,
    name: String,
    scheme: String,
    domain: String,
    path: String,
    entries: Vec<DirectionEntry>,
}

impl RemoteDescriptor {
    /// Create a descriptor from its first listed URL.
    pub fn new(
        repository_path: impl Into<PathBuf>,
        name: impl Into<String>,
        scheme: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        first: DirectionEntry,
    ) -> Self {
        Self {
            repository_path: repository_path.into(),
            name: name.into(),
            scheme: scheme.into(),
            domain: domain.into(),
            path: path.into(),
            entries: vec![first],
        }
    }

    /// Local path of the repository that owns this remote.
    pub fn repository_path(&self) -> &Path {
        &self.repository_path
    }

    /// Remote name from the first line seen for this identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `git`, `http`, `https`, `ssh`, or empty for scp-like URLs.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host, after SSH alias resolution where it applies.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Repository path without leading slashes or `.git` suffix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Every listed URL in input order.
    pub fn entries(&self) -> &[DirectionEntry] {
        &self.entries
    }

    /// The `domain/path` key descriptors are grouped by.
    pub fn identity(&self) -> String {
        format!("{}/{}", self.domain, self.path)
    }

    /// Lowercased `domain/path`, for matching against provider hosts.
    pub fn normalized_url(&self) -> String {
        self.identity().to_lowercase()
    }

    /// Protocol-relative URL (`//domain/path`) for browser use.
    pub fn web_url(&self) -> String {
        format!("//{}/{}", self.domain, self.path)
    }

    /// Sort weight by name: `upstream` first, then `origin`, then the rest.
    pub fn remote_weight(&self) -> i32 {
        match self.name.to_lowercase().as_str() {
            "upstream" => -100,
            "origin" => 0,
            _ => 100,
        }
    }

    /// The first URL listed for fetching.
    pub fn fetch_url(&self) -> Option<&str> {
        self.url_for(Direction::Fetch)
    }

    /// The first URL listed for pushing.
    pub fn push_url(&self) -> Option<&str> {
        self.url_for(Direction::Push)
    }

    /// The first listed URL as a parsed [`Url`].
    ///
    /// scp-like URLs have no scheme and are rewritten to `ssh://` first.
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        let raw = &self.entries[0].url;
        if self.scheme.is_empty() {
            // Support scp-like syntax for SSH protocol
            Url::parse(&format!("ssh://{}", raw.replacen(':', "/", 1)))
        } else {
            Url::parse(raw)
        }
    }

    fn url_for(&self, direction: Direction) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.direction == direction)
            .map(|e| e.url.as_str())
    }
}

/// A `git remote -v` line, copied out of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RemoteRecord {
    name: String,
    url: String,
    direction: Direction,
}

/// Split a listing into records, skipping lines that do not match.
///
/// Fields are owned copies so descriptors never keep the listing alive.
fn parse_records(output: &str) -> Vec<RemoteRecord> {
    REMOTE_LINE_RE
        .captures_iter(output)
        .filter_map(|caps| {
            Some(RemoteRecord {
                name: caps.get(1)?.as_str().to_owned(),
                url: caps.get(2)?.as_str().to_owned(),
                direction: caps.get(3)?.as_str().parse().ok()?,
            })
        })
        .collect()
}

/// Per-call grouping of records by `domain/path`.
#[derive(Debug)]
struct Accumulator<'a> {
    repository_path: &'a Path,
    remotes: Vec<RemoteDescriptor>,
    index: HashMap<String, usize>,
}

impl<'a> Accumulator<'a> {
    fn new(repository_path: &'a Path) -> Self {
        Self {
            repository_path,
            remotes: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn add(&mut self, record: RemoteRecord, scheme: String, domain: String, path: String) {
        let entry = DirectionEntry {
            url: record.url,
            direction: record.direction,
        };
        let identity = format!("{domain}/{path}");

        if let Some(&i) = self.index.get(&identity) {
            self.remotes[i].entries.push(entry);
            return;
        }

        self.index.insert(identity, self.remotes.len());
        self.remotes.push(RemoteDescriptor::new(
            self.repository_path,
            record.name,
            scheme,
            domain,
            path,
            entry,
        ));
    }

    fn into_remotes(self) -> Vec<RemoteDescriptor> {
        self.remotes
    }
}

/// Parses remote listings, resolving SSH aliases through `R`.
#[derive(Debug, Clone)]
pub struct RemoteParser<R> {
    resolver: R,
    max_in_flight: usize,
}

impl<R: AliasResolver> RemoteParser<R> {
    /// Create a parser with the default concurrency limit.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            max_in_flight: DEFAULT_MAX_CONCURRENT_RESOLUTIONS,
        }
    }

    /// Create a parser using the concurrency limit from `settings`.
    pub fn with_settings(resolver: R, settings: &Settings) -> Self {
        Self::new(resolver).with_max_in_flight(settings.max_concurrent_resolutions)
    }

    /// Limit how many URLs are resolved at the same time (at least one).
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// The alias resolver in use.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Parse `git remote -v` output for the repository at `repository_path`.
    ///
    /// Descriptors come back in order of first appearance. Lines that are not
    /// remote records, and records whose URL cannot be classified, are skipped.
    #[instrument(skip(self, output), fields(bytes = output.len()))]
    pub async fn parse(
        &self,
        output: &str,
        repository_path: impl AsRef<Path> + fmt::Debug,
    ) -> Vec<RemoteDescriptor> {
        if output.is_empty() {
            return Vec::new();
        }

        let records = parse_records(output);
        debug!(records = records.len(), "matched remote lines");

        // `buffered` yields in input order, whatever order lookups finish in.
        let resolved: Vec<_> = stream::iter(records)
            .map(|record| async move {
                let resolved = self.resolve_url(&record.url).await;
                (record, resolved)
            })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        let mut acc = Accumulator::new(repository_path.as_ref());
        for (record, resolved) in resolved {
            match resolved {
                Some((scheme, domain, path)) => acc.add(record, scheme, domain, path),
                None => debug!(name = %record.name, url = %record.url, "skipping unrecognized remote url"),
            }
        }
        acc.into_remotes()
    }

    /// Classify one URL and resolve its host if it may be an SSH alias.
    ///
    /// Returns `(scheme, domain, path)`, or `None` if the URL is not recognized.
    pub async fn resolve_url(&self, url: &str) -> Option<(String, String, String)> {
        let classified = url_parser::classify(url)?;
        let needs_resolution = classified.needs_alias_resolution();
        let (scheme, host, path) = classified.into_triple();

        let domain = if needs_resolution {
            self.resolver.resolve(&host).await
        } else {
            host
        };
        Some((scheme, domain, path))
    }
}
