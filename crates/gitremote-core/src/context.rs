//! Helpers for code that consumes parsed remotes.
//!
//! Ranking and lookups are layered on top of [`RemoteDescriptor`]; parsing
//! itself never reorders or filters remotes.

use crate::remote::RemoteDescriptor;

/// Sort remotes by [`RemoteDescriptor::remote_weight`].
///
/// The sort is stable, so remotes of equal weight keep their listing order.
pub fn sort_by_weight(remotes: &mut [RemoteDescriptor]) {
    remotes.sort_by_key(RemoteDescriptor::remote_weight);
}

/// Pick the remote a consumer should treat as the repository's home.
///
/// `upstream` beats `origin`, which beats everything else; ties go to the
/// remote listed first.
pub fn preferred_remote(remotes: &[RemoteDescriptor]) -> Option<&RemoteDescriptor> {
    remotes.iter().min_by_key(|r| r.remote_weight())
}

/// Find a remote by its name.
pub fn find_remote_by_name<'a>(
    remotes: &'a [RemoteDescriptor],
    name: &str,
) -> Option<&'a RemoteDescriptor> {
    remotes.iter().find(|r| r.name() == name)
}

/// Filter remotes to those hosted on `domain`, ignoring case.
pub fn filter_remotes_by_domain<'a>(
    remotes: &'a [RemoteDescriptor],
    domain: &str,
) -> Vec<&'a RemoteDescriptor> {
    remotes
        .iter()
        .filter(|r| r.domain().eq_ignore_ascii_case(domain))
        .collect()
}

/// Find the remote whose normalized URL equals `domain/path`, ignoring case.
pub fn find_remote_by_url<'a>(
    remotes: &'a [RemoteDescriptor],
    normalized_url: &str,
) -> Option<&'a RemoteDescriptor> {
    let wanted = normalized_url.trim_end_matches('/').to_lowercase();
    remotes.iter().find(|r| r.normalized_url() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{Direction, DirectionEntry};

    fn make_remote(name: &str, domain: &str, path: &str) -> RemoteDescriptor {
        RemoteDescriptor::new(
            "/repo",
            name,
            "https",
            domain,
            path,
            DirectionEntry {
                url: format!("https://{domain}/{path}.git"),
                direction: Direction::Fetch,
            },
        )
    }

    fn names(remotes: &[RemoteDescriptor]) -> Vec<&str> {
        remotes.iter().map(RemoteDescriptor::name).collect()
    }

    #[test]
    fn test_should_sort_upstream_then_origin() {
        let mut remotes = vec![
            make_remote("fork", "github.com", "me/repo"),
            make_remote("origin", "github.com", "me/repo2"),
            make_remote("mirror", "gitlab.com", "me/repo"),
            make_remote("Upstream", "github.com", "org/repo"),
        ];
        sort_by_weight(&mut remotes);
        assert_eq!(names(&remotes), ["Upstream", "origin", "fork", "mirror"]);
    }

    #[test]
    fn test_should_prefer_upstream() {
        let remotes = vec![
            make_remote("origin", "github.com", "me/repo"),
            make_remote("upstream", "github.com", "org/repo"),
        ];
        assert_eq!(preferred_remote(&remotes).unwrap().name(), "upstream");
    }

    #[test]
    fn test_should_prefer_first_listed_on_tie() {
        let remotes = vec![
            make_remote("b", "github.com", "b/repo"),
            make_remote("a", "github.com", "a/repo"),
        ];
        assert_eq!(preferred_remote(&remotes).unwrap().name(), "b");
    }

    #[test]
    fn test_should_return_none_for_no_remotes() {
        assert!(preferred_remote(&[]).is_none());
    }

    #[test]
    fn test_should_find_remote_by_name() {
        let remotes = vec![
            make_remote("origin", "github.com", "me/repo"),
            make_remote("upstream", "github.com", "org/repo"),
        ];
        assert_eq!(
            find_remote_by_name(&remotes, "upstream").unwrap().path(),
            "org/repo"
        );
        assert!(find_remote_by_name(&remotes, "missing").is_none());
    }

    #[test]
    fn test_should_filter_by_domain_ignoring_case() {
        let remotes = vec![
            make_remote("origin", "GitHub.com", "me/repo"),
            make_remote("lab", "gitlab.com", "me/repo"),
        ];
        let filtered = filter_remotes_by_domain(&remotes, "github.COM");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name(), "origin");
    }

    #[test]
    fn test_should_find_remote_by_normalized_url() {
        let remotes = vec![make_remote("origin", "GitHub.com", "Org/Repo")];
        assert!(find_remote_by_url(&remotes, "github.com/org/repo/").is_some());
        assert!(find_remote_by_url(&remotes, "github.com/org/other").is_none());
    }
}
