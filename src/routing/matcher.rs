//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive, segment-aware)
//! - Report specificity so the router can prefer the longest prefix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api` matches `/api` and `/api/...` but never `/apis`
//! - No regex to guarantee O(n) matching

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;

    /// Higher values are checked first.
    fn specificity(&self) -> usize;
}

/// Drop trailing slashes, keeping the root prefix `/` intact.
pub fn normalize_prefix(prefix: &str) -> &str {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() && prefix.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Matches the request path prefix on segment boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    /// A trailing slash is ignored, except for the root prefix `/`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: normalize_prefix(&prefix).to_string(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn specificity(&self) -> usize {
        self.prefix.len()
    }
}

/// Matches every path. Used for the `*` rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchAllMatcher;

impl Matcher for CatchAllMatcher {
    fn matches(&self, _path: &str) -> bool {
        true
    }

    fn specificity(&self) -> usize {
        0
    }
}
