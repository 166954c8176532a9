//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted by specificity once; lookup is a linear scan
//! - Explicit NoMatch rather than silent default

use axum::http::Uri;
use url::Url;

use crate::config::{RouteConfig, CATCH_ALL};
use crate::config::validation::parse_upstream;
use crate::routing::matcher::{CatchAllMatcher, Matcher, PathPrefixMatcher};

/// A resolved upstream target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    /// `scheme://host:port`
    origin: String,
    /// Base path without trailing slash (may be empty).
    base_path: String,
}

impl Upstream {
    /// Resolve an upstream base URL. Returns `None` for non-http URLs.
    pub fn parse(base_url: &str) -> Option<Self> {
        let url: Url = parse_upstream(base_url)?;
        let host = url.host_str()?;
        let origin = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };
        let base_path = url.path().trim_end_matches('/').to_string();
        Some(Self { origin, base_path })
    }

    /// `scheme://host:port` of this upstream.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Build the outbound URI: base URL followed by the original path and query.
    pub fn uri_for(&self, original: &Uri) -> Result<Uri, axum::http::uri::InvalidUri> {
        let path_and_query = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}{}", self.origin, self.base_path, path_and_query).parse()
    }
}

/// What a matched route does with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Forward to an upstream; `upgrade` enables the raw byte relay.
    Upstream { upstream: Upstream, upgrade: bool },
    /// Serve static assets.
    Static,
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    pub name: String,
    pub target: RouteTarget,
    matcher: Box<dyn Matcher>,
}

impl Route {
    /// Compile a route rule. Invalid upstream URLs yield `None`.
    pub fn compile(config: &RouteConfig) -> Option<Self> {
        let matcher: Box<dyn Matcher> = if config.path_prefix == CATCH_ALL {
            Box::new(CatchAllMatcher)
        } else {
            Box::new(PathPrefixMatcher::new(config.path_prefix.clone()))
        };

        let target = match &config.upstream {
            Some(url) => RouteTarget::Upstream {
                upstream: Upstream::parse(url)?,
                upgrade: config.upgrade,
            },
            None => RouteTarget::Static,
        };

        Some(Self {
            name: config.name.clone(),
            target,
            matcher,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// Immutable route table with longest-prefix lookup.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile routes from configuration.
    pub fn from_config(configs: &[RouteConfig]) -> Self {
        let mut routes: Vec<Route> = configs
            .iter()
            .filter_map(|config| {
                let route = Route::compile(config);
                if route.is_none() {
                    tracing::warn!(route = %config.name, "Skipping route with invalid upstream");
                }
                route
            })
            .collect();

        // Stable sort keeps configuration order among equal specificity.
        routes.sort_by(|a, b| b.matcher.specificity().cmp(&a.matcher.specificity()));

        for route in &routes {
            tracing::debug!(route = %route.name, target = ?route.target, "Route compiled");
        }

        Self { routes }
    }

    /// Find the most specific route matching the path.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, prefix: &str, upstream: Option<&str>, upgrade: bool) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path_prefix: prefix.into(),
            upstream: upstream.map(Into::into),
            upgrade,
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let router = Router::from_config(&[
            rule("api", "/api", Some("http://api:8080"), false),
            rule("votes", "/api/vote", Some("http://votes:8080"), false),
            rule("static", "*", None, false),
        ]);

        assert_eq!(router.match_path("/api/vote").unwrap().name, "votes");
        assert_eq!(router.match_path("/api/other").unwrap().name, "api");
        assert_eq!(router.match_path("/index.html").unwrap().name, "static");
    }

    #[test]
    fn no_catch_all_means_no_match() {
        let router = Router::from_config(&[rule("api", "/api", Some("http://api:8080"), false)]);
        assert!(router.match_path("/unknown-path").is_none());
        assert!(router.match_path("/apis").is_none());
    }

    #[test]
    fn invalid_upstream_is_skipped() {
        let router = Router::from_config(&[rule("bad", "/bad", Some("not a url"), false)]);
        assert!(router.routes.is_empty());
    }

    #[test]
    fn upgrade_flag_is_carried() {
        let router = Router::from_config(&[rule("results", "/socket.io", Some("http://result:8080"), true)]);
        let route = router.match_path("/socket.io/").unwrap();
        assert!(matches!(route.target, RouteTarget::Upstream { upgrade: true, .. }));
    }

    #[test]
    fn upstream_uri_preserves_path_and_query() {
        let upstream = Upstream::parse("http://garden-api:8080").unwrap();
        let original: Uri = "/api/vote?x=1".parse().unwrap();
        assert_eq!(
            upstream.uri_for(&original).unwrap().to_string(),
            "http://garden-api:8080/api/vote?x=1"
        );
    }

    #[test]
    fn upstream_base_path_is_prepended() {
        let upstream = Upstream::parse("http://example.com/v2/").unwrap();
        assert_eq!(upstream.origin(), "http://example.com");
        let original: Uri = "/api/vote".parse().unwrap();
        assert_eq!(
            upstream.uri_for(&original).unwrap().to_string(),
            "http://example.com/v2/api/vote"
        );
    }
}
