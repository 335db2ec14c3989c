//! Global prefix exclusion routes.
//!
//! # Responsibilities
//! - Accept exclusions as a bare path or a `{path, method}` pair
//! - Normalize them into a canonical `ExcludeRoute`
//! - Match request paths against exclusions
//!
//! # Design Decisions
//! - Normalization is a pure function and idempotent
//! - Bare paths exclude every method (`ALL`)
//! - Segment matching only: literal, `:param`, trailing `*`

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of an exclusion route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    All,
}

impl RequestMethod {
    /// `ALL` accepts any method; otherwise methods must be equal.
    pub fn accepts(&self, other: RequestMethod) -> bool {
        *self == RequestMethod::All || other == RequestMethod::All || *self == other
    }
}

impl From<&axum::http::Method> for RequestMethod {
    fn from(method: &axum::http::Method) -> Self {
        use axum::http::Method;
        match *method {
            Method::GET => RequestMethod::Get,
            Method::POST => RequestMethod::Post,
            Method::PUT => RequestMethod::Put,
            Method::DELETE => RequestMethod::Delete,
            Method::PATCH => RequestMethod::Patch,
            Method::OPTIONS => RequestMethod::Options,
            Method::HEAD => RequestMethod::Head,
            _ => RequestMethod::All,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Options => "OPTIONS",
            RequestMethod::Head => "HEAD",
            RequestMethod::All => "ALL",
        };
        f.write_str(name)
    }
}

/// An exclusion as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RouteMatcher {
    Path(String),
    Route { path: String, method: RequestMethod },
}

impl From<&str> for RouteMatcher {
    fn from(path: &str) -> Self {
        RouteMatcher::Path(path.to_string())
    }
}

impl From<(&str, RequestMethod)> for RouteMatcher {
    fn from((path, method): (&str, RequestMethod)) -> Self {
        RouteMatcher::Route {
            path: path.to_string(),
            method,
        }
    }
}

impl From<&ExcludeRoute> for RouteMatcher {
    fn from(route: &ExcludeRoute) -> Self {
        RouteMatcher::Route {
            path: route.path.clone(),
            method: route.method,
        }
    }
}

/// Canonical exclusion route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludeRoute {
    pub path: String,
    pub method: RequestMethod,
}

impl ExcludeRoute {
    /// Normalize a caller-supplied matcher.
    pub fn normalize(matcher: &RouteMatcher) -> Self {
        match matcher {
            RouteMatcher::Path(path) => Self {
                path: normalize_path(path),
                method: RequestMethod::All,
            },
            RouteMatcher::Route { path, method } => Self {
                path: normalize_path(path),
                method: *method,
            },
        }
    }

    /// Whether a request for `path` with `method` falls under this exclusion.
    pub fn matches(&self, path: &str, method: RequestMethod) -> bool {
        if !self.method.accepts(method) {
            return false;
        }

        let candidate = normalize_path(path);
        let mut pattern = segments(&self.path);
        let mut actual = segments(&candidate);

        loop {
            match (pattern.next(), actual.next()) {
                (Some("*"), _) => return true,
                (Some(p), Some(_)) if p.starts_with(':') => continue,
                (Some(p), Some(a)) if p == a => continue,
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

/// Canonical path form: leading `/`, no duplicate or trailing slashes.
pub fn normalize_path(path: &str) -> String {
    let joined = segments(path.trim()).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_paths_to_all_methods() {
        let route = ExcludeRoute::normalize(&"foo".into());
        assert_eq!(route.path, "/foo");
        assert_eq!(route.method, RequestMethod::All);
    }

    #[test]
    fn normalize_path_collapses_slashes() {
        assert_eq!(normalize_path("//users///:id/"), "/users/:id");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("  health "), "/health");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs: Vec<RouteMatcher> = vec![
            "foo/".into(),
            ("//bar", RequestMethod::Get).into(),
            "/".into(),
            ("cats/:id/*", RequestMethod::Delete).into(),
        ];
        for input in inputs {
            let once = ExcludeRoute::normalize(&input);
            let twice = ExcludeRoute::normalize(&RouteMatcher::from(&once));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn matches_literal_param_and_wildcard() {
        let literal = ExcludeRoute::normalize(&"health".into());
        assert!(literal.matches("/health", RequestMethod::Get));
        assert!(literal.matches("health/", RequestMethod::Post));
        assert!(!literal.matches("/health/live", RequestMethod::Get));

        let param = ExcludeRoute::normalize(&("users/:id", RequestMethod::Get).into());
        assert!(param.matches("/users/42", RequestMethod::Get));
        assert!(!param.matches("/users/42", RequestMethod::Post));
        assert!(!param.matches("/users", RequestMethod::Get));

        let wildcard = ExcludeRoute::normalize(&"static/*".into());
        assert!(wildcard.matches("/static/css/site.css", RequestMethod::Get));
        assert!(!wildcard.matches("/assets/site.css", RequestMethod::Get));
    }

    #[test]
    fn converts_http_methods() {
        use axum::http::Method;
        assert_eq!(RequestMethod::from(&Method::POST), RequestMethod::Post);
        assert_eq!(RequestMethod::from(&Method::TRACE), RequestMethod::All);
        assert_eq!(RequestMethod::Get.to_string(), "GET");
    }

    #[test]
    fn deserializes_both_matcher_shapes() {
        let parsed: Vec<RouteMatcher> =
            serde_json::from_str(r#"["foo", {"path": "bar", "method": "GET"}]"#).unwrap();
        assert_eq!(parsed[0], RouteMatcher::Path("foo".into()));
        assert_eq!(
            parsed[1],
            RouteMatcher::Route {
                path: "bar".into(),
                method: RequestMethod::Get
            }
        );
    }
}
