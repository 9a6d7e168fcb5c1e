use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameters resolved by the route matcher, e.g. `{"id": "42"}` for `/users/:id`.
pub type RouteParams = BTreeMap<String, String>;

/// Navigation target: a path plus its query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,

    /// Query string including the leading `?`, or empty.
    #[serde(default)]
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: normalize_path(pathname.into()),
            search: String::new(),
        }
    }

    /// Parse a relative URL. Fragments are dropped, they never reach the matcher.
    pub fn parse(url: &str) -> Self {
        let url = url.split_once('#').map(|(head, _)| head).unwrap_or(url);
        match url.split_once('?') {
            Some((path, query)) => Self {
                pathname: normalize_path(path.to_string()),
                search: if query.is_empty() {
                    String::new()
                } else {
                    format!("?{query}")
                },
            },
            None => Self::new(url),
        }
    }

    pub fn with_search(mut self, query: &str) -> Self {
        let query = query.trim_start_matches('?');
        self.search = if query.is_empty() {
            String::new()
        } else {
            format!("?{query}")
        };
        self
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

fn normalize_path(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

impl From<&str> for Location {
    fn from(url: &str) -> Self {
        Self::parse(url)
    }
}

impl From<String> for Location {
    fn from(url: String) -> Self {
        Self::parse(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_query_and_drops_fragment() {
        let loc = Location::parse("/users/42?tab=posts#top");
        assert_eq!(loc.pathname, "/users/42");
        assert_eq!(loc.search, "?tab=posts");
        assert_eq!(loc.url(), "/users/42?tab=posts");
    }

    #[test]
    fn test_parse_normalizes_path() {
        assert_eq!(Location::parse("").pathname, "/");
        assert_eq!(Location::parse("about?").url(), "/about");
    }

    #[test]
    fn test_with_search() {
        let loc = Location::new("/search").with_search("q=rust");
        assert_eq!(loc.to_string(), "/search?q=rust");
    }
}
