//! Routing rules of the site distribution.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{Behavior, BEHAVIORS};

/// Served in place of missing or forbidden objects so client-side routes resolve.
pub const FALLBACK_PATH: &str = "/index.html";

/// A CloudFront path pattern: `*` matches any run of characters, `?` exactly one.
#[derive(Debug, Clone)]
pub struct PathPattern {
    re: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
        let mut re = String::from("^/?");
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        re.push('$');
        Ok(Self { re: Regex::new(&re)? })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.re.is_match(path)
    }
}

fn compiled_behaviors() -> &'static [(PathPattern, &'static Behavior)] {
    static COMPILED: OnceLock<Vec<(PathPattern, &'static Behavior)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        BEHAVIORS
            .iter()
            .filter(|b| !b.is_default())
            .filter_map(|b| PathPattern::new(b.path_pattern).ok().map(|p| (p, b)))
            .collect()
    })
}

/// The behavior a request path falls under, in declaration order, else the default.
pub fn behavior_for(path: &str) -> &'static Behavior {
    compiled_behaviors()
        .iter()
        .find(|(pattern, _)| pattern.matches(path))
        .map(|(_, behavior)| *behavior)
        .unwrap_or_else(default_behavior)
}

pub fn default_behavior() -> &'static Behavior {
    BEHAVIORS.iter().find(|b| b.is_default()).unwrap_or(&BEHAVIORS[0])
}

/// Directory paths map to their `index.html`.
pub fn resolve_path(path: &str) -> String {
    if path.ends_with('/') {
        format!("{}index.html", path)
    } else {
        path.to_string()
    }
}

/// Origin statuses answered with [`FALLBACK_PATH`] and a 200.
pub fn is_fallback_status(status: u16) -> bool {
    status == 403 || status == 404
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_directory_paths() {
        assert_eq!(resolve_path("/"), "/index.html");
        assert_eq!(resolve_path("/docs/"), "/docs/index.html");
        assert_eq!(resolve_path("/app.js"), "/app.js");
    }

    #[test]
    fn pattern_wildcards() {
        let p = PathPattern::new("images/*.jp?g").unwrap();
        assert!(p.matches("/images/cat.jpeg"));
        assert!(p.matches("images/a/b.jpng"));
        assert!(!p.matches("/images/cat.jpg"));
        assert!(!p.matches("/img/cat.jpeg"));

        let literal = PathPattern::new("/index.html").unwrap();
        assert!(literal.matches("/index.html"));
        assert!(!literal.matches("/indexXhtml"));
    }

    #[test]
    fn picks_behaviors() {
        assert!(behavior_for("/index.html").no_ttl);
        assert!(behavior_for("/index.html").security_headers);
        assert!(!behavior_for("/robots.txt").security_headers);
        assert!(!behavior_for("/favicon.ico").security_headers);

        let other = behavior_for("/assets/app.js");
        assert!(other.is_default());
        assert!(other.security_headers);
        assert!(!other.no_ttl);

        // patterns are anchored at the root
        assert!(behavior_for("/docs/index.html").is_default());
    }

    #[test]
    fn fallback_statuses() {
        assert!(is_fallback_status(403));
        assert!(is_fallback_status(404));
        assert!(!is_fallback_status(200));
        assert!(!is_fallback_status(500));
    }
}
