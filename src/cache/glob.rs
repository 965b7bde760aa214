//! Key pattern matching for `keys`.

use regex::Regex;

use crate::error::{CacheError, Result};

/// A compiled `*`-wildcard pattern matched against whole keys.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    /// Compiles `pattern`; every character other than `*` matches literally.
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("^{}$", body)).map_err(|e| {
            CacheError::InvalidArgument(format!("Invalid key pattern '{}': {}", pattern, e))
        })?;

        Ok(Self { regex })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_matches_everything() {
        let glob = GlobPattern::new("*").unwrap();
        assert!(glob.matches(""));
        assert!(glob.matches("a:1"));
    }

    #[test]
    fn test_prefix_pattern_is_anchored() {
        let glob = GlobPattern::new("a:*").unwrap();
        assert!(glob.matches("a:1"));
        assert!(glob.matches("a:"));
        assert!(!glob.matches("b:1"));
        assert!(!glob.matches("xa:1"));
    }

    #[test]
    fn test_inner_wildcard() {
        let glob = GlobPattern::new("user:*:session").unwrap();
        assert!(glob.matches("user:42:session"));
        assert!(!glob.matches("user:42:profile"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let glob = GlobPattern::new("cfg.(v1)+*").unwrap();
        assert!(glob.matches("cfg.(v1)+beta"));
        assert!(!glob.matches("cfgX(v1)+beta"));
    }

    #[test]
    fn test_pattern_without_wildcard_is_exact() {
        let glob = GlobPattern::new("exact").unwrap();
        assert!(glob.matches("exact"));
        assert!(!glob.matches("exactly"));
    }
}
