//! URL matchers: anchored regexes with owned capture groups

use mscrape_errors::SiteError;
use regex::Regex;
use std::collections::HashMap;

/// A successful url match with owned capture groups
///
/// Group 0 is the whole match. Captures are copied out of the haystack so
/// the match can travel with a queued request.
#[derive(Debug, Clone)]
pub struct UrlMatch {
    groups: Vec<Option<String>>,
    named: HashMap<String, Option<String>>,
}

impl UrlMatch {
    /// Positional capture group text
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Named capture group text
    #[must_use]
    pub fn named_group(&self, name: &str) -> Option<&str> {
        self.named.get(name).and_then(|g| g.as_deref())
    }

    /// The full matched text
    #[must_use]
    pub fn full_match(&self) -> &str {
        self.group(0).unwrap_or_default()
    }
}

/// A compiled url matcher
///
/// The pattern must match the whole URL, mirroring the way site structure
/// definitions pin down exact page families.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    raw: String,
    regex: Regex,
}

impl UrlMatcher {
    /// Compile a matcher from a regex pattern
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidRegex`] when the pattern fails to
    /// compile.
    pub fn compile(pattern: &str) -> Result<Self, SiteError> {
        // Anchor with a non-capturing group so user group numbering is kept
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|e| SiteError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    /// Match a URL, returning owned captures on success
    #[must_use]
    pub fn match_url(&self, url: &str) -> Option<UrlMatch> {
        let captures = self.regex.captures(url)?;
        let groups = captures
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let named = self
            .regex
            .capture_names()
            .flatten()
            .map(|name| {
                (
                    name.to_string(),
                    captures.name(name).map(|m| m.as_str().to_string()),
                )
            })
            .collect();
        Some(UrlMatch { groups, named })
    }

    /// The pattern as written in the site config
    #[must_use]
    pub fn source(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_only() {
        let matcher = UrlMatcher::compile(r"http://example\.com/\w+").unwrap();
        assert!(matcher.match_url("http://example.com/foo").is_some());
        assert!(matcher.match_url("http://example.com/foo/bar").is_none());
        assert!(matcher.match_url("xhttp://example.com/foo").is_none());
    }

    #[test]
    fn captures_are_owned() {
        let matcher = UrlMatcher::compile(r"http://e\.com/(\w+)/(?P<file>\w+\.jpg)").unwrap();
        let m = matcher.match_url("http://e.com/albums/cat.jpg").unwrap();
        assert_eq!(m.group(1), Some("albums"));
        assert_eq!(m.named_group("file"), Some("cat.jpg"));
        assert_eq!(m.full_match(), "http://e.com/albums/cat.jpg");
    }

    #[test]
    fn optional_group_is_none() {
        let matcher = UrlMatcher::compile(r"http://e\.com/(\?page=(\d+))?").unwrap();
        let m = matcher.match_url("http://e.com/").unwrap();
        assert_eq!(m.group(1), None);
        assert_eq!(m.group(2), None);

        let m = matcher.match_url("http://e.com/?page=3").unwrap();
        assert_eq!(m.group(2), Some("3"));
    }

    #[test]
    fn invalid_pattern_errors() {
        assert!(matches!(
            UrlMatcher::compile(r"http://example\.com/foo("),
            Err(SiteError::InvalidRegex { .. })
        ));
    }
}
