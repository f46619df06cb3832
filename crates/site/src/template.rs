//! Capture-group expansion templates
//!
//! Templates reference regex capture groups with `$1` / `${name}`; `$$` is
//! a literal dollar sign. Expanded against a [`UrlMatch`], each reference
//! is replaced with the group's text (empty for unmatched groups).
//! Expanded without a match the template yields its literal text, which is
//! what lets a static `file_path = "images"` work on nodes whose matcher
//! captures nothing.

use crate::matcher::UrlMatch;
use mscrape_errors::SiteError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(usize),
    Named(String),
}

/// A compiled expansion template
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Compile a template, validating its `$` references
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidTemplate`] for a dangling or malformed
    /// `$` reference.
    pub fn compile(raw: &str) -> Result<Self, SiteError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            match chars.peek() {
                Some('$') => {
                    chars.next();
                    literal.push('$');
                }
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
                            _ => {
                                return Err(SiteError::InvalidTemplate {
                                    template: raw.to_string(),
                                    message: "unterminated ${...} reference".to_string(),
                                })
                            }
                        }
                    }
                    if name.is_empty() {
                        return Err(SiteError::InvalidTemplate {
                            template: raw.to_string(),
                            message: "empty ${} reference".to_string(),
                        });
                    }
                    flush_literal(&mut segments, &mut literal);
                    if let Ok(index) = name.parse::<usize>() {
                        segments.push(Segment::Group(index));
                    } else {
                        segments.push(Segment::Named(name));
                    }
                }
                Some(c) if c.is_ascii_digit() => {
                    let mut digits = String::new();
                    while let Some(c) = chars.peek() {
                        if c.is_ascii_digit() {
                            digits.push(*c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    flush_literal(&mut segments, &mut literal);
                    let index = digits.parse::<usize>().map_err(|e| {
                        SiteError::InvalidTemplate {
                            template: raw.to_string(),
                            message: e.to_string(),
                        }
                    })?;
                    segments.push(Segment::Group(index));
                }
                _ => {
                    return Err(SiteError::InvalidTemplate {
                        template: raw.to_string(),
                        message: "dangling `$`; use `$$` for a literal dollar".to_string(),
                    })
                }
            }
        }
        flush_literal(&mut segments, &mut literal);

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Expand against a url match; `None` yields the literal template text
    #[must_use]
    pub fn expand(&self, url_match: Option<&UrlMatch>) -> String {
        let Some(url_match) = url_match else {
            return self.raw.clone();
        };

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(index) => {
                    if let Some(text) = url_match.group(*index) {
                        out.push_str(text);
                    }
                }
                Segment::Named(name) => {
                    if let Some(text) = url_match.named_group(name) {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }

    /// The template source text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn flush_literal(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::UrlMatcher;

    fn match_url(pattern: &str, url: &str) -> UrlMatch {
        UrlMatcher::compile(pattern)
            .unwrap()
            .match_url(url)
            .unwrap()
    }

    #[test]
    fn expands_numbered_groups() {
        let template = Template::compile("$1.jpg").unwrap();
        let m = match_url(r"http://example\.com/contents/(\w+)", "http://example.com/contents/foo");
        assert_eq!(template.expand(Some(&m)), "foo.jpg");
    }

    #[test]
    fn expands_named_groups() {
        let template = Template::compile("page-${num}").unwrap();
        let m = match_url(
            r"http://example\.com/\?page=(?P<num>\d+)",
            "http://example.com/?page=7",
        );
        assert_eq!(template.expand(Some(&m)), "page-7");
    }

    #[test]
    fn unmatched_group_expands_empty() {
        let template = Template::compile("p$2-").unwrap();
        let m = match_url(r"http://e\.com/(a)(b)?", "http://e.com/a");
        assert_eq!(template.expand(Some(&m)), "p-");
    }

    #[test]
    fn without_match_yields_literal_text() {
        let template = Template::compile("bar-$1").unwrap();
        assert_eq!(template.expand(None), "bar-$1");
    }

    #[test]
    fn dollar_escape() {
        let template = Template::compile("a$$b").unwrap();
        let m = match_url(r"(x)", "x");
        assert_eq!(template.expand(Some(&m)), "a$b");
    }

    #[test]
    fn dangling_dollar_rejected() {
        assert!(Template::compile("broken$").is_err());
        assert!(Template::compile("broken$x").is_err());
        assert!(Template::compile("broken${").is_err());
    }
}
