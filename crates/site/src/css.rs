//! CSS selector wrapper keeping the source text for error messages

use mscrape_errors::SiteError;
use scraper::Selector;

/// A compiled CSS selector plus its source text
#[derive(Debug, Clone)]
pub struct CssSelector {
    raw: String,
    selector: Selector,
}

impl CssSelector {
    /// Compile a CSS selector
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidSelector`] when the selector fails to
    /// parse.
    pub fn compile(raw: &str) -> Result<Self, SiteError> {
        let selector = Selector::parse(raw).map_err(|_| SiteError::InvalidSelector {
            selector: raw.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            selector,
        })
    }

    /// The compiled selector
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The selector as written in the site config
    #[must_use]
    pub fn source(&self) -> &str {
        &self.raw
    }
}
