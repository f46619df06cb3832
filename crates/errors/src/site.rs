//! Site configuration and structure-tree error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SiteError {
    #[error("invalid regular expression `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("invalid CSS selector `{selector}`")]
    InvalidSelector { selector: String },

    #[error("invalid expansion template `{template}`: {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("invalid structure definition: {message}")]
    InvalidStructure { message: String },

    #[error("once branched structure nodes cannot be merged in a single node")]
    MergeAfterBranch,

    #[error("file_content is only allowed on the last node of a chain")]
    FileContentOnInnerNode,

    #[error("start url {url} doesn't match any url matcher:\n{matchers}")]
    StartUrlNotMatched { url: String, matchers: String },

    #[error("url {url} doesn't match any structure node")]
    UrlNotMatched { url: String },

    #[error("assertion failed on {url}: selector `{selector}` matched nothing")]
    AssertionFailed { url: String, selector: String },

    #[error("unsafe file path component: {component}")]
    UnsafePathComponent { component: String },
}

impl UserFacingError for SiteError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRegex { .. }
            | Self::InvalidSelector { .. }
            | Self::InvalidTemplate { .. }
            | Self::InvalidStructure { .. }
            | Self::MergeAfterBranch
            | Self::FileContentOnInnerNode => {
                Some("Fix the structure definition in the site config file.")
            }
            Self::StartUrlNotMatched { .. } => {
                Some("Add a root structure node whose url matcher accepts the start url.")
            }
            Self::AssertionFailed { .. } => {
                Some("The page layout may have changed; update the assert selectors.")
            }
            _ => None,
        }
    }
}
