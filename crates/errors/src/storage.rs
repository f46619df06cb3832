//! Local storage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("failed to create directory {path}: {message}")]
    DirectoryCreationFailed { path: String, message: String },

    #[error("failed to write file {path}: {message}")]
    WriteFailed { path: String, message: String },
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Check that save_dir exists and is writable.")
    }

    fn is_retryable(&self) -> bool {
        true
    }
}
