use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// The catalog file is missing. Nothing can be resolved without it.
    #[error("supported languages catalog not found at {}", .0.display())]
    CatalogUnavailable(PathBuf),

    #[error("invalid languages catalog: {0}")]
    CatalogMalformed(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A store exists but could not be parsed during a lookup.
    #[error("corrupt cache store {}: {message}", path.display())]
    CacheCorrupt { path: PathBuf, message: String },

    #[error("failed to write cache store {}: {message}", path.display())]
    CacheWrite { path: PathBuf, message: String },

    #[error("translation provider failed: {0}")]
    ProviderFailure(String),

    #[error("config error: {0}")]
    Config(String),
}

impl TranslateError {
    /// Only provider failures are worth retrying by the caller; everything
    /// else is deterministic for the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranslateError::ProviderFailure(_))
    }

    pub(crate) fn cache_write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TranslateError::CacheWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_provider_failures_are_retryable() {
        assert!(TranslateError::ProviderFailure("timeout".into()).is_retryable());
        assert!(!TranslateError::UnsupportedLanguage("xx".into()).is_retryable());
        assert!(!TranslateError::CatalogUnavailable(PathBuf::from("x.json")).is_retryable());
    }

    #[test]
    fn messages_name_the_offending_path() {
        let e = TranslateError::CacheCorrupt {
            path: PathBuf::from("/tmp/cache/en-fr.yml"),
            message: "bad indentation".into(),
        };
        let s = e.to_string();
        assert!(s.contains("en-fr.yml"));
        assert!(s.contains("bad indentation"));
    }
}
