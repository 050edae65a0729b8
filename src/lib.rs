//! Translation lookup with a per-language-pair file cache.
//!
//! [`LanguageCatalog`] resolves language codes and names, [`TranslationCache`]
//! persists translations keyed by normalized source text, and
//! [`TranslationService`] ties them to a [`Provider`].

pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod services;

pub use config::Config;
pub use error::{Result, TranslateError};
pub use model::language::{CatalogNode, LanguageField, LanguageRecord};
pub use model::translation::TranslationResult;
pub use services::catalog::LanguageCatalog;
pub use services::provider::{GoogleProvider, Provider};
pub use services::translate::{Translation, TranslationService};
pub use services::translation_cache::{normalize, store_name, CorruptStorePolicy, TranslationCache};
