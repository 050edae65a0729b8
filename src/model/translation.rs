use serde::{Deserialize, Serialize};

use super::language::LanguageRecord;

/// Outcome of one translation request. Only `translated_text` is ever
/// written to a cache store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    pub original_language: LanguageRecord,
    pub translated_language: LanguageRecord,
}
