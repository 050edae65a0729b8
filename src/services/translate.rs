use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TranslateError};
use crate::model::language::LanguageRecord;
use crate::model::translation::TranslationResult;
use crate::services::catalog::LanguageCatalog;
use crate::services::provider::Provider;
use crate::services::translation_cache::{normalize, CorruptStorePolicy, TranslationCache};

/// Resolves languages, serves cached translations and falls back to the
/// provider on a miss.
pub struct TranslationService<P> {
    catalog: LanguageCatalog,
    provider: P,
    on_corrupt: CorruptStorePolicy,
}

impl<P: Provider> TranslationService<P> {
    pub fn new(catalog: LanguageCatalog, provider: P) -> Self {
        Self {
            catalog,
            provider,
            on_corrupt: CorruptStorePolicy::default(),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn corrupt_policy(&self) -> CorruptStorePolicy {
        self.on_corrupt
    }

    /// Translates `text` from `from` to `to`, consulting and filling the
    /// store under `cache_location` when one is given.
    pub fn translate(&self, text: &str, from: &str, to: &str, cache_location: Option<&Path>) -> Result<String> {
        let original = self.language(from)?;
        let target = self.language(to)?;
        self.run(text, original, target, cache_location)
    }

    pub fn translate_result(
        &self,
        text: &str,
        from: &str,
        to: &str,
        cache_location: Option<&Path>,
    ) -> Result<TranslationResult> {
        self.prepare(text, from, to, cache_location)?.into_result()
    }

    /// Resolves both languages now and defers the lookup until the
    /// translated text is first asked for.
    pub fn prepare(
        &self,
        text: &str,
        from: &str,
        to: &str,
        cache_location: Option<&Path>,
    ) -> Result<Translation<'_, P>> {
        Ok(Translation {
            service: self,
            original_language: self.language(from)?.clone(),
            translated_language: self.language(to)?.clone(),
            original_text: text.to_string(),
            cache_location: cache_location.map(Path::to_path_buf),
            translated: OnceCell::new(),
        })
    }

    fn language(&self, code: &str) -> Result<&LanguageRecord> {
        self.catalog
            .by_code(code)
            .ok_or_else(|| TranslateError::UnsupportedLanguage(code.to_string()))
    }

    fn run(
        &self,
        text: &str,
        from: &LanguageRecord,
        to: &LanguageRecord,
        cache_location: Option<&Path>,
    ) -> Result<String> {
        let key = normalize(text);

        // An empty key has nothing stable to index by: skip the cache both ways.
        let cache = match cache_location {
            Some(root) if !key.is_empty() => Some(TranslationCache::new(root).with_corrupt_policy(self.on_corrupt)),
            _ => None,
        };

        if let Some(cache) = &cache {
            if let Some(hit) = cache.get(&from.code, &to.code, &key)? {
                debug!(from = %from.code, to = %to.code, key = %key, "served from cache");
                return Ok(hit);
            }
        }

        let translated = self.provider.translate(&from.code, &to.code, text)?;

        if let Some(cache) = &cache {
            if let Err(e) = cache.put(&from.code, &to.code, &key, &translated) {
                warn!(from = %from.code, to = %to.code, "translation not cached: {e}");
            }
        }

        Ok(translated)
    }
}

/// A pending translation. The lookup runs on first access to
/// [`translated_text`](Self::translated_text) and its result is kept for the
/// life of the value; a failed lookup is not kept and runs again next time.
pub struct Translation<'a, P> {
    service: &'a TranslationService<P>,
    original_language: LanguageRecord,
    translated_language: LanguageRecord,
    original_text: String,
    cache_location: Option<PathBuf>,
    translated: OnceCell<String>,
}

impl<'a, P: Provider> Translation<'a, P> {
    pub fn translated_text(&self) -> Result<&str> {
        if let Some(t) = self.translated.get() {
            return Ok(t);
        }

        let t = self.lookup()?;
        Ok(self.translated.get_or_init(|| t))
    }

    pub fn is_resolved(&self) -> bool {
        self.translated.get().is_some()
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn original_language(&self) -> &LanguageRecord {
        &self.original_language
    }

    pub fn translated_language(&self) -> &LanguageRecord {
        &self.translated_language
    }

    pub fn cache_location(&self) -> Option<&Path> {
        self.cache_location.as_deref()
    }

    pub fn into_result(mut self) -> Result<TranslationResult> {
        let translated_text = match self.translated.take() {
            Some(t) => t,
            None => self.lookup()?,
        };

        Ok(TranslationResult {
            original_text: self.original_text,
            translated_text,
            original_language: self.original_language,
            translated_language: self.translated_language,
        })
    }

    fn lookup(&self) -> Result<String> {
        self.service.run(
            &self.original_text,
            &self.original_language,
            &self.translated_language,
            self.cache_location.as_deref(),
        )
    }
}
