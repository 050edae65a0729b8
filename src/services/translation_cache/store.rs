use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::lock::StoreLock;
use crate::error::{Result, TranslateError};

pub const STORE_EXTENSION: &str = "yml";

type Entries = BTreeMap<String, String>;

/// What a lookup does when a store file exists but cannot be parsed.
/// Writes always start over from an empty mapping in that case.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStorePolicy {
    #[default]
    Fail,
    TreatAsEmpty,
}

pub fn store_name(source: &str, target: &str) -> String {
    format!("{source}-{target}.{STORE_EXTENSION}")
}

/// Translations persisted under one directory, one YAML file per ordered
/// language pair.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    root: PathBuf,
    on_corrupt: CorruptStorePolicy,
}

impl TranslationCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            on_corrupt: CorruptStorePolicy::default(),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn store_path(&self, source: &str, target: &str) -> PathBuf {
        self.root.join(store_name(source, target))
    }

    pub fn get(&self, source: &str, target: &str, key: &str) -> Result<Option<String>> {
        let path = self.store_path(source, target);
        let hit = self.read_for_lookup(&path)?.and_then(|mut m| m.remove(key));

        debug!(store = %path.display(), key, hit = hit.is_some(), "cache lookup");
        Ok(hit)
    }

    /// Every entry of one pair's store; empty when the store does not exist.
    pub fn entries(&self, source: &str, target: &str) -> Result<Entries> {
        let path = self.store_path(source, target);
        Ok(self.read_for_lookup(&path)?.unwrap_or_default())
    }

    /// Merges `key -> value` into the pair's store, replacing any previous
    /// value for `key` and keeping every other entry.
    pub fn put(&self, source: &str, target: &str, key: &str, value: &str) -> Result<()> {
        let path = self.store_path(source, target);

        fs::create_dir_all(&self.root).map_err(|e| TranslateError::cache_write(&self.root, e))?;

        let _lock = StoreLock::acquire(&path)?;

        let mut entries = load_for_write(&path);
        entries.insert(key.to_string(), value.to_string());

        let yaml = serde_yaml::to_string(&entries).map_err(|e| TranslateError::cache_write(&path, e))?;
        write_atomic(&path, yaml.as_bytes())?;

        debug!(store = %path.display(), key, entries = entries.len(), "cache store written");
        Ok(())
    }

    fn read_for_lookup(&self, path: &Path) -> Result<Option<Entries>> {
        if !path.exists() {
            return Ok(None);
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| parse(&data));

        match parsed {
            Ok(entries) => Ok(Some(entries)),
            Err(message) => match self.on_corrupt {
                CorruptStorePolicy::Fail => Err(TranslateError::CacheCorrupt {
                    path: path.to_path_buf(),
                    message,
                }),
                CorruptStorePolicy::TreatAsEmpty => {
                    warn!(store = %path.display(), "ignoring unparsable cache store: {message}");
                    Ok(None)
                }
            },
        }
    }
}

fn parse(data: &str) -> std::result::Result<Entries, String> {
    if data.trim().is_empty() {
        return Ok(Entries::new());
    }

    serde_yaml::from_str::<Option<Entries>>(data)
        .map(Option::unwrap_or_default)
        .map_err(|e| e.to_string())
}

fn load_for_write(path: &Path) -> Entries {
    if !path.exists() {
        return Entries::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(store = %path.display(), "failed to read cache store, rewriting it: {e}");
            return Entries::new();
        }
    };

    match parse(&data) {
        Ok(v) => v,
        Err(e) => {
            warn!(store = %path.display(), "failed to parse cache store, rewriting it: {e}");
            Entries::new()
        }
    }
}

/// Writes to a temp file beside `path` and renames it over the store, so
/// readers never observe a half-written file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TranslateError::cache_write(path, e))?;
    tmp.write_all(bytes).map_err(|e| TranslateError::cache_write(path, e))?;
    tmp.as_file().sync_all().map_err(|e| TranslateError::cache_write(path, e))?;
    tmp.persist(path).map_err(|e| TranslateError::cache_write(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_name_joins_codes() {
        assert_eq!(store_name("en", "fr"), "en-fr.yml");
        assert_eq!(store_name("zh-CN", "en"), "zh-CN-en.yml");
    }

    #[test]
    fn missing_store_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());
        assert_eq!(cache.get("en", "fr", "Hello").unwrap(), None);
        assert!(cache.entries("en", "fr").unwrap().is_empty());
    }

    #[test]
    fn put_creates_root_and_store() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("cache");
        let cache = TranslationCache::new(&root);

        cache.put("en", "fr", "Hello.World.", "Bonjour le monde!").unwrap();

        assert!(root.join("en-fr.yml").is_file());
        assert!(!root.join("en-fr.yml.lock").exists());
        assert_eq!(
            cache.get("en", "fr", "Hello.World.").unwrap().as_deref(),
            Some("Bonjour le monde!")
        );
    }

    #[test]
    fn put_merges_and_new_value_wins() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());

        cache.put("en", "fr", "k1", "one").unwrap();
        cache.put("en", "fr", "k2", "two").unwrap();
        cache.put("en", "fr", "k1", "uno").unwrap();

        let all = cache.entries("en", "fr").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["k1"], "uno");
        assert_eq!(all["k2"], "two");
    }

    #[test]
    fn pairs_are_ordered_and_separate() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());

        cache.put("en", "fr", "Hello", "Bonjour").unwrap();

        assert_eq!(cache.get("fr", "en", "Hello").unwrap(), None);
        assert_eq!(cache.get("en", "de", "Hello").unwrap(), None);
    }

    #[test]
    fn multiline_values_survive() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());
        let value = "ligne un\nligne deux: avec \"guillemets\"\n";

        cache.put("en", "fr", "line.one.line.two", value).unwrap();

        assert_eq!(cache.get("en", "fr", "line.one.line.two").unwrap().as_deref(), Some(value));
    }

    #[test]
    fn empty_or_null_store_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());

        fs::write(cache.store_path("en", "fr"), "").unwrap();
        assert_eq!(cache.get("en", "fr", "x").unwrap(), None);

        fs::write(cache.store_path("en", "fr"), "~\n").unwrap();
        assert_eq!(cache.get("en", "fr", "x").unwrap(), None);
    }

    #[test]
    fn corrupt_store_fails_lookup_by_default() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());
        fs::write(cache.store_path("en", "fr"), "- just\n- a list\n").unwrap();

        let err = cache.get("en", "fr", "x").unwrap_err();
        assert!(matches!(err, TranslateError::CacheCorrupt { .. }));
    }

    #[test]
    fn corrupt_store_can_be_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path()).with_corrupt_policy(CorruptStorePolicy::TreatAsEmpty);
        fs::write(cache.store_path("en", "fr"), "- just\n- a list\n").unwrap();

        assert_eq!(cache.get("en", "fr", "x").unwrap(), None);
    }

    #[test]
    fn put_overwrites_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let cache = TranslationCache::new(dir.path());
        fs::write(cache.store_path("en", "fr"), ": : :\n\t- [").unwrap();

        cache.put("en", "fr", "Hi", "Salut").unwrap();

        assert_eq!(cache.get("en", "fr", "Hi").unwrap().as_deref(), Some("Salut"));
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let p: CorruptStorePolicy = serde_json::from_str("\"treat_as_empty\"").unwrap();
        assert_eq!(p, CorruptStorePolicy::TreatAsEmpty);
    }
}
