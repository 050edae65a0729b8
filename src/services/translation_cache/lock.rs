use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use tracing::warn;

use crate::error::{Result, TranslateError};

const RETRY_DELAY_MS: u64 = 25;
const MAX_WAIT_MS: u64 = 5_000;
const STALE_AFTER_SECS: u64 = 30;

/// Advisory lock over one store file, held for the duration of a
/// read-merge-write. The lock file is removed on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(store: &Path) -> Result<Self> {
        let path = lock_path(store);
        let mut waited = 0u64;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!(lock = %path.display(), "breaking stale cache lock");
                        if let Err(e) = fs::remove_file(&path) {
                            if e.kind() != ErrorKind::NotFound {
                                warn!(lock = %path.display(), "failed to remove stale cache lock: {e}");
                            }
                        }
                        continue;
                    }
                    if waited >= MAX_WAIT_MS {
                        return Err(TranslateError::cache_write(
                            store,
                            format!("timed out waiting for {}", path.display()),
                        ));
                    }
                    thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                    waited += RETRY_DELAY_MS;
                }
                Err(e) => return Err(TranslateError::cache_write(store, e)),
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_path(store: &Path) -> PathBuf {
    let mut p = store.to_path_buf();
    let file_name = match store.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "store".to_string(),
    };
    p.set_file_name(format!("{file_name}.lock"));
    p
}

fn is_stale(path: &Path) -> bool {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > Duration::from_secs(STALE_AFTER_SECS))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    #[test]
    fn lock_file_lives_next_to_store_and_is_released() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("en-fr.yml");

        let lock = StoreLock::acquire(&store).unwrap();
        assert!(dir.path().join("en-fr.yml.lock").exists());

        drop(lock);
        assert!(!dir.path().join("en-fr.yml.lock").exists());
    }

    #[test]
    fn second_acquire_waits_for_release() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("en-de.yml");

        let first = StoreLock::acquire(&store).unwrap();
        let store2 = store.clone();
        let handle = thread::spawn(move || StoreLock::acquire(&store2).map(|_| ()));

        thread::sleep(Duration::from_millis(100));
        drop(first);

        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("en-it.yml");
        let leftover = dir.path().join("en-it.yml.lock");
        fs::write(&leftover, "").unwrap();

        let old = SystemTime::now() - Duration::from_secs(STALE_AFTER_SECS * 4);
        filetime::set_file_mtime(&leftover, FileTime::from_system_time(old)).unwrap();

        let lock = StoreLock::acquire(&store).unwrap();
        assert!(leftover.exists());
        drop(lock);
        assert!(!leftover.exists());
    }

    #[test]
    fn fresh_foreign_lock_is_not_broken() {
        let dir = TempDir::new().unwrap();
        let held = dir.path().join("en-pt.yml.lock");
        fs::write(&held, "").unwrap();

        assert!(!is_stale(&held));
        assert!(held.exists());
    }
}
