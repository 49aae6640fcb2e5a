// Freshness-aware cache store.
// Keeps one file per key; the file's modification time is the entry's write stamp.

use std::fs::{self, File};
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{FilterError, Result};

use super::paths::{entry_path, temp_path};

/// TTL for documentation indexes: 7 days.
pub const DOCS_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// How long an entry stays valid for one particular lookup.
///
/// The policy is never stored with the entry, so changing it changes the
/// validity of entries that are already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshnessPolicy {
    ttl: Option<Duration>,
}

impl FreshnessPolicy {
    /// Entries older than `ttl` are treated as absent.
    pub const fn ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }

    /// Entries never expire.
    pub const fn forever() -> Self {
        Self { ttl: None }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.ttl
    }

    /// Check whether an entry written at `stored_at` is still valid at `now`.
    pub fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return true;
        };

        // A stamp in the future (clock skew) counts as brand new.
        let age = now
            .signed_duration_since(stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        age <= ttl
    }
}

/// A stored payload and the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, policy: FreshnessPolicy, now: DateTime<Utc>) -> bool {
        policy.is_fresh(self.stored_at, now)
    }
}

/// Disk-backed key/value store with per-lookup freshness.
///
/// Entries are never evicted; the directory grows with every new key.
#[derive(Debug, Clone)]
pub struct FreshnessCache {
    dir: PathBuf,
}

impl FreshnessCache {
    /// Create a cache rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the raw entry for `key`, regardless of its age.
    ///
    /// A missing file is `Ok(None)`; any other I/O failure is an error.
    pub fn entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = entry_path(&self.dir, key);

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FilterError::cache_io(key, e)),
        };

        let modified = file
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|e| FilterError::cache_io(key, e))?;

        let mut payload = Vec::new();
        file.read_to_end(&mut payload)
            .map_err(|e| FilterError::cache_io(key, e))?;

        Ok(Some(CacheEntry {
            key: key.to_string(),
            payload,
            stored_at: DateTime::<Utc>::from(modified),
        }))
    }

    /// Payload for `key` if it exists and is fresh under `policy`.
    pub fn get(&self, key: &str, policy: FreshnessPolicy) -> Result<Option<Vec<u8>>> {
        self.get_at(key, policy, Utc::now())
    }

    /// Same as [`get`](Self::get), evaluated at an explicit point in time.
    pub fn get_at(
        &self,
        key: &str,
        policy: FreshnessPolicy,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<u8>>> {
        match self.entry(key)? {
            Some(entry) if entry.is_fresh(policy, now) => Ok(Some(entry.payload)),
            Some(entry) => {
                debug!(key, stored_at = %entry.stored_at, "cache entry expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Write `payload` under `key`, replacing any previous entry.
    pub fn set(&self, key: &str, payload: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| FilterError::cache_io(key, e))?;

        // Write atomically via temp file
        let temp = temp_path(&self.dir, key);
        let path = entry_path(&self.dir, key);
        write_file(&temp, payload)
            .and_then(|_| fs::rename(&temp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp);
                FilterError::cache_io(key, e)
            })?;

        debug!(key, bytes = payload.len(), "cache entry written");
        Ok(())
    }

    /// Return the fresh payload for `key`, or run `producer` and store its output.
    ///
    /// A failing producer leaves the store untouched and its error is returned as is.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        policy: FreshnessPolicy,
        producer: F,
    ) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        if let Some(payload) = self.get(key, policy)? {
            debug!(key, "cache hit");
            return Ok(payload);
        }

        debug!(key, "cache miss");
        self.refresh(key, producer).await
    }

    /// Run `producer` without consulting the store, then store its output.
    pub async fn refresh<F, Fut>(&self, key: &str, producer: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let payload = producer().await?;
        self.set(key, &payload)?;
        Ok(payload)
    }
}

fn write_file(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn create_test_cache() -> (FreshnessCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FreshnessCache::new(temp_dir.path().join("cache"));
        (cache, temp_dir)
    }

    fn later(seconds: i64) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(seconds)
    }

    #[test]
    fn test_set_then_get_returns_payload() {
        let (cache, _temp_dir) = create_test_cache();
        let policy = FreshnessPolicy::ttl(Duration::from_secs(60));

        cache.set("page-1.json", b"[1,2,3]").unwrap();

        assert_eq!(
            cache.get("page-1.json", policy).unwrap(),
            Some(b"[1,2,3]".to_vec())
        );
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let (cache, _temp_dir) = create_test_cache();
        let policy = FreshnessPolicy::ttl(Duration::from_secs(60));

        cache.set("docs.data", b"{}").unwrap();

        assert!(cache.get_at("docs.data", policy, later(61)).unwrap().is_none());
        assert!(cache.get_at("docs.data", policy, later(30)).unwrap().is_some());
    }

    #[test]
    fn test_ttl_is_applied_at_read_time() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("docs.data", b"{}").unwrap();

        let now = later(120);
        let short = FreshnessPolicy::ttl(Duration::from_secs(60));
        let long = FreshnessPolicy::ttl(Duration::from_secs(600));

        assert!(cache.get_at("docs.data", short, now).unwrap().is_none());
        assert!(cache.get_at("docs.data", long, now).unwrap().is_some());
    }

    #[test]
    fn test_forever_policy_never_expires() {
        let policy = FreshnessPolicy::forever();
        let stored_at = Utc::now() - chrono::Duration::days(3650);

        assert!(policy.is_fresh(stored_at, Utc::now()));
        assert_eq!(policy.max_age(), None);
        assert_eq!(FreshnessPolicy::default(), policy);
    }

    #[test]
    fn test_future_stamp_counts_as_fresh() {
        let policy = FreshnessPolicy::ttl(Duration::ZERO);
        let now = Utc::now();

        assert!(policy.is_fresh(now + chrono::Duration::seconds(30), now));
        assert!(!policy.is_fresh(now - chrono::Duration::seconds(1), now));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let (cache, _temp_dir) = create_test_cache();

        assert!(cache.entry("nope").unwrap().is_none());
        assert!(
            cache
                .get("nope", FreshnessPolicy::forever())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_set_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = FreshnessCache::new(&nested);

        cache.set("key", b"value").unwrap();

        assert!(nested.join("key").exists());
        assert!(!nested.join(".key.tmp").exists());
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let (cache, _temp_dir) = create_test_cache();

        cache.set("key", b"first").unwrap();
        cache.set("key", b"second").unwrap();

        let entry = cache.entry("key").unwrap().unwrap();
        assert_eq!(entry.payload, b"second".to_vec());
        assert_eq!(entry.key, "key");
    }

    #[test]
    fn test_stored_at_is_write_time() {
        let (cache, _temp_dir) = create_test_cache();

        let before = Utc::now() - chrono::Duration::seconds(2);
        cache.set("key", b"value").unwrap();
        let after = Utc::now() + chrono::Duration::seconds(2);

        let entry = cache.entry("key").unwrap().unwrap();
        assert!(entry.stored_at >= before);
        assert!(entry.stored_at <= after);
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let (cache, _temp_dir) = create_test_cache();
        let policy = FreshnessPolicy::ttl(Duration::from_secs(60));
        cache.set("key", &[0, 159, 146, 150, 255]).unwrap();

        let first = cache.get("key", policy).unwrap();
        let second = cache.get("key", policy).unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_failure_is_not_a_miss() {
        let (cache, _temp_dir) = create_test_cache();
        fs::create_dir_all(cache.dir().join("broken")).unwrap();

        let result = cache.get("broken", FreshnessPolicy::forever());

        assert!(matches!(result, Err(FilterError::CacheIo { ref key, .. }) if key == "broken"));
    }

    #[tokio::test]
    async fn test_get_or_compute_runs_producer_once_within_ttl() {
        let (cache, _temp_dir) = create_test_cache();
        let policy = FreshnessPolicy::ttl(Duration::from_secs(60));
        let calls = Cell::new(0);

        for _ in 0..2 {
            let payload = cache
                .get_or_compute("key", policy, || async {
                    calls.set(calls.get() + 1);
                    Ok(b"computed".to_vec())
                })
                .await
                .unwrap();
            assert_eq!(payload, b"computed".to_vec());
        }

        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_producer_does_not_poison_cache() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("key", b"old").unwrap();
        let before = cache.entry("key").unwrap().unwrap();

        // Zero TTL so the old entry is stale and the producer runs.
        let policy = FreshnessPolicy::ttl(Duration::ZERO);
        std::thread::sleep(std::time::Duration::from_millis(20));

        let result = cache
            .get_or_compute("key", policy, || async {
                Err(FilterError::MissingConfig("GITHUB_USER"))
            })
            .await;

        assert!(matches!(result, Err(FilterError::MissingConfig("GITHUB_USER"))));
        let after = cache.entry("key").unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_refresh_skips_lookup_but_writes() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("key", b"old").unwrap();

        let payload = cache
            .refresh("key", || async { Ok(b"new".to_vec()) })
            .await
            .unwrap();

        assert_eq!(payload, b"new".to_vec());
        assert_eq!(
            cache.get("key", FreshnessPolicy::forever()).unwrap(),
            Some(b"new".to_vec())
        );
    }
}
