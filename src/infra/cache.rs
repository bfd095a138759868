//! Persistent on-disk caching for the turn-in candidate catalog.
//!
//! The item sheet only changes with game patches, so search results for a
//! given minimum level are reusable across scans; a daily refresh keeps
//! newly released gear from being missed for long.

use std::{
    fs,
    path::PathBuf,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::domain::ItemCandidate;

const CACHE_FILENAME: &str = "candidate_cache.json";

/// Cache TTL: 24 hours.
pub const CANDIDATE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cached candidate search results with TTL tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateCache {
    /// Minimum item level the cached search was run with; a scan for a
    /// different level must bypass the cache.
    pub min_item_level: u16,
    /// Unix timestamp (seconds) when this cache was created.
    pub cached_at: u64,
    pub items: Vec<ItemCandidate>,
}

impl CandidateCache {
    /// Create a new cache with the current timestamp.
    pub fn new(min_item_level: u16, items: Vec<ItemCandidate>) -> Self {
        let cached_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            min_item_level,
            cached_at,
            items,
        }
    }

    /// Check if the cache has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        self.age() > CANDIDATE_CACHE_TTL
    }

    pub fn age(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Duration::from_secs(now.saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Get the cache file path (in the app data directory).
fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seal-scanner");

        let _ = fs::create_dir_all(&base);

        base.join(CACHE_FILENAME)
    })
    .clone()
}

/// Load the candidate cache from disk, if it exists and parses.
pub fn load_candidate_cache() -> Option<CandidateCache> {
    let path = cache_path();

    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<CandidateCache>(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                println!("[cache] Failed to parse candidate cache: {e}");
                None
            }
        },
        Err(e) => {
            println!("[cache] Failed to read candidate cache: {e}");
            None
        }
    }
}

/// Save the candidate cache to disk.
pub fn save_candidate_cache(cache: &CandidateCache) -> Result<(), std::io::Error> {
    let path = cache_path();
    let content = serde_json::to_string(cache)?; // compact, not pretty (can be large)
    fs::write(&path, content)?;
    println!(
        "[cache] Saved {} candidates (>= ilvl {}) to {}",
        cache.items.len(),
        cache.min_item_level,
        path.display()
    );
    Ok(())
}

/// Delete the cache file, forcing the next scan to query the API.
pub fn clear_candidate_cache() -> Result<(), std::io::Error> {
    let path = cache_path();
    if path.exists() {
        fs::remove_file(&path)?;
        println!("[cache] Cleared candidate cache at {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshly_created_cache_is_not_expired() {
        let cache = CandidateCache::new(580, Vec::new());
        assert!(!cache.is_expired());
        assert!(cache.age() < Duration::from_secs(5));
    }

    #[test]
    fn old_cache_reports_expired() {
        let mut cache = CandidateCache::new(580, Vec::new());
        cache.cached_at -= 2 * 24 * 60 * 60;
        assert!(cache.is_expired());
        assert_eq!(cache.age_string(), "2d");
    }
}
