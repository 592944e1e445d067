//! Bounded per-domain robots cache
//!
//! Entries expire after 24 hours. When full, the entries with the oldest
//! refresh time are dropped first.

use crate::robots::{DomainInfo, ParsedRobots, RobotsSource};
use crate::url::{domain_key, robots_url};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

pub const DEFAULT_CAPACITY: usize = 400;

pub const STALE_AFTER_HOURS: i64 = 24;

/// Cached robots data for a domain
#[derive(Debug, Clone)]
pub struct CachedDomain {
    pub info: Arc<DomainInfo>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,

    /// Insertion counter, orders entries fetched within the same instant
    sequence: u64,
}

impl CachedDomain {
    fn new(info: Arc<DomainInfo>, sequence: u64) -> Self {
        Self {
            info,
            fetched_at: Utc::now(),
            sequence,
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(STALE_AFTER_HOURS)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CachedDomain>,
    next_sequence: u64,
}

/// Process-wide robots cache, shared behind an `Arc`
pub struct DomainCache {
    capacity: usize,
    respect_robots: bool,
    source: Arc<dyn RobotsSource>,
    state: Mutex<CacheState>,
}

impl DomainCache {
    /// Creates a cache holding at most `capacity` domains (at least one)
    pub fn new(capacity: usize, source: Arc<dyn RobotsSource>) -> Self {
        Self {
            capacity: capacity.max(1),
            respect_robots: true,
            source,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// A cache that does not respect robots answers allow-all without fetching
    pub fn with_respect_robots(mut self, respect_robots: bool) -> Self {
        self.respect_robots = respect_robots;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Robots policy for the domain serving `url`
    ///
    /// The lock is never held while the robots file is fetched, so two callers
    /// may race on a cold domain; the later insert wins.
    pub async fn get_domain_info(&self, url: &str) -> Result<Arc<DomainInfo>> {
        let key = domain_key(url)?;
        let location = robots_url(url)?;

        if !self.respect_robots {
            return Ok(Arc::new(DomainInfo::allow_all(key, location)));
        }

        if let Some(entry) = self.lock().entries.get(&key) {
            if !entry.is_stale() {
                return Ok(Arc::clone(&entry.info));
            }
            debug!("Robots for {} are stale, refreshing", key);
        }

        let robots = match self.source.fetch_robots(&location).await {
            Some(contents) => ParsedRobots::from_content(&contents),
            None => {
                debug!("No robots.txt at {}, allowing all", location);
                ParsedRobots::allow_all()
            }
        };
        let info = Arc::new(DomainInfo::new(key.clone(), location, robots));

        self.insert(key, Arc::clone(&info));
        Ok(info)
    }

    /// Shortcut for `get_domain_info(url)?.is_allowed(url)`
    pub async fn is_allowed(&self, url: &str) -> Result<bool> {
        Ok(self.get_domain_info(url).await?.is_allowed(url))
    }

    fn insert(&self, key: String, info: Arc<DomainInfo>) {
        let mut state = self.lock();
        state.entries.remove(&key);

        if state.entries.len() >= self.capacity {
            let mut by_age: Vec<(DateTime<Utc>, u64, String)> = state
                .entries
                .iter()
                .map(|(domain, entry)| (entry.fetched_at, entry.sequence, domain.clone()))
                .collect();
            by_age.sort();

            let excess = state.entries.len() + 1 - self.capacity;
            for (_, _, domain) in by_age.into_iter().take(excess) {
                info!("Evicting robots for {}", domain);
                state.entries.remove(&domain);
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(key, CachedDomain::new(info, sequence));
    }

    pub fn contains(&self, url: &str) -> bool {
        domain_key(url)
            .map(|key| self.lock().entries.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached domain keys, oldest first
    pub fn domains(&self) -> Vec<String> {
        let state = self.lock();
        let mut entries: Vec<&CachedDomain> = state.entries.values().collect();
        entries.sort_by_key(|entry| (entry.fetched_at, entry.sequence));
        entries
            .into_iter()
            .map(|entry| entry.info.domain().to_string())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}

impl std::fmt::Debug for DomainCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainCache")
            .field("capacity", &self.capacity)
            .field("respect_robots", &self.respect_robots)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
