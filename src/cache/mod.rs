//! In-memory read cache for the portfolio collections.
//!
//! One slot per collection (projects, categories, tags), each with its own
//! staleness clock. Any successful portfolio write clears all three slots;
//! invalidation is advisory and process-local.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::{Category, Project, Tag};

struct Slot<T> {
    items: Vec<T>,
    fetched_at: Instant,
}

/// TTL-gated snapshots of the three portfolio collections.
pub struct CatalogCache {
    ttl: Duration,
    projects: RwLock<Option<Slot<Project>>>,
    categories: RwLock<Option<Slot<Category>>>,
    tags: RwLock<Option<Slot<Tag>>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            projects: RwLock::new(None),
            categories: RwLock::new(None),
            tags: RwLock::new(None),
        }
    }

    /// Cached projects, if the projects slot is younger than the TTL.
    pub fn projects(&self) -> Option<Vec<Project>> {
        fresh(&self.projects, self.ttl)
    }

    pub fn put_projects(&self, items: Vec<Project>) {
        store(&self.projects, items);
    }

    /// Cached categories, if the categories slot is younger than the TTL.
    pub fn categories(&self) -> Option<Vec<Category>> {
        fresh(&self.categories, self.ttl)
    }

    pub fn put_categories(&self, items: Vec<Category>) {
        store(&self.categories, items);
    }

    /// Cached tags, if the tags slot is younger than the TTL.
    pub fn tags(&self) -> Option<Vec<Tag>> {
        fresh(&self.tags, self.ttl)
    }

    pub fn put_tags(&self, items: Vec<Tag>) {
        store(&self.tags, items);
    }

    /// Cached categories regardless of age. For synchronous, cache-only
    /// lookups that must never force a fetch.
    pub fn peek_categories(&self) -> Option<Vec<Category>> {
        peek(&self.categories)
    }

    /// Cached tags regardless of age.
    pub fn peek_tags(&self) -> Option<Vec<Tag>> {
        peek(&self.tags)
    }

    /// Drop all three snapshots. Called after every successful write.
    pub fn invalidate(&self) {
        clear(&self.projects);
        clear(&self.categories);
        clear(&self.tags);
    }
}

fn fresh<T: Clone>(slot: &RwLock<Option<Slot<T>>>, ttl: Duration) -> Option<Vec<T>> {
    let guard = read_lock(slot);
    match guard.as_ref() {
        Some(slot) if slot.fetched_at.elapsed() < ttl => Some(slot.items.clone()),
        _ => None,
    }
}

fn peek<T: Clone>(slot: &RwLock<Option<Slot<T>>>) -> Option<Vec<T>> {
    let guard = read_lock(slot);
    guard.as_ref().map(|slot| slot.items.clone())
}

fn store<T>(slot: &RwLock<Option<Slot<T>>>, items: Vec<T>) {
    let mut guard = write_lock(slot);
    *guard = Some(Slot {
        items,
        fetched_at: Instant::now(),
    });
}

fn clear<T>(slot: &RwLock<Option<Slot<T>>>) {
    let mut guard = write_lock(slot);
    *guard = None;
}

fn read_lock<T>(slot: &RwLock<Option<Slot<T>>>) -> std::sync::RwLockReadGuard<'_, Option<Slot<T>>> {
    match slot.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(
    slot: &RwLock<Option<Slot<T>>>,
) -> std::sync::RwLockWriteGuard<'_, Option<Slot<T>>> {
    match slot.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
