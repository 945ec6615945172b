use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use hashbrown::HashMap;

use crate::grid::RegionGrid;
use crate::layout::RegionCoord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// A region of one world seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegionKey {
    pub seed: u64,
    pub coord: RegionCoord,
}

impl RegionKey {
    #[inline]
    pub const fn new(seed: u64, coord: RegionCoord) -> Self {
        Self { seed, coord }
    }
}

type Slot = Arc<OnceLock<Arc<RegionGrid>>>;

/// Bounded LRU of region grids with at most one build in flight per region.
///
/// Keys carry the world seed, so one cache can serve every seed of a process
/// and its capacity bounds all resident grids. Callers that miss on the same
/// key share a build slot: the first one runs the builder, the rest block on
/// the slot and receive the same `Arc`. Locks are taken in the order pending,
/// entries, order.
pub struct RegionCache {
    entries: RwLock<HashMap<RegionKey, Arc<RegionGrid>>>,
    order: Mutex<VecDeque<RegionKey>>,
    pending: Mutex<HashMap<RegionKey, Slot>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    evictions: AtomicU64,
}

// Grids are immutable, so a panic while a lock was held cannot leave a
// half-written entry behind.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RegionCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
            pending: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: RegionKey) -> Option<Arc<RegionGrid>> {
        match self.lookup(&key) {
            Some(grid) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.touch(&key);
                Some(grid)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Return the cached grid for `key`, running `build` on a miss.
    ///
    /// Concurrent misses on one key run `build` once. The builder runs
    /// without any cache lock held, so builds of different regions overlap.
    pub fn get_or_build<F>(&self, key: RegionKey, build: F) -> Arc<RegionGrid>
    where
        F: FnOnce() -> RegionGrid,
    {
        if let Some(grid) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            self.touch(&key);
            return grid;
        }

        let slot = {
            let mut pending = lock(&self.pending);
            // a build may have finished between the lookup and taking the lock
            if let Some(grid) = self.lookup(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.touch(&key);
                return grid;
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            Arc::clone(pending.entry(key).or_insert_with(|| Arc::new(OnceLock::new())))
        };

        let mut built = false;
        let grid = Arc::clone(slot.get_or_init(|| {
            built = true;
            self.builds.fetch_add(1, Ordering::Relaxed);
            Arc::new(build())
        }));

        if built {
            let mut pending = lock(&self.pending);
            self.insert(key, Arc::clone(&grid));
            pending.remove(&key);
        }
        grid
    }

    pub fn insert(&self, key: RegionKey, grid: Arc<RegionGrid>) {
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.insert(key, grid);
        }
        {
            let mut order = lock(&self.order);
            if let Some(pos) = order.iter().position(|c| *c == key) {
                order.remove(pos);
            }
            order.push_back(key);
        }
        self.enforce_capacity();
    }

    #[inline]
    pub fn contains(&self, key: RegionKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegionCacheStats {
        RegionCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop every cached grid. Grids already handed out stay valid.
    pub fn clear(&self) {
        let evicted = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let len = entries.len() as u64;
            entries.clear();
            len
        };
        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }
        lock(&self.order).clear();
    }

    fn lookup(&self, key: &RegionKey) -> Option<Arc<RegionGrid>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn touch(&self, key: &RegionKey) {
        let mut order = lock(&self.order);
        if let Some(pos) = order.iter().position(|c| c == key) {
            if let Some(entry) = order.remove(pos) {
                order.push_back(entry);
            }
        }
    }

    fn enforce_capacity(&self) {
        let mut victims: Vec<RegionKey> = Vec::new();
        {
            let mut order = lock(&self.order);
            while order.len() > self.capacity {
                if let Some(old) = order.pop_front() {
                    victims.push(old);
                }
            }
        }
        if victims.is_empty() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in victims {
            if entries.remove(&key).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                log::trace!("evicted region ({}, {}) seed={}", key.coord.rx, key.coord.rz, key.seed);
            }
        }
    }
}
