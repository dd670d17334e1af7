//! Single-frame render cache.
//!
//! Holds the most recent frame together with the parameters that produced
//! it. A lookup with any differing parameter clears the entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::compositor::RenderedFrame;
use crate::error::RenderResult;

/// Parameters a cached frame depends on. Compared by exact equality.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCacheKey {
    pub width: usize,
    pub height: usize,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Identifier of the data layer (variable, time step, palette).
    pub layer: String,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct RenderCache {
    entry: Option<(RenderCacheKey, Arc<RenderedFrame>)>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached frame for `key`. A stale entry is dropped on lookup.
    pub fn get(&mut self, key: &RenderCacheKey) -> Option<Arc<RenderedFrame>> {
        if let Some((cached_key, frame)) = &self.entry {
            if cached_key == key {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(frame));
            }
        }
        self.invalidate();
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `frame` as the only entry.
    pub fn insert(&mut self, key: RenderCacheKey, frame: RenderedFrame) -> Arc<RenderedFrame> {
        let frame = Arc::new(frame);
        self.entry = Some((key, Arc::clone(&frame)));
        frame
    }

    /// Drop the cached frame.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Render cache invalidated");
        }
    }

    /// Return the cached frame for `key`, rendering and storing it on a miss.
    pub fn get_or_render<F>(&mut self, key: RenderCacheKey, render: F) -> RenderResult<Arc<RenderedFrame>>
    where
        F: FnOnce() -> RenderResult<RenderedFrame>,
    {
        if let Some(frame) = self.get(&key) {
            return Ok(frame);
        }
        let frame = render()?;
        Ok(self.insert(key, frame))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entries: usize::from(self.entry.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(scale: f64, layer: &str) -> RenderCacheKey {
        RenderCacheKey {
            width: 64,
            height: 32,
            scale,
            offset_x: 0.0,
            offset_y: 0.0,
            layer: layer.to_string(),
        }
    }

    fn frame() -> RenderedFrame {
        RenderedFrame::allocate(2, 2, 1).unwrap()
    }

    #[test]
    fn test_hit_after_insert() {
        let mut cache = RenderCache::new();
        assert!(cache.get(&key(1.0, "t2m")).is_none());
        cache.insert(key(1.0, "t2m"), frame());
        assert!(cache.get(&key(1.0, "t2m")).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_changed_parameters_clear_entry() {
        let mut cache = RenderCache::new();
        cache.insert(key(1.0, "t2m"), frame());

        assert!(cache.get(&key(1.5, "t2m")).is_none());
        assert!(cache.is_empty());
        // The original key no longer hits either.
        assert!(cache.get(&key(1.0, "t2m")).is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_layer_change_invalidates() {
        let mut cache = RenderCache::new();
        cache.insert(key(1.0, "t2m"), frame());
        assert!(cache.get(&key(1.0, "precip")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_render_renders_once() {
        let mut cache = RenderCache::new();
        let mut renders = 0;
        for _ in 0..3 {
            cache
                .get_or_render(key(2.0, "t2m"), || {
                    renders += 1;
                    Ok(frame())
                })
                .unwrap();
        }
        assert_eq!(renders, 1);
        assert_eq!(cache.stats().hits, 2);
    }
}
