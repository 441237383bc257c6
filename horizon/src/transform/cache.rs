//! Hysteresis between per-frame direct mapping and a cached coordinate map.
//!
//! A hit counter moves up by one for every frame whose rotation matches the
//! previous frame and down by one for every frame where it changed. The
//! cached path is only worth it once the rotation has been stable for a
//! while; the counter keeps the choice from flapping on every change.

use crate::math::Matrix3;

use super::mapping::CoordinateMap;

/// Upper bound of the hit counter.
pub const MAP_HITS_MAX: u32 = 32;
/// Counter value of a fresh cache.
pub const MAP_HITS_INITIAL: u32 = 24;
/// Counter value at which the cached path is entered from [`MapMode::Direct`].
pub const ENTER_CACHED_HITS: u32 = 17;
/// Counter value at which the cached path is left for [`MapMode::Direct`].
pub const EXIT_CACHED_HITS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Source coordinates are recomputed for every pixel of every frame.
    Direct,
    /// Frames are sampled through a [`CoordinateMap`].
    Cached,
}

/// Lifecycle of the stored map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    NoMap,
    /// Built for an earlier rotation. The allocation is reused on rebuild.
    Stale,
    Fresh,
}

#[derive(Debug)]
pub struct MapCache {
    hits: u32,
    mode: MapMode,
    map: Option<CoordinateMap>,
    stale: bool,
    last_rotation: Option<Matrix3>,
}

impl Default for MapCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCache {
    pub fn new() -> Self {
        Self {
            hits: MAP_HITS_INITIAL,
            mode: mode_for_initial(MAP_HITS_INITIAL),
            map: None,
            stale: false,
            last_rotation: None,
        }
    }

    #[inline]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    #[inline]
    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn state(&self) -> MapState {
        match (&self.map, self.stale) {
            (None, _) => MapState::NoMap,
            (Some(_), true) => MapState::Stale,
            (Some(_), false) => MapState::Fresh,
        }
    }

    /// Records the rotation of the next frame and returns the path to take.
    pub fn observe(&mut self, rotation: &Matrix3) -> MapMode {
        if self.last_rotation.as_ref() == Some(rotation) {
            self.hits = (self.hits + 1).min(MAP_HITS_MAX);
        } else {
            self.hits = self.hits.saturating_sub(1);
            self.last_rotation = Some(*rotation);
            self.stale = true;
        }

        let next = match self.mode {
            MapMode::Direct if self.hits >= ENTER_CACHED_HITS => MapMode::Cached,
            MapMode::Cached if self.hits <= EXIT_CACHED_HITS => MapMode::Direct,
            mode => mode,
        };
        if next != self.mode {
            tracing::debug!(
                hits = self.hits,
                from = ?self.mode,
                to = ?next,
                "Coordinate map mode changed"
            );
            self.mode = next;
        }
        self.mode
    }

    /// Returns a map that is current for `rotation` at the given size,
    /// rebuilding it if stale, absent, or sized for another frame.
    pub fn fresh_map(&mut self, width: usize, height: usize, rotation: &Matrix3) -> &CoordinateMap {
        if !matches!(&self.map, Some(map) if map.width() == width && map.height() == height) {
            self.map = None;
        }
        let stale = std::mem::replace(&mut self.stale, false);

        let mut built = false;
        let map = self.map.get_or_insert_with(|| {
            built = true;
            tracing::debug!(width, height, "Allocating coordinate map");
            CoordinateMap::new(width, height, rotation)
        });
        if stale && !built {
            map.rebuild(rotation);
        }
        map
    }

    /// Drops the map, e.g. when the frame size changes.
    pub fn invalidate(&mut self) {
        self.map = None;
        self.stale = false;
    }
}

fn mode_for_initial(hits: u32) -> MapMode {
    if hits >= ENTER_CACHED_HITS {
        MapMode::Cached
    } else {
        MapMode::Direct
    }
}
