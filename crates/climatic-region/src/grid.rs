use std::time::Instant;

use climatic_tree::ClassificationId;
use rayon::prelude::*;

use crate::layout::{RegionCoord, RegionLayout};

/// Dominant classification of every tile in one region, row-major by local z.
///
/// Immutable once built; the cache hands out `Arc<RegionGrid>`.
#[derive(Debug)]
pub struct RegionGrid {
    coord: RegionCoord,
    tiles: usize,
    ids: Box<[ClassificationId]>,
    pub build_time_us: u32,
}

impl RegionGrid {
    /// Evaluate `classify` for every tile of `coord`, one rayon task per row.
    pub fn build<F>(coord: RegionCoord, layout: RegionLayout, classify: F) -> Self
    where
        F: Fn(i32, i32) -> ClassificationId + Sync,
    {
        let start = Instant::now();
        let n = layout.region_tiles() as usize;
        let (ox, oz) = layout.origin_tile(coord);
        let mut ids = vec![ClassificationId::default(); n * n];
        ids.par_chunks_mut(n).enumerate().for_each(|(lz, row)| {
            let tz = oz.wrapping_add(lz as i32);
            for (lx, slot) in row.iter_mut().enumerate() {
                *slot = classify(ox.wrapping_add(lx as i32), tz);
            }
        });
        Self {
            coord,
            tiles: n,
            ids: ids.into_boxed_slice(),
            build_time_us: start.elapsed().as_micros().min(u128::from(u32::MAX)) as u32,
        }
    }

    #[inline]
    pub fn coord(&self) -> RegionCoord {
        self.coord
    }

    /// Tiles along one side.
    #[inline]
    pub fn tiles(&self) -> usize {
        self.tiles
    }

    /// # Panics
    ///
    /// Panics if either offset is outside the region.
    #[inline]
    pub fn get(&self, local_x: usize, local_z: usize) -> ClassificationId {
        assert!(local_x < self.tiles && local_z < self.tiles, "local tile out of range");
        self.ids[local_z * self.tiles + local_x]
    }

    #[inline]
    pub fn ids(&self) -> &[ClassificationId] {
        &self.ids
    }
}
