use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use climatic_noise::ClimateParams;
use climatic_region::config::Region;
use climatic_region::{
    ClassificationService, EngineConfig, EngineError, GridSource, RegionCoord, RegionDirectory,
    RegionGrid, RegionLayout, TreeGridSource,
};
use climatic_tree::{ClassificationId, NodeDef, TreeDef, TreeRegistry};

fn patchwork() -> Arc<TreeRegistry> {
    let leaves = (1..=4).map(|b| (ClassificationId::new(b), 1));
    Arc::new(TreeRegistry::from_defs(vec![TreeDef::new("root", NodeDef::leaves(leaves))]).unwrap())
}

fn small_config(tiles: i32) -> EngineConfig {
    EngineConfig {
        root: "root".to_string(),
        region: Region { tiles },
        ..EngineConfig::default()
    }
}

fn directory(seed: u64, tiles: i32) -> RegionDirectory {
    RegionDirectory::from_config(patchwork(), &small_config(tiles), seed).unwrap()
}

struct CountingSource {
    inner: TreeGridSource,
    builds: AtomicUsize,
}

impl GridSource for CountingSource {
    fn layout(&self) -> RegionLayout {
        self.inner.layout()
    }

    fn build_region(&self, coord: RegionCoord) -> RegionGrid {
        self.builds.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        self.inner.build_region(coord)
    }
}

#[test]
fn degenerate_tree_classifies_every_tile_the_same() {
    let reg = TreeRegistry::from_defs(vec![TreeDef::new(
        "root",
        NodeDef::threshold(
            140.0,
            NodeDef::leaf(12),
            NodeDef::weighted([(NodeDef::leaf(12), 5)]),
        ),
    )])
    .unwrap();
    let service = ClassificationService::new(Arc::new(reg), small_config(256)).unwrap();
    assert_eq!(service.classify_tile(42, 10, 10), ClassificationId::new(12));
    assert_eq!(service.classify(42, 160, 170), ClassificationId::new(12));
    assert_eq!(service.classify_block(42, -5, 3), ClassificationId::new(12));
    let area = service.classify_area(42, 9, 9, 40, 24);
    assert!(area.ids().iter().all(|&id| id == ClassificationId::new(12)));
}

#[test]
fn concurrent_first_lookups_build_the_region_once() {
    let registry = patchwork();
    let root = registry.id_by_name("root").unwrap();
    let layout = RegionLayout::new(16).unwrap();
    let source = CountingSource {
        inner: TreeGridSource::new(registry, root, 42, &ClimateParams::default(), layout),
        builds: AtomicUsize::new(0),
    };
    let dir = RegionDirectory::new(source, 8, 42);
    let threads = 8;
    let barrier = Barrier::new(threads);

    let results: Vec<ClassificationId> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    dir.dominant_tile(3, 3)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(dir.source().builds.load(Ordering::SeqCst), 1);
    let stats = dir.cache_stats();
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, threads as u64);
}

#[test]
fn directories_for_one_seed_agree() {
    let a = directory(9, 16);
    let b = directory(9, 16);
    assert_eq!(a.classify_area(-20, 13, 70, 45), b.classify_area(-20, 13, 70, 45));
    for (x, z) in [(0, 0), (-1, -1), (4095, -4096), (123_456, -98_765)] {
        assert_eq!(a.classify_block(x, z), b.classify_block(x, z));
        assert_eq!(a.dominant_block(x, z), b.dominant_block(x, z));
    }
}

#[test]
fn blending_moves_boundaries_off_tile_edges() {
    let dir = directory(5, 16);
    let (tx, tz, size) = (-8, -8, 256usize);
    let area = dir.classify_area(tx, tz, size, size);
    let hard = |bx: usize, bz: usize| {
        dir.dominant_block(
            (area.origin_x + bx as i64) as i32,
            (area.origin_z + bz as i64) as i32,
        )
    };
    let soft = |bx: usize, bz: usize| area.get(bx, bz).unwrap();

    let mut changed = 0;
    for bz in 0..size {
        for bx in 0..size {
            if soft(bx, bz) != hard(bx, bz) {
                changed += 1;
            }
        }
    }
    let share = changed as f64 / (size * size) as f64;
    assert!(share > 0.0 && share < 0.9, "blended share {share}");

    // block pairs straddling a tile edge
    let (mut hard_steps, mut soft_steps) = (0, 0);
    for line in 0..size {
        for edge in (16..size).step_by(16) {
            for (a, b) in [((edge - 1, line), (edge, line)), ((line, edge - 1), (line, edge))] {
                if hard(a.0, a.1) != hard(b.0, b.1) {
                    hard_steps += 1;
                }
                if soft(a.0, a.1) != soft(b.0, b.1) {
                    soft_steps += 1;
                }
            }
        }
    }
    assert!(hard_steps > 0);
    assert!(soft_steps < hard_steps, "soft {soft_steps} vs hard {hard_steps}");
}

#[test]
fn unaligned_areas_match_single_block_queries() {
    let dir = directory(77, 8);
    for (x, z, sx, sz) in [(-37, 5, 19, 33), (0, 0, 1, 1), (15, -1, 17, 2), (-129, -130, 40, 3)] {
        let grid = dir.classify_unaligned_area(x, z, sx, sz);
        assert_eq!((grid.origin_x, grid.origin_z), (i64::from(x), i64::from(z)));
        assert_eq!((grid.size_x, grid.size_z), (sx, sz));
        for dz in 0..sz {
            for dx in 0..sx {
                let (bx, bz) = (x + dx as i32, z + dz as i32);
                assert_eq!(grid.get(dx, dz), Some(dir.classify_block(bx, bz)), "block ({bx}, {bz})");
            }
        }
    }
}

#[test]
fn tile_grid_is_the_aligned_area_of_one_tile() {
    let dir = directory(3, 8);
    let tile = dir.tile_grid(-3, 7);
    let area = dir.classify_area(-3, 7, 16, 16);
    assert_eq!(&tile[..], area.ids());
    assert_eq!(area.get_world(-48, 112), Some(tile[0]));
    assert_eq!(area.get_world(-49, 112), None);
}

#[test]
fn empty_areas_are_empty() {
    let dir = directory(3, 8);
    let grid = dir.classify_area(0, 0, 0, 12);
    assert!(grid.ids().is_empty());
    assert_eq!(dir.cache_stats().builds, 0);
    assert!(dir.classify_unaligned_area(-3, 9, 5, 0).ids().is_empty());
}

#[test]
fn service_keeps_one_directory_per_seed() {
    let service = ClassificationService::new(patchwork(), small_config(8)).unwrap();
    let a = service.directory(1);
    assert!(Arc::ptr_eq(&a, &service.directory(1)));
    assert!(!Arc::ptr_eq(&a, &service.directory(2)));

    let differs = (0..64).any(|t| service.classify_tile(1, t, 0) != service.classify_tile(2, t, 0));
    assert!(differs, "two seeds produced identical rows");
    assert_eq!(
        service.classify_unaligned_area(1, -7, 3, 10, 10),
        service.directory(1).classify_unaligned_area(-7, 3, 10, 10)
    );
}

#[test]
fn unknown_root_is_reported() {
    let cfg = EngineConfig {
        root: "nowhere".to_string(),
        ..EngineConfig::default()
    };
    let err = ClassificationService::from_config(cfg).err().unwrap();
    assert!(matches!(err, EngineError::UnknownRoot(ref name) if name == "nowhere"));
}

#[test]
fn cache_capacity_bounds_resident_regions() {
    let cfg = EngineConfig {
        cache: climatic_region::config::Cache { capacity: 2 },
        ..small_config(8)
    };
    let dir = RegionDirectory::from_config(patchwork(), &cfg, 11).unwrap();
    let first = dir.classify_area(-40, -40, 16 * 24, 16);
    let stats = dir.cache_stats();
    assert!(stats.entries <= 2);
    assert!(stats.evictions > 0);
    // evicted regions rebuild to the same grid
    assert_eq!(dir.classify_area(-40, -40, 16 * 24, 16), first);
}

#[test]
fn many_seeds_share_one_bounded_cache() {
    let cfg = EngineConfig {
        cache: climatic_region::config::Cache { capacity: 1 },
        ..small_config(8)
    };
    let service = ClassificationService::new(patchwork(), cfg).unwrap();
    for seed in 0..50 {
        service.classify_tile(seed, 0, 0);
        assert!(service.cache_stats().entries <= 1);
    }
    let stats = service.cache_stats();
    assert_eq!(stats.builds, 50);
    assert_eq!(stats.evictions, 49);
    // an evicted seed rebuilds to the same classification
    let again = service.classify_tile(0, 0, 0);
    assert_eq!(again, service.directory(0).dominant_tile(0, 0));
}
