use crate::def::{NodeDef, TreeDef};
use crate::id::ClassificationId;

pub const PLAINS: ClassificationId = ClassificationId::new(1);
pub const EXTREME_HILLS: ClassificationId = ClassificationId::new(3);
pub const FOREST: ClassificationId = ClassificationId::new(4);
pub const TAIGA: ClassificationId = ClassificationId::new(5);
pub const SWAMPLAND: ClassificationId = ClassificationId::new(6);
pub const ICE_PLAINS: ClassificationId = ClassificationId::new(12);
pub const ICE_MOUNTAINS: ClassificationId = ClassificationId::new(13);
pub const FOREST_HILLS: ClassificationId = ClassificationId::new(18);
pub const BIRCH_FOREST: ClassificationId = ClassificationId::new(27);
pub const COLD_TAIGA: ClassificationId = ClassificationId::new(30);
pub const EXTREME_HILLS_PLUS: ClassificationId = ClassificationId::new(34);
pub const SUNFLOWER_PLAINS: ClassificationId = ClassificationId::new(129);
pub const SWAMPLAND_M: ClassificationId = ClassificationId::new(134);
pub const ICE_SPIKES: ClassificationId = ClassificationId::new(140);
// variants layered on vanilla bases
pub const WARM_FOREST: ClassificationId = ClassificationId::pseudo(4, 1);
pub const WARM_FOREST_HILLS: ClassificationId = ClassificationId::pseudo(18, 1);
pub const PINE_WOODS: ClassificationId = ClassificationId::pseudo(5, 2);

/// Definitions of the stock trees. `overworld` bands temperature into the
/// other trees.
pub fn builtin_defs() -> Vec<TreeDef> {
    vec![
        TreeDef::new(
            "overworld",
            NodeDef::threshold(
                4.0,
                NodeDef::reference("tundra"),
                NodeDef::threshold(
                    8.0,
                    NodeDef::reference("cold_plains"),
                    NodeDef::threshold(
                        15.0,
                        NodeDef::reference("temperate"),
                        NodeDef::reference("subtropical_forest"),
                    ),
                ),
            ),
        ),
        TreeDef::new(
            "tundra",
            NodeDef::weighted([
                (NodeDef::leaf_id(ICE_PLAINS), 5),
                (
                    NodeDef::threshold(2.0, NodeDef::leaf_id(ICE_SPIKES), NodeDef::leaf_id(ICE_PLAINS)),
                    1,
                ),
                (
                    NodeDef::threshold(2.0, NodeDef::leaf_id(ICE_PLAINS), NodeDef::leaf_id(COLD_TAIGA)),
                    1,
                ),
            ]),
        ),
        TreeDef::new(
            "cold_plains",
            NodeDef::composite([(3, "alpine")], NodeDef::leaves([(PLAINS, 2)])),
        ),
        TreeDef::new(
            "alpine",
            NodeDef::threshold(
                6.0,
                NodeDef::leaves([(ICE_MOUNTAINS, 3), (ICE_PLAINS, 1)]),
                NodeDef::leaves([(EXTREME_HILLS, 3), (EXTREME_HILLS_PLUS, 1)]),
            ),
        ),
        TreeDef::new("swamp", NodeDef::leaves([(SWAMPLAND, 3), (SWAMPLAND_M, 1)])),
        TreeDef::new("plains", NodeDef::leaves([(PLAINS, 4), (SUNFLOWER_PLAINS, 1)])),
        TreeDef::new(
            "temperate",
            NodeDef::noise_threshold(
                7.0,
                NodeDef::weighted([
                    (NodeDef::reference("plains"), 2),
                    (NodeDef::reference("forest"), 2),
                    (NodeDef::leaf_id(BIRCH_FOREST), 1),
                ]),
                NodeDef::weighted([
                    (NodeDef::leaf_id(TAIGA), 1),
                    (NodeDef::reference("swamp"), 1),
                ]),
            ),
        ),
        TreeDef::new(
            "subtropical_forest",
            NodeDef::composite(
                [(5, "alpine"), (7, "swamp"), (12, "plains")],
                NodeDef::leaves([(WARM_FOREST, 5), (WARM_FOREST_HILLS, 3), (PINE_WOODS, 1)]),
            ),
        ),
        // wet lowland patches inside woods
        TreeDef::new(
            "forest",
            NodeDef::composite([(6, "swamp")], NodeDef::leaves([(FOREST, 3), (FOREST_HILLS, 1)])),
        ),
    ]
}
