use climatic_noise::{Climate, SpatialNoise};
use climatic_tree::builtin::{ICE_PLAINS, ICE_SPIKES};
use climatic_tree::{ClassificationId, NodeDef, TileContext, TreeDef, TreeError, TreeRegistry};

fn single(node: NodeDef) -> TreeRegistry {
    TreeRegistry::from_defs(vec![TreeDef::new("root", node)]).expect("registry")
}

fn classify_at(reg: &TreeRegistry, tree: &str, x: i32, z: i32, climate: Climate) -> ClassificationId {
    let id = reg.id_by_name(tree).expect("tree");
    let mut ctx = TileContext::new(x, z, SpatialNoise::new(42), climate);
    reg.classify(id, &mut ctx)
}

#[test]
fn threshold_sends_boundary_value_high() {
    let reg = single(NodeDef::threshold(2.0, NodeDef::leaf(1), NodeDef::leaf(2)));
    assert_eq!(classify_at(&reg, "root", 0, 0, Climate::new(2.0, 0.0)), ClassificationId::new(2));
    assert_eq!(classify_at(&reg, "root", 0, 0, Climate::new(1.0, 0.0)), ClassificationId::new(1));
    assert_eq!(
        classify_at(&reg, "root", 0, 0, Climate::new(1.999, 0.0)),
        ClassificationId::new(1)
    );
}

#[test]
fn noise_threshold_ignores_temperature() {
    let reg = single(NodeDef::noise_threshold(5.0, NodeDef::leaf(1), NodeDef::leaf(2)));
    assert_eq!(classify_at(&reg, "root", 0, 0, Climate::new(100.0, 4.0)), ClassificationId::new(1));
    assert_eq!(classify_at(&reg, "root", 0, 0, Climate::new(0.0, 5.0)), ClassificationId::new(2));
}

#[test]
fn degenerate_tree_always_resolves_to_its_only_id() {
    let reg = single(NodeDef::threshold(
        140.0,
        NodeDef::leaf(12),
        NodeDef::weighted([(NodeDef::leaf(12), 5)]),
    ));
    for (i, t) in [0.0, 139.0, 140.0, 1e6].into_iter().enumerate() {
        let id = classify_at(&reg, "root", 10 + i as i32, 10, Climate::new(t, 0.0));
        assert_eq!(id, ClassificationId::new(12));
    }
}

#[test]
fn weighted_children_follow_weights() {
    let reg = single(NodeDef::weighted([(NodeDef::leaf(1), 3), (NodeDef::leaf(2), 1)]));
    let samples = 40_000;
    let mut first = 0;
    for i in 0..samples {
        let id = classify_at(&reg, "root", i % 200 - 100, i / 200 - 100, Climate::default());
        if id == ClassificationId::new(1) {
            first += 1;
        }
    }
    let share = first as f64 / samples as f64;
    assert!((0.72..0.78).contains(&share), "share of heavy child {share}");
}

#[test]
fn list_order_decides_which_child_owns_a_seed() {
    let a = single(NodeDef::weighted([(NodeDef::leaf(1), 1), (NodeDef::leaf(2), 1)]));
    let b = single(NodeDef::weighted([(NodeDef::leaf(2), 1), (NodeDef::leaf(1), 1)]));
    for i in 0..256 {
        let ia = classify_at(&a, "root", i, -i, Climate::default());
        let ib = classify_at(&b, "root", i, -i, Climate::default());
        assert_ne!(ia, ib, "same seed must land on the same slot, not the same id");
    }
}

#[test]
fn composite_defers_about_one_in_modulus() {
    let reg = TreeRegistry::from_defs(vec![
        TreeDef::new("cold", NodeDef::composite([(3, "alpine")], NodeDef::leaf(1))),
        TreeDef::new("alpine", NodeDef::leaf(13)),
    ])
    .unwrap();
    let samples = 30_000;
    let mut deferred = 0;
    for i in 0..samples {
        if classify_at(&reg, "cold", i, 7, Climate::default()) == ClassificationId::new(13) {
            deferred += 1;
        }
    }
    let share = deferred as f64 / samples as f64;
    assert!((0.30..0.37).contains(&share), "deferred share {share}");
}

#[test]
fn each_decision_draws_a_fresh_seed() {
    let reg = TreeRegistry::from_defs(vec![
        TreeDef::new(
            "root",
            NodeDef::composite(
                [(1_000_000_007, "other")],
                NodeDef::weighted([(NodeDef::weighted([(NodeDef::leaf(1), 1), (NodeDef::leaf(2), 1)]), 1)]),
            ),
        ),
        TreeDef::new("other", NodeDef::leaf(9)),
    ])
    .unwrap();
    let root = reg.id_by_name("root").unwrap();
    let mut ctx = TileContext::new(4, 4, SpatialNoise::new(3), Climate::default());
    reg.classify(root, &mut ctx);
    // composite + two weighted choices, unless the composite deferred
    assert!(ctx.decisions_drawn() == 3 || ctx.decisions_drawn() == 1);
}

#[test]
fn builtin_tundra_uses_temperature_for_spikes() {
    let reg = TreeRegistry::builtin().unwrap();
    let mut cold = std::collections::HashSet::new();
    let mut warm = std::collections::HashSet::new();
    for i in 0..2_000 {
        cold.insert(classify_at(&reg, "tundra", i, 0, Climate::new(1.0, 0.0)));
        warm.insert(classify_at(&reg, "tundra", i, 0, Climate::new(3.0, 0.0)));
    }
    assert!(cold.contains(&ICE_SPIKES));
    assert!(!warm.contains(&ICE_SPIKES));
    assert!(warm.contains(&ICE_PLAINS));
}

#[test]
fn zero_total_weight_is_rejected() {
    let err = TreeRegistry::from_defs(vec![TreeDef::new(
        "bad",
        NodeDef::weighted([(NodeDef::leaf(1), 0), (NodeDef::leaf(2), 0)]),
    )])
    .unwrap_err();
    assert!(matches!(err, TreeError::ZeroWeight { ref tree } if tree == "bad"));
}

#[test]
fn dangling_reference_is_rejected() {
    let err = TreeRegistry::from_defs(vec![TreeDef::new("a", NodeDef::reference("nowhere"))])
        .unwrap_err();
    assert!(matches!(err, TreeError::UnknownTree { ref target, .. } if target == "nowhere"));
}

#[test]
fn cyclic_reference_is_rejected() {
    let err = TreeRegistry::from_defs(vec![
        TreeDef::new("a", NodeDef::weighted([(NodeDef::leaf(1), 1), (NodeDef::reference("b"), 1)])),
        TreeDef::new("b", NodeDef::composite([(3, "c")], NodeDef::leaf(2))),
        TreeDef::new("c", NodeDef::threshold(1.0, NodeDef::reference("a"), NodeDef::leaf(3))),
    ])
    .unwrap_err();
    match err {
        TreeError::CyclicReference(path) => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 4, "{path:?}");
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn self_reference_is_a_cycle() {
    let err = TreeRegistry::from_defs(vec![TreeDef::new(
        "loop",
        NodeDef::composite([(2, "loop")], NodeDef::leaf(1)),
    )])
    .unwrap_err();
    assert!(matches!(err, TreeError::CyclicReference(_)));
}

#[test]
fn duplicate_names_and_zero_modulus_are_rejected() {
    let dup = TreeRegistry::from_defs(vec![
        TreeDef::new("x", NodeDef::leaf(1)),
        TreeDef::new("x", NodeDef::leaf(2)),
    ]);
    assert!(matches!(dup, Err(TreeError::DuplicateTree(ref n)) if n == "x"));

    let modulus = TreeRegistry::from_defs(vec![
        TreeDef::new("x", NodeDef::composite([(0, "y")], NodeDef::leaf(1))),
        TreeDef::new("y", NodeDef::leaf(2)),
    ]);
    assert!(matches!(modulus, Err(TreeError::ZeroModulus { .. })));

    let boundary = TreeRegistry::from_defs(vec![TreeDef::new(
        "x",
        NodeDef::threshold(f64::NAN, NodeDef::leaf(1), NodeDef::leaf(2)),
    )]);
    assert!(matches!(boundary, Err(TreeError::InvalidBoundary { .. })));
}

#[test]
fn empty_branches_are_pruned() {
    let reg = single(NodeDef::weighted([
        (NodeDef::Empty, 10),
        (NodeDef::threshold(5.0, NodeDef::Empty, NodeDef::leaf(7)), 1),
    ]));
    for i in 0..64 {
        // the empty low side falls through to the high side
        assert_eq!(classify_at(&reg, "root", i, 0, Climate::new(0.0, 0.0)), ClassificationId::new(7));
    }
    let err = TreeRegistry::from_defs(vec![TreeDef::new("void", NodeDef::weighted([(NodeDef::Empty, 1)]))])
        .unwrap_err();
    assert!(matches!(err, TreeError::EmptyTree(ref n) if n == "void"));
}

#[test]
fn registry_loads_from_toml() {
    let reg = TreeRegistry::from_toml_str(
        r#"
        [[trees]]
        name = "root"
        node = { kind = "ref", tree = "leafy" }

        [[trees]]
        name = "leafy"
        node = { kind = "leaf", id = "4:1" }
        "#,
    )
    .unwrap();
    assert_eq!(reg.len(), 2);
    assert_eq!(
        classify_at(&reg, "root", 0, 0, Climate::default()),
        ClassificationId::pseudo(4, 1)
    );
    assert!(matches!(TreeRegistry::from_toml_str("trees = 3"), Err(TreeError::Parse(_))));
}

#[test]
fn registry_loads_from_a_file() {
    let path = std::env::temp_dir().join(format!("climatic-trees-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [[trees]]
        name = "root"
        node = { kind = "composite", deferrals = [{ modulus = 2, tree = "wet" }], body = { kind = "leaf", id = 1 } }

        [[trees]]
        name = "wet"
        node = { kind = "leaf", id = "6:4" }
        "#,
    )
    .unwrap();
    let loaded = TreeRegistry::load_from_path(&path);
    std::fs::remove_file(&path).unwrap();
    let reg = loaded.unwrap();
    assert_eq!(reg.len(), 2);
    let seen: std::collections::HashSet<_> =
        (0..200).map(|i| classify_at(&reg, "root", i, 0, Climate::default())).collect();
    assert!(seen.contains(&ClassificationId::new(1)));
    assert!(seen.contains(&ClassificationId::pseudo(6, 4)));

    let missing = TreeRegistry::load_from_path(std::env::temp_dir().join("climatic-no-such-trees.toml"));
    assert!(matches!(missing, Err(TreeError::Io(_))));
}
