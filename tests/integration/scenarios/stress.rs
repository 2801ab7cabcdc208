use std::collections::{BTreeSet, HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use factory_power::{
    grid::TileCoord,
    power::{NodeId, PowerGrid, PowerGridError, PowerNode, PowerRole},
    structures::{Dock, DockType, Facing},
};

const SIZE: i32 = 6;
const LAYERS: [i32; 2] = [0, -1];

fn random_node(rng: &mut StdRng, id: u64) -> PowerNode {
    let coord = TileCoord::new(
        LAYERS[rng.gen_range(0..LAYERS.len())],
        rng.gen_range(0..SIZE),
        rng.gen_range(0..SIZE),
    );
    let role = match rng.gen_range(0..6) {
        0 => PowerRole::Generator { rate: 30.0 },
        1 => PowerRole::Consumer { demand: 20.0 },
        2 => PowerRole::Storage {
            capacity: 200.0,
            max_discharge: 40.0,
            charge: rng.gen_range(0.0..200.0),
        },
        3 => PowerRole::Transformer {
            max_deposit_rate: 50.0,
        },
        _ => PowerRole::Relay,
    };
    let node = PowerNode::new(NodeId(id), coord, role);
    match rng.gen_range(0..3) {
        0 => node.with_docks(Dock::all_sides(DockType::Power)),
        1 => node.with_docks(Dock::all_sides(DockType::BigPower)),
        _ => node.with_docks(Dock::all_sides(DockType::BigPower)).with_docks([
            Dock::new((0, 0), Facing::Up, DockType::BigPower),
            Dock::new((0, 0), Facing::Down, DockType::BigPower),
        ]),
    }
}

/// Components of the physical adjacency graph, found from scratch.
fn expected_partition(grid: &PowerGrid) -> BTreeSet<BTreeSet<NodeId>> {
    let mut ids: Vec<NodeId> = grid.nodes().map(PowerNode::id).collect();
    ids.sort_unstable();
    let mut component_of: HashMap<NodeId, usize> = HashMap::new();
    let mut components: Vec<BTreeSet<NodeId>> = Vec::new();

    for start in ids {
        if component_of.contains_key(&start) {
            continue;
        }
        let index = components.len();
        let mut component = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        component_of.insert(start, index);
        while let Some(current) = queue.pop_front() {
            component.insert(current);
            for adjacency in grid.find_adjacent(current) {
                if !component_of.contains_key(&adjacency.neighbor) {
                    component_of.insert(adjacency.neighbor, index);
                    queue.push_back(adjacency.neighbor);
                }
            }
        }
        components.push(component);
    }
    components.into_iter().collect()
}

fn actual_partition(grid: &PowerGrid) -> BTreeSet<BTreeSet<NodeId>> {
    grid.networks()
        .map(|network| network.members().collect())
        .collect()
}

#[test]
fn random_edits_keep_the_partition_exact() {
    let mut rng = StdRng::seed_from_u64(0x5EED_F00D);
    let mut grid = PowerGrid::default();
    let mut live: Vec<NodeId> = Vec::new();
    let mut next_id = 1;

    for step in 0..2000 {
        let remove = !live.is_empty() && rng.gen_bool(0.4);
        if remove {
            let victim = live.swap_remove(rng.gen_range(0..live.len()));
            grid.unregister_structure(victim)
                .unwrap_or_else(|err| panic!("step {step}: removing {victim} failed: {err}"));
        } else {
            let node = random_node(&mut rng, next_id);
            next_id += 1;
            let id = node.id();
            match grid.register_structure(node) {
                Ok(_) => live.push(id),
                Err(PowerGridError::TileOccupied { .. }) => {}
                Err(err) => panic!("step {step}: placing {id} failed: {err}"),
            }
        }

        if let Err(violation) = grid.verify_partition() {
            panic!("step {step}: {violation}");
        }
        assert_eq!(
            actual_partition(&grid),
            expected_partition(&grid),
            "step {step}: networks differ from physical connectivity"
        );
        for network in grid.networks() {
            assert_eq!(
                network.get_spanning_tree().len(),
                network.len() - 1,
                "step {step}: spanning tree of {} is not a tree",
                network.id()
            );
        }
    }
}

#[test]
fn random_load_matches_incremental_build() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut incremental = PowerGrid::default();
    let mut nodes = Vec::new();
    for id in 1..=120 {
        let node = random_node(&mut rng, id);
        if incremental.register_structure(node.clone()).is_ok() {
            nodes.push(node);
        }
    }

    // Reverse order so shafts see their partners only in the second phase.
    nodes.reverse();
    let mut loaded = PowerGrid::default();
    let count = loaded.load_structures(nodes).unwrap();

    assert_eq!(count, incremental.node_count());
    assert!(loaded.verify_partition().is_ok());
    assert_eq!(actual_partition(&loaded), actual_partition(&incremental));
}

#[test]
fn random_settlement_never_overdelivers() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut grid = PowerGrid::default();
    for id in 1..=80 {
        let _ = grid.register_structure(random_node(&mut rng, id));
    }
    let mut transformers: Vec<NodeId> = grid
        .nodes()
        .filter(|node| matches!(node.role(), PowerRole::Transformer { .. }))
        .map(PowerNode::id)
        .collect();
    transformers.sort_unstable();
    assert!(!transformers.is_empty());

    for tick in 0..50 {
        for &id in &transformers {
            if rng.gen_bool(0.5) {
                grid.accept_power(id, rng.gen_range(0.0..120.0))
                    .unwrap_or_else(|err| panic!("tick {tick}: deposit into {id} failed: {err}"));
            }
        }
        let dt = rng.gen_range(0.001..0.1);
        grid.update(dt, 1.0);
        for network in grid.networks() {
            let report = network.last_settlement();
            let supplied = report.available + report.drained;
            assert!(
                supplied <= report.ceiling * dt + 1e-3,
                "tick {tick}: {} supplied {supplied} over a ceiling of {}",
                network.id(),
                report.ceiling * dt
            );
            assert!(
                report.delivered <= report.ceiling * dt + 1e-3,
                "tick {tick}: {} delivered {} over its ceiling",
                network.id(),
                report.delivered
            );
            assert!(
                report.delivered <= supplied + 1e-3,
                "tick {tick}: {} delivered {} from {supplied}",
                network.id(),
                report.delivered
            );
            let accounted = report.delivered + report.stored + report.wasted;
            assert!(
                (accounted - supplied).abs() < 1e-2,
                "tick {tick}: {} accounts for {accounted} of {supplied}",
                network.id()
            );
            assert!(report.deficit >= 0.0);
        }
        for node in grid.nodes() {
            if let Some(charge) = node.storage_charge() {
                assert!(
                    (0.0..=200.0 + 1e-3).contains(&charge),
                    "tick {tick}: {} holds {charge}",
                    node.id()
                );
            }
        }
    }
}
