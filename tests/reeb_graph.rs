use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use reeb_sweep::prelude::*;
use reeb_sweep::skeleton::ReebGraphSnapshot;
use reeb_sweep::sweep::leaf_search;
use reeb_sweep::topology::meshgen::{Periodicity, tetrahedral_box, torus, triangle_grid};

fn build(
    mesh: &TriangleMesh,
    values: &[f64],
    threads: usize,
    direction: SweepDirection,
) -> ReebGraph {
    let cfg = FtrConfig {
        threads,
        direction,
        debug_level: 1,
    };
    let graph = compute_reeb_graph(mesh, ScalarField::new(values.to_vec()), cfg)
        .expect("build must succeed");
    graph.validate_invariants().expect("skeleton invariants");
    graph
}

fn prepared(mut mesh: TriangleMesh) -> TriangleMesh {
    mesh.preprocess();
    mesh
}

fn random_values(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Independent cycles of the skeleton, assuming it is connected.
fn loops(graph: &ReebGraph) -> isize {
    graph.arc_count() as isize - graph.node_count() as isize + 1
}

fn is_connected(graph: &ReebGraph) -> bool {
    let n = graph.node_count();
    let mut parent: Vec<usize> = (0..n).collect();
    for arc in graph.arcs() {
        let a = find(&mut parent, arc.down.get());
        let b = find(&mut parent, arc.up.expect("closed arc").get());
        parent[a] = b;
    }
    let root = find(&mut parent, 0);
    (0..n).all(|x| find(&mut parent, x) == root)
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Contour components just above the `k`-th vertex in ascending order,
/// counted directly from the crossing edges and the triangles joining them.
fn contours_above(mesh: &TriangleMesh, rank: &[usize], k: usize) -> usize {
    let crossing = |e: usize| {
        let [a, b] = mesh.edge_vertices(e);
        rank[a].min(rank[b]) <= k && k < rank[a].max(rank[b])
    };
    let mut parent: Vec<usize> = (0..mesh.edge_count()).collect();
    for t in 0..mesh.triangle_count() {
        let cut: Vec<usize> = mesh
            .triangle_edges(t)
            .into_iter()
            .filter(|&e| crossing(e))
            .collect();
        if let [a, b] = cut[..] {
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            parent[ra] = rb;
        }
    }
    (0..mesh.edge_count())
        .filter(|&e| crossing(e) && find(&mut parent, e) == e)
        .count()
}

/// Every level between two consecutive vertices must be crossed by as many
/// arcs as it has contour components.
fn assert_matches_level_sets(mesh: &TriangleMesh, values: &[f64], graph: &ReebGraph) {
    let order = ScalarField::new(values.to_vec())
        .order(SweepDirection::Ascending)
        .unwrap();
    let rank: Vec<usize> = (0..values.len()).map(|v| order.rank(v)).collect();
    let spans: Vec<(usize, usize)> = graph
        .canonical_arcs()
        .into_iter()
        .map(|(a, b)| (rank[a].min(rank[b]), rank[a].max(rank[b])))
        .collect();
    for k in 0..values.len().saturating_sub(1) {
        let arcs = spans.iter().filter(|&&(lo, hi)| lo <= k && k < hi).count();
        assert_eq!(arcs, contours_above(mesh, &rank, k), "level above rank {k}");
    }
}

/// Vertices 0 and 1 on the rim, 2 the boundary saddle, 3 the apex.
fn y_mesh() -> TriangleMesh {
    prepared(TriangleMesh::new(4, vec![[0, 2, 3], [1, 2, 3]]).unwrap())
}

#[test]
fn two_minima_join_at_a_saddle() {
    let mesh = y_mesh();
    let graph = build(&mesh, &[0.0, 1.0, 2.0, 3.0], 2, SweepDirection::Ascending);
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.arc_count(), 3);
    let saddle = graph.node_at_vertex(2).unwrap();
    assert_eq!(graph.node_kind(saddle), NodeKind::JoinSaddle);
    assert_eq!(graph.down_degree(saddle), 2);
    assert_eq!(graph.up_degree(saddle), 1);
    assert_eq!(graph.node_kind(graph.node_at_vertex(3).unwrap()), NodeKind::Maximum);
    assert_eq!(graph.canonical_arcs(), vec![(0, 2), (1, 2), (2, 3)]);
}

#[test]
fn one_minimum_splits_into_two_maxima() {
    let mesh = y_mesh();
    let graph = build(&mesh, &[3.0, 2.0, 1.0, 0.0], 2, SweepDirection::Ascending);
    let saddle = graph.node_at_vertex(2).unwrap();
    assert_eq!(graph.node_kind(saddle), NodeKind::SplitSaddle);
    assert_eq!(graph.down_degree(saddle), 1);
    assert_eq!(graph.up_degree(saddle), 2);
    assert_eq!(graph.kind_histogram(), [1, 2, 0, 1, 0, 0]);
}

#[test]
fn descending_sweep_sees_the_same_join() {
    let mesh = y_mesh();
    let values = [0.0, 1.0, 2.0, 3.0];
    let up = build(&mesh, &values, 1, SweepDirection::Ascending);
    let down = build(&mesh, &values, 1, SweepDirection::Descending);
    assert_eq!(up.canonical_arcs(), down.canonical_arcs());
    let saddle = down.node_at_vertex(2).unwrap();
    assert_eq!(down.node_kind(saddle), NodeKind::JoinSaddle);
}

#[test]
fn octahedron_height_is_a_single_arc() {
    let tris = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [5, 1, 2],
        [5, 2, 3],
        [5, 3, 4],
        [5, 4, 1],
    ];
    let mesh = prepared(TriangleMesh::new(6, tris).unwrap());
    let graph = build(&mesh, &[-1.0, 0.1, 0.2, 0.3, 0.4, 1.0], 3, SweepDirection::Ascending);
    assert_eq!(graph.canonical_arcs(), vec![(0, 5)]);
    let arc = ArcId::new(0);
    assert_eq!(graph.arc_vertices(arc), vec![1, 2, 3, 4]);
}

#[test]
fn isolated_vertex_is_its_own_node() {
    let mesh = prepared(TriangleMesh::new(4, vec![[0, 1, 2]]).unwrap());
    let graph = build(&mesh, &[0.0, 1.0, 2.0, 5.0], 2, SweepDirection::Ascending);
    let lone = graph.node_at_vertex(3).unwrap();
    assert_eq!(graph.node_kind(lone), NodeKind::Isolated);
    assert_eq!(graph.arc_count(), 1);
}

#[test]
fn random_fields_on_a_disk_give_trees() {
    let grid = triangle_grid(12, 9, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
    let mesh = prepared(grid.mesh);
    for seed in 0..8u64 {
        let values = random_values(mesh.vertex_count(), seed);
        let graph = build(&mesh, &values, 4, SweepDirection::Ascending);
        assert!(is_connected(&graph), "seed {seed}");
        assert_eq!(loops(&graph), 0, "seed {seed}");
    }
}

#[test]
fn random_fields_on_a_torus_have_one_loop() {
    let grid = triangle_grid(10, 8, [0.0, 0.0], [1.0, 1.0], Periodicity::torus()).unwrap();
    let mesh = prepared(grid.mesh);
    for seed in 0..8u64 {
        let values = random_values(mesh.vertex_count(), 100 + seed);
        let graph = build(&mesh, &values, 4, SweepDirection::Ascending);
        assert!(is_connected(&graph), "seed {seed}");
        assert_eq!(loops(&graph), 1, "seed {seed}");
    }
}

#[test]
fn torus_height_function() {
    let generated = torus(16, 12, 3.0, 1.0).unwrap();
    let mesh = prepared(generated.mesh);
    let heights: Vec<f64> = generated.coordinates.iter().map(|c| c[2]).collect();
    for direction in [SweepDirection::Ascending, SweepDirection::Descending] {
        let graph = build(&mesh, &heights, 4, direction);
        assert!(is_connected(&graph));
        assert_eq!(loops(&graph), 1);
        let [minima, maxima, ..] = graph.kind_histogram();
        assert!(minima >= 1 && maxima >= 1);
    }
}

#[test]
fn tetrahedral_box_gives_a_tree() {
    let generated = tetrahedral_box(4, 3, 3, [0.0; 3], [1.0; 3]).unwrap();
    let mesh = prepared(generated.mesh);
    for seed in 0..4u64 {
        let values = random_values(mesh.vertex_count(), 200 + seed);
        let graph = build(&mesh, &values, 4, SweepDirection::Ascending);
        assert!(is_connected(&graph), "seed {seed}");
        assert_eq!(loops(&graph), 0, "seed {seed}");
    }
}

#[test]
fn thread_count_does_not_change_the_graph() {
    let grid = triangle_grid(16, 16, [0.0, 0.0], [1.0, 1.0], Periodicity::torus()).unwrap();
    let mesh = prepared(grid.mesh);
    for seed in 0..4u64 {
        let values = random_values(mesh.vertex_count(), 300 + seed);
        let single = build(&mesh, &values, 1, SweepDirection::Ascending);
        let multi = build(&mesh, &values, 4, SweepDirection::Ascending);
        assert_eq!(single.canonical_arcs(), multi.canonical_arcs(), "seed {seed}");
        assert_eq!(single.critical_vertices(), multi.critical_vertices());
    }
}

#[test]
fn direction_does_not_change_the_graph() {
    let grid = triangle_grid(14, 11, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
    let mesh = prepared(grid.mesh);
    for seed in 0..4u64 {
        let values = random_values(mesh.vertex_count(), 400 + seed);
        let up = build(&mesh, &values, 3, SweepDirection::Ascending);
        let down = build(&mesh, &values, 3, SweepDirection::Descending);
        assert_eq!(up.canonical_arcs(), down.canonical_arcs(), "seed {seed}");
        assert_eq!(up.critical_vertices(), down.critical_vertices());
    }
}

#[test]
fn every_vertex_is_critical_or_on_an_arc() {
    let grid = triangle_grid(9, 9, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
    let mesh = prepared(grid.mesh);
    let values = random_values(mesh.vertex_count(), 7);
    let graph = build(&mesh, &values, 2, SweepDirection::Ascending);
    for v in 0..mesh.vertex_count() {
        let critical = graph.node_at_vertex(v).is_some();
        assert_ne!(critical, graph.vertex_arc(v).is_some(), "vertex {v}");
    }
}

#[test]
fn unprepared_mesh_is_rejected() {
    let mesh = TriangleMesh::new(3, vec![[0, 1, 2]]).unwrap();
    let err = compute_reeb_graph(
        &mesh,
        ScalarField::new(vec![0.0f64, 1.0, 2.0]),
        FtrConfig::default(),
    )
    .unwrap_err();
    assert!(err.status_code() < 0);
}

#[test]
fn offsets_break_ties() {
    let mesh = y_mesh();
    // all equal: order comes from the offsets alone
    let field = ScalarField::new(vec![1.0f64; 4])
        .with_offsets(vec![0, 1, 2, 3])
        .unwrap();
    let graph = compute_reeb_graph(&mesh, field, FtrConfig::default()).unwrap();
    assert_eq!(graph.canonical_arcs(), vec![(0, 2), (1, 2), (2, 3)]);
}

#[test]
fn snapshot_round_trips_through_json() {
    let mesh = y_mesh();
    let graph = build(&mesh, &[0.0, 1.0, 2.0, 3.0], 1, SweepDirection::Ascending);
    let snapshot = graph.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: ReebGraphSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
    assert_eq!(back.nodes.len(), 4);
}

#[test]
fn arcs_match_brute_force_contour_counts() {
    let disk = triangle_grid(6, 5, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
    let ring = triangle_grid(5, 4, [0.0, 0.0], [1.0, 1.0], Periodicity::torus()).unwrap();
    for (name, grid) in [("disk", disk), ("torus", ring)] {
        let mesh = prepared(grid.mesh);
        for seed in 0..6u64 {
            let values = random_values(mesh.vertex_count(), 500 + seed);
            for direction in [SweepDirection::Ascending, SweepDirection::Descending] {
                let graph = build(&mesh, &values, 2, direction);
                assert_matches_level_sets(&mesh, &values, &graph);
                assert!(graph.node_count() > 0, "{name} seed {seed}");
            }
        }
    }
}

#[test]
fn every_leaf_becomes_a_node_of_its_kind() {
    let grid = triangle_grid(8, 7, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
    let mesh = prepared(grid.mesh);
    let values = random_values(mesh.vertex_count(), 11);
    for direction in [SweepDirection::Ascending, SweepDirection::Descending] {
        let order = ScalarField::new(values.clone()).order(direction).unwrap();
        let leaves = leaf_search(&mesh, &order);
        let graph = build(&mesh, &values, 2, direction);
        let [minima, maxima, ..] = graph.kind_histogram();
        assert_eq!(minima + maxima, leaves.len());
        for leaf in leaves {
            let node = graph.node_at_vertex(leaf.vertex).expect("leaf has a node");
            assert_eq!(graph.node_kind(node), leaf.kind, "vertex {}", leaf.vertex);
        }
    }
}
