use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use reeb_sweep::DebugInvariants;
use reeb_sweep::forest::{DynamicConnectivity, DynamicForest, Insertion};

/// An edge alive during `born..dies`, inserted with weight `dies`.
#[derive(Clone, Debug)]
struct TimedEdge {
    a: usize,
    b: usize,
    born: usize,
    dies: usize,
}

fn random_schedule(n: usize, horizon: usize, density: f64, seed: u64) -> Vec<TimedEdge> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.gen_bool(density) {
                let born = rng.gen_range(0..horizon);
                let dies = rng.gen_range(born + 1..=horizon);
                edges.push(TimedEdge { a, b, born, dies });
            }
        }
    }
    edges
}

/// Component label of every node, by BFS over `live`.
fn bfs_labels(n: usize, live: &[&TimedEdge]) -> Vec<usize> {
    let mut adj = vec![Vec::new(); n];
    for e in live {
        adj[e.a].push(e.b);
        adj[e.b].push(e.a);
    }
    let mut label = vec![usize::MAX; n];
    for s in 0..n {
        if label[s] != usize::MAX {
            continue;
        }
        label[s] = s;
        let mut queue = VecDeque::from([s]);
        while let Some(u) = queue.pop_front() {
            for &v in &adj[u] {
                if label[v] == usize::MAX {
                    label[v] = s;
                    queue.push_back(v);
                }
            }
        }
    }
    label
}

/// Replay the schedule step by step and compare against BFS after each step.
fn replay(
    n: usize,
    horizon: usize,
    edges: &[TimedEdge],
    inserts_first: bool,
) -> Result<(), TestCaseError> {
    let forest = DynamicForest::new(n);
    for t in 0..=horizon {
        let insert = || {
            for e in edges.iter().filter(|e| e.born == t) {
                forest.insert_edge(e.a, e.b, e.dies);
            }
        };
        let remove = || {
            for e in edges.iter().filter(|e| e.dies == t) {
                forest.remove_edge_between(e.a, e.b);
            }
        };
        if inserts_first {
            insert();
            remove();
        } else {
            remove();
            insert();
        }

        let live: Vec<&TimedEdge> = edges.iter().filter(|e| e.born <= t && t < e.dies).collect();
        let labels = bfs_labels(n, &live);
        for u in 0..n {
            for v in (u + 1)..n {
                prop_assert_eq!(
                    forest.is_connected(u, v),
                    labels[u] == labels[v],
                    "t={} u={} v={}",
                    t,
                    u,
                    v
                );
            }
        }
        prop_assert!(forest.validate_invariants().is_ok());
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_connectivity_matches_bfs(
        n in 2usize..14,
        horizon in 2usize..12,
        density in 0.1f64..0.8f64,
        seed in any::<u64>(),
    ) {
        let edges = random_schedule(n, horizon, density, seed);
        replay(n, horizon, &edges, false)?;
    }

    #[test]
    fn prop_connectivity_with_insertions_first(
        n in 2usize..14,
        horizon in 2usize..12,
        density in 0.1f64..0.8f64,
        seed in any::<u64>(),
    ) {
        let edges = random_schedule(n, horizon, density, seed);
        replay(n, horizon, &edges, true)?;
    }

    #[test]
    fn prop_evert_and_internal_insert(
        n in 3usize..16,
        seed in any::<u64>(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let forest = DynamicForest::new(n);
        for _ in 0..(2 * n) {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            let w = rng.gen_range(0..100usize);
            let before = (forest.find_root(a), forest.find_root(b));
            let connected = before.0 == before.1;
            let outcome = forest.insert_edge(a, b, w);
            if connected || a == b {
                prop_assert_eq!(outcome, Insertion::Internal);
                prop_assert_eq!(forest.find_root(a), before.0);
            } else {
                prop_assert!(outcome.merged());
            }
            prop_assert!(forest.is_connected(a, b));
        }
        let pick = rng.gen_range(0..n);
        forest.evert(pick);
        prop_assert_eq!(forest.find_root(pick), pick);
        prop_assert!(forest.validate_invariants().is_ok());
    }

    #[test]
    fn prop_min_weight_is_on_root_path(
        n in 2usize..16,
        seed in any::<u64>(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let forest = DynamicForest::new(n);
        for b in 1..n {
            let a = rng.gen_range(0..b);
            forest.insert_edge(a, b, rng.gen_range(0..50usize));
        }
        for start in 0..n {
            let (root, lightest) = forest.find_min_weight_root(start);
            prop_assert_eq!(root, forest.find_root(start));
            let mut path = Vec::new();
            let mut cur = start;
            while let Some(p) = forest.node(cur).parent {
                path.push(cur);
                cur = p;
            }
            match lightest {
                None => prop_assert!(path.is_empty()),
                Some(m) => {
                    prop_assert!(path.contains(&m));
                    let w = forest.node(m).weight;
                    prop_assert!(path.iter().all(|&x| forest.node(x).weight >= w));
                }
            }
        }
    }
}

#[test]
fn component_count_of_three_nodes() {
    let forest = DynamicForest::new(5);
    assert_eq!(forest.nb_connected_components([0, 1, 2]), 3);
    assert!(forest.insert_edge(0, 3, 1).merged());
    assert_eq!(forest.nb_connected_components([0, 1, 2]), 3);
    assert!(forest.insert_edge(3, 1, 1).merged());
    assert_eq!(forest.nb_connected_components([0, 1, 2]), 2);
    // redundant: 0 and 1 already connected
    assert!(!forest.insert_edge(0, 1, 1).merged());
    assert!(forest.insert_edge(2, 4, 1).merged());
    assert!(forest.insert_edge(4, 0, 1).merged());
    assert_eq!(forest.nb_connected_components([0, 1, 2]), 1);
    assert_eq!(forest.roots([0, 1, 2, 0, 1]).len(), 1);
}

#[test]
fn remove_then_reinsert_restores_connectivity() {
    let forest = DynamicForest::new(4);
    forest.insert_edge(0, 1, 5);
    forest.insert_edge(1, 2, 5);
    forest.insert_edge(2, 3, 5);
    assert!(forest.remove_edge_between(1, 2));
    assert!(!forest.is_connected(0, 3));
    assert!(!forest.remove_edge_between(1, 2));
    assert!(forest.insert_edge(1, 2, 5).merged());
    assert!(forest.is_connected(0, 3));
    forest.validate_invariants().unwrap();
}
