//! End-to-end tests for the solver driver.

use collapsar_core::{Compatibility, Grid2, Solver};

fn open_compat(n: usize) -> Compatibility {
    let all: Vec<usize> = (0..n).collect();
    (0..n)
        .map(|_| [all.clone(), all.clone(), all.clone(), all.clone()])
        .collect()
}

/// Each pattern is only compatible with the other one, in every direction.
fn checkerboard_compat() -> Compatibility {
    vec![
        [vec![1], vec![1], vec![1], vec![1]],
        [vec![0], vec![0], vec![0], vec![0]],
    ]
}

fn assert_output_satisfies_compat(output: &Grid2<usize>, compat: &Compatibility, periodic: bool) {
    let dy = [-1isize, 0, 0, 1];
    let dx = [0isize, -1, 1, 0];
    for i in 0..output.height {
        for j in 0..output.width {
            for d in 0..4 {
                let ni = i as isize + dy[d];
                let nj = j as isize + dx[d];
                let (ni, nj) = if periodic {
                    (
                        ni.rem_euclid(output.height as isize) as usize,
                        nj.rem_euclid(output.width as isize) as usize,
                    )
                } else {
                    if ni < 0
                        || ni >= output.height as isize
                        || nj < 0
                        || nj >= output.width as isize
                    {
                        continue;
                    }
                    (ni as usize, nj as usize)
                };
                let p = *output.get(i, j);
                let q = *output.get(ni, nj);
                assert!(
                    compat[p][d].contains(&q),
                    "pattern {} at ({}, {}) has incompatible neighbor {} in direction {}",
                    p,
                    i,
                    j,
                    q,
                    d
                );
            }
        }
    }
}

#[test]
fn checkerboard_solution_satisfies_every_adjacency() {
    let compat = checkerboard_compat();
    let mut solver = Solver::new(&[1.0, 1.0], compat.clone(), 8, 8, true, 99).unwrap();
    let output = solver.run().expect("8x8 torus checkerboard is satisfiable");
    assert_output_satisfies_compat(&output, &compat, true);

    // And it really alternates.
    for i in 0..8 {
        for j in 0..8 {
            assert_eq!(
                (output.get(i, j) + output.get(i, (j + 1) % 8)) % 2,
                1,
                "neighbors must differ"
            );
        }
    }
}

#[test]
fn unconstrained_solution_is_valid_too() {
    let compat = open_compat(3);
    let mut solver = Solver::new(&[1.0, 2.0, 3.0], compat.clone(), 5, 7, false, 123).unwrap();
    let output = solver.run().expect("open compatibility cannot contradict");
    assert_output_satisfies_compat(&output, &compat, false);
}

#[test]
fn mutually_exclusive_singletons_fail() {
    // Two frozen patterns; pre-disallowing both in one cell is the
    // contradiction case.
    let compat: Compatibility = vec![
        [vec![0], vec![0], vec![0], vec![0]],
        [vec![1], vec![1], vec![1], vec![1]],
    ];
    let mut solver = Solver::new(&[1.0, 1.0], compat, 1, 2, false, 5).unwrap();
    solver.disallow(0, 0, 0);
    solver.disallow(0, 0, 1);
    assert!(solver.run().is_none());
}

#[test]
fn weighted_collapse_matches_the_distribution() {
    // 1x1 wave, two fully compatible patterns weighted 3:1. Over many seeds
    // pattern 0 must come out with frequency 0.75 +- 0.02.
    let mut hits = 0usize;
    let runs = 10_000;
    for seed in 1..=runs {
        let mut solver = Solver::new(&[3.0, 1.0], open_compat(2), 1, 1, true, seed as u64).unwrap();
        let output = solver.run().expect("single cell cannot contradict");
        if *output.get(0, 0) == 0 {
            hits += 1;
        }
    }
    let frequency = hits as f64 / runs as f64;
    assert!(
        (frequency - 0.75).abs() < 0.02,
        "pattern 0 frequency {} outside 0.75 +- 0.02",
        frequency
    );
}

#[test]
fn identical_seeds_give_identical_outputs() {
    let reference = {
        let mut solver =
            Solver::new(&[1.0, 1.0, 2.0], open_compat(3), 6, 6, true, 4242).unwrap();
        solver.run().expect("open compatibility cannot contradict")
    };
    for _ in 0..100 {
        let mut solver =
            Solver::new(&[1.0, 1.0, 2.0], open_compat(3), 6, 6, true, 4242).unwrap();
        assert_eq!(solver.run().as_ref(), Some(&reference));
    }
}

#[test]
fn different_seeds_explore_different_outputs() {
    let mut distinct = std::collections::HashSet::new();
    for seed in 1..=16 {
        let mut solver = Solver::new(&[1.0, 1.0], open_compat(2), 4, 4, true, seed).unwrap();
        let output = solver.run().expect("open compatibility cannot contradict");
        distinct.insert(output.data().to_vec());
    }
    assert!(distinct.len() > 1, "all 16 seeds produced the same grid");
}
