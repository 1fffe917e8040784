//! The observe/propagate driver.

use log::debug;
use thiserror::Error;

use crate::grid::Grid2;
use crate::propagator::{Compatibility, Propagator};
use crate::rng::Lcg;
use crate::wave::{Observation, Wave};

/// Errors detected when constructing a [`Solver`].
///
/// A constructed solver never fails: contradictions during a run surface as
/// `None` from [`Solver::run`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The pattern set was empty.
    #[error("pattern set is empty")]
    EmptyPatterns,
    /// A pattern weight was zero or negative.
    #[error("pattern {pattern} has non-positive weight {weight}")]
    NonPositiveWeight { pattern: usize, weight: f64 },
    /// The compatibility table does not cover every pattern.
    #[error("compatibility table covers {actual} patterns, expected {expected}")]
    CompatibilityLengthMismatch { expected: usize, actual: usize },
}

/// Outcome of a single observation step.
enum ObserveStatus {
    /// Every cell is decided; the result can be extracted.
    Success,
    /// A contradiction was reached.
    Failure,
    /// A cell was collapsed; propagation must run next.
    Continue,
}

/// Single-shot WFC solver over an opaque pattern space.
///
/// The wave, the supporter counters, and the worklist are allocated once at
/// construction and mutated monotonically; a failed run leaves the solver
/// exhausted and the caller constructs a fresh one with a new seed.
pub struct Solver {
    rng: Lcg,
    /// Pattern weights, normalized to sum to 1 at construction.
    weights: Vec<f64>,
    wave: Wave,
    propagator: Propagator,
    num_patterns: usize,
}

impl Solver {
    /// Validates the inputs and builds a solver over an `height` × `width`
    /// wave. `seed` fully determines the run.
    pub fn new(
        weights: &[f64],
        compat: Compatibility,
        height: usize,
        width: usize,
        periodic_output: bool,
        seed: u64,
    ) -> Result<Self, SolverError> {
        if weights.is_empty() {
            return Err(SolverError::EmptyPatterns);
        }
        for (pattern, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                return Err(SolverError::NonPositiveWeight { pattern, weight });
            }
        }
        if compat.len() != weights.len() {
            return Err(SolverError::CompatibilityLengthMismatch {
                expected: weights.len(),
                actual: compat.len(),
            });
        }

        let total: f64 = weights.iter().sum();
        let weights: Vec<f64> = weights.iter().map(|w| w / total).collect();

        Ok(Self {
            rng: Lcg::new(seed),
            wave: Wave::new(height, width, &weights),
            propagator: Propagator::new(height, width, periodic_output, compat),
            num_patterns: weights.len(),
            weights,
        })
    }

    /// The wave state, for inspection by adapters and tests.
    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    /// Disallows `pattern` in cell `(i, j)` from the outside, before the run.
    ///
    /// Used by adapters for ground and fixed-tile constraints. A no-op when
    /// the pattern is already disallowed there.
    pub fn disallow(&mut self, i: usize, j: usize, pattern: usize) {
        let index = self.wave.index(i, j);
        if self.wave.get(index, pattern) {
            self.wave.set(index, pattern, false);
            self.propagator.enqueue(i, j, pattern);
        }
    }

    /// Drains the worklist once. Used after a sequence of [`Solver::disallow`]
    /// calls to restore arc consistency before running.
    pub fn propagate(&mut self) {
        self.propagator.propagate(&mut self.wave);
    }

    /// Runs the algorithm to completion.
    ///
    /// Returns the fully decided pattern grid, or `None` on contradiction.
    pub fn run(&mut self) -> Option<Grid2<usize>> {
        loop {
            match self.observe() {
                ObserveStatus::Failure => {
                    debug!("contradiction reached, giving up on this seed");
                    return None;
                }
                ObserveStatus::Success => return Some(self.wave_to_output()),
                ObserveStatus::Continue => self.propagator.propagate(&mut self.wave),
            }
        }
    }

    /// Collapses the minimum-entropy cell to one weighted sample.
    fn observe(&mut self) -> ObserveStatus {
        let index = match self.wave.min_entropy_cell(&mut self.rng) {
            Observation::Contradiction => return ObserveStatus::Failure,
            Observation::AllDecided => return ObserveStatus::Success,
            Observation::Cell(index) => index,
        };

        // Categorical sample over the still-allowed patterns.
        let mut total = 0.0;
        for pattern in 0..self.num_patterns {
            if self.wave.get(index, pattern) {
                total += self.weights[pattern];
            }
        }

        let mut remainder = self.rng.next_double() * total;
        let mut chosen = None;
        let mut last_allowed = 0;
        for pattern in 0..self.num_patterns {
            if !self.wave.get(index, pattern) {
                continue;
            }
            last_allowed = pattern;
            remainder -= self.weights[pattern];
            if remainder <= 0.0 {
                chosen = Some(pattern);
                break;
            }
        }
        // Floating-point drift can walk past every weight; fall back to the
        // last allowed pattern.
        let chosen = chosen.unwrap_or(last_allowed);
        debug!("collapsing cell {} to pattern {}", index, chosen);

        let i = index / self.wave.width;
        let j = index % self.wave.width;
        for pattern in 0..self.num_patterns {
            if pattern != chosen && self.wave.get(index, pattern) {
                self.wave.set(index, pattern, false);
                self.propagator.enqueue(i, j, pattern);
            }
        }

        ObserveStatus::Continue
    }

    /// Extracts the unique allowed pattern of every cell.
    fn wave_to_output(&self) -> Grid2<usize> {
        let mut output = Grid2::new(self.wave.height, self.wave.width);
        for i in 0..self.wave.height {
            for j in 0..self.wave.width {
                let index = self.wave.index(i, j);
                for pattern in 0..self.num_patterns {
                    if self.wave.get(index, pattern) {
                        *output.get_mut(i, j) = pattern;
                    }
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_compat(n: usize) -> Compatibility {
        let all: Vec<usize> = (0..n).collect();
        (0..n)
            .map(|_| [all.clone(), all.clone(), all.clone(), all.clone()])
            .collect()
    }

    #[test]
    fn rejects_empty_weights() {
        assert_eq!(
            Solver::new(&[], Vec::new(), 1, 1, false, 0).err(),
            Some(SolverError::EmptyPatterns)
        );
    }

    #[test]
    fn rejects_non_positive_weights() {
        let err = Solver::new(&[1.0, 0.0], open_compat(2), 1, 1, false, 0).err();
        assert_eq!(
            err,
            Some(SolverError::NonPositiveWeight {
                pattern: 1,
                weight: 0.0
            })
        );
    }

    #[test]
    fn rejects_mismatched_compat_table() {
        let err = Solver::new(&[1.0, 1.0], open_compat(3), 1, 1, false, 0).err();
        assert_eq!(
            err,
            Some(SolverError::CompatibilityLengthMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn single_cell_single_pattern_resolves_immediately() {
        let mut solver = Solver::new(&[1.0], open_compat(1), 1, 1, false, 42).unwrap();
        let result = solver.run().unwrap();
        assert_eq!(*result.get(0, 0), 0);
    }

    #[test]
    fn predisallowing_every_pattern_in_a_cell_fails_the_run() {
        let mut solver = Solver::new(&[1.0, 1.0], open_compat(2), 1, 2, false, 7).unwrap();
        solver.disallow(0, 0, 0);
        solver.disallow(0, 0, 1);
        assert!(solver.run().is_none());
    }

    #[test]
    fn disallow_is_idempotent() {
        let mut solver = Solver::new(&[1.0, 1.0, 1.0], open_compat(3), 2, 2, true, 7).unwrap();
        solver.disallow(1, 1, 2);
        let entropy = solver.wave().entropy(solver.wave().index(1, 1));
        solver.disallow(1, 1, 2);
        assert_eq!(solver.wave().entropy(solver.wave().index(1, 1)), entropy);
        assert_eq!(solver.wave().remaining(solver.wave().index(1, 1)), 2);
    }
}
