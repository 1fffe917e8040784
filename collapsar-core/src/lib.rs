//! Constraint-propagation core of the collapsar generator.
//!
//! The solver works on an opaque pattern space: callers provide a weight per
//! pattern and, for each pattern and direction, the list of patterns allowed
//! next to it. [`Solver::run`] repeatedly collapses the minimum-entropy cell
//! and propagates the consequences until the grid is fully decided or a
//! contradiction is reached. No I/O happens here; adapters live in
//! `collapsar-models`.

pub mod direction;
pub mod grid;
pub mod propagator;
pub mod rng;
pub mod solver;
pub mod wave;

/// Row-major 2D storage, also used for patterns and solver output.
pub use crate::grid::Grid2;
/// Row-major 3D storage backing the supporter counters.
pub use crate::grid::Grid3;
/// Sparse per-pattern, per-direction adjacency lists.
pub use crate::propagator::Compatibility;
/// Worklist-driven arc-consistency propagation.
pub use crate::propagator::Propagator;
/// The linear-congruential generator owned by the solver.
pub use crate::rng::Lcg;
/// The observe/propagate driver.
pub use crate::solver::Solver;
/// Construction-time validation errors.
pub use crate::solver::SolverError;
/// Result of a minimum-entropy query on the wave.
pub use crate::wave::Observation;
/// Per-cell pattern admissibility with memoized entropy.
pub use crate::wave::Wave;
