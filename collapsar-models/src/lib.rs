//! Adapters that turn images and tile sets into solver inputs.
//!
//! Both models produce the same shape the solver consumes, a weight per
//! pattern and per-direction compatibility lists, and reuse
//! [`collapsar_core::Solver`] unchanged. The configuration loader parses the
//! XML sample-set format; it returns plain data and leaves image I/O to the
//! caller.

use thiserror::Error;

pub mod config;
pub mod overlapping;
pub mod tiling;

pub use config::{
    load_samples_config, load_tile_set, parse_samples_config, parse_tile_set, LoadError,
    NeighborDecl, OverlappingSample, SamplesConfig, SimpleTiledSample, TileDecl, TileSetData,
};
pub use overlapping::{OverlappingModel, OverlappingOptions};
pub use tiling::{Symmetry, Tile, TilingModel, TilingOptions};

/// Errors detected while building a model from its inputs.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The overlapping symmetry count must select a prefix of the 8-element
    /// dihedral expansion.
    #[error("symmetry must be between 1 and 8, got {0}")]
    InvalidSymmetry(usize),
    /// A non-periodic input has no full pattern window.
    #[error("input ({height}x{width}) is smaller than the pattern size {pattern_size}")]
    InputTooSmall {
        height: usize,
        width: usize,
        pattern_size: usize,
    },
    /// A non-periodic output could not fit a single pattern.
    #[error("output ({out_height}x{out_width}) is smaller than the pattern size {pattern_size}")]
    OutputTooSmall {
        out_height: usize,
        out_width: usize,
        pattern_size: usize,
    },
    /// The ground constraint was requested but the bottom-middle window was
    /// never extracted as a pattern.
    #[error("the bottom-middle window is not among the extracted patterns")]
    GroundPatternMissing,
    /// A tile carries a different number of orientation images than its
    /// symmetry class implies.
    #[error(
        "tile {tile} declares {declared} orientations, its {symmetry:?} symmetry implies {expected}"
    )]
    OrientationCountMismatch {
        tile: usize,
        declared: usize,
        symmetry: tiling::Symmetry,
        expected: usize,
    },
    /// Tile images must all be square and share one size.
    #[error("tile images must all be square with matching sizes")]
    TileSizeMismatch,
    /// Solver-level validation failure.
    #[error(transparent)]
    Solver(#[from] collapsar_core::SolverError),
}
