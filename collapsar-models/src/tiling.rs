//! Tiling adapter: oriented tiles plus neighbor rules.

use collapsar_core::direction::opposite;
use collapsar_core::{Compatibility, Grid2, Solver};
use log::warn;

use crate::ModelError;

/// How a tile behaves under rotation and reflection.
///
/// The class determines how many distinct orientations the tile has and how
/// orientation indices permute under the dihedral group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// Fully symmetric (1 orientation).
    X,
    /// Two-fold rotational, mirror-symmetric, like a straight segment (2).
    I,
    /// Three-pronged (4).
    T,
    /// Corner (4).
    L,
    /// Diagonal, like a backslash stroke (2).
    Backslash,
    /// No symmetry at all (8).
    P,
}

impl Symmetry {
    /// Number of distinct orientations of a tile in this class.
    pub fn orientation_count(self) -> usize {
        match self {
            Symmetry::X => 1,
            Symmetry::I | Symmetry::Backslash => 2,
            Symmetry::T | Symmetry::L => 4,
            Symmetry::P => 8,
        }
    }

    /// Orientation reached from each orientation by a 90° CCW rotation.
    fn rotation_map(self) -> Vec<usize> {
        match self {
            Symmetry::X => vec![0],
            Symmetry::I | Symmetry::Backslash => vec![1, 0],
            Symmetry::T | Symmetry::L => vec![1, 2, 3, 0],
            Symmetry::P => vec![1, 2, 3, 0, 5, 6, 7, 4],
        }
    }

    /// Orientation reached from each orientation by a horizontal mirror.
    fn reflection_map(self) -> Vec<usize> {
        match self {
            Symmetry::X => vec![0],
            Symmetry::I => vec![0, 1],
            Symmetry::Backslash => vec![1, 0],
            Symmetry::T => vec![0, 3, 2, 1],
            Symmetry::L => vec![1, 0, 3, 2],
            Symmetry::P => vec![4, 7, 6, 5, 0, 3, 2, 1],
        }
    }

    /// The full 8-action table. Actions 0..4 are `k`·90° CCW rotations,
    /// actions 4..8 the same preceded by a reflection.
    pub(crate) fn action_map(self) -> Vec<Vec<usize>> {
        let rotation = self.rotation_map();
        let reflection = self.reflection_map();
        let size = rotation.len();

        let mut actions: Vec<Vec<usize>> = Vec::with_capacity(8);
        actions.push((0..size).collect());
        for a in 1..4 {
            let next: Vec<usize> = actions[a - 1].iter().map(|&o| rotation[o]).collect();
            actions.push(next);
        }
        let reflected: Vec<usize> = actions[0].iter().map(|&o| reflection[o]).collect();
        actions.push(reflected);
        for a in 5..8 {
            let next: Vec<usize> = actions[a - 1].iter().map(|&o| rotation[o]).collect();
            actions.push(next);
        }
        actions
    }
}

/// A tile with its distinct orientation images, symmetry class, and weight.
#[derive(Debug, Clone)]
pub struct Tile<T> {
    /// The orientation images, indexed by orientation id.
    pub orientations: Vec<Grid2<T>>,
    pub symmetry: Symmetry,
    /// The tile's total mass in the output distribution, split evenly over
    /// its orientations.
    pub weight: f64,
}

impl<T: Clone> Tile<T> {
    /// Creates a tile from its base orientation, generating the others.
    pub fn new(base: Grid2<T>, symmetry: Symmetry, weight: f64) -> Self {
        Self {
            orientations: Self::generate_oriented(base, symmetry),
            symmetry,
            weight,
        }
    }

    /// Creates a tile from explicitly provided orientation images.
    pub fn with_orientations(orientations: Vec<Grid2<T>>, symmetry: Symmetry, weight: f64) -> Self {
        Self {
            orientations,
            symmetry,
            weight,
        }
    }

    /// Generates the distinct orientations of `base` for `symmetry`.
    fn generate_oriented(base: Grid2<T>, symmetry: Symmetry) -> Vec<Grid2<T>> {
        let mut oriented = vec![base.clone()];
        match symmetry {
            Symmetry::X => {}
            Symmetry::I | Symmetry::Backslash => oriented.push(base.rotated()),
            Symmetry::T | Symmetry::L => {
                let r1 = base.rotated();
                let r2 = r1.rotated();
                let r3 = r2.rotated();
                oriented.extend([r1, r2, r3]);
            }
            Symmetry::P => {
                let r1 = base.rotated();
                let r2 = r1.rotated();
                let r3 = r2.rotated();
                let m0 = base.reflected();
                let m1 = m0.rotated();
                let m2 = m1.rotated();
                let m3 = m2.rotated();
                oriented.extend([r1, r2, r3, m0, m1, m2, m3]);
            }
        }
        oriented
    }
}

/// Options for the tiling model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TilingOptions {
    /// Makes the output toroidal.
    pub periodic_output: bool,
}

/// Generates an image by tiling `height` × `width` oriented tiles under the
/// expanded neighbor rules.
pub struct TilingModel<T> {
    tiles: Vec<Tile<T>>,
    /// Flat oriented-pattern id to `(tile, orientation)`.
    id_to_oriented: Vec<(usize, usize)>,
    /// `(tile, orientation)` to flat oriented-pattern id.
    oriented_ids: Vec<Vec<usize>>,
    solver: Solver,
    /// Output height and width, in tiles.
    pub height: usize,
    pub width: usize,
}

impl<T: Copy> TilingModel<T> {
    /// Builds the model. Each neighbor rule `(tile_a, orient_a, tile_b,
    /// orient_b)` means "a in orient_a may sit to the left of b in orient_b";
    /// its orbit under the 8 group actions is inserted automatically.
    pub fn new(
        tiles: Vec<Tile<T>>,
        neighbors: &[(usize, usize, usize, usize)],
        height: usize,
        width: usize,
        options: TilingOptions,
        seed: u64,
    ) -> Result<Self, ModelError> {
        for (index, tile) in tiles.iter().enumerate() {
            let expected = tile.symmetry.orientation_count();
            if tile.orientations.len() != expected {
                return Err(ModelError::OrientationCountMismatch {
                    tile: index,
                    declared: tile.orientations.len(),
                    symmetry: tile.symmetry,
                    expected,
                });
            }
        }
        if let Some(first) = tiles.first().and_then(|t| t.orientations.first()) {
            let size = first.height;
            for tile in &tiles {
                for image in &tile.orientations {
                    if image.height != size || image.width != size {
                        return Err(ModelError::TileSizeMismatch);
                    }
                }
            }
        }

        let (id_to_oriented, oriented_ids) = Self::enumerate_oriented(&tiles);
        let weights = Self::oriented_weights(&tiles);
        let compat = Self::expand_neighbors(neighbors, &tiles, &oriented_ids);
        let solver = Solver::new(
            &weights,
            compat,
            height,
            width,
            options.periodic_output,
            seed,
        )?;

        Ok(Self {
            tiles,
            id_to_oriented,
            oriented_ids,
            solver,
            height,
            width,
        })
    }

    /// Assigns a flat id to every `(tile, orientation)` pair, in order.
    fn enumerate_oriented(tiles: &[Tile<T>]) -> (Vec<(usize, usize)>, Vec<Vec<usize>>) {
        let mut id_to_oriented = Vec::new();
        let mut oriented_ids = Vec::new();
        for (tile, t) in tiles.iter().enumerate() {
            let mut ids = Vec::with_capacity(t.orientations.len());
            for orientation in 0..t.orientations.len() {
                ids.push(id_to_oriented.len());
                id_to_oriented.push((tile, orientation));
            }
            oriented_ids.push(ids);
        }
        (id_to_oriented, oriented_ids)
    }

    /// Splits each tile's weight evenly over its orientations so the tile's
    /// total mass matches its configured weight.
    fn oriented_weights(tiles: &[Tile<T>]) -> Vec<f64> {
        let mut weights = Vec::new();
        for tile in tiles {
            let share = tile.weight / tile.orientations.len() as f64;
            weights.extend(std::iter::repeat(share).take(tile.orientations.len()));
        }
        weights
    }

    /// Expands the neighbor rules over the 8 dihedral actions into the sparse
    /// compatibility lists the solver consumes.
    fn expand_neighbors(
        neighbors: &[(usize, usize, usize, usize)],
        tiles: &[Tile<T>],
        oriented_ids: &[Vec<usize>],
    ) -> Compatibility {
        // The orbit of "right-of" under the dihedral group: the direction
        // each action maps a left/right rule onto.
        const ACTION_DIRECTIONS: [usize; 8] = [2, 0, 1, 3, 1, 3, 2, 0];

        let num_oriented: usize = oriented_ids.iter().map(Vec::len).sum();
        let mut dense: Vec<[Vec<bool>; 4]> = (0..num_oriented)
            .map(|_| {
                [
                    vec![false; num_oriented],
                    vec![false; num_oriented],
                    vec![false; num_oriented],
                    vec![false; num_oriented],
                ]
            })
            .collect();

        let action_maps: Vec<Vec<Vec<usize>>> =
            tiles.iter().map(|t| t.symmetry.action_map()).collect();

        for &(tile1, orientation1, tile2, orientation2) in neighbors {
            if tile1 >= tiles.len() || tile2 >= tiles.len() {
                warn!(
                    "skipping neighbor rule with unknown tile: ({}, {}, {}, {})",
                    tile1, orientation1, tile2, orientation2
                );
                continue;
            }
            let map1 = &action_maps[tile1];
            let map2 = &action_maps[tile2];
            if orientation1 >= map1[0].len() || orientation2 >= map2[0].len() {
                warn!(
                    "skipping neighbor rule with out-of-range orientation: ({}, {}, {}, {})",
                    tile1, orientation1, tile2, orientation2
                );
                continue;
            }

            for (action, &direction) in ACTION_DIRECTIONS.iter().enumerate() {
                let id1 = oriented_ids[tile1][map1[action][orientation1]];
                let id2 = oriented_ids[tile2][map2[action][orientation2]];
                dense[id1][direction][id2] = true;
                dense[id2][opposite(direction)][id1] = true;
            }
        }

        (0..num_oriented)
            .map(|p| {
                let mut lists: [Vec<usize>; 4] = Default::default();
                for (d, list) in lists.iter_mut().enumerate() {
                    *list = (0..num_oriented).filter(|&q| dense[p][d][q]).collect();
                }
                lists
            })
            .collect()
    }

    /// Runs the solver and paints each decided cell's oriented tile into the
    /// output image. Returns `None` on contradiction.
    pub fn run(&mut self) -> Option<Grid2<T>> {
        let ids = self.solver.run()?;
        Some(self.to_image(&ids))
    }

    /// Fixes cell `(i, j)` to one oriented tile before the run.
    ///
    /// Returns false without touching the wave when the tile, orientation, or
    /// coordinates are out of range.
    pub fn set_tile(&mut self, tile: usize, orientation: usize, i: usize, j: usize) -> bool {
        if tile >= self.oriented_ids.len()
            || orientation >= self.oriented_ids[tile].len()
            || i >= self.height
            || j >= self.width
        {
            return false;
        }
        let id = self.oriented_ids[tile][orientation];
        for pattern in 0..self.id_to_oriented.len() {
            if pattern != id {
                self.solver.disallow(i, j, pattern);
            }
        }
        true
    }

    fn to_image(&self, ids: &Grid2<usize>) -> Grid2<T> {
        let size = self.tiles[0].orientations[0].height;
        let sample = *self.tiles[0].orientations[0].get(0, 0);
        let mut output = Grid2::filled(size * ids.height, size * ids.width, sample);
        for i in 0..ids.height {
            for j in 0..ids.width {
                let (tile, orientation) = self.id_to_oriented[*ids.get(i, j)];
                let image = &self.tiles[tile].orientations[orientation];
                for y in 0..size {
                    for x in 0..size {
                        *output.get_mut(i * size + y, j * size + x) = *image.get(y, x);
                    }
                }
            }
        }
        output
    }
}
