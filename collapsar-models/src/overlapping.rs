//! Overlapping adapter: N×N sub-patterns of a sample bitmap.

use std::collections::HashMap;
use std::hash::Hash;

use collapsar_core::direction::{DIRECTIONS_X, DIRECTIONS_Y, NUM_DIRECTIONS};
use collapsar_core::{Compatibility, Grid2, Solver};
use log::debug;

use crate::ModelError;

/// Options for the overlapping model.
#[derive(Debug, Clone, Copy)]
pub struct OverlappingOptions {
    /// Treat the input bitmap as toroidal when extracting windows.
    pub periodic_input: bool,
    /// Make the output toroidal.
    pub periodic_output: bool,
    /// Output height in pixels.
    pub out_height: usize,
    /// Output width in pixels.
    pub out_width: usize,
    /// How many of the 8 dihedral variants of each window to keep (1..=8).
    pub symmetry: usize,
    /// Pin the bottom-middle input pattern to the output's bottom row.
    pub ground: bool,
    /// Pattern edge length N.
    pub pattern_size: usize,
}

impl OverlappingOptions {
    /// Wave height for these options. Non-periodic outputs leave room for the
    /// pattern footprint.
    pub fn wave_height(&self) -> usize {
        if self.periodic_output {
            self.out_height
        } else {
            self.out_height - self.pattern_size + 1
        }
    }

    /// Wave width for these options.
    pub fn wave_width(&self) -> usize {
        if self.periodic_output {
            self.out_width
        } else {
            self.out_width - self.pattern_size + 1
        }
    }
}

/// Generates a new image whose every N×N window is a (possibly symmetrized)
/// window of the input bitmap, with empirical frequencies as weights.
pub struct OverlappingModel<T> {
    options: OverlappingOptions,
    /// The deduplicated patterns, indexed by solver pattern id.
    patterns: Vec<Grid2<T>>,
    solver: Solver,
}

impl<T: Copy + Eq + Hash> OverlappingModel<T> {
    /// Extracts patterns from `input`, derives their compatibility, and
    /// builds the solver. `seed` fully determines the later run.
    pub fn new(
        input: Grid2<T>,
        options: OverlappingOptions,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if options.symmetry == 0 || options.symmetry > 8 {
            return Err(ModelError::InvalidSymmetry(options.symmetry));
        }
        if !options.periodic_input
            && (input.height < options.pattern_size || input.width < options.pattern_size)
        {
            return Err(ModelError::InputTooSmall {
                height: input.height,
                width: input.width,
                pattern_size: options.pattern_size,
            });
        }
        if !options.periodic_output
            && (options.out_height < options.pattern_size
                || options.out_width < options.pattern_size)
        {
            return Err(ModelError::OutputTooSmall {
                out_height: options.out_height,
                out_width: options.out_width,
                pattern_size: options.pattern_size,
            });
        }

        let (patterns, weights) = Self::extract_patterns(&input, &options);
        debug!("extracted {} distinct patterns", patterns.len());
        let compat = Self::generate_compat(&patterns);

        let mut solver = Solver::new(
            &weights,
            compat,
            options.wave_height(),
            options.wave_width(),
            options.periodic_output,
            seed,
        )?;

        if options.ground {
            let ground = input.sub_grid(
                input.height - 1,
                input.width / 2,
                options.pattern_size,
                options.pattern_size,
            );
            let ground_id = patterns
                .iter()
                .position(|p| *p == ground)
                .ok_or(ModelError::GroundPatternMissing)?;

            // Pin the ground pattern along the bottom row and ban it above.
            for j in 0..options.wave_width() {
                for pattern in 0..patterns.len() {
                    if pattern != ground_id {
                        solver.disallow(options.wave_height() - 1, j, pattern);
                    }
                }
            }
            for i in 0..options.wave_height() - 1 {
                for j in 0..options.wave_width() {
                    solver.disallow(i, j, ground_id);
                }
            }
            solver.propagate();
        }

        Ok(Self {
            options,
            patterns,
            solver,
        })
    }

    /// The deduplicated pattern list, indexed by solver pattern id.
    pub fn patterns(&self) -> &[Grid2<T>] {
        &self.patterns
    }

    /// Slides an N×N window over the input, expands each window under the
    /// first `symmetry` elements of the dihedral group, and deduplicates with
    /// frequency counting.
    fn extract_patterns(
        input: &Grid2<T>,
        options: &OverlappingOptions,
    ) -> (Vec<Grid2<T>>, Vec<f64>) {
        let n = options.pattern_size;
        let max_i = if options.periodic_input {
            input.height
        } else {
            input.height - n + 1
        };
        let max_j = if options.periodic_input {
            input.width
        } else {
            input.width - n + 1
        };

        let mut ids: HashMap<Grid2<T>, usize> = HashMap::new();
        let mut patterns = Vec::new();
        let mut weights: Vec<f64> = Vec::new();

        for i in 0..max_i {
            for j in 0..max_j {
                let s0 = input.sub_grid(i, j, n, n);
                let s1 = s0.reflected();
                let s2 = s0.rotated();
                let s3 = s2.reflected();
                let s4 = s2.rotated();
                let s5 = s4.reflected();
                let s6 = s4.rotated();
                let s7 = s6.reflected();
                let variants = [s0, s1, s2, s3, s4, s5, s6, s7];

                for variant in variants.into_iter().take(options.symmetry) {
                    match ids.get(&variant) {
                        Some(&id) => weights[id] += 1.0,
                        None => {
                            ids.insert(variant.clone(), patterns.len());
                            patterns.push(variant);
                            weights.push(1.0);
                        }
                    }
                }
            }
        }

        (patterns, weights)
    }

    /// True when `a` and `b` agree on every pixel of their overlap once `b`
    /// is offset by `(dy, dx)`.
    fn agrees(a: &Grid2<T>, b: &Grid2<T>, dy: isize, dx: isize) -> bool {
        let xmin = if dx < 0 { 0 } else { dx as usize };
        let xmax = if dx < 0 {
            (dx + b.width as isize) as usize
        } else {
            a.width
        };
        let ymin = if dy < 0 { 0 } else { dy as usize };
        let ymax = if dy < 0 {
            (dy + b.height as isize) as usize
        } else {
            a.height
        };

        for y in ymin..ymax {
            for x in xmin..xmax {
                if a.get(y, x) != b.get((y as isize - dy) as usize, (x as isize - dx) as usize) {
                    return false;
                }
            }
        }
        true
    }

    /// Precomputes `agrees` over every ordered pattern pair and direction.
    fn generate_compat(patterns: &[Grid2<T>]) -> Compatibility {
        (0..patterns.len())
            .map(|p| {
                let mut lists: [Vec<usize>; NUM_DIRECTIONS] = Default::default();
                for (d, list) in lists.iter_mut().enumerate() {
                    *list = (0..patterns.len())
                        .filter(|&q| {
                            Self::agrees(
                                &patterns[p],
                                &patterns[q],
                                DIRECTIONS_Y[d],
                                DIRECTIONS_X[d],
                            )
                        })
                        .collect();
                }
                lists
            })
            .collect()
    }

    /// Runs the solver and reconstructs the output bitmap. Returns `None` on
    /// contradiction.
    pub fn run(&mut self) -> Option<Grid2<T>> {
        let output_patterns = self.solver.run()?;
        Some(self.to_image(&output_patterns))
    }

    /// Fixes cell `(i, j)` to the given pattern before the run.
    ///
    /// Returns false without touching the wave when the pattern is unknown or
    /// the coordinates are outside the wave.
    pub fn set_pattern(&mut self, pattern: &Grid2<T>, i: usize, j: usize) -> bool {
        let id = match self.patterns.iter().position(|p| p == pattern) {
            Some(id) => id,
            None => return false,
        };
        if i >= self.options.wave_height() || j >= self.options.wave_width() {
            return false;
        }
        for other in 0..self.patterns.len() {
            if other != id {
                self.solver.disallow(i, j, other);
            }
        }
        true
    }

    /// Converts decided pattern ids back to pixels. Periodic outputs take the
    /// top-left pixel of each cell's pattern; non-periodic outputs
    /// additionally fill the right and bottom seams from the border patterns'
    /// full footprints.
    fn to_image(&self, output_patterns: &Grid2<usize>) -> Grid2<T> {
        let n = self.options.pattern_size;
        let wave_height = self.options.wave_height();
        let wave_width = self.options.wave_width();
        let sample = *self.patterns[0].get(0, 0);
        let mut output = Grid2::filled(self.options.out_height, self.options.out_width, sample);

        for y in 0..wave_height {
            for x in 0..wave_width {
                *output.get_mut(y, x) = *self.patterns[*output_patterns.get(y, x)].get(0, 0);
            }
        }
        if !self.options.periodic_output {
            for y in 0..wave_height {
                let pattern = &self.patterns[*output_patterns.get(y, wave_width - 1)];
                for dx in 1..n {
                    *output.get_mut(y, wave_width - 1 + dx) = *pattern.get(0, dx);
                }
            }
            for x in 0..wave_width {
                let pattern = &self.patterns[*output_patterns.get(wave_height - 1, x)];
                for dy in 1..n {
                    *output.get_mut(wave_height - 1 + dy, x) = *pattern.get(dy, 0);
                }
            }
            let corner = &self.patterns[*output_patterns.get(wave_height - 1, wave_width - 1)];
            for dy in 1..n {
                for dx in 1..n {
                    *output.get_mut(wave_height - 1 + dy, wave_width - 1 + dx) =
                        *corner.get(dy, dx);
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(out: usize, symmetry: usize) -> OverlappingOptions {
        OverlappingOptions {
            periodic_input: true,
            periodic_output: true,
            out_height: out,
            out_width: out,
            symmetry,
            ground: false,
            pattern_size: 2,
        }
    }

    #[test]
    fn four_distinct_windows_become_four_patterns() {
        let input = Grid2::from_vec(2, 2, vec![1u8, 2, 3, 4]);
        let (patterns, weights) = OverlappingModel::extract_patterns(&input, &options(4, 1));
        assert_eq!(patterns.len(), 4);
        assert!(weights.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn symmetry_one_is_the_raw_sliding_window() {
        let input = Grid2::from_vec(3, 3, vec![0u8, 1, 0, 1, 1, 0, 0, 0, 1]);
        let opts = OverlappingOptions {
            periodic_input: false,
            ..options(4, 1)
        };
        let (patterns, _) = OverlappingModel::extract_patterns(&input, &opts);

        let mut expected = Vec::new();
        for i in 0..2 {
            for j in 0..2 {
                let window = input.sub_grid(i, j, 2, 2);
                if !expected.contains(&window) {
                    expected.push(window);
                }
            }
        }
        assert_eq!(patterns, expected);
    }

    #[test]
    fn symmetry_two_adds_the_reflections() {
        let input = Grid2::from_vec(2, 2, vec![1u8, 2, 3, 4]);
        let (patterns, _) = OverlappingModel::extract_patterns(&input, &options(4, 2));
        let window = input.sub_grid(0, 0, 2, 2);
        assert!(patterns.contains(&window));
        assert!(patterns.contains(&window.reflected()));
    }

    #[test]
    fn frequencies_count_repeated_windows() {
        // Constant input: one pattern, seen at every position.
        let input = Grid2::filled(3, 3, 5u8);
        let (patterns, weights) = OverlappingModel::extract_patterns(&input, &options(4, 1));
        assert_eq!(patterns.len(), 1);
        assert_eq!(weights, vec![9.0]);
    }

    #[test]
    fn agrees_checks_the_overlap_region() {
        let a = Grid2::from_vec(2, 2, vec![1u8, 2, 3, 4]);
        let b = Grid2::from_vec(2, 2, vec![2u8, 9, 4, 9]);
        // b shifted one column right of a: a's right column must equal b's
        // left column.
        assert!(OverlappingModel::agrees(&a, &b, 0, 1));
        assert!(!OverlappingModel::agrees(&a, &b, 0, -1));
        // Vertical: b below a needs a's bottom row == b's top row.
        let c = Grid2::from_vec(2, 2, vec![3u8, 4, 9, 9]);
        assert!(OverlappingModel::agrees(&a, &c, 1, 0));
        assert!(!OverlappingModel::agrees(&a, &c, -1, 0));
    }

    #[test]
    fn compat_is_symmetric_across_opposite_directions() {
        let input = Grid2::from_vec(3, 3, vec![0u8, 1, 0, 1, 1, 0, 0, 0, 1]);
        let (patterns, _) = OverlappingModel::extract_patterns(&input, &options(4, 8));
        let compat = OverlappingModel::generate_compat(&patterns);
        for (p, lists) in compat.iter().enumerate() {
            for (d, list) in lists.iter().enumerate() {
                for &q in list {
                    assert!(compat[q][3 - d].contains(&p));
                }
            }
        }
    }

    #[test]
    fn every_output_window_is_an_input_pattern() {
        let input = Grid2::from_vec(2, 2, vec![1u8, 2, 3, 4]);
        let mut solved = None;
        for seed in 1..=32 {
            let mut model = OverlappingModel::new(input.clone(), options(4, 1), seed).unwrap();
            if let Some(output) = model.run() {
                solved = Some((model, output));
                break;
            }
        }
        let (model, output) = solved.expect("some seed must solve the toroidal 4x4");
        assert_eq!((output.height, output.width), (4, 4));
        for y in 0..4 {
            for x in 0..4 {
                let window = output.sub_grid(y, x, 2, 2);
                assert!(
                    model.patterns().contains(&window),
                    "window at ({}, {}) is not an input pattern",
                    y,
                    x
                );
            }
        }
    }

    #[test]
    fn rejects_input_smaller_than_pattern() {
        let input = Grid2::filled(1, 3, 0u8);
        let opts = OverlappingOptions {
            periodic_input: false,
            ..options(4, 1)
        };
        let err = OverlappingModel::new(input, opts, 1).err();
        assert!(matches!(err, Some(ModelError::InputTooSmall { .. })));
    }

    #[test]
    fn rejects_output_smaller_than_pattern() {
        let input = Grid2::filled(3, 3, 0u8);
        let opts = OverlappingOptions {
            periodic_output: false,
            out_height: 1,
            out_width: 1,
            ..options(4, 1)
        };
        let err = OverlappingModel::new(input, opts, 1).err();
        assert!(matches!(err, Some(ModelError::OutputTooSmall { .. })));
    }

    #[test]
    fn rejects_symmetry_out_of_range() {
        let input = Grid2::filled(3, 3, 0u8);
        assert!(matches!(
            OverlappingModel::new(input.clone(), options(4, 0), 1).err(),
            Some(ModelError::InvalidSymmetry(0))
        ));
        assert!(matches!(
            OverlappingModel::new(input, options(4, 9), 1).err(),
            Some(ModelError::InvalidSymmetry(9))
        ));
    }

    #[test]
    fn ground_pins_the_bottom_row() {
        const S: u8 = 0;
        const G: u8 = 1;
        // Three rows of sky above one row of ground.
        let input = Grid2::from_vec(4, 4, vec![S, S, S, S, S, S, S, S, S, S, S, S, G, G, G, G]);
        let opts = OverlappingOptions {
            periodic_input: true,
            periodic_output: true,
            out_height: 6,
            out_width: 6,
            symmetry: 1,
            ground: true,
            pattern_size: 2,
        };
        let model = OverlappingModel::new(input.clone(), opts, 3).unwrap();

        let ground = input.sub_grid(3, 2, 2, 2);
        let ground_id = model
            .patterns()
            .iter()
            .position(|p| *p == ground)
            .expect("ground pattern was extracted");

        let wave = model.solver.wave();
        assert!(!wave.is_impossible());
        for j in 0..6 {
            let index = wave.index(5, j);
            assert!(wave.get(index, ground_id));
            assert_eq!(wave.remaining(index), 1);
        }
        for i in 0..5 {
            for j in 0..6 {
                assert!(!wave.get(wave.index(i, j), ground_id));
            }
        }
    }

    #[test]
    fn ground_run_paints_ground_pixels_across_the_bottom() {
        const S: u8 = 0;
        const G: u8 = 1;
        let input = Grid2::from_vec(4, 4, vec![S, S, S, S, S, S, S, S, S, S, S, S, G, G, G, G]);
        let opts = OverlappingOptions {
            periodic_input: true,
            periodic_output: true,
            out_height: 6,
            out_width: 6,
            symmetry: 1,
            ground: true,
            pattern_size: 2,
        };
        let mut model = OverlappingModel::new(input, opts, 3).unwrap();
        let output = model.run().expect("ground layout is satisfiable");
        for x in 0..6 {
            assert_eq!(*output.get(5, x), G);
        }
        for x in 0..6 {
            assert_eq!(*output.get(0, x), S);
        }
    }

    #[test]
    fn set_pattern_validates_its_inputs() {
        let input = Grid2::from_vec(2, 2, vec![1u8, 2, 3, 4]);
        let mut model = OverlappingModel::new(input.clone(), options(4, 1), 1).unwrap();
        let known = input.sub_grid(0, 0, 2, 2);
        let unknown = Grid2::filled(2, 2, 9u8);
        assert!(!model.set_pattern(&unknown, 0, 0));
        assert!(!model.set_pattern(&known, 4, 0));
        assert!(!model.set_pattern(&known, 0, 4));
        assert!(model.set_pattern(&known, 1, 1));
        let wave = model.solver.wave();
        assert_eq!(wave.remaining(wave.index(1, 1)), 1);
    }

    mod proptests {
        use crate::overlapping::{OverlappingModel, OverlappingOptions};
        use collapsar_core::Grid2;
        use proptest::prelude::*;

        proptest! {
            // Invariant: q ∈ compat[p][d] ⇔ p ∈ compat[q][3 − d], for
            // compatibility derived from arbitrary small inputs.
            #[test]
            fn compat_symmetry_holds_for_random_inputs(
                height in 2usize..5,
                width in 2usize..5,
                symmetry in 1usize..=8,
                periodic_input in proptest::bool::ANY,
                seed_pixels in proptest::collection::vec(0u8..3, 16),
            ) {
                let data: Vec<u8> = (0..height * width)
                    .map(|i| seed_pixels[i % seed_pixels.len()])
                    .collect();
                let input = Grid2::from_vec(height, width, data);
                let opts = OverlappingOptions {
                    periodic_input,
                    periodic_output: true,
                    out_height: 4,
                    out_width: 4,
                    symmetry,
                    ground: false,
                    pattern_size: 2,
                };
                let (patterns, weights) =
                    OverlappingModel::extract_patterns(&input, &opts);
                prop_assert_eq!(patterns.len(), weights.len());
                let compat = OverlappingModel::generate_compat(&patterns);
                for (p, lists) in compat.iter().enumerate() {
                    for (d, list) in lists.iter().enumerate() {
                        for &q in list {
                            prop_assert!(compat[q][3 - d].contains(&p));
                        }
                    }
                }
            }
        }
    }
}
