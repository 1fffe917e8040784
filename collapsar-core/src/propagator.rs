//! Worklist-driven arc-consistency propagation.

use crate::direction::{opposite, DIRECTIONS_X, DIRECTIONS_Y, NUM_DIRECTIONS};
use crate::grid::Grid3;
use crate::wave::Wave;

/// For each pattern and direction, the patterns allowed to sit in the
/// neighboring cell in that direction. Must satisfy the adjacency symmetry
/// `q ∈ compat[p][d] ⇔ p ∈ compat[q][3 − d]`.
pub type Compatibility = Vec<[Vec<usize>; NUM_DIRECTIONS]>;

/// Maintains per-cell, per-pattern directional supporter counters and drains
/// a worklist of freshly disallowed `(y, x, pattern)` triples until the wave
/// reaches arc consistency.
///
/// `supporters.get(y, x, p)[d]` counts the patterns still allowed in the
/// cell the propagation reaches `(y, x)` from along `d` that keep `p` legal
/// here. When a counter reaches exactly zero the pattern has lost all support
/// from that side and is removed from the wave. Counters of an already
/// disallowed pattern are zeroed on removal, so later decrements drive them
/// negative without re-triggering.
pub struct Propagator {
    compat: Compatibility,
    wave_height: usize,
    wave_width: usize,
    periodic_output: bool,
    worklist: Vec<(usize, usize, usize)>,
    supporters: Grid3<[i32; NUM_DIRECTIONS]>,
}

impl Propagator {
    /// Builds the propagator and initializes every supporter counter to the
    /// number of patterns compatible in the opposite direction.
    pub fn new(
        wave_height: usize,
        wave_width: usize,
        periodic_output: bool,
        compat: Compatibility,
    ) -> Self {
        let num_patterns = compat.len();
        let mut supporters = Grid3::new(wave_height, wave_width, num_patterns);
        for y in 0..wave_height {
            for x in 0..wave_width {
                for pattern in 0..num_patterns {
                    let mut counts = [0i32; NUM_DIRECTIONS];
                    for (direction, count) in counts.iter_mut().enumerate() {
                        *count = compat[pattern][opposite(direction)].len() as i32;
                    }
                    *supporters.get_mut(y, x, pattern) = counts;
                }
            }
        }

        Self {
            compat,
            wave_height,
            wave_width,
            periodic_output,
            worklist: Vec::new(),
            supporters,
        }
    }

    /// Records that `pattern` was just disallowed at `(y, x)`.
    ///
    /// Zeroes all four supporter counters for the pair, so that pending
    /// decrements cannot bring one back to exactly zero, and appends the
    /// triple to the worklist.
    pub fn enqueue(&mut self, y: usize, x: usize, pattern: usize) {
        *self.supporters.get_mut(y, x, pattern) = [0; NUM_DIRECTIONS];
        self.worklist.push((y, x, pattern));
    }

    /// Drains the worklist, removing patterns that lose their last supporter,
    /// until a fixed point is reached.
    pub fn propagate(&mut self, wave: &mut Wave) {
        let compat = &self.compat;
        let supporters = &mut self.supporters;
        let worklist = &mut self.worklist;

        while let Some((y1, x1, pattern)) = worklist.pop() {
            for direction in 0..NUM_DIRECTIONS {
                let dy = DIRECTIONS_Y[direction];
                let dx = DIRECTIONS_X[direction];

                let (y2, x2) = if self.periodic_output {
                    (
                        (y1 as isize + dy).rem_euclid(self.wave_height as isize) as usize,
                        (x1 as isize + dx).rem_euclid(self.wave_width as isize) as usize,
                    )
                } else {
                    let y2 = y1 as isize + dy;
                    let x2 = x1 as isize + dx;
                    if y2 < 0
                        || y2 >= self.wave_height as isize
                        || x2 < 0
                        || x2 >= self.wave_width as isize
                    {
                        continue;
                    }
                    (y2 as usize, x2 as usize)
                };
                let index2 = y2 * self.wave_width + x2;

                // Every pattern that relied on `pattern` for support from
                // this side loses one supporter.
                for &q in &compat[pattern][direction] {
                    let counts = supporters.get_mut(y2, x2, q);
                    counts[direction] -= 1;
                    if counts[direction] == 0 {
                        *counts = [0; NUM_DIRECTIONS];
                        worklist.push((y2, x2, q));
                        wave.set(index2, q, false);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn supporter_counts(&self, y: usize, x: usize, pattern: usize) -> [i32; NUM_DIRECTIONS] {
        *self.supporters.get(y, x, pattern)
    }
}
