//! Wave state: per-cell pattern admissibility and memoized entropy.

use bitvec::prelude::*;

use crate::rng::Lcg;

/// Result of querying the wave for the next cell to collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Some cell has no admissible pattern left.
    Contradiction,
    /// Every cell holds exactly one pattern.
    AllDecided,
    /// The undecided cell with minimum entropy.
    Cell(usize),
}

/// Pattern admissibility for every cell of the output grid.
///
/// Entropy is read on every observation, so the quantities it derives from
/// (`Σ p·ln p`, `Σ p`, `ln Σ p`, pattern count) are maintained incrementally
/// on each [`Wave::set`] instead of being recomputed per cell. The entropy of
/// a cell is `ln Σp − (Σ p·ln p)/Σp` over its still-allowed patterns.
pub struct Wave {
    /// Normalized pattern weights.
    weights: Vec<f64>,
    /// Precomputed `weights[p] * ln(weights[p])`.
    plogp: Vec<f64>,
    /// Upper bound for tie-break noise: `min_p |plogp[p]| / 2`. Strictly
    /// below the smallest possible entropy gap, so noise never changes which
    /// cell has minimum entropy, only how ties break.
    noise_bound: f64,
    plogp_sum: Vec<f64>,
    sum: Vec<f64>,
    log_sum: Vec<f64>,
    remaining: Vec<usize>,
    entropy: Vec<f64>,
    /// Set as soon as any cell runs out of patterns.
    impossible: bool,
    num_patterns: usize,
    /// Flat admissibility bitmap, one bit per `(cell, pattern)`.
    data: BitVec,
    pub height: usize,
    pub width: usize,
    pub size: usize,
}

impl Wave {
    /// Creates a wave with every pattern allowed in every cell.
    ///
    /// `weights` must already be normalized to sum to 1.
    pub fn new(height: usize, width: usize, weights: &[f64]) -> Self {
        let num_patterns = weights.len();
        let size = height * width;
        let plogp: Vec<f64> = weights.iter().map(|&w| w * w.ln()).collect();
        let noise_bound = plogp
            .iter()
            .map(|&v| (v / 2.0).abs())
            .fold(f64::INFINITY, f64::min);

        let base_plogp: f64 = plogp.iter().sum();
        let base_sum: f64 = weights.iter().sum();
        let base_log_sum = base_sum.ln();
        let base_entropy = base_log_sum - base_plogp / base_sum;

        Self {
            weights: weights.to_vec(),
            plogp,
            noise_bound,
            plogp_sum: vec![base_plogp; size],
            sum: vec![base_sum; size],
            log_sum: vec![base_log_sum; size],
            remaining: vec![num_patterns; size],
            entropy: vec![base_entropy; size],
            impossible: false,
            num_patterns,
            data: bitvec![1; size * num_patterns],
            height,
            width,
            size,
        }
    }

    /// The flat cell index of `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.width + j
    }

    /// Whether `pattern` is still admissible in cell `index`.
    #[inline]
    pub fn get(&self, index: usize, pattern: usize) -> bool {
        self.data[index * self.num_patterns + pattern]
    }

    /// Updates the admissibility of `pattern` in cell `index`.
    ///
    /// A no-op when the value is unchanged. Patterns only transition from
    /// allowed to disallowed over the lifetime of a solve.
    pub fn set(&mut self, index: usize, pattern: usize, value: bool) {
        let bit = index * self.num_patterns + pattern;
        if self.data[bit] == value {
            return;
        }
        debug_assert!(!value, "patterns are never re-allowed");
        self.data.set(bit, value);

        self.plogp_sum[index] -= self.plogp[pattern];
        self.sum[index] -= self.weights[pattern];
        self.log_sum[index] = self.sum[index].ln();
        self.remaining[index] -= 1;
        self.entropy[index] = self.log_sum[index] - self.plogp_sum[index] / self.sum[index];
        if self.remaining[index] == 0 {
            self.impossible = true;
        }
    }

    /// Number of patterns the wave was built with.
    #[inline]
    pub fn num_patterns(&self) -> usize {
        self.num_patterns
    }

    /// Number of patterns still admissible in cell `index`.
    #[inline]
    pub fn remaining(&self, index: usize) -> usize {
        self.remaining[index]
    }

    /// Memoized entropy of cell `index`.
    #[inline]
    pub fn entropy(&self, index: usize) -> f64 {
        self.entropy[index]
    }

    /// The normalized weights the wave was built with.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// True once any cell has run out of admissible patterns.
    #[inline]
    pub fn is_impossible(&self) -> bool {
        self.impossible
    }

    /// Returns the undecided cell with minimum entropy, with bounded noise
    /// breaking ties; or the overall solve status if there is none.
    pub fn min_entropy_cell(&self, rng: &mut Lcg) -> Observation {
        if self.impossible {
            return Observation::Contradiction;
        }

        let mut min = f64::INFINITY;
        let mut argmin = None;

        for i in 0..self.size {
            // Decided cells are skipped; their entropy is 0 by convention.
            if self.remaining[i] == 1 {
                continue;
            }

            let entropy = self.entropy[i];
            // Cheap pre-check before paying for a noise draw.
            if min >= entropy {
                let noise = rng.next_double() * self.noise_bound;
                if entropy + noise < min {
                    min = entropy + noise;
                    argmin = Some(i);
                }
            }
        }

        match argmin {
            Some(i) => Observation::Cell(i),
            None => Observation::AllDecided,
        }
    }
}
