//! Contiguous row-major grid storage.

/// A 2D array stored in a single `Vec` for cache friendliness.
///
/// Equality and hashing are structural (dimensions plus every element), so an
/// N×N pattern can key a `HashMap` during pattern deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid2<T> {
    pub height: usize,
    pub width: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid2<T> {
    /// Creates a grid of the given dimensions filled with default values.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![T::default(); height * width],
        }
    }
}

impl<T: Clone> Grid2<T> {
    /// Creates a grid of the given dimensions filled with `value`.
    pub fn filled(height: usize, width: usize, value: T) -> Self {
        Self {
            height,
            width,
            data: vec![value; height * width],
        }
    }
}

impl<T> Grid2<T> {
    /// Wraps an existing row-major buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != height * width`.
    pub fn from_vec(height: usize, width: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            height * width,
            "buffer length does not match grid dimensions"
        );
        Self {
            height,
            width,
            data,
        }
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.height && j < self.width);
        i * self.width + j
    }

    /// Returns the element in row `i`, column `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.index(i, j)]
    }

    /// Returns a mutable reference to the element in row `i`, column `j`.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let index = self.index(i, j);
        &mut self.data[index]
    }

    /// The underlying row-major buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: Clone> Grid2<T> {
    /// Returns the grid mirrored horizontally.
    pub fn reflected(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(self.get(y, self.width - 1 - x).clone());
            }
        }
        Self {
            height: self.height,
            width: self.width,
            data,
        }
    }

    /// Returns the grid rotated 90° counter-clockwise. Height and width swap.
    pub fn rotated(&self) -> Self {
        let mut result = Vec::with_capacity(self.data.len());
        for y in 0..self.width {
            for x in 0..self.height {
                result.push(self.get(x, self.width - 1 - y).clone());
            }
        }
        Self {
            height: self.width,
            width: self.height,
            data: result,
        }
    }

    /// Copies the `sub_height` × `sub_width` window starting at `(y, x)`,
    /// treating the grid as toroidal.
    pub fn sub_grid(&self, y: usize, x: usize, sub_height: usize, sub_width: usize) -> Self {
        let mut data = Vec::with_capacity(sub_height * sub_width);
        for ki in 0..sub_height {
            for kj in 0..sub_width {
                data.push(self.get((y + ki) % self.height, (x + kj) % self.width).clone());
            }
        }
        Self {
            height: sub_height,
            width: sub_width,
            data,
        }
    }
}

/// A 3D array stored in a single `Vec`, indexed `(i, j, k)`.
#[derive(Debug, Clone)]
pub struct Grid3<T> {
    pub height: usize,
    pub width: usize,
    pub depth: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid3<T> {
    /// Creates a grid of the given dimensions filled with default values.
    pub fn new(height: usize, width: usize, depth: usize) -> Self {
        Self {
            height,
            width,
            depth,
            data: vec![T::default(); height * width * depth],
        }
    }
}

impl<T> Grid3<T> {
    #[inline]
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.height && j < self.width && k < self.depth);
        (i * self.width + j) * self.depth + k
    }

    /// Returns the element at `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        &self.data[self.index(i, j, k)]
    }

    /// Returns a mutable reference to the element at `(i, j, k)`.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut T {
        let index = self.index(i, j, k);
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn grid_2x3() -> Grid2<u8> {
        // 1 2 3
        // 4 5 6
        Grid2::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn reflected_mirrors_columns() {
        let g = grid_2x3().reflected();
        assert_eq!(g.data(), &[3, 2, 1, 6, 5, 4]);
        assert_eq!((g.height, g.width), (2, 3));
    }

    #[test]
    fn rotated_turns_counter_clockwise() {
        // Rotating 90° CCW sends column j to row (width - 1 - j).
        let g = grid_2x3().rotated();
        assert_eq!((g.height, g.width), (3, 2));
        assert_eq!(g.data(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn sub_grid_wraps_toroidally() {
        let g = grid_2x3();
        let s = g.sub_grid(1, 2, 2, 2);
        // Starts at (1,2)=6, wraps to column 0 and row 0.
        assert_eq!(s.data(), &[6, 4, 3, 1]);
    }

    #[test]
    fn equality_and_hash_are_structural() {
        let a = grid_2x3();
        let b = grid_2x3();
        assert_eq!(a, b);
        let mut map = HashMap::new();
        map.insert(a, 0usize);
        assert!(map.contains_key(&b));
        let c = b.reflected();
        assert!(!map.contains_key(&c));
    }

    #[test]
    fn rotated_four_times_is_identity() {
        let g = grid_2x3();
        assert_eq!(g.rotated().rotated().rotated().rotated(), g);
    }

    #[test]
    fn grid3_round_trips_values() {
        let mut g: Grid3<i32> = Grid3::new(2, 2, 3);
        *g.get_mut(1, 0, 2) = 7;
        assert_eq!(*g.get(1, 0, 2), 7);
        assert_eq!(*g.get(0, 0, 0), 0);
    }
}
