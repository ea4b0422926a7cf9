use std::ops::Range;

/// A rectangular block `[rows] × [cols]` of an n×n matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

/// The grid of `edge`-sized tiles covering an n×n matrix, flattened
/// row-tile-major into indices `0..len()`.
///
/// Tiles on the last row/column of the grid are truncated at `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    n: usize,
    edge: usize,
    per_side: usize,
}

impl TileGrid {
    /// # Panics
    /// Panics if `edge == 0`.
    pub fn new(n: usize, edge: usize) -> Self {
        assert!(edge > 0, "tile edge must be > 0");
        TileGrid {
            n,
            edge,
            per_side: n.div_ceil(edge),
        }
    }

    /// Number of tiles along one side.
    pub fn per_side(&self) -> usize {
        self.per_side
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.per_side * self.per_side
    }

    pub fn is_empty(&self) -> bool {
        self.per_side == 0
    }

    /// Tile at flattened index `k`: row tile `k / per_side`, column tile
    /// `k % per_side`.
    pub fn tile(&self, k: usize) -> Tile {
        debug_assert!(k < self.len());
        let ii = (k / self.per_side) * self.edge;
        let jj = (k % self.per_side) * self.edge;
        Tile {
            rows: ii..(ii + self.edge).min(self.n),
            cols: jj..(jj + self.edge).min(self.n),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.len()).map(move |k| self.tile(k))
    }
}
