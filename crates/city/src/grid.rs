use std::collections::{BTreeSet, HashMap};

use glam::Vec3;
use rooftop_common::{Aabb, Ray};

use crate::CityPiece;

/// A 2D cell coordinate in the collider grid (the Y axis is not partitioned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Fixed-size XZ grid bucketing city pieces by footprint.
///
/// A piece is placed in every cell its footprint overlaps. Cell lists hold
/// piece indices in ascending order so queries come back in a stable order.
#[derive(Debug, Clone)]
pub struct ColliderGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl ColliderGrid {
    /// Create an empty grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Rebuild the grid from a piece list. Piece `i` is stored under index `i`.
    pub fn rebuild(&mut self, pieces: &[CityPiece]) {
        self.cells.clear();
        for (index, piece) in pieces.iter().enumerate() {
            for coord in self.cells_for(&piece.bounds) {
                self.cells.entry(coord).or_default().push(index);
            }
        }
    }

    /// Convert a world position to a cell coordinate.
    pub fn position_to_cell(&self, pos: Vec3) -> CellCoord {
        CellCoord {
            x: (pos.x / self.cell_size).floor() as i32,
            z: (pos.z / self.cell_size).floor() as i32,
        }
    }

    /// All cells overlapped by the XZ footprint of a box.
    pub fn cells_for(&self, aabb: &Aabb) -> Vec<CellCoord> {
        let lo = self.position_to_cell(aabb.min);
        let hi = self.position_to_cell(aabb.max);
        let mut out = Vec::with_capacity(((hi.x - lo.x + 1) * (hi.z - lo.z + 1)).max(0) as usize);
        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                out.push(CellCoord::new(x, z));
            }
        }
        out
    }

    /// Candidate pieces whose cells overlap the box, sorted and deduplicated.
    pub fn pieces_in_aabb(&self, aabb: &Aabb) -> Vec<usize> {
        let mut found = BTreeSet::new();
        for coord in self.cells_for(aabb) {
            if let Some(list) = self.cells.get(&coord) {
                found.extend(list.iter().copied());
            }
        }
        found.into_iter().collect()
    }

    /// Candidate pieces along a ray segment of length `max_t`.
    pub fn pieces_along_ray(&self, ray: &Ray, max_t: f32) -> Vec<usize> {
        let end = ray.at(max_t);
        self.pieces_in_aabb(&Aabb::new(ray.origin, end))
    }

    /// Get the piece indices stored in one cell.
    pub fn pieces_in_cell(&self, coord: CellCoord) -> &[usize] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of piece placements across all cells.
    pub fn total_placements(&self) -> usize {
        self.cells.values().map(|s| s.len()).sum()
    }
}
