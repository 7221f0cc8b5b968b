//! Terrain grid description shared by every modifier node.
//!
//! [`GridDescriptor`] fixes the cell resolution, physical extents, height scale,
//! and origin of one evaluation. Height-producing nodes in one graph all share
//! the same resolution; the Start node is the source of truth and downstream
//! nodes propagate the descriptor from their first input.
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Immutable-per-evaluation description of the terrain grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GridDescriptor {
    /// Cells per side. Invariant: greater than 1.
    pub resolution: usize,
    /// Physical extent along X in world units.
    pub width: f32,
    /// Physical extent along Z in world units.
    pub height: f32,
    /// Height value a normalized height ratio of 1.0 maps to.
    pub max_height: f32,
    /// World-space origin of the grid.
    pub origin: Vec3,
}

impl GridDescriptor {
    /// Create a validated descriptor. Fails when `resolution <= 1`.
    pub fn new(
        resolution: usize,
        width: f32,
        height: f32,
        max_height: f32,
        origin: Vec3,
    ) -> Result<Self> {
        if resolution <= 1 {
            return Err(Error::InvalidConfig(format!(
                "grid resolution must be greater than 1, got {resolution}"
            )));
        }
        Ok(Self {
            resolution,
            width,
            height,
            max_height,
            origin,
        })
    }

    /// Number of cells in one height field of this grid.
    pub fn cell_count(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Physical size of one cell along X.
    pub fn cell_width(&self) -> f32 {
        self.width / (self.resolution - 1) as f32
    }

    /// Physical size of one cell along Z.
    pub fn cell_height(&self) -> f32 {
        self.height / (self.resolution - 1) as f32
    }

    /// Converts grid cell indices to a physical position on the XZ plane.
    pub fn index_to_physical(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + col as f32 * self.cell_width(),
            self.origin.z + row as f32 * self.cell_height(),
        )
    }
}

impl Default for GridDescriptor {
    fn default() -> Self {
        Self {
            resolution: 128,
            width: 100.0,
            height: 100.0,
            max_height: 20.0,
            origin: Vec3::ZERO,
        }
    }
}
