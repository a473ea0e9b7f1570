//! Sparse grids of keys.
//!
//! Row `y` runs toward the back of the board (negative Y), column `x` to the
//! right. Each key's origin is moved from its centre to its back-left
//! corner before it is placed, so keys of different widths line up on their
//! left edges.

use keebgen_math::Vec3;
use tracing::debug;

use crate::anchor::AnchorCollection;
use crate::assembly::{Assembly, PartCollection};
use crate::config::GridConfig;
use crate::part::Geometry;
use crate::{GeometryError, Result};

/// Keys arranged in rows and columns, with empty cells allowed.
#[derive(Debug, Clone)]
pub struct KeyGrid {
    grid: Vec<Vec<Option<Assembly>>>,
}

impl KeyGrid {
    /// Place each key at `(x * (w + gap), -y * (h + gap))`, where `w` and `h`
    /// come from `key_size`.
    ///
    /// Fails with [`GeometryError::EmptyInput`] if a key has no anchors to
    /// measure.
    pub fn new(
        mut grid: Vec<Vec<Option<Assembly>>>,
        key_size: Vec3,
        config: &GridConfig,
    ) -> Result<Self> {
        let gap = config.key_gap;
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                let Some(key) = cell else { continue };
                let extent = key.anchors().extent().ok_or_else(|| {
                    GeometryError::EmptyInput(format!("key at ({}, {}) has no anchors", x, y))
                })?;
                key.translate(extent.x / 2.0, -extent.y / 2.0, 0.0);
                key.translate(
                    x as f64 * (key_size.x + gap),
                    -(y as f64) * (key_size.y + gap),
                    0.0,
                );
            }
        }
        debug!(
            rows = grid.len(),
            keys = grid.iter().flatten().flatten().count(),
            "key grid laid out"
        );
        Ok(Self { grid })
    }

    /// Translate each key by the matching cell of `offsets`.
    ///
    /// Cells that are `None` on either side, or missing from `offsets`, are
    /// left alone.
    pub fn apply_offsets(&mut self, offsets: &[Vec<Option<Vec3>>]) {
        for (row, offset_row) in self.grid.iter_mut().zip(offsets) {
            for (cell, offset) in row.iter_mut().zip(offset_row) {
                if let (Some(key), Some(offset)) = (cell, offset) {
                    key.translate(offset.x, offset.y, offset.z);
                }
            }
        }
    }

    /// Rotate each key about its own anchor centroid by the matching cell
    /// of `rotations`, in degrees.
    pub fn apply_rotations(&mut self, rotations: &[Vec<Option<Vec3>>]) -> Result<()> {
        for (row, rotation_row) in self.grid.iter_mut().zip(rotations) {
            for (cell, rotation) in row.iter_mut().zip(rotation_row) {
                let (Some(key), Some(rotation)) = (cell, rotation) else {
                    continue;
                };
                let center = key.anchors().centroid().ok_or_else(|| {
                    GeometryError::EmptyInput("cannot rotate a key without anchors".to_string())
                })?;
                key.translate(-center.x, -center.y, -center.z);
                key.rotate(rotation.x, rotation.y, rotation.z);
                key.translate(center.x, center.y, center.z);
            }
        }
        Ok(())
    }

    /// Key at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<&Assembly> {
        self.grid.get(y)?.get(x)?.as_ref()
    }

    /// Keys in row order, skipping empty cells.
    pub fn keys(&self) -> Vec<&Assembly> {
        self.grid.iter().flatten().flatten().collect()
    }

    /// Combine the keys into one assembly, children named `key_{y}_{x}`.
    ///
    /// The assembly owns a copy of every key's anchors, in row order.
    pub fn into_assembly(self, name: impl Into<String>) -> Result<Assembly> {
        let mut parts = PartCollection::new();
        let mut anchors = AnchorCollection::default();
        for (y, row) in self.grid.into_iter().enumerate() {
            for (x, cell) in row.into_iter().enumerate() {
                let Some(key) = cell else { continue };
                anchors = anchors + key.anchors();
                parts.add_named(format!("key_{}_{}", y, x), key)?;
            }
        }
        Ok(Assembly::new(name, parts, anchors))
    }
}
