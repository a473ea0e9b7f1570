//! Anchors for six-sided shapes.
//!
//! Corners are labeled relative to a user sitting at the keyboard:
//!
//! ```text
//!    3-------7
//!   /|      /|
//!  / |     / | Z
//! 2--|----6  |
//! |  1----|--5
//! | /     | / Y
//! 0-------4
//!     X
//! ```
//!
//! `left`/`right` split on X, `back`/`front` on Y and `bottom`/`top` on Z,
//! with the second label of each pair on the positive side.

use keebgen_math::{Point3, Transform, Vec3};

use crate::anchor::{AnchorCollection, LabeledPoint};
use crate::{GeometryError, Result};

/// Labels for each corner in sorted order.
///
/// Flattened from a 2x2x2 grid indexed by `(x > c, y > c, z > c)` where `c`
/// is the centroid.
pub const CORNER_LABELS: [[&str; 3]; 8] = [
    ["left", "back", "bottom"],
    ["left", "back", "top"],
    ["left", "front", "bottom"],
    ["left", "front", "top"],
    ["right", "back", "bottom"],
    ["right", "back", "top"],
    ["right", "front", "bottom"],
    ["right", "front", "top"],
];

/// An [`AnchorCollection`] of exactly 8 corners with canonical face labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CuboidAnchorCollection {
    anchors: AnchorCollection,
}

impl CuboidAnchorCollection {
    /// Label 8 corner coordinates.
    ///
    /// Input order does not matter. Fails with
    /// [`GeometryError::InvalidCornerCount`] unless there are exactly 8
    /// points, and with [`GeometryError::DegenerateGeometry`] when two corners
    /// fall in the same octant around the centroid.
    pub fn from_coords(coords: &[Point3]) -> Result<Self> {
        if coords.len() != 8 {
            return Err(GeometryError::InvalidCornerCount(coords.len()));
        }
        let sorted = sort_corners(coords)?;
        let anchors = sorted
            .into_iter()
            .zip(CORNER_LABELS.iter())
            .map(|(c, labels)| LabeledPoint::new(c, labels.iter().copied()))
            .collect();
        Ok(Self { anchors })
    }

    /// Relabel the points of an existing collection. Existing labels are dropped.
    pub fn from_anchors(anchors: &AnchorCollection) -> Result<Self> {
        Self::from_coords(&anchors.coords())
    }

    /// Axis-aligned cuboid with size `dims` centered on `offset`.
    pub fn create(dims: Vec3, offset: Vec3) -> Self {
        let half = dims / 2.0;
        let mut anchors = AnchorCollection::default();
        for (i, labels) in CORNER_LABELS.iter().enumerate() {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            let corner = Point3::new(
                sign(4) * half.x + offset.x,
                sign(2) * half.y + offset.y,
                sign(1) * half.z + offset.z,
            );
            anchors.push(LabeledPoint::new(corner, labels.iter().copied()));
        }
        Self { anchors }
    }

    /// Points carrying every label in `labels`.
    pub fn filter<S: AsRef<str>>(&self, labels: &[S]) -> AnchorCollection {
        self.anchors.filter(labels)
    }

    /// The labeled corners in canonical order.
    pub fn anchors(&self) -> &AnchorCollection {
        &self.anchors
    }

    /// Translate every corner in place.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.anchors.translate(x, y, z);
    }

    /// Rotate every corner about the origin in place. Labels are kept.
    pub fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.anchors.rotate(x_deg, y_deg, z_deg);
    }

    /// Apply a transform to every corner in place. Labels are kept.
    pub fn transform(&mut self, t: &Transform) {
        self.anchors.transform(t);
    }
}

impl From<CuboidAnchorCollection> for AnchorCollection {
    fn from(cuboid: CuboidAnchorCollection) -> Self {
        cuboid.anchors
    }
}

/// Sort corners by which side of the centroid they fall on, X first.
fn sort_corners(coords: &[Point3]) -> Result<Vec<Point3>> {
    let center = keebgen_math::centroid(coords)
        .ok_or_else(|| GeometryError::EmptyInput("cuboid corners".to_string()))?;
    let side = |p: &Point3| {
        let d = p - center;
        (d.x > 0.0, d.y > 0.0, d.z > 0.0)
    };

    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by_key(|&i| side(&coords[i]));

    for pair in order.windows(2) {
        if side(&coords[pair[0]]) == side(&coords[pair[1]]) {
            return Err(GeometryError::DegenerateGeometry(format!(
                "corners {} and {} lie in the same octant",
                pair[0], pair[1]
            )));
        }
    }
    Ok(order.into_iter().map(|i| coords[i]).collect())
}
