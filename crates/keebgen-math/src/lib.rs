#![warn(missing_docs)]

//! Math types for keebgen.
//!
//! Thin wrappers around nalgebra providing the types shared by the anchor
//! algebra and the skirt footprint code: points, vectors, directions,
//! rigid transforms, and tolerance constants.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the XY plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the XY plane.
pub type Vec2 = Vector2<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Euler rotation in degrees about the fixed X, then Y, then Z axes.
    ///
    /// This is the convention of OpenSCAD's `rotate([x, y, z])`, so a solid
    /// and its anchors rotated with the same angles stay in agreement.
    pub fn rotation_euler_degrees(x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        Self::rotation_z(z_deg.to_radians())
            .then(&Self::rotation_y(y_deg.to_radians()))
            .then(&Self::rotation_x(x_deg.to_radians()))
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Unit vector pointing from `from` to `to`.
///
/// Returns `None` when the points are coincident.
pub fn unit_vector(from: &Point3, to: &Point3) -> Option<Dir3> {
    Dir3::try_new(to - from, Tolerance::DEFAULT.linear)
}

/// Arithmetic mean of a set of points, `None` for an empty set.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Point3> {
    let mut sum = Vec3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Point3::from(sum / count as f64))
}

/// 2D cross product (z component of the 3D cross product).
pub fn cross_2d(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Intersection of two parametric lines `p + s*d` and `q + u*e` in the plane.
///
/// Returns the parameters `(s, u)`, or `None` when the lines are parallel
/// (or either direction is zero).
pub fn line_intersection_2d(p: &Point2, d: &Vec2, q: &Point2, e: &Vec2) -> Option<(f64, f64)> {
    let denom = cross_2d(d, e);
    let scale = d.norm() * e.norm();
    if scale < Tolerance::DEFAULT.linear || denom.abs() <= scale * Tolerance::DEFAULT.angular {
        return None;
    }
    let w = q - p;
    let s = cross_2d(&w, e) / denom;
    let u = cross_2d(&w, d) / denom;
    Some((s, u))
}
