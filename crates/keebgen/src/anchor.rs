//! Labeled points and anchor collections.
//!
//! Anchors are 3D points tagged with semantic labels such as `top`, `left`
//! or `back`. Parts carry an [`AnchorCollection`] next to their solid so that
//! other geometry can be attached by label instead of by coordinate.

use keebgen_math::{Point3, Transform, Vec3};
use std::collections::BTreeSet;
use std::fmt;

/// A 3D point with one or more labels.
#[derive(Debug, Clone)]
pub struct LabeledPoint {
    /// Position in millimeters.
    pub coords: Point3,
    /// Semantic labels.
    pub labels: BTreeSet<String>,
}

impl LabeledPoint {
    /// Create a point from coordinates and labels.
    pub fn new<S: Into<String>>(coords: Point3, labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            coords,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an unlabeled point.
    pub fn unlabeled(coords: Point3) -> Self {
        Self {
            coords,
            labels: BTreeSet::new(),
        }
    }

    /// True when this point carries every label in `query`.
    pub fn has_labels<S: AsRef<str>>(&self, query: &[S]) -> bool {
        query.iter().all(|l| self.labels.contains(l.as_ref()))
    }

    /// Translate in place.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.coords += Vec3::new(x, y, z);
    }

    /// Rotate about the origin in place (degrees, X then Y then Z).
    pub fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.transform(&Transform::rotation_euler_degrees(x_deg, y_deg, z_deg));
    }

    /// Apply an arbitrary transform in place.
    pub fn transform(&mut self, t: &Transform) {
        self.coords = t.apply_point(&self.coords);
    }
}

/// Points compare by coordinates only.
impl PartialEq for LabeledPoint {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl fmt::Display for LabeledPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        write!(
            f,
            "({}, {}, {}) [{}]",
            self.coords.x,
            self.coords.y,
            self.coords.z,
            labels.join(", ")
        )
    }
}

/// An ordered collection of [`LabeledPoint`]s.
///
/// The collection owns its points. Cloning, filtering and concatenating all
/// produce independent copies, so transforming one collection never moves
/// the points of another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorCollection {
    points: Vec<LabeledPoint>,
}

impl AnchorCollection {
    /// Create a collection from points, preserving their order.
    pub fn new(points: impl IntoIterator<Item = LabeledPoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Create an unlabeled collection from raw coordinates.
    pub fn from_coords(coords: impl IntoIterator<Item = Point3>) -> Self {
        Self::new(coords.into_iter().map(LabeledPoint::unlabeled))
    }

    /// Points whose label sets contain every label in `labels`.
    ///
    /// Order is preserved. An empty query returns a copy of the whole
    /// collection; a query nothing matches returns an empty collection.
    pub fn filter<S: AsRef<str>>(&self, labels: &[S]) -> AnchorCollection {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.has_labels(labels))
                .cloned()
                .collect(),
        }
    }

    /// New collection with this collection's points followed by `other`'s.
    pub fn concat(&self, other: &AnchorCollection) -> AnchorCollection {
        let mut points = Vec::with_capacity(self.len() + other.len());
        points.extend(self.points.iter().cloned());
        points.extend(other.points.iter().cloned());
        Self { points }
    }

    /// Append a point.
    pub fn push(&mut self, point: LabeledPoint) {
        self.points.push(point);
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the collection holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, LabeledPoint> {
        self.points.iter()
    }

    /// Point at `index`.
    pub fn get(&self, index: usize) -> Option<&LabeledPoint> {
        self.points.get(index)
    }

    /// The points as a slice.
    pub fn points(&self) -> &[LabeledPoint] {
        &self.points
    }

    /// Coordinates of every point, in order.
    pub fn coords(&self) -> Vec<Point3> {
        self.points.iter().map(|p| p.coords).collect()
    }

    /// Labels of the point at `index`.
    pub fn labels_of(&self, index: usize) -> Option<&BTreeSet<String>> {
        self.points.get(index).map(|p| &p.labels)
    }

    /// Union of all labels in the collection.
    pub fn labels(&self) -> BTreeSet<String> {
        self.points
            .iter()
            .flat_map(|p| p.labels.iter().cloned())
            .collect()
    }

    /// Translate every point in place.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        for point in &mut self.points {
            point.translate(x, y, z);
        }
    }

    /// Rotate every point about the origin in place (degrees, X then Y then Z).
    pub fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.transform(&Transform::rotation_euler_degrees(x_deg, y_deg, z_deg));
    }

    /// Apply a transform to every point in place.
    pub fn transform(&mut self, t: &Transform) {
        for point in &mut self.points {
            point.transform(t);
        }
    }

    /// Mean of all coordinates, `None` when empty.
    pub fn centroid(&self) -> Option<Point3> {
        keebgen_math::centroid(self.points.iter().map(|p| &p.coords))
    }

    /// Axis-aligned bounding box as `(min, max)`, `None` when empty.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.points.first()?.coords;
        Some(self.points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            (lo.inf(&p.coords), hi.sup(&p.coords))
        }))
    }

    /// Size of the bounding box along each axis, `None` when empty.
    pub fn extent(&self) -> Option<Vec3> {
        self.bounds().map(|(lo, hi)| hi - lo)
    }
}

impl std::ops::Add for &AnchorCollection {
    type Output = AnchorCollection;
    fn add(self, rhs: &AnchorCollection) -> AnchorCollection {
        self.concat(rhs)
    }
}

impl std::ops::Add for AnchorCollection {
    type Output = AnchorCollection;
    fn add(mut self, rhs: AnchorCollection) -> AnchorCollection {
        self.points.extend(rhs.points);
        self
    }
}

impl std::iter::Sum for AnchorCollection {
    fn sum<I: Iterator<Item = AnchorCollection>>(iter: I) -> Self {
        iter.fold(AnchorCollection::default(), |acc, c| acc + c)
    }
}

impl FromIterator<LabeledPoint> for AnchorCollection {
    fn from_iter<I: IntoIterator<Item = LabeledPoint>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl IntoIterator for AnchorCollection {
    type Item = LabeledPoint;
    type IntoIter = std::vec::IntoIter<LabeledPoint>;
    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a AnchorCollection {
    type Item = &'a LabeledPoint;
    type IntoIter = std::slice::Iter<'a, LabeledPoint>;
    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
