//! Flared skirt walls around a top surface.
//!
//! Each segment starts at a corner shared by a top edge and an outer edge,
//! flares outward and down, then drops straight to the XY plane:
//!
//! ```text
//!  top edge
//! --------|\
//!         | \
//! --------|  \ flared wall
//!          \  \
//!           \  \
//!           |  |
//!           |  | vertical wall to z = 0
//!           |__|
//! ```
//!
//! Consecutive segments are joined by hull connectors, the last one wrapping
//! around to the first.

use keebgen_math::{unit_vector, Point3, Tolerance, Transform, Vec3};
use tracing::debug;

use crate::anchor::{AnchorCollection, LabeledPoint};
use crate::assembly::{Assembly, PartCollection};
use crate::config::SkirtConfig;
use crate::connector::Connector;
use crate::footprint::fit_to_hull;
use crate::part::Geometry;
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Distance under which two edge endpoints count as the same corner.
pub const SHARED_POINT_TOLERANCE: f64 = 1e-6;

/// A top edge and an outer edge meeting at one corner.
#[derive(Debug, Clone)]
pub struct EdgePair {
    /// Edge on the top surface, running inward from the shared corner.
    pub top: AnchorCollection,
    /// Edge on the outer side, running down from the shared corner.
    pub outer: AnchorCollection,
}

impl EdgePair {
    /// Pair two edges of two points each.
    pub fn new(top: AnchorCollection, outer: AnchorCollection) -> Self {
        Self { top, outer }
    }

    /// The eight pairs that run a skirt around a labeled cuboid.
    ///
    /// Pairs go clockwise seen from above, two per vertical edge: front
    /// left, front right, back right, back left.
    pub fn around_cuboid(anchors: &AnchorCollection) -> Vec<EdgePair> {
        let edge = |a: &str, b: &str| anchors.filter(&[a, b]);
        vec![
            EdgePair::new(edge("top", "left"), edge("front", "left")),
            EdgePair::new(edge("top", "right"), edge("front", "right")),
            EdgePair::new(edge("top", "front"), edge("front", "right")),
            EdgePair::new(edge("top", "back"), edge("back", "right")),
            EdgePair::new(edge("top", "right"), edge("back", "right")),
            EdgePair::new(edge("top", "left"), edge("back", "left")),
            EdgePair::new(edge("top", "back"), edge("back", "left")),
            EdgePair::new(edge("top", "front"), edge("front", "left")),
        ]
    }
}

/// The corners of one skirt segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SkirtSegment {
    /// Corner shared by the top and outer edge; outer top of the wall.
    pub shared: Point3,
    /// Inner top of the wall, down the outer edge from `shared`.
    pub wall_start: Point3,
    /// `shared` pushed out along the top edge by the wall thickness.
    pub top_extension: Point3,
    /// Outer corner at the end of the flare.
    pub middle_outer: Point3,
    /// Inner corner at the end of the flare.
    pub middle_inner: Point3,
    /// `middle_outer` dropped to z = 0.
    pub bottom_outer: Point3,
    /// `middle_inner` dropped to z = 0.
    pub bottom_inner: Point3,
}

impl SkirtSegment {
    /// Compute the segment for one edge pair.
    ///
    /// Fails with [`GeometryError::EmptyInput`] when an edge does not have
    /// exactly two points, and with [`GeometryError::DegenerateGeometry`]
    /// when the edges share no corner, are identical, or have zero length.
    pub fn from_edges(pair: &EdgePair, config: &SkirtConfig) -> Result<Self> {
        for (name, edge) in [("top", &pair.top), ("outer", &pair.outer)] {
            if edge.len() != 2 {
                return Err(GeometryError::EmptyInput(format!(
                    "{} edge needs 2 points, got {}",
                    name,
                    edge.len()
                )));
            }
        }

        let tol = Tolerance {
            linear: SHARED_POINT_TOLERANCE,
            ..Tolerance::DEFAULT
        };
        let top = pair.top.coords();
        let outer = pair.outer.coords();
        let (ti, oi) = (0..2)
            .flat_map(|i| (0..2).map(move |j| (i, j)))
            .find(|&(i, j)| tol.points_equal(&top[i], &outer[j]))
            .ok_or_else(|| {
                GeometryError::DegenerateGeometry("edges share no corner".to_string())
            })?;

        let shared = top[ti];
        let back = top[1 - ti];
        let bottom = outer[1 - oi];
        if tol.points_equal(&back, &bottom) {
            return Err(GeometryError::DegenerateGeometry(
                "top and outer edges are identical".to_string(),
            ));
        }

        // out along the top edge, and down along the outer edge
        let zero_length = |edge: &str| {
            GeometryError::DegenerateGeometry(format!("{} edge has zero length", edge))
        };
        let top_dir = unit_vector(&back, &shared)
            .ok_or_else(|| zero_length("top"))?
            .into_inner();
        let front_dir = unit_vector(&shared, &bottom)
            .ok_or_else(|| zero_length("outer"))?
            .into_inner();
        let horizontal = Vec3::new(top_dir.x, top_dir.y, 0.0)
            .try_normalize(Tolerance::DEFAULT.linear)
            .ok_or_else(|| GeometryError::DegenerateGeometry("top edge is vertical".to_string()))?;

        let angle = config.flare_angle.to_radians();
        let thickness = config.wall_thickness;
        let flare = top_dir * angle.sin() + front_dir * angle.cos();

        // shallow flares would push the inner start past the end of the outer edge
        let wall_drop = (thickness / angle.sin()).min((bottom - shared).norm());
        let wall_start = shared + front_dir * wall_drop;
        let top_extension = shared + top_dir * thickness;
        let middle_outer = shared + flare * config.flare_length;
        let bottom_outer = Point3::new(middle_outer.x, middle_outer.y, 0.0);
        let middle_inner = middle_outer - horizontal * thickness;
        let bottom_inner = bottom_outer - horizontal * thickness;

        Ok(Self {
            shared,
            wall_start,
            top_extension,
            middle_outer,
            middle_inner,
            bottom_outer,
            bottom_inner,
        })
    }

    /// The corners as labeled anchors, top to bottom.
    pub fn to_anchors(&self) -> AnchorCollection {
        AnchorCollection::new([
            LabeledPoint::new(self.shared, ["outside", "top"]),
            LabeledPoint::new(self.wall_start, ["inside", "top"]),
            LabeledPoint::new(self.top_extension, ["outside", "top"]),
            LabeledPoint::new(self.middle_outer, ["outside", "middle"]),
            LabeledPoint::new(self.middle_inner, ["inside", "middle"]),
            LabeledPoint::new(self.bottom_outer, ["outside", "bottom"]),
            LabeledPoint::new(self.bottom_inner, ["inside", "bottom"]),
        ])
    }

    fn transform(&mut self, t: &Transform) {
        for p in [
            &mut self.shared,
            &mut self.wall_start,
            &mut self.top_extension,
            &mut self.middle_outer,
            &mut self.middle_inner,
            &mut self.bottom_outer,
            &mut self.bottom_inner,
        ] {
            *p = t.apply_point(p);
        }
    }
}

/// A closed wall of flared segments joined by connectors.
#[derive(Debug, Clone)]
pub struct FlaredSkirt {
    assembly: Assembly,
    segments: Vec<SkirtSegment>,
}

impl FlaredSkirt {
    /// Build a skirt through `pairs`, in order, closing back to the first.
    ///
    /// Segments whose bottom corners fall inside the footprint hull are
    /// moved onto it before the walls are joined.
    pub fn new(pairs: &[EdgePair], config: &SkirtConfig) -> Result<Self> {
        if pairs.is_empty() {
            return Err(GeometryError::EmptyInput(
                "skirt needs at least one edge pair".to_string(),
            ));
        }
        config.validate()?;

        let mut segments = pairs
            .iter()
            .map(|pair| SkirtSegment::from_edges(pair, config))
            .collect::<Result<Vec<_>>>()?;
        fit_to_hull(&mut segments, config.wall_thickness);

        let mut parts = PartCollection::new();
        let anchors: Vec<AnchorCollection> =
            segments.iter().map(SkirtSegment::to_anchors).collect();
        let mut prev = &anchors[anchors.len() - 1];
        for (i, current) in anchors.iter().enumerate() {
            let upper = current.filter(&["top"])
                + current.filter(&["middle"])
                + prev.filter(&["top"])
                + prev.filter(&["middle"]);
            let lower = current.filter(&["middle"])
                + current.filter(&["bottom"])
                + prev.filter(&["middle"])
                + prev.filter(&["bottom"]);
            parts.add_named(format!("wall{}_upper", i), Connector::new(&upper)?)?;
            parts.add_named(format!("wall{}_lower", i), Connector::new(&lower)?)?;
            prev = current;
        }
        debug!(segments = segments.len(), walls = parts.len(), "skirt built");

        Ok(Self {
            assembly: Assembly::new("skirt", parts, anchors.into_iter().sum()),
            segments,
        })
    }

    /// Segment corners in loop order.
    pub fn segments(&self) -> &[SkirtSegment] {
        &self.segments
    }

    /// The wall connectors and their anchors.
    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Number of wall connectors.
    pub fn wall_count(&self) -> usize {
        self.assembly.parts().len()
    }
}

impl Geometry for FlaredSkirt {
    fn solid(&self) -> Solid {
        self.assembly.solid()
    }

    fn anchors(&self) -> AnchorCollection {
        self.assembly.anchors()
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.assembly.translate(x, y, z);
        let t = Transform::translation(x, y, z);
        for segment in &mut self.segments {
            segment.transform(&t);
        }
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.assembly.rotate(x_deg, y_deg, z_deg);
        let t = Transform::rotation_euler_degrees(x_deg, y_deg, z_deg);
        for segment in &mut self.segments {
            segment.transform(&t);
        }
    }
}

impl From<FlaredSkirt> for Assembly {
    fn from(skirt: FlaredSkirt) -> Self {
        skirt.assembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::CuboidAnchorCollection;
    use crate::footprint::gift_wrap;
    use approx::assert_relative_eq;
    use keebgen_math::Point2;

    /// 10 x 10 x 3 box with its top at z = 28.
    fn raised_box() -> AnchorCollection {
        CuboidAnchorCollection::create(Vec3::new(10.0, 10.0, 3.0), Vec3::new(5.0, 5.0, 26.5)).into()
    }

    fn config() -> SkirtConfig {
        SkirtConfig {
            wall_thickness: 2.0,
            flare_length: 5.0 * 2f64.sqrt(),
            flare_angle: 45.0,
        }
    }

    #[test]
    fn test_segment_corners() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let segment = SkirtSegment::from_edges(&pairs[0], &config()).unwrap();

        assert_relative_eq!(segment.shared, Point3::new(0.0, 10.0, 28.0), epsilon = 1e-9);
        assert_relative_eq!(segment.middle_outer, Point3::new(0.0, 15.0, 23.0), epsilon = 1e-9);
        assert_relative_eq!(segment.bottom_outer, Point3::new(0.0, 15.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(
            segment.wall_start,
            Point3::new(0.0, 10.0, 28.0 - 2.0 * 2f64.sqrt()),
            epsilon = 1e-9
        );
        assert_relative_eq!(segment.middle_inner, Point3::new(0.0, 13.0, 23.0), epsilon = 1e-9);
        assert_relative_eq!(segment.bottom_inner, Point3::new(0.0, 13.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(segment.top_extension, Point3::new(0.0, 12.0, 28.0), epsilon = 1e-9);
    }

    #[test]
    fn test_segment_labels() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let anchors = SkirtSegment::from_edges(&pairs[0], &config()).unwrap().to_anchors();
        assert_eq!(anchors.len(), 7);
        assert_eq!(anchors.filter(&["top"]).len(), 3);
        assert_eq!(anchors.filter(&["middle"]).len(), 2);
        assert_eq!(anchors.filter(&["bottom"]).len(), 2);
        assert_eq!(anchors.filter(&["outside"]).len(), 4);
        assert_eq!(anchors.filter(&["inside", "bottom"]).len(), 1);
    }

    #[test]
    fn test_straight_out_flare() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let config = SkirtConfig {
            flare_angle: 90.0,
            flare_length: 4.0,
            ..config()
        };
        let segment = SkirtSegment::from_edges(&pairs[0], &config).unwrap();
        assert_relative_eq!(segment.middle_outer, Point3::new(0.0, 14.0, 28.0), epsilon = 1e-9);
        assert_relative_eq!(segment.wall_start, Point3::new(0.0, 10.0, 26.0), epsilon = 1e-9);
    }

    #[test]
    fn test_shallow_flare_stays_on_outer_edge() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let config = SkirtConfig {
            flare_angle: 1.0,
            ..config()
        };
        let segment = SkirtSegment::from_edges(&pairs[0], &config).unwrap();
        assert_relative_eq!(segment.wall_start, Point3::new(0.0, 10.0, 25.0), epsilon = 1e-9);
    }

    /// Edge pair at `shared` (z = 10) whose top edge points along `dir`.
    fn pair_at(shared: (f64, f64), dir: (f64, f64)) -> EdgePair {
        let s = Point3::new(shared.0, shared.1, 10.0);
        let back = Point3::new(shared.0 - dir.0, shared.1 - dir.1, 10.0);
        let down = Point3::new(shared.0, shared.1, 7.0);
        EdgePair::new(
            AnchorCollection::from_coords([back, s]),
            AnchorCollection::from_coords([s, down]),
        )
    }

    #[test]
    fn test_dented_loop_walls_use_hull() {
        let pairs = [
            pair_at((0.0, 10.0), (0.0, 1.0)),
            pair_at((5.0, 7.0), (0.0, 1.0)),
            pair_at((10.0, 10.0), (0.0, 1.0)),
            pair_at((10.0, 5.0), (0.0, -1.0)),
            pair_at((0.0, 5.0), (0.0, -1.0)),
        ];
        let config = SkirtConfig {
            wall_thickness: 2.0,
            flare_length: 5.0,
            flare_angle: 90.0,
        };
        let skirt = FlaredSkirt::new(&pairs, &config).unwrap();

        let dent = &skirt.segments()[1];
        assert_relative_eq!(dent.bottom_outer, Point3::new(5.0, 15.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(dent.bottom_inner, Point3::new(5.0, 13.0, 0.0), epsilon = 1e-9);

        let lower = skirt.assembly().child_anchors("wall1_lower").unwrap();
        let has = |target: Point3| lower.iter().any(|p| (p.coords - target).norm() < 1e-9);
        assert!(has(Point3::new(5.0, 15.0, 0.0)));
        assert!(has(Point3::new(5.0, 13.0, 0.0)));
        assert!(!has(Point3::new(5.0, 12.0, 0.0)));
    }

    #[test]
    fn test_closed_loop() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        assert_eq!(pairs.len(), 8);
        let skirt = FlaredSkirt::new(&pairs, &config()).unwrap();

        assert_eq!(skirt.wall_count(), 16);
        assert_eq!(skirt.segments().len(), 8);
        assert_eq!(skirt.anchors().len(), 8 * 7);
        assert!(skirt.assembly().child("wall0_upper").is_ok());
        assert!(skirt.assembly().child("wall7_lower").is_ok());

        let footprint: Vec<Point2> = skirt.segments().iter().map(|s| s.bottom_outer.xy()).collect();
        assert_eq!(gift_wrap(&footprint).len(), 8, "footprint should be convex");
    }

    #[test]
    fn test_walls_join_neighbours() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let skirt = FlaredSkirt::new(&pairs, &config()).unwrap();
        // wall0 wraps around to the last segment
        let upper = skirt.assembly().child_anchors("wall0_upper").unwrap();
        assert_eq!(upper.len(), 10);
        let last = &skirt.segments()[7];
        assert!(upper.iter().any(|p| p.coords == last.middle_outer));

        let lower = skirt.assembly().child_anchors("wall3_lower").unwrap();
        assert_eq!(lower.len(), 8);
        assert!(lower.iter().all(|p| p.labels.contains("middle") || p.labels.contains("bottom")));
    }

    #[test]
    fn test_rotated_box() {
        let mut anchors = raised_box();
        anchors.rotate(30.0, 0.0, 0.0);
        let skirt = FlaredSkirt::new(&EdgePair::around_cuboid(&anchors), &config()).unwrap();
        assert_eq!(skirt.wall_count(), 16);
        for segment in skirt.segments() {
            assert_eq!(segment.bottom_outer.z, 0.0);
            assert_eq!(segment.bottom_inner.z, 0.0);
        }
        // the front and back walls now stand at different heights
        let front = &skirt.segments()[0];
        let back = &skirt.segments()[5];
        assert!((front.shared.z - back.shared.z).abs() > 1.0);
    }

    #[test]
    fn test_translate_moves_segments() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let mut skirt = FlaredSkirt::new(&pairs, &config()).unwrap();
        let before = skirt.segments()[2].shared;
        skirt.translate(1.0, 2.0, 3.0);
        assert_relative_eq!(
            skirt.segments()[2].shared,
            before + Vec3::new(1.0, 2.0, 3.0),
            epsilon = 1e-9
        );
        let moved = skirt.anchors().get(2 * 7).unwrap().coords;
        assert_relative_eq!(moved, skirt.segments()[2].shared, epsilon = 1e-9);
    }

    #[test]
    fn test_edge_errors() {
        let anchors = raised_box();
        let cfg = config();

        let short = EdgePair::new(
            anchors.filter(&["top", "left", "front"]),
            anchors.filter(&["front", "left"]),
        );
        assert!(matches!(
            SkirtSegment::from_edges(&short, &cfg),
            Err(GeometryError::EmptyInput(_))
        ));

        let apart = EdgePair::new(
            anchors.filter(&["top", "left"]),
            anchors.filter(&["back", "right"]),
        );
        assert!(matches!(
            SkirtSegment::from_edges(&apart, &cfg),
            Err(GeometryError::DegenerateGeometry(_))
        ));

        let same = EdgePair::new(
            anchors.filter(&["top", "left"]),
            anchors.filter(&["top", "left"]),
        );
        assert!(matches!(
            SkirtSegment::from_edges(&same, &cfg),
            Err(GeometryError::DegenerateGeometry(_))
        ));

        assert!(matches!(
            FlaredSkirt::new(&[], &cfg),
            Err(GeometryError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let pairs = EdgePair::around_cuboid(&raised_box());
        let cfg = SkirtConfig {
            flare_angle: 0.0,
            ..config()
        };
        assert!(matches!(
            FlaredSkirt::new(&pairs, &cfg),
            Err(GeometryError::Config(_))
        ));
    }
}
