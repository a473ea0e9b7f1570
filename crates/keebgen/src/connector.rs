//! Convex-hull connectors between anchor points.

use tracing::debug;

use crate::anchor::AnchorCollection;
use crate::part::{Component, Geometry, Part};
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Diameter of the marker sphere placed at each anchor point.
pub const DEFAULT_MARKER_DIAMETER: f64 = 0.001;

/// A part whose solid is the convex hull of every point in a collection.
///
/// The connector keeps its own copy of the input points as its anchors.
/// Moving the source collection afterwards does not affect it.
#[derive(Debug, Clone)]
pub struct Connector {
    part: Part,
}

impl Connector {
    /// Hull through every point of `anchors`.
    ///
    /// Fails with [`GeometryError::EmptyInput`] if `anchors` is empty.
    pub fn new(anchors: &AnchorCollection) -> Result<Self> {
        Self::with_diameter(anchors, DEFAULT_MARKER_DIAMETER)
    }

    /// Hull of spheres of the given diameter centered on every point.
    pub fn with_diameter(anchors: &AnchorCollection, diameter: f64) -> Result<Self> {
        if anchors.is_empty() {
            return Err(GeometryError::EmptyInput(
                "connector needs at least one point".to_string(),
            ));
        }
        if diameter <= 0.0 {
            return Err(GeometryError::DegenerateGeometry(format!(
                "connector marker diameter must be positive, got {}",
                diameter
            )));
        }

        let markers: Vec<Solid> = anchors
            .iter()
            .map(|p| Solid::sphere("marker", diameter / 2.0, 0).translate_vec(p.coords.coords))
            .collect();
        let solid = Solid::hull("connector", &markers)?;
        debug!(points = anchors.len(), diameter, "connector built");

        Ok(Self {
            part: Part::new(solid, anchors.clone()),
        })
    }

    /// The underlying part.
    pub fn part(&self) -> &Part {
        &self.part
    }

    /// Mark the connector as a background (preview-only) solid.
    pub fn background(self) -> Self {
        Self {
            part: self.part.map_solid(|s| s.background()),
        }
    }
}

impl Geometry for Connector {
    fn solid(&self) -> Solid {
        self.part.solid()
    }

    fn anchors(&self) -> AnchorCollection {
        self.part.anchors()
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.part.translate(x, y, z);
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.part.rotate(x_deg, y_deg, z_deg);
    }
}

impl From<Connector> for Component {
    fn from(connector: Connector) -> Self {
        Component::Part(connector.part)
    }
}

impl From<Connector> for Part {
    fn from(connector: Connector) -> Self {
        connector.part
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::CuboidAnchorCollection;
    use approx::assert_relative_eq;
    use keebgen_ir::CsgOp;
    use keebgen_math::{Point3, Vec3};

    fn unit_at(x: f64) -> CuboidAnchorCollection {
        CuboidAnchorCollection::create(Vec3::new(1.0, 1.0, 1.0), Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Connector::new(&AnchorCollection::default()),
            Err(GeometryError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_bad_diameter() {
        let anchors = unit_at(0.0).filter(&["top"]);
        assert!(Connector::with_diameter(&anchors, 0.0).is_err());
    }

    #[test]
    fn test_hull_has_marker_per_point() {
        let anchors = unit_at(0.0).filter(&["right"]);
        let connector = Connector::new(&anchors).unwrap();
        let doc = connector.solid().to_document();
        match &doc.nodes[&doc.roots[0]].op {
            CsgOp::Hull { children } => {
                assert_eq!(children.len(), 4);
                for child in children {
                    match &doc.nodes[child].op {
                        CsgOp::Translate { child: sphere, offset } => {
                            assert_eq!(offset.x, 0.5);
                            assert!(matches!(
                                doc.nodes[sphere].op,
                                CsgOp::Sphere { radius, segments: 0 } if radius == 0.0005
                            ));
                        }
                        other => panic!("expected Translate, got {other:?}"),
                    }
                }
            }
            other => panic!("expected Hull, got {other:?}"),
        }
    }

    #[test]
    fn test_anchors_are_isolated_from_source() {
        let mut source = unit_at(0.0).filter(&["top"]);
        let connector = Connector::new(&source).unwrap();
        source.translate(0.0, 0.0, 100.0);
        assert!(connector.anchors().iter().all(|p| p.coords.z == 0.5));
    }

    #[test]
    fn test_translate_moves_own_anchors() {
        let source = unit_at(0.0).filter(&["top"]);
        let mut connector = Connector::new(&source).unwrap();
        connector.translate(0.0, 0.0, 2.0);
        assert!(connector.anchors().iter().all(|p| p.coords.z == 2.5));
        assert!(source.iter().all(|p| p.coords.z == 0.5));
    }

    #[test]
    fn test_bridge_between_cubes() {
        let cube1 = unit_at(0.0);
        let mut cube2 = unit_at(10.0);
        let bridge_anchors = cube1.filter(&["right"]) + cube2.filter(&["left"]);
        let bridge = Connector::new(&bridge_anchors).unwrap();
        assert_eq!(bridge.anchors(), bridge_anchors);
        assert_eq!(bridge.anchors().len(), 8);

        // rebuilding from the moved collection reflects the new position
        cube2.translate(10.0, 0.0, 0.0);
        let moved = cube1.filter(&["right"]) + cube2.filter(&["left"]);
        let rebuilt = Connector::new(&moved).unwrap();
        let far = rebuilt.anchors().filter(&["left"]);
        assert!(far.iter().all(|p| p.coords.x == 19.5));
        // the first bridge still sits where it was built
        let near = bridge.anchors().filter(&["left"]);
        assert!(near.iter().all(|p| p.coords.x == 9.5));
    }

    #[test]
    fn test_single_point() {
        let anchors = AnchorCollection::from_coords([Point3::new(1.0, 2.0, 3.0)]);
        let mut connector = Connector::with_diameter(&anchors, 2.0).unwrap();
        connector.rotate(0.0, 0.0, 180.0);
        assert_relative_eq!(
            connector.anchors().coords()[0],
            Point3::new(-1.0, -2.0, 3.0),
            epsilon = 1e-12
        );
    }
}
