//! Curved ortholinear key columns.
//!
//! Keys are laid out on an arc about the X axis so their anchors sit on a
//! circle of the configured radius, the home key flat at the bottom. Sockets
//! of neighbouring keys are bridged by connectors.

use keebgen_math::centroid;
use tracing::debug;

use crate::anchor::AnchorCollection;
use crate::assembly::{AnchorRef, Assembly, PartCollection};
use crate::config::{ColumnConfig, KeebConfig};
use crate::connector::Connector;
use crate::key::build_key;
use crate::part::Geometry;
use crate::{GeometryError, Result};

/// Angular layout of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnGeometry {
    /// Radius of the arc the key anchors follow.
    pub radius: f64,
    /// Angle between neighbouring keys, in radians.
    pub step: f64,
    /// Index of the key left unrotated.
    pub home_index: usize,
}

impl ColumnGeometry {
    /// Compute the key spacing from the anchors of one key.
    ///
    /// The step is the angle the key's top face covers on the arc, front and
    /// back of its stem, plus the angle of the configured gap.
    pub fn new(config: &ColumnConfig, key_anchors: &AnchorCollection) -> Result<Self> {
        let mean_y = |side: &str| {
            let edge = key_anchors.filter(&["top", side]);
            centroid(edge.coords().iter()).map(|p| p.y).ok_or_else(|| {
                GeometryError::EmptyInput(format!("key has no top {} anchors", side))
            })
        };
        let (y_front, y_back) = (mean_y("front")?, mean_y("back")?);
        let r = config.radius;
        let step = (y_front.abs() / r).atan()
            + (y_back.abs() / r).atan()
            + 2.0 * (config.key_gap / (2.0 * r)).atan();
        Ok(Self {
            radius: r,
            step,
            home_index: config.home_index,
        })
    }

    /// Rotation about X of the key at `index`, in radians.
    pub fn key_angle(&self, index: usize) -> f64 {
        self.step * (index as f64 - self.home_index as f64)
    }
}

/// Build a column from the `column` section and the key sections.
///
/// Children are `key0..keyN` and `connector{i-1}to{i}` joining the front of
/// each socket to the back of the next one. The column's anchors are the
/// back of the first socket and the front of the last, followed lazily from
/// the keys. The whole column is finally tilted back by the home angle.
pub fn build_column(config: &KeebConfig) -> Result<Assembly> {
    let column = &config.column;
    column.validate()?;
    let template = build_key(config, 1)?;
    let geometry = ColumnGeometry::new(column, &template.anchors())?;

    let mut parts = PartCollection::new();
    let mut prev_front: Option<AnchorCollection> = None;
    for i in 0..column.num_keys {
        let mut key = template.clone();
        key.rotate(0.0, column.key_side_lean, 0.0);
        key.translate(0.0, 0.0, -geometry.radius);
        key.rotate_radians(geometry.key_angle(i), 0.0, 0.0);
        key.translate(0.0, 0.0, geometry.radius);

        let socket = key.child_anchors("socket")?;
        if let Some(prev) = prev_front.take() {
            let bridge = Connector::new(&(socket.filter(&["back"]) + prev))?;
            parts.add_named(format!("connector{}to{}", i - 1, i), bridge)?;
        }
        prev_front = Some(socket.filter(&["front"]));
        parts.add_named(format!("key{}", i), key)?;
    }

    let last = format!("key{}", column.num_keys - 1);
    let mut assembly = Assembly::with_derived_anchors(
        "column",
        parts,
        &[
            AnchorRef::new(&["key0", "socket"], &["back"]),
            AnchorRef::new(&[last.as_str(), "socket"], &["front"]),
        ],
    )?;
    assembly.rotate(column.home_tiltback_angle, 0.0, 0.0);
    debug!(
        keys = column.num_keys,
        step_deg = geometry.step.to_degrees(),
        tilt = column.home_tiltback_angle,
        "column built"
    );
    Ok(assembly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use keebgen_math::Point3;

    fn centroid_of(anchors: &AnchorCollection) -> Point3 {
        anchors.centroid().unwrap()
    }

    #[test]
    fn test_parts_and_anchors() {
        let column = build_column(&KeebConfig::default()).unwrap();
        assert_eq!(column.parts().len(), 4 + 3);
        for name in ["key0", "key3", "connector0to1", "connector2to3"] {
            assert!(column.child(name).is_ok(), "missing {name}");
        }
        let anchors = column.anchors();
        assert_eq!(anchors.len(), 8);
        assert_eq!(anchors.filter(&["back"]).len(), 4);
        assert_eq!(anchors.filter(&["front"]).len(), 4);
    }

    #[test]
    fn test_home_key_is_flat() {
        let column = build_column(&KeebConfig::default()).unwrap();
        let home = column.anchors_at(&["key1", "socket"]).unwrap().filter(&["top"]);
        assert_relative_eq!(centroid_of(&home), Point3::origin(), epsilon = 1e-9);
    }

    #[test]
    fn test_keys_climb_away_from_home() {
        let column = build_column(&KeebConfig::default()).unwrap();
        let top = |i: usize| {
            let name = format!("key{i}");
            centroid_of(&column.anchors_at(&[name.as_str(), "socket"]).unwrap().filter(&["top"]))
        };
        let (k0, k1, k2, k3) = (top(0), top(1), top(2), top(3));
        assert!(k0.y < k1.y && k1.y < k2.y && k2.y < k3.y);
        assert!(k0.z > 0.0 && k2.z > 0.0 && k3.z > k2.z);
        // keys sit on a circle about the arc centre
        let centre = Point3::new(0.0, 0.0, 56.4);
        for k in [k0, k2, k3] {
            assert_relative_eq!((k - centre).norm(), 56.4, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_connectors_bridge_neighbours() {
        let column = build_column(&KeebConfig::default()).unwrap();
        let bridge = column.child_anchors("connector1to2").unwrap();
        let back_of_2 = column.anchors_at(&["key2", "socket"]).unwrap().filter(&["back"]);
        let front_of_1 = column.anchors_at(&["key1", "socket"]).unwrap().filter(&["front"]);
        assert_eq!(bridge, back_of_2 + front_of_1);
    }

    #[test]
    fn test_step_angle() {
        let config = KeebConfig::default();
        let key = build_key(&config, 1).unwrap();
        let geometry = ColumnGeometry::new(&config.column, &key.anchors()).unwrap();
        assert_eq!(geometry.key_angle(1), 0.0);
        assert_relative_eq!(geometry.key_angle(3), 2.0 * geometry.step);
        assert!(geometry.key_angle(0) < 0.0);
        // wider gaps spread the keys further
        let wide = ColumnConfig {
            key_gap: 6.0,
            ..config.column.clone()
        };
        assert!(ColumnGeometry::new(&wide, &key.anchors()).unwrap().step > geometry.step);
    }

    #[test]
    fn test_home_tilt_moves_anchors() {
        let flat = build_column(&KeebConfig::default()).unwrap();
        let mut config = KeebConfig::default();
        config.column.home_tiltback_angle = 15.0;
        let tilted = build_column(&config).unwrap();

        let mut expected = flat.anchors();
        expected.rotate(15.0, 0.0, 0.0);
        for (a, b) in tilted.anchors().iter().zip(expected.iter()) {
            assert_relative_eq!(a.coords, b.coords, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_key_column() {
        let mut config = KeebConfig::default();
        config.column.num_keys = 1;
        config.column.home_index = 0;
        let column = build_column(&config).unwrap();
        assert_eq!(column.parts().len(), 1);
        assert_eq!(column.anchors().len(), 8);
    }

    #[test]
    fn test_rejects_bad_home_index() {
        let mut config = KeebConfig::default();
        config.column.home_index = 4;
        assert!(matches!(build_column(&config), Err(GeometryError::Config(_))));
    }
}
