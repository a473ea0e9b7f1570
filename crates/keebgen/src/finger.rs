//! A stick model of a finger for checking reach in previews.

use keebgen_math::Point3;
use tracing::debug;

use crate::anchor::{AnchorCollection, LabeledPoint};
use crate::assembly::{Assembly, PartCollection};
use crate::connector::Connector;
use crate::part::Geometry;
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Diameter of the digit connectors.
pub const DIGIT_DIAMETER: f64 = 2.0;

/// Two background connectors: the first digit from the first knuckle to the
/// second, and the second and third digits from there to the tip.
///
/// The second knuckle sits on the origin with the tip hanging straight down.
#[derive(Debug, Clone)]
pub struct Finger {
    assembly: Assembly,
}

impl Finger {
    /// `lean_back` tilts the first digit about X, in degrees.
    pub fn new(second_and_third_len: f64, first_len: f64, lean_back: f64) -> Result<Self> {
        let lengths = [
            ("second_and_third_len", second_and_third_len),
            ("first_len", first_len),
        ];
        for (name, len) in lengths {
            if !(len.is_finite() && len > 0.0) {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "finger {} must be positive, got {}",
                    name, len
                )));
            }
        }

        let tip = LabeledPoint::new(
            Point3::new(0.0, 0.0, -second_and_third_len),
            ["finger", "tip"],
        );
        let second_knuckle = LabeledPoint::new(Point3::origin(), ["finger", "second_knuckle"]);
        let mut first_knuckle =
            LabeledPoint::new(Point3::new(0.0, -first_len, 0.0), ["finger", "first_knuckle"]);
        first_knuckle.rotate(-lean_back, 0.0, 0.0);

        let first_digit = Connector::with_diameter(
            &AnchorCollection::new([second_knuckle.clone(), first_knuckle]),
            DIGIT_DIAMETER,
        )?
        .background();
        let second_and_third = Connector::with_diameter(
            &AnchorCollection::new([tip, second_knuckle]),
            DIGIT_DIAMETER,
        )?
        .background();

        let anchors = first_digit.anchors() + second_and_third.anchors();
        let mut parts = PartCollection::new();
        parts.add_named("first_digit", first_digit)?;
        parts.add_named("second_and_third_digits", second_and_third)?;
        debug!(second_and_third_len, first_len, lean_back, "finger built");

        Ok(Self {
            assembly: Assembly::new("finger", parts, anchors),
        })
    }

    /// The digit connectors.
    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }
}

impl Geometry for Finger {
    fn solid(&self) -> Solid {
        self.assembly.solid()
    }

    fn anchors(&self) -> AnchorCollection {
        self.assembly.anchors()
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.assembly.translate(x, y, z);
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.assembly.rotate(x_deg, y_deg, z_deg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use keebgen_ir::{CsgOp, Modifier};

    #[test]
    fn test_joints() {
        let finger = Finger::new(45.0, 50.0, 0.0).unwrap();
        let anchors = finger.anchors();
        assert_eq!(anchors.len(), 4);
        assert_eq!(anchors.filter(&["finger"]).len(), 4);
        assert_eq!(anchors.filter(&["tip"]).coords(), vec![Point3::new(0.0, 0.0, -45.0)]);
        assert_eq!(
            anchors.filter(&["first_knuckle"]).coords(),
            vec![Point3::new(0.0, -50.0, 0.0)]
        );
        assert_eq!(anchors.filter(&["second_knuckle"]).len(), 2);
    }

    #[test]
    fn test_lean_back() {
        let finger = Finger::new(45.0, 50.0, 90.0).unwrap();
        let knuckle = finger.anchors().filter(&["first_knuckle"]).coords()[0];
        assert_relative_eq!(knuckle, Point3::new(0.0, 0.0, 50.0), epsilon = 1e-9);
    }

    #[test]
    fn test_digits_are_background() {
        let finger = Finger::new(45.0, 50.0, 10.0).unwrap();
        for name in ["first_digit", "second_and_third_digits"] {
            let doc = finger.assembly().child(name).unwrap().solid().to_document();
            assert!(matches!(
                doc.nodes[&doc.roots[0]].op,
                CsgOp::Modifier {
                    modifier: Modifier::Background,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_moves_with_anchors() {
        let mut finger = Finger::new(45.0, 50.0, 0.0).unwrap();
        finger.translate(10.0, 0.0, 60.0);
        let tip = finger.anchors().filter(&["tip"]).coords()[0];
        assert_relative_eq!(tip, Point3::new(10.0, 0.0, 15.0));
        let digit = finger.assembly().child_anchors("second_and_third_digits").unwrap();
        assert!(digit.iter().any(|p| p.coords == tip));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(Finger::new(0.0, 50.0, 0.0).is_err());
        assert!(Finger::new(45.0, -1.0, 0.0).is_err());
    }
}
