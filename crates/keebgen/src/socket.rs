//! Switch sockets.
//!
//! A socket's top face lies on the XY plane and the installed switch's
//! keycap stem sits on the Z axis.

use keebgen_math::Vec3;
use tracing::debug;

use crate::config::SocketConfig;
use crate::cuboid::CuboidAnchorCollection;
use crate::part::Part;
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Centre-to-centre distance of neighbouring keys.
pub const KEY_PITCH: f64 = 19.0;

const NUB_SEGMENTS: u32 = 20;

/// Plate socket for a Cherry MX style switch, `units` keys wide.
///
/// The anchors are the 8 corners of the plate block, top face at z = 0.
pub fn cherry_mx_socket(config: &SocketConfig, units: u32) -> Result<Part> {
    config.validate()?;
    if units == 0 {
        return Err(GeometryError::DegenerateGeometry(
            "socket needs at least one key unit".to_string(),
        ));
    }
    if config.hot_swap {
        return Err(GeometryError::Unsupported(
            "hot swap sockets are not implemented".to_string(),
        ));
    }

    let width = config.overall_width + f64::from(units - 1) * KEY_PITCH;
    let length = config.overall_length;
    let thickness = config.plate_thickness;
    let (opening_w, opening_l) = (config.switch_opening_width, config.switch_opening_length);

    let block = Solid::centered_cube("plate", width, length, thickness);
    let opening = Solid::centered_cube("opening", opening_w, opening_l, thickness * 2.0);
    let mut socket = (block - opening).translate(0.0, 0.0, -thickness / 2.0);

    if config.side_nubs {
        let radius = config.side_nub_radius;
        let nub_width = config.side_nub_width;
        let rounded = Solid::centered_cylinder("nub-edge", radius, nub_width, NUB_SEGMENTS)
            .rotate(90.0, 0.0, 0.0)
            .translate(opening_w / 2.0, 0.0, radius - thickness);
        let wall_len = (width - opening_w) / 2.0;
        let wall = Solid::centered_cube("nub-wall", wall_len, nub_width, thickness).translate(
            (width - wall_len) / 2.0,
            0.0,
            -thickness / 2.0,
        );
        // right wall, then the same nub turned onto the left wall
        let nub = Solid::hull("side-nub", [&rounded, &wall])?;
        let opposite = nub.rotate(0.0, 0.0, 180.0);
        socket = Solid::union_all("socket", [&socket, &nub, &opposite]);
    } else {
        socket = socket.named("socket");
    }

    debug!(units, width, length, thickness, side_nubs = config.side_nubs, "socket built");
    let anchors = CuboidAnchorCollection::create(
        Vec3::new(width, length, thickness),
        Vec3::new(0.0, 0.0, -thickness / 2.0),
    );
    Ok(Part::new(socket, anchors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Geometry;
    use keebgen_ir::CsgOp;

    #[test]
    fn test_anchor_box() {
        let socket = cherry_mx_socket(&SocketConfig::default(), 1).unwrap();
        let anchors = socket.anchors();
        assert_eq!(anchors.len(), 8);
        assert!(anchors.filter(&["top"]).iter().all(|p| p.coords.z == 0.0));
        assert!(anchors.filter(&["bottom"]).iter().all(|p| p.coords.z == -4.0));
        let (min, max) = anchors.bounds().unwrap();
        assert_eq!((min.x, max.x), (-9.0, 9.0));
        assert_eq!((min.y, max.y), (-9.0, 9.0));
        // back is -y
        assert!(anchors.filter(&["back"]).iter().all(|p| p.coords.y == -9.0));
    }

    #[test]
    fn test_wide_socket() {
        let socket = cherry_mx_socket(&SocketConfig::default(), 2).unwrap();
        let extent = socket.anchors().extent().unwrap();
        assert_eq!(extent.x, 18.0 + 19.0);
        assert_eq!(extent.y, 18.0);
    }

    #[test]
    fn test_side_nubs() {
        let with = cherry_mx_socket(&SocketConfig::default(), 1).unwrap();
        let doc = with.solid().to_document();
        assert!(matches!(
            &doc.nodes[&doc.roots[0]].op,
            CsgOp::Union { children } if children.len() == 3
        ));
        let hulls = doc
            .nodes
            .values()
            .filter(|n| matches!(n.op, CsgOp::Hull { .. }))
            .count();
        assert_eq!(hulls, 1);

        let config = SocketConfig {
            side_nubs: false,
            ..SocketConfig::default()
        };
        let without = cherry_mx_socket(&config, 1).unwrap();
        let doc = without.solid().to_document();
        assert!(matches!(&doc.nodes[&doc.roots[0]].op, CsgOp::Translate { .. }));
    }

    #[test]
    fn test_rejects_hot_swap() {
        let config = SocketConfig {
            hot_swap: true,
            ..SocketConfig::default()
        };
        assert!(matches!(
            cherry_mx_socket(&config, 1),
            Err(GeometryError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = SocketConfig {
            switch_opening_width: 20.0,
            ..SocketConfig::default()
        };
        assert!(matches!(cherry_mx_socket(&config, 1), Err(GeometryError::Config(_))));
        assert!(cherry_mx_socket(&SocketConfig::default(), 0).is_err());
    }
}
