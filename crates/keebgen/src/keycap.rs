//! Keycaps.
//!
//! Caps are built with the stem on the Z axis and the cap bottom raised off
//! the XY plane by the mounting offset, so a cap placed on a socket at the
//! origin sits where it would on the installed switch.

use keebgen_math::{Point3, Transform};
use tracing::debug;

use crate::config::KeycapConfig;
use crate::cuboid::CuboidAnchorCollection;
use crate::part::Part;
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Display colour of keycaps, RGBA in [0, 1].
pub const KEYCAP_COLOR: [f64; 4] = [50.0 / 255.0, 175.0 / 255.0, 1.0, 1.0];

const DISH_SEGMENTS: u32 = 100;

// Faces wound clockwise seen from outside: top, front, bottom, right, back, left.
const FACES: [[u32; 4]; 6] = [
    [2, 3, 0, 1],
    [1, 0, 4, 5],
    [5, 4, 7, 6],
    [2, 1, 5, 6],
    [3, 2, 6, 7],
    [0, 3, 7, 4],
];

/// OEM profile keycap, `units` keys wide.
///
/// The cap is a frustum from a bottom rectangle to a top face tilted about
/// X, with a cylindrical dish cut into the top. It is rendered as a
/// background solid so it previews without being exported. The anchors are
/// the 8 frustum corners.
pub fn build_keycap(config: &KeycapConfig, units: u32) -> Result<Part> {
    config.validate()?;
    if units == 0 {
        return Err(GeometryError::DegenerateGeometry(
            "keycap needs at least one key unit".to_string(),
        ));
    }

    let extra = config.key_pitch * f64::from(units - 1);
    let bottom_w = config.bottom_width + extra;
    let bottom_l = config.bottom_length;
    let top_w = config.top_width + extra;
    let top_l = config.top_length;
    let front_h = config.top_front_height;

    let top_offset_front = front_h * config.front_lean_angle.to_radians().tan();
    let top_face_angle = ((front_h - config.top_back_height) / top_l).asin().to_degrees();

    // tilt the top face about its front edge, then lift it into place
    let top_placement = Transform::translation(0.0, -top_offset_front, front_h)
        .then(&Transform::rotation_euler_degrees(top_face_angle, 0.0, 0.0));
    let top = [
        Point3::new(-top_w / 2.0, 0.0, 0.0),
        Point3::new(top_w / 2.0, 0.0, 0.0),
        Point3::new(top_w / 2.0, -top_l, 0.0),
        Point3::new(-top_w / 2.0, -top_l, 0.0),
    ]
    .map(|p| top_placement.apply_point(&p));
    let bottom = [
        Point3::new(-bottom_w / 2.0, 0.0, 0.0),
        Point3::new(bottom_w / 2.0, 0.0, 0.0),
        Point3::new(bottom_w / 2.0, -bottom_l, 0.0),
        Point3::new(-bottom_w / 2.0, -bottom_l, 0.0),
    ];
    let corners: Vec<Point3> = top.into_iter().chain(bottom).collect();
    let faces: Vec<Vec<u32>> = FACES.iter().map(|f| f.to_vec()).collect();

    let mut cap = Solid::polyhedron("keycap-body", &corners, &faces)?;
    if config.dish_depth > 0.0 {
        let depth = config.dish_depth;
        let radius = (depth * depth + (top_w / 2.0).powi(2)) / (2.0 * depth);
        let dish = Solid::centered_cylinder("dish", radius, bottom_l * 2.0, DISH_SEGMENTS)
            .rotate(90.0 + top_face_angle, 0.0, 0.0)
            .translate(0.0, -top_offset_front, radius + front_h - depth);
        cap = cap - dish;
    }

    let (dy, dz) = (bottom_l / 2.0, config.mounting_offset);
    let cap = cap
        .translate(0.0, dy, dz)
        .color(KEYCAP_COLOR)
        .background()
        .named("keycap");

    let mut anchors = CuboidAnchorCollection::from_coords(&corners)?;
    anchors.translate(0.0, dy, dz);
    debug!(units, top_face_angle, dish_depth = config.dish_depth, "keycap built");
    Ok(Part::new(cap, anchors))
}
