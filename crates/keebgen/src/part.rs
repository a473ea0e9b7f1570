//! Parts: a solid bound to its anchors.

use std::path::Path;

use crate::anchor::AnchorCollection;
use crate::assembly::Assembly;
use crate::solid::Solid;
use crate::Result;

/// Anything that can be rendered, moved and attached to by anchors.
pub trait Geometry {
    /// The renderable solid in its current position.
    fn solid(&self) -> Solid;

    /// The anchors in their current position.
    fn anchors(&self) -> AnchorCollection;

    /// Translate solid and anchors together.
    fn translate(&mut self, x: f64, y: f64, z: f64);

    /// Rotate solid and anchors together about the origin (degrees, X then Y then Z).
    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64);

    /// Rotate with angles in radians.
    fn rotate_radians(&mut self, x: f64, y: f64, z: f64) {
        self.rotate(x.to_degrees(), y.to_degrees(), z.to_degrees());
    }

    /// Render the solid to an OpenSCAD file.
    fn write_scad(&self, path: impl AsRef<Path>) -> Result<()>
    where
        Self: Sized,
    {
        self.solid().write_scad(path)
    }
}

/// A leaf part: exactly one solid and one anchor collection.
#[derive(Debug, Clone)]
pub struct Part {
    solid: Solid,
    anchors: AnchorCollection,
}

impl Part {
    /// Bind a solid to its anchors.
    pub fn new(solid: Solid, anchors: impl Into<AnchorCollection>) -> Self {
        Self {
            solid,
            anchors: anchors.into(),
        }
    }

    /// Borrow the solid without cloning its graph.
    pub fn solid_ref(&self) -> &Solid {
        &self.solid
    }

    /// Borrow the anchors without copying them.
    pub fn anchors_ref(&self) -> &AnchorCollection {
        &self.anchors
    }

    /// Replace the solid, keeping the anchors. Used to attach modifiers.
    pub fn map_solid(self, f: impl FnOnce(Solid) -> Solid) -> Self {
        Self {
            solid: f(self.solid),
            anchors: self.anchors,
        }
    }
}

impl Geometry for Part {
    fn solid(&self) -> Solid {
        self.solid.clone()
    }

    fn anchors(&self) -> AnchorCollection {
        self.anchors.clone()
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.solid = self.solid.translate(x, y, z);
        self.anchors.translate(x, y, z);
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        self.solid = self.solid.rotate(x_deg, y_deg, z_deg);
        self.anchors.rotate(x_deg, y_deg, z_deg);
    }
}

/// A member of a part collection: a leaf part or a nested assembly.
#[derive(Debug, Clone)]
pub enum Component {
    /// Leaf part.
    Part(Part),
    /// Nested assembly.
    Assembly(Assembly),
}

impl Component {
    /// The assembly, if this component is one.
    pub fn as_assembly(&self) -> Option<&Assembly> {
        match self {
            Component::Assembly(a) => Some(a),
            Component::Part(_) => None,
        }
    }

    /// The leaf part, if this component is one.
    pub fn as_part(&self) -> Option<&Part> {
        match self {
            Component::Part(p) => Some(p),
            Component::Assembly(_) => None,
        }
    }
}

impl Geometry for Component {
    fn solid(&self) -> Solid {
        match self {
            Component::Part(p) => p.solid(),
            Component::Assembly(a) => a.solid(),
        }
    }

    fn anchors(&self) -> AnchorCollection {
        match self {
            Component::Part(p) => p.anchors(),
            Component::Assembly(a) => a.anchors(),
        }
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        match self {
            Component::Part(p) => p.translate(x, y, z),
            Component::Assembly(a) => a.translate(x, y, z),
        }
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        match self {
            Component::Part(p) => p.rotate(x_deg, y_deg, z_deg),
            Component::Assembly(a) => a.rotate(x_deg, y_deg, z_deg),
        }
    }
}

impl From<Part> for Component {
    fn from(part: Part) -> Self {
        Component::Part(part)
    }
}

impl From<Assembly> for Component {
    fn from(assembly: Assembly) -> Self {
        Component::Assembly(assembly)
    }
}
