//! CSG solid handle.
//!
//! A [`Solid`] never holds mesh data. It records its construction as a
//! subtree of the [`keebgen_ir`] graph, which can be exported as a
//! [`Document`] or rendered to OpenSCAD source.

use keebgen_ir::{CsgOp, Document, Modifier, Node, NodeId, Vec3 as IrVec3};
use keebgen_math::{Point3, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::{GeometryError, Result};

/// Global atomic counter for unique IR node IDs.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

fn alloc_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A named solid with its construction history.
///
/// Build primitives with [`Solid::cube`], [`Solid::cylinder`],
/// [`Solid::sphere`] or [`Solid::polyhedron`], then combine them with
/// [`Solid::union`], [`Solid::difference`] and [`Solid::hull`] or the
/// operator shorthands (`+`, `-`). Every operation returns a new handle;
/// inputs are never modified.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Human-readable name, recorded on the IR node.
    pub name: String,
    ir_node_id: NodeId,
    ir_nodes: HashMap<NodeId, Node>,
}

impl Solid {
    fn with_ir(name: String, ir_node_id: NodeId, ir_nodes: HashMap<NodeId, Node>) -> Self {
        Self {
            name,
            ir_node_id,
            ir_nodes,
        }
    }

    fn leaf(name: impl Into<String>, op: CsgOp) -> Self {
        let name = name.into();
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op,
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Wrap `children` in a new node built by `op_fn`, merging their graphs.
    fn combine<'a>(
        name: String,
        children: impl IntoIterator<Item = &'a Solid>,
        op_fn: impl FnOnce(Vec<NodeId>) -> CsgOp,
    ) -> Self {
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        let mut ids = Vec::new();
        for child in children {
            nodes.extend(child.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
            ids.push(child.ir_node_id);
        }
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op: op_fn(ids),
            },
        );
        Self::with_ir(name, id, nodes)
    }

    fn unary(&self, op_fn: impl FnOnce(NodeId) -> CsgOp) -> Self {
        let id = alloc_node_id();
        let mut nodes = self.ir_nodes.clone();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(self.name.clone()),
                op: op_fn(self.ir_node_id),
            },
        );
        Self::with_ir(self.name.clone(), id, nodes)
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Empty solid, the identity for union.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::leaf(name, CsgOp::Empty)
    }

    /// Box with one corner at the origin.
    pub fn cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Cube {
                size: IrVec3::new(x, y, z),
                center: false,
            },
        )
    }

    /// Box centered on the origin.
    pub fn centered_cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Cube {
                size: IrVec3::new(x, y, z),
                center: true,
            },
        )
    }

    /// Cylinder along Z with its base on the XY plane.
    ///
    /// `segments` of 0 leaves the tessellation to the renderer.
    pub fn cylinder(name: impl Into<String>, radius: f64, height: f64, segments: u32) -> Self {
        Self::leaf(
            name,
            CsgOp::Cylinder {
                radius,
                height,
                segments,
                center: false,
            },
        )
    }

    /// Cylinder along Z centered on the origin.
    pub fn centered_cylinder(
        name: impl Into<String>,
        radius: f64,
        height: f64,
        segments: u32,
    ) -> Self {
        Self::leaf(
            name,
            CsgOp::Cylinder {
                radius,
                height,
                segments,
                center: true,
            },
        )
    }

    /// Sphere centered on the origin.
    pub fn sphere(name: impl Into<String>, radius: f64, segments: u32) -> Self {
        Self::leaf(name, CsgOp::Sphere { radius, segments })
    }

    /// Closed polyhedron from vertices and faces indexing into them.
    ///
    /// Fails with [`GeometryError::DegenerateGeometry`] when a face has fewer
    /// than three vertices or references a missing vertex.
    pub fn polyhedron(
        name: impl Into<String>,
        points: &[Point3],
        faces: &[Vec<u32>],
    ) -> Result<Self> {
        let name = name.into();
        if points.len() < 4 || faces.len() < 4 {
            return Err(GeometryError::DegenerateGeometry(format!(
                "polyhedron '{}' needs at least 4 points and 4 faces",
                name
            )));
        }
        for face in faces {
            if face.len() < 3 {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "polyhedron '{}' has a face with {} vertices",
                    name,
                    face.len()
                )));
            }
            if let Some(&bad) = face.iter().find(|&&i| i as usize >= points.len()) {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "polyhedron '{}' face references missing vertex {}",
                    name, bad
                )));
            }
        }
        let points = points
            .iter()
            .map(|p| IrVec3::new(p.x, p.y, p.z))
            .collect();
        Ok(Self::leaf(
            name,
            CsgOp::Polyhedron {
                points,
                faces: faces.to_vec(),
            },
        ))
    }

    // =========================================================================
    // CSG operations
    // =========================================================================

    /// Boolean union (self + other).
    pub fn union(&self, other: &Solid) -> Self {
        Self::combine(format!("{}-union", self.name), [self, other], |children| {
            CsgOp::Union { children }
        })
    }

    /// Union of any number of solids, [`Solid::empty`] when there are none.
    pub fn union_all<'a>(
        name: impl Into<String>,
        solids: impl IntoIterator<Item = &'a Solid>,
    ) -> Self {
        let name = name.into();
        let solids: Vec<&Solid> = solids.into_iter().collect();
        if solids.is_empty() {
            return Self::empty(name);
        }
        Self::combine(name, solids, |children| CsgOp::Union { children })
    }

    /// Boolean difference (self - other).
    pub fn difference(&self, other: &Solid) -> Self {
        Self::combine(format!("{}-diff", self.name), [self, other], |children| {
            CsgOp::Difference {
                left: children[0],
                right: children[1],
            }
        })
    }

    /// Convex hull of the given solids.
    ///
    /// Fails with [`GeometryError::EmptyInput`] when `solids` is empty.
    pub fn hull<'a>(
        name: impl Into<String>,
        solids: impl IntoIterator<Item = &'a Solid>,
    ) -> Result<Self> {
        let name = name.into();
        let solids: Vec<&Solid> = solids.into_iter().collect();
        if solids.is_empty() {
            return Err(GeometryError::EmptyInput(format!(
                "hull '{}' has no operands",
                name
            )));
        }
        Ok(Self::combine(name, solids, |children| CsgOp::Hull { children }))
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Translate the solid.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        self.unary(|child| CsgOp::Translate {
            child,
            offset: IrVec3::new(x, y, z),
        })
    }

    /// Translate by vector.
    pub fn translate_vec(&self, v: Vec3) -> Self {
        self.translate(v.x, v.y, v.z)
    }

    /// Rotate the solid about the origin (angles in degrees, X then Y then Z).
    pub fn rotate(&self, x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        self.unary(|child| CsgOp::Rotate {
            child,
            angles: IrVec3::new(x_deg, y_deg, z_deg),
        })
    }

    /// Display color, components in 0.0..1.0.
    pub fn color(&self, rgba: [f64; 4]) -> Self {
        self.unary(|child| CsgOp::Color { child, rgba })
    }

    /// Mark as a background (preview-only) solid.
    pub fn background(&self) -> Self {
        self.unary(|child| CsgOp::Modifier {
            child,
            modifier: Modifier::Background,
        })
    }

    /// Mark as highlighted in previews.
    pub fn debug(&self) -> Self {
        self.unary(|child| CsgOp::Modifier {
            child,
            modifier: Modifier::Debug,
        })
    }

    /// Same geometry under a new name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        if let Some(node) = self.ir_nodes.get_mut(&self.ir_node_id) {
            node.name = Some(self.name.clone());
        }
        self
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Root node of this solid's subtree.
    pub fn root(&self) -> NodeId {
        self.ir_node_id
    }

    /// Number of IR nodes in this solid's construction graph.
    pub fn node_count(&self) -> usize {
        self.ir_nodes.len()
    }

    /// Extract the IR document with this solid as the single root.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.nodes = self.ir_nodes.clone();
        doc.roots.push(self.ir_node_id);
        doc
    }

    /// Render to OpenSCAD source.
    pub fn to_scad(&self) -> Result<String> {
        Ok(keebgen_ir::to_scad(&self.to_document())?)
    }

    /// Render to an OpenSCAD file.
    pub fn write_scad(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = self.to_scad()?;
        std::fs::write(path, source)?;
        info!(
            solid = %self.name,
            nodes = self.ir_nodes.len(),
            path = %path.display(),
            "wrote OpenSCAD file"
        );
        Ok(())
    }
}

/// Union: `&a + &b`
impl std::ops::Add for &Solid {
    type Output = Solid;
    fn add(self, rhs: &Solid) -> Solid {
        self.union(rhs)
    }
}

/// Union: `a + b`
impl std::ops::Add for Solid {
    type Output = Solid;
    fn add(self, rhs: Solid) -> Solid {
        self.union(&rhs)
    }
}

/// Difference: `&a - &b`
impl std::ops::Sub for &Solid {
    type Output = Solid;
    fn sub(self, rhs: &Solid) -> Solid {
        self.difference(rhs)
    }
}

/// Difference: `a - b`
impl std::ops::Sub for Solid {
    type Output = Solid;
    fn sub(self, rhs: Solid) -> Solid {
        self.difference(&rhs)
    }
}
