//! Intermediate representation for keebgen solids.
//!
//! This crate defines the DAG-based IR that records how a keyboard solid was
//! built from primitives, booleans, hulls and transforms.
//!
//! The IR is purely declarative. It holds no mesh data, only a graph of operations.
//! Rendering is handled by the OpenSCAD emitter in [`scad`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod scad;

pub use scad::{to_scad, ScadError};

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// 3D vector with f64 components (millimeters, or degrees for rotations).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Render modifier attached to a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Shown as a transparent preview, excluded from the final model (`%`).
    Background,
    /// Highlighted in previews (`#`).
    Debug,
    /// Ignored entirely (`*`).
    Disable,
}

impl Modifier {
    /// The OpenSCAD prefix character for this modifier.
    pub fn symbol(self) -> char {
        match self {
            Modifier::Background => '%',
            Modifier::Debug => '#',
            Modifier::Disable => '*',
        }
    }
}

/// CSG operation, the building block of the IR DAG.
///
/// Each variant is either a leaf primitive or a combining/transform operation
/// that references child nodes by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box, corner at origin unless `center` is set.
    Cube {
        /// Size along each axis.
        size: Vec3,
        /// Center the box on the origin.
        center: bool,
    },
    /// Cylinder along the Z axis, base at origin unless `center` is set.
    Cylinder {
        /// Radius of the cylinder.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
        /// Number of circular segments (0 = renderer default).
        segments: u32,
        /// Center the cylinder on the origin.
        center: bool,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Radius of the sphere.
        radius: f64,
        /// Number of circular segments (0 = renderer default).
        segments: u32,
    },
    /// Closed polyhedron from a vertex list and faces indexing into it.
    ///
    /// Faces are wound clockwise when viewed from outside.
    Polyhedron {
        /// Vertex positions.
        points: Vec<Vec3>,
        /// Faces as vertex index loops.
        faces: Vec<Vec<u32>>,
    },
    /// Empty geometry (identity for union).
    Empty,
    /// Boolean union of any number of geometries.
    Union {
        /// Operands.
        children: Vec<NodeId>,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Convex hull of any number of geometries.
    Hull {
        /// Operands.
        children: Vec<NodeId>,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation by Euler angles in degrees (applied as X, then Y, then Z).
    Rotate {
        /// Child node to rotate.
        child: NodeId,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
    /// Display color as `[r, g, b, a]` in 0.0..1.0.
    Color {
        /// Child node to color.
        child: NodeId,
        /// Color components.
        rgba: [f64; 4],
    },
    /// Render modifier.
    Modifier {
        /// Child node the modifier applies to.
        child: NodeId,
        /// The modifier kind.
        modifier: Modifier,
    },
}

impl CsgOp {
    /// Node ids this operation references, in operand order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            CsgOp::Union { children } | CsgOp::Hull { children } => children.clone(),
            CsgOp::Difference { left, right } => vec![*left, *right],
            CsgOp::Translate { child, .. }
            | CsgOp::Rotate { child, .. }
            | CsgOp::Color { child, .. }
            | CsgOp::Modifier { child, .. } => vec![*child],
            CsgOp::Cube { .. }
            | CsgOp::Cylinder { .. }
            | CsgOp::Sphere { .. }
            | CsgOp::Polyhedron { .. }
            | CsgOp::Empty => vec![],
        }
    }
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// A keebgen document: the full IR DAG plus the nodes to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Root nodes, rendered in order.
    pub roots: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_json_keeps_graph() {
        let mut doc = Document::new();
        doc.nodes.insert(
            1,
            Node {
                id: 1,
                name: Some("plate".to_string()),
                op: CsgOp::Cube {
                    size: Vec3::new(18.0, 18.0, 4.0),
                    center: true,
                },
            },
        );
        doc.nodes.insert(
            2,
            Node {
                id: 2,
                name: Some("opening".to_string()),
                op: CsgOp::Cube {
                    size: Vec3::new(14.4, 14.4, 8.0),
                    center: true,
                },
            },
        );
        doc.nodes.insert(
            3,
            Node {
                id: 3,
                name: Some("socket".to_string()),
                op: CsgOp::Difference { left: 1, right: 2 },
            },
        );
        doc.roots.push(3);

        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");

        assert_eq!(doc, restored);
        assert_eq!(restored.nodes.len(), 3);
        assert_eq!(restored.roots, vec![3]);
    }

    #[test]
    fn children_follow_operand_order() {
        let op = CsgOp::Hull {
            children: vec![4, 2, 9],
        };
        assert_eq!(op.children(), vec![4, 2, 9]);

        let op = CsgOp::Difference { left: 7, right: 3 };
        assert_eq!(op.children(), vec![7, 3]);

        let op = CsgOp::Sphere {
            radius: 1.0,
            segments: 0,
        };
        assert!(op.children().is_empty());
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        assert_eq!(doc.version, "0.1");
        assert!(doc.nodes.is_empty());
        assert!(doc.roots.is_empty());
    }

    #[test]
    fn serde_tagged_enum() {
        let op = CsgOp::Modifier {
            child: 5,
            modifier: Modifier::Background,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""type":"Modifier""#));
        assert!(json.contains(r#""modifier":"background""#));

        let restored: CsgOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, restored);
    }
}
