//! OpenSCAD source emitter.
//!
//! Walks a [`Document`] from its roots and writes one nested OpenSCAD
//! statement per root. Shared subtrees are expanded at every use, so the
//! output is a plain tree that OpenSCAD can evaluate directly.
//!
//! # Example
//!
//! A socket plate with a switch opening:
//!
//! ```text
//! // generated by keebgen
//! difference() {
//!     cube([18, 18, 4], center = true);
//!     cube([14.4, 14.4, 8], center = true);
//! }
//! ```

use crate::{CsgOp, Document, NodeId, Vec3};
use std::collections::HashSet;
use std::fmt::{self, Write as FmtWrite};
use thiserror::Error;

/// Header line written at the top of every emitted file.
pub const SCAD_HEADER: &str = "// generated by keebgen";

const INDENT: &str = "    ";

/// Errors from OpenSCAD emission.
#[derive(Error, Debug)]
pub enum ScadError {
    /// A node references an id that is not in the document.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// The graph contains a cycle through the given node.
    #[error("cycle detected at node {0}")]
    Cycle(NodeId),
    /// Formatting into the output buffer failed.
    #[error("format error: {0}")]
    Fmt(#[from] fmt::Error),
}

/// Convert a document to OpenSCAD source.
pub fn to_scad(doc: &Document) -> Result<String, ScadError> {
    let mut output = String::new();
    writeln!(output, "{}", SCAD_HEADER)?;

    let mut visiting = HashSet::new();
    for &root in &doc.roots {
        emit(doc, root, 0, "", &mut visiting, &mut output)?;
    }

    Ok(output)
}

/// Emit the statement for `node_id` at `depth`, prefixed by any pending
/// modifier symbols.
fn emit(
    doc: &Document,
    node_id: NodeId,
    depth: usize,
    prefix: &str,
    visiting: &mut HashSet<NodeId>,
    output: &mut String,
) -> Result<(), ScadError> {
    let node = doc
        .nodes
        .get(&node_id)
        .ok_or(ScadError::UnknownNode(node_id))?;
    if !visiting.insert(node_id) {
        return Err(ScadError::Cycle(node_id));
    }

    let indent = INDENT.repeat(depth);
    match &node.op {
        CsgOp::Cube { size, center } => {
            writeln!(
                output,
                "{indent}{prefix}cube({}, center = {center});",
                format_vec3(size)
            )?;
        }
        CsgOp::Cylinder {
            radius,
            height,
            segments,
            center,
        } => {
            writeln!(
                output,
                "{indent}{prefix}cylinder(h = {height}, r = {radius}, center = {center}{});",
                format_segments(*segments)
            )?;
        }
        CsgOp::Sphere { radius, segments } => {
            writeln!(
                output,
                "{indent}{prefix}sphere(r = {radius}{});",
                format_segments(*segments)
            )?;
        }
        CsgOp::Polyhedron { points, faces } => {
            let points: Vec<String> = points.iter().map(format_vec3).collect();
            let faces: Vec<String> = faces
                .iter()
                .map(|face| {
                    let idxs: Vec<String> = face.iter().map(|i| i.to_string()).collect();
                    format!("[{}]", idxs.join(", "))
                })
                .collect();
            writeln!(
                output,
                "{indent}{prefix}polyhedron(points = [{}], faces = [{}]);",
                points.join(", "),
                faces.join(", ")
            )?;
        }
        CsgOp::Empty => {
            writeln!(output, "{indent}{prefix}union() {{}}")?;
        }
        CsgOp::Union { children } => {
            emit_block(doc, "union()", children, depth, prefix, visiting, output)?;
        }
        CsgOp::Hull { children } => {
            emit_block(doc, "hull()", children, depth, prefix, visiting, output)?;
        }
        CsgOp::Difference { left, right } => {
            emit_block(
                doc,
                "difference()",
                &[*left, *right],
                depth,
                prefix,
                visiting,
                output,
            )?;
        }
        CsgOp::Translate { child, offset } => {
            let head = format!("translate({})", format_vec3(offset));
            emit_block(doc, &head, &[*child], depth, prefix, visiting, output)?;
        }
        CsgOp::Rotate { child, angles } => {
            let head = format!("rotate({})", format_vec3(angles));
            emit_block(doc, &head, &[*child], depth, prefix, visiting, output)?;
        }
        CsgOp::Color { child, rgba } => {
            let head = format!("color([{}, {}, {}, {}])", rgba[0], rgba[1], rgba[2], rgba[3]);
            emit_block(doc, &head, &[*child], depth, prefix, visiting, output)?;
        }
        CsgOp::Modifier { child, modifier } => {
            let prefix = format!("{}{}", prefix, modifier.symbol());
            emit(doc, *child, depth, &prefix, visiting, output)?;
        }
    }

    visiting.remove(&node_id);
    Ok(())
}

/// Emit `head { children }`.
fn emit_block(
    doc: &Document,
    head: &str,
    children: &[NodeId],
    depth: usize,
    prefix: &str,
    visiting: &mut HashSet<NodeId>,
    output: &mut String,
) -> Result<(), ScadError> {
    let indent = INDENT.repeat(depth);
    writeln!(output, "{indent}{prefix}{head} {{")?;
    for &child in children {
        emit(doc, child, depth + 1, "", visiting, output)?;
    }
    writeln!(output, "{indent}}}")?;
    Ok(())
}

fn format_vec3(v: &Vec3) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}

fn format_segments(segments: u32) -> String {
    if segments == 0 {
        String::new()
    } else {
        format!(", $fn = {}", segments)
    }
}
