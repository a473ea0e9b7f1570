#![warn(missing_docs)]

//! keebgen: parametric keyboard geometry.
//!
//! Solids are composed from primitives and carry labeled anchor points next
//! to their geometry. Parts and assemblies move their solid and anchors
//! together, so connectors and skirts can be built from the anchors of
//! already-placed parts.
//!
//! # Example
//!
//! ```rust,no_run
//! use keebgen::{Connector, CuboidAnchorCollection, Geometry};
//! use keebgen_math::Vec3;
//!
//! let unit = Vec3::new(1.0, 1.0, 1.0);
//! let left = CuboidAnchorCollection::create(unit, Vec3::zeros());
//! let right = CuboidAnchorCollection::create(unit, Vec3::new(10.0, 0.0, 0.0));
//! let bridge = Connector::new(&(left.filter(&["right"]) + right.filter(&["left"]))).unwrap();
//! bridge.write_scad("bridge.scad").unwrap();
//! ```

use thiserror::Error;

pub mod anchor;
pub mod assembly;
pub mod column;
pub mod config;
pub mod connector;
pub mod cuboid;
pub mod finger;
mod footprint;
pub mod grid;
pub mod key;
pub mod keycap;
pub mod part;
pub mod skirt;
pub mod socket;
pub mod solid;

pub use anchor::{AnchorCollection, LabeledPoint};
pub use assembly::{AnchorRef, Assembly, PartCollection};
pub use column::{build_column, ColumnGeometry};
pub use config::{ConfigError, KeebConfig};
pub use connector::Connector;
pub use cuboid::CuboidAnchorCollection;
pub use finger::Finger;
pub use footprint::gift_wrap;
pub use grid::KeyGrid;
pub use key::build_key;
pub use keycap::build_keycap;
pub use part::{Component, Geometry, Part};
pub use skirt::{EdgePair, FlaredSkirt, SkirtSegment};
pub use socket::cherry_mx_socket;
pub use solid::Solid;

/// Errors returned by geometry construction.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A cuboid was given a number of corners other than 8.
    #[error("cuboid needs exactly 8 corners, got {0}")]
    InvalidCornerCount(usize),
    /// An operation needing points received none (or a malformed edge).
    #[error("empty input: {0}")]
    EmptyInput(String),
    /// No part with this name in the collection.
    #[error("unknown part \"{0}\"")]
    UnknownPart(String),
    /// A part with this name is already in the collection.
    #[error("name \"{0}\" is already in this collection")]
    DuplicateName(String),
    /// Input geometry is degenerate (coincident points, zero-length edges).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// The requested feature is not available.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// A configuration section failed validation.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// An I/O error occurred while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// OpenSCAD emission failed.
    #[error("OpenSCAD emission failed: {0}")]
    Scad(#[from] keebgen_ir::ScadError),
}

/// Result alias for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
