//! Part collections and assemblies.
//!
//! An [`Assembly`] is a named group of parts whose solid is the union of its
//! children. Its anchors are either an owned collection, moved along with
//! the assembly, or references into its children resolved each time they
//! are read. A reference never aliases a child's points, so a transform is
//! applied exactly once no matter how the anchors were obtained.

use std::collections::HashMap;

use tracing::debug;

use crate::anchor::AnchorCollection;
use crate::part::{Component, Geometry};
use crate::solid::Solid;
use crate::{GeometryError, Result};

/// Ordered list of parts and assemblies, optionally addressable by name.
#[derive(Debug, Clone, Default)]
pub struct PartCollection {
    parts: Vec<Component>,
    index: HashMap<String, usize>,
}

impl PartCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unnamed member and return its position.
    pub fn add(&mut self, part: impl Into<Component>) -> usize {
        self.parts.push(part.into());
        self.parts.len() - 1
    }

    /// Append a named member and return its position.
    ///
    /// Fails with [`GeometryError::DuplicateName`] if the name is taken.
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        part: impl Into<Component>,
    ) -> Result<usize> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GeometryError::DuplicateName(name));
        }
        let idx = self.add(part);
        self.index.insert(name, idx);
        Ok(idx)
    }

    /// Member by name.
    pub fn get(&self, name: &str) -> Result<&Component> {
        let idx = self.index_of(name)?;
        Ok(&self.parts[idx])
    }

    /// Mutable member by name.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Component> {
        let idx = self.index_of(name)?;
        Ok(&mut self.parts[idx])
    }

    /// Member by position.
    pub fn get_index(&self, idx: usize) -> Option<&Component> {
        self.parts.get(idx)
    }

    /// Position of a named member.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GeometryError::UnknownPart(name.to_string()))
    }

    /// Iterate over members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.parts.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True when the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Union of every member's solid.
    pub fn solid(&self, name: &str) -> Solid {
        let solids: Vec<Solid> = self.parts.iter().map(|p| p.solid()).collect();
        Solid::union_all(name, &solids)
    }

    /// Translate every member.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        for part in &mut self.parts {
            part.translate(x, y, z);
        }
    }

    /// Rotate every member about the origin (degrees).
    pub fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        for part in &mut self.parts {
            part.rotate(x_deg, y_deg, z_deg);
        }
    }

    /// Translate one named member.
    pub fn translate_part(&mut self, name: &str, x: f64, y: f64, z: f64) -> Result<()> {
        self.get_mut(name)?.translate(x, y, z);
        Ok(())
    }

    /// Rotate one named member about the origin (degrees).
    pub fn rotate_part(&mut self, name: &str, x_deg: f64, y_deg: f64, z_deg: f64) -> Result<()> {
        self.get_mut(name)?.rotate(x_deg, y_deg, z_deg);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PartCollection {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;
    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

/// Reference to the anchors of a (possibly nested) child, filtered by labels.
///
/// `path` names a child, then a child of that child, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRef {
    /// Child names from the assembly down to the source part.
    pub path: Vec<String>,
    /// Labels every selected point must carry.
    pub labels: Vec<String>,
}

impl AnchorRef {
    /// Reference `labels` on the child reached by `path`.
    pub fn new(path: &[&str], labels: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// An [`AnchorRef`] with its path resolved to member positions.
#[derive(Debug, Clone)]
struct ResolvedRef {
    path: Vec<usize>,
    labels: Vec<String>,
}

#[derive(Debug, Clone)]
enum AnchorSource {
    Owned(AnchorCollection),
    Derived(Vec<ResolvedRef>),
}

/// A named group of parts with its own anchors.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Name recorded on the union node of the rendered solid.
    pub name: String,
    parts: PartCollection,
    anchors: AnchorSource,
}

impl Assembly {
    /// Assembly with an owned anchor collection.
    ///
    /// The anchors are moved together with the children on every transform.
    pub fn new(name: impl Into<String>, parts: PartCollection, anchors: AnchorCollection) -> Self {
        let name = name.into();
        debug!(
            assembly = %name,
            parts = parts.len(),
            anchors = anchors.len(),
            "assembly created"
        );
        Self {
            name,
            parts,
            anchors: AnchorSource::Owned(anchors),
        }
    }

    /// Assembly whose anchors are read from its children on demand.
    ///
    /// Every path must name existing children; fails with
    /// [`GeometryError::UnknownPart`] otherwise. The anchors are the
    /// concatenation of each reference's selection, in order.
    pub fn with_derived_anchors(
        name: impl Into<String>,
        parts: PartCollection,
        refs: &[AnchorRef],
    ) -> Result<Self> {
        let name = name.into();
        let mut resolved = Vec::with_capacity(refs.len());
        for r in refs {
            resolved.push(ResolvedRef {
                path: resolve_path(&parts, &r.path)?,
                labels: r.labels.clone(),
            });
        }
        debug!(assembly = %name, parts = parts.len(), refs = refs.len(), "assembly created");
        Ok(Self {
            name,
            parts,
            anchors: AnchorSource::Derived(resolved),
        })
    }

    /// The children.
    pub fn parts(&self) -> &PartCollection {
        &self.parts
    }

    /// Child by name.
    pub fn child(&self, name: &str) -> Result<&Component> {
        self.parts.get(name)
    }

    /// Anchors of a named child.
    pub fn child_anchors(&self, name: &str) -> Result<AnchorCollection> {
        Ok(self.parts.get(name)?.anchors())
    }

    /// Anchors of a nested child, e.g. `["key0", "socket"]`.
    pub fn anchors_at(&self, path: &[&str]) -> Result<AnchorCollection> {
        let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let idxs = resolve_path(&self.parts, &path)?;
        component_at(&self.parts, &idxs)
            .map(|c| c.anchors())
            .ok_or_else(|| GeometryError::UnknownPart(path.join("/")))
    }

    /// Translate one named child, leaving the rest of the assembly in place.
    pub fn translate_part(&mut self, name: &str, x: f64, y: f64, z: f64) -> Result<()> {
        self.parts.translate_part(name, x, y, z)
    }

    /// Rotate one named child about the origin, leaving the rest in place.
    pub fn rotate_part(&mut self, name: &str, x_deg: f64, y_deg: f64, z_deg: f64) -> Result<()> {
        self.parts.rotate_part(name, x_deg, y_deg, z_deg)
    }

    /// True when the anchors are read from children rather than owned.
    pub fn has_derived_anchors(&self) -> bool {
        matches!(self.anchors, AnchorSource::Derived(_))
    }
}

impl Geometry for Assembly {
    fn solid(&self) -> Solid {
        self.parts.solid(&self.name)
    }

    fn anchors(&self) -> AnchorCollection {
        match &self.anchors {
            AnchorSource::Owned(anchors) => anchors.clone(),
            AnchorSource::Derived(refs) => refs
                .iter()
                .filter_map(|r| {
                    component_at(&self.parts, &r.path)
                        .map(|c| c.anchors().filter(r.labels.as_slice()))
                })
                .sum(),
        }
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) {
        if let AnchorSource::Owned(anchors) = &mut self.anchors {
            anchors.translate(x, y, z);
        }
        self.parts.translate(x, y, z);
    }

    fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) {
        if let AnchorSource::Owned(anchors) = &mut self.anchors {
            anchors.rotate(x_deg, y_deg, z_deg);
        }
        self.parts.rotate(x_deg, y_deg, z_deg);
    }
}

fn resolve_path(parts: &PartCollection, path: &[String]) -> Result<Vec<usize>> {
    let unknown = || GeometryError::UnknownPart(path.join("/"));
    let (first, rest) = path.split_first().ok_or_else(unknown)?;
    let mut idxs = vec![parts.index_of(first).map_err(|_| unknown())?];
    let mut current = &parts.parts[idxs[0]];
    for name in rest {
        let assembly = current.as_assembly().ok_or_else(unknown)?;
        let idx = assembly.parts.index_of(name).map_err(|_| unknown())?;
        idxs.push(idx);
        current = &assembly.parts.parts[idx];
    }
    Ok(idxs)
}

fn component_at<'a>(parts: &'a PartCollection, path: &[usize]) -> Option<&'a Component> {
    let (first, rest) = path.split_first()?;
    let mut current = parts.get_index(*first)?;
    for &idx in rest {
        current = current.as_assembly()?.parts.get_index(idx)?;
    }
    Some(current)
}
