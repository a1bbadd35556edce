//! Geometry extraction
//!
//! Fields are recognized by name through [`FIELD_ROLES`] and by shape
//! through [`FieldRole::accepts`]. A field that fails either check is left
//! out of the output; it is never an error.

use crate::document::MeshRecord;
use crate::field::{TypeInfo, TypedField};
use crate::scene::SceneObject;

/// Components of every emitted position
pub const POSITION_COMPONENTS: usize = 3;

/// What a recognized field contributes to a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Vertex coordinates
    Position,
    /// Vertex index lists
    Topology,
}

/// Field name to role table
pub const FIELD_ROLES: &[(&str, FieldRole)] = &[
    ("position", FieldRole::Position),
    ("faces", FieldRole::Topology),
    ("triangles", FieldRole::Topology),
    ("quads", FieldRole::Topology),
];

impl FieldRole {
    /// Look up the role of a field name
    pub fn of(name: &str) -> Option<Self> {
        FIELD_ROLES
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, role)| *role)
    }

    /// Check that a field has the shape this role expects
    pub fn accepts(&self, info: TypeInfo) -> bool {
        if !info.is_container || info.is_text {
            return false;
        }
        match self {
            Self::Position => info.is_scalar,
            Self::Topology => info.is_integer,
        }
    }

    /// Role of a field when both its name and its shape match
    pub fn recognize(field: &dyn TypedField) -> Option<Self> {
        let role = Self::of(field.name())?;
        (role.accepts(field.type_info()) && field.stride() > 0).then_some(role)
    }
}

/// Reshape a position field into three-component tuples
///
/// Items with fewer than three components are zero-filled, items with more
/// are truncated.
pub fn extract_positions(field: &dyn TypedField) -> Vec<[f64; POSITION_COMPONENTS]> {
    let stride = field.stride();
    let kept = stride.min(POSITION_COMPONENTS);

    (0..field.item_count())
        .map(|item| {
            let mut position = [0.0; POSITION_COMPONENTS];
            for (component, slot) in position.iter_mut().take(kept).enumerate() {
                *slot = field.read_float(item * stride + component);
            }
            position
        })
        .collect()
}

/// Reshape a topology field into faces of exactly `stride` indices
pub fn extract_faces(field: &dyn TypedField) -> Vec<Vec<i64>> {
    let stride = field.stride();

    (0..field.item_count())
        .map(|face| {
            (0..stride)
                .map(|vertex| field.read_int(face * stride + vertex))
                .collect()
        })
        .collect()
}

/// Build a mesh record from an object's fields
///
/// Returns `None` unless a position field is recognized. The first position
/// field wins; faces of every recognized topology field are appended in
/// field order.
pub fn extract_mesh(object: &dyn SceneObject) -> Option<MeshRecord> {
    let mut position = None;
    let mut faces = Vec::new();

    for field in object.fields() {
        match FieldRole::recognize(field) {
            Some(FieldRole::Position) if position.is_none() => {
                position = Some(extract_positions(field));
            }
            Some(FieldRole::Topology) => faces.extend(extract_faces(field)),
            _ => {}
        }
    }

    position.map(|position| MeshRecord::new(object.name(), position).with_faces(faces))
}
