//! SceneStream Core - Scene snapshots as frame documents
//!
//! SceneStream exports the state of a running simulation once per step so
//! that an external visualization tool can mirror it.
//!
//! # Data Flow
//!
//! ```text
//! Simulation scene tree → DocumentBuilder → Document → wire frame
//!   Node                    (recursive)       iteration
//!   ├── Object              extract_mesh      scene
//!   │   └── DataField       per object        objects / children / node_name
//!   └── Node ...
//! ```
//!
//! The scene is accessed through the read-only [`SceneNode`], [`SceneObject`]
//! and [`TypedField`] traits, so hosts expose their own object model without
//! copying it. Fields are recognized by name (`position`, `faces`,
//! `triangles`, `quads`) and by type facets; unknown fields are ignored.

pub mod builder;
pub mod document;
pub mod field;
pub mod geometry;
pub mod outline;
pub mod scene;

// Re-export commonly used types
pub use builder::DocumentBuilder;
pub use document::{Document, MeshRecord};
pub use field::{DataField, FieldValues, TypeInfo, TypedField};
pub use geometry::{FIELD_ROLES, FieldRole, extract_faces, extract_mesh, extract_positions};
pub use outline::{NodeOutline, ObjectOutline};
pub use scene::{Node, Object, SceneNode, SceneObject};
