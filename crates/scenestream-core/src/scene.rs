//! Scene object model
//!
//! The exporter only needs read access to the host's scene: an ordered tree
//! of nodes, each node holding ordered objects, each object holding ordered
//! named fields. Hosts implement [`SceneNode`] and [`SceneObject`] over their
//! own representation; [`Node`] and [`Object`] are owned implementations used
//! by the CLI and tests.

use crate::field::{DataField, TypedField};
use serde::{Deserialize, Serialize};

/// A node of the scene tree
pub trait SceneNode {
    /// Node name
    fn name(&self) -> &str;

    /// Child nodes in insertion order
    fn children(&self) -> Box<dyn Iterator<Item = &dyn SceneNode> + '_>;

    /// Attached objects in insertion order
    fn objects(&self) -> Box<dyn Iterator<Item = &dyn SceneObject> + '_>;
}

/// An object attached to a node
pub trait SceneObject {
    /// Object name
    fn name(&self) -> &str;

    /// Data fields in declaration order
    fn fields(&self) -> Box<dyn Iterator<Item = &dyn TypedField> + '_>;
}

/// Owned scene node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,

    #[serde(default)]
    pub children: Vec<Node>,

    #[serde(default)]
    pub objects: Vec<Object>,
}

impl Node {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Add a child node
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Add an object
    pub fn with_object(mut self, object: Object) -> Self {
        self.objects.push(object);
        self
    }

    /// Find a direct child by name
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Find an attached object by name
    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.name == name)
    }

    /// Total node count of this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

impl SceneNode for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn SceneNode> + '_> {
        Box::new(self.children.iter().map(|child| child as &dyn SceneNode))
    }

    fn objects(&self) -> Box<dyn Iterator<Item = &dyn SceneObject> + '_> {
        Box::new(self.objects.iter().map(|object| object as &dyn SceneObject))
    }
}

/// Owned scene object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<DataField>,
}

impl Object {
    /// Create an object without fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field
    pub fn with_field(mut self, field: DataField) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field by name
    pub fn field_mut(&mut self, name: &str) -> Option<&mut DataField> {
        self.fields.iter_mut().find(|field| field.name == name)
    }
}

impl SceneObject for Object {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &dyn TypedField> + '_> {
        Box::new(self.fields.iter().map(|field| field as &dyn TypedField))
    }
}
