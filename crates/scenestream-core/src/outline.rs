//! Scene structure outline
//!
//! Names and paths of every node and object, without field data. Written
//! once next to baked frames so that a reader can rebuild the hierarchy
//! before loading any geometry.

use crate::scene::SceneNode;
use serde::{Deserialize, Serialize};

/// Object entry of an outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectOutline {
    pub name: String,
    /// Slash-separated path from the root
    pub path: String,
    /// Names of all fields, recognized or not
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Node entry of an outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOutline {
    pub name: String,
    /// Slash-separated path from the root; the root itself is `/`
    pub path: String,
    #[serde(default)]
    pub objects: Vec<ObjectOutline>,
    #[serde(default)]
    pub children: Vec<NodeOutline>,
}

impl NodeOutline {
    /// Outline a scene tree
    pub fn of(root: &dyn SceneNode) -> Self {
        Self::at(root, "/".to_string())
    }

    fn at(node: &dyn SceneNode, path: String) -> Self {
        let join = |name: &str| {
            if path.ends_with('/') {
                format!("{}{}", path, name)
            } else {
                format!("{}/{}", path, name)
            }
        };

        let objects = node
            .objects()
            .map(|object| ObjectOutline {
                name: object.name().to_string(),
                path: join(object.name()),
                fields: object.fields().map(|field| field.name().to_string()).collect(),
            })
            .collect();
        let children = node
            .children()
            .map(|child| Self::at(child, join(child.name())))
            .collect();

        Self {
            name: node.name().to_string(),
            path,
            objects,
            children,
        }
    }

    /// Depth-first search for an object by path
    pub fn find_object(&self, path: &str) -> Option<&ObjectOutline> {
        self.objects
            .iter()
            .find(|object| object.path == path)
            .or_else(|| self.children.iter().find_map(|child| child.find_object(path)))
    }

    /// Total node count of this outline
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeOutline::node_count).sum::<usize>()
    }
}
