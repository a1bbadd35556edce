//! Frame documents
//!
//! A [`Document`] is the nested structure sent once per simulation step.
//! Every key is optional on the wire: absent and empty values are omitted
//! so that a node without content serializes to `{}`.

use serde::{Deserialize, Serialize};

/// Mesh data extracted from one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Object name
    pub name: String,

    /// Vertex positions, always three components
    pub position: Vec<[f64; 3]>,

    /// Faces as vertex index lists, omitted when there is no topology
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<Vec<i64>>,
}

impl MeshRecord {
    /// Create a record with positions only
    pub fn new(name: impl Into<String>, position: Vec<[f64; 3]>) -> Self {
        Self {
            name: name.into(),
            position,
            faces: Vec::new(),
        }
    }

    /// Set the faces
    pub fn with_faces(mut self, faces: Vec<Vec<i64>>) -> Self {
        self.faces = faces;
        self
    }

    /// Check if the record has no vertices
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Document for one node of the scene tree
///
/// Only the top-level document of a frame carries `iteration` and `scene`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Step counter, starting at 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u64>,

    /// Source identifier of the simulated scene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,

    /// Meshes attached to this node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<MeshRecord>,

    /// Child nodes that carry content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Document>,

    /// Set when this node or a descendant carries content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the node contributed nothing
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.children.is_empty() && self.node_name.is_none()
    }

    /// Meshes in this document and all descendants
    pub fn mesh_count(&self) -> usize {
        self.objects.len()
            + self
                .children
                .iter()
                .map(Document::mesh_count)
                .sum::<usize>()
    }

    /// Named nodes in this document and all descendants
    pub fn node_count(&self) -> usize {
        usize::from(self.node_name.is_some())
            + self
                .children
                .iter()
                .map(Document::node_count)
                .sum::<usize>()
    }

    /// Depth-first search for a node by name
    pub fn find_node(&self, name: &str) -> Option<&Document> {
        if self.node_name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_node(name))
    }

    /// Depth-first search for a mesh by object name
    pub fn find_mesh(&self, name: &str) -> Option<&MeshRecord> {
        self.objects
            .iter()
            .find(|mesh| mesh.name == name)
            .or_else(|| self.children.iter().find_map(|child| child.find_mesh(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_serializes_to_empty_map() {
        let json = serde_json::to_string(&Document::new()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_faces_omitted_when_empty() {
        let record = MeshRecord::new("points", vec![[1.0, 2.0, 0.0]]);
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("faces").is_none());
        assert_eq!(value["position"][0][1], 2.0);
    }

    #[test]
    fn test_top_level_keys() {
        let document = Document {
            iteration: Some(0),
            scene: Some("liver.scn".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["iteration"], 0);
        assert_eq!(value["scene"], "liver.scn");
        assert!(value.get("objects").is_none());
        assert!(value.get("children").is_none());
        assert!(value.get("node_name").is_none());
        assert!(document.is_empty());
    }

    #[test]
    fn test_counts_and_lookup() {
        let leaf = Document {
            objects: vec![MeshRecord::new("visual", vec![[0.0; 3]])],
            node_name: Some("leaf".to_string()),
            ..Default::default()
        };
        let root = Document {
            iteration: Some(3),
            children: vec![leaf],
            node_name: Some("root".to_string()),
            ..Default::default()
        };

        assert_eq!(root.mesh_count(), 1);
        assert_eq!(root.node_count(), 2);
        assert!(root.find_node("leaf").is_some());
        assert!(root.find_mesh("visual").is_some());
        assert!(root.find_mesh("missing").is_none());
    }

    #[test]
    fn test_document_deserialization_defaults() {
        let json = r#"{"iteration": 7, "node_name": "root", "objects": [{"name": "m", "position": [[1, 2, 3]]}]}"#;
        let document: Document = serde_json::from_str(json).unwrap();

        assert_eq!(document.iteration, Some(7));
        assert!(document.children.is_empty());
        assert!(document.objects[0].faces.is_empty());
    }
}
