//! Scene document builder
//!
//! Walks the scene tree depth-first and assembles one [`Document`] per node.
//! A node is named in the output only if it, or one of its descendants,
//! carries a mesh.

use crate::document::Document;
use crate::geometry::extract_mesh;
use crate::scene::SceneNode;
use tracing::{debug, trace};

/// Builds frame documents from a scene tree
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    scene: Option<String>,
}

impl DocumentBuilder {
    /// Create a builder without a scene identifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene identifier written at the top level of every frame
    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }

    /// Scene identifier, if known
    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    /// Build the top-level document of a frame
    ///
    /// `iteration` and `scene` are present whether or not the root carries
    /// content.
    pub fn build_frame(&self, root: &dyn SceneNode, iteration: u64) -> Document {
        let mut document = self.build_node(root);
        document.iteration = Some(iteration);
        document.scene = self.scene.clone();

        debug!(
            iteration,
            meshes = document.mesh_count(),
            nodes = document.node_count(),
            "Built frame document"
        );
        document
    }

    /// Build the document of one node and its subtree
    pub fn build_node(&self, node: &dyn SceneNode) -> Document {
        let objects: Vec<_> = node
            .objects()
            .filter_map(extract_mesh)
            .filter(|mesh| !mesh.is_empty())
            .collect();

        let children: Vec<_> = node
            .children()
            .map(|child| self.build_node(child))
            .filter(|child| !child.is_empty())
            .collect();

        let node_name = if objects.is_empty() && children.is_empty() {
            None
        } else {
            trace!(node = node.name(), meshes = objects.len(), "Node contributes");
            Some(node.name().to_string())
        };

        Document {
            objects,
            children,
            node_name,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DataField;
    use crate::scene::{Node, Object};

    fn mesh_object(name: &str) -> Object {
        Object::new(name)
            .with_field(DataField::scalars(
                "position",
                3,
                vec![
                    0.0, 0.0, 0.0, //
                    1.0, 0.0, 0.0, //
                    1.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0,
                ],
            ))
            .with_field(DataField::integers("triangles", 3, vec![0, 1, 2, 2, 3, 0]))
    }

    #[test]
    fn test_empty_node() {
        let node = Node::new("root")
            .with_object(Object::new("solver").with_field(DataField::text("name", "cg")))
            .with_child(Node::new("empty"));

        let document = DocumentBuilder::new().build_node(&node);
        assert!(document.is_empty());
        assert!(document.objects.is_empty());
        assert!(document.children.is_empty());
        assert!(document.node_name.is_none());
    }

    #[test]
    fn test_mesh_without_vertices_not_content() {
        let root = Node::new("root").with_child(
            Node::new("hollow").with_object(
                Object::new("m").with_field(DataField::scalars("position", 3, Vec::new())),
            ),
        );

        let document = DocumentBuilder::new().build_frame(&root, 0);
        assert!(document.node_name.is_none());
        assert!(document.children.is_empty());
        assert_eq!(document.mesh_count(), 0);

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value, serde_json::json!({ "iteration": 0 }));
    }

    #[test]
    fn test_root_with_mesh() {
        let root = Node::new("root").with_object(mesh_object("visual"));

        let document = DocumentBuilder::new().build_frame(&root, 0);
        assert_eq!(document.iteration, Some(0));
        assert_eq!(document.node_name.as_deref(), Some("root"));
        assert_eq!(document.objects.len(), 1);
        assert_eq!(document.objects[0].position.len(), 4);
        assert_eq!(document.objects[0].faces.len(), 2);
        assert!(document.children.is_empty());
    }

    #[test]
    fn test_frame_keys_without_content() {
        let root = Node::new("root");
        let document = DocumentBuilder::new()
            .with_scene("caduceus.scn")
            .build_frame(&root, 12);

        assert_eq!(document.iteration, Some(12));
        assert_eq!(document.scene.as_deref(), Some("caduceus.scn"));
        assert!(document.node_name.is_none());

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_only_ancestors_of_content_named() {
        let root = Node::new("root")
            .with_child(Node::new("sibling").with_child(Node::new("cousin")))
            .with_child(
                Node::new("branch")
                    .with_child(Node::new("empty_leaf"))
                    .with_child(Node::new("leaf").with_object(mesh_object("visual"))),
            );

        let document = DocumentBuilder::new().build_frame(&root, 0);
        assert_eq!(document.node_name.as_deref(), Some("root"));
        assert!(document.objects.is_empty());
        assert_eq!(document.children.len(), 1);

        let branch = &document.children[0];
        assert_eq!(branch.node_name.as_deref(), Some("branch"));
        assert!(branch.objects.is_empty());
        assert_eq!(branch.children.len(), 1);

        let leaf = &branch.children[0];
        assert_eq!(leaf.node_name.as_deref(), Some("leaf"));
        assert_eq!(leaf.objects[0].name, "visual");
        assert!(leaf.children.is_empty());

        assert!(document.find_node("sibling").is_none());
        assert!(document.find_node("empty_leaf").is_none());
    }

    #[test]
    fn test_order_preserved() {
        let root = Node::new("root")
            .with_object(mesh_object("b"))
            .with_object(mesh_object("a"))
            .with_child(Node::new("z").with_object(mesh_object("z_mesh")))
            .with_child(Node::new("y").with_object(mesh_object("y_mesh")));

        let document = DocumentBuilder::new().build_node(&root);
        let objects: Vec<_> = document.objects.iter().map(|m| m.name.as_str()).collect();
        let children: Vec<_> = document
            .children
            .iter()
            .filter_map(|c| c.node_name.as_deref())
            .collect();

        assert_eq!(objects, vec!["b", "a"]);
        assert_eq!(children, vec!["z", "y"]);
    }

    #[test]
    fn test_structure_stable_between_frames() {
        let root = Node::new("root")
            .with_child(Node::new("leaf").with_object(mesh_object("visual")));
        let builder = DocumentBuilder::new().with_scene("scene");

        let first = builder.build_frame(&root, 4);
        let mut second = builder.build_frame(&root, 5);

        assert_eq!(second.iteration, Some(first.iteration.unwrap() + 1));
        second.iteration = first.iteration;
        assert_eq!(first, second);
    }
}
