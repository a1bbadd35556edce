//! Export command

use scenestream_core::{Document, DocumentBuilder, Node};
use std::fs;
use tracing::info;

pub fn run(
    input: &str,
    output: Option<&str>,
    iteration: u64,
    scene: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Exporting scene from {}", input);

    // Load scene from JSON
    let scene_json = fs::read_to_string(input)?;
    let document = build_document(&scene_json, iteration, scene)?;

    let json = serde_json::to_string_pretty(&document)?;
    match output {
        Some(path) => {
            fs::write(path, &json)?;
            println!(
                "Document with {} meshes written to {}",
                document.mesh_count(),
                path
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_document(
    scene_json: &str,
    iteration: u64,
    scene: Option<String>,
) -> Result<Document, serde_json::Error> {
    let root: Node = serde_json::from_str(scene_json)?;
    info!("Loaded scene with {} nodes", root.node_count());

    let builder = match scene {
        Some(scene) => DocumentBuilder::new().with_scene(scene),
        None => DocumentBuilder::new(),
    };
    Ok(builder.build_frame(&root, iteration))
}
