//! Inspect command

use scenestream_api::BakedScene;
use scenestream_core::NodeOutline;
use std::path::Path;

pub fn run(directory: &Path, frame: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let baked = BakedScene::open(directory)?;

    if let Some(frame) = frame {
        let document = baked.frame(frame)?;
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("Bake: {}", baked.directory.display());
    println!("Frames: {}", baked.frame_count);
    println!();
    print!("{}", render_outline(&baked.outline));

    Ok(())
}

fn render_outline(outline: &NodeOutline) -> String {
    let mut out = String::new();
    write_node(&mut out, outline, 0);
    out
}

fn write_node(out: &mut String, node: &NodeOutline, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{}/\n", indent, node.name));
    for object in &node.objects {
        out.push_str(&format!(
            "{}  {} [{}]\n",
            indent,
            object.name,
            object.fields.join(", ")
        ));
    }
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}
