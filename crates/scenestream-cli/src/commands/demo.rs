//! Demo command

use scenestream_api::{
    BakeConfig, BakedScene, ClientConfig, ComponentState, ExporterConfig, SceneBaker,
    SceneExporter, StepOutcome,
};
use scenestream_core::{DataField, FieldValues, Node, Object};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const GRID_SIZE: usize = 12;
const PARTICLES: usize = 32;

/// Demo settings
pub struct DemoOptions {
    pub host: String,
    pub port: u16,
    pub steps: u32,
    pub interval_ms: u64,
    pub dimension: u8,
    /// Write frames to this directory instead of streaming
    pub bake: Option<PathBuf>,
    pub fps: f64,
}

pub async fn run(options: DemoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let scene = Some(format!("demo_{}d", options.dimension));

    if let Some(directory) = options.bake {
        info!(
            "Baking demo ({}D, {} steps) into {}",
            options.dimension,
            options.steps,
            directory.display()
        );
        let config = BakeConfig {
            directory,
            fps: options.fps,
            scene,
        };
        let dt = Duration::from_millis(options.interval_ms).as_secs_f64();

        let baked = bake_steps(config, options.steps, dt, options.dimension)?;
        println!("\nBake complete!");
        println!("Frames:    {}", baked.frame_count);
        println!("Directory: {}", baked.directory.display());
        return Ok(());
    }

    info!(
        "Running demo ({}D, {} steps, {}ms interval) against {}:{}",
        options.dimension, options.steps, options.interval_ms, options.host, options.port
    );

    let config = ExporterConfig {
        client: ClientConfig {
            host: options.host,
            port: options.port,
            ..Default::default()
        },
        scene,
    };

    let (steps, dimension) = (options.steps, options.dimension);
    let interval = Duration::from_millis(options.interval_ms);
    let summary =
        tokio::task::spawn_blocking(move || run_steps(config, steps, interval, dimension)).await?;

    println!("\nDemo complete!");
    println!("Frames sent: {}", summary.frames);
    println!("Bytes sent:  {}", summary.bytes);
    println!("Time: {:.2}s", summary.elapsed.as_secs_f64());

    Ok(())
}

struct Summary {
    frames: u64,
    bytes: u64,
    elapsed: Duration,
}

fn run_steps(config: ExporterConfig, steps: u32, interval: Duration, dimension: u8) -> Summary {
    let mut exporter = SceneExporter::new(config);
    let mut scene = create_demo_scene(dimension);
    let start = Instant::now();
    let mut summary = Summary {
        frames: 0,
        bytes: 0,
        elapsed: Duration::ZERO,
    };

    if exporter.init() != ComponentState::Valid {
        warn!("Exporter is inactive, steps will not be sent");
    }

    for step in 0..steps {
        let step_start = Instant::now();

        animate(&mut scene, step as f64 * interval.as_secs_f64(), dimension);
        match exporter.on_step(&scene) {
            StepOutcome::Sent { bytes, .. } => {
                summary.frames += 1;
                summary.bytes += bytes as u64;
            }
            StepOutcome::Skipped => {}
            StepOutcome::Failed { iteration } => {
                warn!("Stopping demo after failed iteration {}", iteration);
                break;
            }
        }

        let elapsed = step_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }

    exporter.cleanup();
    summary.elapsed = start.elapsed();
    summary
}

/// Run the simulation without pauses and bake the sampled steps
fn bake_steps(
    config: BakeConfig,
    steps: u32,
    dt: f64,
    dimension: u8,
) -> Result<BakedScene, Box<dyn std::error::Error>> {
    let directory = config.directory.clone();
    let mut scene = create_demo_scene(dimension);
    let mut baker = SceneBaker::create(config, &scene)?;

    for step in 0..steps {
        animate(&mut scene, step as f64 * dt, dimension);
        baker.on_step(&scene, dt)?;
    }

    Ok(BakedScene::open(directory)?)
}

/// Keep the first `dimension` coordinates of a point
fn project(point: [f64; 3], dimension: u8) -> impl Iterator<Item = f64> {
    point.into_iter().take(dimension as usize)
}

fn cloth_positions(time: f64, dimension: u8) -> Vec<f64> {
    let mut cloth = Vec::with_capacity(GRID_SIZE * GRID_SIZE * dimension as usize);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let x = col as f64 / (GRID_SIZE - 1) as f64;
            let y = row as f64 / (GRID_SIZE - 1) as f64;
            let z = 0.1 * ((x * 6.0 + time * 3.0).sin() + (y * 4.0 + time * 2.0).cos());
            cloth.extend(project([x, y, z], dimension));
        }
    }
    cloth
}

fn particle_positions(time: f64, dimension: u8) -> Vec<f64> {
    let mut particles = Vec::with_capacity(PARTICLES * dimension as usize);
    for i in 0..PARTICLES {
        let angle = i as f64 / PARTICLES as f64 * std::f64::consts::TAU + time;
        let radius = 0.75 + 0.05 * (time * 4.0 + i as f64).sin();
        particles.extend(project(
            [0.5 + radius * angle.cos(), 0.5 + radius * angle.sin(), 0.25],
            dimension,
        ));
    }
    particles
}

/// Create the demo scene at time 0
///
/// ```text
/// root
/// ├── solver      (no geometry)
/// ├── cloth       waving quad grid
/// │   └── seams   triangles along the border
/// └── particles   orbiting points
/// ```
fn create_demo_scene(dimension: u8) -> Node {
    let stride = dimension as usize;

    let index = |row: usize, col: usize| (row * GRID_SIZE + col) as i64;
    let mut quads = Vec::new();
    for row in 0..GRID_SIZE - 1 {
        for col in 0..GRID_SIZE - 1 {
            quads.extend([
                index(row, col),
                index(row, col + 1),
                index(row + 1, col + 1),
                index(row + 1, col),
            ]);
        }
    }

    let mut seams = Vec::new();
    for col in 0..GRID_SIZE - 1 {
        seams.extend([index(0, col), index(0, col + 1), index(1, col)]);
    }

    let cloth = cloth_positions(0.0, dimension);
    Node::new("root")
        .with_child(
            Node::new("solver")
                .with_object(Object::new("odesolver").with_field(DataField::text("name", "euler"))),
        )
        .with_child(
            Node::new("cloth")
                .with_object(
                    Object::new("cloth_visual")
                        .with_field(DataField::scalars("position", stride, cloth.clone()))
                        .with_field(DataField::integers("quads", 4, quads)),
                )
                .with_child(
                    Node::new("seams").with_object(
                        Object::new("seam_visual")
                            .with_field(DataField::scalars("position", stride, cloth))
                            .with_field(DataField::integers("triangles", 3, seams)),
                    ),
                ),
        )
        .with_child(Node::new("particles").with_object(
            Object::new("dofs").with_field(DataField::scalars(
                "position",
                stride,
                particle_positions(0.0, dimension),
            )),
        ))
}

/// Move the scene to a point in time
fn animate(scene: &mut Node, time: f64, dimension: u8) {
    let cloth = cloth_positions(time, dimension);
    if let Some(node) = scene.child_mut("cloth") {
        set_positions(node.object_mut("cloth_visual"), cloth.clone());
        set_positions(
            node.child_mut("seams")
                .and_then(|seams| seams.object_mut("seam_visual")),
            cloth,
        );
    }

    set_positions(
        scene
            .child_mut("particles")
            .and_then(|particles| particles.object_mut("dofs")),
        particle_positions(time, dimension),
    );
}

fn set_positions(object: Option<&mut Object>, values: Vec<f64>) {
    if let Some(field) = object.and_then(|object| object.field_mut("position")) {
        field.values = FieldValues::Scalars(values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenestream_core::DocumentBuilder;

    #[test]
    fn test_demo_scene_document() {
        let mut scene = create_demo_scene(3);
        animate(&mut scene, 0.5, 3);
        let document = DocumentBuilder::new().build_frame(&scene, 0);

        assert_eq!(document.node_name.as_deref(), Some("root"));
        assert!(document.find_node("solver").is_none());
        assert_eq!(document.mesh_count(), 3);

        let cloth = document.find_mesh("cloth_visual").unwrap();
        assert_eq!(cloth.position.len(), GRID_SIZE * GRID_SIZE);
        assert_eq!(cloth.faces.len(), (GRID_SIZE - 1) * (GRID_SIZE - 1));
        assert!(cloth.faces.iter().all(|face| face.len() == 4));

        let seams = document.find_mesh("seam_visual").unwrap();
        assert!(seams.faces.iter().all(|face| face.len() == 3));

        let particles = document.find_mesh("dofs").unwrap();
        assert_eq!(particles.position.len(), PARTICLES);
        assert!(particles.faces.is_empty());
    }

    #[test]
    fn test_demo_scene_lower_dimensions() {
        for dimension in [1, 2] {
            let scene = create_demo_scene(dimension);
            let document = DocumentBuilder::new().build_frame(&scene, 0);
            let cloth = document.find_mesh("cloth_visual").unwrap();

            assert_eq!(cloth.position.len(), GRID_SIZE * GRID_SIZE);
            assert!(cloth.position.iter().all(|p| p[2] == 0.0));
            if dimension == 1 {
                assert!(cloth.position.iter().all(|p| p[1] == 0.0));
            }
        }
    }

    #[test]
    fn test_animate_moves_positions() {
        let mut scene = create_demo_scene(3);
        let builder = DocumentBuilder::new();
        let before = builder.build_frame(&scene, 0);

        animate(&mut scene, 1.0, 3);
        let after = builder.build_frame(&scene, 1);

        for name in ["cloth_visual", "seam_visual", "dofs"] {
            let (a, b) = (before.find_mesh(name).unwrap(), after.find_mesh(name).unwrap());
            assert_eq!(a.position.len(), b.position.len());
            assert_ne!(a.position, b.position);
            assert_eq!(a.faces, b.faces);
        }
    }

    #[test]
    fn test_bake_demo() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = BakeConfig {
            directory: temp_dir.path().join("demo"),
            fps: 0.0,
            scene: Some("demo_3d".to_string()),
        };

        let baked = bake_steps(config, 6, 0.04, 3).unwrap();
        assert_eq!(baked.frame_count, 6);
        assert!(baked.outline.find_object("/cloth/seams/seam_visual").is_some());

        let last = baked.frame(5).unwrap();
        assert_eq!(last.iteration, Some(5));
        assert_eq!(last.scene.as_deref(), Some("demo_3d"));
        assert_eq!(last.mesh_count(), 3);
    }
}
