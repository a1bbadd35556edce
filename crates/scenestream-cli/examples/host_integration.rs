//! Host Integration Example
//!
//! Exposes a host-owned 2D particle simulation through the scene traits,
//! without copying it into the owned `Node` model, and streams a few steps to
//! an in-process frame server.
//!
//! Run with: cargo run --example host_integration

use scenestream_api::{
    ClientConfig, ExporterConfig, FrameServer, SceneExporter, ServerConfig, StepOutcome,
};
use scenestream_core::{SceneNode, SceneObject, TypeInfo, TypedField};

/// Host-side state vector: 2D points stored as f32 pairs
struct MechanicalState {
    name: String,
    points: Vec<[f32; 2]>,
    velocities: Vec<[f32; 2]>,
}

/// `position` view over the state vector
struct PositionView<'a>(&'a [[f32; 2]]);

impl TypedField for PositionView<'_> {
    fn name(&self) -> &str {
        "position"
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::scalar_container()
    }

    fn stride(&self) -> usize {
        2
    }

    fn len(&self) -> usize {
        self.0.len() * 2
    }

    fn read_float(&self, index: usize) -> f64 {
        self.0[index / 2][index % 2] as f64
    }

    fn read_int(&self, index: usize) -> i64 {
        self.read_float(index) as i64
    }
}

/// Host-side object: owns its views for the duration of a traversal
struct StateObject<'a> {
    state: &'a MechanicalState,
    position: PositionView<'a>,
}

impl SceneObject for StateObject<'_> {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &dyn TypedField> + '_> {
        Box::new(std::iter::once(&self.position as &dyn TypedField))
    }
}

/// Single-node host scene
struct Simulation {
    state: MechanicalState,
}

impl Simulation {
    fn step(&mut self, dt: f32) {
        let gravity = -9.81;
        for (point, velocity) in self.state.points.iter_mut().zip(&mut self.state.velocities) {
            velocity[1] += gravity * dt;
            point[0] += velocity[0] * dt;
            point[1] += velocity[1] * dt;
            if point[1] < 0.0 {
                point[1] = 0.0;
                velocity[1] = -velocity[1] * 0.5;
            }
        }
    }

    fn view(&self) -> SimulationView<'_> {
        SimulationView {
            object: StateObject {
                state: &self.state,
                position: PositionView(&self.state.points),
            },
        }
    }
}

struct SimulationView<'a> {
    object: StateObject<'a>,
}

impl SceneNode for SimulationView<'_> {
    fn name(&self) -> &str {
        "particles"
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn SceneNode> + '_> {
        Box::new(std::iter::empty())
    }

    fn objects(&self) -> Box<dyn Iterator<Item = &dyn SceneObject> + '_> {
        Box::new(std::iter::once(&self.object as &dyn SceneObject))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = FrameServer::bind(ServerConfig {
        listen_address: "127.0.0.1:0".to_string(),
        ..Default::default()
    })
    .await?;
    let address = server.local_addr()?;

    let sender = tokio::task::spawn_blocking(move || {
        let mut simulation = Simulation {
            state: MechanicalState {
                name: "dofs".to_string(),
                points: (0..8).map(|i| [i as f32 * 0.5, 2.0]).collect(),
                velocities: vec![[0.1, 0.0]; 8],
            },
        };

        let mut exporter = SceneExporter::new(ExporterConfig {
            client: ClientConfig {
                host: address.ip().to_string(),
                port: address.port(),
                ..Default::default()
            },
            scene: Some("falling_particles".to_string()),
        });
        exporter.init();

        for _ in 0..5 {
            if let StepOutcome::Failed { iteration } = exporter.on_step(&simulation.view()) {
                eprintln!("Frame {} failed", iteration);
                break;
            }
            simulation.step(0.05);
        }
        exporter.cleanup();
    });

    let mut stream = server.accept().await?;
    while let Some(document) = stream.next_document().await? {
        let mesh = &document.objects[0];
        println!(
            "Iteration {}: {} points, first at {:?}",
            document.iteration.unwrap_or_default(),
            mesh.position.len(),
            mesh.position[0]
        );
    }

    sender.await?;
    Ok(())
}
