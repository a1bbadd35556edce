//! Serve command

use scenestream_api::{FrameServer, ServerConfig};
use tokio::sync::mpsc;
use tracing::{error, info};

pub async fn run(address: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting SceneStream server on {}", address);

    let config = ServerConfig {
        listen_address: address.to_string(),
        ..Default::default()
    };

    let server = FrameServer::bind(config).await?;

    println!("SceneStream Frame Server");
    println!("========================");
    println!();
    println!("Listening on: {}", server.local_addr()?);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let (sender, mut receiver) = mpsc::channel(16);
    let serving = tokio::spawn(server.serve(sender));

    loop {
        tokio::select! {
            document = receiver.recv() => match document {
                Some(document) => {
                    info!(
                        nodes = document.node_count(),
                        meshes = document.mesh_count(),
                        scene = document.scene.as_deref().unwrap_or("-"),
                        "Iteration #{}",
                        document.iteration.unwrap_or_default()
                    );
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    serving.abort();
    if let Ok(Err(e)) = serving.await {
        error!("Server stopped: {}", e);
    }

    println!("\nShutting down...");

    Ok(())
}
