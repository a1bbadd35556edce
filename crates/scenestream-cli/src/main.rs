//! SceneStream CLI
//!
//! A tool for streaming, baking, receiving and inspecting scene frames.

use clap::{Parser, Subcommand};
use scenestream_api::{DEFAULT_FPS, DEFAULT_PORT};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// SceneStream - per-step scene snapshots for external viewers
#[derive(Parser)]
#[command(name = "scenestream")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive frames and log every iteration
    Serve {
        /// Listen address
        #[arg(short, long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        address: String,
    },

    /// Stream an animated demo scene to a server
    Demo {
        /// Server IP address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Number of simulation steps
        #[arg(short, long, default_value = "100")]
        steps: u32,

        /// Delay between steps in milliseconds
        #[arg(short, long, default_value = "40")]
        interval_ms: u64,

        /// Dimension of the simulated positions
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=3))]
        dimension: u8,

        /// Bake frames into this directory instead of streaming
        #[arg(long)]
        bake: Option<PathBuf>,

        /// Frames per second of simulated time when baking
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: f64,
    },

    /// Build one document from a scene file
    Export {
        /// Input scene file (JSON)
        input: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Iteration number written into the document
        #[arg(long, default_value = "0")]
        iteration: u64,

        /// Scene identifier written into the document
        #[arg(long)]
        scene: Option<String>,
    },

    /// Show the outline and frames of a bake directory
    Inspect {
        /// Bake directory
        directory: PathBuf,

        /// Print the document of this frame
        #[arg(short, long)]
        frame: Option<u64>,
    },

    /// Show module information
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve { address } => {
            commands::server::run(&address).await?;
        }

        Commands::Demo {
            host,
            port,
            steps,
            interval_ms,
            dimension,
            bake,
            fps,
        } => {
            commands::demo::run(commands::demo::DemoOptions {
                host,
                port,
                steps,
                interval_ms,
                dimension,
                bake,
                fps,
            })
            .await?;
        }

        Commands::Export {
            input,
            output,
            iteration,
            scene,
        } => {
            commands::export::run(&input, output.as_deref(), iteration, scene)?;
        }

        Commands::Inspect { directory, frame } => {
            commands::inspect::run(&directory, frame)?;
        }

        Commands::Info => {
            commands::info::run();
        }
    }

    Ok(())
}
