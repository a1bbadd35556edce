//! Per-step scene exporter
//!
//! The host drives three calls: [`SceneExporter::init`] once, then
//! [`SceneExporter::on_step`] at the beginning of every simulation step, then
//! [`SceneExporter::cleanup`] once. A failed connection makes the exporter
//! inert for the rest of the run.

use crate::client::{ClientConfig, FrameClient, FrameSink};
use scenestream_core::{DocumentBuilder, SceneNode};
use std::net::TcpStream;
use tracing::{error, info, warn};

/// Exporter configuration
#[derive(Debug, Clone, Default)]
pub struct ExporterConfig {
    /// Connection settings
    pub client: ClientConfig,
    /// Scene identifier written into every frame
    pub scene: Option<String>,
}

/// Lifecycle state of the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentState {
    /// `init` has not run yet
    #[default]
    Uninitialized,
    /// Connected, frames are sent
    Valid,
    /// Connection failed or was lost, steps are skipped
    Invalid,
}

/// Result of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was written
    Sent { iteration: u64, bytes: usize },
    /// Nothing was written
    Skipped,
    /// The frame was aborted and the exporter became inert
    Failed { iteration: u64 },
}

/// Streams one document per simulation step
pub struct SceneExporter<W: FrameSink = TcpStream> {
    config: ExporterConfig,
    builder: DocumentBuilder,
    client: Option<FrameClient<W>>,
    state: ComponentState,
    iteration: u64,
}

impl<W: FrameSink> SceneExporter<W> {
    fn with_client(config: ExporterConfig, client: Option<FrameClient<W>>) -> Self {
        let builder = match &config.scene {
            Some(scene) => DocumentBuilder::new().with_scene(scene.clone()),
            None => DocumentBuilder::new(),
        };
        let state = if client.is_some() {
            ComponentState::Valid
        } else {
            ComponentState::Uninitialized
        };

        Self {
            config,
            builder,
            client,
            state,
            iteration: 0,
        }
    }

    /// Create an exporter writing to an already open stream
    pub fn with_writer(config: ExporterConfig, writer: W) -> Self {
        Self::with_client(config, Some(FrameClient::from_writer(writer)))
    }

    /// Current lifecycle state
    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Iteration number of the next frame
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Exporter configuration
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Frame client, while connected
    pub fn client(&self) -> Option<&FrameClient<W>> {
        self.client.as_ref()
    }

    /// Send the current state of the scene
    ///
    /// Does nothing unless the exporter is connected. The iteration counter
    /// advances once per attempted frame.
    pub fn on_step(&mut self, root: &dyn SceneNode) -> StepOutcome {
        if self.state != ComponentState::Valid {
            return StepOutcome::Skipped;
        }
        let Some(client) = self.client.as_mut() else {
            return StepOutcome::Skipped;
        };

        let iteration = self.iteration;
        let document = self.builder.build_frame(root, iteration);
        self.iteration += 1;

        match client.send_frame(&document) {
            Ok(bytes) => StepOutcome::Sent { iteration, bytes },
            Err(e) => {
                error!("Dropping connection after failed frame {}: {}", iteration, e);
                self.client = None;
                self.state = ComponentState::Invalid;
                StepOutcome::Failed { iteration }
            }
        }
    }

    /// Close the stream
    ///
    /// Later steps are skipped. Calling this again does nothing.
    pub fn cleanup(&mut self) {
        if let Some(mut stream) = self.client.take().and_then(|mut client| client.close()) {
            stream.finish();
            info!("Connection closed after {} iterations", self.iteration);
        }
    }
}

impl SceneExporter<TcpStream> {
    /// Create an exporter that connects on [`init`](Self::init)
    pub fn new(config: ExporterConfig) -> Self {
        Self::with_client(config, None)
    }

    /// Connect to the server
    ///
    /// On failure the error is reported once and the exporter stays inert.
    pub fn init(&mut self) -> ComponentState {
        if self.state != ComponentState::Uninitialized {
            warn!("Exporter already initialized");
            return self.state;
        }

        self.state = match FrameClient::connect(&self.config.client) {
            Ok(client) => {
                self.client = Some(client);
                ComponentState::Valid
            }
            Err(e) => {
                error!("Initialization failed: {}", e);
                ComponentState::Invalid
            }
        };
        self.state
    }
}

/// Module metadata reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub license: &'static str,
    pub description: &'static str,
    /// Components provided by this module
    pub components: &'static [&'static str],
}

/// Describe this module
///
/// Hosts that keep a component registry call this once; nothing is stored.
pub fn module_info() -> ModuleInfo {
    ModuleInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        license: "MIT",
        description: "Client sending scene data to a visualization server",
        components: &["SceneExporter"],
    }
}
