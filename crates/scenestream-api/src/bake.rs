//! Offline baking of a simulation into a directory
//!
//! Instead of streaming, every sampled step is written as its own file:
//!
//! ```text
//! <directory>/
//!   scene.json    outline of the scene tree, written once
//!   0.json        frame document of frame 0
//!   1.json
//!   ...
//! ```
//!
//! Steps are sampled at a fixed frame rate of simulated time, so a
//! simulation with a small time step still produces a playable animation.

use crate::serialization::{Codec, CodecError};
use scenestream_core::{Document, DocumentBuilder, NodeOutline, SceneNode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File holding the scene outline
pub const OUTLINE_FILE: &str = "scene.json";

/// Default frame rate of a bake
pub const DEFAULT_FPS: f64 = 24.0;

/// Bake errors
#[derive(Debug, Error)]
pub enum BakeError {
    #[error("Bake directory is not empty: {0}")]
    DirectoryNotEmpty(PathBuf),

    #[error("Outline not found: {0}")]
    OutlineNotFound(PathBuf),

    #[error("Frame {0} not found")]
    FrameNotFound(u64),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bake configuration
#[derive(Debug, Clone)]
pub struct BakeConfig {
    /// Output directory, created if missing
    pub directory: PathBuf,
    /// Frames per second of simulated time; zero or less bakes every step
    pub fps: f64,
    /// Scene identifier written into every frame
    pub scene: Option<String>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("bake"),
            fps: DEFAULT_FPS,
            scene: None,
        }
    }
}

/// Decides which steps become frames
///
/// The step at time 0 is always a frame. After that a frame is due whenever
/// the simulated time reaches the next multiple of `1 / fps`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: f64,
    time: f64,
    next_due: f64,
}

impl FrameClock {
    /// Create a clock for a frame rate
    pub fn new(fps: f64) -> Self {
        Self {
            period: if fps > 0.0 { fps.recip() } else { 0.0 },
            time: 0.0,
            next_due: 0.0,
        }
    }

    /// Simulated time of the current step
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Check the current step, then advance by `dt`
    pub fn tick(&mut self, dt: f64) -> bool {
        let due = self.time >= self.next_due;
        if due {
            self.next_due += self.period;
        }
        self.time += dt;
        due
    }
}

/// Path of a frame file
pub fn frame_path(directory: &Path, frame: u64) -> PathBuf {
    directory.join(format!("{}.json", frame))
}

/// Writes sampled steps into a bake directory
pub struct SceneBaker {
    config: BakeConfig,
    builder: DocumentBuilder,
    clock: FrameClock,
    codec: Codec,
    frames_written: u64,
}

impl SceneBaker {
    /// Prepare the directory and write the outline of `root`
    ///
    /// Refuses a directory that already holds files.
    pub fn create(config: BakeConfig, root: &dyn SceneNode) -> Result<Self, BakeError> {
        let directory = &config.directory;
        if directory.exists() {
            if std::fs::read_dir(directory)?.next().is_some() {
                return Err(BakeError::DirectoryNotEmpty(directory.clone()));
            }
        } else {
            std::fs::create_dir_all(directory)?;
        }

        let codec = Codec::Json;
        let outline = NodeOutline::of(root);
        std::fs::write(directory.join(OUTLINE_FILE), codec.encode(&outline)?)?;
        info!(
            nodes = outline.node_count(),
            "Baking into {} at {} fps",
            directory.display(),
            config.fps
        );

        let builder = match &config.scene {
            Some(scene) => DocumentBuilder::new().with_scene(scene.clone()),
            None => DocumentBuilder::new(),
        };

        Ok(Self {
            clock: FrameClock::new(config.fps),
            config,
            builder,
            codec,
            frames_written: 0,
        })
    }

    /// Bake configuration
    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    /// Number of frame files written
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Record the scene at the current step, then advance by `dt` seconds
    ///
    /// Returns the path of the written file, or `None` if this step is not
    /// sampled.
    pub fn on_step(&mut self, root: &dyn SceneNode, dt: f64) -> Result<Option<PathBuf>, BakeError> {
        let time = self.clock.time();
        if !self.clock.tick(dt) {
            return Ok(None);
        }

        let frame = self.frames_written;
        let document = self.builder.build_frame(root, frame);
        let path = frame_path(&self.config.directory, frame);
        std::fs::write(&path, self.codec.encode(&document)?)?;
        self.frames_written += 1;

        debug!(frame, time, "Baked {}", path.display());
        Ok(Some(path))
    }
}

/// A bake directory opened for reading
#[derive(Debug)]
pub struct BakedScene {
    /// Scene outline
    pub outline: NodeOutline,
    /// Number of consecutive frames starting at 0
    pub frame_count: u64,
    /// Source directory
    pub directory: PathBuf,
}

impl BakedScene {
    /// Open a bake directory
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, BakeError> {
        let directory = directory.as_ref();

        let outline_path = directory.join(OUTLINE_FILE);
        if !outline_path.exists() {
            return Err(BakeError::OutlineNotFound(outline_path));
        }
        let outline = Codec::Json.decode(&std::fs::read(&outline_path)?)?;

        let mut frame_count = 0;
        while frame_path(directory, frame_count).exists() {
            frame_count += 1;
        }

        Ok(Self {
            outline,
            frame_count,
            directory: directory.to_path_buf(),
        })
    }

    /// Load one frame document
    pub fn frame(&self, frame: u64) -> Result<Document, BakeError> {
        let path = frame_path(&self.directory, frame);
        if !path.exists() {
            return Err(BakeError::FrameNotFound(frame));
        }
        Ok(Codec::Json.decode(&std::fs::read(path)?)?)
    }
}
