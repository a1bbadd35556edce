//! SceneStream API - Frame protocol between simulation and viewer
//!
//! This crate provides the communication layer between a running simulation
//! and the visualization tool mirroring it.
//!
//! # Architecture
//!
//! ```text
//! Simulation                                  Viewer
//! ┌───────────────┐                          ┌──────────────┐
//! │ SceneExporter │   <SOFABlender>          │ FrameServer  │
//! │  on_step()    │   payload (4096 chunks)  │  FrameStream │
//! │  FrameClient  │ ───────────────────────► │  Document    │
//! │               │   </SOFABlender>         │              │
//! └───────────────┘   once per step          └──────────────┘
//! ```
//!
//! The sending side is blocking and runs inside the simulation step. The
//! receiving side runs on tokio. [`SceneBaker`] writes the same documents to
//! a directory for offline playback instead.

pub mod bake;
pub mod client;
pub mod exporter;
pub mod serialization;
pub mod server;

// Re-export commonly used types
pub use bake::{BakeConfig, BakeError, BakedScene, DEFAULT_FPS, FrameClock, SceneBaker};
pub use client::{ClientConfig, ClientError, DEFAULT_PORT, FrameClient, FrameSink};
pub use exporter::{
    ComponentState, ExporterConfig, ModuleInfo, SceneExporter, StepOutcome, module_info,
};
pub use serialization::{
    CHUNK_SIZE, Codec, CodecError, FRAME_FOOTER, FRAME_HEADER, FrameDecoder, MarkerCodec,
    write_frame,
};
pub use server::{FrameServer, FrameStream, ServerConfig, ServerError};
