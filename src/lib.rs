//! plot-sync
//!
//! A retained scene synchronization engine. A plotting producer describes a
//! tree of scenes and their plots once and then streams small updates:
//! uniform values, attribute buffers, visibility, index buffers and camera
//! matrices. This crate keeps a CPU-side mirror of that scene, applies every
//! update without needless reallocation and hands the resulting geometry,
//! textures and uniform blocks to a render backend. Every GPU resource it
//! allocates is released exactly once, on every deletion path.
//!
//! High-level modules
//! - `camera`: per-scene matrices shared into plot materials, orbit controller
//! - `config`: session tunables
//! - `data_structures`: uniforms, textures, geometry, materials, scene nodes
//! - `description`: the producer's serde description and payload types
//! - `error`: the failure taxonomy
//! - `flow`: update messages and the channel that drives a session
//! - `logging`: logger setup for binaries and tests
//! - `registry`: id-indexed scenes and plots
//! - `resources`: the render backend seam, headless and wgpu backends
//! - `session`: owner of registry, backend and shared state
//! - `sync`: building, updating and tearing down render state
//!

pub mod camera;
pub mod config;
pub mod data_structures;
pub mod description;
pub mod error;
pub mod flow;
pub mod logging;
pub mod registry;
pub mod resources;
pub mod session;
pub mod sync;

// Re-exports commonly used types for convenience in downstream code.
pub use config::SessionConfig;
pub use data_structures::scene_graph::{Plot, Scene, Screen};
pub use description::{PlotDesc, RawValue, SceneDesc};
pub use error::SyncError;
pub use flow::{Update, UpdateSender, channel, drive};
pub use resources::{RenderBackend, ResourceId, headless::HeadlessBackend};
pub use session::Session;
