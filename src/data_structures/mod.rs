//! Retained data structures: the CPU-side mirror of everything on the GPU.
//!
//! - `uniform` holds typed uniform values and shared uniform slots
//! - `texture` holds texture images and their sampling state
//! - `geometry` holds attribute buffers and the index buffer
//! - `material` holds shader sources, uniform slots and render state
//! - `scene_graph` holds scene nodes and plots

pub mod geometry;
pub mod material;
pub mod scene_graph;
pub mod texture;
pub mod uniform;
