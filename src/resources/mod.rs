//! GPU resources behind the retained scene.
//!
//! The synchronization core never talks to a graphics API directly. It hands
//! geometry, textures and packed uniform blocks to a [`RenderBackend`] and
//! keeps the returned [`ResourceId`] in the CPU-side mirror so the resource
//! can be written to and released later.
//!
//! - [`headless::HeadlessBackend`] keeps counters and sizes only
//! - [`gpu::WgpuBackend`] allocates real wgpu buffers, textures and samplers

pub mod gpu;
pub mod headless;

use crate::data_structures::{
    geometry::{BufferAttribute, Geometry},
    texture::Texture,
};

/// Opaque handle of a resource owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u64);

/// Allocation, upload and release of the resources a plot needs.
///
/// Every `create_*` is paired with exactly one `release_*` by the teardown
/// paths of the session. Writes address resources that are still live.
pub trait RenderBackend {
    /// Allocates one buffer per attribute plus the index buffer, filled with
    /// the current contents of `geometry`.
    fn create_geometry(&mut self, label: &str, geometry: &Geometry) -> ResourceId;

    /// Re-uploads one attribute. The attribute never holds more elements than
    /// it had when the geometry was created.
    fn write_attribute(&mut self, id: ResourceId, name: &str, attribute: &BufferAttribute);

    fn write_index(&mut self, id: ResourceId, index: &[u32]);

    fn release_geometry(&mut self, id: ResourceId);

    fn create_texture(&mut self, label: &str, texture: &Texture) -> ResourceId;

    /// Re-uploads pixels of an unchanged size.
    fn write_texture(&mut self, id: ResourceId, texture: &Texture);

    fn release_texture(&mut self, id: ResourceId);

    /// Allocates the uniform buffer of a material from its packed block.
    fn create_material(&mut self, label: &str, block: &[f32]) -> ResourceId;

    fn write_material(&mut self, id: ResourceId, block: &[f32]);

    fn release_material(&mut self, id: ResourceId);
}
