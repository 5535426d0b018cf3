//! wgpu implementation of the render backend.
//!
//! Attributes become one `VERTEX` buffer each, the index buffer an `INDEX`
//! buffer and every material one `UNIFORM` buffer. Textures are uploaded as
//! 32-bit float or 8-bit normalized images with a sampler built from the
//! texture's filter and wrap settings.

use std::collections::HashMap;

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::{BufferAttribute, Geometry},
        texture::{Texture, rgb_to_rgba},
    },
    description::{Filter, PixelFormat, PixelType, Wrapping},
    resources::{RenderBackend, ResourceId},
};

#[derive(Debug)]
pub struct GpuGeometry {
    pub attributes: HashMap<String, wgpu::Buffer>,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub format: wgpu::TextureFormat,
}

pub struct WgpuBackend {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    next_id: u64,
    geometries: HashMap<ResourceId, GpuGeometry>,
    textures: HashMap<ResourceId, GpuTexture>,
    materials: HashMap<ResourceId, wgpu::Buffer>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            next_id: 0,
            geometries: HashMap::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
        }
    }

    /// Requests an adapter without a surface, for offscreen use and tests.
    pub async fn new_headless() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter available")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("plot-sync device"),
                // WebGL doesn't support all of wgpu's features.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("failed to create device")?;
        Ok(Self::new(device, queue))
    }

    pub fn geometry(&self, id: ResourceId) -> Option<&GpuGeometry> {
        self.geometries.get(&id)
    }

    pub fn texture(&self, id: ResourceId) -> Option<&GpuTexture> {
        self.textures.get(&id)
    }

    pub fn material(&self, id: ResourceId) -> Option<&wgpu::Buffer> {
        self.materials.get(&id)
    }

    fn allocate(&mut self) -> ResourceId {
        self.next_id += 1;
        ResourceId(self.next_id)
    }

    fn vertex_buffer(&self, label: &str, data: &[f32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn index_buffer(&self, label: &str, index: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(index),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn upload_texture(&self, texture: &wgpu::Texture, format: wgpu::TextureFormat, source: &Texture) {
        let size = extent(source);
        let bytes = texel_bytes(source);
        let bytes_per_texel = format.block_copy_size(None).unwrap_or(4);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_texel * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
    }
}

impl RenderBackend for WgpuBackend {
    fn create_geometry(&mut self, label: &str, geometry: &Geometry) -> ResourceId {
        let attributes = geometry
            .attributes
            .iter()
            .map(|(name, attribute)| {
                let buffer = self.vertex_buffer(&format!("{} {}", label, name), &attribute.array);
                (name.clone(), buffer)
            })
            .collect();
        let index_buffer = self.index_buffer(&format!("{} index", label), &geometry.index);
        let id = self.allocate();
        self.geometries.insert(
            id,
            GpuGeometry {
                attributes,
                index_buffer,
                num_indices: geometry.index.len() as u32,
            },
        );
        id
    }

    fn write_attribute(&mut self, id: ResourceId, name: &str, attribute: &BufferAttribute) {
        let contents: &[u8] = bytemuck::cast_slice(&attribute.array);
        let Some(geometry) = self.geometries.get(&id) else {
            log::error!("attribute '{}' written to geometry {:?} which is not live", name, id);
            return;
        };
        if let Some(buffer) = geometry.attributes.get(name) {
            if buffer.size() >= contents.len() as u64 {
                self.queue.write_buffer(buffer, 0, contents);
                return;
            }
        }
        let buffer = self.vertex_buffer(name, &attribute.array);
        if let Some(geometry) = self.geometries.get_mut(&id) {
            if let Some(old) = geometry.attributes.insert(name.to_string(), buffer) {
                old.destroy();
            }
        }
    }

    fn write_index(&mut self, id: ResourceId, index: &[u32]) {
        let contents: &[u8] = bytemuck::cast_slice(index);
        let Some(geometry) = self.geometries.get(&id) else {
            log::error!("index written to geometry {:?} which is not live", id);
            return;
        };
        let replacement = if geometry.index_buffer.size() >= contents.len() as u64 {
            self.queue.write_buffer(&geometry.index_buffer, 0, contents);
            None
        } else {
            Some(self.index_buffer("index", index))
        };
        if let Some(geometry) = self.geometries.get_mut(&id) {
            if let Some(buffer) = replacement {
                std::mem::replace(&mut geometry.index_buffer, buffer).destroy();
            }
            geometry.num_indices = index.len() as u32;
        }
    }

    fn release_geometry(&mut self, id: ResourceId) {
        match self.geometries.remove(&id) {
            Some(geometry) => {
                for buffer in geometry.attributes.values() {
                    buffer.destroy();
                }
                geometry.index_buffer.destroy();
            }
            None => log::error!("release of geometry {:?} which is not live", id),
        }
    }

    fn create_texture(&mut self, label: &str, source: &Texture) -> ResourceId {
        let format = texture_format(source.format, source.data_type);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(source),
            mip_level_count: 1,
            sample_count: 1,
            dimension: match source.size.dimensions {
                1 => wgpu::TextureDimension::D1,
                2 => wgpu::TextureDimension::D2,
                _ => wgpu::TextureDimension::D3,
            },
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.upload_texture(&texture, format, source);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&sampler_descriptor(source));
        let id = self.allocate();
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                sampler,
                format,
            },
        );
        id
    }

    fn write_texture(&mut self, id: ResourceId, source: &Texture) {
        match self.textures.get(&id) {
            Some(gpu) => self.upload_texture(&gpu.texture, gpu.format, source),
            None => log::error!("texture {:?} written but not live", id),
        }
    }

    fn release_texture(&mut self, id: ResourceId) {
        match self.textures.remove(&id) {
            Some(gpu) => gpu.texture.destroy(),
            None => log::error!("release of texture {:?} which is not live", id),
        }
    }

    fn create_material(&mut self, label: &str, block: &[f32]) -> ResourceId {
        let contents = padded_block(block);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&contents),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let id = self.allocate();
        self.materials.insert(id, buffer);
        id
    }

    fn write_material(&mut self, id: ResourceId, block: &[f32]) {
        let contents = padded_block(block);
        let bytes: &[u8] = bytemuck::cast_slice(&contents);
        let Some(buffer) = self.materials.get(&id) else {
            log::error!("material {:?} written but not live", id);
            return;
        };
        if buffer.size() >= bytes.len() as u64 {
            self.queue.write_buffer(buffer, 0, bytes);
            return;
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("material"),
                contents: bytes,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        if let Some(old) = self.materials.insert(id, buffer) {
            old.destroy();
        }
    }

    fn release_material(&mut self, id: ResourceId) {
        match self.materials.remove(&id) {
            Some(buffer) => buffer.destroy(),
            None => log::error!("release of material {:?} which is not live", id),
        }
    }
}

/// Uniform buffers may not be empty.
fn padded_block(block: &[f32]) -> Vec<f32> {
    let mut contents = block.to_vec();
    if contents.is_empty() {
        contents.resize(4, 0.0);
    }
    contents
}

fn extent(texture: &Texture) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: texture.size.width.max(1),
        height: texture.size.height.max(1),
        depth_or_array_layers: texture.size.depth.max(1),
    }
}

/// Three-channel formats do not exist on the GPU; they are stored as RGBA.
fn texture_format(format: PixelFormat, data_type: PixelType) -> wgpu::TextureFormat {
    match (data_type, format) {
        (PixelType::UnsignedByte, PixelFormat::Red) => wgpu::TextureFormat::R8Unorm,
        (PixelType::UnsignedByte, PixelFormat::Rg) => wgpu::TextureFormat::Rg8Unorm,
        (PixelType::UnsignedByte, _) => wgpu::TextureFormat::Rgba8Unorm,
        (_, PixelFormat::Red) => wgpu::TextureFormat::R32Float,
        (_, PixelFormat::Rg) => wgpu::TextureFormat::Rg32Float,
        (_, _) => wgpu::TextureFormat::Rgba32Float,
    }
}

fn texel_bytes(texture: &Texture) -> Vec<u8> {
    let widened;
    let pixels = if texture.format == PixelFormat::Rgb {
        widened = rgb_to_rgba(&texture.data, texture.data_type.opaque());
        &widened
    } else {
        &texture.data
    };
    match texture.data_type {
        PixelType::UnsignedByte => pixels
            .iter()
            .map(|value| value.clamp(0.0, 255.0) as u8)
            .collect(),
        PixelType::Float | PixelType::HalfFloat => bytemuck::cast_slice(pixels).to_vec(),
    }
}

fn address_mode(wrapping: Wrapping) -> wgpu::AddressMode {
    match wrapping {
        Wrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrapping::Repeat => wgpu::AddressMode::Repeat,
        Wrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest | Filter::NearestMipmapNearest => wgpu::FilterMode::Nearest,
        Filter::Linear | Filter::LinearMipmapLinear => wgpu::FilterMode::Linear,
    }
}

fn sampler_descriptor(texture: &Texture) -> wgpu::SamplerDescriptor<'static> {
    let min_filter = filter_mode(texture.min_filter);
    let mag_filter = filter_mode(texture.mag_filter);
    // Anisotropic filtering is only valid when every filter is linear.
    let linear = min_filter == wgpu::FilterMode::Linear && mag_filter == wgpu::FilterMode::Linear;
    let anisotropy_clamp = if linear {
        (texture.anisotropy.round() as u16).clamp(1, 16)
    } else {
        1
    };
    let address_mode_u = address_mode(texture.wrap_s);
    let address_mode_v = texture.wrap_t.map(address_mode).unwrap_or(address_mode_u);
    let address_mode_w = texture.wrap_r.map(address_mode).unwrap_or(address_mode_v);
    wgpu::SamplerDescriptor {
        label: Some("plot texture sampler"),
        address_mode_u,
        address_mode_v,
        address_mode_w,
        mag_filter,
        min_filter,
        mipmap_filter: if linear {
            wgpu::MipmapFilterMode::Linear
        } else {
            wgpu::MipmapFilterMode::Nearest
        },
        anisotropy_clamp,
        ..Default::default()
    }
}
