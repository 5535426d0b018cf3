//! A backend without a GPU.
//!
//! Keeps track of what is allocated, how large it is and how often it was
//! written. Used by the replay tool and by tests that check the resource
//! accounting of the teardown paths.

use std::collections::{BTreeMap, HashMap};

use log::error;

use crate::{
    data_structures::{
        geometry::{BufferAttribute, Geometry},
        texture::Texture,
    },
    resources::{RenderBackend, ResourceId},
};

/// Allocation counters, cumulative over the lifetime of the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub geometries_created: usize,
    pub geometries_released: usize,
    pub textures_created: usize,
    pub textures_released: usize,
    pub materials_created: usize,
    pub materials_released: usize,
    pub attribute_writes: usize,
    pub index_writes: usize,
    pub texture_writes: usize,
    pub material_writes: usize,
    /// Releases of ids that were not live. Always 0 unless teardown is broken.
    pub invalid_releases: usize,
}

/// Label and pixel length of one live texture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureRecord {
    pub label: String,
    pub len: usize,
}

/// Element counts of the buffers of one live geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryRecord {
    pub label: String,
    pub attributes: BTreeMap<String, usize>,
    pub index_len: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    geometries: HashMap<ResourceId, GeometryRecord>,
    textures: HashMap<ResourceId, TextureRecord>,
    materials: HashMap<ResourceId, usize>,
    stats: BackendStats,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    /// Total of all live resources.
    pub fn live(&self) -> usize {
        self.live_geometries() + self.live_textures() + self.live_materials()
    }

    pub fn geometry(&self, id: ResourceId) -> Option<&GeometryRecord> {
        self.geometries.get(&id)
    }

    pub fn texture(&self, id: ResourceId) -> Option<&TextureRecord> {
        self.textures.get(&id)
    }

    /// Length in floats of a live texture's pixel data.
    pub fn texture_len(&self, id: ResourceId) -> Option<usize> {
        self.textures.get(&id).map(|record| record.len)
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.geometries.contains_key(&id)
            || self.textures.contains_key(&id)
            || self.materials.contains_key(&id)
    }

    fn allocate(&mut self) -> ResourceId {
        self.next_id += 1;
        ResourceId(self.next_id)
    }

    fn invalid_release(&mut self, kind: &str, id: ResourceId) {
        error!("release of {} {:?} which is not live", kind, id);
        self.stats.invalid_releases += 1;
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_geometry(&mut self, label: &str, geometry: &Geometry) -> ResourceId {
        let id = self.allocate();
        let record = GeometryRecord {
            label: label.to_string(),
            attributes: geometry
                .attributes
                .iter()
                .map(|(name, attribute)| (name.clone(), attribute.count()))
                .collect(),
            index_len: geometry.index.len(),
        };
        self.geometries.insert(id, record);
        self.stats.geometries_created += 1;
        id
    }

    fn write_attribute(&mut self, id: ResourceId, name: &str, attribute: &BufferAttribute) {
        match self.geometries.get_mut(&id) {
            Some(record) => {
                record.attributes.insert(name.to_string(), attribute.count());
                self.stats.attribute_writes += 1;
            }
            None => error!("attribute '{}' written to geometry {:?} which is not live", name, id),
        }
    }

    fn write_index(&mut self, id: ResourceId, index: &[u32]) {
        match self.geometries.get_mut(&id) {
            Some(record) => {
                record.index_len = index.len();
                self.stats.index_writes += 1;
            }
            None => error!("index written to geometry {:?} which is not live", id),
        }
    }

    fn release_geometry(&mut self, id: ResourceId) {
        if self.geometries.remove(&id).is_some() {
            self.stats.geometries_released += 1;
        } else {
            self.invalid_release("geometry", id);
        }
    }

    fn create_texture(&mut self, label: &str, texture: &Texture) -> ResourceId {
        let id = self.allocate();
        let record = TextureRecord {
            label: label.to_string(),
            len: texture.data.len(),
        };
        self.textures.insert(id, record);
        self.stats.textures_created += 1;
        id
    }

    fn write_texture(&mut self, id: ResourceId, texture: &Texture) {
        match self.textures.get_mut(&id) {
            Some(record) => {
                record.len = texture.data.len();
                self.stats.texture_writes += 1;
            }
            None => error!("texture {:?} written but not live", id),
        }
    }

    fn release_texture(&mut self, id: ResourceId) {
        if self.textures.remove(&id).is_some() {
            self.stats.textures_released += 1;
        } else {
            self.invalid_release("texture", id);
        }
    }

    fn create_material(&mut self, _label: &str, block: &[f32]) -> ResourceId {
        let id = self.allocate();
        self.materials.insert(id, block.len());
        self.stats.materials_created += 1;
        id
    }

    fn write_material(&mut self, id: ResourceId, block: &[f32]) {
        match self.materials.get_mut(&id) {
            Some(len) => {
                *len = block.len();
                self.stats.material_writes += 1;
            }
            None => error!("material {:?} written but not live", id),
        }
    }

    fn release_material(&mut self, id: ResourceId) {
        if self.materials.remove(&id).is_some() {
            self.stats.materials_released += 1;
        } else {
            self.invalid_release("material", id);
        }
    }
}
