//! Attribute buffers and the geometry that groups them.

use std::collections::BTreeMap;

use crate::{description::BufferDesc, resources::ResourceId};

/// Whether an attribute advances per vertex or per instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeRate {
    Vertex,
    Instance,
}

/// A named, flat `f32` array with a fixed number of floats per element.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferAttribute {
    pub array: Vec<f32>,
    pub item_size: usize,
    pub rate: AttributeRate,
    /// A larger replacement waiting for its co-attached buffers to catch up.
    pub(crate) pending: Option<Vec<f32>>,
    pub(crate) needs_update: bool,
}

impl BufferAttribute {
    pub fn new(array: Vec<f32>, item_size: usize, rate: AttributeRate) -> Self {
        Self {
            array,
            item_size,
            rate,
            pending: None,
            needs_update: false,
        }
    }

    pub fn from_desc(desc: &BufferDesc, rate: AttributeRate) -> Self {
        Self::new(desc.flat.clone(), desc.type_length, rate)
    }

    /// Number of elements currently stored.
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            return 0;
        }
        self.array.len() / self.item_size
    }

    /// Number of elements in the staged replacement, if any.
    pub fn pending_count(&self) -> Option<usize> {
        let pending = self.pending.as_ref()?;
        if self.item_size == 0 {
            return Some(0);
        }
        Some(pending.len() / self.item_size)
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Overwrites the start of the array without reallocating.
    pub(crate) fn write_prefix(&mut self, values: &[f32]) {
        self.array[..values.len()].copy_from_slice(values);
        self.needs_update = true;
    }
}

/// Vertex and instance attributes plus the triangle index buffer.
///
/// Attributes are kept sorted by name so the first attribute of each rate is
/// stable across rebuilds.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub attributes: BTreeMap<String, BufferAttribute>,
    pub index: Vec<u32>,
    /// `Some` for instanced geometry: how many instances to draw.
    pub instance_count: Option<usize>,
    /// Radius handed to the renderer so the primitive is never frustum culled.
    pub bounding_radius: f32,
    pub(crate) index_needs_update: bool,
    pub(crate) handle: Option<ResourceId>,
}

impl Geometry {
    pub fn new(index: Vec<u32>, bounding_radius: f32) -> Self {
        Self {
            attributes: BTreeMap::new(),
            index,
            instance_count: None,
            bounding_radius,
            index_needs_update: false,
            handle: None,
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: BufferAttribute) {
        self.attributes.insert(name.into(), attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.get(name)
    }

    pub fn set_index(&mut self, index: Vec<u32>) {
        self.index = index;
        self.index_needs_update = true;
    }

    pub fn is_instanced(&self) -> bool {
        self.instance_count.is_some()
    }

    pub fn handle(&self) -> Option<ResourceId> {
        self.handle
    }

    pub fn names(&self, rate: AttributeRate) -> impl Iterator<Item = &String> {
        self.attributes
            .iter()
            .filter(move |(_, attribute)| attribute.rate == rate)
            .map(|(name, _)| name)
    }
}
