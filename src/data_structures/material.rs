//! Shader material: sources, uniform slots and fixed render state.

use std::collections::BTreeMap;

use crate::{data_structures::uniform::UniformSlot, resources::ResourceId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

#[derive(Debug)]
pub struct Material {
    pub uniforms: BTreeMap<String, UniformSlot>,
    pub vertex_source: String,
    pub fragment_source: String,
    pub side: Side,
    pub transparent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub(crate) handle: Option<ResourceId>,
}

impl Material {
    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.get(name)
    }

    pub fn handle(&self) -> Option<ResourceId> {
        self.handle
    }

    /// Numeric uniforms packed in name order, see [`Uniform::pack_into`].
    ///
    /// [`Uniform::pack_into`]: crate::data_structures::uniform::Uniform
    pub fn uniform_block(&self) -> Vec<f32> {
        let mut block = Vec::new();
        for slot in self.uniforms.values() {
            slot.borrow().pack_into(&mut block);
        }
        block
    }
}
