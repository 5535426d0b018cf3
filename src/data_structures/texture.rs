//! CPU-side texture images.
//!
//! This module provides [`Texture`], the retained copy of a texture uniform:
//! pixel data, its size, the producer's format/type names and the sampling
//! metadata. The GPU object behind it lives in the render backend and is
//! referenced through `handle`.

use crate::{
    description::{Filter, PixelFormat, PixelType, Wrapping},
    error::SyncError,
    resources::ResourceId,
};

/// Width, height and depth of a texture plus how many of them were declared.
///
/// A 1-D texture has height 1 and a 2-D texture depth 1, so texel math never
/// needs to special-case dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub dimensions: u8,
}

impl TextureSize {
    pub fn from_slice(size: &[u32]) -> Result<Self, SyncError> {
        match *size {
            [width] => Ok(Self {
                width,
                height: 1,
                depth: 1,
                dimensions: 1,
            }),
            [width, height] => Ok(Self {
                width,
                height,
                depth: 1,
                dimensions: 2,
            }),
            [width, height, depth] => Ok(Self {
                width,
                height,
                depth,
                dimensions: 3,
            }),
            _ => Err(SyncError::MalformedTexture(format!(
                "expected 1 to 3 size components, got {}",
                size.len()
            ))),
        }
    }

    pub fn is_volume(&self) -> bool {
        self.dimensions == 3
    }

    pub fn texels(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }
}

/// A texture image together with its sampling state.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub data: Vec<f32>,
    pub size: TextureSize,
    pub format: PixelFormat,
    pub data_type: PixelType,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrapping,
    pub wrap_t: Option<Wrapping>,
    pub wrap_r: Option<Wrapping>,
    pub anisotropy: f32,
    /// The producer sent 3-channel data that was widened to RGBA. Later
    /// replacements arrive as 3-channel data too and get the same treatment.
    pub upconverted: bool,
    pub(crate) needs_update: bool,
    pub(crate) handle: Option<ResourceId>,
}

impl Texture {
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn handle(&self) -> Option<ResourceId> {
        self.handle
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }
}

/// Widens tightly packed RGB data to RGBA with a constant alpha.
///
/// A trailing partial pixel is dropped.
pub fn rgb_to_rgba(rgb: &[f32], alpha: f32) -> Vec<f32> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(alpha);
    }
    rgba
}
