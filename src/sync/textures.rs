//! Texture creation and re-creation from producer descriptors.

use log::debug;

use crate::{
    config::SessionConfig,
    data_structures::texture::{Texture, TextureSize, rgb_to_rgba},
    description::{PixelFormat, TextureData, TextureDesc},
    error::SyncError,
};

/// What texture creation needs to know about the session.
#[derive(Clone, Copy, Debug)]
pub struct TextureContext<'a> {
    /// The shared atlas buffer, once the host has provided it.
    pub atlas: Option<&'a [f32]>,
    pub atlas_token: &'a str,
    pub upconvert_rgb: bool,
}

impl<'a> TextureContext<'a> {
    pub fn new(atlas: Option<&'a [f32]>, config: &'a SessionConfig) -> Self {
        Self {
            atlas,
            atlas_token: &config.atlas_token,
            upconvert_rgb: config.upconvert_rgb,
        }
    }
}

/// Builds the CPU side of a texture. Nothing is uploaded here.
///
/// Volumes keep their declared format. 1-D and 2-D textures may reference
/// the atlas by token, and 3-channel data is widened to RGBA.
pub fn create_texture(desc: &TextureDesc, ctx: &TextureContext) -> Result<Texture, SyncError> {
    let size = TextureSize::from_slice(&desc.size)?;
    let mut data = match &desc.data {
        TextureData::Buffer(buffer) => buffer.clone(),
        TextureData::Token(token) if !size.is_volume() && token == ctx.atlas_token => {
            debug!("substituting the shared atlas for token '{}'", token);
            ctx.atlas
                .ok_or_else(|| SyncError::MissingAtlas(token.clone()))?
                .to_vec()
        }
        TextureData::Token(token) => {
            return Err(SyncError::MalformedTexture(format!(
                "unknown texture token '{}'",
                token
            )));
        }
    };

    let mut format = desc.three_format;
    let mut upconverted = false;
    if !size.is_volume() && format == PixelFormat::Rgb && ctx.upconvert_rgb {
        data = rgb_to_rgba(&data, desc.three_type.opaque());
        format = PixelFormat::Rgba;
        upconverted = true;
    }
    check_len(&data, size, format)?;

    Ok(Texture {
        data,
        size,
        format,
        data_type: desc.three_type,
        min_filter: desc.min_filter,
        mag_filter: desc.mag_filter,
        wrap_s: desc.wrap_s,
        wrap_t: if size.dimensions >= 2 { desc.wrap_t } else { None },
        wrap_r: if size.is_volume() { desc.wrap_r } else { None },
        anisotropy: desc.anisotropy,
        upconverted,
        needs_update: false,
        handle: None,
    })
}

/// Builds a replacement for `old` with new pixels and size.
///
/// Dimensionality, format, type, filters, wraps and anisotropy are taken
/// from `old`. Missing size components default to 1. The caller releases
/// the GPU side of `old`.
pub fn re_create_texture(old: &Texture, buffer: Vec<f32>, size: &[u32]) -> Result<Texture, SyncError> {
    if size.is_empty() {
        return Err(SyncError::MalformedTexture(
            "replacement texture without size".to_string(),
        ));
    }
    let dimension = |i: usize| {
        if i < old.size.dimensions as usize {
            size.get(i).copied().unwrap_or(1)
        } else {
            1
        }
    };
    let size = TextureSize {
        width: dimension(0),
        height: dimension(1),
        depth: dimension(2),
        dimensions: old.size.dimensions,
    };
    let data = widen(old, size, buffer);
    check_len(&data, size, old.format)?;

    Ok(Texture {
        data,
        size,
        needs_update: false,
        handle: None,
        ..old.clone_metadata()
    })
}

/// Applies the same RGB widening to later pixel data that the texture got
/// when it was created. Only data holding exactly three channels per texel
/// of `size` is widened; anything else is passed through for validation.
pub(crate) fn widen(texture: &Texture, size: TextureSize, pixels: Vec<f32>) -> Vec<f32> {
    if texture.upconverted && pixels.len() == size.texels() * 3 {
        rgb_to_rgba(&pixels, texture.data_type.opaque())
    } else {
        pixels
    }
}

fn check_len(data: &[f32], size: TextureSize, format: PixelFormat) -> Result<(), SyncError> {
    let expected = size.texels() * format.channels();
    if data.len() != expected {
        return Err(SyncError::MalformedTexture(format!(
            "{} values for a {}x{}x{} {:?} texture, expected {}",
            data.len(),
            size.width,
            size.height,
            size.depth,
            format,
            expected
        )));
    }
    Ok(())
}

impl Texture {
    /// Everything but the pixels, for building a replacement.
    fn clone_metadata(&self) -> Texture {
        Texture {
            data: Vec::new(),
            size: self.size,
            format: self.format,
            data_type: self.data_type,
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            wrap_s: self.wrap_s,
            wrap_t: self.wrap_t,
            wrap_r: self.wrap_r,
            anisotropy: self.anisotropy,
            upconverted: self.upconverted,
            needs_update: false,
            handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{Filter, PixelType, Wrapping};

    fn desc(data: TextureData, size: Vec<u32>, format: PixelFormat) -> TextureDesc {
        TextureDesc {
            tag: "Sampler".to_string(),
            data,
            size,
            three_format: format,
            three_type: PixelType::Float,
            min_filter: Filter::Linear,
            mag_filter: Filter::Nearest,
            wrap_s: Wrapping::Repeat,
            wrap_t: Some(Wrapping::ClampToEdge),
            wrap_r: Some(Wrapping::MirroredRepeat),
            anisotropy: 8.0,
        }
    }

    #[test]
    fn atlas_token_needs_an_atlas() {
        let config = SessionConfig::default();
        let token = TextureData::Token("texture_atlas".to_string());
        let without = TextureContext::new(None, &config);
        assert!(matches!(
            create_texture(&desc(token.clone(), vec![1, 1], PixelFormat::Red), &without),
            Err(SyncError::MissingAtlas(_))
        ));

        let atlas = [0.25f32];
        let with = TextureContext::new(Some(&atlas), &config);
        let texture = create_texture(&desc(token, vec![1, 1], PixelFormat::Red), &with).unwrap();
        assert_eq!(texture.data, vec![0.25]);
    }

    #[test]
    fn volumes_keep_rgb_and_all_wraps() {
        let config = SessionConfig::default();
        let ctx = TextureContext::new(None, &config);
        let data = TextureData::Buffer(vec![0.5; 2 * 2 * 2 * 3]);
        let texture = create_texture(&desc(data, vec![2, 2, 2], PixelFormat::Rgb), &ctx).unwrap();
        assert_eq!(texture.format, PixelFormat::Rgb);
        assert!(!texture.upconverted);
        assert_eq!(texture.wrap_r, Some(Wrapping::MirroredRepeat));
    }

    #[test]
    fn one_dimensional_textures_drop_extra_wraps() {
        let config = SessionConfig::default();
        let ctx = TextureContext::new(None, &config);
        let data = TextureData::Buffer(vec![0.0; 4]);
        let texture = create_texture(&desc(data, vec![4], PixelFormat::Red), &ctx).unwrap();
        assert_eq!(texture.wrap_t, None);
        assert_eq!(texture.wrap_r, None);
    }

    #[test]
    fn recreation_keeps_metadata_and_dimensionality() {
        let config = SessionConfig::default();
        let ctx = TextureContext::new(None, &config);
        let data = TextureData::Buffer(vec![0.0; 2 * 2 * 3]);
        let old = create_texture(&desc(data, vec![2, 2], PixelFormat::Rgb), &ctx).unwrap();

        let new = re_create_texture(&old, vec![1.0; 4 * 3], &[4]).unwrap();
        assert_eq!(new.size.dimensions, 2);
        assert_eq!((new.size.width, new.size.height), (4, 1));
        assert_eq!(new.data.len(), 16);
        assert_eq!(new.format, PixelFormat::Rgba);
        assert_eq!(new.anisotropy, 8.0);
        assert_eq!(new.mag_filter, Filter::Nearest);
        assert_eq!(new.wrap_t, Some(Wrapping::ClampToEdge));
    }

    #[test]
    fn rgba_updates_to_upconverted_textures_are_not_widened_again() {
        let config = SessionConfig::default();
        let ctx = TextureContext::new(None, &config);
        let data = TextureData::Buffer(vec![0.0; 3 * 3]);
        let old = create_texture(&desc(data, vec![3], PixelFormat::Rgb), &ctx).unwrap();
        assert!(old.upconverted);

        let rgba = vec![0.5; 3 * 4];
        assert_eq!(widen(&old, old.size, rgba.clone()), rgba);
        let new = re_create_texture(&old, rgba.clone(), &[3]).unwrap();
        assert_eq!(new.data, rgba);

        let rgb = widen(&old, old.size, vec![0.5; 3 * 3]);
        assert_eq!(rgb.len(), 12);
        assert_eq!(&rgb[..4], &[0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn rejects_wrong_pixel_counts() {
        let config = SessionConfig::default();
        let ctx = TextureContext::new(None, &config);
        let data = TextureData::Buffer(vec![0.0; 5]);
        assert!(matches!(
            create_texture(&desc(data, vec![2, 2], PixelFormat::Red), &ctx),
            Err(SyncError::MalformedTexture(_))
        ));
    }
}
