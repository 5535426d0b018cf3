//! The uniform channel: typing raw values and applying updates to them.

use std::collections::BTreeMap;

use serde::Deserialize as _;
use serde_json::Value;

use crate::{
    data_structures::uniform::{Uniform, UniformKind, UniformSlot, slot},
    description::{RawValue, TextureDesc},
    error::SyncError,
    resources::RenderBackend,
    sync::textures::{TextureContext, create_texture, re_create_texture, widen},
};

/// An entry of a plot's uniform set before typing.
#[derive(Clone, Debug)]
pub enum UniformInput {
    /// Already typed and possibly shared with other plots; kept as is.
    Shared(UniformSlot),
    Raw(RawValue),
}

impl From<RawValue> for UniformInput {
    fn from(raw: RawValue) -> Self {
        UniformInput::Raw(raw)
    }
}

impl From<UniformSlot> for UniformInput {
    fn from(slot: UniformSlot) -> Self {
        UniformInput::Shared(slot)
    }
}

fn sampler_desc(tag: &str, body: &Value) -> Result<TextureDesc, SyncError> {
    if tag != "Sampler" {
        return Err(SyncError::UnknownUniformType(tag.to_string()));
    }
    TextureDesc::deserialize(body).map_err(|e| SyncError::MalformedTexture(e.to_string()))
}

/// Types a raw value.
///
/// Samplers become textures, numeric arrays of length 2, 3, 4 and 16 become
/// vectors and matrices, anything else is kept as a plain value.
pub fn to_uniform(raw: &RawValue, ctx: &TextureContext) -> Result<Uniform, SyncError> {
    match raw {
        RawValue::Typed { tag, body } => {
            let desc = sampler_desc(tag, body)?;
            Ok(Uniform::Texture(create_texture(&desc, ctx)?))
        }
        RawValue::Numbers(numbers) => Ok(Uniform::from_numbers(numbers)
            .unwrap_or_else(|| Uniform::Plain(Value::from(numbers.clone())))),
        RawValue::Image { .. } => Ok(Uniform::Plain(Value::from(raw.clone()))),
        RawValue::Plain(value) => Ok(Uniform::Plain(value.clone())),
    }
}

/// Types a whole uniform set. Shared entries pass through untouched so they
/// stay aliased.
///
/// No GPU resource is created here, so a failing entry leaves nothing to
/// clean up.
pub fn deserialize_uniforms(
    inputs: BTreeMap<String, UniformInput>,
    ctx: &TextureContext,
) -> Result<BTreeMap<String, UniformSlot>, SyncError> {
    inputs
        .into_iter()
        .map(|(name, input)| {
            let uniform = match input {
                UniformInput::Shared(shared) => shared,
                UniformInput::Raw(raw) => slot(to_uniform(&raw, ctx)?),
            };
            Ok((name, uniform))
        })
        .collect()
}

/// Applies one `(name, value)` notification to an existing uniform slot.
///
/// The kind of the slot decides what is accepted: textures take pixels (in
/// place when the length matches, otherwise through a replacement texture) or
/// a new sampler, vectors and matrices take a numeric array of their exact
/// length, plain values take anything but a tagged object.
pub fn update_uniform<B: RenderBackend>(
    uniform: &UniformSlot,
    plot: &str,
    name: &str,
    raw: RawValue,
    ctx: &TextureContext,
    backend: &mut B,
) -> Result<(), SyncError> {
    let mut uniform = uniform.borrow_mut();
    let mismatch = |expected: UniformKind, raw: &RawValue| SyncError::UniformKindMismatch {
        name: name.to_string(),
        expected,
        found: raw.describe(),
    };

    match &mut *uniform {
        Uniform::Texture(texture) => {
            let label = format!("{} {}", plot, name);
            let (size, pixels) = match raw {
                RawValue::Image { size, data } => (Some(size), data),
                RawValue::Numbers(data) => (None, data),
                RawValue::Typed { ref tag, ref body } => {
                    let desc = sampler_desc(tag, body)?;
                    let mut replacement = create_texture(&desc, ctx)?;
                    replacement.handle = Some(backend.create_texture(&label, &replacement));
                    if let Some(old) = texture.handle.take() {
                        backend.release_texture(old);
                    }
                    *texture = replacement;
                    return Ok(());
                }
                other => return Err(mismatch(UniformKind::Texture, &other)),
            };

            let same_size = size.as_ref().is_none_or(|size| {
                size.first() == Some(&texture.size.width)
                    && size.get(1).is_none_or(|h| *h == texture.size.height)
            });
            let widened = widen(texture, texture.size, pixels.clone());
            if same_size && widened.len() == texture.data.len() {
                texture.data.copy_from_slice(&widened);
                texture.needs_update = true;
                return Ok(());
            }

            let size = size.ok_or_else(|| {
                SyncError::MalformedTexture(format!(
                    "texture '{}' received {} values without a new size",
                    name,
                    pixels.len()
                ))
            })?;
            let mut replacement = re_create_texture(texture, pixels, &size)?;
            replacement.handle = Some(backend.create_texture(&label, &replacement));
            if let Some(old) = texture.handle.take() {
                backend.release_texture(old);
            }
            *texture = replacement;
            Ok(())
        }
        Uniform::Plain(value) => match raw {
            RawValue::Typed { .. } => Err(mismatch(UniformKind::Plain, &raw)),
            other => {
                *value = Value::from(other);
                Ok(())
            }
        },
        numeric => {
            let kind = numeric.kind();
            let components = numeric.components_mut();
            match (components, &raw) {
                (Some(components), RawValue::Numbers(numbers))
                    if components.len() == numbers.len() =>
                {
                    components.copy_from_slice(numbers);
                    Ok(())
                }
                _ => Err(mismatch(kind, &raw)),
            }
        }
    }
}
