//! Declarative scene and plot descriptions as emitted by the producer.
//!
//! These are plain serde types. They are consumed once at build time; every
//! later change arrives as an [`Update`](crate::flow::Update).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coordinate space a plot (or a preprojection endpoint) lives in.
///
/// Anything the producer sends that is not `data`, `pixel` or `relative` is
/// treated as clip space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum CamSpace {
    Data,
    Pixel,
    Relative,
    #[default]
    Clip,
}

impl From<&str> for CamSpace {
    fn from(space: &str) -> Self {
        match space {
            "data" => CamSpace::Data,
            "pixel" => CamSpace::Pixel,
            "relative" => CamSpace::Relative,
            _ => CamSpace::Clip,
        }
    }
}

impl From<String> for CamSpace {
    fn from(space: String) -> Self {
        CamSpace::from(space.as_str())
    }
}

impl From<CamSpace> for String {
    fn from(space: CamSpace) -> Self {
        match space {
            CamSpace::Data => "data",
            CamSpace::Pixel => "pixel",
            CamSpace::Relative => "relative",
            CamSpace::Clip => "clip",
        }
        .to_string()
    }
}

/// The four camera arrays the producer sends: column-major view and
/// projection, resolution in pixels and eye position.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "CameraTuple", into = "CameraTuple")]
pub struct CameraMatrices {
    pub view: [f32; 16],
    pub projection: [f32; 16],
    pub resolution: [f32; 2],
    pub eyeposition: [f32; 3],
}

pub(crate) const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

type CameraTuple = ([f32; 16], [f32; 16], [f32; 2], [f32; 3]);

impl From<CameraTuple> for CameraMatrices {
    fn from((view, projection, resolution, eyeposition): CameraTuple) -> Self {
        Self {
            view,
            projection,
            resolution,
            eyeposition,
        }
    }
}

impl From<CameraMatrices> for CameraTuple {
    fn from(m: CameraMatrices) -> Self {
        (m.view, m.projection, m.resolution, m.eyeposition)
    }
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self {
            view: IDENTITY,
            projection: IDENTITY,
            resolution: [1.0, 1.0],
            eyeposition: [0.0, 0.0, 0.0],
        }
    }
}

/// Initial state of an interactively controlled 3-D camera.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Cam3dState {
    pub eyeposition: [f32; 3],
    pub lookat: [f32; 3],
    pub upvector: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

fn default_fov() -> f32 {
    45.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    10_000.0
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SceneDesc {
    pub uuid: String,
    /// `[x, y, width, height]` in device pixels.
    #[serde(default)]
    pub pixelarea: [i32; 4],
    #[serde(default)]
    pub backgroundcolor: [f32; 4],
    #[serde(default)]
    pub clearscene: bool,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default)]
    pub camera: CameraMatrices,
    #[serde(default)]
    pub cam3d_state: Option<Cam3dState>,
    #[serde(default)]
    pub plots: Vec<PlotDesc>,
    #[serde(default)]
    pub children: Vec<SceneDesc>,
}

/// A flat attribute array and the number of floats per element.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BufferDesc {
    pub flat: Vec<f32>,
    pub type_length: usize,
}

impl BufferDesc {
    pub fn new(flat: Vec<f32>, type_length: usize) -> Self {
        Self { flat, type_length }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlotDesc {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default)]
    pub cam_space: CamSpace,
    #[serde(default)]
    pub space: CamSpace,
    #[serde(default)]
    pub markerspace: CamSpace,
    #[serde(default)]
    pub uniforms: BTreeMap<String, RawValue>,
    #[serde(default)]
    pub vertexarrays: BTreeMap<String, BufferDesc>,
    #[serde(default)]
    pub instance_attributes: Option<BTreeMap<String, BufferDesc>>,
    #[serde(default)]
    pub faces: Vec<u32>,
    #[serde(default)]
    pub vertex_source: String,
    #[serde(default)]
    pub fragment_source: String,
    /// Draw on top of everything: disables the depth test.
    #[serde(default)]
    pub overdraw: bool,
    /// Disables depth writes.
    #[serde(default)]
    pub transparency: bool,
}

/// A uniform value as it arrives from the producer, before it is typed.
///
/// Conversion from JSON sorts values by shape: objects with a `type` tag,
/// `[size, data]` image payloads, all-numeric arrays and everything else.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawValue {
    Numbers(Vec<f32>),
    /// Replacement pixels for a texture uniform.
    Image { size: Vec<u32>, data: Vec<f32> },
    Typed { tag: String, body: Value },
    Plain(Value),
}

impl RawValue {
    /// Wraps a texture descriptor the way the producer tags it.
    pub fn sampler(desc: &TextureDesc) -> Self {
        let body = serde_json::to_value(desc).unwrap_or(Value::Null);
        RawValue::from(body)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RawValue::Numbers(_) => "a numeric array",
            RawValue::Image { .. } => "image data",
            RawValue::Typed { .. } => "a typed object",
            RawValue::Plain(_) => "a plain value",
        }
    }
}

fn numbers(values: &[Value]) -> Option<Vec<f32>> {
    values
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(ref map) => match map.get("type").and_then(Value::as_str) {
                Some(tag) => RawValue::Typed {
                    tag: tag.to_string(),
                    body: value.clone(),
                },
                None => RawValue::Plain(value),
            },
            Value::Array(ref values) => {
                if let Some(numbers) = numbers(values) {
                    return RawValue::Numbers(numbers);
                }
                if let [Value::Array(size), Value::Array(data)] = values.as_slice() {
                    let size = size
                        .iter()
                        .map(|v| v.as_u64().map(|s| s as u32))
                        .collect::<Option<Vec<_>>>();
                    if let (Some(size), Some(data)) = (size, numbers(data)) {
                        return RawValue::Image { size, data };
                    }
                }
                RawValue::Plain(value)
            }
            other => RawValue::Plain(other),
        }
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Numbers(numbers) => Value::from(numbers),
            RawValue::Image { size, data } => Value::Array(vec![Value::from(size), Value::from(data)]),
            RawValue::Typed { body, .. } => body,
            RawValue::Plain(value) => value,
        }
    }
}

impl From<Vec<f32>> for RawValue {
    fn from(numbers: Vec<f32>) -> Self {
        RawValue::Numbers(numbers)
    }
}

/// Pixel layout names as sent by the producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PixelFormat {
    #[serde(rename = "RedFormat")]
    Red,
    #[serde(rename = "RGFormat")]
    Rg,
    #[serde(rename = "RGBFormat")]
    Rgb,
    #[serde(rename = "RGBAFormat")]
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PixelType {
    #[serde(rename = "FloatType")]
    Float,
    #[serde(rename = "HalfFloatType")]
    HalfFloat,
    #[serde(rename = "UnsignedByteType")]
    UnsignedByte,
}

impl PixelType {
    /// The channel value that means "fully opaque" for this storage type.
    pub fn opaque(self) -> f32 {
        match self {
            PixelType::UnsignedByte => 255.0,
            PixelType::Float | PixelType::HalfFloat => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Filter {
    #[serde(rename = "NearestFilter")]
    Nearest,
    #[serde(rename = "LinearFilter")]
    Linear,
    #[serde(rename = "NearestMipmapNearestFilter")]
    NearestMipmapNearest,
    #[serde(rename = "LinearMipmapLinearFilter")]
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Wrapping {
    #[serde(rename = "ClampToEdgeWrapping")]
    ClampToEdge,
    #[serde(rename = "RepeatWrapping")]
    Repeat,
    #[serde(rename = "MirroredRepeatWrapping")]
    MirroredRepeat,
}

/// Texture payload: either literal pixels or a token naming a shared buffer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TextureData {
    Token(String),
    Buffer(Vec<f32>),
}

/// The `{ type: "Sampler", ... }` uniform payload.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TextureDesc {
    #[serde(rename = "type", default = "sampler_tag")]
    pub tag: String,
    pub data: TextureData,
    pub size: Vec<u32>,
    pub three_format: PixelFormat,
    pub three_type: PixelType,
    #[serde(rename = "minFilter")]
    pub min_filter: Filter,
    #[serde(rename = "magFilter")]
    pub mag_filter: Filter,
    #[serde(rename = "wrapS")]
    pub wrap_s: Wrapping,
    #[serde(rename = "wrapT", default, skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<Wrapping>,
    #[serde(rename = "wrapR", default, skip_serializing_if = "Option::is_none")]
    pub wrap_r: Option<Wrapping>,
    #[serde(default = "default_anisotropy")]
    pub anisotropy: f32,
}

fn sampler_tag() -> String {
    "Sampler".to_string()
}

fn default_anisotropy() -> f32 {
    1.0
}
