#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use plot_sync::{
    HeadlessBackend, PlotDesc, RawValue, SceneDesc, Session, SessionConfig,
    data_structures::uniform::Uniform,
    logging::{LoggingConfig, init_logging},
};
use serde_json::{Value, json};

pub(crate) fn init() {
    init_logging(LoggingConfig {
        env_filter: None,
        is_test: true,
    });
}

pub(crate) fn session() -> Session<HeadlessBackend> {
    init();
    Session::new(HeadlessBackend::new(), SessionConfig::default())
}

pub(crate) const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

pub(crate) fn camera(resolution: [f32; 2]) -> Value {
    json!([IDENTITY_MATRIX, IDENTITY_MATRIX, resolution, [0.0, 0.0, 5.0]])
}

pub(crate) fn scene_desc(uuid: &str, plots: Vec<Value>, children: Vec<Value>) -> Value {
    json!({
        "uuid": uuid,
        "pixelarea": [0, 0, 800, 600],
        "backgroundcolor": [1.0, 1.0, 1.0, 1.0],
        "clearscene": true,
        "camera": camera([800.0, 600.0]),
        "plots": plots,
        "children": children,
    })
}

pub(crate) fn scene(value: Value) -> SceneDesc {
    serde_json::from_value(value).expect("scene description")
}

/// A triangle with `position` (3 floats) and `uv` (2 floats) per vertex.
pub(crate) fn plot_desc(uuid: &str, cam_space: &str) -> Value {
    json!({
        "uuid": uuid,
        "name": "mesh",
        "cam_space": cam_space,
        "uniforms": {
            "color": [1.0, 0.0, 0.0, 1.0],
            "markersize": 4.0,
        },
        "vertexarrays": {
            "position": {"flat": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], "type_length": 3},
            "uv": {"flat": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0], "type_length": 2},
        },
        "faces": [0, 1, 2],
    })
}

/// Two instances with `offset` (3 floats) and `rotation` (4 floats) each,
/// drawn over a single-vertex `position` buffer.
pub(crate) fn instanced_plot_desc(uuid: &str) -> Value {
    json!({
        "uuid": uuid,
        "name": "scatter",
        "cam_space": "data",
        "uniforms": {"color": [0.0, 0.0, 1.0, 1.0]},
        "vertexarrays": {
            "position": {"flat": [0.0, 0.0], "type_length": 2},
        },
        "instance_attributes": {
            "offset": {"flat": [0.0, 0.0, 0.0, 1.0, 1.0, 1.0], "type_length": 3},
            "rotation": {"flat": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], "type_length": 4},
        },
        "faces": [],
    })
}

pub(crate) fn plot(value: Value) -> PlotDesc {
    serde_json::from_value(value).expect("plot description")
}

/// `plot_desc` with one extra uniform.
pub(crate) fn plot_with_uniform(uuid: &str, name: &str, value: Value) -> PlotDesc {
    let mut desc = plot_desc(uuid, "data");
    desc["uniforms"][name] = value;
    plot(desc)
}

pub(crate) fn sampler(format: &str, size: Value, data: Value) -> Value {
    json!({
        "type": "Sampler",
        "data": data,
        "size": size,
        "three_format": format,
        "three_type": "FloatType",
        "minFilter": "LinearFilter",
        "magFilter": "NearestFilter",
        "wrapS": "ClampToEdgeWrapping",
        "wrapT": "RepeatWrapping",
        "anisotropy": 4.0,
    })
}

pub(crate) fn raw(value: Value) -> RawValue {
    RawValue::from(value)
}

/// Components of a numeric uniform of a registered plot.
pub(crate) fn components(session: &Session<HeadlessBackend>, plot: &str, name: &str) -> Vec<f32> {
    let plot = session.find_plot(plot).expect("plot registered");
    let slot = plot.material.uniform(name).expect("uniform present");
    let uniform = slot.borrow();
    uniform.components().map(<[f32]>::to_vec).unwrap_or_default()
}

pub(crate) fn uniform(session: &Session<HeadlessBackend>, plot: &str, name: &str) -> Uniform {
    let plot = session.find_plot(plot).expect("plot registered");
    plot.material.uniform(name).expect("uniform present").borrow().clone()
}

/// Counts how often callbacks handed out by `callback` have run.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Rc<Cell<u32>>,
}

impl Recorder {
    pub(crate) fn callback(&self) -> impl FnOnce() + 'static {
        let calls = self.calls.clone();
        move || calls.set(calls.get() + 1)
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.get()
    }
}
