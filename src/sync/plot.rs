//! Building render primitives from plot descriptions.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::{
    camera::Camera,
    config::SessionConfig,
    data_structures::{
        geometry::{AttributeRate, BufferAttribute, Geometry},
        material::{Material, Side},
        scene_graph::Plot,
        uniform::{Uniform, UniformSlot, slot},
    },
    description::{CamSpace, PlotDesc},
    error::SyncError,
    resources::RenderBackend,
    session::Session,
    sync::{
        attributes::AttributeBuffers,
        textures::TextureContext,
        uniforms::{UniformInput, deserialize_uniforms},
    },
};

/// Uniform name whose presence marks a volume plot.
const VOLUME_UNIFORM: &str = "volumedata";

/// The camera slots a plot in `cam_space` shares with its scene.
///
/// In pixel and relative space `projection` and `projectionview` are the
/// same slot. `preprojection` is only injected when the plot declares it.
pub fn camera_uniforms(camera: &mut Camera, desc: &PlotDesc) -> BTreeMap<String, UniformSlot> {
    let mut uniforms = BTreeMap::new();
    match desc.cam_space {
        CamSpace::Data => {
            uniforms.insert("view".to_string(), camera.view.clone());
            uniforms.insert("projection".to_string(), camera.projection.clone());
            uniforms.insert("projectionview".to_string(), camera.projectionview.clone());
            uniforms.insert("eyeposition".to_string(), camera.eyeposition.clone());
        }
        CamSpace::Pixel | CamSpace::Relative => {
            let space = if desc.cam_space == CamSpace::Pixel {
                &camera.pixel_space
            } else {
                &camera.relative_space
            };
            uniforms.insert("view".to_string(), slot(Uniform::identity()));
            uniforms.insert("projection".to_string(), space.clone());
            uniforms.insert("projectionview".to_string(), space.clone());
        }
        CamSpace::Clip => {
            uniforms.insert("view".to_string(), slot(Uniform::identity()));
            uniforms.insert("projection".to_string(), slot(Uniform::identity()));
            uniforms.insert("projectionview".to_string(), slot(Uniform::identity()));
        }
    }
    uniforms.insert("resolution".to_string(), camera.resolution.clone());
    if desc.uniforms.contains_key("preprojection") {
        let preprojection = camera.preprojection_matrix(desc.space, desc.markerspace);
        uniforms.insert("preprojection".to_string(), preprojection);
    }
    uniforms
}

fn geometry(desc: &PlotDesc, bounding_radius: f32) -> Geometry {
    let mut geometry = Geometry::new(desc.faces.clone(), bounding_radius);
    for (name, buffer) in &desc.vertexarrays {
        geometry.set_attribute(name.clone(), BufferAttribute::from_desc(buffer, AttributeRate::Vertex));
    }
    if let Some(instance_attributes) = &desc.instance_attributes {
        for (name, buffer) in instance_attributes {
            if desc.vertexarrays.contains_key(name) {
                warn!(
                    "plot {}: '{}' is both a vertex and an instance attribute, using the instance one",
                    desc.uuid, name
                );
            }
            geometry.set_attribute(
                name.clone(),
                BufferAttribute::from_desc(buffer, AttributeRate::Instance),
            );
        }
        let instance_count = geometry
            .names(AttributeRate::Instance)
            .next()
            .and_then(|first| geometry.attribute(first))
            .map(BufferAttribute::count);
        geometry.instance_count = instance_count;
    }
    geometry
}

/// Builds a plot and allocates its GPU resources.
///
/// Every uniform is typed before anything is uploaded, so a description
/// that fails to convert leaves no resources behind.
pub fn deserialize_plot<B: RenderBackend>(
    desc: &PlotDesc,
    camera: &mut Camera,
    ctx: &TextureContext,
    backend: &mut B,
    config: &SessionConfig,
) -> Result<Plot, SyncError> {
    let mut inputs: BTreeMap<String, UniformInput> = desc
        .uniforms
        .iter()
        .map(|(name, raw)| (name.clone(), UniformInput::Raw(raw.clone())))
        .collect();
    for (name, shared) in camera_uniforms(camera, desc) {
        inputs.insert(name, UniformInput::Shared(shared));
    }
    let uniforms = deserialize_uniforms(inputs, ctx)?;

    for (name, uniform) in &uniforms {
        if let Uniform::Texture(texture) = &mut *uniform.borrow_mut() {
            texture.handle = Some(backend.create_texture(&format!("{} {}", desc.uuid, name), texture));
        }
    }

    let mut material = Material {
        side: if uniforms.contains_key(VOLUME_UNIFORM) {
            Side::Back
        } else {
            Side::Double
        },
        uniforms,
        vertex_source: desc.vertex_source.clone(),
        fragment_source: desc.fragment_source.clone(),
        transparent: true,
        depth_test: !desc.overdraw,
        depth_write: !desc.transparency,
        handle: None,
    };
    material.handle = Some(backend.create_material(&desc.uuid, &material.uniform_block()));

    let mut geometry = geometry(desc, config.bounding_radius);
    geometry.handle = Some(backend.create_geometry(&desc.uuid, &geometry));
    let attributes = AttributeBuffers::from_geometry(&geometry);

    Ok(Plot {
        id: desc.uuid.clone(),
        name: desc.name.clone(),
        cam_space: desc.cam_space,
        visible: desc.visible,
        frustum_culled: false,
        geometry,
        material,
        parent: None,
        attributes,
    })
}

impl<B: RenderBackend> Session<B> {
    /// Builds `desc` into the scene `scene_id`, registers it and runs the
    /// pending next-insert callbacks.
    ///
    /// A plot already registered under the same id is deleted first.
    pub fn add_plot(&mut self, scene_id: &str, desc: &PlotDesc) -> Result<(), SyncError> {
        if self.registry.find_scene(scene_id).is_none() {
            return Err(SyncError::UnknownScene(scene_id.to_string()));
        }
        if self.registry.find_plot(&desc.uuid).is_some() {
            warn!("plot {} inserted twice, replacing it", desc.uuid);
            self.delete_plot(&desc.uuid);
        }

        let Some(scene) = self.registry.find_scene_mut(scene_id) else {
            return Err(SyncError::UnknownScene(scene_id.to_string()));
        };
        let ctx = TextureContext::new(self.atlas.as_deref(), &self.config);
        let mut plot = deserialize_plot(desc, &mut scene.camera, &ctx, &mut self.backend, &self.config)?;
        plot.parent = Some(scene.id.clone());
        scene.plots.push(plot.id.clone());
        debug!("plot {} ({}) added to scene {}", plot.id, plot.name, scene_id);
        self.registry.register_plot(plot);

        self.run_next_insert_callbacks();
        Ok(())
    }
}
