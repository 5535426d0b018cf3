//! The owner of a synchronized scene: registry, backend and shared state.
//!
//! A [`Session`] is built from one or more scene descriptions and then kept
//! up to date by feeding it [`Update`]s, either directly through
//! [`Session::apply`] or via the channel in [`crate::flow`]. Uploads to the
//! backend are batched: updates only mark CPU state dirty and
//! [`Session::flush`] pushes it out.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::{
    camera::orbit::CameraInput,
    config::SessionConfig,
    data_structures::{
        scene_graph::{Plot, Scene},
        uniform::Uniform,
    },
    description::PlotDesc,
    error::SyncError,
    flow::Update,
    registry::Registry,
    resources::RenderBackend,
    sync::{textures::TextureContext, uniforms::update_uniform},
};

pub struct Session<B: RenderBackend> {
    pub(crate) registry: Registry,
    pub(crate) backend: B,
    pub(crate) config: SessionConfig,
    pub(crate) atlas: Option<Vec<f32>>,
    pub(crate) next_insert: VecDeque<Box<dyn FnOnce()>>,
}

impl<B: RenderBackend> Session<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            registry: Registry::new(),
            backend,
            config,
            atlas: None,
            next_insert: VecDeque::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sets the buffer that texture descriptors reference by the atlas token.
    ///
    /// Textures already built keep the pixels they were created with.
    pub fn set_texture_atlas(&mut self, atlas: Vec<f32>) {
        self.atlas = Some(atlas);
    }

    pub fn find_scene(&self, id: &str) -> Option<&Scene> {
        self.registry.find_scene(id)
    }

    pub fn find_plot(&self, id: &str) -> Option<&Plot> {
        self.registry.find_plot(id)
    }

    /// The registered plots among `ids`; unknown ids are skipped.
    pub fn find_plots<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Plot> {
        self.registry.find_plots(ids)
    }

    /// Queues a callback to run once, right after the next plot insertion.
    pub fn on_next_insert<F: FnOnce() + 'static>(&mut self, callback: F) {
        self.next_insert.push_back(Box::new(callback));
    }

    pub(crate) fn run_next_insert_callbacks(&mut self) {
        for callback in std::mem::take(&mut self.next_insert) {
            callback();
        }
    }

    /// Adds plots to an existing scene.
    ///
    /// A scene that is no longer registered makes this a no-op, since an
    /// insert may race the deletion of its target.
    pub fn insert_plot(&mut self, scene_id: &str, plots: &[PlotDesc]) -> Result<usize, SyncError> {
        if self.registry.find_scene(scene_id).is_none() {
            debug!("insert into scene {} which is not registered", scene_id);
            return Ok(0);
        }
        for plot in plots {
            self.add_plot(scene_id, plot)?;
        }
        Ok(plots.len())
    }

    /// Applies one update. Updates addressing unregistered plots or scenes
    /// are dropped.
    pub fn apply(&mut self, update: Update) -> Result<(), SyncError> {
        match update {
            Update::Uniform { plot, name, value } => {
                if name == self.config.ignored_update_name {
                    return Ok(());
                }
                let Some(target) = self.registry.find_plot_mut(&plot) else {
                    debug!("uniform '{}' for plot {} which is not registered", name, plot);
                    return Ok(());
                };
                let slot = target
                    .material
                    .uniform(&name)
                    .ok_or_else(|| SyncError::UnknownUniform {
                        plot: plot.clone(),
                        name: name.clone(),
                    })?;
                let ctx = TextureContext::new(self.atlas.as_deref(), &self.config);
                update_uniform(slot, &plot, &name, value, &ctx, &mut self.backend)
            }
            Update::Attribute {
                plot,
                name,
                values,
                length,
            } => {
                let Some(target) = self.registry.find_plot_mut(&plot) else {
                    debug!("attribute '{}' for plot {} which is not registered", name, plot);
                    return Ok(());
                };
                let outcome = target.attributes.apply(
                    &target.id,
                    &mut target.geometry,
                    &mut self.backend,
                    &name,
                    values,
                    length,
                )?;
                debug!("plot {} attribute '{}': {:?}", plot, name, outcome);
                Ok(())
            }
            Update::Visible { plot, visible } => {
                if let Some(target) = self.registry.find_plot_mut(&plot) {
                    target.visible = visible;
                }
                Ok(())
            }
            Update::Faces { plot, faces } => {
                if let Some(target) = self.registry.find_plot_mut(&plot) {
                    target.geometry.set_index(faces);
                }
                Ok(())
            }
            Update::Camera { scene, matrices } => {
                let Some(target) = self.registry.find_scene_mut(&scene) else {
                    return Ok(());
                };
                if target.is_interactive() {
                    debug!("scene {} drives its own camera, ignoring camera update", scene);
                    return Ok(());
                }
                target.camera.update_matrices(&matrices);
                Ok(())
            }
            Update::CameraInput { scene, input } => {
                self.interact(&scene, input);
                Ok(())
            }
        }
    }

    /// Feeds input to the orbit controller of an interactive scene and
    /// updates its camera. Returns whether the scene took the input.
    pub fn interact(&mut self, scene_id: &str, input: CameraInput) -> bool {
        let Some(scene) = self.registry.find_scene_mut(scene_id) else {
            return false;
        };
        let resolution = scene.camera.resolution_px();
        let Some(controller) = scene.controller.as_mut() else {
            warn!("camera input for scene {} which has no interactive camera", scene_id);
            return false;
        };
        controller.handle(input);
        let matrices = controller.matrices(resolution);
        scene.camera.update_matrices(&matrices);
        true
    }

    /// Uploads all dirty attributes, index buffers and textures and rewrites
    /// every material block. Returns the number of uploads.
    pub fn flush(&mut self) -> usize {
        let mut uploads = 0;
        for plot in self.registry.plots_mut() {
            if let Some(handle) = plot.geometry.handle {
                for (name, attribute) in &mut plot.geometry.attributes {
                    if attribute.needs_update {
                        self.backend.write_attribute(handle, name, attribute);
                        attribute.needs_update = false;
                        uploads += 1;
                    }
                }
                if plot.geometry.index_needs_update {
                    self.backend.write_index(handle, &plot.geometry.index);
                    plot.geometry.index_needs_update = false;
                    uploads += 1;
                }
            }
            for slot in plot.material.uniforms.values() {
                if let Uniform::Texture(texture) = &mut *slot.borrow_mut() {
                    if let (true, Some(handle)) = (texture.needs_update, texture.handle) {
                        self.backend.write_texture(handle, texture);
                        texture.needs_update = false;
                        uploads += 1;
                    }
                }
            }
            if let Some(handle) = plot.material.handle {
                self.backend.write_material(handle, &plot.material.uniform_block());
                uploads += 1;
            }
        }
        uploads
    }
}
