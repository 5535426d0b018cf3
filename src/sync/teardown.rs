//! Deleting plots and scenes.
//!
//! Every path releases the GPU resources it removes right away: geometry,
//! material and all textures of a plot. A resource is released by whoever
//! unregisters its owner, so nothing is released twice.

use log::debug;

use crate::{
    data_structures::{scene_graph::Plot, uniform::Uniform},
    resources::RenderBackend,
    session::Session,
};

fn release_plot<B: RenderBackend>(backend: &mut B, plot: &mut Plot) {
    if let Some(handle) = plot.geometry.handle.take() {
        backend.release_geometry(handle);
    }
    if let Some(handle) = plot.material.handle.take() {
        backend.release_material(handle);
    }
    for uniform in plot.material.uniforms.values() {
        if let Uniform::Texture(texture) = &mut *uniform.borrow_mut() {
            if let Some(handle) = texture.handle.take() {
                backend.release_texture(handle);
            }
        }
    }
}

impl<B: RenderBackend> Session<B> {
    /// Unregisters a plot, detaches it from its scene and releases its
    /// resources. Returns whether it was registered.
    pub fn delete_plot(&mut self, id: &str) -> bool {
        let Some(mut plot) = self.registry.unregister_plot(id) else {
            return false;
        };
        if let Some(scene) = plot
            .parent
            .as_deref()
            .and_then(|parent| self.registry.find_scene_mut(parent))
        {
            scene.plots.retain(|p| p != id);
        }
        release_plot(&mut self.backend, &mut plot);
        debug!("plot {} deleted", id);
        true
    }

    /// Deletes those of `ids` that are plots of `scene_id`.
    pub fn delete_plots<S: AsRef<str>>(&mut self, scene_id: &str, ids: &[S]) {
        for id in ids {
            let id = id.as_ref();
            let in_scene = self
                .registry
                .find_plot(id)
                .is_some_and(|plot| plot.parent.as_deref() == Some(scene_id));
            if in_scene {
                self.delete_plot(id);
            }
        }
    }

    /// Deletes the plots of a scene and unregisters it.
    ///
    /// Child scenes stay registered and become roots.
    pub fn delete_scene(&mut self, id: &str) -> bool {
        let plots = match self.registry.find_scene(id) {
            Some(scene) => scene.plots.clone(),
            None => return false,
        };
        for plot in &plots {
            self.delete_plot(plot);
        }
        let Some(scene) = self.registry.unregister_scene(id) else {
            return false;
        };
        for child in &scene.children {
            if let Some(child) = self.registry.find_scene_mut(child) {
                child.parent = None;
            }
        }
        if let Some(parent) = scene
            .parent
            .as_deref()
            .and_then(|parent| self.registry.find_scene_mut(parent))
        {
            parent.children.retain(|c| c != id);
        }
        debug!("scene {} deleted", id);
        true
    }

    /// Deletes a scene with all its descendant scenes and all their plots.
    pub fn delete_three_scene(&mut self, id: &str) -> bool {
        let children = match self.registry.find_scene(id) {
            Some(scene) => scene.children.clone(),
            None => return false,
        };
        for child in &children {
            self.delete_three_scene(child);
        }
        self.delete_scene(id)
    }

    /// Deletes the listed plots, then the listed scene trees. Ids that are
    /// not registered are skipped.
    pub fn delete_scenes<S: AsRef<str>, P: AsRef<str>>(&mut self, scene_ids: &[S], plot_ids: &[P]) {
        for id in plot_ids {
            self.delete_plot(id.as_ref());
        }
        for id in scene_ids {
            self.delete_three_scene(id.as_ref());
        }
    }
}
