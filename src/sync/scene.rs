//! Building scene trees from scene descriptions.

use log::{debug, warn};

use crate::{
    camera::{Camera, orbit::OrbitController},
    data_structures::scene_graph::{Scene, SceneId, Screen},
    description::SceneDesc,
    error::SyncError,
    resources::RenderBackend,
    session::Session,
};

impl<B: RenderBackend> Session<B> {
    /// Builds and registers the scene tree described by `desc`.
    ///
    /// Plots are added before child scenes are built; children keep the
    /// order of the description. Returns the id of the root of the new tree.
    /// If a plot fails to build, the scenes and plots built up to that
    /// point stay registered.
    pub fn deserialize_scene(&mut self, desc: &SceneDesc, screen: Screen) -> Result<SceneId, SyncError> {
        self.build_scene(desc, screen, None)
    }

    fn build_scene(
        &mut self,
        desc: &SceneDesc,
        screen: Screen,
        parent: Option<SceneId>,
    ) -> Result<SceneId, SyncError> {
        if self.registry.find_scene(&desc.uuid).is_some() {
            warn!("scene {} built twice, replacing it", desc.uuid);
            self.delete_three_scene(&desc.uuid);
        }

        // Interactive scenes drive their camera from input; all others follow
        // the camera updates of the producer.
        let controller = desc.cam3d_state.as_ref().map(OrbitController::new);
        let mut camera = Camera::new();
        match &controller {
            Some(controller) => camera.update_matrices(&controller.matrices(desc.camera.resolution)),
            None => camera.update_matrices(&desc.camera),
        }

        let scene = Scene {
            id: desc.uuid.clone(),
            pixelarea: desc.pixelarea,
            backgroundcolor: desc.backgroundcolor,
            clearscene: desc.clearscene,
            visible: desc.visible,
            screen,
            camera,
            controller,
            parent: parent.clone(),
            children: Vec::new(),
            plots: Vec::new(),
        };
        self.registry.register_scene(scene);
        if let Some(parent) = parent.as_deref().and_then(|id| self.registry.find_scene_mut(id)) {
            parent.children.push(desc.uuid.clone());
        }
        debug!("scene {} registered", desc.uuid);

        for plot in &desc.plots {
            self.add_plot(&desc.uuid, plot)?;
        }
        for child in &desc.children {
            self.build_scene(child, screen, Some(desc.uuid.clone()))?;
        }
        Ok(desc.uuid.clone())
    }
}
