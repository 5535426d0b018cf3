//! Id-indexed storage of every live scene and plot.
//!
//! The registry is the sole owner of scene nodes and plots. Lookups of ids
//! that are not (or no longer) registered return `None` or are skipped; an
//! update racing a deletion is a no-op, not an error.

use std::collections::HashMap;

use crate::data_structures::scene_graph::{Plot, PlotId, Scene, SceneId};

#[derive(Debug, Default)]
pub struct Registry {
    scenes: HashMap<SceneId, Scene>,
    plots: HashMap<PlotId, Plot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `scene` under its id, returning a scene it displaced.
    pub fn register_scene(&mut self, scene: Scene) -> Option<Scene> {
        self.scenes.insert(scene.id.clone(), scene)
    }

    pub fn find_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn find_scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn unregister_scene(&mut self, id: &str) -> Option<Scene> {
        self.scenes.remove(id)
    }

    /// Registers `plot` under its id, returning a plot it displaced.
    pub fn register_plot(&mut self, plot: Plot) -> Option<Plot> {
        self.plots.insert(plot.id.clone(), plot)
    }

    pub fn find_plot(&self, id: &str) -> Option<&Plot> {
        self.plots.get(id)
    }

    pub fn find_plot_mut(&mut self, id: &str) -> Option<&mut Plot> {
        self.plots.get_mut(id)
    }

    /// The registered plots among `ids`, in the order asked for.
    pub fn find_plots<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Plot> {
        ids.iter()
            .filter_map(|id| self.plots.get(id.as_ref()))
            .collect()
    }

    pub fn unregister_plot(&mut self, id: &str) -> Option<Plot> {
        self.plots.remove(id)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    pub(crate) fn plots_mut(&mut self) -> impl Iterator<Item = &mut Plot> {
        self.plots.values_mut()
    }

    /// Ids of scenes without a parent, sorted.
    pub fn root_scenes(&self) -> Vec<SceneId> {
        let mut roots: Vec<SceneId> = self
            .scenes
            .values()
            .filter(|scene| scene.parent.is_none())
            .map(|scene| scene.id.clone())
            .collect();
        roots.sort();
        roots
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty() && self.plots.is_empty()
    }
}
