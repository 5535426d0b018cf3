//! Scene graph nodes.
//!
//! Scenes form a tree, but the tree is not stored as nested boxes: every node
//! lives in the [`Registry`](crate::registry::Registry) and refers to its
//! children, parent and plots by id. The registry is the only owner.

use crate::{
    camera::{Camera, orbit::OrbitController},
    data_structures::{geometry::Geometry, material::Material},
    description::CamSpace,
    sync::attributes::AttributeBuffers,
};

pub type SceneId = String;
pub type PlotId = String;

/// Size of the canvas a scene tree is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct Scene {
    pub id: SceneId,
    pub pixelarea: [i32; 4],
    pub backgroundcolor: [f32; 4],
    pub clearscene: bool,
    pub visible: bool,
    pub screen: Screen,
    pub camera: Camera,
    pub(crate) controller: Option<OrbitController>,
    pub(crate) parent: Option<SceneId>,
    pub(crate) children: Vec<SceneId>,
    pub(crate) plots: Vec<PlotId>,
}

impl Scene {
    pub fn parent(&self) -> Option<&SceneId> {
        self.parent.as_ref()
    }

    /// Child scenes in the order they were described.
    pub fn children(&self) -> &[SceneId] {
        &self.children
    }

    /// Plots attached directly to this scene, in insertion order.
    pub fn plots(&self) -> &[PlotId] {
        &self.plots
    }

    /// Whether the camera is driven by local input instead of the camera stream.
    pub fn is_interactive(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&OrbitController> {
        self.controller.as_ref()
    }
}

/// A render primitive: geometry plus material, bound to one scene.
#[derive(Debug)]
pub struct Plot {
    pub id: PlotId,
    pub name: String,
    pub cam_space: CamSpace,
    pub visible: bool,
    /// Always `false`; plots are drawn regardless of the view frustum.
    pub frustum_culled: bool,
    pub geometry: Geometry,
    pub material: Material,
    pub(crate) parent: Option<SceneId>,
    pub(crate) attributes: AttributeBuffers,
}

impl Plot {
    pub fn parent(&self) -> Option<&SceneId> {
        self.parent.as_ref()
    }

    pub fn instance_count(&self) -> Option<usize> {
        self.geometry.instance_count
    }

    /// Bookkeeping of the attribute growth protocol for this plot.
    pub fn attributes(&self) -> &AttributeBuffers {
        &self.attributes
    }
}
