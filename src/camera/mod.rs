//! Per-scene camera state shared into plot materials.
//!
//! Every matrix lives in a [`UniformSlot`]. Plots in data space hold clones of
//! the very same slots, so writing a new view matrix here is all it takes to
//! move every plot of the scene. Writes therefore always go *into* the
//! existing slot and never replace it.

pub mod orbit;

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3};
use log::warn;

use crate::{
    data_structures::uniform::{Uniform, UniformSlot, slot},
    description::{CamSpace, CameraMatrices},
};

/// Depth range of the pixel-space projection.
const PIXEL_SPACE_DEPTH: f32 = 10_000.0;

#[derive(Debug)]
pub struct Camera {
    pub view: UniformSlot,
    pub projection: UniformSlot,
    pub projectionview: UniformSlot,
    pub pixel_space: UniformSlot,
    pub relative_space: UniformSlot,
    pub resolution: UniformSlot,
    pub eyeposition: UniformSlot,
    preprojections: HashMap<(CamSpace, CamSpace), UniformSlot>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            view: slot(Uniform::identity()),
            projection: slot(Uniform::identity()),
            projectionview: slot(Uniform::identity()),
            pixel_space: slot(Uniform::identity()),
            relative_space: slot(Uniform::Matrix4(relative_space())),
            resolution: slot(Uniform::Vector2(Vector2::new(1.0, 1.0))),
            eyeposition: slot(Uniform::Vector3(Vector3::new(0.0, 0.0, 0.0))),
            preprojections: HashMap::new(),
        };
        camera.calculate_matrices();
        camera
    }

    pub fn update_matrices(&mut self, matrices: &CameraMatrices) {
        write_components(&self.view, &matrices.view);
        write_components(&self.projection, &matrices.projection);
        write_components(&self.resolution, &matrices.resolution);
        write_components(&self.eyeposition, &matrices.eyeposition);
        self.calculate_matrices();
    }

    /// Recomputes everything derived from view, projection and resolution,
    /// including all cached preprojection matrices.
    fn calculate_matrices(&mut self) {
        let [width, height] = self.resolution_px();
        let pixel_space = cgmath::ortho(
            0.0,
            width,
            0.0,
            height,
            -PIXEL_SPACE_DEPTH,
            PIXEL_SPACE_DEPTH,
        );
        write_matrix(&self.pixel_space, pixel_space);
        write_matrix(
            &self.projectionview,
            self.projection_matrix() * self.view_matrix(),
        );
        for (&(space, markerspace), preprojection) in &self.preprojections {
            write_matrix(
                preprojection,
                self.calculate_preprojection_matrix(space, markerspace),
            );
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        read_matrix(&self.view)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        read_matrix(&self.projection)
    }

    pub fn projectionview_matrix(&self) -> Matrix4<f32> {
        read_matrix(&self.projectionview)
    }

    pub fn resolution_px(&self) -> [f32; 2] {
        match &*self.resolution.borrow() {
            Uniform::Vector2(r) => [r.x, r.y],
            _ => [1.0, 1.0],
        }
    }

    /// Matrix taking `space` coordinates to clip space.
    pub fn space_to_clip(&self, space: CamSpace) -> Matrix4<f32> {
        match space {
            CamSpace::Data => self.projectionview_matrix(),
            CamSpace::Pixel => read_matrix(&self.pixel_space),
            CamSpace::Relative => read_matrix(&self.relative_space),
            CamSpace::Clip => Matrix4::identity(),
        }
    }

    /// Matrix taking clip space back to `space` coordinates.
    pub fn clip_to_space(&self, space: CamSpace) -> Matrix4<f32> {
        let to_clip = self.space_to_clip(space);
        to_clip.invert().unwrap_or_else(|| {
            warn!("{:?} space projection is singular, using identity", space);
            Matrix4::identity()
        })
    }

    /// `space -> clip -> markerspace`.
    pub fn calculate_preprojection_matrix(
        &self,
        space: CamSpace,
        markerspace: CamSpace,
    ) -> Matrix4<f32> {
        self.clip_to_space(markerspace) * self.space_to_clip(space)
    }

    /// The shared preprojection slot for a `(space, markerspace)` pair.
    ///
    /// Slots are created on first request and kept up to date by every later
    /// matrix update, so all plots asking for the same pair share one slot.
    pub fn preprojection_matrix(&mut self, space: CamSpace, markerspace: CamSpace) -> UniformSlot {
        if let Some(existing) = self.preprojections.get(&(space, markerspace)) {
            return existing.clone();
        }
        let matrix = self.calculate_preprojection_matrix(space, markerspace);
        let preprojection = slot(Uniform::Matrix4(matrix));
        self.preprojections
            .insert((space, markerspace), preprojection.clone());
        preprojection
    }
}

/// Maps `[0, 1]²` onto clip space.
fn relative_space() -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(-1.0, -1.0, 0.0))
        * Matrix4::from_nonuniform_scale(2.0, 2.0, 1.0)
}

fn read_matrix(slot: &UniformSlot) -> Matrix4<f32> {
    slot.borrow().as_matrix4().unwrap_or_else(Matrix4::identity)
}

fn write_matrix(slot: &UniformSlot, matrix: Matrix4<f32>) {
    let components: &[f32; 16] = matrix.as_ref();
    write_components(slot, components);
}

fn write_components(slot: &UniformSlot, values: &[f32]) {
    if let Some(components) = slot.borrow_mut().components_mut() {
        if components.len() == values.len() {
            components.copy_from_slice(values);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cgmath::Vector4;

    use super::*;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    fn assert_matrix(a: Matrix4<f32>, b: Matrix4<f32>) {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        assert_close(a, b);
    }

    fn translation() -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(1.0f32, 2.0, 3.0))
    }

    fn matrices() -> CameraMatrices {
        let view: [[f32; 4]; 4] = translation().into();
        let projection: [[f32; 4]; 4] = Matrix4::<f32>::from_scale(0.5).into();
        CameraMatrices {
            view: bytemuck::cast(view),
            projection: bytemuck::cast(projection),
            resolution: [200.0, 100.0],
            eyeposition: [0.0, 0.0, 4.0],
        }
    }

    #[test]
    fn projectionview_follows_updates() {
        let mut camera = Camera::new();
        let view_slot = camera.view.clone();
        camera.update_matrices(&matrices());

        assert!(Rc::ptr_eq(&view_slot, &camera.view));
        assert_matrix(camera.view_matrix(), translation());
        assert_matrix(
            camera.projectionview_matrix(),
            Matrix4::<f32>::from_scale(0.5) * translation(),
        );
        assert_eq!(camera.resolution_px(), [200.0, 100.0]);
    }

    #[test]
    fn pixel_and_relative_space_map_to_clip() {
        let mut camera = Camera::new();
        camera.update_matrices(&matrices());
        let corner = camera.space_to_clip(CamSpace::Pixel) * Vector4::new(200.0f32, 100.0, 0.0, 1.0);
        assert_close(AsRef::<[f32; 4]>::as_ref(&corner), &[1.0, 1.0, 0.0, 1.0]);
        let origin = camera.space_to_clip(CamSpace::Relative) * Vector4::new(0.0f32, 0.0, 0.0, 1.0);
        assert_close(AsRef::<[f32; 4]>::as_ref(&origin), &[-1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn preprojection_slots_are_cached_and_refreshed() {
        let mut camera = Camera::new();
        let first = camera.preprojection_matrix(CamSpace::Data, CamSpace::Pixel);
        let second = camera.preprojection_matrix(CamSpace::Data, CamSpace::Pixel);
        assert!(Rc::ptr_eq(&first, &second));

        camera.update_matrices(&matrices());
        let expected = camera.calculate_preprojection_matrix(CamSpace::Data, CamSpace::Pixel);
        assert_matrix(read_matrix(&first), expected);
        assert_matrix(
            camera.calculate_preprojection_matrix(CamSpace::Clip, CamSpace::Clip),
            Matrix4::identity(),
        );
    }
}
