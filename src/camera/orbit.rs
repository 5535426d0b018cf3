//! Orbit controller for scenes that carry interactive 3-D camera state.
//!
//! Input handling proper (pointer capture, gestures) belongs to the host; it
//! reduces events to [`CameraInput`] deltas and this controller turns those
//! into view and projection matrices.

use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Quaternion, Rad, Rotation, Rotation3,
    Vector3,
};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::description::{Cam3dState, CameraMatrices};

/// Smallest eye-to-target distance zooming may reach.
const MIN_DISTANCE: f32 = 1e-3;

const DEFAULT_FOV: f32 = 45.0;
const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 10_000.0;

/// Input deltas in screen units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraInput {
    Rotate { dx: f32, dy: f32 },
    /// Multiplies the eye-to-target distance; values below 1 zoom in.
    Zoom { factor: f32 },
    Pan { dx: f32, dy: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitController {
    pub eye: Point3<f32>,
    pub lookat: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
    /// Radians per screen unit.
    pub rotation_speed: f32,
    /// Fraction of the eye distance per screen unit.
    pub pan_speed: f32,
}

impl OrbitController {
    /// Out-of-range `fov`, `near` or `far` fall back to the defaults of
    /// [`Cam3dState`].
    pub fn new(state: &Cam3dState) -> Self {
        let up = Vector3::from(state.upvector);
        let fov = if state.fov > 0.0 && state.fov < 180.0 {
            state.fov
        } else {
            warn!("field of view {} out of range, using {}", state.fov, DEFAULT_FOV);
            DEFAULT_FOV
        };
        let (near, far) = if state.near > 0.0 && state.far > state.near && state.far.is_finite() {
            (state.near, state.far)
        } else {
            warn!(
                "clip planes {}..{} invalid, using {}..{}",
                state.near, state.far, DEFAULT_NEAR, DEFAULT_FAR
            );
            (DEFAULT_NEAR, DEFAULT_FAR)
        };
        Self {
            eye: Point3::from(state.eyeposition),
            lookat: Point3::from(state.lookat),
            up: if up.magnitude2() > 0.0 {
                up.normalize()
            } else {
                Vector3::unit_z()
            },
            fov: Deg(fov),
            near,
            far,
            rotation_speed: 0.01,
            pan_speed: 0.001,
        }
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.lookat).magnitude()
    }

    pub fn handle(&mut self, input: CameraInput) {
        match input {
            CameraInput::Rotate { dx, dy } => self.rotate(dx, dy),
            CameraInput::Zoom { factor } => self.zoom(factor),
            CameraInput::Pan { dx, dy } => self.pan(dx, dy),
        }
    }

    fn rotate(&mut self, dx: f32, dy: f32) {
        let offset = self.eye - self.lookat;
        let azimuth = Quaternion::from_axis_angle(self.up, Rad(-dx * self.rotation_speed));
        let offset = azimuth.rotate_vector(offset);

        let right = offset.cross(self.up);
        let rotated = if right.magnitude2() > f32::EPSILON {
            let elevation =
                Quaternion::from_axis_angle(right.normalize(), Rad(dy * self.rotation_speed));
            let candidate = elevation.rotate_vector(offset);
            // Stop at the poles instead of flipping over them.
            if candidate.normalize().dot(self.up).abs() < 0.999 {
                candidate
            } else {
                offset
            }
        } else {
            offset
        };
        self.eye = self.lookat + rotated;
    }

    fn zoom(&mut self, factor: f32) {
        if !(factor > 0.0) {
            return;
        }
        let offset = self.eye - self.lookat;
        let distance = (offset.magnitude() * factor).max(MIN_DISTANCE);
        if offset.magnitude2() > 0.0 {
            self.eye = self.lookat + offset.normalize() * distance;
        }
    }

    fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.lookat - self.eye;
        let right = forward.cross(self.up);
        if right.magnitude2() <= f32::EPSILON {
            return;
        }
        let right = right.normalize();
        let screen_up = right.cross(forward).normalize();
        let scale = self.distance() * self.pan_speed;
        let shift = (right * -dx + screen_up * dy) * scale;
        self.eye += shift;
        self.lookat += shift;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.lookat, self.up)
    }

    pub fn projection_matrix(&self, resolution: [f32; 2]) -> Matrix4<f32> {
        let [width, height] = resolution;
        let aspect = if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            width / height
        } else {
            1.0
        };
        cgmath::perspective(self.fov, aspect, self.near, self.far)
    }

    /// Camera arrays in the same layout the producer would send.
    pub fn matrices(&self, resolution: [f32; 2]) -> CameraMatrices {
        let view: [[f32; 4]; 4] = self.view_matrix().into();
        let projection: [[f32; 4]; 4] = self.projection_matrix(resolution).into();
        CameraMatrices {
            view: bytemuck::cast(view),
            projection: bytemuck::cast(projection),
            resolution,
            eyeposition: self.eye.to_vec().into(),
        }
    }
}
