//! Orbit camera with orthographic and perspective projections.
//!
//! The viewer looks at the origin from a pair of orbit angles; zooming
//! shrinks the orthographic view volume (and, in perspective mode, pulls
//! the eye in with it). Both projections are reverse-Z: near and far are
//! swapped in the matrix so the depth buffer clears to 0.0.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Mat4, Vec3};

/// Uniform block shared by every pipeline: view-projection plus eye position.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

/// A camera orbiting the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Orbit angle around the world Y axis, degrees, wrapped to [0, 360).
    pub yaw_degrees: f64,
    /// Orbit angle above the horizon, degrees, wrapped to [0, 360).
    pub pitch_degrees: f64,
    /// Half-extent of the orthographic view volume; also sets the eye
    /// distance (2× extent) in both projections.
    pub extent: f64,
    /// Vertical field of view for the perspective projection, degrees.
    pub fov_y_degrees: f32,
    /// Width / height of the surface.
    pub aspect_ratio: f32,
    /// Perspective instead of orthographic.
    pub perspective: bool,
}

impl OrbitCamera {
    /// Smallest extent the zoom floor allows above the grid radius.
    const ZOOM_MARGIN: f64 = 0.1;

    /// Create a camera with the given view volume and projection settings.
    #[must_use]
    pub fn new(extent: f64, fov_y_degrees: f32, perspective: bool) -> Self {
        Self {
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            extent,
            fov_y_degrees,
            aspect_ratio: 1.0,
            perspective,
        }
    }

    /// Eye position derived from the orbit angles, at distance 2× extent.
    #[must_use]
    pub fn eye(&self) -> DVec3 {
        let yaw = self.yaw_degrees.to_radians();
        let pitch = self.pitch_degrees.to_radians();
        let d = 2.0 * self.extent;
        DVec3::new(
            -d * yaw.sin() * pitch.cos(),
            d * pitch.sin(),
            d * yaw.cos() * pitch.cos(),
        )
    }

    /// View matrix looking from the eye at the origin.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye().as_vec3();
        // Flip "up" when pitch passes the poles so the orbit never snaps.
        let up = if (90.0..270.0).contains(&self.pitch_degrees.rem_euclid(360.0)) {
            Vec3::NEG_Y
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(eye, Vec3::ZERO, up)
    }

    /// Projection matrix with reverse-Z (near/far swapped).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        let near = 0.1_f32;
        let far = (4.0 * self.extent) as f32;
        if self.perspective {
            Mat4::perspective_rh(
                self.fov_y_degrees.to_radians(),
                self.aspect_ratio,
                far,  // swapped: far as "near" parameter
                near, // swapped: near as "far" parameter
            )
        } else {
            let half_h = self.extent as f32;
            let half_w = half_h * self.aspect_ratio;
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, far, near)
        }
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate the orbit by the given degree deltas, wrapping to [0, 360).
    pub fn rotate(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw_degrees = (self.yaw_degrees + d_yaw).rem_euclid(360.0);
        self.pitch_degrees = (self.pitch_degrees + d_pitch).rem_euclid(360.0);
    }

    /// Reset the orbit angles.
    pub fn reset_angles(&mut self) {
        self.yaw_degrees = 0.0;
        self.pitch_degrees = 0.0;
    }

    /// Zoom in by `step`, never closer than `floor + margin` so the grid
    /// cannot clip through the near plane.
    pub fn zoom_in(&mut self, step: f64, floor: f64) {
        if self.extent - step >= floor + Self::ZOOM_MARGIN {
            self.extent -= step;
        }
    }

    /// Zoom out by `step`.
    pub fn zoom_out(&mut self, step: f64) {
        self.extent += step;
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Convert the camera to a uniform suitable for GPU upload.
    #[must_use]
    pub fn to_uniform(&self) -> CameraUniform {
        let eye = self.eye().as_vec3();
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}
