//! Quaternion free-look camera and the perspective projection
//!
//! World points go through the view matrix (rotation plus folded-in
//! translation), a near-limit cull, the projection matrix, the
//! perspective divide, and a remap into [0,1] screen-fraction space.

use super::math::{Mat4, Quat, Vec3, Vec4};

/// Default near plane distance.
pub const NEAR_PLANE: f64 = 1.0;
/// Default far plane distance.
pub const FAR_PLANE: f64 = 10.0;

/// Camera-space depth below which a point cannot be projected.
pub const NEAR_LIMIT: f64 = 1.0;

// Fixed half-turn about +Y composed into every view rebuild. Projection
// keeps points with camera-space z at NEAR_LIMIT or beyond, so the rest
// pose faces world -Z, the same forward the movement math integrates.
const FACE_NEG_Z: Quat = Quat {
    x: 0.0,
    y: 1.0,
    z: 0.0,
    w: 0.0,
};

/// Free-look camera: pitch about local X, then yaw about Y, plus a
/// view-space translation.
pub struct Camera {
    view: Mat4,
    proj: Mat4,
    /// Current pitch-then-yaw rotation, unit length.
    pub orientation: Quat,
    x: f64,
    y: f64,
    z: f64,
    half_pitch: f64,
    half_yaw: f64,
}

impl Camera {
    /// Camera for a `width` x `height` target. The frustum's right/top
    /// extents come from the normalized screen diagonal, so aspect ratio
    /// is baked into the projection.
    pub fn new(width: usize, height: usize, near: f64, far: f64) -> Self {
        let extent = Vec3::new(width as f64, height as f64, 0.0).normalize();
        let mut camera = Self {
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            orientation: Quat::IDENTITY,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            half_pitch: 0.0,
            half_yaw: 0.0,
        };
        camera.set_viewport(extent.x, extent.y, near, far);
        camera.rebuild_view();
        camera
    }

    /// Symmetric-frustum projection matrix.
    pub fn set_viewport(&mut self, right: f64, top: f64, near: f64, far: f64) {
        let mut proj = Mat4::IDENTITY;
        proj.cols[0].x = near / right;
        proj.cols[1].y = near / top;
        proj.cols[2].z = -(far + near) / (far - near);
        proj.cols[3].z = -2.0 * near * far / (far - near);
        proj.cols[2].w = -2.0 * near;
        self.proj = proj;
    }

    /// Aim the camera. Quaternion components take half-angles, so the
    /// inputs are halved once here and composed as pitch, then yaw.
    pub fn set_rotation(&mut self, pitch: f64, yaw: f64) {
        self.half_pitch = pitch * 0.5;
        self.half_yaw = yaw * 0.5;
        self.rebuild_view();
    }

    /// Place the camera. The components are view-space translation, the
    /// world eye position is their negation.
    pub fn set_translation(&mut self, x: f64, y: f64, z: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        let pitch = Quat::from_half_angle(Vec3::X, self.half_pitch);
        let yaw = Quat::from_half_angle(Vec3::Y, self.half_yaw);
        let mut rotation = (Quat::IDENTITY * pitch).normalize();
        rotation = (rotation * yaw).normalize();
        self.orientation = rotation;

        self.view = (rotation * FACE_NEG_Z).normalize().to_matrix();
        let folded = self.view.cols[0].scale(self.x)
            + self.view.cols[1].scale(self.y)
            + self.view.cols[2].scale(self.z);
        self.view.cols[3] = self.view.cols[3] + folded;
    }

    /// Project a world point into screen-fraction space: x/y in [0,1]
    /// across the viewport, z the remapped depth. Points nearer than the
    /// near limit have no on-screen position and return `None`; callers
    /// skip them rather than draw.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let eye = self.view * Vec4::from_point(world);
        if eye.z < NEAR_LIMIT {
            return None;
        }
        let clip = self.proj * eye;
        let ndc = clip.scale(1.0 / clip.w);
        Some(Vec3::new(
            ndc.x * 0.5 + 0.5,
            ndc.y * 0.5 + 0.5,
            ndc.z * 0.5 + 0.5,
        ))
    }
}
