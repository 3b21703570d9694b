//! Shared input state and pose integration.
//!
//! The window loop records key and mouse state here, the input thread
//! folds it into the camera pose at a fixed rate, and the render loop
//! reads the result.

use crate::rasterizer::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Radians of look rotation per mouse unit.
pub const LOOK_SENSITIVITY: f64 = 1.0 / 360.0;

/// Camera pose: the folded view translation plus look angles.
///
/// The translation is stored the way the view matrix consumes it, so
/// the world-space eye sits at its negation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    /// Eye position in world space.
    pub fn world_eye(&self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }

    /// Unit look direction in world space.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: -50.0,
            y: -70.0,
            z: -50.0,
            pitch: -PI / 5.0,
            yaw: -FRAC_PI_4,
        }
    }
}

/// The pose shared between threads. One writer, many readers.
#[derive(Debug, Default)]
pub struct PoseCell(Mutex<Pose>);

impl PoseCell {
    pub fn new(pose: Pose) -> Self {
        Self(Mutex::new(pose))
    }

    pub fn store(&self, pose: Pose) {
        *self.0.lock().unwrap() = pose;
    }

    pub fn load(&self) -> Pose {
        *self.0.lock().unwrap()
    }
}

/// One sampled snapshot of the movement keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveSample {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub rise: bool,
    pub sink: bool,
}

/// Key and mouse state shared between the window loop and the input
/// thread. Movement and emit are level flags sampled each tick; look
/// input accumulates so fast mouse motion between ticks is not lost.
#[derive(Debug)]
pub struct InputFlags {
    forward: AtomicBool,
    back: AtomicBool,
    left: AtomicBool,
    right: AtomicBool,
    rise: AtomicBool,
    sink: AtomicBool,
    emit: AtomicBool,
    depth_test: AtomicBool,
    depth_overlay: AtomicBool,
    look: Mutex<(f64, f64)>,
}

impl InputFlags {
    pub fn new(depth_test: bool, depth_overlay: bool) -> Self {
        Self {
            forward: AtomicBool::new(false),
            back: AtomicBool::new(false),
            left: AtomicBool::new(false),
            right: AtomicBool::new(false),
            rise: AtomicBool::new(false),
            sink: AtomicBool::new(false),
            emit: AtomicBool::new(false),
            depth_test: AtomicBool::new(depth_test),
            depth_overlay: AtomicBool::new(depth_overlay),
            look: Mutex::new((0.0, 0.0)),
        }
    }

    pub fn store_moves(&self, m: MoveSample) {
        self.forward.store(m.forward, Ordering::Relaxed);
        self.back.store(m.back, Ordering::Relaxed);
        self.left.store(m.left, Ordering::Relaxed);
        self.right.store(m.right, Ordering::Relaxed);
        self.rise.store(m.rise, Ordering::Relaxed);
        self.sink.store(m.sink, Ordering::Relaxed);
    }

    pub fn sample_moves(&self) -> MoveSample {
        MoveSample {
            forward: self.forward.load(Ordering::Relaxed),
            back: self.back.load(Ordering::Relaxed),
            left: self.left.load(Ordering::Relaxed),
            right: self.right.load(Ordering::Relaxed),
            rise: self.rise.load(Ordering::Relaxed),
            sink: self.sink.load(Ordering::Relaxed),
        }
    }

    pub fn set_emit(&self, on: bool) {
        self.emit.store(on, Ordering::Relaxed);
    }

    pub fn emitting(&self) -> bool {
        self.emit.load(Ordering::Relaxed)
    }

    /// Flips the depth test flag and returns the new state.
    pub fn toggle_depth_test(&self) -> bool {
        !self.depth_test.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test.load(Ordering::Relaxed)
    }

    /// Flips the depth overlay flag and returns the new state.
    pub fn toggle_depth_overlay(&self) -> bool {
        !self.depth_overlay.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn depth_overlay(&self) -> bool {
        self.depth_overlay.load(Ordering::Relaxed)
    }

    pub fn push_look(&self, dx: f64, dy: f64) {
        let mut look = self.look.lock().unwrap();
        look.0 += dx;
        look.1 += dy;
    }

    /// Drains the accumulated mouse motion.
    pub fn take_look(&self) -> (f64, f64) {
        std::mem::take(&mut *self.look.lock().unwrap())
    }
}

/// Folds one tick's key state and accumulated mouse motion into the
/// pose. Opposed keys cancel in favor of the first listed: forward
/// over back, left over right, rise over sink.
pub fn integrate(pose: &mut Pose, moves: &MoveSample, dx: f64, dy: f64) {
    pose.pitch = (pose.pitch - dy * LOOK_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
    pose.yaw += dx * LOOK_SENSITIVITY;
    if pose.yaw > PI {
        pose.yaw -= TAU;
    } else if pose.yaw < -PI {
        pose.yaw += TAU;
    }

    let (sin_yaw, cos_yaw) = pose.yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pose.pitch.sin_cos();
    if moves.forward {
        pose.x -= sin_yaw * cos_pitch;
        pose.y -= sin_pitch;
        pose.z += cos_yaw * cos_pitch;
    } else if moves.back {
        pose.x += sin_yaw * cos_pitch;
        pose.y += sin_pitch;
        pose.z -= cos_yaw * cos_pitch;
    }
    if moves.left {
        pose.x += cos_yaw;
        pose.z += sin_yaw;
    } else if moves.right {
        pose.x -= cos_yaw;
        pose.z -= sin_yaw;
    }
    if moves.rise {
        pose.y -= 1.0;
    } else if moves.sink {
        pose.y += 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting() -> Pose {
        Pose {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    #[test]
    fn test_default_pose() {
        let p = Pose::default();
        assert_eq!(p.x, -50.0);
        assert_eq!(p.y, -70.0);
        assert_eq!(p.z, -50.0);
        assert!((p.pitch + PI / 5.0).abs() < 1e-12);
        assert!((p.yaw + FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_forward_at_rest_walks_toward_negative_z() {
        let mut p = resting();
        let moves = MoveSample {
            forward: true,
            ..MoveSample::default()
        };
        integrate(&mut p, &moves, 0.0, 0.0);
        assert!(p.x.abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((p.z - 1.0).abs() < 1e-12);
        assert!((p.world_eye().z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_movement_follows_the_look_direction() {
        let mut p = Pose {
            pitch: FRAC_PI_4,
            ..resting()
        };
        let moves = MoveSample {
            forward: true,
            ..MoveSample::default()
        };
        integrate(&mut p, &moves, 0.0, 0.0);
        let eye = p.world_eye();
        let f = p.forward();
        assert!((eye.x - f.x).abs() < 1e-12);
        assert!((eye.y - f.y).abs() < 1e-12);
        assert!((eye.z - f.z).abs() < 1e-12);
    }

    #[test]
    fn test_strafe_stays_perpendicular_to_forward() {
        let mut p = Pose {
            yaw: FRAC_PI_2,
            ..resting()
        };
        let moves = MoveSample {
            left: true,
            ..MoveSample::default()
        };
        integrate(&mut p, &moves, 0.0, 0.0);
        let eye = p.world_eye();
        assert!(eye.x.abs() < 1e-12);
        assert!((eye.z + 1.0).abs() < 1e-12);
        assert!(eye.dot(p.forward()).abs() < 1e-12);
    }

    #[test]
    fn test_opposed_keys_favor_the_first() {
        let mut p = resting();
        let moves = MoveSample {
            forward: true,
            back: true,
            left: true,
            right: true,
            rise: true,
            sink: true,
        };
        integrate(&mut p, &moves, 0.0, 0.0);
        assert!((p.z - 1.0).abs() < 1e-12);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert_eq!(p.y, -1.0);
    }

    #[test]
    fn test_vertical_keys_ignore_the_look_angles() {
        let mut p = Pose {
            pitch: 1.0,
            yaw: 2.0,
            ..resting()
        };
        let moves = MoveSample {
            sink: true,
            ..MoveSample::default()
        };
        integrate(&mut p, &moves, 0.0, 0.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 1.0);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_mouse_look_tilts_and_pans() {
        let mut p = resting();
        integrate(&mut p, &MoveSample::default(), 360.0, -90.0);
        assert!((p.yaw - 1.0).abs() < 1e-12);
        assert!((p.pitch - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_pitch_clamps_at_straight_up_and_down() {
        let mut p = resting();
        integrate(&mut p, &MoveSample::default(), 0.0, -1e6);
        assert_eq!(p.pitch, FRAC_PI_2);
        integrate(&mut p, &MoveSample::default(), 0.0, 1e6);
        assert_eq!(p.pitch, -FRAC_PI_2);
    }

    #[test]
    fn test_yaw_wraps_around() {
        let mut p = Pose {
            yaw: PI - 0.1,
            ..resting()
        };
        integrate(&mut p, &MoveSample::default(), 0.2 * 360.0, 0.0);
        assert!((p.yaw - (0.1 - PI)).abs() < 1e-12);
    }

    #[test]
    fn test_flags_round_trip_and_toggle() {
        let flags = InputFlags::new(true, true);
        flags.store_moves(MoveSample {
            forward: true,
            right: true,
            ..MoveSample::default()
        });
        let m = flags.sample_moves();
        assert!(m.forward && m.right);
        assert!(!m.back && !m.left && !m.rise && !m.sink);

        assert!(flags.depth_test());
        assert!(!flags.toggle_depth_test());
        assert!(!flags.depth_test());
        assert!(flags.toggle_depth_test());

        assert!(flags.depth_overlay());
        assert!(!flags.toggle_depth_overlay());

        flags.push_look(3.0, -2.0);
        flags.push_look(1.0, 1.0);
        assert_eq!(flags.take_look(), (4.0, -1.0));
        assert_eq!(flags.take_look(), (0.0, 0.0));

        assert!(!flags.emitting());
        flags.set_emit(true);
        assert!(flags.emitting());
    }
}
