//! Demo scene: world axes, a point-cloud sphere, and a cube with an
//! intersecting pane that shows the depth buffer doing its job
//!
//! The sphere and cube double as the solid obstacles the particle
//! simulation collides against.

use crate::rasterizer::{Camera, Screen, Vec3};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

pub const SPHERE_CENTER: Vec3 = Vec3 {
    x: 15.0,
    y: 55.0,
    z: 15.0,
};
pub const SPHERE_RADIUS: f64 = 10.0;

/// The cube interior is the open interval on every axis.
pub const CUBE_MIN: f64 = 5.0;
pub const CUBE_MAX: f64 = 25.0;

/// Angular step of the sphere point cloud.
const SPHERE_STEP: f64 = PI / 32.0;

/// Whether a point sits inside one of the scene's solid obstacles.
pub fn blocks(p: Vec3) -> bool {
    let to_center = p - SPHERE_CENTER;
    if to_center.dot(to_center) < SPHERE_RADIUS * SPHERE_RADIUS {
        return true;
    }
    p.x > CUBE_MIN
        && p.x < CUBE_MAX
        && p.y > CUBE_MIN
        && p.y < CUBE_MAX
        && p.z > CUBE_MIN
        && p.z < CUBE_MAX
}

/// World axes from the origin. X red, Y green, Z blue.
pub fn draw_axes(screen: &mut Screen, camera: &Camera) {
    screen.draw_line(camera, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), 0xFF0000);
    screen.draw_line(camera, Vec3::ZERO, Vec3::new(0.0, 100.0, 0.0), 0x00FF00);
    screen.draw_line(camera, Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0), 0x0000FF);
}

/// The sphere, the cube, and the pane cutting through the cube.
pub fn draw_scene(screen: &mut Screen, camera: &Camera) {
    // sphere as a grid of points over latitude and longitude
    let mut lat = -FRAC_PI_2;
    while lat < FRAC_PI_2 {
        let mut lon = 0.0;
        while lon < TAU {
            let p = Vec3::new(
                lon.sin() * lat.cos() * SPHERE_RADIUS + SPHERE_CENTER.x,
                lat.sin() * SPHERE_RADIUS + SPHERE_CENTER.y,
                lon.cos() * lat.cos() * SPHERE_RADIUS + SPHERE_CENTER.z,
            );
            screen.draw_point(camera, p, 0xFFFFFF);
            lon += SPHERE_STEP;
        }
        lat += SPHERE_STEP;
    }

    // cube corners, named by which axes sit at CUBE_MAX
    let lo = CUBE_MIN;
    let hi = CUBE_MAX;
    let c000 = Vec3::new(lo, lo, lo);
    let c100 = Vec3::new(hi, lo, lo);
    let c010 = Vec3::new(lo, hi, lo);
    let c001 = Vec3::new(lo, lo, hi);
    let c110 = Vec3::new(hi, hi, lo);
    let c011 = Vec3::new(lo, hi, hi);
    let c101 = Vec3::new(hi, lo, hi);
    let c111 = Vec3::new(hi, hi, hi);

    // the open top and bottom faces get diagonal cross lines
    screen.draw_line(camera, c010, c111, 0xFFFFFF);
    screen.draw_line(camera, c110, c011, 0xFFFFFF);
    screen.draw_line(camera, c000, c101, 0xFFFFFF);
    screen.draw_line(camera, c001, c100, 0xFFFFFF);

    // four solid side faces, two triangles each
    screen.draw_triangle(camera, c000, c001, c011, 0x550000);
    screen.draw_triangle(camera, c000, c010, c011, 0x550000);

    screen.draw_triangle(camera, c100, c101, c111, 0x555500);
    screen.draw_triangle(camera, c100, c110, c111, 0x555500);

    screen.draw_triangle(camera, c000, c100, c110, 0x000055);
    screen.draw_triangle(camera, c000, c010, c110, 0x000055);

    screen.draw_triangle(camera, c001, c101, c111, 0x005555);
    screen.draw_triangle(camera, c001, c011, c111, 0x005555);

    // a pane poking through the x = CUBE_MAX face to exercise the
    // depth test on intersecting geometry
    let p00 = Vec3::new(15.0, 5.0, 15.0);
    let p10 = Vec3::new(35.0, 5.0, 15.0);
    let p11 = Vec3::new(35.0, 25.0, 15.0);
    let p01 = Vec3::new(15.0, 25.0, 15.0);
    screen.draw_triangle(camera, p00, p10, p11, 0x005555);
    screen.draw_triangle(camera, p00, p01, p11, 0x005555);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_inside_the_sphere() {
        assert!(blocks(SPHERE_CENTER));
        assert!(blocks(SPHERE_CENTER + Vec3::new(9.9, 0.0, 0.0)));
        // the boundary itself is outside
        assert!(!blocks(SPHERE_CENTER + Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_blocks_inside_the_cube() {
        assert!(blocks(Vec3::new(15.0, 15.0, 15.0)));
        assert!(blocks(Vec3::new(5.1, 24.9, 5.1)));
        // faces and corners are open
        assert!(!blocks(Vec3::new(5.0, 15.0, 15.0)));
        assert!(!blocks(Vec3::new(25.0, 25.0, 25.0)));
    }

    #[test]
    fn test_blocks_free_space() {
        assert!(!blocks(Vec3::ZERO));
        assert!(!blocks(Vec3::new(50.0, 70.0, 50.0)));
        assert!(!blocks(Vec3::new(15.0, 40.0, 15.0)));
    }
}
