//! Vector, quaternion, and matrix math for the projection pipeline

use std::ops::{Add, Mul, Sub};

/// 3D vector
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. The zero vector has no direction; +X stands in
    /// so callers never see NaN components.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l <= 0.0 {
            return Vec3::X;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

/// Homogeneous 4-component vector, doubling as a matrix column
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Position with an implicit w of 1, ready for a transform.
    pub fn from_point(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            w: 1.0,
        }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    pub fn scale(self, s: f64) -> Vec4 {
        Vec4 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
            w: self.w * s,
        }
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w,
        }
    }
}

/// Rotation quaternion with the scalar part in `w`, composed via the
/// Hamilton product. Compositions are meant to be renormalized; drift
/// from repeated products shows up as shear in the view matrix.
#[derive(Debug, Clone, Copy)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation by `angle` radians about `axis` (assumed unit length).
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Quat {
        Self::from_half_angle(axis, angle * 0.5)
    }

    /// Quaternion components take half-angles: vector part `axis * sin`,
    /// scalar part `cos`.
    pub fn from_half_angle(axis: Vec3, half_angle: f64) -> Quat {
        let s = half_angle.sin();
        Quat {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half_angle.cos(),
        }
    }

    pub fn len(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalize(self) -> Quat {
        let l = self.len();
        if l <= 0.0 {
            return Quat::IDENTITY;
        }
        Quat {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
            w: self.w / l,
        }
    }

    /// Rotation matrix of a unit quaternion, column-major.
    pub fn to_matrix(self) -> Mat4 {
        let Quat { x, y, z, w } = self;
        let mut m = Mat4::IDENTITY;
        m.cols[0] = Vec4::new(
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y + 2.0 * w * z,
            2.0 * x * z - 2.0 * w * y,
            0.0,
        );
        m.cols[1] = Vec4::new(
            2.0 * x * y - 2.0 * w * z,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z + 2.0 * w * x,
            0.0,
        );
        m.cols[2] = Vec4::new(
            2.0 * x * z + 2.0 * w * y,
            2.0 * y * z - 2.0 * w * x,
            1.0 - 2.0 * x * x - 2.0 * y * y,
            0.0,
        );
        m
    }
}

impl Mul for Quat {
    type Output = Quat;
    // Hamilton product; not commutative, the right operand is the
    // rotation applied first.
    fn mul(self, r: Quat) -> Quat {
        Quat {
            x: self.w * r.x + self.x * r.w + self.y * r.z - self.z * r.y,
            y: self.w * r.y + self.y * r.w + self.z * r.x - self.x * r.z,
            z: self.w * r.z + self.z * r.w + self.x * r.y - self.y * r.x,
            w: self.w * r.w - self.x * r.x - self.y * r.y - self.z * r.z,
        }
    }
}

/// Column-major 4x4 matrix
#[derive(Debug, Clone, Copy)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            Vec4 { x: 1.0, y: 0.0, z: 0.0, w: 0.0 },
            Vec4 { x: 0.0, y: 1.0, z: 0.0, w: 0.0 },
            Vec4 { x: 0.0, y: 0.0, z: 1.0, w: 0.0 },
            Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
        ],
    };
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4 {
            cols: [
                self * rhs.cols[0],
                self * rhs.cols[1],
                self * rhs.cols[2],
                self * rhs.cols[3],
            ],
        }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let [a, b, c, d] = self.cols;
        Vec4 {
            x: a.x * v.x + b.x * v.y + c.x * v.z + d.x * v.w,
            y: a.y * v.x + b.y * v.y + c.y * v.z + d.y * v.w,
            z: a.z * v.x + b.z * v.y + c.z * v.z + d.z * v.w,
            w: a.w * v.x + b.w * v.y + c.w * v.z + d.w * v.w,
        }
    }
}

impl Mul<f64> for Mat4 {
    type Output = Mat4;
    fn mul(self, s: f64) -> Mat4 {
        Mat4 {
            cols: [
                self.cols[0].scale(s),
                self.cols[1].scale(s),
                self.cols[2].scale(s),
                self.cols[3].scale(s),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn vec_close(a: Vec3, b: Vec3) -> bool {
        close(a.x, b.x) && close(a.y, b.y) && close(a.z, b.z)
    }

    #[test]
    fn test_dot_and_cross() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!(close(a.dot(b), 32.0));
        assert!(vec_close(Vec3::X.cross(Vec3::Y), Vec3::new(0.0, 0.0, 1.0)));
        assert!(vec_close(Vec3::Y.cross(Vec3::X), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec3::new(3.0, 4.0, 0.0).normalize();
        assert!(close(v.len(), 1.0));
        assert!(close(v.x, 0.6));
    }

    #[test]
    fn test_normalize_zero_vector() {
        let v = Vec3::ZERO.normalize();
        assert!(vec_close(v, Vec3::X));
    }

    #[test]
    fn test_quarter_turns_move_basis_vectors() {
        let rotate = |axis: Vec3, angle: f64, v: Vec3| {
            (Quat::from_axis_angle(axis, angle).to_matrix() * Vec4::from_point(v)).xyz()
        };
        let z_axis = Vec3::new(0.0, 0.0, 1.0);
        assert!(vec_close(rotate(z_axis, FRAC_PI_2, Vec3::X), Vec3::Y));
        assert!(vec_close(rotate(z_axis, -FRAC_PI_2, Vec3::X), Vec3::Y * -1.0));
        assert!(vec_close(rotate(Vec3::X, FRAC_PI_2, Vec3::Y), z_axis));
        assert!(vec_close(rotate(Vec3::Y, FRAC_PI_2, z_axis), Vec3::X));
        assert!(vec_close(rotate(Vec3::Y, 0.0, z_axis), z_axis));
    }

    #[test]
    fn test_hamilton_product_composes_rotations() {
        let p = Quat::from_axis_angle(Vec3::X, 0.7);
        let q = Quat::from_axis_angle(Vec3::Y, -0.4);
        let v = Vec4::from_point(Vec3::new(1.0, 2.0, 3.0));
        let via_quat = ((p * q).to_matrix() * v).xyz();
        let via_mats = ((p.to_matrix() * q.to_matrix()) * v).xyz();
        assert!(vec_close(via_quat, via_mats));
    }

    #[test]
    fn test_renormalized_composition_stays_unit() {
        let step = Quat::from_axis_angle(Vec3::Y, 0.013);
        let mut q = Quat::IDENTITY;
        for _ in 0..2000 {
            q = (q * step).normalize();
        }
        assert!((q.len() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_vector_product() {
        let mut m = Mat4::IDENTITY;
        m.cols[3] = Vec4::new(10.0, 20.0, 30.0, 1.0);
        let v = m * Vec4::from_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(close(v.x, 11.0));
        assert!(close(v.y, 22.0));
        assert!(close(v.z, 33.0));
        assert!(close(v.w, 1.0));
    }

    #[test]
    fn test_matrix_identity_product() {
        let r = Quat::from_axis_angle(Vec3::Y, 1.2).to_matrix();
        let m = r * Mat4::IDENTITY;
        let v = Vec4::from_point(Vec3::new(-2.0, 0.5, 4.0));
        assert!(vec_close((m * v).xyz(), (r * v).xyz()));
    }

    #[test]
    fn test_matrix_scalar_product() {
        let m = Mat4::IDENTITY * 2.0;
        assert!(close(m.cols[0].x, 2.0));
        assert!(close(m.cols[3].w, 2.0));
        assert!(close(m.cols[1].x, 0.0));
    }
}
