//! Vector and matrix math for the transform pipeline
//!
//! Row-vector convention: a point is transformed as `v * M`, and
//! `a.mul(&b)` composes "apply `a`, then `b`".

use std::ops::{Add, Mul, Sub};

/// Homogeneous 4-component vector (w = 1 for points, w = 0 for directions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Point with w = 1
    pub fn point(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// Direction with w = 0
    pub fn direction(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 0.0 }
    }

    /// Dot product of the xyz parts
    pub fn dot(self, other: Vector) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product of the xyz parts; result is a direction
    pub fn cross(self, other: Vector) -> Vector {
        Vector {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 0.0,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Scale xyz to unit length, leaving w alone.
    ///
    /// A zero-length vector is returned unchanged, so the result is not
    /// guaranteed to be a unit vector.
    pub fn normalize(self) -> Vector {
        let l = self.len();
        if l == 0.0 {
            return self;
        }
        let inv = 1.0 / l;
        Vector {
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
            w: self.w,
        }
    }

    pub fn scale(self, s: f32) -> Vector {
        Vector {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
            w: 0.0,
        }
    }

    /// Reflect `self` about the normal `n`: `v - 2(v.n)n`
    pub fn reflect(self, n: Vector) -> Vector {
        let factor = 2.0 * self.dot(n);
        self - n.scale(factor)
    }

    /// Linear interpolation of xyz; result is a point
    pub fn lerp(self, other: Vector, t: f32) -> Vector {
        Vector {
            x: interp(self.x, other.x, t),
            y: interp(self.y, other.y, t),
            z: interp(self.z, other.z, t),
            w: 1.0,
        }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, other: Vector) -> Vector {
        Vector {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: 0.0,
        }
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, other: Vector) -> Vector {
        Vector {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: 0.0,
        }
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;
    fn mul(self, s: f32) -> Vector {
        self.scale(s)
    }
}

pub fn interp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 4x4 matrix, indexed `m[row][col]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub m: [[f32; 4]; 4],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const ZERO: Matrix = Matrix { m: [[0.0; 4]; 4] };

    pub fn add(&self, other: &Matrix) -> Matrix {
        let mut out = Matrix::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = self.m[i][j] + other.m[i][j];
            }
        }
        out
    }

    pub fn sub(&self, other: &Matrix) -> Matrix {
        let mut out = Matrix::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = self.m[i][j] - other.m[i][j];
            }
        }
        out
    }

    /// `self * other`: apply `self`, then `other`
    pub fn mul(&self, other: &Matrix) -> Matrix {
        let mut out = Matrix::ZERO;
        for j in 0..4 {
            for i in 0..4 {
                out.m[j][i] = self.m[j][0] * other.m[0][i]
                    + self.m[j][1] * other.m[1][i]
                    + self.m[j][2] * other.m[2][i]
                    + self.m[j][3] * other.m[3][i];
            }
        }
        out
    }

    pub fn scale(&self, f: f32) -> Matrix {
        let mut out = *self;
        for row in out.m.iter_mut() {
            for c in row.iter_mut() {
                *c *= f;
            }
        }
        out
    }

    /// Row vector times matrix: `v * self`
    pub fn apply(&self, v: Vector) -> Vector {
        let m = &self.m;
        Vector {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    pub fn translate(x: f32, y: f32, z: f32) -> Matrix {
        let mut out = Matrix::IDENTITY;
        out.m[3][0] = x;
        out.m[3][1] = y;
        out.m[3][2] = z;
        out
    }

    pub fn scaling(x: f32, y: f32, z: f32) -> Matrix {
        let mut out = Matrix::IDENTITY;
        out.m[0][0] = x;
        out.m[1][1] = y;
        out.m[2][2] = z;
        out
    }

    /// Rotation by `theta` radians about the axis `(x, y, z)`, built from
    /// the equivalent unit quaternion. The axis does not need to be normalized.
    pub fn rotate(x: f32, y: f32, z: f32, theta: f32) -> Matrix {
        let qsin = (theta * 0.5).sin();
        let qcos = (theta * 0.5).cos();
        let axis = Vector::point(x, y, z).normalize();
        let w = qcos;
        let x = axis.x * qsin;
        let y = axis.y * qsin;
        let z = axis.z * qsin;

        let mut out = Matrix::IDENTITY;
        out.m[0][0] = 1.0 - 2.0 * y * y - 2.0 * z * z;
        out.m[1][0] = 2.0 * x * y - 2.0 * w * z;
        out.m[2][0] = 2.0 * x * z + 2.0 * w * y;
        out.m[0][1] = 2.0 * x * y + 2.0 * w * z;
        out.m[1][1] = 1.0 - 2.0 * x * x - 2.0 * z * z;
        out.m[2][1] = 2.0 * y * z - 2.0 * w * x;
        out.m[0][2] = 2.0 * x * z - 2.0 * w * y;
        out.m[1][2] = 2.0 * y * z + 2.0 * w * x;
        out.m[2][2] = 1.0 - 2.0 * x * x - 2.0 * y * y;
        out
    }

    /// View matrix looking from `eye` toward `at`.
    ///
    /// Basis: forward = normalize(at - eye), right = normalize(up x forward),
    /// up' = forward x right.
    pub fn look_at(eye: Vector, at: Vector, up: Vector) -> Matrix {
        let zaxis = (at - eye).normalize();
        let xaxis = up.cross(zaxis).normalize();
        let yaxis = zaxis.cross(xaxis);

        Matrix {
            m: [
                [xaxis.x, yaxis.x, zaxis.x, 0.0],
                [xaxis.y, yaxis.y, zaxis.y, 0.0],
                [xaxis.z, yaxis.z, zaxis.z, 0.0],
                [-xaxis.dot(eye), -yaxis.dot(eye), -zaxis.dot(eye), 1.0],
            ],
        }
    }

    /// Perspective projection. View-space z in `[near, far]` maps to
    /// `[0, w]` before the divide, and `w' = z`.
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Matrix {
        let fax = 1.0 / (fovy * 0.5).tan();
        let mut out = Matrix::ZERO;
        out.m[0][0] = fax / aspect;
        out.m[1][1] = fax;
        out.m[2][2] = far / (far - near);
        out.m[3][2] = -near * far / (far - near);
        out.m[2][3] = 1.0;
        out
    }
}

/// Screen-space bounding box of three points, as (min, max) in x and y
pub fn aabb2d(a: Vector, b: Vector, c: Vector) -> (Vector, Vector) {
    let min = Vector::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y), 0.0, 0.0);
    let max = Vector::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y), 0.0, 0.0);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_vector_dot() {
        let a = Vector::point(1.0, 2.0, 3.0);
        let b = Vector::point(4.0, 5.0, 6.0);
        assert!(approx(a.dot(b), 32.0));
    }

    #[test]
    fn test_vector_cross() {
        let a = Vector::direction(1.0, 0.0, 0.0);
        let b = Vector::direction(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!(approx(c.z, 1.0));
        assert_eq!(c.w, 0.0);
    }

    #[test]
    fn test_normalize_unit_length() {
        for v in [
            Vector::direction(3.0, 4.0, 0.0),
            Vector::direction(-0.001, 0.002, 0.0005),
            Vector::point(100.0, -250.0, 7.5),
        ] {
            assert!(approx(v.normalize().len(), 1.0));
        }
    }

    #[test]
    fn test_normalize_zero_is_unchanged() {
        let z = Vector::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(z.normalize(), z);
    }

    #[test]
    fn test_reflect() {
        let v = Vector::direction(1.0, -1.0, 0.0);
        let n = Vector::direction(0.0, 1.0, 0.0);
        let r = v.reflect(n);
        assert!(approx(r.x, 1.0) && approx(r.y, 1.0) && approx(r.z, 0.0));
    }

    #[test]
    fn test_mul_identity() {
        let t = Matrix::translate(1.0, 2.0, 3.0);
        assert_eq!(t.mul(&Matrix::IDENTITY), t);
        assert_eq!(Matrix::IDENTITY.mul(&t), t);
    }

    #[test]
    fn test_mul_composes_left_to_right() {
        // scale first, then translate
        let m = Matrix::scaling(2.0, 2.0, 2.0).mul(&Matrix::translate(1.0, 0.0, 0.0));
        let p = m.apply(Vector::point(1.0, 1.0, 1.0));
        assert!(approx(p.x, 3.0) && approx(p.y, 2.0) && approx(p.z, 2.0));
        assert!(approx(p.w, 1.0));
    }

    #[test]
    fn test_add_sub_scale() {
        let a = Matrix::IDENTITY.scale(2.0);
        let b = a.sub(&Matrix::IDENTITY);
        assert_eq!(b, Matrix::IDENTITY);
        assert_eq!(b.add(&Matrix::IDENTITY), a);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let m = Matrix::rotate(0.0, 0.0, 1.0, std::f32::consts::FRAC_PI_2);
        let p = m.apply(Vector::direction(1.0, 0.0, 0.0));
        assert!(approx(p.x, 0.0) && approx(p.y, 1.0) && approx(p.z, 0.0));
    }

    #[test]
    fn test_rotate_is_orthonormal() {
        let m = Matrix::rotate(1.0, 2.0, 3.0, 0.7);
        let mt = Matrix {
            m: std::array::from_fn(|i| std::array::from_fn(|j| m.m[j][i])),
        };
        let id = m.mul(&mt);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx(id.m[i][j], expected), "m[{}][{}] = {}", i, j, id.m[i][j]);
            }
        }
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vector::point(5.0, 0.0, 0.0);
        let view = Matrix::look_at(eye, Vector::point(0.0, 0.0, 0.0), Vector::point(0.0, 0.0, 1.0));
        let p = view.apply(eye);
        assert!(approx(p.x, 0.0) && approx(p.y, 0.0) && approx(p.z, 0.0));
        // target sits straight ahead
        let t = view.apply(Vector::point(0.0, 0.0, 0.0));
        assert!(approx(t.x, 0.0) && approx(t.y, 0.0) && approx(t.z, 5.0));
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = Matrix::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 500.0);
        let near = p.apply(Vector::point(0.0, 0.0, 1.0));
        let far = p.apply(Vector::point(0.0, 0.0, 500.0));
        assert!(approx(near.z / near.w, 0.0));
        assert!(approx(far.z / far.w, 1.0));
        assert!(approx(near.w, 1.0));
    }

    #[test]
    fn test_aabb2d() {
        let (min, max) = aabb2d(
            Vector::point(3.0, -1.0, 0.0),
            Vector::point(-2.0, 4.0, 0.0),
            Vector::point(1.0, 0.5, 0.0),
        );
        assert_eq!((min.x, min.y), (-2.0, -1.0));
        assert_eq!((max.x, max.y), (3.0, 4.0));
    }
}
