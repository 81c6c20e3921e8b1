//! World/view/projection pipeline
//!
//! A `Transform` always carries a composed world-view-projection matrix that
//! matches its world and view. Replacing either matrix consumes the
//! `Transform` and yields a `PendingTransform`, which has to be `update`d
//! before anything can be projected with it again.

use super::math::{Matrix, Vector};
use super::{FAR_PLANE, FOV_Y, NEAR_PLANE};

/// Composed transform, ready for `apply_wvp`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    world: Matrix,
    view: Matrix,
    projection: Matrix,
    wvp: Matrix,
    width: usize,
    height: usize,
}

/// Transform whose world or view changed since the last compose
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "call update() to get a usable Transform back"]
pub struct PendingTransform {
    inner: Transform,
}

impl Transform {
    /// Identity world and view, 90 degree vertical FOV, near 1.0, far 500.0
    pub fn new(width: usize, height: usize) -> Self {
        let aspect = width as f32 / height as f32;
        let projection = Matrix::perspective(FOV_Y, aspect, NEAR_PLANE, FAR_PLANE);
        Self::with_projection(width, height, projection)
    }

    pub fn with_projection(width: usize, height: usize, projection: Matrix) -> Self {
        let mut t = Self {
            world: Matrix::IDENTITY,
            view: Matrix::IDENTITY,
            projection,
            wvp: Matrix::IDENTITY,
            width,
            height,
        };
        t.update();
        t
    }

    pub fn set_world(self, m: Matrix) -> PendingTransform {
        PendingTransform { inner: self }.set_world(m)
    }

    pub fn set_view(self, m: Matrix) -> PendingTransform {
        PendingTransform { inner: self }.set_view(m)
    }

    /// Recompute `world * view * projection`
    pub fn update(&mut self) {
        self.wvp = self.world.mul(&self.view).mul(&self.projection);
    }

    /// World-space vector to clip space. `w` is the perspective divisor,
    /// not yet divided out.
    pub fn apply_wvp(&self, v: Vector) -> Vector {
        self.wvp.apply(v)
    }

    /// Clip space to screen space.
    ///
    /// `w == 0` means a direction, not a point; the input comes back
    /// unchanged. Otherwise x and y map to pixels (y grows downward),
    /// z becomes the post-divide depth and w becomes 1.
    pub fn homogenize(&self, pv: Vector) -> Vector {
        if pv.w == 0.0 {
            return pv;
        }
        let rhw = pv.w;
        Vector {
            x: (pv.x / rhw + 1.0) * self.width as f32 * 0.5,
            y: (1.0 - pv.y / rhw) * self.height as f32 * 0.5,
            z: pv.z / rhw,
            w: 1.0,
        }
    }

    pub fn world(&self) -> &Matrix {
        &self.world
    }

    pub fn view(&self) -> &Matrix {
        &self.view
    }

    pub fn projection(&self) -> &Matrix {
        &self.projection
    }

    pub fn wvp(&self) -> &Matrix {
        &self.wvp
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

impl PendingTransform {
    pub fn set_world(mut self, m: Matrix) -> Self {
        self.inner.world = m;
        self
    }

    pub fn set_view(mut self, m: Matrix) -> Self {
        self.inner.view = m;
        self
    }

    pub fn update(mut self) -> Transform {
        self.inner.update();
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_idempotent() {
        let mut t = Transform::new(800, 600)
            .set_world(Matrix::rotate(0.0, 0.0, 1.0, 0.3))
            .set_view(Matrix::translate(0.0, 0.0, 5.0))
            .update();
        let first = *t.wvp();
        t.update();
        assert_eq!(*t.wvp(), first);
        t.update();
        assert_eq!(*t.wvp(), first);
    }

    #[test]
    fn test_set_world_recomposes_only_on_update() {
        let t = Transform::new(100, 100);
        let before = *t.wvp();
        let t = t.set_world(Matrix::translate(0.0, 0.0, 3.0)).update();
        assert_ne!(*t.wvp(), before);
        assert_eq!(
            *t.wvp(),
            Matrix::translate(0.0, 0.0, 3.0).mul(&Matrix::IDENTITY).mul(t.projection())
        );
    }

    #[test]
    fn test_homogenize_direction_unchanged() {
        let t = Transform::new(640, 480);
        for v in [
            Vector::direction(1.0, 2.0, 3.0),
            Vector::direction(-7.0, 0.0, 0.5),
            Vector::ZERO,
        ] {
            assert_eq!(t.homogenize(v), v);
        }
    }

    #[test]
    fn test_homogenize_maps_to_pixels() {
        let t = Transform::new(800, 600);
        let s = t.homogenize(Vector::new(2.0, 2.0, 1.0, 2.0));
        assert_eq!((s.x, s.y, s.z, s.w), (800.0, 0.0, 0.5, 1.0));
        let s = t.homogenize(Vector::new(-1.0, -1.0, 0.0, 1.0));
        assert_eq!((s.x, s.y), (0.0, 600.0));
    }

    #[test]
    fn test_near_plane_point_lands_on_screen() {
        let (w, h) = (800usize, 600usize);
        let t = Transform::new(w, h);
        for (x, y) in [(0.0, 0.0), (0.5, -0.5), (-1.0, 0.7)] {
            let clip = t.apply_wvp(Vector::point(x, y, NEAR_PLANE));
            let s = t.homogenize(clip);
            assert!(s.x >= 0.0 && s.x < w as f32, "x = {}", s.x);
            assert!(s.y >= 0.0 && s.y < h as f32, "y = {}", s.y);
            assert!(s.z.abs() < 1e-5);
        }
    }
}
