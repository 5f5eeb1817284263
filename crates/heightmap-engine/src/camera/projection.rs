use glam::Mat4;

/// Perspective projection parameters.
///
/// Only `aspect` changes at runtime (on resize); the matrix is derived on demand.
/// Depth maps to `[0, 1]`, matching wgpu clip space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub const fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Returns a copy with `aspect` replaced.
    pub fn with_aspect(self, aspect: f32) -> Self {
        Self { aspect, ..self }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_divides_horizontal_focal_length() {
        let p = Projection::new(45.0, 2.0, 0.05, 350.0);
        let m = p.matrix();
        let focal = 1.0 / (22.5f32.to_radians()).tan();

        assert!((m.y_axis.y - focal).abs() < 1e-5);
        assert!((m.x_axis.x - focal / 2.0).abs() < 1e-5);
    }

    #[test]
    fn with_aspect_keeps_other_terms() {
        let p = Projection::new(45.0, 1.25, 0.05, 350.0).with_aspect(1.5);
        assert_eq!(p, Projection::new(45.0, 1.5, 0.05, 350.0));
    }
}
