use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective look-at camera.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let inv_view_proj = self.view_projection(aspect).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let far_point = world.truncate() / world.w;
        Ray::new(self.position, far_point - self.position)
    }
}

/// Fixed-direction camera looking down -Z at the carousel; pinch changes only its distance.
#[derive(Debug, Clone)]
pub struct CarouselCamera {
    pub target: Vec3,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl CarouselCamera {
    pub fn to_camera(&self) -> Camera3D {
        let position = self.target + Vec3::new(0.0, 0.0, self.distance);
        Camera3D::new(position, self.target, self.fov_y_radians, self.near, self.far)
    }

    /// Spreading fingers (`factor > 1`) moves the camera closer.
    pub fn zoom(&mut self, factor: f32) -> f32 {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance / factor).clamp(self.min_distance, self.max_distance);
        }
        self.distance
    }
}
