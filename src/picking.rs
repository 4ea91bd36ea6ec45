use crate::camera3d::Camera3D;
use crate::carousel::RingMember;
use bevy_ecs::prelude::Entity;
use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` when `direction` cannot be normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        if direction.length_squared() <= f32::EPSILON || !origin.is_finite() {
            return None;
        }
        Some(Self { origin, direction })
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub entity: Entity,
}

/// Anything the picker can cast into. Hits may land on nested geometry; `resolve_owner`
/// maps such an entity back to the ring member that owns it.
pub trait Pickable {
    fn intersect(&self, ray: &Ray) -> Vec<RayHit>;

    fn resolve_owner(&self, entity: Entity) -> Option<Entity> {
        Some(entity)
    }
}

/// Render surface rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl ViewportRect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        if self.size.y > 0.0 {
            self.size.x / self.size.y
        } else {
            1.0
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x <= self.origin.x + self.size.x
            && point.y <= self.origin.y + self.size.y
    }

    /// Maps a window position into [-1, 1] device coordinates with +y up.
    pub fn to_ndc(&self, screen: Vec2) -> Option<Vec2> {
        if self.is_empty() || !self.contains(screen) {
            return None;
        }
        let local = screen - self.origin;
        Some(Vec2::new(local.x / self.size.x * 2.0 - 1.0, 1.0 - local.y / self.size.y * 2.0))
    }
}

pub fn pick<'a, P: Pickable + ?Sized>(
    screen: Vec2,
    viewport: &ViewportRect,
    camera: &Camera3D,
    scene: &P,
    members: &'a [RingMember],
) -> Option<&'a RingMember> {
    let ndc = viewport.to_ndc(screen)?;
    let ray = camera.ray_from_ndc(ndc, viewport.aspect())?;
    pick_along_ray(&ray, scene, members)
}

pub fn pick_along_ray<'a, P: Pickable + ?Sized>(
    ray: &Ray,
    scene: &P,
    members: &'a [RingMember],
) -> Option<&'a RingMember> {
    let nearest = scene
        .intersect(ray)
        .into_iter()
        .filter(|hit| hit.distance.is_finite() && hit.distance >= 0.0)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;
    let owner = scene.resolve_owner(nearest.entity)?;
    members.iter().find(|member| member.handle == owner)
}

pub fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let mut t = -b - sqrt_d;
    if t < 0.0 {
        t = -b + sqrt_d;
    }
    if t < 0.0 {
        return None;
    }
    Some(t)
}
