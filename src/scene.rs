use crate::config::{BackdropConfig, CarouselLayoutConfig, SpinConfig};
use crate::picking::{ray_sphere_intersection, Pickable, Ray, RayHit};
use bevy_ecs::prelude::*;
use glam::{EulerRot, Mat4, Quat, Vec3};
use smallvec::SmallVec;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}
impl Transform3D {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
#[derive(Component, Clone, Copy, Default)]
pub struct WorldTransform3D(pub Mat4);
#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);
#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);

/// Group that navigation rotates; picking only looks below it.
#[derive(Component)]
pub struct CarouselRoot;
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberTag {
    pub index: usize,
}
#[derive(Component, Clone, Copy, Debug)]
pub struct SphereCollider {
    pub radius: f32,
}
/// Texture the renderer should bind; `None` until assets arrive, which the core tolerates.
#[derive(Component, Clone, Debug, Default)]
pub struct SurfaceTexture {
    pub path: Option<String>,
}
#[derive(Component, Clone, Copy)]
pub struct SelfSpin {
    pub rate: f32,
}
#[derive(Component)]
pub struct Backdrop;

#[derive(Resource, Clone, Copy, Default)]
pub struct ElapsedSeconds(pub f32);

pub fn sys_apply_self_spin(elapsed: Res<ElapsedSeconds>, mut spinners: Query<(&SelfSpin, &mut Transform3D)>) {
    for (spin, mut transform) in spinners.iter_mut() {
        transform.rotation = Quat::from_rotation_y(elapsed.0 * spin.rate);
    }
}

pub fn sys_propagate_transforms(
    roots: Query<Entity, (With<WorldTransform3D>, Without<Parent>)>,
    mut nodes: Query<(&Transform3D, Option<&Children>, &mut WorldTransform3D)>,
) {
    let mut stack: SmallVec<[(Entity, Mat4); 16]> = roots.iter().map(|entity| (entity, Mat4::IDENTITY)).collect();
    while let Some((entity, parent_world)) = stack.pop() {
        let Ok((local, children, mut world)) = nodes.get_mut(entity) else {
            continue;
        };
        let world_matrix = parent_world * local.matrix();
        world.0 = world_matrix;
        if let Some(children) = children {
            stack.extend(children.0.iter().map(|child| (*child, world_matrix)));
        }
    }
}

/// Root orientation for a carousel tilted by `pitch` and turned by `yaw`.
pub fn carousel_rotation(pitch: f32, yaw: f32) -> Quat {
    Quat::from_euler(EulerRot::XYZ, pitch, yaw, 0.0)
}

pub struct CarouselScene {
    pub world: World,
    schedule: Schedule,
    root: Entity,
    members: Vec<Entity>,
    backdrop: Option<Entity>,
}

impl CarouselScene {
    pub fn new(layout: &CarouselLayoutConfig, spin: &SpinConfig, backdrop: &BackdropConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(ElapsedSeconds::default());

        let root = world
            .spawn((
                CarouselRoot,
                Transform3D {
                    translation: Vec3::new(0.0, layout.vertical_offset, 0.0),
                    rotation: carousel_rotation(layout.tilt_radians, 0.0),
                    scale: Vec3::ONE,
                },
                WorldTransform3D::default(),
                Children::default(),
            ))
            .id();

        let count = layout.members.len().max(1);
        let mut members = Vec::with_capacity(layout.members.len());
        for (index, member) in layout.members.iter().enumerate() {
            let angle = index as f32 / count as f32 * std::f32::consts::TAU;
            let translation = Vec3::new(layout.orbit_radius * angle.cos(), 0.0, layout.orbit_radius * angle.sin());
            let entity = world
                .spawn((
                    MemberTag { index },
                    Transform3D::from_translation(translation),
                    WorldTransform3D::default(),
                    SphereCollider { radius: layout.member_radius },
                    SelfSpin { rate: spin.rate },
                    SurfaceTexture { path: member.texture.clone() },
                    Parent(root),
                ))
                .id();
            members.push(entity);
        }
        if let Some(mut children) = world.get_mut::<Children>(root) {
            children.0.extend(members.iter().copied());
        }

        let backdrop = backdrop.enabled.then(|| {
            world
                .spawn((
                    Backdrop,
                    Transform3D::default(),
                    WorldTransform3D::default(),
                    SphereCollider { radius: backdrop.radius },
                    SurfaceTexture { path: backdrop.texture.clone() },
                ))
                .id()
        });

        let mut schedule = Schedule::default();
        schedule.add_systems((sys_apply_self_spin, sys_propagate_transforms).chain());

        let mut scene = Self { world, schedule, root, members, backdrop };
        scene.tick(0.0);
        scene
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn member_entities(&self) -> &[Entity] {
        &self.members
    }

    pub fn backdrop(&self) -> Option<Entity> {
        self.backdrop
    }

    pub fn set_root_rotation(&mut self, rotation: Quat) {
        if let Some(mut transform) = self.world.get_mut::<Transform3D>(self.root) {
            transform.rotation = rotation;
        }
    }

    pub fn root_rotation(&self) -> Quat {
        self.world.get::<Transform3D>(self.root).map(|t| t.rotation).unwrap_or(Quat::IDENTITY)
    }

    /// Hangs extra pickable geometry (rings, moons) under `parent`.
    pub fn attach_geometry(&mut self, parent: Entity, translation: Vec3, radius: f32) -> Option<Entity> {
        self.world.get::<Transform3D>(parent)?;
        let child = self
            .world
            .spawn((
                Transform3D::from_translation(translation),
                WorldTransform3D::default(),
                SphereCollider { radius },
                Parent(parent),
            ))
            .id();
        match self.world.get_mut::<Children>(parent) {
            Some(mut children) => children.0.push(child),
            None => {
                self.world.entity_mut(parent).insert(Children(vec![child]));
            }
        }
        Some(child)
    }

    pub fn set_texture(&mut self, entity: Entity, path: impl Into<String>) -> bool {
        match self.world.get_mut::<SurfaceTexture>(entity) {
            Some(mut texture) => {
                texture.path = Some(path.into());
                true
            }
            None => false,
        }
    }

    pub fn member_transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn world_matrix(&self, entity: Entity) -> Option<Mat4> {
        self.world.get::<WorldTransform3D>(entity).map(|world| world.0)
    }

    /// Per-frame update: member self-spin, then world transform propagation.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        self.world.insert_resource(ElapsedSeconds(elapsed_seconds));
        self.schedule.run(&mut self.world);
    }

    fn local_matrix(&self, entity: Entity) -> Mat4 {
        self.world.get::<Transform3D>(entity).map(Transform3D::matrix).unwrap_or(Mat4::IDENTITY)
    }
}

impl Pickable for CarouselScene {
    /// Walks the carousel group from the live local transforms, so a rotation applied
    /// earlier in the same input callback is already visible to the ray.
    fn intersect(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = Vec::new();
        let mut stack: SmallVec<[(Entity, Mat4); 16]> = SmallVec::new();
        stack.push((self.root, self.local_matrix(self.root)));
        while let Some((entity, world)) = stack.pop() {
            if let Some(collider) = self.world.get::<SphereCollider>(entity) {
                let (scale, _, center) = world.to_scale_rotation_translation();
                let radius = collider.radius * scale.abs().max_element();
                if let Some(distance) = ray_sphere_intersection(ray.origin, ray.direction, center, radius) {
                    hits.push(RayHit { distance, entity });
                }
            }
            if let Some(children) = self.world.get::<Children>(entity) {
                for &child in &children.0 {
                    stack.push((child, world * self.local_matrix(child)));
                }
            }
        }
        hits
    }

    fn resolve_owner(&self, entity: Entity) -> Option<Entity> {
        let mut current = entity;
        for _ in 0..64 {
            if self.world.get::<MemberTag>(current).is_some() {
                return Some(current);
            }
            current = self.world.get::<Parent>(current)?.0;
        }
        None
    }
}
