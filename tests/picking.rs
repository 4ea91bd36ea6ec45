use bevy_ecs::prelude::Entity;
use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use planet_carousel::camera3d::Camera3D;
use planet_carousel::carousel::RingMember;
use planet_carousel::config::CarouselConfig;
use planet_carousel::events::CarouselEvent;
use planet_carousel::gesture::RawInput;
use planet_carousel::picking::{pick, pick_along_ray, Pickable, Ray, RayHit, ViewportRect};
use planet_carousel::CarouselSession;
use std::collections::HashMap;
use std::time::Duration;

struct FixedHits {
    hits: Vec<RayHit>,
    owners: HashMap<Entity, Entity>,
}

impl Pickable for FixedHits {
    fn intersect(&self, _ray: &Ray) -> Vec<RayHit> {
        self.hits.clone()
    }

    fn resolve_owner(&self, entity: Entity) -> Option<Entity> {
        Some(self.owners.get(&entity).copied().unwrap_or(entity))
    }
}

fn members(world: &mut World, count: usize) -> Vec<RingMember> {
    (0..count)
        .map(|index| RingMember { index, name: format!("planet-{index}"), handle: world.spawn_empty().id() })
        .collect()
}

fn forward_ray() -> Ray {
    Ray::new(Vec3::new(0.0, 0.0, 9.0), Vec3::NEG_Z).expect("ray")
}

#[test]
fn nearest_hit_wins_regardless_of_report_order() {
    let mut world = World::new();
    let ring = members(&mut world, 4);
    let scene = FixedHits {
        hits: vec![
            RayHit { distance: 7.0, entity: ring[2].handle },
            RayHit { distance: 3.0, entity: ring[1].handle },
        ],
        owners: HashMap::new(),
    };
    let picked = pick_along_ray(&forward_ray(), &scene, &ring).expect("hit");
    assert_eq!(picked.index, 1);
}

#[test]
fn nested_geometry_resolves_to_owning_member() {
    let mut world = World::new();
    let ring = members(&mut world, 4);
    let moon = world.spawn_empty().id();
    let scene = FixedHits {
        hits: vec![RayHit { distance: 2.0, entity: moon }, RayHit { distance: 5.0, entity: ring[0].handle }],
        owners: HashMap::from([(moon, ring[3].handle)]),
    };
    let picked = pick_along_ray(&forward_ray(), &scene, &ring).expect("hit");
    assert_eq!(picked.name, "planet-3");
}

#[test]
fn hits_on_foreign_entities_pick_nothing() {
    let mut world = World::new();
    let ring = members(&mut world, 2);
    let stray = world.spawn_empty().id();
    let scene = FixedHits { hits: vec![RayHit { distance: 1.0, entity: stray }], owners: HashMap::new() };
    assert!(pick_along_ray(&forward_ray(), &scene, &ring).is_none());
}

#[test]
fn pointer_outside_viewport_picks_nothing() {
    let mut world = World::new();
    let ring = members(&mut world, 1);
    let scene = FixedHits { hits: vec![RayHit { distance: 1.0, entity: ring[0].handle }], owners: HashMap::new() };
    let camera = Camera3D::new(Vec3::new(0.0, 0.0, 9.0), Vec3::ZERO, 25f32.to_radians(), 0.1, 1000.0);
    let viewport = ViewportRect::from_size(800.0, 600.0);
    assert!(pick(Vec2::new(-5.0, 10.0), &viewport, &camera, &scene, &ring).is_none());
    assert!(pick(Vec2::new(400.0, 300.0), &viewport, &camera, &scene, &ring).is_some());
}

/// Screen position of a point on the upper half of the member's sphere. The default layout
/// sits low in the frame, so the sphere centre itself projects just below the viewport.
fn screen_position(session: &CarouselSession, member: usize) -> Vec2 {
    let frame = session.snapshot();
    let (_, matrix) = frame.member_matrices.iter().find(|(index, _)| *index == member).expect("member matrix");
    let radius = CarouselConfig::default().carousel.member_radius;
    let target = matrix.w_axis.truncate() + Vec3::Y * radius * 0.7;
    let clip = frame.view_projection * target.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0, "member {member} should be on screen, ndc {ndc:?}");
    let size = session.viewport().size;
    Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y)
}

#[test]
fn viewport_centre_lands_on_front_planet() {
    let mut session = CarouselSession::new(&CarouselConfig::default()).expect("session");
    session.frame(Duration::ZERO);
    let size = session.viewport().size;
    assert_eq!(session.pick(size * 0.5), Some(1));
}

#[test]
fn hovering_front_planet_sets_heading() {
    let mut session = CarouselSession::new(&CarouselConfig::default()).expect("session");
    session.frame(Duration::ZERO);
    // Member 1 sits at +Z, facing the camera, before any rotation.
    let position = screen_position(&session, 1);
    let outcome = session.handle_input(&RawInput::PointerMove { x: position.x, y: position.y }, Duration::ZERO);
    assert_eq!(outcome.picked, Some(1));
    assert_eq!(session.heading(), Some("Earth"));
    assert_eq!(session.drain_events(), vec![CarouselEvent::HeadingChanged { index: 1, name: "Earth".into() }]);

    // Same member again does not re-announce the heading.
    session.handle_input(&RawInput::PointerMove { x: position.x, y: position.y }, Duration::from_millis(16));
    assert!(session.drain_events().is_empty());
}

#[test]
fn pick_follows_ring_after_a_step() {
    let mut session = CarouselSession::new(&CarouselConfig::default()).expect("session");
    session.handle_input(&RawInput::Wheel { delta_y: 1.0 }, Duration::ZERO);
    let mut t = 0;
    while t <= 1200 {
        session.frame(Duration::from_millis(t));
        t += 16;
    }
    // Yaw moved by a negative quarter turn, so member 0 is now in front.
    let front = (0..4)
        .max_by(|a, b| {
            let za = session.snapshot().member_matrices[*a].1.w_axis.z;
            let zb = session.snapshot().member_matrices[*b].1.w_axis.z;
            za.total_cmp(&zb)
        })
        .expect("front member");
    let position = screen_position(&session, front);
    let picked = session.pick(position);
    assert_eq!(picked, Some(front));
    assert_eq!(session.heading(), Some(session.carousel().members()[front].name.as_str()));
}

#[test]
fn empty_space_keeps_previous_heading() {
    let mut session = CarouselSession::new(&CarouselConfig::default()).expect("session");
    session.frame(Duration::ZERO);
    let position = screen_position(&session, 1);
    session.pick(position);
    assert_eq!(session.pick(Vec2::new(2.0, 2.0)), None);
    assert_eq!(session.heading(), Some("Earth"));
}
