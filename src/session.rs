use crate::camera3d::CarouselCamera;
use crate::carousel::{AdvanceOutcome, Carousel, CarouselState, RingMember};
use crate::config::CarouselConfig;
use crate::events::{CarouselEvent, EventBus};
use crate::gesture::{GestureIntent, GestureNormalizer, RawInput, StepDirection};
use crate::picking::{self, ViewportRect};
use crate::scene::{carousel_rotation, CarouselScene};
use crate::throttle::ThrottleWindow;
use crate::transition::TransitionAnimator;
use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec2};
use std::time::Duration;

/// What one raw input did to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputOutcome {
    pub suppress_default: bool,
    pub advance: Option<AdvanceOutcome>,
    pub throttled: bool,
    pub picked: Option<usize>,
}

/// Everything the external renderer and label collaborator need for one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub current_index: usize,
    pub root_rotation: Quat,
    pub member_matrices: Vec<(usize, Mat4)>,
    pub label_offset: f32,
    pub heading: Option<String>,
    pub camera_distance: f32,
    pub view_projection: Mat4,
}

/// Owns every navigation component and routes intents between them on a single thread.
pub struct CarouselSession {
    normalizer: GestureNormalizer,
    throttle: ThrottleWindow,
    carousel: Carousel,
    animator: TransitionAnimator,
    scene: CarouselScene,
    camera: CarouselCamera,
    viewport: ViewportRect,
    tilt: f32,
    heading: Option<String>,
    events: EventBus,
}

impl CarouselSession {
    pub fn new(config: &CarouselConfig) -> Result<Self> {
        config.validate().context("Cannot build carousel session")?;
        let scene = CarouselScene::new(&config.carousel, &config.spin, &config.backdrop);
        let members = config
            .carousel
            .members
            .iter()
            .zip(scene.member_entities())
            .enumerate()
            .map(|(index, (member, handle))| RingMember { index, name: member.name.clone(), handle: *handle })
            .collect();
        let carousel = Carousel::new(members)?;
        let animator =
            TransitionAnimator::new(carousel.len(), config.transition.duration(), config.transition.ease);
        let camera = CarouselCamera {
            target: glam::Vec3::ZERO,
            distance: config.camera.distance.clamp(config.camera.zoom_min_distance, config.camera.zoom_max_distance),
            min_distance: config.camera.zoom_min_distance,
            max_distance: config.camera.zoom_max_distance,
            fov_y_radians: config.camera.fov_y_degrees.to_radians(),
            near: config.camera.near,
            far: config.camera.far,
        };
        Ok(Self {
            normalizer: GestureNormalizer::new(config.gestures.drag_threshold_px, config.gestures.drag_sensitivity),
            throttle: ThrottleWindow::new(config.throttle.window()),
            carousel,
            animator,
            scene,
            camera,
            viewport: ViewportRect::from_size(config.window.width as f32, config.window.height as f32),
            tilt: config.carousel.tilt_radians,
            heading: None,
            events: EventBus::default(),
        })
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn state(&self) -> &CarouselState {
        self.carousel.state()
    }

    pub fn scene(&self) -> &CarouselScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut CarouselScene {
        &mut self.scene
    }

    pub fn animator(&self) -> &TransitionAnimator {
        &self.animator
    }

    pub fn camera(&self) -> &CarouselCamera {
        &self.camera
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn label_offset(&self) -> f32 {
        self.animator.label_offset()
    }

    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportRect) {
        self.viewport = viewport;
    }

    pub fn drain_events(&mut self) -> Vec<CarouselEvent> {
        self.events.drain()
    }

    pub fn handle_input(&mut self, raw: &RawInput, now: Duration) -> InputOutcome {
        let normalized = self.normalizer.normalize(raw);
        let mut outcome = InputOutcome { suppress_default: normalized.suppress_default, ..Default::default() };
        // Intents arrive drag-before-pick, so a pick sees this event's rotation.
        for intent in normalized.intents {
            self.dispatch(intent, now, &mut outcome);
        }
        outcome
    }

    pub fn dispatch(&mut self, intent: GestureIntent, now: Duration, outcome: &mut InputOutcome) {
        match intent {
            GestureIntent::Advance { direction } => {
                if self.throttle.accept(&intent, now) {
                    outcome.advance = Some(self.advance(direction, now));
                } else {
                    let remaining = self.throttle.remaining(now);
                    log::debug!("[carousel] advance throttled ({} ms left)", remaining.as_millis());
                    self.events.push(CarouselEvent::AdvanceThrottled { remaining_ms: remaining.as_millis() as u64 });
                    outcome.throttled = true;
                }
            }
            GestureIntent::DragRotate { delta_yaw, delta_pitch } => {
                self.carousel.apply_drag(delta_yaw, delta_pitch);
                self.sync_root_rotation();
                self.events.push(CarouselEvent::Dragged { delta_yaw, delta_pitch });
            }
            GestureIntent::PinchZoom { scale } => {
                let distance = self.camera.zoom(scale);
                self.events.push(CarouselEvent::Zoomed { factor: scale, distance });
            }
            GestureIntent::Pick { x, y } => {
                outcome.picked = self.pick(Vec2::new(x, y));
            }
        }
    }

    fn advance(&mut self, direction: StepDirection, now: Duration) -> AdvanceOutcome {
        let outcome = self.carousel.apply_advance(direction);
        let plan = self.animator.on_advance(&outcome, now);
        log::info!(
            "[carousel] step {:+} -> index {} ({})",
            direction.sign(),
            outcome.index,
            self.carousel.current_member().name
        );
        self.events.push(CarouselEvent::Advanced {
            index: outcome.index,
            wrapped: outcome.wrapped,
            direction: direction.sign(),
        });
        if plan.label_snap.is_some() {
            let target = TransitionAnimator::resting_label_offset(outcome.index);
            log::debug!("[carousel] label stack snaps to {target}");
            self.events.push(CarouselEvent::LabelSnap { target });
        }
        outcome
    }

    /// Resolves the pointer to a ring member and updates the heading on a hit.
    pub fn pick(&mut self, screen: Vec2) -> Option<usize> {
        let camera = self.camera.to_camera();
        let member =
            picking::pick(screen, &self.viewport, &camera, &self.scene, self.carousel.members())?;
        let (index, name) = (member.index, member.name.clone());
        if self.heading.as_deref() != Some(name.as_str()) {
            log::info!("[carousel] heading -> {name}");
            self.events.push(CarouselEvent::HeadingChanged { index, name: name.clone() });
            self.heading = Some(name);
        }
        Some(index)
    }

    /// Per-frame update. `now` is session time, which also drives the member self-spin.
    pub fn frame(&mut self, now: Duration) -> FrameSnapshot {
        self.animator.update(now, &mut self.carousel);
        self.sync_root_rotation();
        self.scene.tick(now.as_secs_f32());
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let member_matrices = self
            .carousel
            .members()
            .iter()
            .filter_map(|member| self.scene.world_matrix(member.handle).map(|matrix| (member.index, matrix)))
            .collect();
        FrameSnapshot {
            current_index: self.carousel.current_index(),
            root_rotation: self.scene.root_rotation(),
            member_matrices,
            label_offset: self.animator.label_offset(),
            heading: self.heading.clone(),
            camera_distance: self.camera.distance,
            view_projection: self.camera.to_camera().view_projection(self.viewport.aspect()),
        }
    }

    fn sync_root_rotation(&mut self) {
        let state = self.carousel.state();
        let rotation = carousel_rotation(self.tilt + state.pitch_offset, state.yaw_offset);
        self.scene.set_root_rotation(rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::TouchPoint;

    fn session() -> CarouselSession {
        CarouselSession::new(&CarouselConfig::default()).expect("session")
    }

    #[test]
    fn touch_drag_rotates_root_before_pick() {
        let mut session = session();
        let before = session.scene().root_rotation();
        session.handle_input(&RawInput::TouchStart { touches: vec![TouchPoint::new(0, 640.0, 360.0)] }, Duration::ZERO);
        let outcome = session.handle_input(
            &RawInput::TouchMove { touches: vec![TouchPoint::new(0, 700.0, 360.0)] },
            Duration::from_millis(16),
        );
        assert!(outcome.suppress_default);
        assert!(session.scene().root_rotation().angle_between(before) > 0.1);
        assert!((session.state().yaw_offset - 0.3).abs() < 1e-5);
    }

    #[test]
    fn pinch_changes_camera_distance() {
        let mut session = session();
        let start = session.camera().distance;
        session.handle_input(
            &RawInput::TouchStart { touches: vec![TouchPoint::new(0, 100.0, 100.0), TouchPoint::new(1, 200.0, 100.0)] },
            Duration::ZERO,
        );
        session.handle_input(
            &RawInput::TouchMove { touches: vec![TouchPoint::new(0, 100.0, 100.0), TouchPoint::new(1, 250.0, 100.0)] },
            Duration::from_millis(16),
        );
        assert!((session.camera().distance - start / 1.5).abs() < 1e-4);
        let events = session.drain_events();
        assert!(matches!(events.as_slice(), [CarouselEvent::Zoomed { .. }]));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = CarouselConfig::default();
        config.carousel.members.clear();
        assert!(CarouselSession::new(&config).is_err());
    }
}
