use crate::carousel::{AdvanceOutcome, Carousel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    Power2InOut,
    Power3InOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::Power3InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    CarouselYaw,
    LabelOffset,
}

/// `By` layers a relative delta onto whatever else moves the property.
/// `To` captures the value on its first sample and overrides it until done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    By(f32),
    To(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u64);

#[derive(Debug, Clone)]
struct Tween {
    property: AnimatedProperty,
    motion: Motion,
    start: Duration,
    duration: Duration,
    ease: Ease,
    applied: f32,
    from: Option<f32>,
    finished: bool,
}

impl Tween {
    fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

#[derive(Debug, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
    next_handle: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        property: AnimatedProperty,
        motion: Motion,
        start: Duration,
        duration: Duration,
        ease: Ease,
    ) -> TweenHandle {
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.tweens.push(Tween {
            property,
            motion,
            start,
            duration,
            ease,
            applied: 0.0,
            from: None,
            finished: false,
        });
        handle
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advances every tween on `property` to `now` and returns the property's new value.
    /// Tweens run in schedule order, so a later `To` wins over earlier layers.
    pub fn sample(&mut self, property: AnimatedProperty, now: Duration, current: f32) -> f32 {
        let mut value = current;
        for tween in self.tweens.iter_mut().filter(|tween| tween.property == property) {
            if now < tween.start {
                continue;
            }
            let progress = tween.progress(now);
            let eased = tween.ease.apply(progress);
            match tween.motion {
                Motion::By(delta) => {
                    value += delta * (eased - tween.applied);
                    tween.applied = eased;
                }
                Motion::To(target) => {
                    let from = *tween.from.get_or_insert(value);
                    value = from + (target - from) * eased;
                }
            }
            tween.finished = progress >= 1.0;
        }
        self.tweens.retain(|tween| !tween.finished);
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub yaw: TweenHandle,
    pub label: TweenHandle,
    pub label_snap: Option<TweenHandle>,
}

/// Turns accepted steps into eased yaw and label-stack motion.
pub struct TransitionAnimator {
    timeline: Timeline,
    duration: Duration,
    ease: Ease,
    ring_size: usize,
    yaw_quantum: f32,
    label_offset: f32,
}

impl TransitionAnimator {
    pub fn new(ring_size: usize, duration: Duration, ease: Ease) -> Self {
        let ring_size = ring_size.max(1);
        Self {
            timeline: Timeline::new(),
            duration,
            ease,
            ring_size,
            yaw_quantum: std::f32::consts::TAU / ring_size as f32,
            label_offset: 0.0,
        }
    }

    pub fn label_offset(&self) -> f32 {
        self.label_offset
    }

    pub fn is_idle(&self) -> bool {
        self.timeline.is_idle()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Label offset the stack settles at for `index`, in label-height units.
    pub fn resting_label_offset(index: usize) -> f32 {
        0.0 - index as f32
    }

    pub fn on_advance(&mut self, outcome: &AdvanceOutcome, now: Duration) -> TransitionPlan {
        let sign = outcome.direction.sign_f32();
        let label = self.timeline.schedule(
            AnimatedProperty::LabelOffset,
            Motion::By(-sign),
            now,
            self.duration,
            self.ease,
        );
        let label_snap = (outcome.wrapped || outcome.underflowed(self.ring_size)).then(|| {
            self.timeline.schedule(
                AnimatedProperty::LabelOffset,
                Motion::To(Self::resting_label_offset(outcome.index)),
                now,
                self.duration,
                self.ease,
            )
        });
        let yaw = self.timeline.schedule(
            AnimatedProperty::CarouselYaw,
            Motion::By(-sign * self.yaw_quantum),
            now,
            self.duration,
            self.ease,
        );
        TransitionPlan { yaw, label, label_snap }
    }

    pub fn update(&mut self, now: Duration, carousel: &mut Carousel) {
        if self.timeline.is_idle() {
            return;
        }
        let yaw = carousel.state().yaw_offset;
        let next_yaw = self.timeline.sample(AnimatedProperty::CarouselYaw, now, yaw);
        carousel.apply_transition_yaw(next_yaw - yaw);
        self.label_offset = self.timeline.sample(AnimatedProperty::LabelOffset, now, self.label_offset);
    }
}
