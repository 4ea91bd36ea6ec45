use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 10.0;
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    pub fn sign(self) -> i64 {
        match self {
            StepDirection::Forward => 1,
            StepDirection::Backward => -1,
        }
    }

    pub fn sign_f32(self) -> f32 {
        self.sign() as f32
    }
}

/// Abstract navigation intent produced from one raw input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureIntent {
    Advance { direction: StepDirection },
    DragRotate { delta_yaw: f32, delta_pitch: f32 },
    PinchZoom { scale: f32 },
    Pick { x: f32, y: f32 },
}

impl fmt::Display for GestureIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureIntent::Advance { direction } => write!(f, "Advance({:+})", direction.sign()),
            GestureIntent::DragRotate { delta_yaw, delta_pitch } => {
                write!(f, "DragRotate(yaw={delta_yaw:.4}, pitch={delta_pitch:.4})")
            }
            GestureIntent::PinchZoom { scale } => write!(f, "PinchZoom({scale:.4})"),
            GestureIntent::Pick { x, y } => write!(f, "Pick({x:.1}, {y:.1})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    #[serde(default)]
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Platform-neutral input event. Touch variants always carry the full set of
/// active touches; `TouchEnd` carries the touches that remain down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawInput {
    Wheel { delta_y: f32 },
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd {
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    PointerMove { x: f32, y: f32 },
}

pub type IntentBatch = SmallVec<[GestureIntent; 2]>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub intents: IntentBatch,
    /// Set for touch events so the host can stop native scrolling from fighting the drag.
    pub suppress_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchSession {
    initial_distance: f32,
}

pub struct GestureNormalizer {
    drag_threshold: f32,
    sensitivity: f32,
    drag_anchor: Option<Vec2>,
    pinch: Option<PinchSession>,
}

impl GestureNormalizer {
    pub fn new(drag_threshold: f32, sensitivity: f32) -> Self {
        Self { drag_threshold, sensitivity, drag_anchor: None, pinch: None }
    }

    pub fn pinch_active(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn normalize(&mut self, raw: &RawInput) -> NormalizedInput {
        let mut out = NormalizedInput::default();
        match raw {
            RawInput::Wheel { delta_y } => {
                // Scroll direction does not pick the step direction; every tick advances.
                let scrolled_up = *delta_y < 0.0;
                log::trace!(
                    "[input] wheel {} ({delta_y}) -> advance forward",
                    if scrolled_up { "up" } else { "down" }
                );
                out.intents.push(GestureIntent::Advance { direction: StepDirection::Forward });
            }
            RawInput::TouchStart { touches } => {
                out.suppress_default = true;
                self.touch_start(touches);
            }
            RawInput::TouchMove { touches } => {
                out.suppress_default = true;
                self.touch_move(touches, &mut out.intents);
            }
            RawInput::TouchEnd { touches } => {
                out.suppress_default = true;
                self.pinch = None;
                self.drag_anchor = match touches.as_slice() {
                    [remaining] => Some(remaining.position()),
                    _ => None,
                };
            }
            RawInput::PointerMove { x, y } => {
                out.intents.push(GestureIntent::Pick { x: *x, y: *y });
            }
        }
        out
    }

    fn touch_start(&mut self, touches: &[TouchPoint]) {
        match touches {
            [single] => {
                self.pinch = None;
                self.drag_anchor = Some(single.position());
            }
            [first, second] => {
                self.drag_anchor = None;
                let distance = first.position().distance(second.position());
                self.pinch = (distance.is_finite() && distance > 0.0)
                    .then_some(PinchSession { initial_distance: distance });
            }
            _ => {}
        }
    }

    fn touch_move(&mut self, touches: &[TouchPoint], intents: &mut IntentBatch) {
        match touches {
            [single] => {
                let position = single.position();
                let anchor = self.drag_anchor.get_or_insert(position);
                let delta = position - *anchor;
                let mut delta_yaw = 0.0;
                let mut delta_pitch = 0.0;
                if delta.x.abs() > self.drag_threshold {
                    delta_yaw = delta.x * self.sensitivity;
                    anchor.x = position.x;
                }
                if delta.y.abs() > self.drag_threshold {
                    delta_pitch = delta.y * self.sensitivity;
                    anchor.y = position.y;
                }
                if delta_yaw != 0.0 || delta_pitch != 0.0 {
                    intents.push(GestureIntent::DragRotate { delta_yaw, delta_pitch });
                }
                intents.push(GestureIntent::Pick { x: position.x, y: position.y });
            }
            [first, second] => {
                let Some(session) = self.pinch.as_mut() else {
                    return;
                };
                let distance = first.position().distance(second.position());
                if !distance.is_finite() || distance <= 0.0 {
                    return;
                }
                let scale = distance / session.initial_distance;
                session.initial_distance = distance;
                intents.push(GestureIntent::PinchZoom { scale });
            }
            _ => {}
        }
    }
}

impl Default for GestureNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_DRAG_SENSITIVITY)
    }
}
