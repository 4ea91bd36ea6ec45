use crate::gesture::{RawInput, TouchPoint};
use winit::event::{MouseScrollDelta, Touch, TouchPhase, WindowEvent};

/// winit reports one finger per event; this keeps the full set of active touches so
/// the gesture layer always sees every finger that is down.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<TouchPoint>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[TouchPoint] {
        &self.active
    }

    pub fn track(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) -> RawInput {
        let point = TouchPoint::new(id, x, y);
        match phase {
            TouchPhase::Started => {
                self.upsert(point);
                RawInput::TouchStart { touches: self.active.clone() }
            }
            TouchPhase::Moved => {
                self.upsert(point);
                RawInput::TouchMove { touches: self.active.clone() }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active.retain(|touch| touch.id != id);
                RawInput::TouchEnd { touches: self.active.clone() }
            }
        }
    }

    fn upsert(&mut self, point: TouchPoint) {
        match self.active.iter_mut().find(|touch| touch.id == point.id) {
            Some(existing) => *existing = point,
            None => self.active.push(point),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputTranslator {
    touches: TouchTracker,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, ev: &WindowEvent) -> Option<RawInput> {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                Some(RawInput::Wheel { delta_y })
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(RawInput::PointerMove { x: position.x as f32, y: position.y as f32 })
            }
            WindowEvent::Touch(Touch { id, phase, location, .. }) => {
                Some(self.touches.track(*id, *phase, location.x as f32, location.y as f32))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_finger_start_reports_both_touches() {
        let mut tracker = TouchTracker::new();
        tracker.track(7, TouchPhase::Started, 10.0, 10.0);
        let raw = tracker.track(9, TouchPhase::Started, 50.0, 10.0);
        assert_eq!(
            raw,
            RawInput::TouchStart { touches: vec![TouchPoint::new(7, 10.0, 10.0), TouchPoint::new(9, 50.0, 10.0)] }
        );
    }

    #[test]
    fn moves_update_in_place_and_ends_report_remaining() {
        let mut tracker = TouchTracker::new();
        tracker.track(1, TouchPhase::Started, 0.0, 0.0);
        tracker.track(2, TouchPhase::Started, 5.0, 0.0);
        let moved = tracker.track(1, TouchPhase::Moved, 3.0, 4.0);
        assert_eq!(
            moved,
            RawInput::TouchMove { touches: vec![TouchPoint::new(1, 3.0, 4.0), TouchPoint::new(2, 5.0, 0.0)] }
        );
        let ended = tracker.track(1, TouchPhase::Cancelled, 3.0, 4.0);
        assert_eq!(ended, RawInput::TouchEnd { touches: vec![TouchPoint::new(2, 5.0, 0.0)] });
        assert_eq!(tracker.active().len(), 1);
    }
}
