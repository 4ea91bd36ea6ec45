use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CarouselEvent {
    Advanced { index: usize, wrapped: bool, direction: i64 },
    AdvanceThrottled { remaining_ms: u64 },
    LabelSnap { target: f32 },
    Dragged { delta_yaw: f32, delta_pitch: f32 },
    Zoomed { factor: f32, distance: f32 },
    HeadingChanged { index: usize, name: String },
}

impl fmt::Display for CarouselEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarouselEvent::Advanced { index, wrapped, direction } => {
                write!(f, "Advanced index={index} wrapped={wrapped} direction={direction:+}")
            }
            CarouselEvent::AdvanceThrottled { remaining_ms } => {
                write!(f, "AdvanceThrottled remaining_ms={remaining_ms}")
            }
            CarouselEvent::LabelSnap { target } => write!(f, "LabelSnap target={target:.1}"),
            CarouselEvent::Dragged { delta_yaw, delta_pitch } => {
                write!(f, "Dragged yaw={delta_yaw:.4} pitch={delta_pitch:.4}")
            }
            CarouselEvent::Zoomed { factor, distance } => {
                write!(f, "Zoomed factor={factor:.3} distance={distance:.3}")
            }
            CarouselEvent::HeadingChanged { index, name } => write!(f, "HeadingChanged index={index} name={name}"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<CarouselEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: CarouselEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<CarouselEvent> {
        self.events.drain(..).collect()
    }
}
