use crate::gesture::StepDirection;
use anyhow::{bail, Result};
use bevy_ecs::prelude::Entity;

pub const RING_SIZE: usize = 4;

/// One focusable planet. `handle` points at the scene entity; the carousel never owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct RingMember {
    pub index: usize,
    pub name: String,
    pub handle: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarouselState {
    pub step_counter: i64,
    pub current_index: usize,
    /// Cumulative; never wrapped.
    pub yaw_offset: f32,
    pub pitch_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub direction: StepDirection,
    pub index: usize,
    pub previous_index: usize,
    pub wrapped: bool,
}

impl AdvanceOutcome {
    /// Backward step from index 0 to the last member.
    pub fn underflowed(&self, ring_size: usize) -> bool {
        self.direction == StepDirection::Backward && self.previous_index == 0 && self.index + 1 == ring_size
    }
}

pub struct Carousel {
    members: Vec<RingMember>,
    state: CarouselState,
}

impl Carousel {
    pub fn new(members: Vec<RingMember>) -> Result<Self> {
        if members.is_empty() {
            bail!("Carousel requires at least one ring member");
        }
        if let Some((position, member)) = members.iter().enumerate().find(|(i, m)| m.index != *i) {
            bail!("Ring member '{}' has index {} but sits at position {position}", member.name, member.index);
        }
        Ok(Self { members, state: CarouselState::default() })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[RingMember] {
        &self.members
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_member(&self) -> &RingMember {
        &self.members[self.state.current_index]
    }

    pub fn member_by_handle(&self, handle: Entity) -> Option<&RingMember> {
        self.members.iter().find(|member| member.handle == handle)
    }

    pub fn apply_advance(&mut self, direction: StepDirection) -> AdvanceOutcome {
        let previous_index = self.state.current_index;
        self.state.step_counter += direction.sign();
        let index = self.state.step_counter.rem_euclid(self.members.len() as i64) as usize;
        self.state.current_index = index;
        AdvanceOutcome { direction, index, previous_index, wrapped: index == 0 }
    }

    /// Free rotation; bypasses the step counter.
    pub fn apply_drag(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.state.yaw_offset += delta_yaw;
        self.state.pitch_offset += delta_pitch;
    }

    pub(crate) fn apply_transition_yaw(&mut self, delta_yaw: f32) {
        self.state.yaw_offset += delta_yaw;
    }

    /// Angular distance between neighbouring members.
    pub fn yaw_quantum(&self) -> f32 {
        std::f32::consts::TAU / self.members.len() as f32
    }
}
