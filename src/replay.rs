use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::CarouselConfig;
use crate::events::CarouselEvent;
use crate::gesture::RawInput;
use crate::picking::ViewportRect;
use crate::session::CarouselSession;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayFixture {
    #[serde(default)]
    pub viewport: Option<[f32; 2]>,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    pub inputs: Vec<TimedInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimedInput {
    pub at_ms: u64,
    pub input: RawInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayOutput {
    pub steps: Vec<StepResult>,
    pub final_state: FinalState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    pub at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub throttled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picked: Option<usize>,
    pub events: Vec<CarouselEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalState {
    pub at_ms: u64,
    pub current_index: usize,
    pub step_counter: i64,
    pub yaw_offset: f32,
    pub pitch_offset: f32,
    pub label_offset: f32,
    pub camera_distance: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

/// Longest trace the harness will render, inputs plus settle time.
pub const MAX_REPLAY_MS: u64 = 60 * 60 * 1000;

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_settle_ms() -> u64 {
    1500
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<ReplayFixture> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening replay fixture '{}'", path.display()))?;
    let fixture = serde_json::from_reader(file)
        .with_context(|| format!("parsing replay fixture '{}'", path.display()))?;
    Ok(fixture)
}

/// Replays a timestamped input trace, rendering frames at a fixed cadence in between.
pub fn run_fixture(fixture: &ReplayFixture, config: &CarouselConfig) -> Result<ReplayOutput> {
    if fixture.frame_interval_ms == 0 {
        bail!("frame_interval_ms must be positive");
    }
    if let Some(pair) = fixture.inputs.windows(2).find(|pair| pair[1].at_ms < pair[0].at_ms) {
        bail!("replay inputs must be ordered by time ({} ms follows {} ms)", pair[1].at_ms, pair[0].at_ms);
    }
    let last_input_ms = fixture.inputs.last().map(|timed| timed.at_ms).unwrap_or(0);
    let end_ms = last_input_ms
        .checked_add(fixture.settle_ms)
        .filter(|end| *end <= MAX_REPLAY_MS)
        .with_context(|| {
            format!(
                "replay ends past the {MAX_REPLAY_MS} ms limit (last input {last_input_ms} ms, settle {} ms)",
                fixture.settle_ms
            )
        })?;

    let mut session = CarouselSession::new(config)?;
    if let Some([width, height]) = fixture.viewport {
        session.set_viewport(ViewportRect::from_size(width, height));
    }

    let interval = fixture.frame_interval_ms;
    let mut next_frame_ms = 0u64;
    let mut render_until = |session: &mut CarouselSession, until_ms: u64| {
        while next_frame_ms <= until_ms {
            session.frame(Duration::from_millis(next_frame_ms));
            next_frame_ms = next_frame_ms.saturating_add(interval);
        }
    };

    let mut steps = Vec::with_capacity(fixture.inputs.len());
    for timed in &fixture.inputs {
        render_until(&mut session, timed.at_ms);
        let outcome = session.handle_input(&timed.input, Duration::from_millis(timed.at_ms));
        let events = session.drain_events();
        for event in &events {
            log::debug!("[replay] {} ms: {event}", timed.at_ms);
        }
        steps.push(StepResult {
            at_ms: timed.at_ms,
            index: outcome.advance.map(|advance| advance.index),
            throttled: outcome.throttled,
            picked: outcome.picked,
            events,
        });
    }

    render_until(&mut session, end_ms);
    let final_frame = session.frame(Duration::from_millis(end_ms));

    let state = *session.state();
    Ok(ReplayOutput {
        steps,
        final_state: FinalState {
            at_ms: end_ms,
            current_index: state.current_index,
            step_counter: state.step_counter,
            yaw_offset: state.yaw_offset,
            pitch_offset: state.pitch_offset,
            label_offset: final_frame.label_offset,
            camera_distance: final_frame.camera_distance,
            heading: final_frame.heading,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel(at_ms: u64) -> TimedInput {
        TimedInput { at_ms, input: RawInput::Wheel { delta_y: 1.0 } }
    }

    #[test]
    fn out_of_order_inputs_are_rejected() {
        let fixture = ReplayFixture {
            viewport: None,
            frame_interval_ms: 16,
            settle_ms: 0,
            inputs: vec![wheel(500), wheel(100)],
        };
        let err = run_fixture(&fixture, &CarouselConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ordered by time"));
    }

    #[test]
    fn overlong_or_overflowing_traces_are_rejected() {
        let far = ReplayFixture {
            viewport: None,
            frame_interval_ms: 16,
            settle_ms: 0,
            inputs: vec![wheel(MAX_REPLAY_MS + 1)],
        };
        let err = run_fixture(&far, &CarouselConfig::default()).unwrap_err();
        assert!(err.to_string().contains("limit"));

        let overflow =
            ReplayFixture { viewport: None, frame_interval_ms: 16, settle_ms: u64::MAX, inputs: vec![wheel(10)] };
        assert!(run_fixture(&overflow, &CarouselConfig::default()).is_err());
    }

    #[test]
    fn trace_ending_exactly_at_limit_is_accepted() {
        let fixture = ReplayFixture {
            viewport: None,
            frame_interval_ms: 60_000,
            settle_ms: 0,
            inputs: vec![wheel(MAX_REPLAY_MS)],
        };
        let output = run_fixture(&fixture, &CarouselConfig::default()).expect("replay");
        assert_eq!(output.final_state.at_ms, MAX_REPLAY_MS);
    }

    #[test]
    fn empty_trace_reports_resting_state() {
        let fixture = ReplayFixture { viewport: None, frame_interval_ms: 16, settle_ms: 100, inputs: Vec::new() };
        let output = run_fixture(&fixture, &CarouselConfig::default()).expect("replay");
        assert!(output.steps.is_empty());
        assert_eq!(output.final_state.current_index, 0);
        assert_eq!(output.final_state.label_offset, 0.0);
        assert_eq!(output.final_state.at_ms, 100);
    }
}
