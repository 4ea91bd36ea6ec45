use planet_carousel::config::CarouselConfig;
use planet_carousel::events::CarouselEvent;
use planet_carousel::gesture::RawInput;
use planet_carousel::CarouselSession;
use std::f32::consts::TAU;
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn session() -> CarouselSession {
    CarouselSession::new(&CarouselConfig::default()).expect("default session")
}

/// Renders frames every 16 ms from `from` up to and including `to`.
fn render(session: &mut CarouselSession, from: u64, to: u64) {
    let mut t = from;
    while t <= to {
        session.frame(ms(t));
        t += 16;
    }
}

const WHEEL: RawInput = RawInput::Wheel { delta_y: 120.0 };

#[test]
fn burst_of_wheel_events_moves_one_step_per_window() {
    let mut session = session();
    let mut indices = Vec::new();
    let mut throttled = 0;
    for at in [0u64, 500, 2100, 2200] {
        render(&mut session, at.saturating_sub(16), at);
        let outcome = session.handle_input(&WHEEL, ms(at));
        assert!(!outcome.suppress_default, "wheel input leaves native scrolling alone");
        match outcome.advance {
            Some(advance) => indices.push(advance.index),
            None => {
                assert!(outcome.throttled);
                throttled += 1;
            }
        }
    }
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(throttled, 2);
    assert_eq!(session.state().step_counter, 2);
}

#[test]
fn full_lap_wraps_index_and_resets_label_stack() {
    let mut session = session();
    let mut snaps = Vec::new();
    let mut last_ms = 0;
    for step in 0..4u64 {
        let at = step * 2000;
        render(&mut session, last_ms, at);
        let outcome = session.handle_input(&WHEEL, ms(at));
        assert!(outcome.advance.is_some(), "advance at {at} ms should pass the throttle");
        for event in session.drain_events() {
            if let CarouselEvent::LabelSnap { target } = event {
                snaps.push((step, target));
            }
        }
        // Let the transition finish before the next step.
        render(&mut session, at, at + 1500);
        let expected = if step == 3 { 0.0 } else { -((step + 1) as f32) };
        assert!(
            (session.label_offset() - expected).abs() < 1e-4,
            "label offset after step {step} was {}",
            session.label_offset()
        );
        last_ms = at + 1500;
    }
    assert_eq!(snaps, vec![(3, 0.0)]);
    assert_eq!(session.carousel().current_index(), 0);
    assert_eq!(session.state().step_counter, 4);
    assert!(session.animator().is_idle());
}

#[test]
fn settled_yaw_is_a_whole_number_of_quanta() {
    let mut session = session();
    session.handle_input(&WHEEL, ms(0));
    render(&mut session, 0, 1200);
    let quantum = TAU / 4.0;
    assert!((session.state().yaw_offset + quantum).abs() < 1e-4);

    session.handle_input(&WHEEL, ms(2000));
    render(&mut session, 1216, 3200);
    assert!((session.state().yaw_offset + 2.0 * quantum).abs() < 1e-4);
}

#[test]
fn index_tracks_step_counter_modulo_ring_size() {
    let mut session = session();
    for step in 0..9u64 {
        let outcome = session.handle_input(&WHEEL, ms(step * 2000)).advance.expect("accepted");
        let counter = session.state().step_counter;
        assert_eq!(outcome.index as i64, counter.rem_euclid(4));
        assert_eq!(session.carousel().current_index(), outcome.index);
    }
}

#[test]
fn throttled_advance_reports_remaining_window() {
    let mut session = session();
    session.handle_input(&WHEEL, ms(0));
    session.drain_events();
    session.handle_input(&WHEEL, ms(500));
    assert_eq!(session.drain_events(), vec![CarouselEvent::AdvanceThrottled { remaining_ms: 1500 }]);
}

#[test]
fn drag_during_transition_composes_with_yaw_tween() {
    use planet_carousel::gesture::TouchPoint;

    let mut session = session();
    session.handle_input(&WHEEL, ms(0));
    session.handle_input(&RawInput::TouchStart { touches: vec![TouchPoint::new(0, 100.0, 100.0)] }, ms(100));
    session.handle_input(&RawInput::TouchMove { touches: vec![TouchPoint::new(0, 200.0, 100.0)] }, ms(120));
    render(&mut session, 0, 1500);
    let expected = -TAU / 4.0 + 100.0 * 0.005;
    assert!((session.state().yaw_offset - expected).abs() < 1e-4);
    assert_eq!(session.state().step_counter, 1);
}
