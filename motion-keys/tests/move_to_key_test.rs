mod common;

use embassy_futures::block_on;
use embassy_futures::select::select;
use embassy_futures::yield_now;
use embassy_time::{Duration, Instant};
use motion_keys::binding::{KC_DOWN, KC_LEFT, KC_RIGHT, KC_UP};
use motion_keys::channel::{KEYBOARD_REPORT_CHANNEL, MOTION_EVENT_CHANNEL};
use motion_keys::{
    AlwaysActive, Axis, AxisEvent, BindingTable, Direction, LayerState, MotionEvent, MoveToKeyConfig,
    MoveToKeyProcessor, OriginContext,
};

use crate::common::*;

fn config(threshold: u16) -> MoveToKeyConfig {
    MoveToKeyConfig {
        threshold,
        ..Default::default()
    }
}

#[test]
fn test_small_moves_tap_right_once() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let mut processor = MoveToKeyProcessor::new(config(20), recording_bindings(&log), AlwaysActive).unwrap();

    block_on(run_motion_sequence(
        &mut processor,
        &[m(Axis::X, 5, 1), m(Axis::X, 8, 1), m(Axis::X, 10, 1)],
        30,
    ));

    let taps = log.borrow();
    assert_eq!(taps.len(), 2);
    assert_eq!(taps[0].direction, Direction::Right);
    assert_eq!(taps[0].step, Step::Press);
    assert_eq!(taps[1].direction, Direction::Right);
    assert_eq!(taps[1].step, Step::Release);
    let held = taps[1].at - taps[0].at;
    assert!(
        held >= Duration::from_millis(10) && held <= Duration::from_millis(12),
        "release came {}ms after press",
        held.as_millis()
    );
    assert_eq!(processor.translator().motion().x_delta, 3);
}

#[test]
fn test_burst_inside_rate_limit_is_dropped() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let mut processor = MoveToKeyProcessor::new(config(20), recording_bindings(&log), AlwaysActive).unwrap();

    block_on(run_motion_sequence(
        &mut processor,
        &[
            m(Axis::X, 25, 1),
            // Inside the 50ms window, lost
            m(Axis::X, 30, 20),
            m(Axis::Y, -30, 5),
            // Outside the window again
            m(Axis::Y, -12, 40),
        ],
        30,
    ));

    assert_eq!(pressed(&log), [Direction::Right]);
    assert_eq!(processor.translator().motion().x_delta, 5);
    assert_eq!(processor.translator().motion().y_delta, -12);
}

#[test]
fn test_large_motion_repeats_over_calls() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let mut processor = MoveToKeyProcessor::new(config(20), recording_bindings(&log), AlwaysActive).unwrap();

    // One burst holds two quanta, consumed one per admitted sample
    block_on(run_motion_sequence(
        &mut processor,
        &[m(Axis::Y, -40, 1), m(Axis::Y, -1, 60), m(Axis::Y, -1, 60)],
        30,
    ));

    assert_eq!(pressed(&log), [Direction::Up, Direction::Up]);
    assert_eq!(processor.translator().motion().y_delta, -2);
}

#[test]
fn test_both_axes_over_threshold_x_wins() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let config = MoveToKeyConfig {
        rate_limit: Duration::from_millis(0),
        ..config(20)
    };
    let mut processor = MoveToKeyProcessor::new(config, recording_bindings(&log), AlwaysActive).unwrap();

    // After the first UP, y still holds a full quantum when X crosses as well
    block_on(run_motion_sequence(
        &mut processor,
        &[m(Axis::Y, -40, 1), m(Axis::X, 21, 30), m(Axis::X, 1, 30)],
        30,
    ));

    assert_eq!(pressed(&log), [Direction::Up, Direction::Right, Direction::Up]);
    assert_eq!(processor.translator().motion().x_delta, 2);
    assert_eq!(processor.translator().motion().y_delta, 0);
}

#[test]
fn test_reset_other_axis_clears_y() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let config = MoveToKeyConfig {
        reset_other_axis: true,
        ..config(20)
    };
    let mut processor = MoveToKeyProcessor::new(config, recording_bindings(&log), AlwaysActive).unwrap();

    block_on(run_motion_sequence(
        &mut processor,
        &[m(Axis::Y, 19, 1), m(Axis::X, 21, 1), m(Axis::Y, 19, 60)],
        30,
    ));

    assert_eq!(pressed(&log), [Direction::Right]);
    assert_eq!(processor.translator().motion().x_delta, 1);
    assert_eq!(processor.translator().motion().y_delta, 19);
}

#[test]
fn test_layer_released_before_key_release() {
    let _clock = lock_clock();
    let log = TapLog::default();
    let layers: LayerState<4> = LayerState::new();
    layers.activate(2, Instant::now());
    let mut processor = MoveToKeyProcessor::new(config(20), recording_bindings(&log), &layers).unwrap();

    block_on(async {
        let channel = embassy_sync::channel::Channel::<
            embassy_sync::blocking_mutex::raw::NoopRawMutex,
            MotionEvent,
            4,
        >::new();
        let mut receiver = channel.receiver();
        select(processor.process_loop(&mut receiver), async {
            advance(1).await;
            channel
                .send(MotionEvent::new(
                    AxisEvent::rel(Axis::X, -22),
                    OriginContext::new(2, Instant::now()),
                ))
                .await;
            advance(3).await;
            layers.deactivate(2);
            advance(30).await;
        })
        .await;
    });

    let taps = log.borrow();
    assert_eq!(taps.len(), 1);
    assert_eq!(taps[0].direction, Direction::Left);
    assert_eq!(taps[0].step, Step::Press);
    assert!(processor.sequencer().is_idle());
}

#[test]
fn test_identical_processors_emit_identical_taps() {
    let _clock = lock_clock();
    let motions = [
        m(Axis::X, 12, 1),
        m(Axis::Y, -30, 10),
        m(Axis::X, 15, 60),
        m(Axis::Y, -9, 5),
        m(Axis::Y, -25, 60),
        m(Axis::X, -60, 60),
        m(Axis::X, -5, 60),
        m(Axis::Y, 44, 60),
    ];

    let first = TapLog::default();
    let mut a = MoveToKeyProcessor::new(config(20), recording_bindings(&first), AlwaysActive).unwrap();
    block_on(run_motion_sequence(&mut a, &motions, 30));

    let second = TapLog::default();
    let mut b = MoveToKeyProcessor::new(config(20), recording_bindings(&second), AlwaysActive).unwrap();
    block_on(run_motion_sequence(&mut b, &motions, 30));

    assert!(!pressed(&first).is_empty());
    assert_eq!(pressed(&first), pressed(&second));
    assert_eq!(a.translator().motion(), b.translator().motion());
}

#[test]
fn test_arrow_keys_through_static_channels() {
    let _clock = lock_clock();
    KEYBOARD_REPORT_CHANNEL.clear();
    MOTION_EVENT_CHANNEL.clear();

    let mut processor = MoveToKeyProcessor::new(config(10), BindingTable::arrow_keys(), AlwaysActive).unwrap();
    let mut keycodes = std::vec::Vec::new();

    block_on(select(processor.run(), async {
        for (axis, value) in [(Axis::X, 11), (Axis::X, -11), (Axis::Y, -11), (Axis::Y, 11)] {
            advance(1).await;
            MOTION_EVENT_CHANNEL
                .send(MotionEvent::new(
                    AxisEvent::rel(axis, value),
                    OriginContext::new(0, Instant::now()),
                ))
                .await;
            advance(60).await;
        }
        yield_now().await;
        while let Ok(report) = KEYBOARD_REPORT_CHANNEL.try_receive() {
            keycodes.push(report.keycodes[0]);
        }
    }));

    assert_eq!(keycodes, [KC_RIGHT, 0, KC_LEFT, 0, KC_UP, 0, KC_DOWN, 0]);
}
