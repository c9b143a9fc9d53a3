use core::cell::RefCell;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use embassy_futures::select::select;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, MockDriver};
use heapless::Vec;
use motion_keys::binding::{ActionError, BindingTable, DirectionAction};
use motion_keys::sequencer::ContextLiveness;
use motion_keys::{Axis, AxisEvent, Direction, MotionEvent, MoveToKeyProcessor, OriginContext};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// The mock clock is global, tests that advance it must not overlap
static CLOCK: Mutex<()> = Mutex::new(());

pub fn lock_clock() -> MutexGuard<'static, ()> {
    CLOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Advance the mock clock millisecond by millisecond, yielding before every tick so other
/// futures run at the current time first
pub async fn advance(ms: u64) {
    for _ in 0..ms {
        yield_now().await;
        MockDriver::get().advance(Duration::from_millis(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub direction: Direction,
    pub step: Step,
    pub at: Instant,
}

pub type TapLog = Rc<RefCell<Vec<Tap, 64>>>;

pub struct RecordingAction {
    direction: Direction,
    log: TapLog,
}

impl RecordingAction {
    fn record(&self, step: Step) {
        let tap = Tap {
            direction: self.direction,
            step,
            at: Instant::now(),
        };
        if self.log.borrow_mut().push(tap).is_err() {
            panic!("Tap log is full");
        }
    }
}

impl DirectionAction for RecordingAction {
    async fn press(&mut self) -> Result<(), ActionError> {
        self.record(Step::Press);
        Ok(())
    }

    async fn release(&mut self) -> Result<(), ActionError> {
        self.record(Step::Release);
        Ok(())
    }
}

pub fn recording_bindings(log: &TapLog) -> BindingTable<RecordingAction> {
    let action = |direction| RecordingAction {
        direction,
        log: log.clone(),
    };
    BindingTable::from_actions(
        action(Direction::Right),
        action(Direction::Left),
        action(Direction::Up),
        action(Direction::Down),
    )
}

/// Directions pressed, in order
pub fn pressed(log: &TapLog) -> std::vec::Vec<Direction> {
    log.borrow()
        .iter()
        .filter(|tap| tap.step == Step::Press)
        .map(|tap| tap.direction)
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TestMotion {
    pub axis: Axis,
    pub value: i16,
    pub layer: u8,
    /// Delay before this sample in milliseconds
    pub delay: u64,
}

pub const fn m(axis: Axis, value: i16, delay: u64) -> TestMotion {
    TestMotion {
        axis,
        value,
        layer: 0,
        delay,
    }
}

/// Feed `motions` through a running processor, then keep the clock running for `settle` ms
pub async fn run_motion_sequence<A: DirectionAction, L: ContextLiveness>(
    processor: &mut MoveToKeyProcessor<A, L>,
    motions: &[TestMotion],
    settle: u64,
) {
    let channel: Channel<NoopRawMutex, MotionEvent, 16> = Channel::new();
    let mut receiver = channel.receiver();
    select(processor.process_loop(&mut receiver), async {
        for motion in motions {
            advance(motion.delay).await;
            let origin = OriginContext::new(motion.layer, Instant::now());
            channel
                .send(MotionEvent::new(AxisEvent::rel(motion.axis, motion.value), origin))
                .await;
        }
        advance(settle).await;
    })
    .await;
}
