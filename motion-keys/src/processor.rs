//! The motion-to-key behavior task
//!
//! [`MoveToKeyProcessor`] owns all state of one behavior instance. Samples are handled
//! synchronously in [`MoveToKeyProcessor::process`], key taps are executed by
//! [`MoveToKeyProcessor::fire_due`]. [`MoveToKeyProcessor::process_loop`] interleaves both
//! on a single cooperative task, so they never run concurrently.

use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Timer};
use futures::future::pending;

use crate::binding::{BindingTable, DirectionAction};
use crate::channel::MOTION_EVENT_CHANNEL;
use crate::config::{ConfigError, MoveToKeyConfig};
use crate::event::{EventSubscriber, MotionEvent};
use crate::sequencer::{ContextLiveness, Sequencer};
use crate::translator::{MotionTranslator, TranslateResult};

/// Result of processing a motion event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessResult {
    /// The event was consumed
    Stop,
    /// The event isn't handled here, pass it on
    Continue(MotionEvent),
}

pub struct MoveToKeyProcessor<A: DirectionAction, L: ContextLiveness> {
    translator: MotionTranslator,
    sequencer: Sequencer<A>,
    liveness: L,
}

impl<A: DirectionAction, L: ContextLiveness> MoveToKeyProcessor<A, L> {
    /// Create a processor, the config is validated first
    pub fn new(config: MoveToKeyConfig, bindings: BindingTable<A>, liveness: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sequencer: Sequencer::new(bindings, config.tap_delay),
            translator: MotionTranslator::new(config),
            liveness,
        })
    }

    pub fn translator(&self) -> &MotionTranslator {
        &self.translator
    }

    pub fn sequencer(&self) -> &Sequencer<A> {
        &self.sequencer
    }

    /// Handle a motion event received at `now`.
    ///
    /// A crossed threshold schedules a key tap, which is executed by the next
    /// [`Self::fire_due`] call.
    pub fn process(&mut self, event: MotionEvent, now: Instant) -> ProcessResult {
        match self.translator.translate(event.axis_event, now) {
            TranslateResult::Ignored => ProcessResult::Continue(event),
            TranslateResult::Throttled | TranslateResult::Accumulated => ProcessResult::Stop,
            TranslateResult::Triggered(direction) => {
                if let Err(e) = self.sequencer.submit(direction, event.origin, now) {
                    debug!("Dropped {:?}: {:?}", direction, e);
                }
                ProcessResult::Stop
            }
        }
    }

    /// Execute key tap steps that are due at `now`.
    ///
    /// The rate limit window starts only when a press is delivered.
    pub async fn fire_due(&mut self, now: Instant) {
        if let Some(direction) = self.sequencer.fire_due(now, &self.liveness).await {
            trace!("Pressed {:?}, rate limit window starts", direction);
            self.translator.mark_emitted(now);
        }
    }

    /// Cancel the pending key tap and clear all accumulated state.
    ///
    /// If the press was already sent, its release is skipped and the key stays held on the
    /// host side. Send an empty report afterwards if that matters, see
    /// [`crate::KeycodeAction`].
    pub fn teardown(&mut self) {
        debug!("Tearing down move-to-key processor");
        self.sequencer.cancel();
        self.translator.reset();
    }

    /// Process events from [`MOTION_EVENT_CHANNEL`] forever
    pub async fn run(&mut self) -> ! {
        let mut sub = MOTION_EVENT_CHANNEL.receiver();
        self.process_loop(&mut sub).await
    }

    /// Process events from `sub`, firing key taps when they're due
    pub async fn process_loop<S: EventSubscriber<MotionEvent>>(&mut self, sub: &mut S) -> ! {
        info!("Move-to-key processor started");
        loop {
            let deadline = self.sequencer.next_deadline();
            let due = async {
                match deadline {
                    Some(deadline) => Timer::at(deadline).await,
                    None => pending::<()>().await,
                }
            };

            match select(due, sub.next_event()).await {
                Either::First(_) => self.fire_due(Instant::now()).await,
                Either::Second(event) => {
                    if let ProcessResult::Continue(event) = self.process(event, Instant::now()) {
                        trace!("Motion event {:?} not handled", event);
                    }
                }
            }
        }
    }
}
