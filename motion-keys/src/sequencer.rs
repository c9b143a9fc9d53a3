//! Deferred press/release sequencing of triggered directions
//!
//! A triggered direction becomes a [`PendingAction`]: the press is due immediately, the
//! release `tap_delay` after the press. The owner drives it by waiting for
//! [`Sequencer::next_deadline`] and calling [`Sequencer::fire_due`]. Only one sequence
//! may be pending at a time, new triggers are refused until it has finished.
//!
//! Before each step the [`OriginContext`] is re-checked. A sequence whose context is no
//! longer live is dropped without calling the action.

use core::cell::Cell;

use embassy_time::{Duration, Instant};

use crate::binding::{BindingTable, DirectionAction};
use crate::event::{Direction, OriginContext};

/// Decides whether the scope that issued a trigger is still live
pub trait ContextLiveness {
    fn is_live(&self, origin: &OriginContext) -> bool;
}

impl<T: ContextLiveness> ContextLiveness for &T {
    fn is_live(&self, origin: &OriginContext) -> bool {
        (*self).is_live(origin)
    }
}

/// Every context is live, sequences are never dropped
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysActive;

impl ContextLiveness for AlwaysActive {
    fn is_live(&self, _origin: &OriginContext) -> bool {
        true
    }
}

/// Activation state of keyboard layers.
///
/// An origin is live if its layer is active and hasn't been re-activated after the origin
/// was issued. Layer 0 is the default layer and starts active.
pub struct LayerState<const NUM_LAYER: usize> {
    activated_at: [Cell<Option<Instant>>; NUM_LAYER],
}

impl<const NUM_LAYER: usize> Default for LayerState<NUM_LAYER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_LAYER: usize> LayerState<NUM_LAYER> {
    pub fn new() -> Self {
        let state = Self {
            activated_at: core::array::from_fn(|_| Cell::new(None)),
        };
        if let Some(default_layer) = state.activated_at.first() {
            default_layer.set(Some(Instant::MIN));
        }
        state
    }

    pub fn activate(&self, layer: u8, now: Instant) {
        match self.activated_at.get(layer as usize) {
            Some(cell) => {
                if cell.get().is_none() {
                    cell.set(Some(now));
                }
            }
            None => warn!("Activating invalid layer {}", layer),
        }
    }

    pub fn deactivate(&self, layer: u8) {
        if let Some(cell) = self.activated_at.get(layer as usize) {
            cell.set(None);
        }
    }

    pub fn is_active(&self, layer: u8) -> bool {
        self.activated_at
            .get(layer as usize)
            .is_some_and(|cell| cell.get().is_some())
    }
}

impl<const NUM_LAYER: usize> ContextLiveness for LayerState<NUM_LAYER> {
    fn is_live(&self, origin: &OriginContext) -> bool {
        self.activated_at
            .get(origin.id as usize)
            .and_then(|cell| cell.get())
            .is_some_and(|activated_at| activated_at <= origin.timestamp)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingStep {
    Press,
    Release,
}

/// The in-flight press/release sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingAction {
    /// Direction whose binding is tapped
    pub direction: Direction,
    /// Context that issued the trigger
    pub origin: OriginContext,
    /// When the trigger was submitted
    pub timestamp: Instant,
    /// The next step to execute
    pub step: PendingStep,
    /// When the next step is due
    pub deadline: Instant,
}

/// Reasons a trigger is refused by [`Sequencer::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// Another sequence is still pending
    Busy,
    /// Nothing is bound to the direction
    Unbound,
}

pub struct Sequencer<A: DirectionAction> {
    bindings: BindingTable<A>,
    tap_delay: Duration,
    pending: Option<PendingAction>,
}

impl<A: DirectionAction> Sequencer<A> {
    pub fn new(bindings: BindingTable<A>, tap_delay: Duration) -> Self {
        Self {
            bindings,
            tap_delay,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Schedule a tap of `direction`, its press due at `now`
    pub fn submit(&mut self, direction: Direction, origin: OriginContext, now: Instant) -> Result<(), SubmitError> {
        if let Some(pending) = &self.pending {
            debug!(
                "Trigger {:?} refused, {:?} is still pending",
                direction, pending.direction
            );
            return Err(SubmitError::Busy);
        }
        if !self.bindings.is_bound(direction) {
            warn!("No action bound to {:?}", direction);
            return Err(SubmitError::Unbound);
        }
        self.pending = Some(PendingAction {
            direction,
            origin,
            timestamp: now,
            step: PendingStep::Press,
            deadline: now,
        });
        Ok(())
    }

    /// When the next step is due, `None` if idle
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Execute every step that is due at `now`.
    ///
    /// Returns the direction whose press was delivered in this call, if any. A press
    /// dropped because its context is gone, or rejected by the action, isn't reported.
    pub async fn fire_due<L: ContextLiveness>(&mut self, now: Instant, liveness: &L) -> Option<Direction> {
        let mut pressed = None;
        while let Some(pending) = self.pending {
            if pending.deadline > now {
                break;
            }
            if !liveness.is_live(&pending.origin) {
                debug!(
                    "Context {} of {:?} is gone, dropping {:?}",
                    pending.origin.id, pending.direction, pending.step
                );
                self.pending = None;
                break;
            }

            // Bound directions are checked on submit
            let Some(action) = self.bindings.get_mut(pending.direction) else {
                self.pending = None;
                break;
            };

            match pending.step {
                PendingStep::Press => {
                    match action.press().await {
                        Ok(()) => pressed = Some(pending.direction),
                        Err(e) => warn!("Press of {:?} failed: {:?}", pending.direction, e),
                    }
                    self.pending = Some(PendingAction {
                        step: PendingStep::Release,
                        deadline: now + self.tap_delay,
                        ..pending
                    });
                }
                PendingStep::Release => {
                    if let Err(e) = action.release().await {
                        warn!("Release of {:?} failed: {:?}", pending.direction, e);
                    }
                    self.pending = None;
                }
            }
        }
        pressed
    }

    /// Drop the pending sequence. Its remaining steps are never executed.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Cancelled pending {:?} of {:?}", pending.step, pending.direction);
        }
    }
}
