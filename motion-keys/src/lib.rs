//! Trackball motion to directional key taps.
//!
//! Relative motion from a pointing sensor is accumulated per axis. Every time an axis
//! crosses its threshold, one direction is emitted and the bound action is tapped:
//! pressed immediately and released after a short delay, unless the layer that issued
//! the motion has been deactivated in between.
//!
//! ```text
//! MotionEvent -> rate limit -> accumulate -> arbitrate -> Sequencer -> BindingTable
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod binding;
pub mod channel;
pub mod config;
pub mod event;
pub mod motion;
pub mod processor;
pub mod rate_limit;
pub mod sequencer;
pub mod translator;

pub use binding::{ActionError, BindingTable, DirectionAction, KeycodeAction};
pub use config::{ConfigError, MoveToKeyConfig, MoveToKeyToml};
pub use event::{Axis, AxisEvent, AxisValType, Direction, MotionEvent, OriginContext};
pub use processor::{MoveToKeyProcessor, ProcessResult};
pub use sequencer::{AlwaysActive, ContextLiveness, LayerState, Sequencer, SubmitError};
pub use translator::{MotionTranslator, TranslateResult};

/// Raw mutex used by the static channels.
pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Capacity of the inbound motion event channel
pub const MOTION_EVENT_CHANNEL_SIZE: usize = 16;
/// Capacity of the outbound keyboard report channel
pub const REPORT_CHANNEL_SIZE: usize = 16;
