//! Events consumed and produced by the motion-to-key behavior
//!
//! Pointing devices publish [`MotionEvent`]s, each carrying one [`AxisEvent`] and the
//! [`OriginContext`] of the layer whose binding routed the motion here.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel;
use embassy_time::Instant;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisEvent {
    /// The axis event value type, relative or absolute
    pub typ: AxisValType,
    /// The axis name
    pub axis: Axis,
    /// Value of the axis event
    pub value: i16,
}

impl AxisEvent {
    /// Relative motion on `axis`
    pub const fn rel(axis: Axis, value: i16) -> Self {
        Self {
            typ: AxisValType::Rel,
            axis,
            value,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisValType {
    /// The axis value is relative
    Rel,
    /// The axis value is absolute
    Abs,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Axis {
    X,
    Y,
    Z,
    H,
    V,
}

/// The scope whose liveness gates deferred key taps, usually the layer that
/// held the motion binding when the sample arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OriginContext {
    /// Opaque context id, the layer number for [`crate::LayerState`]
    pub id: u8,
    /// When the context issued the event
    pub timestamp: Instant,
}

impl OriginContext {
    pub const fn new(id: u8, timestamp: Instant) -> Self {
        Self { id, timestamp }
    }
}

/// One motion sample together with its originating context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionEvent {
    pub axis_event: AxisEvent,
    pub origin: OriginContext,
}

impl MotionEvent {
    pub const fn new(axis_event: AxisEvent, origin: OriginContext) -> Self {
        Self { axis_event, origin }
    }
}

/// Logical direction emitted on a threshold crossing.
///
/// The discriminant is the index into [`crate::BindingTable`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn axis(self) -> Axis {
        match self {
            Direction::Right | Direction::Left => Axis::X,
            Direction::Up | Direction::Down => Axis::Y,
        }
    }
}

/// Trait for event subscribers
pub trait EventSubscriber<T> {
    async fn next_event(&mut self) -> T;
}

// Implementation for embassy-sync Channel
impl<'a, M: RawMutex, T, const N: usize> EventSubscriber<T> for channel::Receiver<'a, M, T, N> {
    async fn next_event(&mut self) -> T {
        self.receive().await
    }
}
