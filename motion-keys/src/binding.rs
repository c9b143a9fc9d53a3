//! Actions bound to the four logical directions

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use usbd_hid::descriptor::KeyboardReport;

use crate::REPORT_CHANNEL_SIZE;
use crate::channel::KEYBOARD_REPORT_CHANNEL;
use crate::event::Direction;

/// HID usage of the arrow keys
pub const KC_RIGHT: u8 = 0x4F;
pub const KC_LEFT: u8 = 0x50;
pub const KC_DOWN: u8 = 0x51;
pub const KC_UP: u8 = 0x52;

/// Errors of key actions. None of them is fatal, the tap is just lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionError {
    /// The action can't be executed right now, e.g. the host endpoint is gone
    Unavailable,
    /// Report couldn't be queued
    ReportChannelFull,
    /// The action refused the request
    Rejected,
}

/// Something that can be pressed and released, bound to a [`Direction`]
pub trait DirectionAction {
    async fn press(&mut self) -> Result<(), ActionError>;
    async fn release(&mut self) -> Result<(), ActionError>;
}

/// Fixed table of the actions bound to [`Direction::Right`], [`Direction::Left`],
/// [`Direction::Up`] and [`Direction::Down`], in this order.
///
/// An empty slot means the direction is unbound, triggering it only logs a warning.
pub struct BindingTable<A: DirectionAction> {
    bindings: [Option<A>; 4],
}

impl<A: DirectionAction> BindingTable<A> {
    pub fn new(bindings: [Option<A>; 4]) -> Self {
        Self { bindings }
    }

    /// Bind all four directions
    pub fn from_actions(right: A, left: A, up: A, down: A) -> Self {
        Self::new([Some(right), Some(left), Some(up), Some(down)])
    }

    pub fn is_bound(&self, direction: Direction) -> bool {
        self.bindings[direction.index()].is_some()
    }

    pub fn get_mut(&mut self, direction: Direction) -> Option<&mut A> {
        self.bindings[direction.index()].as_mut()
    }
}

impl BindingTable<KeycodeAction<'static, crate::RawMutex, REPORT_CHANNEL_SIZE>> {
    /// Arrow keys reported through [`KEYBOARD_REPORT_CHANNEL`]
    pub fn arrow_keys() -> Self {
        Self::from_actions(
            KeycodeAction::new(KC_RIGHT),
            KeycodeAction::new(KC_LEFT),
            KeycodeAction::new(KC_UP),
            KeycodeAction::new(KC_DOWN),
        )
    }
}

/// Taps a single HID keycode: a report holding the key on press, an empty report on release.
///
/// Reports are absolute, the host keeps the key held until the next report arrives. When a
/// release is skipped, after [`crate::MoveToKeyProcessor::teardown`] or because the owning
/// layer went away, the keycode stays in the last report. Send an empty report yourself
/// if nothing else is going to report soon.
pub struct KeycodeAction<'a, M: RawMutex, const N: usize> {
    keycode: u8,
    sender: Sender<'a, M, KeyboardReport, N>,
}

impl KeycodeAction<'static, crate::RawMutex, REPORT_CHANNEL_SIZE> {
    pub fn new(keycode: u8) -> Self {
        Self::with_sender(keycode, KEYBOARD_REPORT_CHANNEL.sender())
    }
}

impl<'a, M: RawMutex, const N: usize> KeycodeAction<'a, M, N> {
    pub fn with_sender(keycode: u8, sender: Sender<'a, M, KeyboardReport, N>) -> Self {
        Self { keycode, sender }
    }

    pub fn keycode(&self) -> u8 {
        self.keycode
    }

    fn send(&self, keycode: u8) -> Result<(), ActionError> {
        let report = KeyboardReport {
            modifier: 0,
            reserved: 0,
            leds: 0,
            keycodes: [keycode, 0, 0, 0, 0, 0],
        };
        self.sender.try_send(report).map_err(|_| ActionError::ReportChannelFull)
    }
}

impl<'a, M: RawMutex, const N: usize> DirectionAction for KeycodeAction<'a, M, N> {
    async fn press(&mut self) -> Result<(), ActionError> {
        self.send(self.keycode)
    }

    async fn release(&mut self) -> Result<(), ActionError> {
        self.send(0)
    }
}
