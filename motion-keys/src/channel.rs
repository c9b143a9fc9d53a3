//! Exposed channels which connect pointing devices, the motion-to-key processor and the HID writer

pub use embassy_sync::channel;
use embassy_sync::channel::Channel;
use usbd_hid::descriptor::KeyboardReport;

use crate::event::MotionEvent;
use crate::{MOTION_EVENT_CHANNEL_SIZE, REPORT_CHANNEL_SIZE, RawMutex};

/// Channel for motion samples from pointing devices
pub static MOTION_EVENT_CHANNEL: Channel<RawMutex, MotionEvent, MOTION_EVENT_CHANNEL_SIZE> = Channel::new();
/// Channel for keyboard reports from key actions to the hid writer
pub static KEYBOARD_REPORT_CHANNEL: Channel<RawMutex, KeyboardReport, REPORT_CHANNEL_SIZE> = Channel::new();
