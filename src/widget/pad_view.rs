//! Presentation state of a single pad.

use std::time::Instant;

use crate::audio_engine::constants::ACTIVE_WINDOW;
use crate::pads::PadDescriptor;

/// One pad as shown on screen.
///
/// The active flag is derived from a deadline rather than cleared by a timer: flashing sets the
/// deadline one [`ACTIVE_WINDOW`] ahead and the pad reads as active until that instant. Flashing
/// again before the window closes simply moves the deadline.
#[derive(Debug, Clone)]
pub struct PadView {
    pub descriptor: &'static PadDescriptor,
    active_until: Option<Instant>,
}

impl PadView {
    pub fn new(descriptor: &'static PadDescriptor) -> Self {
        Self {
            descriptor,
            active_until: None,
        }
    }

    pub fn flash(&mut self, now: Instant) {
        self.active_until = Some(now + ACTIVE_WINDOW);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// When the pad stops being active, if it currently is.
    pub fn deadline(&self, now: Instant) -> Option<Instant> {
        self.active_until.filter(|&until| now < until)
    }
}
