//! The drum machine widget.
//!
//! [`DrumMachineWidget`] owns the display text and one [`PadView`] per pad, and implements the
//! trigger protocol shared by every input path:
//!
//! 1. resolve the key to a pad (unknown keys are ignored),
//! 2. locate the pad's clip (no clip, nothing happens),
//! 3. rewind the clip and request playback without waiting on the result,
//! 4. show the pad's name on the display,
//! 5. flash the pad for [`ACTIVE_WINDOW`](crate::audio_engine::constants::ACTIVE_WINDOW).
//!
//! Keyboard shortcuts arrive through a [`KeyboardSurface`] listener that exists only while the
//! widget is mounted. Pointer input and Enter/Space on a focused pad go through
//! [`DrumMachineWidget::click`] and [`DrumMachineWidget::pad_key_down`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::audio_engine::constants::NUM_PADS;
use crate::audio_engine::{ClipBank, TriggerError};
use crate::keyboard::{KeyEvent, KeyboardSurface, ListenerGuard};
use crate::pads::{self, PADS, PadDescriptor};

mod markup;
mod pad_view;

pub use pad_view::PadView;

struct WidgetState {
    display_text: String,
    pads: [PadView; NUM_PADS],
}

/// State and trigger logic shared between the widget and its keyboard listener.
struct WidgetCore {
    clips: Arc<dyn ClipBank>,
    state: Mutex<WidgetState>,
}

impl WidgetCore {
    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn trigger_key(&self, key: &str, now: Instant) -> Result<&'static PadDescriptor, TriggerError> {
        let pad =
            pads::find_by_key(key).ok_or_else(|| TriggerError::UnrecognizedKey(key.to_string()))?;
        self.trigger_pad(pad, now)
    }

    fn trigger_pad(
        &self,
        pad: &'static PadDescriptor,
        now: Instant,
    ) -> Result<&'static PadDescriptor, TriggerError> {
        let id = self
            .clips
            .locate(pad.trigger_key)
            .ok_or(TriggerError::ResourceUnavailable(pad.trigger_key))?;

        // A failed rewind still plays from wherever the cursor is.
        let _ = self.clips.rewind(id);
        // Playback is fire-and-forget; a rejected request still counts as a trigger.
        let _ = self.clips.play(id);

        let mut state = self.lock();
        state.display_text.clear();
        state.display_text.push_str(pad.display_name);
        state.pads[pad.index()].flash(now);
        log::trace!("pad {} triggered", pad.trigger_key);

        Ok(pad)
    }
}

/// The nine pads plus the display.
pub struct DrumMachineWidget {
    core: Arc<WidgetCore>,
    listener: Option<ListenerGuard>,
}

impl DrumMachineWidget {
    pub fn new(clips: Arc<dyn ClipBank>) -> Self {
        let state = WidgetState {
            display_text: String::new(),
            pads: std::array::from_fn(|i| PadView::new(&PADS[i])),
        };

        Self {
            core: Arc::new(WidgetCore {
                clips,
                state: Mutex::new(state),
            }),
            listener: None,
        }
    }

    /// Binds the trigger keys on `surface`. Mounting twice keeps the first binding.
    pub fn mount(&mut self, surface: &KeyboardSurface) {
        if self.listener.is_some() {
            return;
        }

        let core = Arc::clone(&self.core);
        let guard = surface.add_listener(Box::new(move |event: &mut KeyEvent| {
            let key = event.key().to_uppercase();
            if pads::find_by_key(&key).is_some() {
                let _ = core.trigger_key(&key, Instant::now());
            }
        }));
        self.listener = Some(guard);
        log::debug!("drum machine mounted");
    }

    /// Removes the keyboard binding. Dropping the widget has the same effect.
    pub fn unmount(&mut self) {
        if self.listener.take().is_some() {
            log::debug!("drum machine unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Runs the trigger protocol for `key` (case-insensitive).
    pub fn trigger(&self, key: &str) -> Result<&'static PadDescriptor, TriggerError> {
        self.trigger_at(key, Instant::now())
    }

    pub fn trigger_at(
        &self,
        key: &str,
        now: Instant,
    ) -> Result<&'static PadDescriptor, TriggerError> {
        self.core.trigger_key(key, now)
    }

    /// Pointer activation of the pad whose container is `element_id`.
    pub fn click(&self, element_id: &str) -> Result<&'static PadDescriptor, TriggerError> {
        self.click_at(element_id, Instant::now())
    }

    pub fn click_at(
        &self,
        element_id: &str,
        now: Instant,
    ) -> Result<&'static PadDescriptor, TriggerError> {
        let pad = pads::find_by_element_id(element_id)
            .ok_or_else(|| TriggerError::UnrecognizedKey(element_id.to_string()))?;
        self.core.trigger_pad(pad, now)
    }

    /// Keydown on a focused pad: Enter and Space activate it and suppress the default action.
    pub fn pad_key_down(&self, element_id: &str, event: &mut KeyEvent) {
        let Some(pad) = pads::find_by_element_id(element_id) else {
            return;
        };

        if matches!(event.key(), "Enter" | " ") {
            event.prevent_default();
            let _ = self.core.trigger_pad(pad, Instant::now());
        }
    }

    /// The text currently shown on the display.
    pub fn display(&self) -> String {
        self.core.lock().display_text.clone()
    }

    pub fn is_active(&self, element_id: &str) -> bool {
        self.is_active_at(element_id, Instant::now())
    }

    pub fn is_active_at(&self, element_id: &str, now: Instant) -> bool {
        self.core
            .lock()
            .pads
            .iter()
            .any(|pad| pad.descriptor.element_id == element_id && pad.is_active(now))
    }

    /// Pads currently showing their active state, in grid order.
    pub fn active_pads_at(&self, now: Instant) -> Vec<&'static PadDescriptor> {
        self.core
            .lock()
            .pads
            .iter()
            .filter(|pad| pad.is_active(now))
            .map(|pad| pad.descriptor)
            .collect()
    }

    /// The next instant at which a pad leaves its active state, if any pad is active.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        self.core
            .lock()
            .pads
            .iter()
            .filter_map(|pad| pad.deadline(now))
            .min()
    }

    pub fn render(&self) -> String {
        self.render_at(Instant::now())
    }

    pub fn render_at(&self, now: Instant) -> String {
        let state = self.core.lock();
        markup::render(&state.pads, &state.display_text, now)
    }
}
