//! The `DrumMachine` class exposed to the host UI.
//!
//! The host renders [`DrumMachine::render`], forwards clicks and keydowns, and repaints when
//! [`DrumMachine::next_repaint_in`] says a pad's active state is about to change.

use std::path::PathBuf;
use std::time::Instant;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::audio_engine::{AudioEngine, EngineError};
use crate::keyboard::{KeyEvent, KeyboardSurface};
use crate::messages::{AudioMessage, LoaderEvent};
use crate::widget::DrumMachineWidget;

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownPad(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Nine pads, a display and the audio engine that plays them.
#[pyclass]
pub struct DrumMachine {
    engine: AudioEngine,
    keyboard: KeyboardSurface,
    widget: DrumMachineWidget,
}

#[pymethods]
impl DrumMachine {
    #[new]
    pub fn new() -> PyResult<Self> {
        let engine = AudioEngine::new();
        let widget = DrumMachineWidget::new(engine.clips());

        Ok(DrumMachine {
            engine,
            keyboard: KeyboardSurface::new(),
            widget,
        })
    }

    /// Open the default output device and start playback.
    pub fn run(&mut self) -> PyResult<()> {
        Ok(self.engine.run()?)
    }

    /// Stop playback and release the output device. Loaded clips are dropped.
    pub fn shut_down(&mut self) -> PyResult<()> {
        self.engine.shut_down();
        Ok(())
    }

    /// Load an audio file for the pad bound to `key` on a background thread.
    pub fn load_clip_async(&self, key: &str, path: PathBuf) -> PyResult<()> {
        Ok(self.engine.load_clip_async(key, path)?)
    }

    /// Poll for pending background loader events.
    ///
    /// Returns `None` when no events are available.
    pub fn poll_loader_events(&self, py: Python<'_>) -> PyResult<Option<Py<PyAny>>> {
        let Some(event) = self.engine.poll_loader_event()? else {
            return Ok(None);
        };

        let dict = PyDict::new(py);
        match event {
            LoaderEvent::Started { id } => {
                dict.set_item("type", "started")?;
                dict.set_item("id", id)?;
            }
            LoaderEvent::Progress { id, percent, stage } => {
                dict.set_item("type", "progress")?;
                dict.set_item("id", id)?;
                dict.set_item("percent", percent)?;
                dict.set_item("stage", stage)?;
            }
            LoaderEvent::Success { id, duration_sec } => {
                dict.set_item("type", "success")?;
                dict.set_item("id", id)?;
                dict.set_item("duration_sec", duration_sec)?;
            }
            LoaderEvent::Error { id, error } => {
                dict.set_item("type", "error")?;
                dict.set_item("id", id)?;
                dict.set_item("msg", error)?;
            }
        }

        Ok(Some(dict.into_any().unbind()))
    }

    /// Receive a message from the audio thread.
    pub fn receive_msg(&self) -> PyResult<Option<AudioMessage>> {
        Ok(self.engine.receive_msg()?)
    }

    /// Send a ping message to the audio thread.
    pub fn ping(&self) -> PyResult<()> {
        Ok(self.engine.ping()?)
    }

    /// Silence every pad.
    pub fn stop_all(&self) -> PyResult<()> {
        Ok(self.engine.stop_all()?)
    }

    /// Drop the clip of the pad bound to `key`.
    pub fn unload_clip(&self, key: &str) -> PyResult<()> {
        Ok(self.engine.unload_clip(key)?)
    }

    /// Start listening for the trigger keys.
    pub fn mount(&mut self) {
        self.widget.mount(&self.keyboard);
    }

    /// Stop listening for the trigger keys.
    pub fn unmount(&mut self) {
        self.widget.unmount();
    }

    #[getter]
    pub fn is_mounted(&self) -> bool {
        self.widget.is_mounted()
    }

    /// Forward a document keydown.
    ///
    /// When `focused` names a pad, that pad's own handler runs first; the event then reaches the
    /// document-level listeners. Returns whether the default action was prevented.
    #[pyo3(signature = (key, focused=None))]
    pub fn key_down(&self, key: &str, focused: Option<&str>) -> bool {
        let mut event = KeyEvent::new(key);
        if let Some(element_id) = focused {
            self.widget.pad_key_down(element_id, &mut event);
        }
        self.keyboard.dispatch(&mut event);
        event.default_prevented()
    }

    /// Forward a pointer click on the pad `element_id`. Returns whether the pad fired.
    pub fn click(&self, element_id: &str) -> bool {
        self.widget.click(element_id).is_ok()
    }

    #[getter]
    pub fn display(&self) -> String {
        self.widget.display()
    }

    pub fn is_active(&self, element_id: &str) -> bool {
        self.widget.is_active(element_id)
    }

    /// Seconds until the next pad leaves its active state, or `None` if no pad is active.
    pub fn next_repaint_in(&self) -> Option<f64> {
        let now = Instant::now();
        self.widget
            .next_deadline(now)
            .map(|deadline| deadline.duration_since(now).as_secs_f64())
    }

    /// Current widget markup.
    pub fn render(&self) -> String {
        self.widget.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drum_machine_creation() {
        let machine = DrumMachine::new().unwrap();
        assert!(!machine.is_mounted());
        assert_eq!(machine.display(), "");
        assert_eq!(machine.next_repaint_in(), None);
    }

    #[test]
    fn test_mount_unmount_cycle() {
        let mut machine = DrumMachine::new().unwrap();

        machine.mount();
        assert!(machine.is_mounted());
        assert_eq!(machine.keyboard.listener_count(), 1);

        machine.unmount();
        assert!(!machine.is_mounted());
        assert_eq!(machine.keyboard.listener_count(), 0);
    }

    #[test]
    fn test_keys_without_clips_do_nothing() {
        let mut machine = DrumMachine::new().unwrap();
        machine.mount();

        assert!(!machine.key_down("q", None));
        assert!(!machine.click("Heater-1"));

        assert_eq!(machine.display(), "");
        assert!(!machine.is_active("Heater-1"));
    }

    #[test]
    fn test_focused_enter_prevents_default() {
        let mut machine = DrumMachine::new().unwrap();
        machine.mount();

        assert!(machine.key_down("Enter", Some("Clap")));
        assert!(machine.key_down(" ", Some("Clap")));
        assert!(!machine.key_down("Enter", None));
        assert!(!machine.key_down("Enter", Some("display")));
    }

    #[test]
    fn test_render_initial_markup() {
        let machine = DrumMachine::new().unwrap();
        let html = machine.render();

        assert!(html.starts_with(r#"<div id="drum-machine">"#));
        assert!(html.ends_with(r#"<div id="display"></div></div>"#));
    }

    #[test]
    fn test_engine_methods_fail_before_run() {
        let machine = DrumMachine::new().unwrap();

        assert!(machine.ping().is_err());
        assert!(machine.receive_msg().is_err());
        assert!(machine.load_clip_async("P", PathBuf::from("x.wav")).is_err());
    }
}
