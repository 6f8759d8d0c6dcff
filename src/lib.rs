use pyo3::pymodule;

mod audio_engine;
mod drum_machine;
mod keyboard;
mod messages;
mod pads;
mod widget;

/// The Python module implemented in Rust.
#[pymodule]
mod drum_machine_audio {
    use pyo3::prelude::*;

    #[pymodule_export]
    use super::drum_machine::DrumMachine;

    #[pymodule_export]
    use super::messages::AudioMessage;

    #[pymodule_export]
    use super::pads::PadDescriptor;

    /// All pads in grid order (Q W E / A S D / Z X C).
    #[pyfunction]
    fn pads() -> Vec<PadDescriptor> {
        super::pads::pads().to_vec()
    }

    /// The pad bound to `key` (case-insensitive), if any.
    #[pyfunction]
    fn find_by_key(key: &str) -> Option<PadDescriptor> {
        super::pads::find_by_key(key).copied()
    }
}
