//! The static pad table.
//!
//! Nine pads laid out as a 3x3 grid in reading order. The order of [`PADS`] is part of the
//! public contract: hosts address clip slots by grid position and expect the trigger keys to
//! enumerate as `Q W E A S D Z X C`.

use pyo3::prelude::*;

use crate::audio_engine::constants::NUM_PADS;

/// Immutable description of a single pad.
#[pyclass(frozen)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadDescriptor {
    /// Keyboard shortcut, also the identifier of the bound clip.
    pub trigger_key: char,

    /// Identifier of the pad's visual container.
    pub element_id: &'static str,

    /// Label shown on the display when the pad fires.
    pub display_name: &'static str,

    /// Location of the audio asset.
    pub audio_source: &'static str,
}

macro_rules! pad {
    ($key:literal, $id:literal, $name:literal, $file:literal) => {
        PadDescriptor {
            trigger_key: $key,
            element_id: $id,
            display_name: $name,
            audio_source: concat!(
                "https://cdn.freecodecamp.org/testable-projects-fcc/audio/",
                $file
            ),
        }
    };
}

/// All pads, in grid order.
pub static PADS: [PadDescriptor; NUM_PADS] = [
    pad!('Q', "Heater-1", "Heater 1", "Heater-1.mp3"),
    pad!('W', "Heater-2", "Heater 2", "Heater-2.mp3"),
    pad!('E', "Heater-3", "Heater 3", "Heater-3.mp3"),
    pad!('A', "Heater-4", "Heater 4", "Heater-4_1.mp3"),
    pad!('S', "Clap", "Clap", "Heater-6.mp3"),
    pad!('D', "Open-HH", "Open-HH", "Dsc_Oh.mp3"),
    pad!('Z', "Kick-n'-Hat", "Kick-n'-Hat", "Kick_n_Hat.mp3"),
    pad!('X', "Kick", "Kick", "RP4_KICK_1.mp3"),
    pad!('C', "Closed-HH", "Closed-HH", "Cev_H2.mp3"),
];

/// Returns the ordered pad table.
pub fn pads() -> &'static [PadDescriptor; NUM_PADS] {
    &PADS
}

/// Trigger keys in grid order.
pub fn trigger_keys() -> impl Iterator<Item = char> {
    PADS.iter().map(|pad| pad.trigger_key)
}

/// Looks a pad up by its trigger key, ignoring case.
///
/// Anything that is not exactly one character naming a trigger key (including named keys such
/// as `"Enter"` or `"Shift"`) yields `None`.
pub fn find_by_key(key: &str) -> Option<&'static PadDescriptor> {
    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    find_by_char(c)
}

/// Looks a pad up by a single key character, ignoring case.
pub fn find_by_char(key: char) -> Option<&'static PadDescriptor> {
    let mut upper = key.to_uppercase();
    let (Some(c), None) = (upper.next(), upper.next()) else {
        return None;
    };
    PADS.iter().find(|pad| pad.trigger_key == c)
}

/// Looks a pad up by the id of its visual container.
pub fn find_by_element_id(element_id: &str) -> Option<&'static PadDescriptor> {
    PADS.iter().find(|pad| pad.element_id == element_id)
}

impl PadDescriptor {
    /// Grid position of this pad, which is also its clip slot id.
    pub fn index(&self) -> usize {
        PADS.iter()
            .position(|pad| pad.trigger_key == self.trigger_key)
            .unwrap_or(0)
    }
}

#[pymethods]
impl PadDescriptor {
    #[getter]
    fn trigger_key(&self) -> String {
        self.trigger_key.to_string()
    }

    #[getter]
    fn element_id(&self) -> &'static str {
        self.element_id
    }

    #[getter]
    fn display_name(&self) -> &'static str {
        self.display_name
    }

    #[getter]
    fn audio_source(&self) -> &'static str {
        self.audio_source
    }

    fn __repr__(&self) -> String {
        format!(
            "PadDescriptor(trigger_key='{}', element_id=\"{}\", display_name=\"{}\")",
            self.trigger_key, self.element_id, self.display_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_order() {
        let keys: String = trigger_keys().collect();
        assert_eq!(keys, "QWEADSZXC");
        assert_eq!(pads().len(), 9);
    }

    #[test]
    fn test_trigger_keys_distinct() {
        let unique: HashSet<char> = trigger_keys().collect();
        assert_eq!(unique.len(), NUM_PADS);

        let ids: HashSet<&str> = PADS.iter().map(|pad| pad.element_id).collect();
        assert_eq!(ids.len(), NUM_PADS);
    }

    #[test]
    fn test_trigger_keys_are_uppercase() {
        assert!(trigger_keys().all(|key| key.is_ascii_uppercase()));
    }

    #[test]
    fn test_find_by_key_case_insensitive() {
        let upper = find_by_key("A").unwrap();
        let lower = find_by_key("a").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower.display_name, "Heater 4");
    }

    #[test]
    fn test_find_by_key_unknown() {
        assert!(find_by_key("P").is_none());
        assert!(find_by_key("").is_none());
        assert!(find_by_key("QW").is_none());
        assert!(find_by_key("Enter").is_none());
        assert!(find_by_key(" ").is_none());
    }

    #[test]
    fn test_find_by_element_id() {
        let pad = find_by_element_id("Kick-n'-Hat").unwrap();
        assert_eq!(pad.trigger_key, 'Z');
        assert!(find_by_element_id("kick-n'-hat").is_none());
    }

    #[test]
    fn test_index_matches_grid_position() {
        for (i, pad) in PADS.iter().enumerate() {
            assert_eq!(pad.index(), i);
        }
    }

    #[test]
    fn test_audio_sources() {
        assert!(PADS.iter().all(|pad| pad
            .audio_source
            .starts_with("https://cdn.freecodecamp.org/testable-projects-fcc/audio/")));
        assert_eq!(
            find_by_char('s').unwrap().audio_source,
            "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-6.mp3"
        );
    }
}
