// Score events.
//
// Events are stored in performance order on the `Score`. Times are musical
// time units as floating point (the emitter rounds them to integers on the
// way out); the model itself never rounds.
//
// `NoteEvent` is the only event the emitter can perform. `AutomationEvent`
// exists so scores carrying parameter automation can still be represented
// and loaded; the emitter reports it as unsupported rather than dropping it.

use serde::{Deserialize, Serialize};

use crate::types::PartId;

/// A single timed event belonging to one part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Note(NoteEvent),
    Automation(AutomationEvent),
}

impl Event {
    /// The part this event belongs to.
    pub fn part(&self) -> &PartId {
        match self {
            Event::Note(note) => &note.part,
            Event::Automation(automation) => &automation.part,
        }
    }

    /// Short lowercase name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Note(_) => "note",
            Event::Automation(_) => "automation",
        }
    }
}

/// A sounding note.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub part: PartId,
    /// Start time. Non-negative.
    pub offset: f64,
    /// Notated length.
    pub duration: f64,
    /// Sounding length, at most `duration`. Shorter than `duration` for
    /// detached articulations such as staccato.
    pub audible_duration: f64,
    /// Note number in the player's (MIDI) numbering.
    pub pitch: i32,
    /// Normalized loudness, nominally 0.0..=1.0.
    pub volume: f64,
}

impl NoteEvent {
    pub fn new(part: impl Into<PartId>, offset: f64, duration: f64, pitch: i32) -> Self {
        Self {
            part: part.into(),
            offset,
            duration,
            audible_duration: duration,
            pitch,
            volume: 1.0,
        }
    }

    pub fn with_audible_duration(mut self, audible_duration: f64) -> Self {
        self.audible_duration = audible_duration;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }
}

/// A parameter change on a part (volume, panning, ...). Not performed by the
/// emitter yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub part: PartId,
    pub offset: f64,
    pub parameter: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_builder_defaults_to_full_length_and_volume() {
        let note = NoteEvent::new("piano", 250.0, 500.0, 60);
        assert_eq!(note.audible_duration, 500.0);
        assert_eq!(note.volume, 1.0);
        assert_eq!(note.part, PartId::new("piano"));
    }

    #[test]
    fn accessors_cover_every_variant() {
        let note = Event::Note(NoteEvent::new("a", 1.0, 2.0, 60));
        let automation = Event::Automation(AutomationEvent {
            part: PartId::new("b"),
            offset: 3.0,
            parameter: "panning".into(),
            value: 0.5,
        });
        assert_eq!(note.part().as_str(), "a");
        assert_eq!(automation.part().as_str(), "b");
        assert_eq!(note.kind(), "note");
        assert_eq!(automation.kind(), "automation");
    }

    #[test]
    fn event_json_is_externally_tagged() {
        let json = r#"{"note": {"part": "drums", "offset": 0.0, "duration": 4.0,
            "audible_duration": 2.0, "pitch": 36, "volume": 1.0}}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            Event::Note(NoteEvent::new("drums", 0.0, 4.0, 36).with_audible_duration(2.0))
        );
    }
}
