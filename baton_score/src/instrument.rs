// Instrument definitions attached to parts.
//
// Only one instrument family exists today: patch instruments, which the
// player realizes as a MIDI program on the part's track. `Instrument` is
// still an enum so that a new family forces every consumer's `match` to be
// revisited at compile time.

use serde::{Deserialize, Serialize};

/// The instrument a part is played on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    /// A General MIDI style program selection.
    Patch(PatchInstrument),
}

impl Instrument {
    pub fn patch(patch_number: i32) -> Self {
        Instrument::Patch(PatchInstrument {
            patch_number,
            is_percussion: false,
        })
    }

    pub fn percussion(patch_number: i32) -> Self {
        Instrument::Patch(PatchInstrument {
            patch_number,
            is_percussion: true,
        })
    }
}

/// Program number plus percussion flag. Percussion switches the player's
/// pitch interpretation from tonal to drum-kit mapping for the whole track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInstrument {
    pub patch_number: i32,
    #[serde(default)]
    pub is_percussion: bool,
}
