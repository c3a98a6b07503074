// Identifier newtypes shared by the score model and the emitter.
//
// `PartId` names an instrument role within one score. `TrackNumber` is the
// positive integer a part is addressed by on the wire (`/track/<n>/...`).
// Both serialize as their bare inner value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a part within a score, unique per score.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub String);

impl PartId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Player-side track a part is addressed on. Always positive once it has
/// passed through a `TrackMap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackNumber(pub u32);

impl fmt::Display for TrackNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
