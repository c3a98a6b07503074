// The resolved score and its track assignment.
//
// `Score` is a plain container: an ordered list of parts and an ordered list
// of events. Part order is significant: it is the order in which tracks are
// enumerated and therefore the order in which per-track setup is emitted.
//
// `TrackMap` is the explicit part-to-track assignment the emitter works
// from. `Score::tracks()` derives the default assignment (1, 2, 3, ... in
// part order); callers with their own numbering build one with
// `TrackMap::from_assignments`, which enforces the addressing invariants:
// track numbers are positive, and both parts and tracks are unique.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::event::Event;
use crate::instrument::Instrument;
use crate::types::{PartId, TrackNumber};

/// An instrument role within a score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub instrument: Instrument,
}

impl Part {
    pub fn new(id: impl Into<PartId>, instrument: Instrument) -> Self {
        Self {
            id: id.into(),
            instrument,
        }
    }
}

/// A finished score: parts in track-enumeration order, events in
/// performance order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub parts: Vec<Part>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Score {
    pub fn new(parts: Vec<Part>, events: Vec<Event>) -> Self {
        Self { parts, events }
    }

    /// Parse a score from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON score file.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn part(&self, id: &PartId) -> Option<&Part> {
        self.parts.iter().find(|p| &p.id == id)
    }

    /// Number of note events (the events the emitter performs).
    pub fn note_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Note(_)))
            .count()
    }

    /// Default track assignment: parts numbered from 1 in declaration order.
    pub fn tracks(&self) -> Result<TrackMap, ScoreError> {
        let mut assignments = Vec::with_capacity(self.parts.len());
        for (i, part) in self.parts.iter().enumerate() {
            let number = u32::try_from(i + 1).map_err(|_| ScoreError::TooManyParts(i + 1))?;
            assignments.push((part.id.clone(), TrackNumber(number)));
        }
        TrackMap::from_assignments(assignments)
    }
}

/// Ordered, injective mapping from part to track number.
///
/// Iteration yields entries in the order they were supplied, which is the
/// order per-track setup is emitted in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackMap {
    entries: Vec<(PartId, TrackNumber)>,
    by_part: BTreeMap<PartId, TrackNumber>,
}

impl TrackMap {
    /// Build a map from explicit assignments, rejecting track 0, duplicate
    /// parts, and duplicate tracks.
    pub fn from_assignments(
        assignments: impl IntoIterator<Item = (PartId, TrackNumber)>,
    ) -> Result<Self, ScoreError> {
        let mut map = TrackMap::default();
        let mut used_tracks = BTreeMap::new();
        for (part, track) in assignments {
            if track.0 == 0 {
                return Err(ScoreError::ZeroTrack(part));
            }
            if map.by_part.contains_key(&part) {
                return Err(ScoreError::DuplicatePart(part));
            }
            if used_tracks.insert(track, part.clone()).is_some() {
                return Err(ScoreError::DuplicateTrack { track, part });
            }
            map.by_part.insert(part.clone(), track);
            map.entries.push((part, track));
        }
        Ok(map)
    }

    pub fn get(&self, part: &PartId) -> Option<TrackNumber> {
        self.by_part.get(part).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartId, TrackNumber)> {
        self.entries.iter().map(|(part, track)| (part, *track))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
