// Errors raised while loading a score or deriving its track assignment.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{PartId, TrackNumber};

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("duplicate part id: {0}")]
    DuplicatePart(PartId),

    #[error("track {track} assigned to more than one part (second: {part})")]
    DuplicateTrack { track: TrackNumber, part: PartId },

    #[error("part {0} assigned track 0; track numbers start at 1")]
    ZeroTrack(PartId),

    #[error("too many parts to number: {0}")]
    TooManyParts(usize),

    #[error("score JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read score {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
