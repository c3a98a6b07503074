// Failures an emission can end in, plus config loading failures. Every
// `EmitError` variant other than `Transport` is raised before anything
// touches the network.

use std::path::PathBuf;

use baton_protocol::ProtocolError;
use baton_score::{PartId, ScoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    /// The score contains an event the emitter cannot perform.
    #[error("unsupported {kind} event #{index} on part {part}: {event}")]
    UnsupportedEvent {
        index: usize,
        kind: &'static str,
        part: PartId,
        event: String,
    },

    /// A note belongs to a part that has no track.
    #[error("event #{index} belongs to part {part}, which has no track assigned")]
    UnassignedPart { index: usize, part: PartId },

    /// The track map names a part the score does not contain.
    #[error("track map names part {0}, which is not in the score")]
    UnknownPart(PartId),

    #[error("invalid score: {0}")]
    Score(#[from] ScoreError),

    #[error("failed to encode batch: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connect or write failure, passed through as-is.
    #[error(transparent)]
    Transport(#[from] std::io::Error),
}

/// Failure to read or parse an `EmitterConfig` file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
