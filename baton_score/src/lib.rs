// baton_score: the resolved score model consumed by the emitter.
//
// A `Score` arrives here finished: parts already carry their instruments,
// events already carry absolute offsets and durations. Nothing in this crate
// composes or transforms music; it only holds the result and answers the
// questions the emitter asks of it (which parts exist, which track each part
// is addressed on, which events to perform and in what order).
//
// Module overview:
// - `types.rs`:      Identifier newtypes `PartId`, `TrackNumber`.
// - `instrument.rs`: The `Instrument` sum type and its `PatchInstrument`
//                    variant (MIDI program number + percussion flag).
// - `event.rs`:      The `Event` sum type: `NoteEvent` plus the
//                    `AutomationEvent` the emitter does not yet perform.
// - `score.rs`:      `Part`, `Score`, JSON loading, and `TrackMap`, the
//                    explicit part-to-track assignment.
// - `error.rs`:      `ScoreError`.
//
// Everything derives serde traits so scores can be stored as JSON and fed to
// the `baton` CLI.

pub mod error;
pub mod event;
pub mod instrument;
pub mod score;
pub mod types;

pub use error::ScoreError;
pub use event::{AutomationEvent, Event, NoteEvent};
pub use instrument::{Instrument, PatchInstrument};
pub use score::{Part, Score, TrackMap};
pub use types::{PartId, TrackNumber};
