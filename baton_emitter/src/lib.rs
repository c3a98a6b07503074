// baton_emitter: sends a finished score to a player process.
//
// The emitter turns a `Score` (from `baton_score`) into one `Batch` of
// control messages (from `baton_protocol`) and delivers it over TCP in a
// single send: per-track setup first, then every note in score order, then
// `/system/play`. Translation either succeeds completely or nothing is sent.
//
// Module overview:
// - `emitter.rs`:   `Emitter` and `build_batch`, the score-to-batch
//                   translation, plus the float-to-int rounding rules.
// - `transport.rs`: `Transport` trait, the TCP implementation, and an
//                   in-memory recording implementation for tests and dry
//                   runs.
// - `receiver.rs`:  A minimal receiving player: TCP listener that decodes
//                   incoming batches and hands them over a channel. Used by
//                   integration tests and `baton listen`.
// - `config.rs`:    `EmitterConfig` (JSON-loadable) and `Destination`.
// - `error.rs`:     `EmitError` and `ConfigError`.
//
// The emitter holds no state between calls. Each `emit_score` builds its own
// batch and opens its own connection, so concurrent emissions to different
// players never interact. Two emissions racing to the same player arrive in
// an unspecified order; serializing them is the caller's job.

pub mod config;
pub mod emitter;
pub mod error;
pub mod receiver;
pub mod transport;

pub use config::{Destination, EmitterConfig};
pub use emitter::{Emitter, build_batch, to_wire_int, velocity};
pub use error::{ConfigError, EmitError};
pub use receiver::{ReceiverHandle, start_receiver};
pub use transport::{RecordingTransport, TcpTransport, Transport};
