// baton_protocol: the wire vocabulary spoken to a player process.
//
// A player is an external process that owns numbered tracks and renders
// what it is told to. It is driven with OSC (Open Sound Control) messages,
// delivered as one bundle per score over a TCP stream. This crate is shared
// by the emitting side (`baton_emitter`) and anything that wants to receive
// and inspect what an emitter sends; it knows nothing about scores.
//
// Module overview:
// - `message.rs`: `ControlMessage`, the typed form of every OSC message in
//                 the protocol, with conversions to and from `rosc` messages.
// - `batch.rs`:   `Batch`, an ordered group of control messages encoded as a
//                 single OSC bundle.
// - `framing.rs`: OSC 1.0 stream framing (4-byte big-endian length prefix
//                 per packet) over any `Read`/`Write`.
// - `error.rs`:   `ProtocolError`.
//
// Design decisions:
// - **Typed messages, not raw OSC.** Addresses and argument order are
//   fixed by the player, so they are built in exactly one place
//   (`ControlMessage::to_osc`) and parsed in exactly one place
//   (`ControlMessage::from_osc`).
// - **All arguments are int32.** The player works in integer time and
//   velocity; float-to-int conversion happens before a message exists.
// - **No async runtime.** Framing uses `std::io`, matching the blocking
//   one-shot send the emitter performs.

pub mod batch;
pub mod error;
pub mod framing;
pub mod message;

pub use batch::{Batch, IMMEDIATELY};
pub use error::ProtocolError;
pub use framing::{MAX_PACKET_SIZE, read_packet, write_packet};
pub use message::{ControlMessage, SYSTEM_PLAY};
