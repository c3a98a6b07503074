// Errors from encoding, decoding, or interpreting OSC packets.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("OSC codec error: {0}")]
    Osc(#[from] rosc::OscError),

    #[error("OSC packet too large: {size} bytes (max {max})")]
    PacketTooLarge { size: usize, max: u32 },

    #[error("unknown OSC address: {0}")]
    UnknownAddress(String),

    #[error("bad arguments for {addr}: {reason}")]
    BadArguments { addr: String, reason: String },

    #[error("expected an OSC bundle, got a bare message to {0}")]
    NotABundle(String),

    #[error("nested OSC bundles are not part of the protocol")]
    NestedBundle,
}
