// Ordered batches of control messages.
//
// A `Batch` is everything one score sends to the player: the per-track
// setup, every note, and the final `/system/play`. It travels as a single
// OSC bundle so the player sees all of it or none of it; the bundle's
// content order is the batch's insertion order.
//
// The bundle timetag is advisory. It records when the batch was built and
// the player is free to ignore it.

use std::time::SystemTime;

use rosc::{OscBundle, OscPacket, OscTime};

use crate::error::ProtocolError;
use crate::framing::MAX_PACKET_SIZE;
use crate::message::ControlMessage;

/// The OSC "immediately" timetag.
pub const IMMEDIATELY: OscTime = OscTime {
    seconds: 0,
    fractional: 1,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    timetag: OscTime,
    messages: Vec<ControlMessage>,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    /// An empty batch stamped with the current wall-clock time. Clocks the
    /// OSC epoch cannot represent fall back to `IMMEDIATELY`.
    pub fn new() -> Self {
        let timetag = OscTime::try_from(SystemTime::now()).unwrap_or(IMMEDIATELY);
        Self::with_timetag(timetag)
    }

    pub fn with_timetag(timetag: OscTime) -> Self {
        Self {
            timetag,
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: ControlMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ControlMessage] {
        &self.messages
    }

    pub fn timetag(&self) -> OscTime {
        self.timetag
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn to_packet(&self) -> OscPacket {
        OscPacket::Bundle(OscBundle {
            timetag: self.timetag,
            content: self
                .messages
                .iter()
                .map(|m| OscPacket::Message(m.to_osc()))
                .collect(),
        })
    }

    /// Encode as one OSC bundle (without stream framing). Bundles larger
    /// than `MAX_PACKET_SIZE` cannot be framed and are rejected here.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let bytes = rosc::encoder::encode(&self.to_packet())?;
        if bytes.len() > MAX_PACKET_SIZE as usize {
            return Err(ProtocolError::PacketTooLarge {
                size: bytes.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        Ok(bytes)
    }

    /// Decode one unframed OSC packet, which must be a flat bundle of
    /// protocol messages.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (_rest, packet) = rosc::decoder::decode_udp(bytes)?;
        Self::from_packet(packet)
    }

    pub fn from_packet(packet: OscPacket) -> Result<Self, ProtocolError> {
        let bundle = match packet {
            OscPacket::Bundle(bundle) => bundle,
            OscPacket::Message(msg) => return Err(ProtocolError::NotABundle(msg.addr)),
        };
        let mut batch = Batch::with_timetag(bundle.timetag);
        for item in &bundle.content {
            match item {
                OscPacket::Message(msg) => batch.push(ControlMessage::from_osc(msg)?),
                OscPacket::Bundle(_) => return Err(ProtocolError::NestedBundle),
            }
        }
        Ok(batch)
    }
}
