// OSC 1.0 stream framing.
//
// TCP has no packet boundaries, so each OSC packet on the stream is
// preceded by its size as a 4-byte big-endian integer. The functions here
// move raw packet bytes; `batch.rs` turns them into typed batches.
//
// `MAX_PACKET_SIZE` bounds the allocation a reader makes for one packet, so
// a corrupt length prefix cannot exhaust memory. A note message is under
// 64 bytes encoded, so the limit admits scores of well over 100k notes.

use std::io::{self, Read, Write};

/// Largest packet either side will write or accept (8 MB).
pub const MAX_PACKET_SIZE: u32 = 8 * 1024 * 1024;

/// Write one packet: length prefix, payload, then flush.
pub fn write_packet<W: Write>(writer: &mut W, packet: &[u8]) -> io::Result<()> {
    let len = u32::try_from(packet.len())
        .ok()
        .filter(|len| *len <= MAX_PACKET_SIZE)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "OSC packet too large: {} bytes (max {MAX_PACKET_SIZE})",
                    packet.len()
                ),
            )
        })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(packet)?;
    writer.flush()
}

/// Read one packet.
///
/// Fails with `UnexpectedEof` if the stream ends before a full packet
/// arrives, and with `InvalidData` if the prefix exceeds `MAX_PACKET_SIZE`.
pub fn read_packet<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_be_bytes(prefix);
    if len > MAX_PACKET_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("OSC packet too large: {len} bytes (max {MAX_PACKET_SIZE})"),
        ));
    }
    let mut packet = vec![0u8; len as usize];
    reader.read_exact(&mut packet)?;
    Ok(packet)
}
