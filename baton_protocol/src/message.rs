// Control messages understood by the player.
//
// Four messages make up the whole protocol:
//
//   /system/play                  ()
//   /track/<n>/midi/patch         (offset, patch)
//   /track/<n>/midi/percussion    (offset)
//   /track/<n>/midi/note          (offset, note, duration, audible_duration, velocity)
//
// Every argument is an int32 and argument order is part of the contract.
// `/system/play` is addressed to the player as a whole; the rest are
// addressed to one track. Offsets are advisory: the player schedules each
// message relative to the moment it receives `/system/play`.

use rosc::{OscMessage, OscType};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Address of the terminal "start playing everything queued" message.
pub const SYSTEM_PLAY: &str = "/system/play";

const TRACK_PREFIX: &str = "/track/";

/// One typed OSC message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Begin playback of everything queued so far.
    Play,
    /// Select the MIDI program for a track.
    Patch { track: u32, offset: i32, patch: i32 },
    /// Switch a track to drum-kit pitch mapping.
    Percussion { track: u32, offset: i32 },
    /// Queue one note on a track.
    Note {
        track: u32,
        offset: i32,
        note: i32,
        duration: i32,
        audible_duration: i32,
        velocity: i32,
    },
}

impl ControlMessage {
    pub fn patch(track: u32, offset: i32, patch: i32) -> Self {
        ControlMessage::Patch {
            track,
            offset,
            patch,
        }
    }

    pub fn percussion(track: u32, offset: i32) -> Self {
        ControlMessage::Percussion { track, offset }
    }

    pub fn note(
        track: u32,
        offset: i32,
        note: i32,
        duration: i32,
        audible_duration: i32,
        velocity: i32,
    ) -> Self {
        ControlMessage::Note {
            track,
            offset,
            note,
            duration,
            audible_duration,
            velocity,
        }
    }

    pub fn address(&self) -> String {
        match *self {
            ControlMessage::Play => SYSTEM_PLAY.to_string(),
            ControlMessage::Patch { track, .. } => format!("{TRACK_PREFIX}{track}/midi/patch"),
            ControlMessage::Percussion { track, .. } => {
                format!("{TRACK_PREFIX}{track}/midi/percussion")
            }
            ControlMessage::Note { track, .. } => format!("{TRACK_PREFIX}{track}/midi/note"),
        }
    }

    /// Arguments in wire order.
    pub fn args(&self) -> Vec<i32> {
        match *self {
            ControlMessage::Play => Vec::new(),
            ControlMessage::Patch { offset, patch, .. } => vec![offset, patch],
            ControlMessage::Percussion { offset, .. } => vec![offset],
            ControlMessage::Note {
                offset,
                note,
                duration,
                audible_duration,
                velocity,
                ..
            } => vec![offset, note, duration, audible_duration, velocity],
        }
    }

    pub fn to_osc(&self) -> OscMessage {
        OscMessage {
            addr: self.address(),
            args: self.args().into_iter().map(OscType::Int).collect(),
        }
    }

    /// Interpret a decoded OSC message. Rejects unknown addresses, wrong
    /// argument counts, and non-int32 arguments.
    pub fn from_osc(msg: &OscMessage) -> Result<Self, ProtocolError> {
        let args = int_args(msg)?;

        if msg.addr == SYSTEM_PLAY {
            expect_arity(msg, &args, 0)?;
            return Ok(ControlMessage::Play);
        }

        let (track, kind) = msg
            .addr
            .strip_prefix(TRACK_PREFIX)
            .and_then(|rest| rest.split_once('/'))
            .ok_or_else(|| ProtocolError::UnknownAddress(msg.addr.clone()))?;
        let track: u32 = track
            .parse()
            .map_err(|_| ProtocolError::UnknownAddress(msg.addr.clone()))?;

        match kind {
            "midi/patch" => {
                expect_arity(msg, &args, 2)?;
                Ok(ControlMessage::patch(track, args[0], args[1]))
            }
            "midi/percussion" => {
                expect_arity(msg, &args, 1)?;
                Ok(ControlMessage::percussion(track, args[0]))
            }
            "midi/note" => {
                expect_arity(msg, &args, 5)?;
                Ok(ControlMessage::note(
                    track, args[0], args[1], args[2], args[3], args[4],
                ))
            }
            _ => Err(ProtocolError::UnknownAddress(msg.addr.clone())),
        }
    }
}

fn int_args(msg: &OscMessage) -> Result<Vec<i32>, ProtocolError> {
    msg.args
        .iter()
        .map(|arg| match arg {
            OscType::Int(v) => Ok(*v),
            other => Err(ProtocolError::BadArguments {
                addr: msg.addr.clone(),
                reason: format!("expected int32, got {other:?}"),
            }),
        })
        .collect()
}

fn expect_arity(msg: &OscMessage, args: &[i32], expected: usize) -> Result<(), ProtocolError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::BadArguments {
            addr: msg.addr.clone(),
            reason: format!("expected {expected} arguments, got {}", args.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_match_player_routes() {
        assert_eq!(ControlMessage::Play.address(), "/system/play");
        assert_eq!(ControlMessage::patch(3, 0, 41).address(), "/track/3/midi/patch");
        assert_eq!(
            ControlMessage::percussion(10, 0).address(),
            "/track/10/midi/percussion"
        );
        assert_eq!(
            ControlMessage::note(1, 0, 60, 500, 450, 100).address(),
            "/track/1/midi/note"
        );
    }

    #[test]
    fn note_args_are_in_wire_order() {
        let msg = ControlMessage::note(1, 10, 36, 4, 2, 127).to_osc();
        assert_eq!(
            msg.args,
            vec![
                OscType::Int(10),
                OscType::Int(36),
                OscType::Int(4),
                OscType::Int(2),
                OscType::Int(127),
            ]
        );
    }

    #[test]
    fn play_has_no_args() {
        assert!(ControlMessage::Play.to_osc().args.is_empty());
    }

    #[test]
    fn from_osc_inverts_to_osc() {
        for msg in [
            ControlMessage::Play,
            ControlMessage::patch(2, 0, 33),
            ControlMessage::percussion(1, 0),
            ControlMessage::note(1, -3, 36, 4, 2, 127),
        ] {
            assert_eq!(ControlMessage::from_osc(&msg.to_osc()).unwrap(), msg);
        }
    }

    #[test]
    fn from_osc_rejects_unknown_routes() {
        for addr in ["/system/stop", "/track/x/midi/note", "/track/1/midi/volume", "/track/1"] {
            let msg = OscMessage {
                addr: addr.into(),
                args: vec![],
            };
            assert!(
                matches!(
                    ControlMessage::from_osc(&msg),
                    Err(ProtocolError::UnknownAddress(_))
                ),
                "{addr} should be rejected"
            );
        }
    }

    #[test]
    fn from_osc_rejects_wrong_arity() {
        let msg = OscMessage {
            addr: "/track/1/midi/patch".into(),
            args: vec![OscType::Int(0)],
        };
        let err = ControlMessage::from_osc(&msg).unwrap_err();
        assert!(err.to_string().contains("expected 2 arguments, got 1"));
    }

    #[test]
    fn from_osc_rejects_float_arguments() {
        let msg = OscMessage {
            addr: "/track/1/midi/percussion".into(),
            args: vec![OscType::Float(0.0)],
        };
        assert!(matches!(
            ControlMessage::from_osc(&msg),
            Err(ProtocolError::BadArguments { .. })
        ));
    }

    #[test]
    fn json_form_is_internally_tagged() {
        let json = serde_json::to_string(&ControlMessage::percussion(1, 0)).unwrap();
        assert_eq!(json, r#"{"type":"percussion","track":1,"offset":0}"#);
    }
}
