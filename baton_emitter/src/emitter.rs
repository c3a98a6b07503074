// Score-to-batch translation and delivery.
//
// `build_batch` is the whole translation. For a score with tracks
// t1..tn and events e1..em it produces, in this order:
//
//   patch(t1) [percussion(t1)] ... patch(tn) [percussion(tn)]
//   note(e1) ... note(em)
//   play
//
// Setup runs once per track in track-map order, before any note, so the
// player has every track configured by the time notes are queued. `play`
// is always last. The player relies on this ordering; it is not cosmetic.
//
// Times and velocities leave here as int32. Offsets and durations are
// rounded half away from zero (`f64::round`), so 0.5 becomes 1 and -0.5
// becomes -1, and the same input always yields the same integer. Velocity
// is `round(volume * 127)`. Volumes outside 0.0..=1.0 are passed through as
// out-of-range velocities (logged, not clamped); the player decides what to
// do with them. Values beyond the int32 range saturate and NaN becomes 0,
// which is what an `as` cast does.
//
// Any event that is not a note aborts translation. Since sending happens
// only after a complete batch exists, an aborted translation sends nothing.

use baton_protocol::{Batch, ControlMessage};
use baton_score::{Event, Instrument, NoteEvent, Score, TrackMap, TrackNumber};
use tracing::{debug, trace, warn};

use crate::config::{Destination, EmitterConfig};
use crate::error::EmitError;
use crate::transport::{TcpTransport, Transport};

/// Velocity of a note at full volume.
const MAX_VELOCITY: f64 = 127.0;

/// Sends scores to one player.
#[derive(Debug)]
pub struct Emitter<T = TcpTransport> {
    destination: Destination,
    transport: T,
}

impl Emitter<TcpTransport> {
    /// A TCP emitter for the configured destination and timeouts.
    pub fn from_config(config: &EmitterConfig) -> Self {
        Self::new(config.destination(), TcpTransport::from_config(config))
    }
}

impl<T: Transport> Emitter<T> {
    pub fn new(destination: Destination, transport: T) -> Self {
        Self {
            destination,
            transport,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Emit `score` using its default track assignment.
    pub fn emit_score(&self, score: &Score) -> Result<(), EmitError> {
        let tracks = score.tracks()?;
        self.emit_with_tracks(score, &tracks)
    }

    /// Emit `score` addressed according to `tracks`. Every part that owns a
    /// note must appear in `tracks`.
    pub fn emit_with_tracks(&self, score: &Score, tracks: &TrackMap) -> Result<(), EmitError> {
        let batch = match build_batch(score, tracks) {
            Ok(batch) => batch,
            Err(e) => {
                debug!("emission to {} failed before sending: {}", self.destination, e);
                return Err(e);
            }
        };
        debug!(
            "sending {} messages ({} tracks, {} notes) to {}",
            batch.len(),
            tracks.len(),
            score.events.len(),
            self.destination
        );
        self.transport.send(&self.destination, &batch)?;
        debug!("batch delivered to {}", self.destination);
        Ok(())
    }
}

/// Translate a score into the ordered batch the player expects.
pub fn build_batch(score: &Score, tracks: &TrackMap) -> Result<Batch, EmitError> {
    let mut batch = Batch::new();

    trace!("configuring {} tracks", tracks.len());
    for (part_id, track) in tracks.iter() {
        let part = score
            .part(part_id)
            .ok_or_else(|| EmitError::UnknownPart(part_id.clone()))?;
        match &part.instrument {
            Instrument::Patch(patch) => {
                batch.push(ControlMessage::patch(track.0, 0, patch.patch_number));
                if patch.is_percussion {
                    batch.push(ControlMessage::percussion(track.0, 0));
                }
            }
        }
    }

    trace!("emitting {} events", score.events.len());
    for (index, event) in score.events.iter().enumerate() {
        match event {
            Event::Note(note) => {
                let track = tracks.get(&note.part).ok_or_else(|| EmitError::UnassignedPart {
                    index,
                    part: note.part.clone(),
                })?;
                batch.push(note_message(track, note));
            }
            Event::Automation(_) => {
                return Err(EmitError::UnsupportedEvent {
                    index,
                    kind: event.kind(),
                    part: event.part().clone(),
                    event: format!("{event:?}"),
                });
            }
        }
    }

    batch.push(ControlMessage::Play);
    Ok(batch)
}

fn note_message(track: TrackNumber, note: &NoteEvent) -> ControlMessage {
    ControlMessage::note(
        track.0,
        to_wire_int(note.offset),
        note.pitch,
        to_wire_int(note.duration),
        to_wire_int(note.audible_duration),
        velocity(note.volume),
    )
}

/// Round musical time to the player's integer time, half away from zero.
pub fn to_wire_int(value: f64) -> i32 {
    value.round() as i32
}

/// Map a normalized volume onto MIDI velocity. Not clamped.
pub fn velocity(volume: f64) -> i32 {
    if !(0.0..=1.0).contains(&volume) {
        warn!("volume {} is outside 0.0..=1.0; velocity will be out of range", volume);
    }
    to_wire_int(volume * MAX_VELOCITY)
}

#[cfg(test)]
mod tests {
    use std::io;

    use baton_score::{AutomationEvent, Part, PartId};

    use super::*;
    use crate::transport::RecordingTransport;

    fn drums_and_bass() -> Score {
        Score::new(
            vec![
                Part::new("drums", Instrument::percussion(1)),
                Part::new("bass", Instrument::patch(33)),
            ],
            vec![Event::Note(
                NoteEvent::new("drums", 0.0, 4.0, 36).with_audible_duration(2.0),
            )],
        )
    }

    fn automation(part: &str) -> Event {
        Event::Automation(AutomationEvent {
            part: PartId::new(part),
            offset: 2.0,
            parameter: "panning".into(),
            value: 0.25,
        })
    }

    fn recording_emitter() -> Emitter<RecordingTransport> {
        Emitter::new(Destination::localhost(27278), RecordingTransport::new())
    }

    #[test]
    fn percussion_part_then_tonal_part_then_note_then_play() {
        let score = drums_and_bass();
        let batch = build_batch(&score, &score.tracks().unwrap()).unwrap();
        assert_eq!(
            batch.messages(),
            &[
                ControlMessage::patch(1, 0, 1),
                ControlMessage::percussion(1, 0),
                ControlMessage::patch(2, 0, 33),
                ControlMessage::note(1, 0, 36, 4, 2, 127),
                ControlMessage::Play,
            ]
        );
    }

    #[test]
    fn setup_runs_once_per_track_regardless_of_note_count() {
        let mut score = drums_and_bass();
        for i in 0..10 {
            score
                .events
                .push(Event::Note(NoteEvent::new("bass", f64::from(i), 1.0, 40)));
        }
        let batch = build_batch(&score, &score.tracks().unwrap()).unwrap();
        let patches = batch
            .messages()
            .iter()
            .filter(|m| matches!(m, ControlMessage::Patch { .. }))
            .count();
        let notes = batch
            .messages()
            .iter()
            .filter(|m| matches!(m, ControlMessage::Note { .. }))
            .count();
        assert_eq!(patches, 2);
        assert_eq!(notes, 11);
        assert_eq!(batch.len(), 2 + 1 + 11 + 1);
    }

    #[test]
    fn notes_keep_score_order_not_track_order() {
        let score = Score::new(
            vec![
                Part::new("a", Instrument::patch(0)),
                Part::new("b", Instrument::patch(0)),
            ],
            vec![
                Event::Note(NoteEvent::new("b", 0.0, 1.0, 60)),
                Event::Note(NoteEvent::new("a", 0.0, 1.0, 61)),
                Event::Note(NoteEvent::new("b", 5.0, 1.0, 62)),
            ],
        );
        let batch = build_batch(&score, &score.tracks().unwrap()).unwrap();
        let pitches: Vec<_> = batch
            .messages()
            .iter()
            .filter_map(|m| match m {
                ControlMessage::Note { track, note, .. } => Some((*track, *note)),
                _ => None,
            })
            .collect();
        assert_eq!(pitches, vec![(2, 60), (1, 61), (2, 62)]);
    }

    #[test]
    fn explicit_track_map_drives_addressing_and_setup_order() {
        let score = drums_and_bass();
        let tracks = TrackMap::from_assignments(vec![
            (PartId::new("bass"), TrackNumber(9)),
            (PartId::new("drums"), TrackNumber(4)),
        ])
        .unwrap();
        let batch = build_batch(&score, &tracks).unwrap();
        assert_eq!(
            batch.messages(),
            &[
                ControlMessage::patch(9, 0, 33),
                ControlMessage::patch(4, 0, 1),
                ControlMessage::percussion(4, 0),
                ControlMessage::note(4, 0, 36, 4, 2, 127),
                ControlMessage::Play,
            ]
        );
    }

    #[test]
    fn empty_score_is_just_play() {
        let score = Score::default();
        let batch = build_batch(&score, &score.tracks().unwrap()).unwrap();
        assert_eq!(batch.messages(), &[ControlMessage::Play]);
    }

    #[test]
    fn times_round_half_away_from_zero() {
        assert_eq!(to_wire_int(0.5), 1);
        assert_eq!(to_wire_int(-0.5), -1);
        assert_eq!(to_wire_int(2.5), 3);
        assert_eq!(to_wire_int(1.4999), 1);
        assert_eq!(to_wire_int(1.5000001), 2);
        assert_eq!(to_wire_int(0.0), 0);
    }

    #[test]
    fn rounding_is_stable_for_repeated_input() {
        for value in [0.5, 123.456, 999.5, -7.5, 1e6 + 0.49] {
            assert_eq!(to_wire_int(value), to_wire_int(value));
        }
    }

    #[test]
    fn rounding_saturates_and_maps_nan_to_zero() {
        assert_eq!(to_wire_int(1e12), i32::MAX);
        assert_eq!(to_wire_int(-1e12), i32::MIN);
        assert_eq!(to_wire_int(f64::NAN), 0);
    }

    #[test]
    fn velocity_spans_midi_range() {
        assert_eq!(velocity(1.0), 127);
        assert_eq!(velocity(0.0), 0);
        assert_eq!(velocity(0.5), 64);
    }

    #[test]
    fn out_of_range_volume_passes_through() {
        assert_eq!(velocity(2.0), 254);
        assert_eq!(velocity(-0.1), -13);
    }

    #[test]
    fn fractional_note_fields_are_rounded() {
        let score = Score::new(
            vec![Part::new("p", Instrument::patch(0))],
            vec![Event::Note(
                NoteEvent::new("p", 10.5, 99.5, 72)
                    .with_audible_duration(49.4)
                    .with_volume(0.5),
            )],
        );
        let batch = build_batch(&score, &score.tracks().unwrap()).unwrap();
        assert_eq!(batch.messages()[1], ControlMessage::note(1, 11, 72, 100, 49, 64));
    }

    #[test]
    fn unsupported_event_names_the_event_and_sends_nothing() {
        let mut score = drums_and_bass();
        score.events.push(automation("bass"));
        score
            .events
            .push(Event::Note(NoteEvent::new("bass", 3.0, 1.0, 40)));

        let emitter = recording_emitter();
        let err = emitter.emit_score(&score).unwrap_err();
        match err {
            EmitError::UnsupportedEvent {
                index,
                kind,
                ref part,
                ref event,
            } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "automation");
                assert_eq!(part.as_str(), "bass");
                assert!(event.contains("Automation"), "{event}");
                assert!(event.contains("panning"), "{event}");
            }
            other => panic!("expected UnsupportedEvent, got {other:?}"),
        }
        assert!(emitter.transport().sent().is_empty());
    }

    #[test]
    fn unsupported_event_at_start_also_aborts() {
        let mut score = drums_and_bass();
        score.events.insert(0, automation("drums"));
        let err = build_batch(&score, &score.tracks().unwrap()).unwrap_err();
        assert!(matches!(err, EmitError::UnsupportedEvent { index: 0, .. }));
    }

    #[test]
    fn orphan_note_is_rejected() {
        let mut score = drums_and_bass();
        score
            .events
            .push(Event::Note(NoteEvent::new("flute", 0.0, 1.0, 80)));
        let emitter = recording_emitter();
        let err = emitter.emit_score(&score).unwrap_err();
        assert!(matches!(
            err,
            EmitError::UnassignedPart { index: 1, ref part } if part.as_str() == "flute"
        ));
        assert!(emitter.transport().sent().is_empty());
    }

    #[test]
    fn track_map_naming_missing_part_is_rejected() {
        let score = drums_and_bass();
        let tracks = TrackMap::from_assignments(vec![(PartId::new("harp"), TrackNumber(1))])
            .unwrap();
        let err = build_batch(&score, &tracks).unwrap_err();
        assert!(matches!(err, EmitError::UnknownPart(ref p) if p.as_str() == "harp"));
    }

    #[test]
    fn duplicate_parts_fail_before_sending() {
        let mut score = drums_and_bass();
        score.parts.push(Part::new("bass", Instrument::patch(0)));
        let emitter = recording_emitter();
        assert!(matches!(
            emitter.emit_score(&score),
            Err(EmitError::Score(_))
        ));
        assert!(emitter.transport().sent().is_empty());
    }

    #[test]
    fn successful_emit_sends_exactly_one_batch() {
        let emitter = recording_emitter();
        emitter.emit_score(&drums_and_bass()).unwrap();
        let sent = emitter.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Destination::localhost(27278));
        assert_eq!(sent[0].1.len(), 5);
        assert_eq!(sent[0].1.messages().last(), Some(&ControlMessage::Play));
    }

    #[test]
    fn transport_error_propagates_unchanged() {
        let emitter = Emitter::new(
            Destination::localhost(1),
            RecordingTransport::failing(io::ErrorKind::ConnectionRefused),
        );
        let err = emitter.emit_score(&drums_and_bass()).unwrap_err();
        match err {
            EmitError::Transport(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn emitters_share_no_state() {
        let first = recording_emitter();
        let second = Emitter::new(Destination::localhost(9999), RecordingTransport::new());
        let other_score = Score::new(
            vec![Part::new("solo", Instrument::patch(73))],
            vec![Event::Note(NoteEvent::new("solo", 0.0, 1.0, 79))],
        );

        first.emit_score(&drums_and_bass()).unwrap();
        second.emit_score(&other_score).unwrap();
        first.emit_score(&drums_and_bass()).unwrap();

        let a = first.transport().sent();
        let b = second.transport().sent();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].1.messages(), a[1].1.messages());
        assert_eq!(
            b[0].1.messages(),
            &[
                ControlMessage::patch(1, 0, 73),
                ControlMessage::note(1, 0, 79, 1, 1, 127),
                ControlMessage::Play,
            ]
        );
    }
}
