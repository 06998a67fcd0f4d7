//! End-to-end editing and traversal through the public surface.

use tg_model::{ControlChange, ModelError, Note, Pattern, Song, Tick};

fn note_times(pattern: &Pattern) -> Vec<Tick> {
    pattern.notes().iter().map(|n| n.time()).collect()
}

fn assert_timeline_invariants(pattern: &Pattern) {
    let times = note_times(pattern);
    for pair in times.windows(2) {
        assert!(pair[0] < pair[1], "note times not strictly increasing: {:?}", times);
    }
    for node in pattern.notes().iter() {
        assert!(!node.is_empty(), "reachable node with no payloads");
        for payload in node.payloads() {
            assert!(node.get(payload.pitch).is_some());
        }
    }
    for node in pattern.ccs().iter() {
        assert!(!node.is_empty(), "reachable node with no payloads");
    }
}

#[test]
fn edit_sequence_keeps_timeline_shape() {
    let mut song = Song::new("edit test");
    let pattern = song.pattern_mut(0).unwrap();

    pattern.add_note(10, Note::new(60, 4, 100)).unwrap();
    pattern.add_note(20, Note::new(64, 2, 90)).unwrap();
    pattern.add_note(10, Note::new(67, 1, 80)).unwrap();

    // Two distinct ticks: 10 carries pitches {60, 67}, 20 carries {64}
    assert_eq!(note_times(pattern), vec![10, 20]);
    let node = pattern.notes().node_at(10).unwrap();
    assert_eq!(node.len(), 2);
    assert!(node.get(60).is_some());
    assert!(node.get(67).is_some());
    assert_eq!(pattern.notes().node_at(20).unwrap().len(), 1);
    assert_timeline_invariants(pattern);

    // At-or-after lookup from tick 15 resolves to the node at 20, where
    // pitch 60 is absent
    assert_eq!(pattern.notes().find(15, 60), None);

    // Move pitch 60 off tick 10; its length and velocity travel with it
    pattern.move_note(10, 25, 60).unwrap();
    assert_eq!(pattern.notes().node_at(10).unwrap().len(), 1);
    assert_eq!(
        pattern.notes().find(25, 60),
        Some(&Note::new(60, 4, 100))
    );
    assert_timeline_invariants(pattern);

    // Removing the last payload on tick 10 removes the tick entirely
    pattern.remove_note(10, 67);
    assert_eq!(note_times(pattern), vec![20, 25]);
    assert_timeline_invariants(pattern);
}

#[test]
fn playback_pull_and_seek() {
    let mut song = Song::new("pull test");
    let pattern = song.pattern_mut(0).unwrap();
    pattern.add_note(0, Note::new(36, 6, 127)).unwrap();
    pattern.add_note(24, Note::new(38, 6, 110)).unwrap();
    pattern.add_note(48, Note::new(36, 6, 127)).unwrap();

    let mut pulled = Vec::new();
    while let Some(node) = pattern.next_note() {
        pulled.push(node.time());
    }
    assert_eq!(pulled, vec![0, 24, 48]);

    // Transport jump into the middle of the bar
    pattern.seek_note(25);
    assert_eq!(pattern.next_note().unwrap().time(), 48);
    assert!(pattern.next_note().is_none());

    pattern.reset();
    assert_eq!(pattern.next_note().unwrap().time(), 0);
}

#[test]
fn cc_ramp_editing() {
    let mut song = Song::new("cc test");
    let pattern = song.pattern_mut(1).unwrap();

    // A filter sweep: interpolated ramp with a hard reset at the end
    pattern.add_cc(0, ControlChange::new(74, 0, true)).unwrap();
    pattern.add_cc(48, ControlChange::new(74, 127, true)).unwrap();
    pattern.add_cc(96, ControlChange::new(74, 0, false)).unwrap();
    // Same tick, different controller: merges onto the existing node
    pattern.add_cc(96, ControlChange::new(7, 100, false)).unwrap();

    assert_eq!(pattern.ccs().len(), 3);
    let node = pattern.ccs().node_at(96).unwrap();
    assert_eq!(node.len(), 2);
    assert!(!node.get(74).unwrap().interpolate);
    assert_eq!(node.get(7).unwrap().value, 100);

    // Re-recording the sweep endpoint overwrites in place
    pattern.add_cc(48, ControlChange::new(74, 96, true)).unwrap();
    assert_eq!(pattern.ccs().len(), 3);
    assert_eq!(pattern.ccs().node_at(48).unwrap().get(74).unwrap().value, 96);

    pattern.move_cc(48, 72, 74).unwrap();
    assert!(pattern.ccs().node_at(48).is_none());
    assert_eq!(pattern.ccs().node_at(72).unwrap().get(74).unwrap().value, 96);
}

#[test]
fn follow_chain_drives_pattern_order() {
    let mut song = Song::new("chain test");

    // a -> b -> a, the rest loop on themselves
    song.pattern_mut(0).unwrap().set_follow(1);
    song.pattern_mut(1).unwrap().set_follow(0);

    song.pattern_mut(0)
        .unwrap()
        .add_note(0, Note::new(60, 4, 100))
        .unwrap();
    song.pattern_mut(1)
        .unwrap()
        .add_note(0, Note::new(72, 4, 100))
        .unwrap();

    // Engine-style traversal: drain a pattern, hop to its follow slot
    let mut slot = 0u8;
    let mut first_pitches = Vec::new();
    for _ in 0..4 {
        let pattern = song.pattern_mut(slot).unwrap();
        pattern.reset();
        while let Some(node) = pattern.next_note() {
            first_pitches.extend(node.payloads().map(|n| n.pitch));
        }
        slot = pattern.follow();
    }
    assert_eq!(first_pitches, vec![60, 72, 60, 72]);

    // Self-follow loops forever on the same slot
    assert_eq!(song.pattern(2).unwrap().follow(), 2);
}

#[test]
fn boundary_errors() {
    let mut song = Song::new("errors");

    assert_eq!(song.pattern(8).unwrap_err(), ModelError::IndexOutOfRange);

    let pattern = song.pattern_mut(0).unwrap();
    assert_eq!(
        pattern.add_note(0, Note::new(128, 1, 64)),
        Err(ModelError::InvalidArgument)
    );
    assert_eq!(
        pattern.add_cc(0, ControlChange::new(74, 128, false)),
        Err(ModelError::InvalidArgument)
    );
    assert_eq!(pattern.move_note(0, 10, 60), Err(ModelError::NotFound));

    // Failed edits leave no trace
    assert!(pattern.notes().is_empty());
    assert!(pattern.ccs().is_empty());

    // Removing from an empty pattern is not an error
    pattern.remove_note(0, 60);
    pattern.remove_cc(0, 74);
}

#[test]
fn clear_pattern_is_isolated() {
    let mut song = Song::new("clear");
    for slot in 0..2 {
        let pattern = song.pattern_mut(slot).unwrap();
        pattern.add_note(0, Note::new(60, 4, 100)).unwrap();
        pattern.add_cc(0, ControlChange::new(1, 64, false)).unwrap();
    }

    song.clear_pattern(0).unwrap();
    assert!(song.pattern(0).unwrap().notes().is_empty());
    assert!(song.pattern(0).unwrap().ccs().is_empty());
    assert_eq!(song.pattern(1).unwrap().notes().len(), 1);
    assert_eq!(song.pattern(1).unwrap().ccs().len(), 1);
}
