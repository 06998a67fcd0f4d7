//! Patterns: paired note and controller timelines with read cursors.

use crate::event::{ControlChange, Note, Tick};
use crate::song::PatternSlot;
use crate::timeline::{Cursor, EventNode, Timeline};
use crate::ModelError;

/// A pattern: one timeline of notes, one of controller changes, a read
/// cursor into each, and the slot of the pattern that follows this one.
///
/// A MIDI emitter pulls nodes with [`Pattern::next_note`] and
/// [`Pattern::next_cc`] during normal playback and re-aims with the seek
/// methods on transport jumps. Every edit re-homes the affected cursor, so
/// a consumer that edits mid-playback should seek back to its position
/// afterward.
#[derive(Clone, Debug)]
pub struct Pattern {
    notes: Timeline<Note>,
    ccs: Timeline<ControlChange>,
    note_cursor: Cursor,
    cc_cursor: Cursor,
    follow: PatternSlot,
    /// Single-letter display name ('a', 'b', ...)
    pub name: char,
}

impl Pattern {
    /// Create an empty pattern occupying `slot`, following itself (looping).
    pub fn new(name: char, slot: PatternSlot) -> Self {
        let notes = Timeline::new();
        let ccs = Timeline::new();
        let note_cursor = notes.cursor();
        let cc_cursor = ccs.cursor();
        Self {
            notes,
            ccs,
            note_cursor,
            cc_cursor,
            follow: slot,
            name,
        }
    }

    // === Editing ===

    /// Add a note at `ticks`. A note with the same pitch already on that
    /// tick is overwritten in place.
    ///
    /// Out-of-range MIDI data bytes are rejected before the timeline is
    /// touched. Resets the note cursor.
    pub fn add_note(&mut self, ticks: Tick, note: Note) -> Result<(), ModelError> {
        if !note.is_valid() {
            return Err(ModelError::InvalidArgument);
        }
        self.notes.insert(ticks, note);
        self.note_cursor = self.notes.cursor();
        Ok(())
    }

    /// Remove the note with `pitch` at `ticks`. Nothing there is a normal
    /// no-op. Resets the note cursor.
    pub fn remove_note(&mut self, ticks: Tick, pitch: u8) {
        self.notes.remove(ticks, pitch);
        self.note_cursor = self.notes.cursor();
    }

    /// Move the note with `pitch` from tick `from` to tick `to`, keeping
    /// its length and velocity. Resets the note cursor on success.
    pub fn move_note(&mut self, from: Tick, to: Tick, pitch: u8) -> Result<(), ModelError> {
        self.notes.move_to(from, to, pitch)?;
        self.note_cursor = self.notes.cursor();
        Ok(())
    }

    /// Add a controller change at `ticks`. A change for the same controller
    /// already on that tick is overwritten in place.
    ///
    /// Out-of-range MIDI data bytes are rejected before the timeline is
    /// touched. Resets the controller cursor.
    pub fn add_cc(&mut self, ticks: Tick, cc: ControlChange) -> Result<(), ModelError> {
        if !cc.is_valid() {
            return Err(ModelError::InvalidArgument);
        }
        self.ccs.insert(ticks, cc);
        self.cc_cursor = self.ccs.cursor();
        Ok(())
    }

    /// Remove the change for controller `number` at `ticks`. Nothing there
    /// is a normal no-op. Resets the controller cursor.
    pub fn remove_cc(&mut self, ticks: Tick, number: u8) {
        self.ccs.remove(ticks, number);
        self.cc_cursor = self.ccs.cursor();
    }

    /// Move the change for controller `number` from tick `from` to tick
    /// `to`, keeping its value and interpolation flag. Resets the
    /// controller cursor on success.
    pub fn move_cc(&mut self, from: Tick, to: Tick, number: u8) -> Result<(), ModelError> {
        self.ccs.move_to(from, to, number)?;
        self.cc_cursor = self.ccs.cursor();
        Ok(())
    }

    // === Playback ===

    /// Next note node under the cursor, stepping the cursor forward.
    ///
    /// Returns `None` at the end of the pattern without wrapping; the
    /// playback engine decides what plays next via [`Pattern::follow`].
    pub fn next_note(&mut self) -> Option<&EventNode<Note>> {
        self.notes.advance(&mut self.note_cursor)
    }

    /// Next controller node under the cursor, stepping the cursor forward.
    pub fn next_cc(&mut self) -> Option<&EventNode<ControlChange>> {
        self.ccs.advance(&mut self.cc_cursor)
    }

    /// Aim the note cursor at the first node at or after tick `t`.
    pub fn seek_note(&mut self, t: Tick) {
        self.note_cursor = self.notes.seek(t);
    }

    /// Aim the controller cursor at the first node at or after tick `t`.
    pub fn seek_cc(&mut self, t: Tick) {
        self.cc_cursor = self.ccs.seek(t);
    }

    /// Re-home both cursors to the start of their timelines.
    pub fn reset(&mut self) {
        self.note_cursor = self.notes.cursor();
        self.cc_cursor = self.ccs.cursor();
    }

    // === Structure ===

    /// Set the pattern that plays after this one. Pass the pattern's own
    /// slot to loop.
    pub fn set_follow(&mut self, slot: PatternSlot) {
        debug_assert!((slot as usize) < crate::song::PATTERN_COUNT);
        self.follow = slot;
    }

    /// Slot of the pattern that plays once this one is exhausted.
    pub fn follow(&self) -> PatternSlot {
        self.follow
    }

    /// Destroy all events in both timelines, returning the pattern to its
    /// just-constructed state. Name and follow slot are kept.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.ccs.clear();
        self.reset();
    }

    /// The note timeline, for direct iteration.
    pub fn notes(&self) -> &Timeline<Note> {
        &self.notes
    }

    /// The controller timeline, for direct iteration.
    pub fn ccs(&self) -> &Timeline<ControlChange> {
        &self.ccs
    }
}
