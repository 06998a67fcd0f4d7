//! Sequencing data model for the tinygroove groovebox.
//!
//! This crate defines the song data used throughout the sequencer: editing
//! surfaces write the model, and the playback engine reads it. Events are
//! held in time-sorted timelines; a pattern pairs a note timeline with a
//! controller timeline, and a song is a fixed bank of patterns plus the
//! transport's performance parameters.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod pattern;
mod song;
mod timeline;

pub use event::{ControlChange, Keyed, Note, Tick, DATA_MAX};
pub use pattern::Pattern;
pub use song::{PatternSlot, Song, PATTERN_COUNT};
pub use timeline::{Cursor, EventNode, NodeKey, Nodes, Timeline};

/// Error type for model operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A MIDI data byte outside `0..=127`
    InvalidArgument,
    /// No payload at the given time and key
    NotFound,
    /// Pattern slot outside the song's bank
    IndexOutOfRange,
}
