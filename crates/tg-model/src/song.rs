//! Song structure: a fixed bank of patterns plus performance parameters.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::pattern::Pattern;
use crate::ModelError;

/// Number of patterns in a song's bank.
pub const PATTERN_COUNT: usize = 8;

/// Index of a pattern within a song's bank.
pub type PatternSlot = u8;

/// A complete song: eight patterns and global performance parameters.
///
/// Song is a passive container: it hands out patterns and carries the
/// transport's tempo and swing, but never interprets pattern contents. The
/// bank size is fixed for the lifetime of the song.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    /// Tempo in beats per minute (kept positive by the transport that sets it)
    pub tempo: f32,
    /// Fractional swing offset applied by the clock
    pub swing: f32,
    patterns: Vec<Pattern>,
}

impl Default for Song {
    fn default() -> Self {
        let patterns = (0..PATTERN_COUNT)
            .map(|i| Pattern::new((b'a' + i as u8) as char, i as PatternSlot))
            .collect();
        Self {
            title: ArrayString::new(),
            tempo: 120.0,
            swing: 0.0,
            patterns,
        }
    }
}

impl Song {
    /// Create a new song with an empty, self-looping pattern bank.
    pub fn new(title: &str) -> Self {
        let mut song = Self::default();
        let _ = song.title.try_push_str(title);
        song
    }

    /// Borrow the pattern in `slot`.
    pub fn pattern(&self, slot: PatternSlot) -> Result<&Pattern, ModelError> {
        self.patterns
            .get(slot as usize)
            .ok_or(ModelError::IndexOutOfRange)
    }

    /// Mutably borrow the pattern in `slot`.
    pub fn pattern_mut(&mut self, slot: PatternSlot) -> Result<&mut Pattern, ModelError> {
        self.patterns
            .get_mut(slot as usize)
            .ok_or(ModelError::IndexOutOfRange)
    }

    /// Destroy all events in the pattern in `slot`.
    pub fn clear_pattern(&mut self, slot: PatternSlot) -> Result<(), ModelError> {
        self.pattern_mut(slot).map(|p| p.clear())
    }

    /// The whole bank in slot order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}
