//! Core type definitions

use std::path::PathBuf;

/// A single decoded input from the cabinet's keypad.
///
/// Tokens are opaque values produced by the input layer; equality is by
/// value and a token never changes after it is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionToken {
    /// A track selection, carrying the keyed-in track id (e.g. "A1").
    Track(String),
    /// Halt all playback immediately.
    Stop,
    /// Enter shuffle (attract) mode.
    Shuffle,
}

/// A playable catalog entry.
///
/// The path is not checked for existence here; files may be added or
/// removed externally, so existence is only established at play time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub path: PathBuf,
}
