//! Playback session state machine

use std::collections::VecDeque;

use super::{CreditLedger, Track};

/// What the cabinet is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Nothing selected, nothing sounding.
    Idle,
    /// One credited selection is playing (or just finished).
    PlayingOne(Track),
    /// Attract mode: working through a randomized order of the catalog.
    Shuffling { remaining: VecDeque<Track> },
}

/// The single process-wide playback state.
///
/// Owned exclusively by the selection coordinator; every transition below
/// is issued from its loop, never from another task. `active` tracks
/// whether audio output is currently sounding, which is what gates the
/// coordinator's finished-detection poll.
#[derive(Debug)]
pub struct PlaybackSession {
    mode: PlaybackMode,
    active: bool,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            mode: PlaybackMode::Idle,
            active: false,
        }
    }

    pub fn mode(&self) -> &PlaybackMode {
        &self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.mode, PlaybackMode::Idle)
    }

    pub fn is_shuffling(&self) -> bool {
        matches!(self.mode, PlaybackMode::Shuffling { .. })
    }

    /// Tracks left in the current shuffle order.
    pub fn remaining(&self) -> usize {
        match &self.mode {
            PlaybackMode::Shuffling { remaining } => remaining.len(),
            _ => 0,
        }
    }

    /// A credited selection started sounding.
    pub fn begin_track(&mut self, track: Track) {
        self.mode = PlaybackMode::PlayingOne(track);
        self.active = true;
    }

    /// Enter shuffle with a freshly randomized order. Nothing is sounding
    /// until the coordinator starts the first entry.
    pub fn begin_shuffle(&mut self, order: VecDeque<Track>) {
        self.mode = PlaybackMode::Shuffling { remaining: order };
        self.active = false;
    }

    /// Pop the next entry of the shuffle order. `None` once the order is
    /// exhausted, or when not shuffling at all.
    pub fn next_shuffled(&mut self) -> Option<Track> {
        match &mut self.mode {
            PlaybackMode::Shuffling { remaining } => remaining.pop_front(),
            _ => None,
        }
    }

    pub fn mark_sounding(&mut self) {
        self.active = true;
    }

    /// The single playing track ran to its natural end.
    pub fn finish_one(&mut self) {
        if matches!(self.mode, PlaybackMode::PlayingOne(_)) {
            self.mode = PlaybackMode::Idle;
        }
        self.active = false;
    }

    /// Hard stop: back to idle, discarding any pending shuffle order.
    pub fn stop_all(&mut self) {
        self.mode = PlaybackMode::Idle;
        self.active = false;
    }
}

/// Light states derived from the session and ledger. Never stored; the
/// coordinator recomputes and pushes this after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorState {
    pub credit_light: bool,
    pub shuffle_light: bool,
}

impl IndicatorState {
    pub fn derive(session: &PlaybackSession, ledger: &CreditLedger) -> Self {
        Self {
            credit_light: ledger.has_credit(),
            shuffle_light: session.is_shuffling(),
        }
    }
}
