//! Playback transitions
//!
//! Session transitions and the finished-detection poll. Every path that
//! starts audio stops the current output first, so at most one track is
//! ever sounding.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use rand::seq::SliceRandom;

use crate::audio::AudioError;
use crate::model::{IndicatorState, PlaybackMode, Track};

use super::Jukebox;

impl Jukebox {
    /// Start one credited selection, replacing whatever is sounding.
    pub(crate) fn start_track(&mut self, track: Track) -> Result<()> {
        self.audio.stop();
        match self.audio.load(&track.path) {
            Ok(()) => {
                self.audio.play();
                tracing::info!(track = %track.id, "playing track");
                self.session.begin_track(track);
                Ok(())
            }
            Err(e) => self.track_start_failed(&track, e),
        }
    }

    /// Build a randomized order over a fresh catalog snapshot and start
    /// its first entry.
    pub(crate) fn enter_shuffle(&mut self) -> Result<()> {
        self.audio.stop();

        let mut order = self.catalog.list_all();
        if order.is_empty() {
            tracing::warn!("shuffle requested but catalog is empty");
            self.session.stop_all();
            return Ok(());
        }
        order.shuffle(&mut rand::rng());
        tracing::info!(tracks = order.len(), "entering shuffle");
        self.session.begin_shuffle(VecDeque::from(order));
        self.advance_shuffle()
    }

    /// Start the next entry of the shuffle order, reshuffling from a
    /// fresh catalog snapshot when the order runs out. Unplayable entries
    /// are skipped; if a whole fresh order is unplayable, shuffle ends.
    pub(crate) fn advance_shuffle(&mut self) -> Result<()> {
        let mut refilled = false;
        loop {
            let Some(track) = self.session.next_shuffled() else {
                if refilled {
                    tracing::warn!("no playable tracks, leaving shuffle");
                    self.session.stop_all();
                    return Ok(());
                }
                refilled = true;

                let mut order = self.catalog.list_all();
                if order.is_empty() {
                    tracing::warn!("catalog empty, leaving shuffle");
                    self.session.stop_all();
                    return Ok(());
                }
                order.shuffle(&mut rand::rng());
                tracing::debug!(tracks = order.len(), "reshuffling");
                self.session.begin_shuffle(VecDeque::from(order));
                continue;
            };

            self.audio.stop();
            match self.audio.load(&track.path) {
                Ok(()) => {
                    self.audio.play();
                    self.session.mark_sounding();
                    tracing::info!(
                        track = %track.id,
                        remaining = self.session.remaining(),
                        "shuffle playing"
                    );
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::error!(track = %track.id, error = %e, "skipping unplayable entry");
                    continue;
                }
            }
        }
    }

    /// One busy-poll tick: if output went silent, advance shuffle or
    /// return to idle. Only called while the session is active, from the
    /// coordinator's own loop.
    pub(crate) fn check_playback(&mut self) -> Result<()> {
        if self.audio.is_busy() {
            return Ok(());
        }
        match self.session.mode() {
            PlaybackMode::PlayingOne(track) => {
                tracing::debug!(track = %track.id, "track finished");
                self.session.finish_one();
                self.push_indicators();
                Ok(())
            }
            PlaybackMode::Shuffling { .. } => {
                let result = self.advance_shuffle();
                self.push_indicators();
                result
            }
            PlaybackMode::Idle => Ok(()),
        }
    }

    fn track_start_failed(&mut self, track: &Track, error: AudioError) -> Result<()> {
        if error.is_fatal() {
            return Err(error.into());
        }
        // Missing or undecodable file: log and fall back to idle rather
        // than hang waiting for audio that will never sound.
        tracing::error!(track = %track.id, error = %error, "failed to start track");
        self.session.stop_all();
        Ok(())
    }

    /// Recompute light state and push it to the indicator driver.
    pub(crate) fn push_indicators(&self) {
        let state = IndicatorState::derive(&self.session, &self.ledger);
        self.indicator.set_credit_light(state.credit_light);
        self.indicator.set_shuffle_light(state.shuffle_light);
    }

    /// Timed credit-acknowledgement pulse: light on for the pulse
    /// duration, then back to the balance the accept left behind.
    /// Fire-and-forget; the coordinator keeps processing tokens.
    pub(crate) fn pulse_credit_light(&self) {
        let indicator = Arc::clone(&self.indicator);
        let restore = self.ledger.has_credit();
        let duration = self.timing.credit_pulse;
        tokio::spawn(async move {
            indicator.set_credit_light(true);
            tokio::time::sleep(duration).await;
            indicator.set_credit_light(restore);
        });
    }
}
