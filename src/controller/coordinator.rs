//! The coordinator event loop
//!
//! One serialized loop owns every playback and credit mutation. Input
//! events are taken in arrival order; stop signals travel on their own
//! channel and are checked first on every iteration, so a stop decided
//! while selections are still queued discards them before any can start.
//! Finished-detection is a guarded branch of the same loop, which is what
//! makes cancellation race-free: there is no separate advancement task
//! that could fire after a stop.

use anyhow::{Result, anyhow};
use tokio::time::MissedTickBehavior;

use crate::model::SelectionToken;

use super::{Jukebox, JukeboxEvent};

impl Jukebox {
    /// Run until the input source disconnects or the audio device is
    /// lost. Tears playback down before returning either way.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("selection coordinator started");
        self.push_indicators();

        let mut poll = tokio::time::interval(self.timing.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let result = loop {
            tokio::select! {
                biased;

                stop = self.stop_rx.recv() => match stop {
                    Some(()) => self.handle_stop(),
                    None => break Err(anyhow!("input source disconnected")),
                },

                event = self.events_rx.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle_event(event) {
                            break Err(e);
                        }
                    }
                    None => break Err(anyhow!("input source disconnected")),
                },

                _ = poll.tick(), if self.session.is_active() => {
                    if let Err(e) = self.check_playback() {
                        break Err(e);
                    }
                }
            }
        };

        self.shutdown();
        result
    }

    fn handle_event(&mut self, event: JukeboxEvent) -> Result<()> {
        match event {
            JukeboxEvent::CoinInserted => {
                self.handle_coin();
                Ok(())
            }
            JukeboxEvent::Selection(token) => self.handle_selection(token),
        }
    }

    pub(crate) fn handle_coin(&mut self) {
        let balance = self.ledger.add_credit();
        tracing::info!(balance, "coin accepted");
        self.push_indicators();
    }

    pub(crate) fn handle_selection(&mut self, token: SelectionToken) -> Result<()> {
        match token {
            // Normally routed out-of-band; honor it here too.
            SelectionToken::Stop => {
                self.handle_stop();
                Ok(())
            }
            SelectionToken::Shuffle => {
                if self.session.is_shuffling() {
                    tracing::debug!("already shuffling");
                    return Ok(());
                }
                // Attract mode is free; no credit check.
                let result = self.enter_shuffle();
                self.push_indicators();
                result
            }
            SelectionToken::Track(id) => {
                if !self.ledger.try_consume() {
                    tracing::info!(track = %id, "selection rejected, no credit");
                    return Ok(());
                }
                self.pulse_credit_light();

                let result = match self.catalog.resolve(&id) {
                    Some(track) => self.start_track(track),
                    None => {
                        // The press was accepted, so the credit stays spent.
                        tracing::warn!(track = %id, "track not found");
                        Ok(())
                    }
                };
                self.push_indicators();
                result
            }
        }
    }

    /// Stop pre-emption: halt playback, then throw away every selection
    /// already queued behind the stop. Coins in the queue are still
    /// credited; money is never discarded.
    pub(crate) fn handle_stop(&mut self) {
        if self.session.is_idle() {
            tracing::debug!("stop while idle");
        } else {
            tracing::info!("stop requested");
        }
        self.audio.stop();
        self.session.stop_all();

        let mut discarded = 0usize;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                JukeboxEvent::CoinInserted => self.handle_coin(),
                JukeboxEvent::Selection(token) => {
                    discarded += 1;
                    tracing::debug!(?token, "discarding selection queued before stop");
                }
            }
        }
        if discarded > 0 {
            tracing::info!(discarded, "dropped selections queued before stop");
        }
        self.push_indicators();
    }

    fn shutdown(&mut self) {
        tracing::info!("stopping playback and releasing audio output");
        self.audio.stop();
        self.session.stop_all();
        self.push_indicators();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::task::LocalSet;

    use crate::audio::testing::FakeAudio;
    use crate::controller::{Jukebox, JukeboxHandle, Timing};
    use crate::indicator::testing::FakeIndicator;
    use crate::model::{CreditLedger, SelectionToken, TrackCatalog};

    fn test_timing() -> Timing {
        Timing {
            poll_interval: Duration::from_millis(5),
            credit_pulse: Duration::from_millis(5),
        }
    }

    fn jukebox_over(
        dir: &std::path::Path,
    ) -> (Jukebox, JukeboxHandle, FakeAudio, Arc<FakeIndicator>) {
        let audio = FakeAudio::new();
        let indicator = Arc::new(FakeIndicator::new());
        let (jukebox, handle) = Jukebox::new(
            Box::new(audio.clone()),
            TrackCatalog::new(dir.to_path_buf()),
            CreditLedger::new(false),
            indicator.clone(),
            test_timing(),
        );
        (jukebox, handle, audio, indicator)
    }

    fn music_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().expect("tempdir");
        for name in names {
            std::fs::File::create(dir.path().join(name)).expect("touch file");
        }
        dir
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn selections_are_processed_in_arrival_order() {
        let dir = music_dir(&["A1.mp3", "B2.mp3"]);
        let (jukebox, handle, audio, _indicator) = jukebox_over(dir.path());

        let local = LocalSet::new();
        local
            .run_until(async move {
                let coordinator = tokio::task::spawn_local(jukebox.run());

                handle.insert_coin().await;
                handle.submit(SelectionToken::Track("A1".to_string())).await;
                handle.submit(SelectionToken::Track("B2".to_string())).await;
                settle().await;

                // One credit: A1 accepted, B2 denied.
                assert_eq!(audio.started(), vec![dir.path().join("A1.mp3")]);

                drop(handle);
                let result = coordinator.await.expect("join");
                assert!(result.is_err(), "input disconnect is fatal");
            })
            .await;
    }

    #[tokio::test]
    async fn stop_discards_queued_selections_but_keeps_coins() {
        let dir = music_dir(&["A1.mp3"]);
        let (jukebox, handle, audio, indicator) = jukebox_over(dir.path());

        let local = LocalSet::new();
        local
            .run_until(async move {
                // Queue up a coin and a selection, then stop, all before
                // the coordinator gets to run.
                handle.insert_coin().await;
                handle.submit(SelectionToken::Track("A1".to_string())).await;
                handle.submit(SelectionToken::Stop).await;

                let coordinator = tokio::task::spawn_local(jukebox.run());
                settle().await;

                assert!(audio.started().is_empty(), "A1 must never start");
                assert_eq!(
                    indicator.credit_light(),
                    Some(true),
                    "the queued coin must still be credited"
                );

                drop(handle);
                let _ = coordinator.await.expect("join");
            })
            .await;
    }

    #[tokio::test]
    async fn finished_track_returns_to_idle_and_polls_stop() {
        let dir = music_dir(&["A1.mp3"]);
        let (jukebox, handle, audio, _indicator) = jukebox_over(dir.path());

        let local = LocalSet::new();
        local
            .run_until(async move {
                let coordinator = tokio::task::spawn_local(jukebox.run());

                handle.insert_coin().await;
                handle.submit(SelectionToken::Track("A1".to_string())).await;
                settle().await;
                assert!(audio.sounding());

                audio.finish_current();
                settle().await;
                assert!(!audio.sounding(), "no replay after natural end");
                assert_eq!(audio.started().len(), 1);

                drop(handle);
                let _ = coordinator.await.expect("join");
            })
            .await;
    }

    #[tokio::test]
    async fn shuffle_advances_across_the_running_loop() {
        let dir = music_dir(&["X.mp3", "Y.mp3"]);
        let (jukebox, handle, audio, indicator) = jukebox_over(dir.path());

        let local = LocalSet::new();
        local
            .run_until(async move {
                let coordinator = tokio::task::spawn_local(jukebox.run());

                handle.submit(SelectionToken::Shuffle).await;
                settle().await;
                assert_eq!(audio.started().len(), 1);
                assert_eq!(indicator.shuffle_light(), Some(true));

                audio.finish_current();
                settle().await;
                assert_eq!(audio.started().len(), 2, "auto-advance to the next entry");
                assert!(!audio.overlapped(), "never two tracks at once");

                handle.submit(SelectionToken::Stop).await;
                audio.finish_current();
                settle().await;
                assert_eq!(
                    audio.started().len(),
                    2,
                    "no shuffle start after an explicit stop"
                );
                assert_eq!(indicator.shuffle_light(), Some(false));

                drop(handle);
                let _ = coordinator.await.expect("join");
            })
            .await;
    }
}
