//! Controller module - Selection coordination and playback logic
//!
//! This module contains the selection coordinator, the single serialized
//! loop that arbitrates every input (selections, stop, shuffle, coins,
//! timer ticks) against the playback session and the credit ledger.
//! It is organized into submodules by responsibility:
//!
//! - `coordinator`: The event loop with stop pre-emption
//! - `playback`: Session transitions and finished-detection

mod coordinator;
mod playback;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::audio::AudioOutput;
use crate::indicator::IndicatorDriver;
use crate::model::{CreditLedger, PlaybackSession, SelectionToken, TrackCatalog};

/// Selections queue here in arrival order. Deep enough that a burst of
/// keypad mashing never blocks the input task.
const EVENT_QUEUE_DEPTH: usize = 64;
const STOP_QUEUE_DEPTH: usize = 4;

/// Everything that reaches the coordinator through the ordered queue.
/// Stop travels on its own channel so it can pre-empt queued events.
#[derive(Debug)]
pub enum JukeboxEvent {
    Selection(SelectionToken),
    CoinInserted,
}

/// Intervals for the coordinator's timed activities.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// How often playback-busy is polled while a track sounds.
    pub poll_interval: Duration,
    /// How long the credit-acknowledgement pulse stays lit.
    pub credit_pulse: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            credit_pulse: Duration::from_secs(5),
        }
    }
}

/// Submission side of the coordinator, held by input sources.
///
/// Dropping every handle closes the coordinator's channels, which it
/// treats as the input source going away (a fatal condition).
#[derive(Clone)]
pub struct JukeboxHandle {
    events: mpsc::Sender<JukeboxEvent>,
    stop: mpsc::Sender<()>,
}

impl JukeboxHandle {
    /// Route one token to the coordinator. Stop goes out-of-band so it is
    /// seen even while other tokens are still queued.
    pub async fn submit(&self, token: SelectionToken) {
        match token {
            SelectionToken::Stop => {
                let _ = self.stop.send(()).await;
            }
            other => {
                let _ = self.events.send(JukeboxEvent::Selection(other)).await;
            }
        }
    }

    /// Record one confirmed coin event.
    pub async fn insert_coin(&self) {
        let _ = self.events.send(JukeboxEvent::CoinInserted).await;
    }
}

/// The selection coordinator: exclusive owner of the playback session,
/// the credit ledger, and the audio output handle.
pub struct Jukebox {
    pub(crate) session: PlaybackSession,
    pub(crate) ledger: CreditLedger,
    pub(crate) catalog: TrackCatalog,
    pub(crate) audio: Box<dyn AudioOutput>,
    pub(crate) indicator: Arc<dyn IndicatorDriver>,
    pub(crate) timing: Timing,
    events_rx: mpsc::Receiver<JukeboxEvent>,
    stop_rx: mpsc::Receiver<()>,
}

impl Jukebox {
    pub fn new(
        audio: Box<dyn AudioOutput>,
        catalog: TrackCatalog,
        ledger: CreditLedger,
        indicator: Arc<dyn IndicatorDriver>,
        timing: Timing,
    ) -> (Self, JukeboxHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (stop_tx, stop_rx) = mpsc::channel(STOP_QUEUE_DEPTH);

        let jukebox = Self {
            session: PlaybackSession::new(),
            ledger,
            catalog,
            audio,
            indicator,
            timing,
            events_rx,
            stop_rx,
        };
        let handle = JukeboxHandle {
            events: events_tx,
            stop: stop_tx,
        };
        (jukebox, handle)
    }
}
