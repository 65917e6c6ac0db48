//! Cabinet input source
//!
//! The production cabinet feeds the coordinator from a matrix keypad and a
//! coin-slot interrupt. This build stands both in with a newline-delimited
//! protocol on stdin, one signal per line:
//!
//! - `stop`    - halt playback
//! - `shuffle` - enter shuffle mode
//! - `coin`    - one accepted coin
//! - anything else: a track id such as `A1` (letters, digits, `-`, `_`)
//!
//! Keywords are case-insensitive. Malformed lines are logged and dropped,
//! matching the debouncer's at-most-once delivery contract: a line either
//! becomes exactly one signal or nothing.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::controller::JukeboxHandle;
use crate::model::SelectionToken;

/// A decoded input line: either a selection or a coin event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CabinetSignal {
    Select(SelectionToken),
    Coin,
}

/// Decode one input line. `None` for blank or malformed lines.
pub fn parse_line(line: &str) -> Option<CabinetSignal> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("stop") {
        return Some(CabinetSignal::Select(SelectionToken::Stop));
    }
    if line.eq_ignore_ascii_case("shuffle") {
        return Some(CabinetSignal::Select(SelectionToken::Shuffle));
    }
    if line.eq_ignore_ascii_case("coin") {
        return Some(CabinetSignal::Coin);
    }
    if line
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Some(CabinetSignal::Select(SelectionToken::Track(
            line.to_string(),
        )));
    }
    None
}

/// Read signals from stdin until it closes, forwarding each to the
/// coordinator. When the source goes away the handle is dropped, which
/// closes the coordinator's channels and shuts the process down.
pub fn spawn_input_task(handle: JukeboxHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    Some(CabinetSignal::Select(token)) => handle.submit(token).await,
                    Some(CabinetSignal::Coin) => handle.insert_coin().await,
                    None => {
                        if !line.trim().is_empty() {
                            tracing::warn!(line = %line.trim(), "ignoring malformed input");
                        }
                    }
                },
                Ok(None) => {
                    tracing::warn!("input source closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "input source failed");
                    break;
                }
            }
        }
    })
}
