//! Model module - Playback state and data types
//!
//! This module contains the data structures the coordinator arbitrates over.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (selection tokens, tracks)
//! - `credit`: Play-credit ledger
//! - `catalog`: Track lookup against the music directory
//! - `session`: The playback session state machine and derived light state

mod types;
mod credit;
mod catalog;
mod session;

// Re-export all public types for convenient access
pub use types::{SelectionToken, Track};

pub use credit::CreditLedger;

pub use catalog::TrackCatalog;

pub use session::{IndicatorState, PlaybackMode, PlaybackSession};
