//! Audio output backend
//!
//! The coordinator drives playback through the narrow `AudioOutput`
//! interface; the shipped implementation sits on a rodio output stream.
//! Callers must `load` before `play` and `stop` before loading the next
//! track, so at most one track is ever sounding.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    /// The output device is gone. Not recoverable; the process must
    /// shut down cleanly rather than keep accepting selections.
    #[error("audio output device unavailable: {0}")]
    Device(String),
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

impl AudioError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AudioError::Device(_))
    }
}

/// Operations the coordinator needs from the audio layer.
pub trait AudioOutput {
    /// Stop whatever is sounding and queue up the file at `path`.
    fn load(&mut self, path: &Path) -> Result<(), AudioError>;
    /// Start the loaded track. Only called after a successful `load`.
    fn play(&mut self);
    /// Halt output immediately and discard the queued track.
    fn stop(&mut self);
    /// Whether output is still sounding.
    fn is_busy(&self) -> bool;
}

/// System audio device via rodio.
pub struct RodioBackend {
    // The stream must outlive the sink or playback dies silently.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Sink,
}

impl RodioBackend {
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| AudioError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            sink,
        })
    }
}

impl AudioOutput for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.sink.stop();

        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        // Fresh sink per track; a stopped sink stays stopped for
        // anything appended later.
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.pause();
        sink.append(decoder);
        self.sink = sink;
        Ok(())
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn is_busy(&self) -> bool {
        !self.sink.empty()
    }
}
