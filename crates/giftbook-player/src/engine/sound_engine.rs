//! Sound engine — background music via rodio
//!
//! Loads one track, loops it forever and keeps it paused until the
//! presentation asks for playback. Acts as the `AudioPort` of the engine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::game::ports::{AudioError, AudioPort};

/// Owns the output stream and the background music sink
pub struct SoundEngine {
    /// rodio output stream (must be kept alive)
    _stream: OutputStream,
    /// Handle for creating new sinks
    _handle: OutputStreamHandle,
    /// Background music loop, created paused
    bg_sink: Sink,
}

impl SoundEngine {
    /// Open the default output device and queue `path` as a paused loop
    pub fn new(path: &Path, volume: f32) -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("Failed to open audio output")?;
        let file = File::open(path)
            .with_context(|| format!("Failed to open music {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode music {}", path.display()))?;

        let sink = Sink::try_new(&handle).context("Failed to create music sink")?;
        sink.pause();
        sink.set_volume(volume.clamp(0.0, 1.0));
        sink.append(source.repeat_infinite());

        tracing::info!("Background music loaded: {}", path.display());
        Ok(Self {
            _stream: stream,
            _handle: handle,
            bg_sink: sink,
        })
    }

    /// Load the configured music if there is any. Failures leave the
    /// presentation without an audio element.
    pub fn try_load(path: Option<&Path>, volume: f32) -> Option<Self> {
        let path = path?;
        match Self::new(path, volume) {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::warn!("No background music: {:#}", e);
                None
            }
        }
    }
}

impl AudioPort for SoundEngine {
    fn is_paused(&self) -> bool {
        self.bg_sink.is_paused()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.bg_sink.empty() {
            return Err(AudioError::Rejected("music track has no samples left".into()));
        }
        self.bg_sink.play();
        tracing::debug!("Background music playing");
        Ok(())
    }
}
