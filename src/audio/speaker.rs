//! Native audio output using cpal

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use super::AudioBackend;
use super::mixer::{CHANNELS, Mixer, SAMPLE_RATE, decode_wav};

/// Plays clips on the default output device
pub struct SpeakerBackend {
    mixer: Arc<Mutex<Mixer>>,
    /// Dropping the stream stops playback
    _stream: Stream,
}

impl SpeakerBackend {
    /// `None` when there is no output device or it refuses the stream
    pub fn open() -> Option<Self> {
        let mixer = Arc::new(Mutex::new(Mixer::default()));
        let stream = init_audio_stream(mixer.clone())?;
        log::info!("Audio output open ({SAMPLE_RATE} Hz, {CHANNELS} ch)");
        Some(Self {
            mixer,
            _stream: stream,
        })
    }

    fn mixer(&self) -> MutexGuard<'_, Mixer> {
        self.mixer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioBackend for SpeakerBackend {
    fn load_clip(&mut self, name: &str, path: &Path) -> bool {
        match decode_wav(path) {
            Ok(clip) => {
                self.mixer().insert(name, clip);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    fn play_clip(&mut self, name: &str, volume: f32, looping: bool) {
        if !self.mixer().play(name, volume, looping) {
            log::debug!("Clip {name} is not loaded");
        }
    }

    fn stop_clip(&mut self, name: &str) {
        self.mixer().stop(name);
    }
}

fn init_audio_stream(mixer: Arc<Mutex<Mixer>>) -> Option<Stream> {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        log::warn!("No audio output device");
        return None;
    };

    let config = StreamConfig {
        channels: CHANNELS,
        sample_rate: SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                Ok(mut mixer) => mixer.mix(data),
                Err(_) => data.fill(0.0),
            },
            |err| log::error!("Audio stream error: {err}"),
            None,
        )
        .inspect_err(|e| log::warn!("Failed to open audio stream: {e}"))
        .ok()?;

    stream
        .play()
        .inspect_err(|e| log::warn!("Failed to start audio stream: {e}"))
        .ok()?;
    Some(stream)
}
