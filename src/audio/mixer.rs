//! Clip decoding and software mixing
//!
//! Clips are decoded from WAV into interleaved stereo at `SAMPLE_RATE` when
//! loaded, so the output callback only has to sum voices.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Output rate; clips recorded at other rates are resampled on load
pub const SAMPLE_RATE: u32 = 44_100;
/// Output channels (interleaved left/right)
pub const CHANNELS: u16 = 2;

/// Decoded clip: interleaved stereo samples at `SAMPLE_RATE`
pub type Clip = Arc<[f32]>;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("Failed to decode {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{path} contains no samples")]
    Empty { path: PathBuf },
}

/// Read a WAV file (8/16/24/32-bit PCM or 32-bit float, any rate, mono or more)
pub fn decode_wav(path: &Path) -> Result<Clip, ClipError> {
    let wav_err = |source| ClipError::Wav {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = hound::WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
    };

    let frames = to_stereo(&samples, spec.channels.max(1) as usize);
    if frames.is_empty() {
        return Err(ClipError::Empty {
            path: path.to_path_buf(),
        });
    }
    let frames = resample(&frames, spec.sample_rate, SAMPLE_RATE);
    log::debug!(
        "Decoded {} ({} Hz, {} ch) into {} frames",
        path.display(),
        spec.sample_rate,
        spec.channels,
        frames.len()
    );
    Ok(frames.into_iter().flatten().collect())
}

/// Mono is duplicated to both sides; extra channels past the first two are dropped
fn to_stereo(samples: &[f32], channels: usize) -> Vec<[f32; 2]> {
    samples
        .chunks_exact(channels)
        .map(|frame| match frame {
            [mono] => [*mono, *mono],
            [left, right, ..] => [*left, *right],
            [] => [0.0, 0.0],
        })
        .collect()
}

/// Linear interpolation between neighbouring frames
fn resample(frames: &[[f32; 2]], from: u32, to: u32) -> Vec<[f32; 2]> {
    if from == to || from == 0 || frames.len() < 2 {
        return frames.to_vec();
    }
    let len = ((frames.len() as u64 * to as u64) / from as u64).max(1) as usize;
    let step = from as f64 / to as f64;
    let last = frames.len() - 1;
    (0..len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let a = frames[idx];
            let b = frames[(idx + 1).min(last)];
            [a[0] + (b[0] - a[0]) * frac, a[1] + (b[1] - a[1]) * frac]
        })
        .collect()
}

#[derive(Debug)]
struct Voice {
    name: String,
    clip: Clip,
    pos: usize,
    volume: f32,
    looping: bool,
}

impl Voice {
    fn finished(&self) -> bool {
        !self.looping && self.pos >= self.clip.len()
    }
}

/// Loaded clips plus the voices currently sounding
#[derive(Debug, Default)]
pub struct Mixer {
    clips: HashMap<String, Clip>,
    voices: Vec<Voice>,
}

impl Mixer {
    pub fn insert(&mut self, name: &str, clip: Clip) {
        self.clips.insert(name.to_string(), clip);
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Start `name` from its first sample, cutting off an earlier voice of the
    /// same clip. Returns false for unknown clips.
    pub fn play(&mut self, name: &str, volume: f32, looping: bool) -> bool {
        let Some(clip) = self.clips.get(name).cloned() else {
            return false;
        };
        self.stop(name);
        self.voices.push(Voice {
            name: name.to_string(),
            clip,
            pos: 0,
            volume: volume.clamp(0.0, 1.0),
            looping,
        });
        true
    }

    pub fn stop(&mut self, name: &str) {
        self.voices.retain(|voice| voice.name != name);
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.voices.iter().any(|voice| voice.name == name)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Overwrite `out` (interleaved stereo) with the sum of all voices
    pub fn mix(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            for sample in out.iter_mut() {
                if voice.pos >= voice.clip.len() {
                    if !voice.looping {
                        break;
                    }
                    voice.pos = 0;
                }
                *sample += voice.clip[voice.pos] * voice.volume;
                voice.pos += 1;
            }
        }
        self.voices.retain(|voice| !voice.finished());
        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
