//! Background music and crash sound.
//!
//! Everything is synthesized with fundsp once at startup, baked into sample
//! buffers and played through rodio. No audio files are shipped.

use std::sync::Arc;
use std::time::Duration;

use fundsp::prelude32::*;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::config::AudioConfig;
use crate::error::AudioError;

const SAMPLE_RATE: u32 = 44_100;
/// One loop of the theme: 4 bars at 120 bpm.
const THEME_SECONDS: f64 = 8.0;
const STEPS_PER_SECOND: f32 = 4.0;

#[rustfmt::skip]
const THEME_NOTES: [f32; 16] = [
    72.0, 76.0, 79.0, 76.0,  74.0, 77.0, 81.0, 77.0,
    72.0, 76.0, 79.0, 84.0,  79.0, 76.0, 74.0, 71.0,
];
const THEME_BASS: [f32; 4] = [48.0, 50.0, 48.0, 43.0];

/// The game's view of the audio device.
pub trait Soundtrack {
    /// Start or resume the looping background music.
    fn play(&mut self) -> Result<(), AudioError>;
    /// Stop the music and rewind it to the beginning.
    fn stop(&mut self);
    /// Fire-and-forget crash effect.
    fn crash(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Used when audio is disabled or there is no output device.
#[derive(Debug, Default)]
pub struct Silent {
    unavailable: bool,
}

impl Silent {
    /// Turned off in config: playing is a no-op that succeeds.
    pub fn disabled() -> Self {
        Self { unavailable: false }
    }

    /// No device could be opened: `play` reports [`AudioError::Unavailable`].
    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

impl Soundtrack for Silent {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.unavailable {
            return Err(AudioError::Unavailable);
        }
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Real output through the default device.
pub struct Audio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Option<Sink>,
    theme: Arc<[f32]>,
    crash: Arc<[f32]>,
    music_volume: f32,
    effects_volume: f32,
}

impl Audio {
    pub fn new(config: &AudioConfig) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            music: None,
            theme: render_theme().into(),
            crash: render_crash().into(),
            music_volume: config.music_volume,
            effects_volume: config.effects_volume,
        })
    }

    /// Real audio if enabled and a device opens, silence otherwise.
    pub fn open_or_silent(config: &AudioConfig) -> Box<dyn Soundtrack> {
        if !config.enabled {
            log::info!("Audio disabled in config");
            return Box::new(Silent::disabled());
        }
        match Audio::new(config) {
            Ok(audio) => Box::new(audio),
            Err(err) => {
                log::warn!("Audio unavailable, continuing without sound: {err}");
                Box::new(Silent::unavailable())
            }
        }
    }
}

impl Soundtrack for Audio {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.music.is_none() {
            let sink = Sink::try_new(&self.handle)?;
            sink.set_volume(self.music_volume);
            sink.append(Clip::looping(self.theme.clone()));
            self.music = Some(sink);
        }
        if let Some(sink) = &self.music {
            sink.play();
        }
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the sink discards the queued loop; the next play starts
        // from the top.
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }

    fn crash(&mut self) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(self.effects_volume);
        sink.append(Clip::once(self.crash.clone()));
        sink.detach(); // Play in background
        Ok(())
    }
}

/// Mono sample buffer played once or forever.
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Arc<[f32]>,
    pos: usize,
    looping: bool,
}

impl Clip {
    pub fn once(samples: Arc<[f32]>) -> Self {
        Self {
            samples,
            pos: 0,
            looping: false,
        }
    }

    pub fn looping(samples: Arc<[f32]>) -> Self {
        Self {
            samples,
            pos: 0,
            looping: true,
        }
    }
}

impl Iterator for Clip {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                return None;
            }
            self.pos = 0;
        }
        let sample = self.samples[self.pos];
        self.pos += 1;
        Some(sample)
    }
}

impl rodio::Source for Clip {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        if self.looping {
            None
        } else {
            Some(Duration::from_secs_f64(
                self.samples.len() as f64 / SAMPLE_RATE as f64,
            ))
        }
    }
}

fn bake(unit: &mut dyn AudioUnit, seconds: f64) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    unit.reset();
    let len = (seconds * SAMPLE_RATE as f64) as usize;
    (0..len).map(|_| unit.get_mono()).collect()
}

/// Plucked triangle arpeggio over a sine bass line.
fn render_theme() -> Vec<f32> {
    let lead_freq = lfo(|t: f32| {
        let step = (t * STEPS_PER_SECOND) as usize % THEME_NOTES.len();
        midi_hz(THEME_NOTES[step])
    });
    let pluck = lfo(|t: f32| {
        let p = (t * STEPS_PER_SECOND).fract();
        (1.0 - p) * (1.0 - p) * 0.35
    });
    let bass_freq = lfo(|t: f32| {
        let bar = (t / 2.0) as usize % THEME_BASS.len();
        midi_hz(THEME_BASS[bar])
    });

    let mut theme = (lead_freq >> triangle()) * pluck + (bass_freq >> sine()) * 0.25;
    bake(&mut theme, THEME_SECONDS)
}

/// Falling saw sweep, 400Hz to 80Hz.
fn render_crash() -> Vec<f32> {
    let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f32| lerp(0.5, 0.0, (t / 0.5).min(1.0)));
    let mut sound = (freq >> saw()) * gain;
    bake(&mut sound, 0.5)
}
