//! # C Major Scale
//!
//! Generates the eight notes C4..C5 as 16 kHz mono WAV files for the external A18 encoder, and
//! installs the encoded notes as the audio sequence of one action code.

use std::{
    f64::consts::PI,
    fs,
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::{
    dlc::Dlc,
    error::{DlcError, Result},
    formats::action::ActionCode,
};

/// Note name and frequency in Hz, in playing order
pub const C_MAJOR_SCALE: [(&str, f64); 8] = [
    ("C", 261.63),
    ("D", 293.66),
    ("E", 329.63),
    ("F", 349.23),
    ("G", 392.00),
    ("A", 440.00),
    ("B", 493.88),
    ("C5", 523.25),
];

/// Sample rate the toy plays back at
pub const SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_NOTE_DURATION: f64 = 0.5;
pub const DEFAULT_AMPLITUDE: f64 = 0.5;
pub const SEQUENCE_FILE_NAME: &str = "c_major_scale_sequence.wav";

/// Point `code` at exactly eight encoded notes.
pub fn install_scale(dlc: &mut Dlc, code: ActionCode, notes: Vec<Vec<u8>>) -> Result<Vec<u16>> {
    check_arity(notes.len())?;
    let indices = dlc.replace_audio(code, notes)?;
    info!("Configured action code {} to play C major scale", code);
    Ok(indices)
}

/// [`install_scale`] with the notes read from encoded files.
pub fn install_scale_files<P: AsRef<Path>>(
    dlc: &mut Dlc,
    code: ActionCode,
    paths: &[P],
) -> Result<Vec<u16>> {
    check_arity(paths.len())?;
    let mut notes = Vec::with_capacity(paths.len());
    for path in paths {
        notes.push(fs::read(path)?);
    }
    install_scale(dlc, code, notes)
}

fn check_arity(found: usize) -> Result<()> {
    if found != C_MAJOR_SCALE.len() {
        return Err(DlcError::ScaleArity {
            expected: C_MAJOR_SCALE.len(),
            found,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleGenerator {
    pub sample_rate: u32,
}

impl Default for ScaleGenerator {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
        }
    }
}

impl ScaleGenerator {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Sine tone as signed 16-bit samples. `amplitude` is 0.0..=1.0.
    pub fn generate_tone(&self, frequency: f64, duration: f64, amplitude: f64) -> Vec<i16> {
        let count = (self.sample_rate as f64 * duration) as usize;
        (0..count)
            .map(|i| {
                let t = i as f64 / self.sample_rate as f64;
                let sample = amplitude * (2.0 * PI * frequency * t).sin();
                (sample * i16::MAX as f64) as i16
            })
            .collect()
    }

    pub fn save_wav<P: AsRef<Path>>(&self, samples: &[i16], path: P) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// One `note_<name>.wav` per note in `out_dir`, in scale order.
    pub fn generate_c_major_scale<P: AsRef<Path>>(
        &self,
        out_dir: P,
        note_duration: f64,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)?;

        let mut generated = Vec::with_capacity(C_MAJOR_SCALE.len());
        for (name, frequency) in C_MAJOR_SCALE {
            let path = out_dir.join(format!("note_{}.wav", name.to_lowercase()));
            let samples = self.generate_tone(frequency, note_duration, DEFAULT_AMPLITUDE);
            self.save_wav(&samples, &path)?;
            debug!("Generated {}: {}", name, path.display());
            generated.push(path);
        }
        Ok(generated)
    }

    /// The whole scale back to back in a single file.
    pub fn generate_scale_sequence<P: AsRef<Path>>(
        &self,
        out_file: P,
        note_duration: f64,
    ) -> Result<PathBuf> {
        let out_file = out_file.as_ref();
        if let Some(parent) = out_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let samples: Vec<i16> = C_MAJOR_SCALE
            .iter()
            .flat_map(|&(_, frequency)| {
                self.generate_tone(frequency, note_duration, DEFAULT_AMPLITUDE)
            })
            .collect();
        self.save_wav(&samples, out_file)?;
        debug!("Generated complete scale sequence: {}", out_file.display());
        Ok(out_file.to_path_buf())
    }
}
