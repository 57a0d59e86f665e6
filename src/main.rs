use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use furby_dlc::{
    audio::{
        install_scale_files,
        scale::{DEFAULT_NOTE_DURATION, SEQUENCE_FILE_NAME},
        ScaleGenerator,
    },
    formats::amf::AUDIO_ALIGNMENT,
    graphics::export_frames,
    ActionCode, Dlc, ToolConfig,
};

/// Furby Connect DLC tool
#[derive(Parser)]
#[command(name = "furby-dlc")]
#[command(about = "Inspect, minify and re-voice Furby Connect DLC files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shrink every audio track for faster uploads
    Minify {
        input: PathBuf,
        /// Output path (default: <input>_minified.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Track length in bytes, a multiple of 8
        #[arg(short, long)]
        length: Option<usize>,
        /// JSON tool configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },

    /// Replace the audio played for an action code with pre-encoded A18 clips
    ReplaceAudio {
        input: PathBuf,
        #[arg(long)]
        code: ActionCode,
        #[arg(long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(required = true)]
        clips: Vec<PathBuf>,
    },

    /// Make an action code play the eight notes of a C major scale
    Scale {
        input: PathBuf,
        #[arg(long)]
        code: ActionCode,
        #[arg(long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Encoded notes, C4 up to C5
        #[arg(required = true)]
        notes: Vec<PathBuf>,
    },

    /// Write the C major scale as 16 kHz WAV files for the A18 encoder
    GenerateScale {
        #[arg(long, default_value = "./scale_audio")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_NOTE_DURATION)]
        note_duration: f64,
    },

    /// Print the section directory and contents summary
    Inspect { input: PathBuf },

    /// Render every sprite frame to PNG
    ExportFrames {
        input: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Minify {
            input,
            output,
            length,
            config,
            force,
        } => minify(&input, output, length, config.as_deref(), force),
        Commands::ReplaceAudio {
            input,
            code,
            config,
            output,
            clips,
        } => {
            let mut dlc = load_configured(&input, &config)?;
            let tracks = dlc
                .replace_audio_files(code, &clips)
                .with_context(|| format!("Failed to replace audio for {}", code))?;
            dlc.build(&output)
                .with_context(|| format!("Failed to build {}", output.display()))?;
            println!("Action {} now plays tracks {:?}", code, tracks);
            Ok(())
        }
        Commands::Scale {
            input,
            code,
            config,
            output,
            notes,
        } => {
            let mut dlc = load_configured(&input, &config)?;
            install_scale_files(&mut dlc, code, &notes)
                .with_context(|| format!("Failed to install scale for {}", code))?;
            dlc.build(&output)
                .with_context(|| format!("Failed to build {}", output.display()))?;
            println!("Action {} now plays the C major scale", code);
            Ok(())
        }
        Commands::GenerateScale {
            out_dir,
            note_duration,
        } => generate_scale(&out_dir, note_duration),
        Commands::Inspect { input } => inspect(&input),
        Commands::ExportFrames { input, out_dir } => {
            let dlc = load(&input)?;
            let written = export_frames(&dlc, &out_dir)
                .with_context(|| format!("Failed to export frames to {}", out_dir.display()))?;
            println!("Exported {} frames to {}", written.len(), out_dir.display());
            Ok(())
        }
    }
}

fn load(input: &Path) -> Result<Dlc> {
    Dlc::load(input).with_context(|| format!("Failed to load DLC file {}", input.display()))
}

fn load_configured(input: &Path, config: &Path) -> Result<Dlc> {
    let config = ToolConfig::load(config)
        .with_context(|| format!("Failed to read config {}", config.display()))?;
    let mut dlc = load(input)?;
    dlc.set_action_map(config.action_map())
        .context("Action table does not fit this DLC")?;
    Ok(dlc)
}

fn minified_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{}_minified.{}", stem, ext.to_string_lossy()),
        None => format!("{}_minified", stem),
    };
    input.with_file_name(name)
}

fn minify(
    input: &Path,
    output: Option<PathBuf>,
    length: Option<usize>,
    config: Option<&Path>,
    force: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => ToolConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ToolConfig::default(),
    };
    let length = length.unwrap_or(config.minify_length);
    if length % AUDIO_ALIGNMENT != 0 {
        bail!(
            "Audio length must be a multiple of {} (got {}); try {} or {}",
            AUDIO_ALIGNMENT,
            length,
            length / AUDIO_ALIGNMENT * AUDIO_ALIGNMENT,
            (length / AUDIO_ALIGNMENT + 1) * AUDIO_ALIGNMENT
        );
    }

    let output = output.unwrap_or_else(|| minified_path(input));
    if output.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", output.display());
    }

    let original_size = fs::metadata(input)
        .with_context(|| format!("Input file not found: {}", input.display()))?
        .len();

    let mut dlc = load(input)?;
    dlc.minify(length)?;
    dlc.build(&output)
        .with_context(|| format!("Failed to build {}", output.display()))?;

    let new_size = fs::metadata(&output)?.len();
    let reduction = original_size.saturating_sub(new_size);
    let reduction_pct = if original_size > 0 {
        reduction as f64 / original_size as f64 * 100.0
    } else {
        0.0
    };

    println!("Original size: {} bytes", original_size);
    println!("New size:      {} bytes", new_size);
    println!("Reduction:     {} bytes ({:.1}%)", reduction, reduction_pct);
    Ok(())
}

fn generate_scale(out_dir: &Path, note_duration: f64) -> Result<()> {
    let generator = ScaleGenerator::default();
    let notes = generator
        .generate_c_major_scale(out_dir, note_duration)
        .context("Failed to generate scale notes")?;
    let sequence = generator
        .generate_scale_sequence(out_dir.join(SEQUENCE_FILE_NAME), note_duration)
        .context("Failed to generate scale sequence")?;

    for note in &notes {
        println!("  {}", note.display());
    }
    println!("  {}", sequence.display());
    println!("Convert these to A18 with the GeneralPlus encoder, then run `furby-dlc scale`.");
    Ok(())
}

fn inspect(input: &Path) -> Result<()> {
    let dlc = load(input)?;
    let header = dlc.header().context("DLC has no header")?;
    let fingerprints = dlc.fingerprints()?;

    println!("{} (version {})", input.display(), header.version());
    println!("{:<4} {:>10} {:>10}  {:<16}", "id", "offset", "length", "xxh64");
    for (entry, (_, hash)) in header.directory.iter().zip(&fingerprints) {
        println!(
            "{:<4} {:>10} {:>10}  {:016x}",
            entry.id.to_string(),
            entry.offset,
            entry.length,
            hash
        );
    }

    let sections = dlc.sections()?;
    println!();
    println!("palettes:  {}", sections.pal.len());
    println!("cels:      {}", sections.cel.len());
    println!(
        "frames:    {} ({} playlists)",
        sections.spr.frames.len(),
        sections.spr.playlists.len()
    );
    println!(
        "sequences: {} (terminator {:#06x})",
        sections.seq.len(),
        sections.seq.terminator
    );
    println!("tracks:    {}", sections.amf.len());
    Ok(())
}
