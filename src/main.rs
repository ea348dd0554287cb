use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::fs;

use subvox::audio::encoder;
use subvox::history;
use subvox::subtitle;
use subvox::synth::gtts::GoogleTranslateTts;
use subvox::synth::VoiceConfig;
use subvox::timeline::{Assembler, AssemblerConfig};
use subvox::types::{
    ConversionProfile, OutputFormat, OverlapPolicy, ProfileOverrides, RuntimeProfile,
    SynthesisFallback,
};

/// Subvox - subtitle to speech track converter
///
/// Parses an SRT subtitle file, synthesizes speech for each cue, and stitches
/// the clips with silence gaps into one audio track that follows the subtitle
/// timing.
#[derive(Parser, Debug)]
#[command(name = "subvox")]
#[command(version = "0.1.0")]
#[command(about = "Convert subtitle files into a spoken-word audio track", long_about = None)]
struct Args {
    /// Input subtitle file (SRT blocks: index, HH:MM:SS,mmm --> HH:MM:SS,mmm, text)
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// Output audio file path
    #[arg(value_name = "OUTPUT")]
    output_file: PathBuf,

    /// Synthesizer voice/locale tag (e.g. en, pt-BR)
    #[arg(long, value_name = "TAG")]
    language: Option<String>,

    /// Output container tag
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Also save each spoken clip individually next to the output
    #[arg(long)]
    save_clips: bool,

    /// History log destination (defaults to the output path with a .csv extension)
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// JSON conversion profile (inline JSON string)
    #[arg(long, value_name = "JSON", conflicts_with = "profile_file")]
    profile_json: Option<String>,

    /// Path to a JSON conversion profile
    #[arg(long, value_name = "PATH", conflicts_with = "profile_json")]
    profile_file: Option<PathBuf>,

    /// Retry budget per synthesis call, beyond the first attempt
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Policy when a cue's synthesis exhausts its retries
    #[arg(long, value_enum, value_name = "POLICY")]
    on_failure: Option<SynthesisFallback>,

    /// Policy when rendered speech overruns the next cue's declared start
    #[arg(long, value_enum, value_name = "POLICY")]
    overlap: Option<OverlapPolicy>,

    /// Timeline sample rate in Hz
    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u32>,
}

impl Args {
    /// Validate CLI arguments
    fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            bail!("Input file does not exist: {:?}", self.input_file);
        }

        if !self.input_file.is_file() {
            bail!("Input path is not a file: {:?}", self.input_file);
        }

        if let Some(rate) = self.sample_rate {
            ensure!(rate > 0, "Sample rate must be positive, got: {}", rate);
        }

        if let Some(parent) = self.output_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Output directory does not exist: {:?}", parent);
            }
        }

        Ok(())
    }

    fn runtime_profile(&self) -> Result<Option<RuntimeProfile>> {
        load_profile_from_sources(self.profile_file.as_deref(), self.profile_json.as_deref())
    }

    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            language: self.language.clone(),
            output_format: self.format,
            save_individual_clips: self.save_clips.then_some(true),
            sample_rate: self.sample_rate,
            max_retries: self.max_retries,
            on_failure: self.on_failure,
            overlap: self.overlap,
        }
    }

    fn history_path(&self) -> PathBuf {
        self.history
            .clone()
            .unwrap_or_else(|| self.output_file.with_extension("csv"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Validate arguments
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let runtime_profile = args
        .runtime_profile()
        .context("Failed to load conversion profile")?;
    if let Some(profile) = &runtime_profile {
        profile.validate().context("Profile validation failed")?;
    }
    let profile = ConversionProfile::resolve(args.overrides(), runtime_profile.as_ref());

    println!("Subvox v0.1.0 - Subtitle to Speech Converter");
    println!("Input:  {:?}", args.input_file);
    println!("Output: {:?}", args.output_file);
    println!("Language: {}", profile.language);

    // Pipeline implementation
    println!("\n1. Parsing subtitle cues...");
    let source = fs::read_to_string(&args.input_file)
        .with_context(|| format!("Failed to read subtitle file {:?}", args.input_file))?;
    let cues = subtitle::parse_srt(&source).context("Failed to parse subtitle file")?;
    println!("   Found {} cues", cues.len());

    println!("\n2. Synthesizing speech and assembling the timeline...");
    let synthesizer = GoogleTranslateTts::new(VoiceConfig {
        language: profile.language.clone(),
    })
    .context("Failed to initialize speech synthesizer")?;
    let assembler = Assembler::new(&synthesizer, AssemblerConfig::from_profile(&profile));
    let (timeline, records) = assembler
        .assemble(&cues)
        .context("Failed to assemble timeline")?;
    println!(
        "   Assembled {} clips ({:.3}s total)",
        timeline.clips.len(),
        timeline.duration().as_secs_f64()
    );

    println!("\n3. Writing output track...");
    encoder::write_track(&timeline, &args.output_file, profile.output_format)
        .with_context(|| format!("Failed to write output track {:?}", args.output_file))?;
    println!("   Wrote {:?}", args.output_file);

    if profile.save_individual_clips {
        let written = encoder::write_clips(&timeline, &args.output_file, profile.output_format)
            .context("Failed to write individual clips")?;
        println!("   Saved {} individual clips", written);
    }

    println!("\n4. Writing history log...");
    let history_path = args.history_path();
    history::write_history(&records, &history_path)
        .with_context(|| format!("Failed to write history log {:?}", history_path))?;
    println!("   {} records at {:?}", records.len(), history_path);

    println!("\n✓ Conversion complete!");

    Ok(())
}

fn load_profile_from_sources(
    path: Option<&Path>,
    json: Option<&str>,
) -> Result<Option<RuntimeProfile>> {
    if let Some(p) = path {
        let data = fs::read_to_string(p)
            .with_context(|| format!("Failed to read profile file {:?}", p))?;
        return parse_runtime_profile(&data).map(Some);
    }

    if let Some(raw) = json {
        return parse_runtime_profile(raw).map(Some);
    }

    Ok(None)
}

fn parse_runtime_profile(raw: &str) -> Result<RuntimeProfile> {
    let profile: RuntimeProfile =
        serde_json::from_str(raw).context("Failed to parse profile JSON")?;
    Ok(profile)
}
