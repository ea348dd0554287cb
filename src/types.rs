//! Core types for the subvox conversion pipeline

use std::time::Duration;

use anyhow::{ensure, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// One subtitle entry: a timed block of spoken text.
///
/// Empty or whitespace-only text is an explicit silence request covering the
/// cue's nominal window; it must never reach the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based block number from the subtitle source.
    pub index: usize,
    /// Offset of the cue from the track origin.
    pub start: Duration,
    /// End offset; always `>= start`.
    pub end: Duration,
    pub text: String,
}

impl Cue {
    /// Duration the cue claims on the timeline (`end - start`).
    pub fn nominal_window(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    /// True when this cue asks for silence instead of speech.
    pub fn is_silence_request(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A synthesized audio segment: decoded mono PCM in [-1.0, 1.0].
///
/// The rendered duration (`samples.len() / sample_rate`) is whatever the
/// synthesizer produced and may differ from the cue's nominal window.
#[derive(Debug, Clone)]
pub struct RenderedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RenderedClip {
    pub fn duration(&self) -> Duration {
        duration_for_samples(self.samples.len(), self.sample_rate)
    }
}

/// What a timeline clip carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipKind {
    /// Synthesized speech for the cue at this source index.
    Speech { cue_index: usize },
    Silence,
}

/// One segment of the assembled track, already at the timeline's sample rate.
#[derive(Debug, Clone)]
pub struct TimelineClip {
    pub samples: Vec<f32>,
    pub kind: ClipKind,
}

/// The ordered concatenation of clips forming the final track.
///
/// All clips share one sample rate, so positions and durations are exact
/// sample counts rather than accumulated floats.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub sample_rate: u32,
    pub clips: Vec<TimelineClip>,
}

impl Timeline {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            clips: Vec::new(),
        }
    }

    pub fn push(&mut self, clip: TimelineClip) {
        self.clips.push(clip);
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.clips.iter().map(|c| c.samples.len()).sum()
    }

    pub fn duration(&self) -> Duration {
        duration_for_samples(self.total_samples(), self.sample_rate)
    }
}

/// Content column of a history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryContent {
    Speech(String),
    Silence,
    SynthesisFailed,
}

impl HistoryContent {
    /// Marker string written to the history log.
    pub fn as_field(&self) -> &str {
        match self {
            Self::Speech(text) => text,
            Self::Silence => "<silence>",
            Self::SynthesisFailed => "<synthesis-failed>",
        }
    }
}

/// One append-only history entry: where a clip landed and how long it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub start: Duration,
    pub duration: Duration,
    pub content: HistoryContent,
}

/// How to react when rendered speech has already overrun a cue's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum OverlapPolicy {
    /// Never rewind; keep going at the current cursor and let gaps resync later.
    #[serde(rename = "drift")]
    #[value(name = "drift")]
    DriftForward,
    /// Trim the tail of the previous clip back to the new cue's start.
    #[serde(rename = "truncate")]
    #[value(name = "truncate")]
    TruncatePrevious,
}

/// What to do when a cue's synthesis exhausts its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum SynthesisFallback {
    /// Insert silence covering the cue's nominal window and log the failure.
    #[serde(rename = "silence")]
    #[value(name = "silence")]
    SubstituteSilence,
    /// Fail the whole run.
    #[serde(rename = "abort")]
    #[value(name = "abort")]
    Abort,
}

/// Output container tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "wav")]
    #[value(name = "wav")]
    Wav,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
        }
    }
}

/// Fully resolved settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConversionProfile {
    /// Voice/locale tag passed to the synthesizer (e.g. "en", "pt-BR").
    pub language: String,
    pub output_format: OutputFormat,
    /// Persist each spoken clip (silence excluded) next to the main output.
    pub save_individual_clips: bool,
    /// Timeline sample rate; every clip is conformed to it.
    pub sample_rate: u32,
    /// Retry budget per synthesis call, beyond the first attempt.
    pub max_retries: u32,
    pub on_failure: SynthesisFallback,
    pub overlap: OverlapPolicy,
}

impl ConversionProfile {
    /// Merge CLI overrides over a runtime profile over built-in defaults.
    pub fn resolve(overrides: ProfileOverrides, runtime: Option<&RuntimeProfile>) -> Self {
        fn pick<T: Copy>(cli: Option<T>, run: Option<T>, default: T) -> T {
            cli.or(run).unwrap_or(default)
        }
        Self {
            language: overrides
                .language
                .or_else(|| runtime.and_then(|r| r.language.clone()))
                .unwrap_or_else(|| "en".to_string()),
            output_format: pick(
                overrides.output_format,
                runtime.and_then(|r| r.output_format),
                OutputFormat::Wav,
            ),
            save_individual_clips: pick(
                overrides.save_individual_clips,
                runtime.and_then(|r| r.save_individual_clips),
                false,
            ),
            sample_rate: pick(
                overrides.sample_rate,
                runtime.and_then(|r| r.sample_rate),
                24_000,
            ),
            max_retries: pick(overrides.max_retries, runtime.and_then(|r| r.max_retries), 3),
            on_failure: pick(
                overrides.on_failure,
                runtime.and_then(|r| r.on_failure),
                SynthesisFallback::Abort,
            ),
            overlap: pick(
                overrides.overlap,
                runtime.and_then(|r| r.overlap),
                OverlapPolicy::DriftForward,
            ),
        }
    }
}

/// Settings taken from the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub language: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub save_individual_clips: Option<bool>,
    pub sample_rate: Option<u32>,
    pub max_retries: Option<u32>,
    pub on_failure: Option<SynthesisFallback>,
    pub overlap: Option<OverlapPolicy>,
}

/// Runtime-configurable profile parsed from JSON input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeProfile {
    #[serde(default, alias = "lang", alias = "voice")]
    pub language: Option<String>,
    #[serde(default, alias = "format")]
    pub output_format: Option<OutputFormat>,
    #[serde(default, alias = "save_clips", alias = "saveClips")]
    pub save_individual_clips: Option<bool>,
    #[serde(default, alias = "sampleRate")]
    pub sample_rate: Option<u32>,
    #[serde(default, alias = "maxRetries", alias = "retries")]
    pub max_retries: Option<u32>,
    #[serde(default, alias = "onFailure")]
    pub on_failure: Option<SynthesisFallback>,
    #[serde(default)]
    pub overlap: Option<OverlapPolicy>,
}

impl RuntimeProfile {
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.sample_rate {
            ensure!(rate > 0, "Profile sample_rate must be positive");
        }
        if let Some(language) = &self.language {
            ensure!(
                !language.trim().is_empty(),
                "Profile language must not be empty"
            );
        }
        Ok(())
    }
}

/// Convert a duration to a whole sample count at `sample_rate`, rounding to
/// the nearest sample.
pub fn samples_for_duration(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

/// Exact duration covered by `samples` at `sample_rate`.
pub fn duration_for_samples(samples: usize, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(samples as f64 / sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_conversions_round_trip() {
        let duration = Duration::from_millis(1_500);
        let samples = samples_for_duration(duration, 24_000);
        assert_eq!(samples, 36_000);
        assert_eq!(duration_for_samples(samples, 24_000), duration);
    }

    #[test]
    fn whitespace_text_is_a_silence_request() {
        let cue = Cue {
            index: 1,
            start: Duration::from_secs(5),
            end: Duration::from_secs(8),
            text: "   ".to_string(),
        };
        assert!(cue.is_silence_request());
        assert_eq!(cue.nominal_window(), Duration::from_secs(3));
    }

    #[test]
    fn profile_resolution_prefers_cli_then_runtime() {
        let runtime: RuntimeProfile = serde_json::from_str(
            r#"{"language": "pt-BR", "sample_rate": 16000, "on_failure": "silence"}"#,
        )
        .unwrap();
        runtime.validate().unwrap();

        let overrides = ProfileOverrides {
            sample_rate: Some(48_000),
            ..Default::default()
        };
        let profile = ConversionProfile::resolve(overrides, Some(&runtime));
        assert_eq!(profile.language, "pt-BR");
        assert_eq!(profile.sample_rate, 48_000);
        assert_eq!(profile.on_failure, SynthesisFallback::SubstituteSilence);
        assert_eq!(profile.overlap, OverlapPolicy::DriftForward);
    }

    #[test]
    fn profile_rejects_zero_sample_rate() {
        let runtime: RuntimeProfile = serde_json::from_str(r#"{"sample_rate": 0}"#).unwrap();
        assert!(runtime.validate().is_err());
    }

    #[test]
    fn timeline_duration_sums_clips() {
        let mut timeline = Timeline::new(1_000);
        timeline.push(TimelineClip {
            samples: vec![0.0; 500],
            kind: ClipKind::Silence,
        });
        timeline.push(TimelineClip {
            samples: vec![0.1; 1_500],
            kind: ClipKind::Speech { cue_index: 1 },
        });
        assert_eq!(timeline.total_samples(), 2_000);
        assert_eq!(timeline.duration(), Duration::from_secs(2));
    }
}
