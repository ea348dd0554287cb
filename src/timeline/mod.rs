//! Timeline assembler: the sequential fold that stitches speech and silence.
//!
//! Cues are processed strictly in order because every gap computation depends
//! on the cumulative `elapsed` cursor left behind by all prior cues. The
//! cursor is tracked in whole samples so clip onsets are exact, never an
//! accumulation of float rounding.

use std::time::Duration;

use crate::audio::resample::conform_rate;
use crate::audio::silence::silence;
use crate::error::ConvertResult;
use crate::synth::{synthesize_with_retry, SpeechSynthesizer};
use crate::types::{
    duration_for_samples, samples_for_duration, ClipKind, ConversionProfile, Cue, HistoryContent,
    HistoryRecord, OverlapPolicy, SynthesisFallback, Timeline, TimelineClip,
};

/// Settings the assembler needs for one run.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub sample_rate: u32,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub overlap: OverlapPolicy,
    pub on_failure: SynthesisFallback,
}

impl AssemblerConfig {
    pub fn from_profile(profile: &ConversionProfile) -> Self {
        Self {
            sample_rate: profile.sample_rate,
            max_retries: profile.max_retries,
            retry_base_delay: Duration::from_millis(500),
            overlap: profile.overlap,
            on_failure: profile.on_failure,
        }
    }
}

/// Walks cues in order, synthesizing speech and inserting silence gaps so
/// each cue's audio onset matches its declared start as closely as the
/// synthesizer allows.
pub struct Assembler<'a> {
    synth: &'a dyn SpeechSynthesizer,
    config: AssemblerConfig,
}

impl<'a> Assembler<'a> {
    pub fn new(synth: &'a dyn SpeechSynthesizer, config: AssemblerConfig) -> Self {
        Self { synth, config }
    }

    /// Produce the assembled timeline and its history, one record per clip.
    ///
    /// An empty cue list yields an empty timeline and empty history.
    pub fn assemble(&self, cues: &[Cue]) -> ConvertResult<(Timeline, Vec<HistoryRecord>)> {
        let rate = self.config.sample_rate;
        let mut timeline = Timeline::new(rate);
        let mut history: Vec<HistoryRecord> = Vec::new();
        // Cursor in samples; invariant: elapsed == timeline.total_samples()
        let mut elapsed = 0usize;

        for cue in cues {
            let cue_start = samples_for_duration(cue.start, rate);

            if cue_start > elapsed {
                // Gap: realign the audio onset with the declared start.
                let gap = cue_start - elapsed;
                timeline.push(TimelineClip {
                    samples: vec![0.0; gap],
                    kind: ClipKind::Silence,
                });
                history.push(record(elapsed, gap, HistoryContent::Silence, rate));
                elapsed += gap;
            } else if cue_start < elapsed {
                match self.config.overlap {
                    OverlapPolicy::DriftForward => {
                        // Never rewind; the next gap will forward-correct.
                        tracing::debug!(
                            cue = cue.index,
                            drift_samples = elapsed - cue_start,
                            "speech overran declared start, drifting forward"
                        );
                    }
                    OverlapPolicy::TruncatePrevious => {
                        let overrun = elapsed - cue_start;
                        elapsed -= truncate_last(&mut timeline, &mut history, overrun, rate);
                    }
                }
            }

            if cue.is_silence_request() {
                // Explicit silence; the synthesizer must not see empty text.
                let samples = silence(cue.nominal_window(), rate);
                let len = samples.len();
                timeline.push(TimelineClip {
                    samples,
                    kind: ClipKind::Silence,
                });
                history.push(record(elapsed, len, HistoryContent::Silence, rate));
                elapsed += len;
                continue;
            }

            let rendered = synthesize_with_retry(
                self.synth,
                &cue.text,
                self.config.max_retries,
                self.config.retry_base_delay,
            );

            match rendered {
                Ok(clip) => {
                    let clip = conform_rate(clip, rate);
                    let len = clip.samples.len();
                    timeline.push(TimelineClip {
                        samples: clip.samples,
                        kind: ClipKind::Speech {
                            cue_index: cue.index,
                        },
                    });
                    history.push(record(
                        elapsed,
                        len,
                        HistoryContent::Speech(cue.text.clone()),
                        rate,
                    ));
                    elapsed += len;
                }
                Err(err) => match self.config.on_failure {
                    SynthesisFallback::Abort => return Err(err),
                    SynthesisFallback::SubstituteSilence => {
                        tracing::warn!(
                            cue = cue.index,
                            error = %err,
                            "substituting silence for failed synthesis"
                        );
                        let samples = silence(cue.nominal_window(), rate);
                        let len = samples.len();
                        timeline.push(TimelineClip {
                            samples,
                            kind: ClipKind::Silence,
                        });
                        history.push(record(elapsed, len, HistoryContent::SynthesisFailed, rate));
                        elapsed += len;
                    }
                },
            }
        }

        Ok((timeline, history))
    }
}

fn record(start_samples: usize, len: usize, content: HistoryContent, rate: u32) -> HistoryRecord {
    HistoryRecord {
        start: duration_for_samples(start_samples, rate),
        duration: duration_for_samples(len, rate),
        content,
    }
}

/// Trim up to `overrun` samples from the tail of the last clip; returns the
/// count actually removed. The clip's history row shrinks with it.
fn truncate_last(
    timeline: &mut Timeline,
    history: &mut [HistoryRecord],
    overrun: usize,
    rate: u32,
) -> usize {
    let Some(last) = timeline.clips.last_mut() else {
        return 0;
    };
    let removed = overrun.min(last.samples.len());
    let kept = last.samples.len() - removed;
    last.samples.truncate(kept);
    if let Some(row) = history.last_mut() {
        row.duration = duration_for_samples(kept, rate);
    }
    removed
}
