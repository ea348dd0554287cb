//! Audio sink: encodes the assembled timeline to its output container.
//!
//! The main track is written to a sibling `.part` path and renamed into place
//! on success, so a failed run never leaves a partial file at the destination.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ClipKind, OutputFormat, Timeline};

/// Concatenate the timeline's clips sample-accurately and write the track.
///
/// An empty timeline yields a minimal valid zero-duration file.
pub fn write_track(timeline: &Timeline, path: &Path, format: OutputFormat) -> ConvertResult<()> {
    match format {
        OutputFormat::Wav => write_wav(timeline, path),
    }
}

/// Persist one clip's samples as a standalone file (per-cue clip output).
pub fn write_clip(samples: &[f32], sample_rate: u32, path: &Path) -> ConvertResult<()> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate)).map_err(hound_error)?;
    write_samples(&mut writer, samples)?;
    writer.finalize().map_err(hound_error)
}

/// Persist each spoken clip (silence excluded) as `<stem>_clip_NNNN.<ext>`
/// next to the main output, numbered by source cue index. Returns how many
/// clip files were written.
pub fn write_clips(timeline: &Timeline, output: &Path, format: OutputFormat) -> ConvertResult<usize> {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("track");
    let mut written = 0usize;
    for clip in &timeline.clips {
        if let ClipKind::Speech { cue_index } = &clip.kind {
            let name = format!("{stem}_clip_{cue_index:04}.{}", format.extension());
            write_clip(&clip.samples, timeline.sample_rate, &output.with_file_name(name))?;
            written += 1;
        }
    }
    Ok(written)
}

fn write_wav(timeline: &Timeline, path: &Path) -> ConvertResult<()> {
    let staging = staging_path(path);
    if let Err(err) = write_wav_to(timeline, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    Ok(())
}

fn write_wav_to(timeline: &Timeline, staging: &Path) -> ConvertResult<()> {
    let mut writer =
        hound::WavWriter::create(staging, wav_spec(timeline.sample_rate)).map_err(hound_error)?;
    for clip in &timeline.clips {
        write_samples(&mut writer, &clip.samples)?;
    }
    writer.finalize().map_err(hound_error)
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(
    writer: &mut hound::WavWriter<W>,
    samples: &[f32],
) -> ConvertResult<()> {
    for &sample in samples {
        // Clamp to [-1.0, 1.0] and scale to i16 range
        let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(scaled).map_err(hound_error)?;
    }
    Ok(())
}

fn hound_error(err: hound::Error) -> ConvertError {
    match err {
        hound::Error::IoError(io) => ConvertError::Io(io),
        other => ConvertError::encoding(other.to_string()),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "track".into());
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClipKind, TimelineClip};

    fn timeline_with(samples: Vec<f32>) -> Timeline {
        let mut timeline = Timeline::new(24_000);
        timeline.push(TimelineClip {
            samples,
            kind: ClipKind::Speech { cue_index: 1 },
        });
        timeline
    }

    #[test]
    fn writes_track_and_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("track.wav");

        let timeline = timeline_with(vec![0.25; 2_400]);
        write_track(&timeline, &out, OutputFormat::Wav).unwrap();

        assert!(out.exists());
        assert!(!staging_path(&out).exists());

        let reader = hound::WavReader::open(&out).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        assert_eq!(reader.len(), 2_400);
    }

    #[test]
    fn empty_timeline_produces_valid_zero_duration_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.wav");

        write_track(&Timeline::new(24_000), &out, OutputFormat::Wav).unwrap();

        let reader = hound::WavReader::open(&out).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn unwritable_destination_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("track.wav");

        let err = write_track(&timeline_with(vec![0.0; 10]), &out, OutputFormat::Wav).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
        assert!(!out.exists());
    }

    #[test]
    fn destination_blocked_by_directory_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("track.wav");
        fs::create_dir(&out).unwrap();

        let err = write_track(&timeline_with(vec![0.0; 10]), &out, OutputFormat::Wav).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
        assert!(!staging_path(&out).exists());
    }

    #[test]
    fn write_clips_numbers_speech_by_cue_index_and_skips_silence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("track.wav");

        let mut timeline = Timeline::new(8_000);
        timeline.push(TimelineClip {
            samples: vec![0.1; 800],
            kind: ClipKind::Speech { cue_index: 2 },
        });
        timeline.push(TimelineClip {
            samples: vec![0.0; 400],
            kind: ClipKind::Silence,
        });
        timeline.push(TimelineClip {
            samples: vec![0.2; 1_600],
            kind: ClipKind::Speech { cue_index: 5 },
        });

        let written = write_clips(&timeline, &out, OutputFormat::Wav).unwrap();
        assert_eq!(written, 2);

        let first = hound::WavReader::open(dir.path().join("track_clip_0002.wav")).unwrap();
        assert_eq!(first.spec().sample_rate, 8_000);
        assert_eq!(first.len(), 800);
        assert!(dir.path().join("track_clip_0005.wav").exists());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn clips_round_trip_through_wav() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clip_0001.wav");

        write_clip(&[0.5, -0.5, 0.0], 16_000, &out).unwrap();

        let reader = hound::WavReader::open(&out).unwrap();
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 16_383);
        assert_eq!(samples[2], 0);
    }
}
