//! Subtitle cue parser.
//!
//! Parses SRT-style block sequences (numeric index line, timestamp pair line,
//! text lines, blank-line separated) into an ordered `Vec<Cue>`. Parsing is a
//! pure transformation and fails fast: the first malformed block aborts the
//! run before any synthesis starts.

use std::time::Duration;

use crate::error::{ConvertError, ConvertResult};
use crate::types::Cue;

/// Parse subtitle source text into cues in source order.
///
/// Tolerates a leading UTF-8 BOM and CRLF line endings. A block whose text
/// lines are absent or whitespace-only still yields a cue; the assembler
/// treats it as an explicit silence request.
pub fn parse_srt(source: &str) -> ConvertResult<Vec<Cue>> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut cues = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in source.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !block.is_empty() {
                cues.push(parse_block(&block, cues.len() + 1)?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }
    if !block.is_empty() {
        cues.push(parse_block(&block, cues.len() + 1)?);
    }

    Ok(cues)
}

fn parse_block(lines: &[&str], ordinal: usize) -> ConvertResult<Cue> {
    let index = lines[0]
        .trim()
        .parse::<usize>()
        .map_err(|_| ConvertError::malformed_cue(ordinal, "expected a numeric index line"))?;

    let timing = lines
        .get(1)
        .ok_or_else(|| ConvertError::malformed_cue(index, "missing timestamp line"))?;
    let (raw_start, raw_end) = timing
        .split_once("-->")
        .ok_or_else(|| ConvertError::malformed_cue(index, "missing '-->' timestamp pair"))?;

    let start = parse_timestamp(raw_start, index)?;
    let end = parse_timestamp(raw_end, index)?;
    if end < start {
        return Err(ConvertError::malformed_cue(
            index,
            format!(
                "end {:.3}s precedes start {:.3}s",
                end.as_secs_f64(),
                start.as_secs_f64()
            ),
        ));
    }

    let text = lines[2..]
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    Ok(Cue {
        index,
        start,
        end,
        text,
    })
}

/// Parse a `HH:MM:SS,mmm` timestamp (a `.` millisecond separator is accepted).
fn parse_timestamp(raw: &str, cue_index: usize) -> ConvertResult<Duration> {
    let malformed =
        |reason: String| -> ConvertError { ConvertError::malformed_cue(cue_index, reason) };

    let raw = raw.trim();
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return Err(malformed(format!(
            "timestamp '{raw}' must have the form HH:MM:SS,mmm"
        )));
    }

    let hours: u64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid hours in '{raw}'")))?;
    let minutes: u64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid minutes in '{raw}'")))?;

    let seconds_part = parts[2].trim();
    let (secs, millis) = match seconds_part.split_once([',', '.']) {
        Some((s, ms)) => (s, ms),
        None => (seconds_part, "0"),
    };
    let seconds: u64 = secs
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid seconds in '{raw}'")))?;
    let millis: u64 = millis
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid milliseconds in '{raw}'")))?;

    hours
        .checked_mul(60)
        .and_then(|v| v.checked_add(minutes))
        .and_then(|v| v.checked_mul(60))
        .and_then(|v| v.checked_add(seconds))
        .and_then(|v| v.checked_mul(1_000))
        .and_then(|v| v.checked_add(millis))
        .map(Duration::from_millis)
        .ok_or_else(|| malformed(format!("timestamp '{raw}' is out of range")))
}
