//! History logger: one CSV row per timeline clip.
//!
//! Rows are `start_seconds,duration_seconds,content` in timeline order, with
//! `<silence>` and `<synthesis-failed>` markers for non-speech clips. Like
//! the audio sink, the log is staged and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::types::HistoryRecord;

pub fn write_history(records: &[HistoryRecord], path: &Path) -> ConvertResult<()> {
    let staging = staging_path(path);
    if let Err(err) = write_rows(records, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    Ok(())
}

fn write_rows(records: &[HistoryRecord], staging: &Path) -> ConvertResult<()> {
    let mut writer = csv::Writer::from_path(staging).map_err(csv_error)?;

    writer
        .write_record(["start_seconds", "duration_seconds", "content"])
        .map_err(csv_error)?;
    for record in records {
        writer
            .write_record([
                format!("{:.3}", record.start.as_secs_f64()).as_str(),
                format!("{:.3}", record.duration.as_secs_f64()).as_str(),
                record.content.as_field(),
            ])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> ConvertError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => ConvertError::Io(io),
        other => ConvertError::encoding(format!("history serialization: {other:?}")),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "history".into());
    name.push(".part");
    path.with_file_name(name)
}
