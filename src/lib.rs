//! Subvox - subtitle-to-speech track conversion.
//!
//! Parses timestamped subtitle cues, synthesizes speech for each one, and
//! stitches the clips with computed silence gaps into a single track whose
//! wall-clock alignment follows the source subtitle timing.

pub mod audio;
pub mod error;
pub mod history;
pub mod subtitle;
pub mod synth;
pub mod timeline;
pub mod types;
