//! Speech synthesis seam.
//!
//! The assembler only ever sees the `SpeechSynthesizer` trait, so its fold
//! logic is testable with a deterministic fake while production runs use the
//! remote client in [`gtts`].

pub mod gtts;

use std::thread;
use std::time::Duration;

use crate::error::ConvertResult;
use crate::types::RenderedClip;

/// Voice/locale settings handed to a synthesizer at construction time.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Language tag understood by the backend (e.g. "en", "pt-BR").
    pub language: String,
}

/// Renders spoken audio for one piece of text.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> ConvertResult<RenderedClip>;
}

/// Call the synthesizer with a bounded retry budget and exponential backoff.
///
/// `max_retries` counts attempts beyond the first; the delay doubles after
/// every failed attempt.
pub fn synthesize_with_retry(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    max_retries: u32,
    base_delay: Duration,
) -> ConvertResult<RenderedClip> {
    let mut attempt = 0;
    loop {
        match synth.synthesize(text) {
            Ok(clip) => return Ok(clip),
            Err(err) if attempt < max_retries => {
                let delay = base_delay * 2u32.saturating_pow(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "synthesis attempt failed, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
