//! Google Translate text-to-speech client.
//!
//! Talks to the same `translate_tts` endpoint the gTTS library wraps: one GET
//! per text chunk, MP3 bytes back, decoded to PCM before they reach the
//! assembler. Text longer than the endpoint's query limit is split at
//! whitespace and the rendered chunks concatenated.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::audio::{decoder, resample};
use crate::error::{ConvertError, ConvertResult};
use crate::synth::{SpeechSynthesizer, VoiceConfig};
use crate::types::RenderedClip;

const ENDPOINT: &str = "https://translate.google.com/translate_tts";
/// The endpoint rejects much longer queries; matches gTTS's chunking limit.
const MAX_CHUNK_CHARS: usize = 200;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GoogleTranslateTts {
    client: Client,
    voice: VoiceConfig,
}

impl GoogleTranslateTts {
    pub fn new(voice: VoiceConfig) -> ConvertResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("subvox/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ConvertError::synthesis("", err.to_string()))?;
        Ok(Self { client, voice })
    }

    fn fetch_chunk(&self, chunk: &str) -> ConvertResult<Vec<u8>> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.voice.language.as_str()),
                ("q", chunk),
            ])
            .send()
            .map_err(|err| ConvertError::synthesis(chunk, err.to_string()))?;

        if !response.status().is_success() {
            return Err(ConvertError::synthesis(
                chunk,
                format!("endpoint returned {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|err| ConvertError::synthesis(chunk, err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize(&self, text: &str) -> ConvertResult<RenderedClip> {
        let mut samples = Vec::new();
        let mut sample_rate = 0u32;

        for chunk in split_text(text, MAX_CHUNK_CHARS) {
            let bytes = self.fetch_chunk(&chunk)?;
            let clip = decoder::decode_bytes(bytes, Some("mp3"))
                .map_err(|err| ConvertError::synthesis(&chunk, err.to_string()))?;
            if sample_rate == 0 {
                sample_rate = clip.sample_rate;
                samples = clip.samples;
            } else {
                let conformed = resample::conform_rate(clip, sample_rate);
                samples.extend(conformed.samples);
            }
        }

        if sample_rate == 0 {
            return Err(ConvertError::synthesis(text, "no audio rendered for text"));
        }
        Ok(RenderedClip {
            samples,
            sample_rate,
        })
    }
}

/// Split text at whitespace into chunks of at most `max_chars` characters.
///
/// A single word longer than the limit becomes its own chunk rather than
/// being cut mid-word.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars > 0 && current_chars + 1 + word_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
