use crate::types::RenderedClip;

/// Conform a clip to `target_rate` via linear interpolation.
///
/// Clips already at the target rate pass through untouched; an empty clip is
/// simply relabeled.
pub fn conform_rate(clip: RenderedClip, target_rate: u32) -> RenderedClip {
    if clip.sample_rate == target_rate || clip.samples.is_empty() {
        return RenderedClip {
            samples: clip.samples,
            sample_rate: target_rate,
        };
    }

    let ratio = target_rate as f64 / clip.sample_rate as f64;
    let output_len = ((clip.samples.len() as f64) * ratio).round().max(1.0) as usize;
    let last = clip.samples.len() - 1;

    let samples = (0..output_len)
        .map(|i| {
            let position = i as f64 / ratio;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let t = (position - left as f64) as f32;
            clip.samples[left] * (1.0 - t) + clip.samples[right] * t
        })
        .collect();

    RenderedClip {
        samples,
        sample_rate: target_rate,
    }
}
