//! Channel mixing.
//!
//! The signal chain works on a single channel.  [`downmix_into`] averages
//! interleaved frames into a caller-owned scratch buffer so the cpal callback
//! can reuse one allocation for the lifetime of the stream.

/// Average interleaved `samples` into `out`, replacing its contents.
///
/// * `channels == 1` copies the input unchanged.
/// * `channels == 0` leaves `out` empty.
/// * A trailing partial frame is dropped.
///
/// # Example
///
/// ```rust
/// use gen_audio::audio::downmix_into;
///
/// let mut mono = Vec::new();
/// downmix_into(&[0.5_f32, -0.5, 0.2, 0.4], 2, &mut mono); // L R L R
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix_into(samples: &[f32], channels: u16, out: &mut Vec<f32>) {
    out.clear();
    match channels {
        0 => {}
        1 => out.extend_from_slice(samples),
        n => {
            let n = n as usize;
            out.extend(
                samples
                    .chunks_exact(n)
                    .map(|frame| frame.iter().sum::<f32>() / n as f32),
            );
        }
    }
}
