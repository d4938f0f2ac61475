//! Size-bounded JPEG encoding.
//!
//! Re-encodes arbitrary input images into a JPEG guaranteed to fit under a
//! hard byte ceiling, via a bounded search over quality and resolution.
//! The search walks a fixed parameter ladder: quality drops in steps of 10
//! at the initial width, switches once to a lower-resolution regime when
//! quality runs out of room, and ends with a single forced minimum-settings
//! attempt.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, imageops::FilterType};

use super::error::MediaError;

/// Hard ceiling for the encoded result, in bytes.
pub const SIZE_CEILING: usize = 10 * 1024;

/// Quality step between attempts.
const QUALITY_STEP: u8 = 10;
/// Smallest quality the ladder tries.
const MIN_QUALITY: u8 = 10;
/// Below this quality the search switches to the low-resolution regime.
const LOW_RES_THRESHOLD: u8 = 30;
/// Width used by the low-resolution regime.
const LOW_RES_WIDTH: u32 = 100;
/// Quality reset applied on the regime switch.
const LOW_RES_QUALITY: u8 = 60;
/// Width of the final forced attempt.
const FINAL_WIDTH: u32 = 80;
/// Quality of the final forced attempt.
const FINAL_QUALITY: u8 = 10;

/// Encoder parameters, resolved once at startup.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// Maximum allowed byte length for the encoded result.
    pub ceiling: usize,
    /// Quality of the first attempt.
    pub initial_quality: u8,
    /// Square crop width of the first attempt, in pixels.
    pub initial_width: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ceiling: SIZE_CEILING,
            initial_quality: 80,
            initial_width: 200,
        }
    }
}

/// A successfully encoded image, with the attempt parameters that won.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// The encoded JPEG bytes, guaranteed to be at most the ceiling.
    pub bytes: Vec<u8>,
    /// JPEG quality of the winning attempt.
    pub quality: u8,
    /// Square width of the winning attempt, in pixels.
    pub width: u32,
}

/// The (quality, width) ladder walked by the bounded search.
///
/// Quality strictly decreases except for the single low-resolution regime
/// switch, so the ladder is finite by construction: at most 12 attempts
/// from the default configuration, before the forced final attempt.
#[derive(Debug)]
struct AttemptSchedule {
    quality: u8,
    width: u32,
}

impl AttemptSchedule {
    const fn new(config: &EncoderConfig) -> Self {
        Self {
            quality: config.initial_quality,
            width: config.initial_width,
        }
    }
}

impl Iterator for AttemptSchedule {
    type Item = (u8, u32);

    fn next(&mut self) -> Option<(u8, u32)> {
        if self.quality < MIN_QUALITY {
            return None;
        }

        let attempt = (self.quality, self.width);

        self.quality = self.quality.saturating_sub(QUALITY_STEP);
        if self.quality < LOW_RES_THRESHOLD && self.width > LOW_RES_WIDTH {
            self.width = LOW_RES_WIDTH;
            self.quality = LOW_RES_QUALITY;
        }

        Some(attempt)
    }
}

/// Re-encodes images to fit under a fixed byte ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeBoundedEncoder {
    config: EncoderConfig,
}

impl SizeBoundedEncoder {
    /// Creates an encoder with the given parameters.
    #[must_use]
    pub const fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// The configured size ceiling in bytes.
    #[must_use]
    pub const fn ceiling(&self) -> usize {
        self.config.ceiling
    }

    /// Re-encodes `original` as a JPEG of at most the configured ceiling.
    ///
    /// The first attempt that fits wins; the search never keeps going in
    /// hope of a smaller result.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Decode` if the input is empty or not a
    /// decodable image, and `MediaError::Encoding` with the best achieved
    /// size if no parameter combination reaches the ceiling.
    pub fn encode(&self, original: &[u8]) -> Result<Encoded, MediaError> {
        if original.is_empty() {
            return Err(MediaError::Decode("empty input".to_string()));
        }

        let source =
            image::load_from_memory(original).map_err(|e| MediaError::Decode(e.to_string()))?;

        let mut achieved = usize::MAX;
        for (quality, width) in AttemptSchedule::new(&self.config) {
            let bytes = encode_attempt(&source, quality, width)?;
            if bytes.len() <= self.config.ceiling {
                return Ok(Encoded {
                    bytes,
                    quality,
                    width,
                });
            }
            achieved = achieved.min(bytes.len());
        }

        // The ladder is exhausted; one forced attempt at minimum settings.
        let bytes = encode_attempt(&source, FINAL_QUALITY, FINAL_WIDTH)?;
        if bytes.len() <= self.config.ceiling {
            return Ok(Encoded {
                bytes,
                quality: FINAL_QUALITY,
                width: FINAL_WIDTH,
            });
        }

        Err(MediaError::Encoding {
            ceiling: self.config.ceiling,
            achieved: achieved.min(bytes.len()),
        })
    }
}

/// Center-cover crop to `width`×`width` and JPEG-encode at `quality`.
fn encode_attempt(source: &DynamicImage, quality: u8, width: u32) -> Result<Vec<u8>, MediaError> {
    let resized = source.resize_to_fill(width, width, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| MediaError::Decode(e.to_string()))?;

    Ok(buf)
}
