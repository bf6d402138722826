//! Conversion configuration
//!
//! A [`GifConfig`] starts from a quality preset, gets overridden by
//! explicit CLI flags, and is finalized per input file by
//! [`GifConfig::apply_smart_defaults`].

use std::path::Path;

use shared_utils::errors::{Result, Vid2GifError};
use shared_utils::ffprobe;

use crate::presets::QualityPreset;

/// Frame rate used by the filter-graph builder when none was resolved.
pub const DEFAULT_FPS: u32 = 15;

/// Cap for frame rates taken from the source video.
const AUTO_FPS_CAP: u32 = 50;
/// Frame rate assumed when the source cannot be probed.
const AUTO_FPS_FALLBACK: u32 = 30;

/// Clips shorter than this get a small frame-rate boost.
const SHORT_CLIP_SECS: f64 = 3.0;
const SHORT_CLIP_FPS_BOOST: u32 = 5;
const SHORT_CLIP_FPS_CAP: u32 = 30;

/// Settings for a single video-to-GIF conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct GifConfig {
    /// Output frame rate. `None` means auto-detect from the source.
    pub fps: Option<u32>,
    /// Output width in pixels; height follows the aspect ratio.
    /// `None` keeps the source width.
    pub width: Option<u32>,
    /// Palette size, 2-256.
    pub colors: u16,
    /// Trim start in seconds.
    pub start: Option<f64>,
    /// Trim end in seconds.
    pub end: Option<f64>,
    /// Pass FFmpeg output through to the terminal.
    pub verbose: bool,
}

impl GifConfig {
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            fps: Some(preset.fps()),
            width: Some(preset.width()),
            colors: preset.colors(),
            start: None,
            end: None,
            verbose: false,
        }
    }

    /// Rejects settings FFmpeg would choke on, before any encode runs.
    pub fn validate(&self) -> Result<()> {
        if !(2..=256).contains(&self.colors) {
            return Err(Vid2GifError::InvalidConfig(format!(
                "colors must be between 2 and 256, got {}",
                self.colors
            )));
        }

        if self.fps == Some(0) {
            return Err(Vid2GifError::InvalidConfig(
                "fps must be greater than 0".to_string(),
            ));
        }

        if self.width == Some(0) {
            return Err(Vid2GifError::InvalidConfig(
                "width must be greater than 0".to_string(),
            ));
        }

        if let Some(start) = self.start {
            if start < 0.0 {
                return Err(Vid2GifError::InvalidConfig(format!(
                    "start time cannot be negative, got {}",
                    start
                )));
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end <= start {
                return Err(Vid2GifError::InvalidConfig(format!(
                    "end time ({}) must be greater than start time ({})",
                    end, start
                )));
            }
        }

        Ok(())
    }

    /// Fills in the frame rate from the source video.
    ///
    /// An unset fps is taken from the source (capped at 50), or falls
    /// back to 30 when probing fails. Clips under 3 seconds then get a
    /// +5 boost (up to 30) so short loops stay smooth. The boost also
    /// applies to preset and explicit frame rates.
    pub fn apply_smart_defaults(&mut self, input: &Path) {
        if self.fps.is_none() {
            self.fps = Some(resolve_auto_fps(ffprobe::get_frame_rate(input)));
        }

        if let Some(fps) = self.fps {
            self.fps = Some(bump_short_clip_fps(fps, ffprobe::get_duration(input)));
        }
    }
}

impl Default for GifConfig {
    fn default() -> Self {
        Self::from_preset(QualityPreset::default())
    }
}

fn resolve_auto_fps(probed: Option<f64>) -> u32 {
    match probed {
        // Truncate like the fps filter does; a sub-1fps source still
        // needs at least one frame per second
        Some(rate) => (rate as u32).max(1).min(AUTO_FPS_CAP),
        None => AUTO_FPS_FALLBACK,
    }
}

fn bump_short_clip_fps(fps: u32, duration: Option<f64>) -> u32 {
    match duration {
        // Zero duration means the probe could not tell, not a 0s clip
        Some(secs) if secs > 0.0 && secs < SHORT_CLIP_SECS && fps < SHORT_CLIP_FPS_CAP => {
            (fps + SHORT_CLIP_FPS_BOOST).min(SHORT_CLIP_FPS_CAP)
        }
        _ => fps,
    }
}
