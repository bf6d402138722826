//! External tool discovery
//!
//! The converter shells out to FFmpeg; fail early with an actionable
//! message instead of at the first encode.

use crate::errors::{Result, Vid2GifError};

pub fn is_ffmpeg_installed() -> bool {
    which::which("ffmpeg").is_ok()
}

/// Errors with an install hint when ffmpeg is not on PATH.
pub fn require_ffmpeg() -> Result<()> {
    if is_ffmpeg_installed() {
        Ok(())
    } else {
        Err(Vid2GifError::ToolNotFound(
            "ffmpeg not found. Install with: brew install ffmpeg".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_ffmpeg_matches_lookup() {
        assert_eq!(require_ffmpeg().is_ok(), is_ffmpeg_installed());
    }

    #[test]
    fn test_tool_not_found_message_has_hint() {
        let err = Vid2GifError::ToolNotFound(
            "ffmpeg not found. Install with: brew install ffmpeg".to_string(),
        );
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("brew install"));
    }
}
