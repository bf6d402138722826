//! Shared Utilities for the vid-gif converter
//!
//! This crate provides common functionality used by the vid-gif CLI:
//! - Batch processing utilities and video file discovery
//! - Summary reporting
//! - FFprobe wrapper for source video analysis
//! - FFmpeg process management (deadlock-safe stderr handling, cancellation)
//! - External tools detection and path sanitization
//! - Unified logging
//! - Type-safe wrappers (FileSize)

pub mod batch;
pub mod errors;
pub mod ffmpeg;
pub mod ffprobe;
pub mod logging;
pub mod path_safety;
pub mod report;
pub mod tools;
pub mod types;

pub use batch::*;
pub use errors::{Result, Vid2GifError};
pub use ffmpeg::{format_ffmpeg_error, CancelToken, FfmpegProcess};
pub use ffprobe::{get_duration, get_frame_rate, parse_frame_rate};
pub use path_safety::safe_path_arg;
pub use report::*;
pub use tools::*;
pub use types::FileSize;
