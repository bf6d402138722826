//! vid-gif - Video to GIF Conversion
//!
//! Converts video files to animated GIFs through external FFmpeg with
//! two-pass palette encoding:
//! - Pass 1 derives a per-clip color palette (palettegen)
//! - Pass 2 maps frames through that palette (paletteuse)
//!
//! ## Simple Mode
//! ```rust,ignore
//! use shared_utils::CancelToken;
//! use std::path::Path;
//!
//! let config = vid_gif::GifConfig::default();
//! vid_gif::encode(Path::new("clip.mp4"), Path::new("clip.gif"), &config, &CancelToken::new())?;
//! ```

pub mod config;
pub mod converter;
pub mod filtergraph;
pub mod output;
pub mod presets;


pub use config::{GifConfig, DEFAULT_FPS};
pub use converter::{encode, encode_with_budget, SizeSearchResult};
pub use filtergraph::{FilterChain, FilterMode, FilterStage};
pub use output::{resolve_output_path, validate_input};
pub use presets::QualityPreset;

pub use shared_utils::errors::{Result, Vid2GifError};
