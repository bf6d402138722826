//! Two-pass GIF encoding driven through external FFmpeg.
//!
//! Pass 1 derives a per-clip color palette (palettegen), pass 2 maps
//! the video through that palette (paletteuse). The palette is a
//! uniquely named sibling of the output file and is removed on every
//! exit path, including cancellation. When a size target is set, the
//! encode is retried along a fixed degradation ladder whose settings
//! are always derived from the caller's original configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

use tracing::{debug, info};

use shared_utils::errors::{Result, Vid2GifError};
use shared_utils::ffmpeg::{format_ffmpeg_error, CancelToken, FfmpegProcess};
use shared_utils::logging::log_external_tool;
use shared_utils::path_safety::safe_path_arg;
use shared_utils::types::FileSize;

use crate::config::{GifConfig, DEFAULT_FPS};
use crate::filtergraph::{FilterChain, FilterMode};

/// Frame rates degrade no further than this.
pub(crate) const MIN_FPS: u32 = 5;

// ═══════════════════════════════════════════════════════════════
// Palette lifetime
// ═══════════════════════════════════════════════════════════════

/// Removes the palette temp file when the encode scope unwinds.
struct PaletteGuard<'a> {
    path: &'a Path,
}

impl Drop for PaletteGuard<'_> {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(self.path) {
                eprintln!("⚠️ [cleanup] Failed to remove temp palette file: {}", e);
            }
        }
    }
}

/// Creates a uniquely named palette file next to the output, so two
/// conversions into the same directory never clobber each other's
/// palette. Auto-delete on the handle is disabled; [`PaletteGuard`]
/// owns removal because FFmpeg rewrites the file out from under us.
fn create_palette_path(output: &Path) -> Result<PathBuf> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let temp = tempfile::Builder::new()
        .prefix(&format!(".{}.palette-", stem))
        .suffix(".png")
        .tempfile_in(dir)?;
    let path = temp
        .into_temp_path()
        .keep()
        .map_err(|e| Vid2GifError::Io(e.error))?;
    Ok(path)
}

// ═══════════════════════════════════════════════════════════════
// Two-pass encode
// ═══════════════════════════════════════════════════════════════

/// Converts `input` to a GIF at `output` with the given settings.
///
/// Returns the size of the written GIF. Fails with
/// [`Vid2GifError::PaletteGeneration`] when pass 1 fails and
/// [`Vid2GifError::GifSynthesis`] when pass 2 fails or produces an
/// empty file.
pub fn encode(
    input: &Path,
    output: &Path,
    config: &GifConfig,
    cancel: &CancelToken,
) -> Result<FileSize> {
    let palette_path = create_palette_path(output)?;
    let _palette_guard = PaletteGuard {
        path: &palette_path,
    };

    run_palette_pass(input, &palette_path, config, cancel)?;
    run_synthesis_pass(input, &palette_path, output, config, cancel)?;

    let size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        let _ = fs::remove_file(output);
        return Err(Vid2GifError::GifSynthesis(
            "GIF output file is empty (encoding may have failed)".to_string(),
        ));
    }

    Ok(FileSize::new(size))
}

/// Pass 1: sample the clip and write a 256-entry-max palette PNG.
fn run_palette_pass(
    input: &Path,
    palette: &Path,
    config: &GifConfig,
    cancel: &CancelToken,
) -> Result<()> {
    let chain = FilterChain::build(config, FilterMode::PaletteGen);
    debug!(filter = %chain.to_filter_arg(), "Generating palette");

    let mut args: Vec<String> = vec!["-y".to_string()];
    if !config.verbose {
        args.push("-loglevel".to_string());
        args.push("error".to_string());
    }
    args.push("-i".to_string());
    args.push(safe_path_arg(input).into_owned());
    args.push("-vf".to_string());
    args.push(chain.to_filter_arg());
    args.push(safe_path_arg(palette).into_owned());

    let (status, stderr) = run_ffmpeg(&args, config.verbose, cancel)?;
    if !status.success() {
        return Err(Vid2GifError::PaletteGeneration(format_ffmpeg_error(
            &stderr,
        )));
    }
    Ok(())
}

/// Pass 2: re-read the clip and map it through the palette.
fn run_synthesis_pass(
    input: &Path,
    palette: &Path,
    output: &Path,
    config: &GifConfig,
    cancel: &CancelToken,
) -> Result<()> {
    let chain = FilterChain::build(config, FilterMode::PaletteUse);
    debug!(filter = %chain.to_filter_arg(), "Encoding GIF");

    let mut args: Vec<String> = vec!["-y".to_string()];
    if !config.verbose {
        args.push("-loglevel".to_string());
        args.push("error".to_string());
    }
    args.push("-i".to_string());
    args.push(safe_path_arg(input).into_owned());
    args.push("-i".to_string());
    args.push(safe_path_arg(palette).into_owned());
    args.push("-lavfi".to_string());
    args.push(chain.to_filter_arg());
    args.push(safe_path_arg(output).into_owned());

    let (status, stderr) = run_ffmpeg(&args, config.verbose, cancel)?;
    if !status.success() {
        return Err(Vid2GifError::GifSynthesis(format_ffmpeg_error(&stderr)));
    }
    Ok(())
}

/// Spawns FFmpeg, waits for it under the cancellation token, and logs
/// the invocation. Echo mode forwards FFmpeg's stderr to ours as it
/// arrives; otherwise diagnostics are captured silently.
fn run_ffmpeg(
    args: &[String],
    echo_stderr: bool,
    cancel: &CancelToken,
) -> Result<(ExitStatus, String)> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(args);

    let start = Instant::now();
    let process = if echo_stderr {
        FfmpegProcess::spawn_echoing(&mut cmd)?
    } else {
        FfmpegProcess::spawn(&mut cmd)?
    };
    let (status, stderr) = process.wait_with_output(cancel)?;

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    log_external_tool("ffmpeg", &arg_refs, &stderr, status.code(), start.elapsed());

    Ok((status, stderr))
}

// ═══════════════════════════════════════════════════════════════
// Size-target search
// ═══════════════════════════════════════════════════════════════

/// One rung of the degradation ladder. Factors apply to the original
/// settings, never to a previous attempt's.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DegradeStep {
    pub(crate) fps_factor: f64,
    pub(crate) width_factor: Option<f64>,
}

/// Frame rate drops first, resolution only afterwards.
pub(crate) const DEGRADE_LADDER: [DegradeStep; 5] = [
    DegradeStep {
        fps_factor: 0.75,
        width_factor: None,
    },
    DegradeStep {
        fps_factor: 0.5,
        width_factor: None,
    },
    DegradeStep {
        fps_factor: 0.75,
        width_factor: Some(0.75),
    },
    DegradeStep {
        fps_factor: 0.5,
        width_factor: Some(0.75),
    },
    DegradeStep {
        fps_factor: 0.5,
        width_factor: Some(0.5),
    },
];

impl DegradeStep {
    /// Derives the attempt configuration from the original one.
    pub(crate) fn apply(&self, original: &GifConfig) -> GifConfig {
        let mut config = original.clone();
        let base_fps = original.fps.unwrap_or(DEFAULT_FPS);
        config.fps = Some(((base_fps as f64 * self.fps_factor) as u32).max(MIN_FPS));
        if let (Some(factor), Some(width)) = (self.width_factor, original.width) {
            config.width = Some((width as f64 * factor) as u32);
        }
        config
    }
}

/// Outcome of a size-target search.
#[derive(Debug, Clone)]
pub struct SizeSearchResult {
    /// Size of the GIF left on disk (from the last attempt).
    pub output_size: FileSize,
    /// Whether that GIF fits the requested budget.
    pub met_budget: bool,
    /// Encode attempts performed (1 initial + up to 5 degraded).
    pub attempts: u32,
    /// Settings of the attempt whose output was kept.
    pub config: GifConfig,
}

/// Drives `encode_attempt` down the degradation ladder until the
/// budget is met or the ladder is exhausted. An attempt that fails to
/// encode aborts the search; an attempt that merely overshoots the
/// budget does not.
pub(crate) fn run_search<F>(
    original: &GifConfig,
    budget: FileSize,
    mut encode_attempt: F,
) -> Result<SizeSearchResult>
where
    F: FnMut(&GifConfig) -> Result<FileSize>,
{
    let size = encode_attempt(original)?;
    if size <= budget {
        return Ok(SizeSearchResult {
            output_size: size,
            met_budget: true,
            attempts: 1,
            config: original.clone(),
        });
    }

    let mut attempts = 1u32;
    let mut last_size = size;
    let mut last_config = original.clone();

    for step in &DEGRADE_LADDER {
        let config = step.apply(original);
        info!(
            size = %last_size,
            budget = %budget,
            fps = ?config.fps,
            width = ?config.width,
            "Output exceeds size target, retrying with reduced settings"
        );

        let size = encode_attempt(&config)?;
        attempts += 1;
        last_size = size;
        last_config = config;

        if size <= budget {
            return Ok(SizeSearchResult {
                output_size: size,
                met_budget: true,
                attempts,
                config: last_config,
            });
        }
    }

    Ok(SizeSearchResult {
        output_size: last_size,
        met_budget: false,
        attempts,
        config: last_config,
    })
}

/// Converts `input` to a GIF at `output`, re-encoding with degraded
/// settings while the result overshoots `budget`. The best-effort GIF
/// stays on disk even when the budget could not be met; callers decide
/// how to report that.
pub fn encode_with_budget(
    input: &Path,
    output: &Path,
    config: &GifConfig,
    budget: FileSize,
    cancel: &CancelToken,
) -> Result<SizeSearchResult> {
    run_search(config, budget, |attempt| {
        encode(input, output, attempt, cancel)
    })
}

// ═══════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn palette_path_is_hidden_sibling_of_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clip.gif");

        let palette = create_palette_path(&output).unwrap();

        assert_eq!(palette.parent(), Some(dir.path()));
        let name = palette.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".clip.palette-"), "got {}", name);
        assert!(name.ends_with(".png"), "got {}", name);
        assert!(palette.exists());
    }

    #[test]
    fn palette_paths_are_unique_per_call() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clip.gif");

        let first = create_palette_path(&output).unwrap();
        let second = create_palette_path(&output).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn palette_guard_removes_file_on_drop() {
        let dir = TempDir::new().unwrap();
        let palette = dir.path().join(".clip.palette-test.png");
        fs::write(&palette, b"palette").unwrap();

        {
            let _guard = PaletteGuard { path: &palette };
        }

        assert!(!palette.exists());
    }

    #[test]
    fn palette_guard_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let palette = dir.path().join("never-created.png");

        let _guard = PaletteGuard { path: &palette };
    }
}
