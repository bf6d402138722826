//! Input validation and output path resolution.

use std::fs;
use std::path::{Path, PathBuf};

use shared_utils::batch::is_video_file;
use shared_utils::errors::{Result, Vid2GifError};

/// Checks that `input` exists and carries a recognized video extension.
pub fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(Vid2GifError::UnsupportedInput(format!(
            "{} does not exist",
            input.display()
        )));
    }
    if !is_video_file(input) {
        return Err(Vid2GifError::UnsupportedInput(format!(
            "{} is not a recognized video format",
            input.display()
        )));
    }
    Ok(())
}

/// Decides where the GIF for `input` goes, creating directories as
/// needed.
///
/// With no explicit output the GIF lands next to the input. An output
/// that is an existing directory, ends with a path separator, or is
/// extension-less in batch mode, receives one GIF per input named
/// after the input's stem. A file-like output is honored as-is for a
/// single conversion; in batch mode it is treated as a directory,
/// since several inputs cannot share one file name.
pub fn resolve_output_path(
    input: &Path,
    output: Option<&Path>,
    batch: bool,
) -> Result<PathBuf> {
    let Some(output) = output else {
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        return Ok(parent.join(gif_file_name(input)));
    };

    if output.is_dir() || ends_with_separator(output) || (batch && output.extension().is_none()) {
        fs::create_dir_all(output)?;
        return Ok(output.join(gif_file_name(input)));
    }

    if !batch {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        return Ok(output.to_path_buf());
    }

    fs::create_dir_all(output)?;
    Ok(output.join(gif_file_name(input)))
}

fn gif_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{}.gif", stem)
}

// `Path` drops trailing separators during parsing, so look at the raw
// string form.
fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .chars()
        .last()
        .map_or(false, std::path::is_separator)
}
