use std::borrow::Cow;
use std::path::Path;

/// Renders a path as a command-line argument for tools that lack a
/// `--` end-of-options delimiter (FFmpeg's option parser is one).
///
/// A relative path starting with `-` would be parsed as a flag, so it
/// gets a `./` prefix. Everything else passes through unchanged.
pub fn safe_path_arg(path: &Path) -> Cow<'_, str> {
    let s = path.to_string_lossy();
    if s.starts_with('-') {
        Cow::Owned(format!("./{}", s))
    } else {
        s
    }
}
