//! Deriving registry URIs from filesystem paths.
//!
//! The player resolves a card's URI against its own music directory, so the
//! registry stores paths relative to that directory and without trailing
//! slashes (the player does not match `Audiobooks/Jungle Book/`).

use crate::{Result, error::Error};
use std::path::Path;

/// Strip the music directory prefix and trailing slashes from `path`.
///
/// Paths outside the music directory are kept as given (minus trailing
/// slashes), matching how the player treats absolute URIs.
///
/// # Errors
/// Returns `Error::EmptyUri` if nothing is left after stripping.
///
/// # Examples
///
/// ```
/// use kiddyblaster_core::uri::uri_from_path;
///
/// let uri = uri_from_path("/home/pi/Music", "/home/pi/Music/Audiobooks/Wolf/").unwrap();
/// assert_eq!(uri, "Audiobooks/Wolf");
///
/// let uri = uri_from_path("/home/pi/Music", "/srv/stories/wolf.mp3").unwrap();
/// assert_eq!(uri, "/srv/stories/wolf.mp3");
/// ```
pub fn uri_from_path(music_dir: &str, path: &str) -> Result<String> {
    let prefix = music_dir.trim_end_matches('/');
    let relative = path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path);

    let uri = relative.trim_end_matches('/');
    if uri.is_empty() {
        return Err(Error::EmptyUri(path.to_string()));
    }
    Ok(uri.to_string())
}

/// Check that `path` exists and is a directory.
///
/// # Errors
/// Returns `Error::NotADirectory` otherwise.
pub fn ensure_directory(path: &str) -> Result<()> {
    if Path::new(path).is_dir() {
        Ok(())
    } else {
        Err(Error::NotADirectory(path.to_string()))
    }
}
