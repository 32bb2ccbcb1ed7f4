//! Defines the [`Post`] type and the logic for loading posts from the posts
//! directory into memory. See [`load_posts`] for which files count as posts
//! and how they are ordered.

use crate::markdown;
use chrono::{DateTime, Local, TimeZone, Utc};
use regex::Regex;
use std::fmt;
use std::fs::{self, read_dir, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Post files are one or more ASCII word characters followed by `.md`.
static POST_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+\.md$").unwrap());

/// Returns whether `file_name` names a post source file. Anything else in the
/// posts directory is ignored.
pub fn is_post_file_name(file_name: &str) -> bool {
    POST_FILE_NAME.is_match(file_name)
}

/// A single blog entry, built fresh on every rebuild.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The source file name (e.g., `hello.md`). Unique within a rebuild and
    /// used as the post's URL path.
    pub filename: String,

    /// The Markdown source with the permalink footer appended.
    pub raw_content: String,

    /// The HTML rendered from `raw_content`.
    pub rendered_content: String,

    /// The file's change time.
    pub mod_time: DateTime<Utc>,
}

impl Post {
    /// Builds a post from its file name, source text and change time. The
    /// permalink footer is appended to the source before rendering.
    pub fn new(filename: &str, source: &str, mod_time: DateTime<Utc>) -> Post {
        let raw_content = format!("{}{}", source, footer(filename, &mod_time));
        Post {
            filename: filename.to_owned(),
            rendered_content: markdown::to_html(&raw_content),
            raw_content,
            mod_time,
        }
    }

    /// Returns the post with its rendered content replaced by `html`.
    pub fn with_rendered_content(self, html: String) -> Post {
        Post {
            rendered_content: html,
            ..self
        }
    }
}

/// The trailing line of every post: a link to the post itself and a
/// human-readable timestamp.
fn footer(filename: &str, mod_time: &DateTime<Utc>) -> String {
    format!(
        "\n\n<a href=\"/{0}\">{0}</a> - {1}",
        filename,
        mod_time
            .with_timezone(&Local)
            .format("%a %b %d %Y %H:%M:%S GMT%z")
    )
}

/// Enumerates `dir`, loads every post file, and returns the posts sorted by
/// change time, newest first. Posts with the same change time are ordered by
/// file name so that rebuilding the same directory always yields the same
/// order. Entries that aren't post files (see [`is_post_file_name`]),
/// including directories, are skipped.
pub fn load_posts(dir: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    for result in read_dir(dir).map_err(|err| Error::ReadDirectory {
        path: dir.to_owned(),
        err,
    })? {
        let entry = result?;
        let os_file_name = entry.file_name();
        let file_name = match os_file_name.to_str() {
            Some(name) if is_post_file_name(name) => name,
            _ => continue,
        };

        let path = entry.path();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            continue;
        }
        posts.push(load_post(file_name, &path, &metadata)?);
    }

    posts.sort_by(|a, b| {
        b.mod_time
            .cmp(&a.mod_time)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    Ok(posts)
}

fn load_post(file_name: &str, path: &Path, metadata: &Metadata) -> Result<Post> {
    let annotate = |err: io::Error| Error::ReadPost {
        path: path.to_owned(),
        err,
    };
    let bytes = fs::read(path).map_err(annotate)?;
    let source = String::from_utf8_lossy(&bytes);
    let mod_time = change_time(metadata).map_err(annotate)?;
    Ok(Post::new(file_name, &source, mod_time))
}

/// The time the file's status last changed, as reported by the file system.
#[cfg(unix)]
fn change_time(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;
    Utc.timestamp_opt(metadata.ctime(), metadata.ctime_nsec() as u32)
        .single()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "change time out of range"))
}

/// Platforms without a change time fall back to the modification time.
#[cfg(not(unix))]
fn change_time(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    Ok(metadata.modified()?.into())
}

/// Represents the result of loading [`Post`]s.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading [`Post`]s.
#[derive(Debug)]
pub enum Error {
    /// Returned when the posts directory can't be listed.
    ReadDirectory { path: PathBuf, err: io::Error },

    /// Returned when a post file can't be read. Invalid UTF-8 isn't an error;
    /// the offending bytes are replaced with U+FFFD.
    ReadPost { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadDirectory { path, err } => {
                write!(f, "Reading posts directory '{}': {}", path.display(), err)
            }
            Error::ReadPost { path, err } => {
                write!(f, "Reading post '{}': {}", path.display(), err)
            }
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadDirectory { path: _, err } => Some(err),
            Error::ReadPost { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator for fallible I/O functions.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
