//! Thumbnail resolution boundary.
//!
//! Resolution is the only I/O this crate performs: given the path of a
//! media file's thumbnail, produce a [`Thumbnail`] the UI can display,
//! or fail. The loader treats the resolver as an injected collaborator
//! so tests and alternative backends (pre-rendered files, extraction
//! from video containers, remote artwork) can swap it out.

use std::fs;
use std::path::{Path, PathBuf};

/// A resolved thumbnail ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Path the resolution started from.
    pub source: PathBuf,
    /// Path of the image handed to the UI.
    pub image_path: PathBuf,
}

/// Errors that can occur while resolving a thumbnail.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Thumbnail not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Thumbnail file is empty: {path}")]
    Empty { path: PathBuf },

    #[error("Failed to read thumbnail: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for resolver operations.
pub type ResolveResult = Result<Thumbnail, ResolveError>;

/// Trait for thumbnail resolution backends.
///
/// Implementors must be thread-safe; the loader calls them from its
/// worker thread. Failures are reported as values and never escape the
/// worker loop.
pub trait ThumbnailResolver: Send + Sync {
    /// Resolve the thumbnail at `path`.
    fn resolve(&self, path: &Path) -> ResolveResult;
}

/// Filesystem resolver: accepts any existing, non-empty file.
///
/// Decoding and format validation happen in the UI's imaging layer,
/// not here.
#[derive(Debug, Default)]
pub struct FsResolver;

impl ThumbnailResolver for FsResolver {
    fn resolve(&self, path: &Path) -> ResolveResult {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolveError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() == 0 {
            return Err(ResolveError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Thumbnail {
            source: path.to_path_buf(),
            image_path: path.to_path_buf(),
        })
    }
}
