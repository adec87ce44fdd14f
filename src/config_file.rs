//! Locating and loading the `lus.kdl` task file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use log::{debug, info};
use thiserror::Error;

use crate::help::{compute_aliases, extract_top_level_comments};
use crate::node::{ConfigNode, normalize_document};

/// Name of the task file searched for
pub const FILENAME: &str = "lus.kdl";

/// How many directories are searched, starting with the current one
pub const MAX_DEPTH: usize = 50;

/// Errors that can occur while loading the task file
#[derive(Error, Debug)]
pub enum LusFileError {
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
    #[error("Unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: kdl::KdlError,
    },
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(#[source] std::io::Error),
}

/// A parsed task file together with its help metadata
#[derive(Debug, Clone, Default)]
pub struct LusFile {
    pub path: PathBuf,
    pub nodes: Vec<ConfigNode>,
    /// Top-level `//` comments keyed by the node they precede.
    pub comments: HashMap<String, String>,
    /// Top-level subcommands that only delegate to another one.
    pub aliases: HashMap<String, String>,
}

impl LusFile {
    /// Parse task file contents.
    ///
    /// # Errors
    ///
    /// Returns `LusFileError::Parse` if the contents are not valid KDL.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<LusFile, LusFileError> {
        let path = path.into();
        let document = KdlDocument::parse(content).map_err(|e| LusFileError::Parse {
            path: path.clone(),
            source: e,
        })?;
        let nodes = normalize_document(&document);
        let aliases = compute_aliases(&nodes);
        Ok(LusFile {
            path,
            comments: extract_top_level_comments(content),
            aliases,
            nodes,
        })
    }

    /// Read and parse a task file.
    ///
    /// # Errors
    ///
    /// Returns `LusFileError::NotFound`/`LusFileError::Read` if the file cannot be
    /// read, or `LusFileError::Parse` if parsing fails.
    pub fn from_file(file: &Path) -> Result<LusFile, LusFileError> {
        let content = std::fs::read_to_string(file).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LusFileError::NotFound(file.to_path_buf())
            } else {
                LusFileError::Read {
                    path: file.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(file, &content)
    }

    /// Directory the task file lives in; statements run relative to it.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

#[cfg(unix)]
fn device_of(path: &Path) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|m| m.dev())
}

#[cfg(not(unix))]
fn device_of(_path: &Path) -> Option<u64> {
    Some(0)
}

/// Search `start` and its parents for the task file.
///
/// The search gives up after [`MAX_DEPTH`] directories, at the filesystem root,
/// or when the parent directory lives on another device.
///
/// # Errors
///
/// Returns `LusFileError::NotFound` if no task file is found.
pub fn find_lusfile(start: &Path) -> Result<PathBuf, LusFileError> {
    debug!("Searching for {FILENAME} in {}", start.display());
    let start_device = device_of(start);
    let mut dir = start.to_path_buf();
    for _ in 0..MAX_DEPTH {
        let candidate = dir.join(FILENAME);
        if candidate.is_file() {
            info!("Found task file: {}", candidate.display());
            return Ok(candidate);
        }
        let Some(parent) = dir.parent().map(Path::to_path_buf) else {
            break;
        };
        if device_of(&parent) != start_device {
            debug!("Not crossing filesystem boundary at {}", parent.display());
            break;
        }
        dir = parent;
    }
    Err(LusFileError::NotFound(PathBuf::from(FILENAME)))
}

/// Load the task file from an explicit path, or search for it from the
/// current directory.
///
/// # Errors
///
/// Returns `LusFileError` if the file is missing or cannot be parsed.
pub fn load_lusfile(explicit: Option<&Path>) -> Result<LusFile, LusFileError> {
    let path = match explicit {
        Some(file) => {
            if !file.exists() {
                return Err(LusFileError::NotFound(file.to_path_buf()));
            }
            std::path::absolute(file).map_err(LusFileError::UnknownWorkingDirectory)?
        }
        None => {
            let cwd = std::env::current_dir().map_err(LusFileError::UnknownWorkingDirectory)?;
            find_lusfile(&cwd)?
        }
    };
    LusFile::from_file(&path)
}
