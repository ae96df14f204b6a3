//! Injected access to the host operating system.
//!
//! Everything in the build pipeline that touches the filesystem, spawns a
//! process or consults `PATH` goes through [`OsUtils`]. [`SystemOs`] is the
//! real implementation; tests substitute an in-memory fake.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::util::fs::{self as fsutil, CopyFilter};
use crate::util::process::{ProcessBuilder, ProcessOutput};

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Unix,
    Windows,
}

impl OsFamily {
    /// The family this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Unix => write!(f, "unix"),
            OsFamily::Windows => write!(f, "windows"),
        }
    }
}

/// Filesystem, process and environment primitives used by the build pipeline.
pub trait OsUtils: Send + Sync + fmt::Debug {
    /// Run a process to completion, capturing both output streams.
    fn run(&self, cmd: &ProcessBuilder) -> io::Result<ProcessOutput>;

    /// Host OS family.
    fn os_family(&self) -> OsFamily;

    fn is_windows(&self) -> bool {
        self.os_family() == OsFamily::Windows
    }

    /// Snapshot of the process environment.
    fn environ(&self) -> HashMap<String, String>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_executable(&self, path: &Path) -> bool;

    /// Create a directory and all missing parents.
    fn makedirs(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a directory tree. Missing paths are not an error.
    fn rmtree(&self, path: &Path) -> io::Result<()>;

    /// Full paths of the direct children of a directory.
    fn listdir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;

    fn copytree(&self, src: &Path, dst: &Path, filter: &CopyFilter) -> io::Result<()>;

    fn move_path(&self, src: &Path, dst: &Path) -> io::Result<()>;

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read a file and parse it as JSON.
    fn read_json(&self, path: &Path) -> io::Result<serde_json::Value> {
        let contents = self.read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Every match for `name`, in search order.
    ///
    /// With `search_paths` set only those directories are searched;
    /// otherwise the process `PATH` is.
    fn which(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Vec<PathBuf>;
}

/// [`OsUtils`] backed by the real host.
#[derive(Debug, Clone, Default)]
pub struct SystemOs;

impl SystemOs {
    /// Create a new system OS handle.
    pub fn new() -> Self {
        SystemOs
    }
}

impl OsUtils for SystemOs {
    fn run(&self, cmd: &ProcessBuilder) -> io::Result<ProcessOutput> {
        tracing::debug!("executing: {}", cmd.display_command());
        cmd.exec()
    }

    fn os_family(&self) -> OsFamily {
        OsFamily::host()
    }

    fn environ(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_executable(&self, path: &Path) -> bool {
        fsutil::is_executable(path)
    }

    fn makedirs(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rmtree(&self, path: &Path) -> io::Result<()> {
        fsutil::remove_path(path)
    }

    fn listdir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)?
            .map(|e| e.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst).map(|_| ())
    }

    fn copytree(&self, src: &Path, dst: &Path, filter: &CopyFilter) -> io::Result<()> {
        fsutil::copy_tree(src, dst, filter)
    }

    fn move_path(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fsutil::move_path(src, dst)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn which(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Vec<PathBuf> {
        let found = match search_paths {
            Some([]) => return Vec::new(),
            Some(paths) => {
                let joined = match std::env::join_paths(paths) {
                    Ok(joined) => joined,
                    Err(e) => {
                        tracing::warn!("ignoring unusable search paths: {}", e);
                        return Vec::new();
                    }
                };
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in_all(name, Some(joined), cwd).map(|it| it.collect::<Vec<_>>())
            }
            None => which::which_all(name).map(|it| it.collect::<Vec<_>>()),
        };

        let mut found = found.unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        found.retain(|p| seen.insert(p.clone()));
        found
    }
}
