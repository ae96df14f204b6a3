//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::Path;

use glob::Pattern;
use walkdir::WalkDir;

/// Name-based filter applied while copying a tree.
///
/// Patterns are matched against a single path component (the file or
/// directory name), never against the full path. An excluded directory is
/// not descended into. When include patterns are present, only files whose
/// name matches one of them are copied; directories are always traversed.
#[derive(Debug, Clone, Default)]
pub struct CopyFilter {
    excludes: Vec<Pattern>,
    includes: Vec<Pattern>,
}

impl CopyFilter {
    /// Create a filter that copies everything.
    pub fn all() -> Self {
        CopyFilter::default()
    }

    /// Create a filter excluding the given names or glob patterns.
    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CopyFilter {
            excludes: compile(names),
            includes: Vec::new(),
        }
    }

    /// Restrict copied files to the given names or glob patterns.
    pub fn including<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.includes = compile(names);
        self
    }

    /// Whether an entry with this name is excluded outright.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(name))
    }

    /// Whether a file with this name should be copied.
    pub fn allows_file(&self, name: &str) -> bool {
        if self.is_excluded(name) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|p| p.matches(name))
    }
}

fn compile<I, S>(names: I) -> Vec<Pattern>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            match Pattern::new(name).or_else(|_| Pattern::new(&Pattern::escape(name))) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("ignoring invalid copy pattern {:?}: {}", name, e);
                    None
                }
            }
        })
        .collect()
}

/// Recursively copy `src` into `dst`, honoring `filter`.
///
/// `dst` is created if missing; existing files are overwritten.
pub fn copy_tree(src: &Path, dst: &Path, filter: &CopyFilter) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !filter.is_excluded(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if filter.allows_file(&entry.file_name().to_string_lossy()) {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Move `src` to `dst`, falling back to copy-and-delete across devices.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    if src.is_dir() {
        copy_tree(src, dst, &CopyFilter::all())?;
        fs::remove_dir_all(src)
    } else {
        fs::copy(src, dst)?;
        fs::remove_file(src)
    }
}

/// Remove a file or directory tree, if it exists.
pub fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Whether `path` is a file the current user may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
