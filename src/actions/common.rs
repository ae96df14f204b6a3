//! Filesystem actions shared by several workflows.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Action, ActionError, Purpose, DEFAULT_EXCLUDES};
use crate::util::fs::CopyFilter;
use crate::util::os::OsUtils;

/// Copies a source tree, skipping excluded names.
#[derive(Debug)]
pub struct CopySourceAction {
    source_dir: PathBuf,
    dest_dir: PathBuf,
    filter: CopyFilter,
    os: Arc<dyn OsUtils>,
}

impl CopySourceAction {
    /// Copy `source_dir` into `dest_dir`, skipping [`DEFAULT_EXCLUDES`].
    pub fn new(source_dir: &Path, dest_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        CopySourceAction {
            source_dir: source_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            filter: CopyFilter::excluding(DEFAULT_EXCLUDES),
            os,
        }
    }

    /// Replace the copy filter.
    pub fn with_filter(mut self, filter: CopyFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Action for CopySourceAction {
    fn name(&self) -> &str {
        "CopySource"
    }

    fn description(&self) -> &str {
        "Copying source code while skipping certain commonly excluded files"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopySource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.os
            .copytree(&self.source_dir, &self.dest_dir, &self.filter)?;
        Ok(())
    }
}

/// Empties a directory, keeping the directory itself.
#[derive(Debug)]
pub struct CleanUpAction {
    target_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl CleanUpAction {
    /// Create a new clean-up action.
    pub fn new(target_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        CleanUpAction {
            target_dir: target_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for CleanUpAction {
    fn name(&self) -> &str {
        "CleanUp"
    }

    fn description(&self) -> &str {
        "Cleaning up the target folder"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CleanUp
    }

    fn execute(&self) -> Result<(), ActionError> {
        if !self.os.is_dir(&self.target_dir) {
            tracing::debug!(
                "clean up skipped, {} is not a directory",
                self.target_dir.display()
            );
            return Ok(());
        }
        for entry in self.os.listdir(&self.target_dir)? {
            self.os.rmtree(&entry)?;
        }
        Ok(())
    }
}

/// Names present in `artifacts_dir` that did not come from `source_dir`.
fn dependency_entries(
    os: &dyn OsUtils,
    source_dir: &Path,
    artifacts_dir: &Path,
) -> Result<Vec<PathBuf>, ActionError> {
    let source: BTreeSet<_> = os
        .listdir(source_dir)?
        .into_iter()
        .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
        .collect();

    Ok(os
        .listdir(artifacts_dir)?
        .into_iter()
        .filter(|p| p.file_name().map(|n| !source.contains(n)).unwrap_or(false))
        .collect())
}

/// Copies dependencies out of the artifacts directory.
#[derive(Debug)]
pub struct CopyDependenciesAction {
    source_dir: PathBuf,
    artifacts_dir: PathBuf,
    dest_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl CopyDependenciesAction {
    /// Copy every entry of `artifacts_dir` not in `source_dir` into `dest_dir`.
    pub fn new(
        source_dir: &Path,
        artifacts_dir: &Path,
        dest_dir: &Path,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        CopyDependenciesAction {
            source_dir: source_dir.to_path_buf(),
            artifacts_dir: artifacts_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for CopyDependenciesAction {
    fn name(&self) -> &str {
        "CopyDependencies"
    }

    fn description(&self) -> &str {
        "Copying dependencies while skipping source file"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopyDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        let entries = dependency_entries(self.os.as_ref(), &self.source_dir, &self.artifacts_dir)?;
        self.os.makedirs(&self.dest_dir)?;
        for entry in entries {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let target = self.dest_dir.join(name);
            if self.os.is_dir(&entry) {
                self.os.copytree(&entry, &target, &CopyFilter::all())?;
            } else {
                self.os.copy_file(&entry, &target)?;
            }
        }
        Ok(())
    }
}

/// Moves dependencies out of the artifacts directory.
#[derive(Debug)]
pub struct MoveDependenciesAction {
    source_dir: PathBuf,
    artifacts_dir: PathBuf,
    dest_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl MoveDependenciesAction {
    /// Move every entry of `artifacts_dir` not in `source_dir` into `dest_dir`.
    pub fn new(
        source_dir: &Path,
        artifacts_dir: &Path,
        dest_dir: &Path,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        MoveDependenciesAction {
            source_dir: source_dir.to_path_buf(),
            artifacts_dir: artifacts_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for MoveDependenciesAction {
    fn name(&self) -> &str {
        "MoveDependencies"
    }

    fn description(&self) -> &str {
        "Moving dependencies while skipping source file"
    }

    fn purpose(&self) -> Purpose {
        Purpose::MoveDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        let entries = dependency_entries(self.os.as_ref(), &self.source_dir, &self.artifacts_dir)?;
        self.os.makedirs(&self.dest_dir)?;
        for entry in entries {
            let Some(name) = entry.file_name() else {
                continue;
            };
            self.os.move_path(&entry, &self.dest_dir.join(name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryOs;

    #[test]
    fn test_copy_source_skips_excludes() {
        let os = Arc::new(
            MemoryOs::new()
                .with_file("/src/handler.rb", "def handler; end")
                .with_file("/src/.git/config", "[core]")
                .with_file("/src/.aws-sam/build.toml", "x"),
        );

        let action = CopySourceAction::new(Path::new("/src"), Path::new("/scratch"), os.clone());
        action.execute().unwrap();

        assert_eq!(action.purpose(), Purpose::CopySource);
        assert!(os.file("/scratch/handler.rb").is_some());
        assert!(os.file("/scratch/.git/config").is_none());
        assert!(os.file("/scratch/.aws-sam/build.toml").is_none());
    }

    #[test]
    fn test_copy_source_missing_dir_is_io_error() {
        let os = Arc::new(MemoryOs::new());
        let action = CopySourceAction::new(Path::new("/nope"), Path::new("/scratch"), os);

        assert!(matches!(action.execute(), Err(ActionError::Io(_))));
    }

    #[test]
    fn test_clean_up_keeps_directory() {
        let os = Arc::new(
            MemoryOs::new()
                .with_file("/deps/a.jar", "a")
                .with_file("/deps/nested/b.jar", "b"),
        );

        CleanUpAction::new(Path::new("/deps"), os.clone())
            .execute()
            .unwrap();

        assert!(os.is_dir(Path::new("/deps")));
        assert!(os.listdir(Path::new("/deps")).unwrap().is_empty());
    }

    #[test]
    fn test_clean_up_missing_dir_is_noop() {
        let os = Arc::new(MemoryOs::new());
        assert!(CleanUpAction::new(Path::new("/deps"), os).execute().is_ok());
    }

    #[test]
    fn test_copy_dependencies_skips_source_entries() {
        let os = Arc::new(
            MemoryOs::new()
                .with_file("/src/Handler.java", "class Handler {}")
                .with_file("/artifacts/Handler.java", "class Handler {}")
                .with_file("/artifacts/lib/dep.jar", "jar"),
        );

        CopyDependenciesAction::new(
            Path::new("/src"),
            Path::new("/artifacts"),
            Path::new("/deps"),
            os.clone(),
        )
        .execute()
        .unwrap();

        assert_eq!(os.file("/deps/lib/dep.jar").as_deref(), Some("jar"));
        assert!(os.file("/deps/Handler.java").is_none());
        assert!(os.file("/artifacts/lib/dep.jar").is_some());
    }

    #[test]
    fn test_move_dependencies_removes_from_artifacts() {
        let os = Arc::new(
            MemoryOs::new()
                .with_file("/src/app.rb", "")
                .with_file("/artifacts/app.rb", "")
                .with_file("/artifacts/vendor/gem.rb", "gem"),
        );

        MoveDependenciesAction::new(
            Path::new("/src"),
            Path::new("/artifacts"),
            Path::new("/deps"),
            os.clone(),
        )
        .execute()
        .unwrap();

        assert_eq!(os.file("/deps/vendor/gem.rb").as_deref(), Some("gem"));
        assert!(os.file("/artifacts/vendor/gem.rb").is_none());
        assert!(os.file("/artifacts/app.rb").is_some());
    }
}
