//! Test utilities and mocks for unit tests.
//!
//! [`MemoryOs`] is an in-memory [`OsUtils`] built from a [`MockFileSystem`]
//! and a [`MockExecutor`]. It also keeps a fake `PATH`, so resolution,
//! validation and whole workflows can run without touching the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use lambda_builders::test_support::{MemoryOs, MockProcessOutput};
//!
//! let os = MemoryOs::new()
//!     .with_executable("/usr/bin/mvn")
//!     .with_path_dir("/usr/bin")
//!     .expect_prefix("/usr/bin/mvn -version", MockProcessOutput::success("Java version: 11.0.2"));
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::util::fs::CopyFilter;
use crate::util::os::{OsFamily, OsUtils};
use crate::util::process::{ProcessBuilder, ProcessOutput};

pub use fixtures::*;

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("not found: {}", path.display()),
    )
}

/// Mock filesystem for testing without real I/O.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    /// Add a file with the given content, creating parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path, content.into());
    }

    /// Add an executable file.
    pub fn add_executable(&mut self, path: impl AsRef<Path>) {
        self.add_file(path.as_ref(), b"#!/bin/sh\n".to_vec());
        self.executables.insert(path.as_ref().to_path_buf());
    }

    /// Add a directory and all of its parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let mut current = Some(path.as_ref());
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }

    /// Read a file's contents.
    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    /// Check if a file or directory exists.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }

    /// Check if a path is a file.
    pub fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Check if a path is a directory.
    pub fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    /// Check if a path is an executable file.
    pub fn is_executable(&self, path: &Path) -> bool {
        self.executables.contains(path)
    }

    /// Remove a file or a directory and all its contents.
    pub fn remove_all(&mut self, path: &Path) {
        self.files.retain(|p, _| !p.starts_with(path));
        self.dirs.retain(|d| !d.starts_with(path));
        self.executables.retain(|e| !e.starts_with(path));
    }

    /// Direct children of a directory, files and directories alike.
    pub fn children(&self, path: &Path) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Copy `src` into `dst`, honoring `filter`.
    pub fn copy_tree(&mut self, src: &Path, dst: &Path, filter: &CopyFilter) -> io::Result<()> {
        if !self.is_dir(src) {
            return Err(not_found(src));
        }
        self.add_dir(dst);

        let excluded = |rel: &Path| {
            rel.components()
                .any(|c| filter.is_excluded(&c.as_os_str().to_string_lossy()))
        };

        let dirs: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter_map(|d| d.strip_prefix(src).ok())
            .filter(|rel| !rel.as_os_str().is_empty() && !excluded(rel))
            .map(Path::to_path_buf)
            .collect();
        for rel in dirs {
            self.add_dir(dst.join(rel));
        }

        let files: Vec<(PathBuf, Vec<u8>, bool)> = self
            .files
            .iter()
            .filter_map(|(p, content)| {
                let rel = p.strip_prefix(src).ok()?;
                let name = rel.file_name()?.to_string_lossy().into_owned();
                let parent_excluded = rel.parent().map(|r| excluded(r)).unwrap_or(false);
                if parent_excluded || !filter.allows_file(&name) {
                    return None;
                }
                Some((rel.to_path_buf(), content.clone(), self.executables.contains(p)))
            })
            .collect();
        for (rel, content, executable) in files {
            let target = dst.join(&rel);
            self.add_file(&target, content);
            if executable {
                self.executables.insert(target);
            }
        }
        Ok(())
    }

    /// Get all files (for debugging).
    pub fn all_files(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.files
    }
}

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(out: MockProcessOutput) -> Self {
        ProcessOutput {
            code: Some(out.status),
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Mock process executor for testing command execution.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation.
    pub fn expect(&mut self, expectation: CommandExpectation) {
        self.expectations.push(expectation);
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) {
        self.default_output = Some(output);
    }

    /// Execute a command and return the mock output.
    pub fn run(&mut self, cmd: &ProcessBuilder) -> io::Result<MockProcessOutput> {
        let full_cmd = cmd.display_command();
        self.calls.push(cmd.clone());

        for exp in &mut self.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                return Ok(exp.output.clone());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone());
        }

        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("unexpected command: {}", full_cmd),
        ))
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> &[ProcessBuilder] {
        &self.calls
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<(), String> {
        for (i, exp) in self.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    return Err(format!(
                        "expectation {} was used {} times, expected {}",
                        i, exp.used, expected
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    fs: MockFileSystem,
    exec: MockExecutor,
    path_dirs: Vec<PathBuf>,
}

/// In-memory [`OsUtils`] for hermetic tests.
#[derive(Debug)]
pub struct MemoryOs {
    family: OsFamily,
    env: HashMap<String, String>,
    state: Mutex<MemoryState>,
}

impl Default for MemoryOs {
    fn default() -> Self {
        MemoryOs::new()
    }
}

impl MemoryOs {
    /// Create an empty Unix-flavored OS.
    pub fn new() -> Self {
        MemoryOs {
            family: OsFamily::Unix,
            env: HashMap::new(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Create an empty Windows-flavored OS.
    pub fn windows() -> Self {
        MemoryOs {
            family: OsFamily::Windows,
            ..MemoryOs::new()
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Add a file.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.state().fs.add_file(path, content);
        self
    }

    /// Add a directory.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.state().fs.add_dir(path);
        self
    }

    /// Add an executable file.
    pub fn with_executable(self, path: impl AsRef<Path>) -> Self {
        self.state().fs.add_executable(path);
        self
    }

    /// Append a directory to the fake system `PATH`.
    pub fn with_path_dir(self, dir: impl AsRef<Path>) -> Self {
        self.state().path_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Script the output of commands starting with `prefix`.
    pub fn expect_prefix(self, prefix: &str, output: MockProcessOutput) -> Self {
        self.state().exec.expect(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ));
        self
    }

    /// Script the output of commands containing `substring`.
    pub fn expect_contains(self, substring: &str, output: MockProcessOutput) -> Self {
        self.state().exec.expect(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect_pattern(self, expectation: CommandExpectation) -> Self {
        self.state().exec.expect(expectation);
        self
    }

    /// Output for commands no expectation matches.
    pub fn with_default_output(self, output: MockProcessOutput) -> Self {
        self.state().exec.set_default(output);
        self
    }

    /// Contents of a file, if present and UTF-8.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state()
            .fs
            .read(path.as_ref())
            .ok()
            .and_then(|b| String::from_utf8(b).ok())
    }

    /// Every file currently stored.
    pub fn files(&self) -> Vec<PathBuf> {
        self.state().fs.all_files().keys().cloned().collect()
    }

    /// Every command run so far, rendered with [`ProcessBuilder::display_command`].
    pub fn calls(&self) -> Vec<String> {
        self.state()
            .exec
            .calls()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Every command run so far.
    pub fn commands(&self) -> Vec<ProcessBuilder> {
        self.state().exec.calls().to_vec()
    }

    /// Verify counted expectations.
    pub fn verify(&self) -> Result<(), String> {
        self.state().exec.verify()
    }
}

impl OsUtils for MemoryOs {
    fn run(&self, cmd: &ProcessBuilder) -> io::Result<ProcessOutput> {
        self.state().exec.run(cmd).map(Into::into)
    }

    fn os_family(&self) -> OsFamily {
        self.family
    }

    fn environ(&self) -> HashMap<String, String> {
        self.env.clone()
    }

    fn exists(&self, path: &Path) -> bool {
        self.state().fs.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state().fs.is_dir(path)
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.state().fs.is_executable(path)
    }

    fn makedirs(&self, path: &Path) -> io::Result<()> {
        self.state().fs.add_dir(path);
        Ok(())
    }

    fn rmtree(&self, path: &Path) -> io::Result<()> {
        self.state().fs.remove_all(path);
        Ok(())
    }

    fn listdir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.state();
        if !state.fs.is_dir(path) {
            return Err(not_found(path));
        }
        Ok(state.fs.children(path))
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let mut state = self.state();
        let content = state.fs.read(src)?;
        state.fs.add_file(dst, content);
        Ok(())
    }

    fn copytree(&self, src: &Path, dst: &Path, filter: &CopyFilter) -> io::Result<()> {
        self.state().fs.copy_tree(src, dst, filter)
    }

    fn move_path(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let mut state = self.state();
        if state.fs.is_dir(src) {
            state.fs.copy_tree(src, dst, &CopyFilter::all())?;
        } else {
            let content = state.fs.read(src)?;
            state.fs.add_file(dst, content);
        }
        state.fs.remove_all(src);
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.state().fs.add_file(path, contents.to_vec());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.state().fs.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn which(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Vec<PathBuf> {
        let state = self.state();
        let dirs = match search_paths {
            Some(paths) => paths.to_vec(),
            None => state.path_dirs.clone(),
        };
        dirs.iter()
            .map(|d| d.join(name))
            .filter(|p| state.fs.is_executable(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_filesystem_dirs() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/project/src/main.rb", "puts 1");

        assert!(fs.is_dir(Path::new("/project/src")));
        assert!(fs.is_dir(Path::new("/project")));
        assert!(fs.is_file(Path::new("/project/src/main.rb")));
        assert_eq!(
            fs.children(Path::new("/project")),
            vec![PathBuf::from("/project/src")]
        );
    }

    #[test]
    fn test_memory_copytree_honors_excludes() {
        let os = MemoryOs::new()
            .with_file("/src/app.py", "print(1)")
            .with_file("/src/.git/HEAD", "ref")
            .with_file("/src/.aws-sam/build/x", "x");

        os.copytree(
            Path::new("/src"),
            Path::new("/dst"),
            &CopyFilter::excluding([".git", ".aws-sam"]),
        )
        .unwrap();

        assert_eq!(os.file("/dst/app.py").as_deref(), Some("print(1)"));
        assert!(!os.exists(Path::new("/dst/.git/HEAD")));
        assert!(!os.exists(Path::new("/dst/.aws-sam")));
    }

    #[test]
    fn test_memory_which_uses_fake_path() {
        let os = MemoryOs::new()
            .with_executable("/usr/bin/go")
            .with_path_dir("/usr/bin");

        assert_eq!(os.which("go", None), vec![PathBuf::from("/usr/bin/go")]);
        assert!(os.which("go", Some(&[PathBuf::from("/opt/bin")])).is_empty());
    }

    #[test]
    fn test_memory_run_records_calls() {
        let os = MemoryOs::new().expect_pattern(
            CommandExpectation::new(
                CommandPattern::Exact("make --version".to_string()),
                MockProcessOutput::success("GNU Make 4.3"),
            )
            .times(1),
        );

        let out = os.run(&ProcessBuilder::new("make").arg("--version")).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "GNU Make 4.3");
        assert_eq!(os.calls(), vec!["make --version"]);
        assert!(os.verify().is_ok());

        assert!(os.run(&ProcessBuilder::new("make").arg("--version")).is_err());
    }
}
