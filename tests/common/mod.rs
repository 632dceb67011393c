#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use auditkit::{AuditKitError, Checker, CheckerCore, Result};

/// Creates a temporary directory with audit fixtures for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Creates a new test fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Creates a directory in the temp directory.
    pub fn create_dir(&self, relative_path: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Configuration for [`LineLengthChecker`].
pub struct LineLengthConfig {
    pub files: Vec<PathBuf>,
    pub max_line_length: usize,
}

/// Defect reported when a file contains an overlong line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongLineDefect {
    pub file: PathBuf,
    pub line: usize,
    pub length: usize,
}

/// Checks text files for lines longer than the configured maximum.
///
/// Subjects are file paths listed in the configuration; paths that do not
/// exist on disk are invalid subjects. An unreadable subject (e.g. a
/// directory) fails its check and exercises the per-subject isolation path.
pub struct LineLengthChecker {
    core: CheckerCore<LineLengthConfig>,
}

impl LineLengthChecker {
    pub fn new() -> Self {
        Self {
            core: CheckerCore::new("LineLengthChecker"),
        }
    }
}

impl Checker for LineLengthChecker {
    type Subject = PathBuf;
    type Defect = LongLineDefect;
    type Config = LineLengthConfig;
    type Subjects = std::vec::IntoIter<PathBuf>;

    fn core(&self) -> &CheckerCore<LineLengthConfig> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CheckerCore<LineLengthConfig> {
        &mut self.core
    }

    fn subjects(&self) -> Result<Self::Subjects> {
        let config = self.core.config().ok_or_else(|| {
            AuditKitError::Config("line length checker is not configured".to_string())
        })?;
        Ok(config.files.clone().into_iter())
    }

    fn is_valid_subject(&self, subject: &PathBuf) -> bool {
        subject.exists()
    }

    fn set_up(&self) -> Result<()> {
        Ok(())
    }

    fn tear_down(&self) -> Result<()> {
        Ok(())
    }

    fn check_subject(&self, subject: &PathBuf) -> Result<Option<LongLineDefect>> {
        let config = self.core.config().ok_or_else(|| {
            AuditKitError::Config("line length checker is not configured".to_string())
        })?;
        let content = fs::read_to_string(subject)?;
        for (index, line) in content.lines().enumerate() {
            if line.len() > config.max_line_length {
                return Ok(Some(LongLineDefect {
                    file: subject.clone(),
                    line: index + 1,
                    length: line.len(),
                }));
            }
        }
        Ok(None)
    }
}
