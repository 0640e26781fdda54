//! Where the data files live and how forgiving the run is.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "files";
pub const PATTERN_FILE: &str = "smartstest.txt";
pub const REFERENCE_FILE: &str = "smartsresults.txt";
pub const MOLECULE_FILE: &str = "attype.00.smi";

/// How tolerated data errors are treated.
///
/// Lenient runs drop patterns that fail to compile and read non-numeric
/// reference tokens as 0, noting both on the loaders' diagnostic lists.
/// Strict runs stop at the first such line instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leniency {
    #[default]
    Lenient,
    Strict,
}

impl Leniency {
    pub fn is_strict(self) -> bool {
        self == Leniency::Strict
    }
}

impl From<bool> for Leniency {
    fn from(strict: bool) -> Self {
        if strict {
            Leniency::Strict
        } else {
            Leniency::Lenient
        }
    }
}

/// The three files a run reads (or, when generating, writes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub patterns: PathBuf,
    pub reference: PathBuf,
    pub molecules: PathBuf,
}

impl DataFiles {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            patterns: dir.join(PATTERN_FILE),
            reference: dir.join(REFERENCE_FILE),
            molecules: dir.join(MOLECULE_FILE),
        }
    }

    /// Replaces whichever paths are given; the rest stay as they are.
    pub fn with_overrides(
        mut self,
        patterns: Option<PathBuf>,
        reference: Option<PathBuf>,
        molecules: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = patterns {
            self.patterns = p;
        }
        if let Some(p) = reference {
            self.reference = p;
        }
        if let Some(p) = molecules {
            self.molecules = p;
        }
        self
    }
}

impl Default for DataFiles {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub files: DataFiles,
    pub leniency: Leniency,
}
