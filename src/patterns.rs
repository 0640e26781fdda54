//! Pattern Set Loader: the ordered SMARTS patterns a run checks.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::config::Leniency;
use crate::error::{Error, Result};
use crate::mol::Mol;
use crate::smarts::{MapList, SmartsError, SmartsPattern};

/// A compiled pattern and the pattern-file line it came from.
#[derive(Debug, Clone)]
pub struct Pattern {
    line: usize,
    smarts: SmartsPattern,
}

impl Pattern {
    /// The SMARTS text as written, used in diagnostics.
    pub fn text(&self) -> &str {
        self.smarts.as_str()
    }

    /// 1-based line number in the pattern file.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn match_all(&self, mol: &Mol<Atom, Bond>) -> MapList {
        self.smarts.match_all(mol)
    }

    pub fn first_atoms(&self, mol: &Mol<Atom, Bond>) -> Vec<usize> {
        self.smarts.first_atoms(mol)
    }
}

/// A pattern-file line that did not compile and was left out of the set.
#[derive(Debug, Clone, PartialEq)]
pub struct Discard {
    pub line: usize,
    pub text: String,
    pub error: SmartsError,
}

#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    discarded: Vec<Discard>,
}

impl PatternSet {
    pub fn load(path: &Path, leniency: Leniency) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::PatternFile {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&text, leniency)?;
        info!(
            "loaded {} patterns from {} ({} discarded)",
            set.len(),
            path.display(),
            set.discarded.len()
        );
        Ok(set)
    }

    /// Compiles every non-comment line. The pattern is the first
    /// whitespace-separated token; anything after it is a description.
    pub fn parse(text: &str, leniency: Leniency) -> Result<Self> {
        let mut set = Self::default();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            if raw.starts_with('#') {
                continue;
            }
            let token = raw.split_whitespace().next().unwrap_or("");
            match SmartsPattern::new(token) {
                Ok(smarts) => set.patterns.push(Pattern { line, smarts }),
                Err(error) => {
                    if leniency.is_strict() {
                        return Err(Error::PatternCompile {
                            line,
                            text: token.to_owned(),
                            source: error,
                        });
                    }
                    debug!("dropping pattern on line {line} ({token:?}): {error}");
                    set.discarded.push(Discard {
                        line,
                        text: token.to_owned(),
                        error,
                    });
                }
            }
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Lines dropped under [`Leniency::Lenient`], in file order.
    pub fn discarded(&self) -> &[Discard] {
        &self.discarded
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
