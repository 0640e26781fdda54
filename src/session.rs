use crate::tap::{Failure, Verdict};

/// Verification state carried across the whole run: the current molecule
/// ordinal and its failure, reference lines consumed and molecules failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSession {
    ordinal: usize,
    failure: Option<Failure>,
    checked: usize,
    reference_lines: usize,
    failed: usize,
}

impl TestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts molecule `ordinal` as passing.
    pub fn begin(&mut self, ordinal: usize) {
        self.ordinal = ordinal;
        self.failure = None;
        self.checked = 0;
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Counts one reference line consumed for the current molecule.
    pub fn consumed(&mut self) {
        self.checked += 1;
        self.reference_lines += 1;
    }

    /// Patterns checked so far for the current molecule.
    pub fn checked_count(&self) -> usize {
        self.checked
    }

    /// Reference records consumed over the run, header excluded.
    pub fn reference_lines(&self) -> usize {
        self.reference_lines
    }

    /// Records the first failure of the current molecule; later ones are
    /// ignored.
    pub fn fail(&mut self, failure: Failure) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
    }

    pub fn is_failing(&self) -> bool {
        self.failure.is_some()
    }

    /// Closes the current molecule.
    pub fn finish(&mut self) -> Verdict {
        match self.failure.take() {
            None => Verdict::Pass {
                ordinal: self.ordinal,
            },
            Some(failure) => {
                self.failed += 1;
                Verdict::Fail {
                    ordinal: self.ordinal,
                    failure,
                }
            }
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }
}
