//! TAP output: `ok`/`not ok` lines, `#` diagnostics, the `1..N` plan and
//! `Bail out!`.

use std::fmt;
use std::io::{self, Write};

/// Why a molecule failed. Carries everything the diagnostic lines print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    CountMismatch {
        expected: usize,
        found: usize,
        title: String,
        pattern: String,
        first_found: Option<usize>,
    },
    ValueMismatch {
        /// The reference token as written.
        expected: String,
        found: usize,
        title: String,
        pattern: String,
    },
}

impl Failure {
    pub fn reason(&self) -> &'static str {
        match self {
            Failure::CountMismatch { .. } => "number of matches different than reference",
            Failure::ValueMismatch { .. } => "matching atom numbers different than reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass { ordinal: usize },
    Fail { ordinal: usize, failure: Failure },
}

impl Verdict {
    pub fn ordinal(&self) -> usize {
        match self {
            Verdict::Pass { ordinal } | Verdict::Fail { ordinal, .. } => *ordinal,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ordinal, failure) = match self {
            Verdict::Pass { ordinal } => {
                return writeln!(f, "ok {ordinal} # molecule passed tests");
            }
            Verdict::Fail { ordinal, failure } => (ordinal, failure),
        };

        writeln!(f, "not ok {ordinal} # {}", failure.reason())?;
        match failure {
            Failure::CountMismatch {
                expected,
                found,
                title,
                pattern,
                first_found,
            } => {
                writeln!(f, "# Expected {expected} matches, found {found}")?;
                writeln!(f, "# Error with molecule {title}")?;
                writeln!(f, "#  on pattern {pattern}")?;
                if let Some(i) = first_found {
                    writeln!(f, "# First match: atom #{i}")?;
                }
            }
            Failure::ValueMismatch {
                expected,
                found,
                title,
                pattern,
            } => {
                writeln!(f, "# Expected {expected} but found {found}")?;
                writeln!(f, "# Molecule: {title}")?;
                writeln!(f, "# Pattern: {pattern}")?;
            }
        }
        Ok(())
    }
}

pub struct TapWriter<W> {
    out: W,
}

impl<W: Write> TapWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "# Testing SMARTS...")
    }

    pub fn verdict(&mut self, verdict: &Verdict) -> io::Result<()> {
        write!(self.out, "{verdict}")
    }

    pub fn plan(&mut self, tested: usize) -> io::Result<()> {
        writeln!(self.out, "1..{tested}")?;
        self.out.flush()
    }

    pub fn bail_out(&mut self, message: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "Bail out! {message}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_line() {
        let v = Verdict::Pass { ordinal: 3 };
        assert_eq!(v.to_string(), "ok 3 # molecule passed tests\n");
        assert!(v.passed());
    }

    #[test]
    fn count_mismatch_lines() {
        let v = Verdict::Fail {
            ordinal: 1,
            failure: Failure::CountMismatch {
                expected: 2,
                found: 1,
                title: "hydroxylamine".into(),
                pattern: "[#7]".into(),
                first_found: Some(1),
            },
        };
        assert_eq!(
            v.to_string(),
            "not ok 1 # number of matches different than reference\n\
             # Expected 2 matches, found 1\n\
             # Error with molecule hydroxylamine\n\
             #  on pattern [#7]\n\
             # First match: atom #1\n"
        );
        assert_eq!(v.ordinal(), 1);
    }

    #[test]
    fn count_mismatch_without_matches_has_no_first_line() {
        let v = Verdict::Fail {
            ordinal: 2,
            failure: Failure::CountMismatch {
                expected: 1,
                found: 0,
                title: "water".into(),
                pattern: "[#6]".into(),
                first_found: None,
            },
        };
        assert!(!v.to_string().contains("First match"));
    }

    #[test]
    fn value_mismatch_lines() {
        let v = Verdict::Fail {
            ordinal: 5,
            failure: Failure::ValueMismatch {
                expected: "2".into(),
                found: 1,
                title: "hydroxylamine".into(),
                pattern: "[#7]".into(),
            },
        };
        assert_eq!(
            v.to_string(),
            "not ok 5 # matching atom numbers different than reference\n\
             # Expected 2 but found 1\n\
             # Molecule: hydroxylamine\n\
             # Pattern: [#7]\n"
        );
    }

    #[test]
    fn writer_stream() {
        let mut tap = TapWriter::new(Vec::new());
        tap.banner().unwrap();
        tap.verdict(&Verdict::Pass { ordinal: 1 }).unwrap();
        tap.plan(1).unwrap();
        let out = String::from_utf8(tap.into_inner()).unwrap();
        assert_eq!(out, "# Testing SMARTS...\nok 1 # molecule passed tests\n1..1\n");
    }

    #[test]
    fn bail_out_line() {
        let mut tap = TapWriter::new(Vec::new());
        tap.bail_out("Cannot read files/smartstest.txt").unwrap();
        assert_eq!(
            String::from_utf8(tap.into_inner()).unwrap(),
            "Bail out! Cannot read files/smartstest.txt\n"
        );
    }
}
