//! Fatal conditions of a conformance run.
//!
//! Each message is what follows `Bail out!` on the TAP stream.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::smarts::SmartsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read {}", path.display())]
    PatternFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read in results file {}", path.display())]
    ReferenceFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed reference header in {}: {line}", path.display())]
    MalformedHeader { path: PathBuf, line: String },

    #[error("Correct number of patterns not read in. Read in {loaded} expected {declared}")]
    PatternCount { loaded: usize, declared: usize },

    #[error("Cannot read atom types {}", path.display())]
    MoleculeFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SMILES format is not loaded (unsupported molecule file {})", path.display())]
    FormatUnavailable { path: PathBuf },

    #[error("Error reading reference data (after line {line})")]
    ReferenceExhausted { line: usize },

    /// Only raised under [`Leniency::Strict`](crate::config::Leniency::Strict).
    #[error("Pattern on line {line} failed to compile: {text}: {source}")]
    PatternCompile {
        line: usize,
        text: String,
        #[source]
        source: SmartsError,
    },

    /// Only raised under [`Leniency::Strict`](crate::config::Leniency::Strict).
    #[error("Non-numeric token {token} on reference line {line}")]
    NonNumericToken { token: String, line: usize },

    #[error("Error reading {} (after line {line}): {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write test output: {0}")]
    Output(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_bail_out_text() {
        let err = Error::PatternCount {
            loaded: 3,
            declared: 4,
        };
        assert_eq!(
            err.to_string(),
            "Correct number of patterns not read in. Read in 3 expected 4"
        );

        let err = Error::ReferenceExhausted { line: 7 };
        assert_eq!(err.to_string(), "Error reading reference data (after line 7)");

        let err = Error::FormatUnavailable {
            path: PathBuf::from("files/attype.00.sdf"),
        };
        assert_eq!(
            err.to_string(),
            "SMILES format is not loaded (unsupported molecule file files/attype.00.sdf)"
        );
    }

    #[test]
    fn open_failures_name_the_file() {
        let source = || io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = Error::PatternFile {
            path: PathBuf::from("files/smartstest.txt"),
            source: source(),
        };
        assert_eq!(err.to_string(), "Cannot read files/smartstest.txt");

        let err = Error::ReferenceFile {
            path: PathBuf::from("files/smartsresults.txt"),
            source: source(),
        };
        assert_eq!(err.to_string(), "Cannot read in results file files/smartsresults.txt");

        let err = Error::MoleculeFile {
            path: PathBuf::from("files/attype.00.smi"),
            source: source(),
        };
        assert_eq!(err.to_string(), "Cannot read atom types files/attype.00.smi");
    }

    #[test]
    fn strict_messages() {
        let err = Error::PatternCompile {
            line: 4,
            text: "[C".to_owned(),
            source: SmartsError::UnclosedBracket { pos: 0 },
        };
        assert_eq!(
            err.to_string(),
            "Pattern on line 4 failed to compile: [C: unclosed bracket starting at position 0"
        );

        let err = Error::NonNumericToken {
            token: "x".to_owned(),
            line: 9,
        };
        assert_eq!(err.to_string(), "Non-numeric token x on reference line 9");
    }
}
