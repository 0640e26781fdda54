//! Reference Store: expected first-atom indices, one line per
//! molecule/pattern pair, read lazily in traversal order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Leniency;
use crate::error::{Error, Result};

/// One reference line: the raw tokens and their integer values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub line: usize,
    pub tokens: Vec<String>,
    pub values: Vec<i64>,
}

impl ReferenceRecord {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A token that was not a clean integer and was read as its numeric prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultedToken {
    pub line: usize,
    pub token: String,
}

/// Parses like C `atoi`: optional leading whitespace and sign, then the
/// longest run of digits. Returns the value and whether the whole token
/// was consumed.
pub fn parse_index(token: &str) -> (i64, bool) {
    let trimmed = token.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value = rest[..digits].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    let value = if negative { -value } else { value };

    let clean = digits > 0 && digits == rest.len() && trimmed.len() == token.len();
    (value, clean)
}

pub struct ReferenceStore<R> {
    reader: R,
    path: PathBuf,
    declared: usize,
    line: usize,
    leniency: Leniency,
    defaulted: Vec<DefaultedToken>,
}

impl ReferenceStore<BufReader<File>> {
    pub fn open(path: &Path, leniency: Leniency) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::ReferenceFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path, leniency)
    }
}

impl<R: BufRead> ReferenceStore<R> {
    /// Reads the header line (`"<count> patterns"`) and leaves the reader
    /// positioned at the first record.
    pub fn from_reader(reader: R, path: &Path, leniency: Leniency) -> Result<Self> {
        let mut store = Self {
            reader,
            path: path.to_path_buf(),
            declared: 0,
            line: 0,
            leniency,
            defaulted: Vec::new(),
        };

        let header = store.read_line()?.unwrap_or_default();
        let malformed = || Error::MalformedHeader {
            path: path.to_path_buf(),
            line: header.clone(),
        };
        let first = header.split_whitespace().next().ok_or_else(malformed)?;
        let (count, _) = parse_index(first);
        if !first.trim_start_matches(['+', '-']).starts_with(|c: char| c.is_ascii_digit()) {
            return Err(malformed());
        }
        store.declared = usize::try_from(count).map_err(|_| malformed())?;

        Ok(store)
    }

    /// The pattern count the header declares.
    pub fn declared_count(&self) -> usize {
        self.declared
    }

    /// Pulls the next record. Running out of lines is fatal since the
    /// caller always has a pattern waiting for it.
    pub fn next_record(&mut self) -> Result<ReferenceRecord> {
        let text = self
            .read_line()?
            .ok_or(Error::ReferenceExhausted { line: self.line })?;
        let line = self.line;

        let mut tokens = Vec::new();
        let mut values = Vec::new();
        for token in text.split_whitespace() {
            let (value, clean) = parse_index(token);
            if !clean {
                if self.leniency.is_strict() {
                    return Err(Error::NonNumericToken {
                        token: token.to_owned(),
                        line,
                    });
                }
                debug!("reference line {line}: token {token:?} read as {value}");
                self.defaulted.push(DefaultedToken {
                    line,
                    token: token.to_owned(),
                });
            }
            tokens.push(token.to_owned());
            values.push(value);
        }

        Ok(ReferenceRecord {
            line,
            tokens,
            values,
        })
    }

    /// Tokens read leniently, in the order they were met.
    pub fn defaulted(&self) -> &[DefaultedToken] {
        &self.defaulted
    }

    /// Lines not yet consumed. Drains the reader.
    pub fn remaining(&mut self) -> Result<usize> {
        let mut n = 0;
        while self.read_line()?.is_some() {
            n += 1;
        }
        Ok(n)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| Error::Read {
                path: self.path.clone(),
                line: self.line,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn store(text: &str, leniency: Leniency) -> Result<ReferenceStore<Cursor<Vec<u8>>>> {
        ReferenceStore::from_reader(
            Cursor::new(text.as_bytes().to_vec()),
            Path::new("smartsresults.txt"),
            leniency,
        )
    }

    #[test]
    fn atoi_semantics() {
        assert_eq!(parse_index("12"), (12, true));
        assert_eq!(parse_index("-3"), (-3, true));
        assert_eq!(parse_index("+7"), (7, true));
        assert_eq!(parse_index("12abc"), (12, false));
        assert_eq!(parse_index("abc"), (0, false));
        assert_eq!(parse_index("-"), (0, false));
        assert_eq!(parse_index(""), (0, false));
    }

    #[test]
    fn header_ignores_trailing_text() {
        let s = store("42 patterns\n", Leniency::Lenient).unwrap();
        assert_eq!(s.declared_count(), 42);
    }

    #[test]
    fn header_without_count_is_malformed() {
        for text in ["", "\n", "patterns 42\n", "-2 patterns\n"] {
            let err = store(text, Leniency::Lenient).err().unwrap();
            assert!(
                matches!(err, Error::MalformedHeader { .. }),
                "{text:?}: {err}"
            );
        }
    }

    #[test]
    fn records_in_order() {
        let mut s = store("2 patterns\n\n1\n 3  7 12\n", Leniency::Lenient).unwrap();

        let r = s.next_record().unwrap();
        assert!(r.is_empty());
        assert_eq!(r.line, 2);

        let r = s.next_record().unwrap();
        assert_eq!(r.values, vec![1]);

        let r = s.next_record().unwrap();
        assert_eq!(r.values, vec![3, 7, 12]);
        assert_eq!(r.tokens, vec!["3", "7", "12"]);
        assert_eq!(r.line, 4);
    }

    #[test]
    fn exhaustion_reports_last_line() {
        let mut s = store("1 patterns\n0\n", Leniency::Lenient).unwrap();
        s.next_record().unwrap();
        let err = s.next_record().unwrap_err();
        assert_eq!(err.to_string(), "Error reading reference data (after line 2)");
    }

    #[test]
    fn crlf_line_endings() {
        let mut s = store("1 patterns\r\n4 5\r\n", Leniency::Lenient).unwrap();
        assert_eq!(s.next_record().unwrap().values, vec![4, 5]);
    }

    #[test]
    fn lenient_defaults_non_numeric_tokens() {
        let mut s = store("1 patterns\n2 x 3y\n", Leniency::Lenient).unwrap();
        let r = s.next_record().unwrap();
        assert_eq!(r.values, vec![2, 0, 3]);
        assert_eq!(r.tokens[1], "x");
        assert_eq!(
            s.defaulted(),
            &[
                DefaultedToken {
                    line: 2,
                    token: "x".to_owned()
                },
                DefaultedToken {
                    line: 2,
                    token: "3y".to_owned()
                },
            ]
        );
    }

    #[test]
    fn strict_rejects_non_numeric_tokens() {
        let mut s = store("1 patterns\n2 x\n", Leniency::Strict).unwrap();
        let err = s.next_record().unwrap_err();
        assert_eq!(err.to_string(), "Non-numeric token x on reference line 2");
    }

    #[test]
    fn remaining_counts_unconsumed_lines() {
        let mut s = store("2 patterns\n1\n2\n3\n", Leniency::Lenient).unwrap();
        s.next_record().unwrap();
        assert_eq!(s.remaining().unwrap(), 2);
    }

    #[test]
    fn missing_file() {
        let err = ReferenceStore::open(Path::new("no/such/ref.txt"), Leniency::Lenient)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Cannot read in results file no/such/ref.txt");
    }
}
