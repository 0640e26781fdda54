//! Molecule Source: a stream of SMILES records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::error::{Error, Result};
use crate::mol::Mol;
use crate::smiles::from_smiles;

#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub mol: Mol<Atom, Bond>,
    pub title: String,
}

impl Molecule {
    pub fn is_empty(&self) -> bool {
        self.mol.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeFormat {
    Smiles,
}

impl MoleculeFormat {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "smi" | "smiles" | "can" | "ism" => Some(MoleculeFormat::Smiles),
            _ => None,
        }
    }
}

/// Parses one `<smiles> [title...]` record. A blank line or one that
/// fails to parse gives an empty molecule.
pub fn parse_record(line: &str) -> Molecule {
    let line = line.trim();
    let (smiles, title) = match line.split_once(char::is_whitespace) {
        Some((smiles, rest)) => (smiles, rest.trim()),
        None => (line, ""),
    };
    if smiles.is_empty() {
        return Molecule::default();
    }

    match from_smiles(smiles) {
        Ok(mol) => Molecule {
            mol,
            title: title.to_owned(),
        },
        Err(e) => {
            debug!("unreadable SMILES {smiles:?}: {e}");
            Molecule {
                mol: Mol::new(),
                title: title.to_owned(),
            }
        }
    }
}

pub struct MoleculeSource<R> {
    reader: R,
    path: PathBuf,
    line: usize,
}

impl MoleculeSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::MoleculeFile {
            path: path.to_path_buf(),
            source,
        })?;
        let format = MoleculeFormat::from_path(path).ok_or_else(|| Error::FormatUnavailable {
            path: path.to_path_buf(),
        })?;
        debug!("reading {format:?} records from {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), path))
    }
}

impl<R: BufRead> MoleculeSource<R> {
    pub fn from_reader(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for MoleculeSource<R> {
    type Item = Result<Molecule>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line += 1;
                match String::from_utf8(buf) {
                    Ok(text) => Some(Ok(parse_record(&text))),
                    Err(e) => {
                        debug!("line {} of {} is not UTF-8: {e}", self.line, self.path.display());
                        Some(Ok(Molecule::default()))
                    }
                }
            }
            Err(source) => Some(Err(Error::Read {
                path: self.path.clone(),
                line: self.line,
                source,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn record_with_title() {
        let m = parse_record("ON hydroxylamine\n");
        assert_eq!(m.mol.atom_count(), 2);
        assert_eq!(m.title, "hydroxylamine");
    }

    #[test]
    fn title_keeps_inner_spaces() {
        let m = parse_record("CCO\tethyl alcohol  ");
        assert_eq!(m.title, "ethyl alcohol");
    }

    #[test]
    fn record_without_title() {
        let m = parse_record("c1ccccc1");
        assert_eq!(m.mol.atom_count(), 6);
        assert_eq!(m.title, "");
    }

    #[test]
    fn blank_and_bad_records_are_empty() {
        assert!(parse_record("").is_empty());
        assert!(parse_record("   \n").is_empty());
        let bad = parse_record("C1CC broken");
        assert!(bad.is_empty());
        assert_eq!(bad.title, "broken");
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(
            MoleculeFormat::from_path(Path::new("attype.00.smi")),
            Some(MoleculeFormat::Smiles)
        );
        assert_eq!(
            MoleculeFormat::from_path(Path::new("set.SMILES")),
            Some(MoleculeFormat::Smiles)
        );
        assert_eq!(MoleculeFormat::from_path(Path::new("set.sdf")), None);
        assert_eq!(MoleculeFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn stream_yields_one_item_per_line() {
        let data = "ON a\n\nC1CC bad\nCC b\n";
        let source = MoleculeSource::from_reader(
            Cursor::new(data.as_bytes().to_vec()),
            Path::new("mem.smi"),
        );
        let mols: Vec<Molecule> = source.collect::<Result<_>>().unwrap();
        assert_eq!(mols.len(), 4);
        let sizes: Vec<usize> = mols.iter().map(|m| m.mol.atom_count()).collect();
        assert_eq!(sizes, vec![2, 0, 0, 2]);
    }

    #[test]
    fn non_utf8_line_is_an_empty_molecule() {
        let data = b"O water\nO caf\xe9\nO b\n".to_vec();
        let source = MoleculeSource::from_reader(Cursor::new(data), Path::new("mem.smi"));
        let mols: Vec<Molecule> = source.collect::<Result<_>>().unwrap();
        let sizes: Vec<usize> = mols.iter().map(|m| m.mol.atom_count()).collect();
        assert_eq!(sizes, vec![1, 0, 1]);
        assert_eq!(mols[2].title, "b");
    }

    #[test]
    fn open_checks_file_then_format() {
        let err = MoleculeSource::open(Path::new("no/such/file.sdf")).err().unwrap();
        assert!(matches!(err, Error::MoleculeFile { .. }));

        let mut file = tempfile::Builder::new().suffix(".sdf").tempfile().unwrap();
        writeln!(file, "CC").unwrap();
        let err = MoleculeSource::open(file.path()).err().unwrap();
        assert!(matches!(err, Error::FormatUnavailable { .. }));

        let mut file = tempfile::Builder::new().suffix(".smi").tempfile().unwrap();
        writeln!(file, "CC ethane").unwrap();
        let source = MoleculeSource::open(file.path()).unwrap();
        assert_eq!(source.count(), 1);
    }
}
