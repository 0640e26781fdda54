//! Reference Generator: writes the reference file the verifier reads.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::patterns::{Pattern, PatternSet};
use crate::source::{Molecule, MoleculeSource};
use crate::traverse::{Flow, Traversal, Visitor};

/// One reference line: each index right-aligned in three columns with no
/// separator. Indices of 100 or more fill the field and run into their
/// neighbours, as the legacy files do.
pub fn format_record(indices: &[usize]) -> String {
    indices.iter().map(|i| format!("{i:3}")).collect()
}

pub fn write_header<W: Write>(out: &mut W, pattern_count: usize) -> std::io::Result<()> {
    writeln!(out, "{pattern_count} patterns")
}

struct Generator<'a, W> {
    out: &'a mut W,
    path: PathBuf,
}

impl<W: Write> Visitor for Generator<'_, W> {
    fn visit(&mut self, molecule: &Molecule, pattern: &Pattern) -> Result<Flow> {
        let line = format_record(&pattern.first_atoms(&molecule.mol));
        writeln!(self.out, "{line}").map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(Flow::Continue)
    }
}

/// Writes one line per molecule × pattern to `out`; the header is the
/// caller's. Returns the number of molecules written.
pub fn generate_with<W, I>(patterns: &PatternSet, molecules: I, out: &mut W, path: &Path) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Molecule>>,
{
    let mut generator = Generator {
        out,
        path: path.to_path_buf(),
    };
    let written = Traversal::new(patterns).run(molecules, &mut generator)?;
    generator.out.flush().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(written)
}

/// Loads the patterns, then creates the output and writes its header
/// before opening the molecule file.
pub fn run_generate(config: &RunConfig) -> Result<usize> {
    let files = &config.files;
    let patterns = PatternSet::load(&files.patterns, config.leniency)?;

    let write_err = |source| Error::Write {
        path: files.reference.clone(),
        source,
    };
    let mut out = BufWriter::new(File::create(&files.reference).map_err(write_err)?);
    write_header(&mut out, patterns.len()).map_err(write_err)?;

    let molecules = MoleculeSource::open(&files.molecules)?;
    let written = generate_with(&patterns, molecules, &mut out, &files.reference)?;
    info!(
        "wrote {} reference lines for {written} molecules to {}",
        written * patterns.len(),
        files.reference.display()
    );
    Ok(written)
}
