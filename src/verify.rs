//! Match Verifier: compares every pattern's matches against the reference
//! file and reports one TAP verdict per molecule.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::patterns::{Pattern, PatternSet};
use crate::reference::ReferenceStore;
use crate::session::TestSession;
use crate::source::{Molecule, MoleculeSource};
use crate::tap::{Failure, TapWriter};
use crate::traverse::{Flow, Traversal, Visitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub tested: usize,
    pub failed: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

struct Verifier<'a, R, W> {
    store: &'a mut ReferenceStore<R>,
    tap: &'a mut TapWriter<W>,
    pattern_count: usize,
    session: TestSession,
}

impl<R: BufRead, W: Write> Visitor for Verifier<'_, R, W> {
    fn begin_molecule(&mut self, ordinal: usize, _molecule: &Molecule) -> Result<()> {
        self.session.begin(ordinal);
        Ok(())
    }

    fn visit(&mut self, molecule: &Molecule, pattern: &Pattern) -> Result<Flow> {
        let record = self.store.next_record()?;
        let found = pattern.first_atoms(&molecule.mol);
        let session = &mut self.session;
        session.consumed();

        if record.len() != found.len() {
            session.fail(Failure::CountMismatch {
                expected: record.len(),
                found: found.len(),
                title: molecule.title.clone(),
                pattern: pattern.text().to_owned(),
                first_found: found.first().copied(),
            });
            return Ok(Flow::SkipMolecule);
        }

        let mismatch = record
            .values
            .iter()
            .zip(&found)
            .position(|(&expected, &atom)| i64::try_from(atom).map_or(true, |a| a != expected));
        if let Some(k) = mismatch {
            session.fail(Failure::ValueMismatch {
                expected: record.tokens[k].clone(),
                found: found[k],
                title: molecule.title.clone(),
                pattern: pattern.text().to_owned(),
            });
            return Ok(Flow::SkipMolecule);
        }

        Ok(Flow::Continue)
    }

    fn end_molecule(&mut self, _ordinal: usize, molecule: &Molecule) -> Result<()> {
        let skipped = self.pattern_count - self.session.checked_count();
        let verdict = self.session.finish();
        if !verdict.passed() && skipped > 0 {
            warn!(
                "molecule {} ({:?}) left {skipped} reference lines unread; \
                 later molecules are compared against shifted lines",
                verdict.ordinal(),
                molecule.title
            );
        }
        self.tap.verdict(&verdict)?;
        Ok(())
    }
}

/// Fails unless the reference header declares exactly as many patterns as
/// were loaded.
pub fn check_pattern_count<R: BufRead>(
    patterns: &PatternSet,
    store: &ReferenceStore<R>,
) -> Result<()> {
    if patterns.len() != store.declared_count() {
        return Err(Error::PatternCount {
            loaded: patterns.len(),
            declared: store.declared_count(),
        });
    }
    Ok(())
}

/// Verifies the molecules `open_molecules` yields against `store`, writing
/// verdicts and the final plan line to `tap`. The pattern count is checked
/// before `open_molecules` runs. Per-molecule failures are reported, not
/// returned.
pub fn verify_with<R, W, I, F>(
    patterns: &PatternSet,
    store: &mut ReferenceStore<R>,
    open_molecules: F,
    tap: &mut TapWriter<W>,
) -> Result<Summary>
where
    R: BufRead,
    W: Write,
    I: IntoIterator<Item = Result<Molecule>>,
    F: FnOnce() -> Result<I>,
{
    check_pattern_count(patterns, store)?;
    let molecules = open_molecules()?;

    let mut verifier = Verifier {
        store,
        tap,
        pattern_count: patterns.len(),
        session: TestSession::new(),
    };
    let tested = Traversal::new(patterns).run(molecules, &mut verifier)?;
    let failed = verifier.session.failed_count();
    let defaulted = verifier.store.defaulted().len();
    debug!(
        "{} reference lines consumed",
        verifier.session.reference_lines()
    );
    verifier.tap.plan(tested)?;

    if defaulted > 0 {
        info!("{defaulted} non-numeric reference tokens read as 0");
    }
    info!("{tested} molecules tested, {failed} failed");
    Ok(Summary { tested, failed })
}

/// The full verify run: banner, then the three files in the order the
/// legacy tool opened them.
pub fn run_verify<W: Write>(config: &RunConfig, tap: &mut TapWriter<W>) -> Result<Summary> {
    tap.banner()?;

    let files = &config.files;
    let patterns = PatternSet::load(&files.patterns, config.leniency)?;
    let mut store = ReferenceStore::open(&files.reference, config.leniency)?;

    verify_with(
        &patterns,
        &mut store,
        || MoleculeSource::open(&files.molecules),
        tap,
    )
}
