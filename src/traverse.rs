//! The molecule × pattern walk shared by verification and generation.

use tracing::debug;

use crate::error::Result;
use crate::patterns::{Pattern, PatternSet};
use crate::source::Molecule;

/// What the traversal does after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Leave the remaining patterns of this molecule unvisited.
    SkipMolecule,
}

pub trait Visitor {
    fn begin_molecule(&mut self, _ordinal: usize, _molecule: &Molecule) -> Result<()> {
        Ok(())
    }

    fn visit(&mut self, molecule: &Molecule, pattern: &Pattern) -> Result<Flow>;

    fn end_molecule(&mut self, _ordinal: usize, _molecule: &Molecule) -> Result<()> {
        Ok(())
    }
}

/// Walks every non-empty molecule against every pattern, in order.
///
/// Empty molecules (blank or unparsable records) are skipped before an
/// ordinal is assigned, so ordinals are `1..=n` without gaps.
pub struct Traversal<'p> {
    patterns: &'p PatternSet,
    ordinal: usize,
}

impl<'p> Traversal<'p> {
    pub fn new(patterns: &'p PatternSet) -> Self {
        Self {
            patterns,
            ordinal: 0,
        }
    }

    /// Returns the number of molecules visited.
    pub fn run<I, V>(mut self, molecules: I, visitor: &mut V) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Molecule>>,
        V: Visitor + ?Sized,
    {
        for molecule in molecules {
            let molecule = molecule?;
            if molecule.is_empty() {
                debug!("skipping empty molecule {:?}", molecule.title);
                continue;
            }

            self.ordinal += 1;
            visitor.begin_molecule(self.ordinal, &molecule)?;
            for pattern in self.patterns {
                if visitor.visit(&molecule, pattern)? == Flow::SkipMolecule {
                    break;
                }
            }
            visitor.end_molecule(self.ordinal, &molecule)?;
        }
        Ok(self.ordinal)
    }
}
