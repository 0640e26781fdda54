mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
pub use error::SmilesError;

/// Reads one SMILES string into a molecule.
///
/// Atoms are numbered in the order they appear. Aromaticity is taken as
/// written: lowercase atoms are aromatic and unwritten bonds between two of
/// them are [`BondOrder::Aromatic`](crate::BondOrder::Aromatic). No
/// kekulization or perception happens afterwards.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}
