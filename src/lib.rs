pub mod atom;
pub mod bond;
pub mod cli;
pub mod config;
pub mod element;
pub mod error;
pub mod generate;
pub mod mol;
pub mod patterns;
pub mod reference;
pub mod rings;
pub mod session;
pub mod smarts;
pub mod smiles;
pub mod source;
pub mod substruct;
pub mod tap;
pub mod traverse;
pub mod verify;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder};
pub use config::{DataFiles, Leniency, RunConfig};
pub use element::Element;
pub use error::{Error, Result};
pub use mol::Mol;
pub use patterns::{Pattern, PatternSet};
pub use reference::{ReferenceRecord, ReferenceStore};
pub use rings::RingInfo;
pub use smarts::{from_smarts, get_smarts_matches, has_smarts_match, MapList, SmartsError, SmartsPattern};
pub use smiles::{from_smiles, SmilesError};
pub use source::{Molecule, MoleculeSource};
pub use substruct::AtomMapping;
pub use tap::{Failure, TapWriter, Verdict};
pub use verify::Summary;
