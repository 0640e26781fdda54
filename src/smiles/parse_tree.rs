use std::collections::HashMap;

use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

/// Flat result of walking the token stream: atoms in input order and bonds
/// in the order they were closed. `bond` is `None` when no symbol was written.
#[derive(Debug, Clone)]
pub(crate) struct ParseTree {
    pub atoms: Vec<AtomToken>,
    pub bonds: Vec<ParseBond>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ParseBond {
    pub from: usize,
    pub to: usize,
    pub bond: Option<BondToken>,
}

struct OpenRing {
    atom: usize,
    bond: Option<BondToken>,
}

pub(crate) fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree {
        atoms: Vec::new(),
        bonds: Vec::new(),
    };
    let mut branches: Vec<usize> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut rings: HashMap<u16, OpenRing> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(atom) => {
                let idx = tree.atoms.len();
                tree.atoms.push(atom.clone());
                match current {
                    Some(prev) => tree.bonds.push(ParseBond {
                        from: prev,
                        to: idx,
                        bond: pending.take().map(|(b, _)| b),
                    }),
                    None => {
                        if let Some((_, pos)) = pending {
                            return Err(SmilesError::DanglingBond { pos });
                        }
                    }
                }
                current = Some(idx);
            }
            Token::Bond { bond, pos } => {
                if current.is_none() || pending.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending = Some((*bond, *pos));
            }
            Token::Ring { digit, pos } => {
                let atom = current.ok_or(SmilesError::DanglingRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let written = pending.take().map(|(b, _)| b);
                match rings.remove(digit) {
                    None => {
                        rings.insert(*digit, OpenRing { atom, bond: written });
                    }
                    Some(open) => {
                        let bond = match (open.bond, written) {
                            (Some(a), Some(b)) if a != b => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                            (a, b) => a.or(b),
                        };
                        if open.atom == atom || tree.has_bond(open.atom, atom) {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        tree.bonds.push(ParseBond {
                            from: open.atom,
                            to: atom,
                            bond,
                        });
                    }
                }
            }
            Token::Open(pos) => {
                let atom = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if pending.is_some() {
                    return Err(SmilesError::UnmatchedParen { pos: *pos });
                }
                branches.push(atom);
            }
            Token::Close(pos) => {
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                current = Some(branches.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?);
            }
            Token::Dot(pos) => {
                if pending.is_some() || !branches.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                current = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if !branches.is_empty() {
        return Err(SmilesError::UnmatchedParen { pos: 0 });
    }
    if let Some(digit) = rings.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }

    Ok(tree)
}

impl ParseTree {
    fn has_bond(&self, a: usize, b: usize) -> bool {
        self.bonds
            .iter()
            .any(|pb| (pb.from == a && pb.to == b) || (pb.from == b && pb.to == a))
    }
}
