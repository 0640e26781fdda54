use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::ParseTree;
use crate::smiles::tokenizer::{AtomToken, BondToken};

pub(crate) fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();

    for token in &tree.atoms {
        mol.add_atom(Atom {
            atomic_num: token.element.map_or(0, |e| e.atomic_num()),
            formal_charge: token.charge,
            isotope: token.isotope,
            hydrogen_count: 0,
            is_aromatic: token.is_aromatic,
        });
    }

    for pb in &tree.bonds {
        let order = bond_order(
            pb.bond,
            tree.atoms[pb.from].is_aromatic,
            tree.atoms[pb.to].is_aromatic,
        );
        mol.add_bond(NodeIndex::new(pb.from), NodeIndex::new(pb.to), Bond { order });
    }

    for (i, token) in tree.atoms.iter().enumerate() {
        let idx = NodeIndex::new(i);
        let h = match token.hcount {
            Some(h) => h,
            None => implicit_hydrogens(&mol, idx, token),
        };
        mol.atom_mut(idx).hydrogen_count = h;
    }

    mol
}

/// An unwritten bond between two aromatic atoms is aromatic; otherwise single.
fn bond_order(written: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match written {
        Some(BondToken::Single) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}

/// Organic-subset hydrogens: the smallest default valence that covers the
/// explicit bonds, minus those bonds. Aromatic atoms give one bond's worth to
/// the ring, so they lose one more.
fn implicit_hydrogens(mol: &Mol<Atom, Bond>, idx: NodeIndex, token: &AtomToken) -> u8 {
    let Some(element) = token.element else {
        return 0;
    };

    let used: u8 = mol
        .incident_bonds(idx)
        .map(|e| match mol.bond(e).order {
            BondOrder::Single | BondOrder::Aromatic => 1u8,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        })
        .fold(0u8, u8::saturating_add);

    let Some(&target) = element.default_valences().iter().find(|&&v| v >= used) else {
        return 0;
    };

    let h = target - used;
    if token.is_aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}
