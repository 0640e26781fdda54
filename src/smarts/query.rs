use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::rings::RingInfo;

/// AST node for a SMARTS atom query expression.
///
/// Each variant is a primitive test or a logical combination of tests;
/// [`AtomExpr::matches`] evaluates the tree against one target atom.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Any atom (`*`).
    True,
    /// Element test. `aromatic` is `None` for `#n`, `Some(true)` for a
    /// lowercase symbol and `Some(false)` for an uppercase one.
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// Any aromatic atom (`a`).
    Aromatic,
    /// Any aliphatic atom (`A`).
    Aliphatic,
    /// Mass number (`[13C]`).
    Isotope(u16),
    /// Explicit connections (`D`).
    Degree(u8),
    /// Total hydrogen count, implicit plus explicit `[H]` neighbours (`H`).
    TotalHCount(u8),
    /// Implicit hydrogen count (`h`).
    ImplicitHCount(u8),
    /// Total connections including implicit hydrogens (`X`).
    Connectivity(u8),
    /// Total bond order including implicit hydrogens (`v`).
    Valence(u8),
    /// Member of at least one SSSR ring (`R`, `r`, `x` without a count).
    InRing,
    /// Number of SSSR rings containing the atom (`R<n>`; `R0` is acyclic).
    RingMembership(u8),
    /// Size of the smallest SSSR ring containing the atom (`r<n>`).
    SmallestRingSize(u8),
    /// Number of ring bonds on the atom (`x<n>`).
    RingConnectivity(u8),
    /// Formal charge (`+`, `-2`, `++`, ...).
    Charge(i8),
    /// Tetrahedral chirality (`@`, `@@`). Molecules carry no stereo, so it
    /// never excludes an atom.
    Chirality(Chirality),
    /// Atom class (`:n`); never excludes an atom.
    AtomMapClass(u16),
    /// Recursive environment test (`$(...)`): the atom must be where the
    /// inner pattern's first atom can sit.
    Recursive(Mol<AtomExpr, BondExpr>),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// AST node for a SMARTS bond query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// Any bond (`~`).
    True,
    /// Unwritten bond: single or aromatic.
    SingleOrAromatic,
    /// `-`, and the directional `/` and `\`.
    Single,
    /// `=`
    Double,
    /// `#`
    Triple,
    /// `:`
    Aromatic,
    /// Ring bond (`@`).
    Ring,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// Target-side facts shared by every atom and bond test during one search.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub rings: &'a RingInfo,
    /// Atoms satisfying each `$(...)` expression, keyed by the address of
    /// the inner pattern.
    pub recursive: &'a HashMap<usize, HashSet<NodeIndex>>,
}

impl MatchContext<'_> {
    fn explicit_h_neighbors(&self, idx: NodeIndex) -> u8 {
        self.mol
            .neighbors(idx)
            .filter(|&nb| self.mol.atom(nb).atomic_num == 1)
            .count() as u8
    }

    fn ring_bonds(&self, idx: NodeIndex) -> u8 {
        self.mol
            .neighbors(idx)
            .filter(|&nb| self.rings.is_ring_bond(self.mol, idx, nb))
            .count() as u8
    }

    /// Total valence without a Kekulé structure: aromatic bonds count once,
    /// and an aromatic atom gains one more if its lowest allowed valence
    /// still has room for the ring double bond.
    fn valence(&self, idx: NodeIndex) -> u8 {
        let atom = self.mol.atom(idx);
        let mut aromatic_bonds = 0u8;
        let mut used = atom.hydrogen_count;
        for e in self.mol.incident_bonds(idx) {
            used = used.saturating_add(match self.mol.bond(e).order {
                BondOrder::Single => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
                BondOrder::Aromatic => {
                    aromatic_bonds += 1;
                    1
                }
            });
        }
        if aromatic_bonds > 0 && used < kekule_capacity(atom) {
            used + 1
        } else {
            used
        }
    }
}

/// Lowest allowed valence, shifted by formal charge the way isoelectronic
/// species behave (`[n+]` like carbon, `[c-]` like nitrogen).
fn kekule_capacity(atom: &Atom) -> u8 {
    let base = Element::from_atomic_num(atom.atomic_num)
        .and_then(|e| e.default_valences().first().copied())
        .unwrap_or(0) as i16;
    let charge = atom.formal_charge as i16;
    let adjusted = match atom.atomic_num {
        5 | 6 => base - charge.abs(),
        7 | 8 | 15 | 16 | 33 | 34 => base + charge,
        _ => base,
    };
    adjusted.clamp(0, u8::MAX as i16) as u8
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => atom.atomic_num == *atomic_num && aromatic.map_or(true, |a| atom.is_aromatic == a),
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => ctx.mol.degree(idx) == *d as usize,
            AtomExpr::TotalHCount(h) => atom.hydrogen_count + ctx.explicit_h_neighbors(idx) == *h,
            AtomExpr::ImplicitHCount(h) => atom.hydrogen_count == *h,
            AtomExpr::Connectivity(x) => {
                ctx.mol.degree(idx) + atom.hydrogen_count as usize == *x as usize
            }
            AtomExpr::Valence(v) => ctx.valence(idx) == *v,
            AtomExpr::InRing => ctx.rings.is_ring_atom(idx),
            AtomExpr::RingMembership(n) => ctx.rings.ring_count(idx) == *n,
            AtomExpr::SmallestRingSize(r) => match ctx.rings.smallest_ring_size(idx) {
                Some(size) => size == *r as usize,
                None => *r == 0,
            },
            AtomExpr::RingConnectivity(x) => ctx.ring_bonds(idx) == *x,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::Chirality(_) | AtomExpr::AtomMapClass(_) => true,
            AtomExpr::Recursive(inner) => {
                let key = inner as *const Mol<AtomExpr, BondExpr> as usize;
                ctx.recursive.get(&key).is_some_and(|set| set.contains(&idx))
            }
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, idx)),
            AtomExpr::Not(expr) => !expr.matches(ctx, idx),
        }
    }
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let order = ctx.mol.bond(edge).order;
        match self {
            BondExpr::True => true,
            BondExpr::SingleOrAromatic => {
                matches!(order, BondOrder::Single | BondOrder::Aromatic)
            }
            BondExpr::Single => order == BondOrder::Single,
            BondExpr::Double => order == BondOrder::Double,
            BondExpr::Triple => order == BondOrder::Triple,
            BondExpr::Aromatic => order == BondOrder::Aromatic,
            BondExpr::Ring => ctx
                .mol
                .bond_atoms(edge)
                .is_some_and(|(a, b)| ctx.rings.is_ring_bond(ctx.mol, a, b)),
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, edge)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, edge)),
            BondExpr::Not(expr) => !expr.matches(ctx, edge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn with_ctx(smiles: &str, f: impl FnOnce(&MatchContext)) {
        let mol = from_smiles(smiles).unwrap();
        let rings = RingInfo::sssr(&mol);
        let recursive = HashMap::new();
        let ctx = MatchContext {
            mol: &mol,
            rings: &rings,
            recursive: &recursive,
        };
        f(&ctx);
    }

    #[test]
    fn element_aromaticity() {
        with_ctx("Cc1ccccc1", |ctx| {
            let aliphatic_c = AtomExpr::Element {
                atomic_num: 6,
                aromatic: Some(false),
            };
            let any_c = AtomExpr::Element {
                atomic_num: 6,
                aromatic: None,
            };
            assert!(aliphatic_c.matches(ctx, n(0)));
            assert!(!aliphatic_c.matches(ctx, n(1)));
            assert!(any_c.matches(ctx, n(1)));
            assert!(AtomExpr::Aromatic.matches(ctx, n(3)));
            assert!(AtomExpr::Aliphatic.matches(ctx, n(0)));
        });
    }

    #[test]
    fn counts() {
        with_ctx("CC(C)(C)O", |ctx| {
            assert!(AtomExpr::Degree(4).matches(ctx, n(1)));
            assert!(AtomExpr::TotalHCount(3).matches(ctx, n(0)));
            assert!(AtomExpr::ImplicitHCount(1).matches(ctx, n(4)));
            assert!(AtomExpr::Connectivity(2).matches(ctx, n(4)));
            assert!(AtomExpr::Connectivity(4).matches(ctx, n(0)));
        });
    }

    #[test]
    fn explicit_hydrogen_neighbours_count_toward_h() {
        with_ctx("[H]C([H])([H])[H]", |ctx| {
            assert!(AtomExpr::TotalHCount(4).matches(ctx, n(1)));
            assert!(AtomExpr::ImplicitHCount(0).matches(ctx, n(1)));
        });
    }

    #[test]
    fn valence_of_aromatic_atoms() {
        with_ctx("c1ccncc1", |ctx| {
            assert!(AtomExpr::Valence(4).matches(ctx, n(0)));
            assert!(AtomExpr::Valence(3).matches(ctx, n(3)));
        });
        with_ctx("c1cc[nH]c1", |ctx| {
            assert!(AtomExpr::Valence(3).matches(ctx, n(3)));
        });
        with_ctx("c1ccoc1", |ctx| {
            assert!(AtomExpr::Valence(2).matches(ctx, n(3)));
        });
        with_ctx("CS(=O)(=O)C", |ctx| {
            assert!(AtomExpr::Valence(6).matches(ctx, n(1)));
        });
    }

    #[test]
    fn ring_primitives() {
        with_ctx("CC1CCC2CCCCC2C1", |ctx| {
            assert!(!AtomExpr::InRing.matches(ctx, n(0)));
            assert!(AtomExpr::RingMembership(0).matches(ctx, n(0)));
            assert!(AtomExpr::SmallestRingSize(0).matches(ctx, n(0)));
            assert!(AtomExpr::InRing.matches(ctx, n(1)));
            assert!(AtomExpr::RingMembership(1).matches(ctx, n(1)));
            assert!(AtomExpr::RingMembership(2).matches(ctx, n(4)));
            assert!(AtomExpr::SmallestRingSize(6).matches(ctx, n(4)));
            assert!(AtomExpr::RingConnectivity(2).matches(ctx, n(1)));
            assert!(AtomExpr::RingConnectivity(3).matches(ctx, n(4)));
        });
    }

    #[test]
    fn charge_and_isotope() {
        with_ctx("[13CH3][N+](C)(C)C", |ctx| {
            assert!(AtomExpr::Isotope(13).matches(ctx, n(0)));
            assert!(AtomExpr::Charge(1).matches(ctx, n(1)));
            assert!(AtomExpr::Charge(0).matches(ctx, n(2)));
        });
    }

    #[test]
    fn logic() {
        with_ctx("CO", |ctx| {
            let c = AtomExpr::Element {
                atomic_num: 6,
                aromatic: None,
            };
            let o = AtomExpr::Element {
                atomic_num: 8,
                aromatic: None,
            };
            let c_or_o = AtomExpr::Or(vec![c.clone(), o.clone()]);
            assert!(c_or_o.matches(ctx, n(0)));
            assert!(c_or_o.matches(ctx, n(1)));
            assert!(!AtomExpr::And(vec![c.clone(), o]).matches(ctx, n(0)));
            assert!(AtomExpr::Not(Box::new(c)).matches(ctx, n(1)));
        });
    }

    #[test]
    fn bond_orders() {
        with_ctx("C=Cc1ccccc1C#N", |ctx| {
            let mol = ctx.mol;
            let double = mol.bond_between(n(0), n(1)).unwrap();
            let single = mol.bond_between(n(1), n(2)).unwrap();
            let aromatic = mol.bond_between(n(2), n(3)).unwrap();
            let triple = mol.bond_between(n(8), n(9)).unwrap();

            assert!(BondExpr::Double.matches(ctx, double));
            assert!(BondExpr::Single.matches(ctx, single));
            assert!(!BondExpr::Single.matches(ctx, aromatic));
            assert!(BondExpr::Aromatic.matches(ctx, aromatic));
            assert!(BondExpr::SingleOrAromatic.matches(ctx, aromatic));
            assert!(BondExpr::SingleOrAromatic.matches(ctx, single));
            assert!(!BondExpr::SingleOrAromatic.matches(ctx, double));
            assert!(BondExpr::Triple.matches(ctx, triple));
            assert!(BondExpr::True.matches(ctx, triple));
            assert!(BondExpr::Ring.matches(ctx, aromatic));
            assert!(!BondExpr::Ring.matches(ctx, single));
            assert!(BondExpr::Not(Box::new(BondExpr::Ring)).matches(ctx, single));
        });
    }
}
