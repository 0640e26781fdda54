use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Smallest set of smallest rings of a molecule, with per-atom and per-bond
/// lookups precomputed for the SMARTS ring primitives (`R`, `r`, `x`, `@`).
#[derive(Debug, Clone)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    atom_ring_count: Vec<u8>,
    atom_smallest: Vec<Option<usize>>,
    ring_bonds: Vec<bool>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let wanted = Self::expected_ring_count(mol);
        let rings = if wanted == 0 {
            Vec::new()
        } else {
            select_independent(mol, &horton_candidates(mol), wanted)
        };
        Self::index(mol, rings)
    }

    fn index<A, B>(mol: &Mol<A, B>, rings: Vec<Vec<NodeIndex>>) -> Self {
        let mut atom_ring_count = vec![0u8; mol.atom_count()];
        let mut atom_smallest: Vec<Option<usize>> = vec![None; mol.atom_count()];
        let mut ring_bonds = vec![false; mol.bond_count()];

        for ring in &rings {
            for (i, &a) in ring.iter().enumerate() {
                atom_ring_count[a.index()] = atom_ring_count[a.index()].saturating_add(1);
                let smallest = &mut atom_smallest[a.index()];
                *smallest = Some(smallest.map_or(ring.len(), |s| s.min(ring.len())));

                let b = ring[(i + 1) % ring.len()];
                if let Some(edge) = mol.bond_between(a, b) {
                    ring_bonds[edge.index()] = true;
                }
            }
        }

        Self {
            rings,
            atom_ring_count,
            atom_smallest,
            ring_bonds,
        }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.ring_count(atom) > 0
    }

    /// Number of SSSR rings the atom belongs to.
    pub fn ring_count(&self, atom: NodeIndex) -> u8 {
        self.atom_ring_count.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.atom_smallest.get(atom.index()).copied().flatten()
    }

    pub fn is_ring_bond<A, B>(&self, mol: &Mol<A, B>, a: NodeIndex, b: NodeIndex) -> bool {
        mol.bond_between(a, b)
            .is_some_and(|e| self.ring_bonds.get(e.index()).copied().unwrap_or(false))
    }

    /// Cyclomatic number `E - V + C`: the size of any cycle basis.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = mol.component_count();
        (e + c).saturating_sub(v)
    }
}

/// Bond set of a cycle, one bit per edge index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeSet(Vec<u64>);

impl EdgeSet {
    fn of_ring<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Self {
        let mut words = vec![0u64; mol.bond_count().div_ceil(64)];
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            if let Some(edge) = mol.bond_between(a, b) {
                words[edge.index() / 64] |= 1u64 << (edge.index() % 64);
            }
        }
        EdgeSet(words)
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    fn has(&self, bit: usize) -> bool {
        self.0[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    fn lowest(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn xor(&mut self, other: &EdgeSet) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a ^= *b;
        }
    }
}

/// Gaussian elimination over GF(2); accepts a cycle only when it is
/// independent of the cycles already accepted.
#[derive(Default)]
struct CycleBasis {
    rows: Vec<(usize, EdgeSet)>,
}

impl CycleBasis {
    fn insert(&mut self, mut cycle: EdgeSet) -> bool {
        for (pivot, row) in &self.rows {
            if cycle.has(*pivot) {
                cycle.xor(row);
            }
        }
        match cycle.lowest() {
            Some(pivot) => {
                for (_, row) in self.rows.iter_mut() {
                    if row.has(pivot) {
                        row.xor(&cycle);
                    }
                }
                self.rows.push((pivot, cycle));
                true
            }
            None => false,
        }
    }
}

fn select_independent<A, B>(
    mol: &Mol<A, B>,
    candidates: &[Vec<NodeIndex>],
    wanted: usize,
) -> Vec<Vec<NodeIndex>> {
    let mut basis = CycleBasis::default();
    let mut rings = Vec::with_capacity(wanted);

    for ring in candidates {
        if rings.len() >= wanted {
            break;
        }
        let edges = EdgeSet::of_ring(mol, ring);
        if edges.is_empty() {
            continue;
        }
        if basis.insert(edges) {
            rings.push(normalize_ring(ring));
        }
    }

    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings
}

/// Horton's candidate set: for every vertex `w` and edge `(u, v)`, the cycle
/// formed by the shortest paths `w..u`, `w..v` and the edge, when those paths
/// only meet at `w`. Sorted by size so the greedy selection is minimal.
fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let trees: Vec<ShortestPaths> = mol
        .atoms()
        .map(|root| ShortestPaths::from_root(mol, root))
        .collect();

    let mut candidates = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_atoms(edge) else {
            continue;
        };
        for tree in &trees {
            let (Some(du), Some(dv)) = (tree.dist[u.index()], tree.dist[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let path_u = tree.path_to(u);
            let path_v = tree.path_to(v);
            if path_u[1..].iter().any(|n| path_v[1..].contains(n)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(ring);
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

struct ShortestPaths {
    root: NodeIndex,
    dist: Vec<Option<usize>>,
    pred: Vec<Option<NodeIndex>>,
}

impl ShortestPaths {
    fn from_root<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut dist = vec![None; n];
        let mut pred = vec![None; n];
        dist[root.index()] = Some(0);

        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur.index()].unwrap_or(0);
            let mut nbs: Vec<NodeIndex> = mol.neighbors(cur).collect();
            nbs.sort();
            for nb in nbs {
                if dist[nb.index()].is_none() {
                    dist[nb.index()] = Some(d + 1);
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }

        Self { root, dist, pred }
    }

    /// Path from the root to `dst`, both ends included.
    fn path_to(&self, dst: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != self.root {
            match self.pred[cur.index()] {
                Some(p) => {
                    path.push(p);
                    cur = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Rotates a ring to start at its lowest index, then picks the direction
/// with the lower second element.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(start) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn sizes(smiles: &str) -> Vec<usize> {
        let mol = from_smiles(smiles).unwrap();
        RingInfo::sssr(&mol).rings().iter().map(|r| r.len()).collect()
    }

    #[test]
    fn sssr_ring_sizes() {
        let cases: &[(&str, &[usize])] = &[
            ("CCCC", &[]),
            ("C1CC1", &[3]),
            ("C1CCCCC1", &[6]),
            ("c1ccc2ccccc2c1", &[6, 6]),
            ("c1ccc2cc3ccccc3cc2c1", &[6, 6, 6]),
            ("C1CCC2(CC1)CCC2", &[4, 6]),
            ("C1CC2CC1CC2", &[5, 5]),
            ("C1CC1.C1CCCC1", &[3, 5]),
        ];
        for &(smiles, expected) in cases {
            assert_eq!(sizes(smiles), expected, "{smiles}");
        }
    }

    #[test]
    fn cubane_has_five_four_rings() {
        let mol = from_smiles("C12C3C4C1C5C2C3C45").unwrap();
        assert_eq!(RingInfo::expected_ring_count(&mol), 5);
        assert_eq!(sizes("C12C3C4C1C5C2C3C45"), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn phenol_oxygen_not_in_ring() {
        let mol = from_smiles("Oc1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(n(0)));
        for i in 1..7 {
            assert!(ri.is_ring_atom(n(i)), "atom {i} should be in ring");
        }
    }

    #[test]
    fn ring_bonds_and_chain_bonds() {
        let mol = from_smiles("CC1CCCCC1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_bond(&mol, n(0), n(1)));
        assert!(ri.is_ring_bond(&mol, n(1), n(2)));
        assert!(ri.is_ring_bond(&mol, n(6), n(1)));
        assert!(!ri.is_ring_bond(&mol, n(0), n(3)));
    }

    #[test]
    fn naphthalene_fusion_atoms_in_two_rings() {
        let mol = from_smiles("c1ccc2ccccc2c1").unwrap();
        let ri = RingInfo::sssr(&mol);
        let fused: Vec<usize> = mol
            .atoms()
            .filter(|&a| ri.ring_count(a) == 2)
            .map(|a| a.index())
            .collect();
        assert_eq!(fused, vec![3, 8]);
    }

    #[test]
    fn smallest_ring_size_prefers_smaller_ring() {
        let mol = from_smiles("C1CC2CCCCC12").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.smallest_ring_size(n(0)), Some(4));
        assert_eq!(ri.smallest_ring_size(n(4)), Some(6));
        assert_eq!(ri.smallest_ring_size(n(2)), Some(4));
    }

    #[test]
    fn smallest_ring_size_acyclic() {
        let mol = from_smiles("CCCC").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.smallest_ring_size(n(0)), None);
    }

    #[test]
    fn normalize_ring_is_rotation_and_direction_invariant() {
        let a = normalize_ring(&[n(3), n(1), n(2)]);
        let b = normalize_ring(&[n(2), n(1), n(3)]);
        assert_eq!(a, vec![n(1), n(2), n(3)]);
        assert_eq!(a, b);
    }
}
