use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// One embedding of a query into a target: `(query atom, target atom)` pairs
/// ordered by query atom index, so `mapping[0].1` is the target atom matched
/// by the query's first atom.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

/// Every embedding of `query` into `target`.
///
/// `atom_match(target_atom, query_atom)` and `bond_match(target_bond,
/// query_bond)` decide compatibility; they receive indices so callers can
/// look at neighbourhoods, ring membership and the like. Results come out in
/// a deterministic order: ascending target index for query atom 0, then for
/// the following query atoms in depth-first order.
pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Vec<AtomMapping> {
    let mut results = Vec::new();
    Vf2::new(target, query, atom_match, bond_match).search(0, &mut results, None);
    results
}

/// Whether some embedding maps the query's first atom onto `root`.
pub fn has_rooted_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    root: NodeIndex,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> bool {
    if query.atom_count() == 0 || root.index() >= target.atom_count() {
        return false;
    }
    let mut results = Vec::new();
    let mut vf2 = Vf2::new(target, query, atom_match, bond_match);
    vf2.root = Some(root);
    vf2.search(0, &mut results, Some(1));
    !results.is_empty()
}

struct Vf2<'a, A1, B1, A2, B2, FA, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
    /// Query atoms in visiting order, each with an already-visited neighbour
    /// (if any) whose image bounds the candidate set.
    order: Vec<(NodeIndex, Option<NodeIndex>)>,
    root: Option<NodeIndex>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn new(
        target: &'a Mol<A1, B1>,
        query: &'a Mol<A2, B2>,
        atom_match: FA,
        bond_match: FB,
    ) -> Self {
        Self {
            target,
            query,
            atom_match,
            bond_match,
            order: visiting_order(query),
            root: None,
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    /// Returns `true` once `limit` results have been collected.
    fn search(&mut self, depth: usize, results: &mut Vec<AtomMapping>, limit: Option<usize>) -> bool {
        if depth == self.order.len() {
            let mut mapping: AtomMapping = self
                .query_map
                .iter()
                .enumerate()
                .filter_map(|(q, t)| t.map(|t| (NodeIndex::new(q), t)))
                .collect();
            mapping.sort_by_key(|&(q, _)| q);
            results.push(mapping);
            return limit.is_some_and(|l| results.len() >= l);
        }

        let (query_node, parent) = self.order[depth];
        for target_node in self.candidates(depth, parent) {
            if self.target_used[target_node.index()] || !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[target_node.index()] = true;

            let done = self.search(depth + 1, results, limit);

            self.query_map[query_node.index()] = None;
            self.target_used[target_node.index()] = false;

            if done {
                return true;
            }
        }
        false
    }

    fn candidates(&self, depth: usize, parent: Option<NodeIndex>) -> Vec<NodeIndex> {
        if depth == 0 {
            if let Some(root) = self.root {
                return vec![root];
            }
        }
        match parent.and_then(|p| self.query_map[p.index()]) {
            Some(anchor) => {
                let mut nbs: Vec<NodeIndex> = self.target.neighbors(anchor).collect();
                nbs.sort();
                nbs.dedup();
                nbs
            }
            None => self.target.atoms().collect(),
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_match)(target_node, query_node) {
            return false;
        }

        for q_neighbor in self.query.neighbors(query_node) {
            let Some(t_mapped) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            let Some(q_bond) = self.query.bond_between(query_node, q_neighbor) else {
                continue;
            };
            match self.target.bond_between(target_node, t_mapped) {
                Some(t_bond) if (self.bond_match)(t_bond, q_bond) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Depth-first order over the query starting at atom 0; each further
/// component starts at its lowest-index atom. Neighbours are visited in
/// ascending index order.
fn visiting_order<A, B>(query: &Mol<A, B>) -> Vec<(NodeIndex, Option<NodeIndex>)> {
    let mut order = Vec::with_capacity(query.atom_count());
    let mut seen = vec![false; query.atom_count()];

    for start in query.atoms() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut stack = vec![(start, None)];
        while let Some((node, parent)) = stack.pop() {
            order.push((node, parent));
            let mut nbs: Vec<NodeIndex> = query
                .neighbors(node)
                .filter(|nb| !seen[nb.index()])
                .collect();
            nbs.sort();
            nbs.dedup();
            for &nb in nbs.iter().rev() {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    stack.push((nb, Some(node)));
                }
            }
        }
    }

    order
}
