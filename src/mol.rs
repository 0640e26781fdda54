use std::fmt;

use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Molecular graph, generic over atom and bond payloads.
///
/// Molecules read from SMILES are `Mol<Atom, Bond>`; compiled SMARTS
/// patterns are `Mol<AtomExpr, BondExpr>`. Node indices follow insertion
/// order, which for both readers is the order atoms appear in the input,
/// so `NodeIndex::index()` is the atom number written to reference files.
#[derive(Clone)]
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::with_capacity(0, 0),
        }
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True for the molecule a blank or unreadable record produces.
    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Atoms in index order.
    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn incident_bonds(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    /// Explicit neighbours only; implicit hydrogens are not graph nodes.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_atoms(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// Number of disconnected fragments (`.`-separated parts).
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Same atoms in the same order joined by the same bonds.
impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        let nodes = self.graph.raw_nodes().iter().map(|n| &n.weight);
        let other_nodes = other.graph.raw_nodes().iter().map(|n| &n.weight);
        let edges = self
            .graph
            .raw_edges()
            .iter()
            .map(|e| (e.source(), e.target(), &e.weight));
        let other_edges = other
            .graph
            .raw_edges()
            .iter()
            .map(|e| (e.source(), e.target(), &e.weight));
        nodes.eq(other_nodes) && edges.eq(other_edges)
    }
}

impl<A: fmt::Debug, B: fmt::Debug> fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms: Vec<&A> = self.graph.raw_nodes().iter().map(|n| &n.weight).collect();
        let bonds: Vec<_> = self
            .graph
            .raw_edges()
            .iter()
            .map(|e| (e.source().index(), e.target().index(), &e.weight))
            .collect();
        f.debug_struct("Mol")
            .field("atoms", &atoms)
            .field("bonds", &bonds)
            .finish()
    }
}
