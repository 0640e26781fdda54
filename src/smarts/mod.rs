mod error;
mod parser;
pub mod query;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::substruct::{get_substruct_matches_with, has_rooted_match_with, AtomMapping};

use query::MatchContext;

/// All embeddings of one pattern in one molecule.
pub type MapList = Vec<AtomMapping>;

pub fn from_smarts(s: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    parser::parse(s)
}

/// Every mapping of `query` onto `target`, in the order described on
/// [`get_substruct_matches_with`]. Symmetric embeddings are all reported.
pub fn get_smarts_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> MapList {
    let rings = RingInfo::sssr(target);
    let mut recursive = HashMap::new();
    evaluate_recursive(target, query, &rings, &mut recursive);

    let ctx = MatchContext {
        mol: target,
        rings: &rings,
        recursive: &recursive,
    };
    get_substruct_matches_with(
        target,
        query,
        |t, q| query.atom(q).matches(&ctx, t),
        |t, q| query.bond(q).matches(&ctx, t),
    )
}

pub fn has_smarts_match(target: &Mol<Atom, Bond>, query: &Mol<AtomExpr, BondExpr>) -> bool {
    !get_smarts_matches(target, query).is_empty()
}

/// Fills `cache` with the target atoms satisfying every `$(...)` reachable
/// from `query`, innermost first.
fn evaluate_recursive(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
    rings: &RingInfo,
    cache: &mut HashMap<usize, HashSet<NodeIndex>>,
) {
    let mut inners = Vec::new();
    for idx in query.atoms() {
        collect_recursive(query.atom(idx), &mut inners);
    }

    for inner in inners {
        let key = inner as *const Mol<AtomExpr, BondExpr> as usize;
        if cache.contains_key(&key) {
            continue;
        }
        evaluate_recursive(target, inner, rings, cache);

        let ctx = MatchContext {
            mol: target,
            rings,
            recursive: cache,
        };
        let hits: HashSet<NodeIndex> = target
            .atoms()
            .filter(|&root| {
                has_rooted_match_with(
                    target,
                    inner,
                    root,
                    |t, q| inner.atom(q).matches(&ctx, t),
                    |t, q| inner.bond(q).matches(&ctx, t),
                )
            })
            .collect();
        cache.insert(key, hits);
    }
}

fn collect_recursive<'a>(expr: &'a AtomExpr, out: &mut Vec<&'a Mol<AtomExpr, BondExpr>>) {
    match expr {
        AtomExpr::Recursive(inner) => out.push(inner),
        AtomExpr::And(parts) | AtomExpr::Or(parts) => {
            for part in parts {
                collect_recursive(part, out);
            }
        }
        AtomExpr::Not(inner) => collect_recursive(inner, out),
        _ => {}
    }
}

/// A compiled SMARTS pattern together with the text it came from.
///
/// # Examples
///
/// ```
/// use smartstest::{from_smiles, SmartsPattern};
///
/// let pattern = SmartsPattern::new("[OX2H]").unwrap();
/// let ethanol = from_smiles("CCO").unwrap();
/// let hits = pattern.first_atoms(&ethanol);
/// assert_eq!(hits, vec![2]);
/// ```
#[derive(Debug, Clone)]
pub struct SmartsPattern {
    text: String,
    query: Mol<AtomExpr, BondExpr>,
}

impl SmartsPattern {
    pub fn new(text: &str) -> Result<Self, SmartsError> {
        Ok(Self {
            query: from_smarts(text)?,
            text: text.to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn query(&self) -> &Mol<AtomExpr, BondExpr> {
        &self.query
    }

    pub fn match_all(&self, mol: &Mol<Atom, Bond>) -> MapList {
        if mol.is_empty() {
            return Vec::new();
        }
        get_smarts_matches(mol, &self.query)
    }

    /// The target atom of query atom 0 in each match, in match order.
    /// These are the numbers recorded in reference files.
    pub fn first_atoms(&self, mol: &Mol<Atom, Bond>) -> Vec<usize> {
        self.match_all(mol)
            .iter()
            .filter_map(|m| m.first().map(|&(_, t)| t.index()))
            .collect()
    }
}

impl FromStr for SmartsPattern {
    type Err = SmartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for SmartsPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
