use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Chirality;
use crate::element::Element;
use crate::mol::Mol;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

/// Aromatic symbols, two-letter forms first so `se` is not read as `s`.
const AROMATIC_SYMBOLS: &[(&str, u8)] = &[
    ("se", 34),
    ("as", 33),
    ("te", 52),
    ("b", 5),
    ("c", 6),
    ("n", 7),
    ("o", 8),
    ("p", 15),
    ("s", 16),
];

pub fn parse(input: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser {
        chars: trimmed.chars().collect(),
        pos: 0,
    }
    .parse_chain()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

struct OpenRing {
    atom: NodeIndex,
    bond: Option<BondExpr>,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.pos += 1;
        }
        value
    }

    fn count_or(&mut self, default: u32) -> u8 {
        self.number().unwrap_or(default).min(u8::MAX as u32) as u8
    }

    fn unexpected(&self) -> SmartsError {
        match self.peek() {
            Some(ch) => SmartsError::UnexpectedChar { pos: self.pos, ch },
            None => SmartsError::UnexpectedEnd { pos: self.pos },
        }
    }

    /// Atoms, bonds, branches, ring closures and `.` separators.
    fn parse_chain(&mut self) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
        let mut mol = Mol::new();
        let mut branches: Vec<NodeIndex> = Vec::new();
        let mut current: Option<NodeIndex> = None;
        let mut pending: Option<(BondExpr, usize)> = None;
        let mut rings: HashMap<u16, OpenRing> = HashMap::new();

        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                '(' => {
                    if current.is_none() || pending.is_some() {
                        return Err(SmartsError::UnmatchedParen { pos: start });
                    }
                    self.pos += 1;
                    branches.extend(current);
                }
                ')' => {
                    if let Some((_, pos)) = pending {
                        return Err(SmartsError::DanglingBond { pos });
                    }
                    self.pos += 1;
                    current = Some(branches.pop().ok_or(SmartsError::UnmatchedParen { pos: start })?);
                }
                '.' => {
                    if pending.is_some() || !branches.is_empty() {
                        return Err(SmartsError::UnexpectedChar { pos: start, ch });
                    }
                    self.pos += 1;
                    current = None;
                }
                '0'..='9' | '%' => {
                    let digit = self.ring_digit()?;
                    let atom = current.ok_or(SmartsError::InvalidRingBond { digit, pos: start })?;
                    let written = pending.take().map(|(b, _)| b);
                    match rings.remove(&digit) {
                        None => {
                            rings.insert(digit, OpenRing { atom, bond: written });
                        }
                        Some(open) => {
                            if open.atom == atom || mol.bond_between(open.atom, atom).is_some() {
                                return Err(SmartsError::InvalidRingBond { digit, pos: start });
                            }
                            let bond = written.or(open.bond).unwrap_or(BondExpr::SingleOrAromatic);
                            mol.add_bond(open.atom, atom, bond);
                        }
                    }
                }
                c if is_bond_start(c) => {
                    if current.is_none() || pending.is_some() {
                        return Err(SmartsError::DanglingBond { pos: start });
                    }
                    pending = Some((self.bond_expr()?, start));
                }
                _ => {
                    let expr = if ch == '[' {
                        self.bracket_atom()?
                    } else {
                        self.bare_atom()?
                    };
                    let idx = mol.add_atom(expr);
                    match current {
                        Some(prev) => {
                            let bond = pending.take().map_or(BondExpr::SingleOrAromatic, |(b, _)| b);
                            mol.add_bond(prev, idx, bond);
                        }
                        None => {
                            if let Some((_, pos)) = pending {
                                return Err(SmartsError::DanglingBond { pos });
                            }
                        }
                    }
                    current = Some(idx);
                }
            }
        }

        if let Some((_, pos)) = pending {
            return Err(SmartsError::DanglingBond { pos });
        }
        if !branches.is_empty() {
            return Err(SmartsError::UnmatchedParen { pos: self.pos });
        }
        if let Some(&digit) = rings.keys().min() {
            return Err(SmartsError::UnclosedRing { digit });
        }

        Ok(mol)
    }

    fn ring_digit(&mut self) -> Result<u16, SmartsError> {
        let start = self.pos;
        if self.eat('%') {
            match (
                self.peek().and_then(|c| c.to_digit(10)),
                self.peek_at(1).and_then(|c| c.to_digit(10)),
            ) {
                (Some(d1), Some(d2)) => {
                    self.pos += 2;
                    Ok((d1 * 10 + d2) as u16)
                }
                _ => Err(SmartsError::UnexpectedChar { pos: start, ch: '%' }),
            }
        } else {
            let d = self.peek().and_then(|c| c.to_digit(10)).ok_or_else(|| self.unexpected())?;
            self.pos += 1;
            Ok(d as u16)
        }
    }

    // Bond expressions: `;` binds loosest, then `,`, then `&` or
    // juxtaposition, then `!`.

    fn bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.bond_or()?];
        while self.eat(';') {
            parts.push(self.bond_or()?);
        }
        Ok(flatten(parts, BondExpr::And, |e| match e {
            BondExpr::And(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn bond_or(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.bond_and()?];
        while self.eat(',') {
            parts.push(self.bond_and()?);
        }
        Ok(flatten(parts, BondExpr::Or, |e| match e {
            BondExpr::Or(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn bond_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.bond_not()?];
        loop {
            if self.eat('&') {
                parts.push(self.bond_not()?);
            } else if self.peek().is_some_and(|c| is_bond_start(c)) {
                parts.push(self.bond_not()?);
            } else {
                break;
            }
        }
        Ok(flatten(parts, BondExpr::And, |e| match e {
            BondExpr::And(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.eat('!') {
            Ok(BondExpr::Not(Box::new(self.bond_not()?)))
        } else {
            self.bond_primitive()
        }
    }

    fn bond_primitive(&mut self) -> Result<BondExpr, SmartsError> {
        let expr = match self.peek() {
            Some('-') | Some('/') | Some('\\') => BondExpr::Single,
            Some('=') => BondExpr::Double,
            Some('#') => BondExpr::Triple,
            Some(':') => BondExpr::Aromatic,
            Some('~') => BondExpr::True,
            Some('@') => BondExpr::Ring,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(expr)
    }

    /// Atoms written without brackets: `*`, `a`, `A`, element symbols.
    fn bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let Some(ch) = self.peek() else {
            return Err(self.unexpected());
        };
        match ch {
            '*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            'a' if !self.starts_with("as") => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            'A' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            _ => self.element().ok_or_else(|| self.unexpected()),
        }
    }

    fn bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        self.pos += 1;
        let expr = self.atom_expr()?;
        if !self.eat(']') {
            return Err(match self.peek() {
                Some(ch) => SmartsError::UnexpectedChar { pos: self.pos, ch },
                None => SmartsError::UnclosedBracket { pos: start },
            });
        }
        Ok(expr)
    }

    // Atom expressions follow the same precedence as bonds.

    fn atom_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.atom_or()?];
        while self.eat(';') {
            parts.push(self.atom_or()?);
        }
        Ok(flatten(parts, AtomExpr::And, |e| match e {
            AtomExpr::And(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn atom_or(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.atom_and()?];
        while self.eat(',') {
            parts.push(self.atom_and()?);
        }
        Ok(flatten(parts, AtomExpr::Or, |e| match e {
            AtomExpr::Or(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn atom_and(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.atom_not()?];
        loop {
            match self.peek() {
                Some('&') => {
                    self.pos += 1;
                    parts.push(self.atom_not()?);
                }
                Some(']') | Some(',') | Some(';') | None => break,
                Some(_) => parts.push(self.atom_not()?),
            }
        }
        Ok(flatten(parts, AtomExpr::And, |e| match e {
            AtomExpr::And(inner) => Ok(inner),
            other => Err(other),
        }))
    }

    fn atom_not(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.eat('!') {
            Ok(AtomExpr::Not(Box::new(self.atom_not()?)))
        } else {
            self.atom_primitive()
        }
    }

    fn atom_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Err(self.unexpected());
        };

        if ch == 'H' && self.is_hydrogen_atom() {
            self.pos += 1;
            return Ok(AtomExpr::Element {
                atomic_num: 1,
                aromatic: None,
            });
        }

        let expr = match ch {
            '*' => {
                self.pos += 1;
                AtomExpr::True
            }
            'a' if !self.starts_with("as") => {
                self.pos += 1;
                AtomExpr::Aromatic
            }
            'A' if self.element_at_pos().is_none() => {
                self.pos += 1;
                AtomExpr::Aliphatic
            }
            '#' => {
                self.pos += 1;
                let num = self.number().ok_or(SmartsError::InvalidAtomicNum { pos: start })?;
                if !(1..=118).contains(&num) {
                    return Err(SmartsError::InvalidAtomicNum { pos: start });
                }
                AtomExpr::Element {
                    atomic_num: num as u8,
                    aromatic: None,
                }
            }
            'D' if self.element_at_pos().is_none() => {
                self.pos += 1;
                AtomExpr::Degree(self.count_or(1))
            }
            'H' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                AtomExpr::TotalHCount(self.count_or(1))
            }
            'h' => {
                self.pos += 1;
                AtomExpr::ImplicitHCount(self.count_or(1))
            }
            'X' => {
                self.pos += 1;
                AtomExpr::Connectivity(self.count_or(1))
            }
            'v' => {
                self.pos += 1;
                AtomExpr::Valence(self.count_or(1))
            }
            'R' if self.element_at_pos().is_none() => {
                self.pos += 1;
                match self.number() {
                    Some(n) => AtomExpr::RingMembership(n.min(u8::MAX as u32) as u8),
                    None => AtomExpr::InRing,
                }
            }
            'r' => {
                self.pos += 1;
                match self.number() {
                    Some(n) => AtomExpr::SmallestRingSize(n.min(u8::MAX as u32) as u8),
                    None => AtomExpr::InRing,
                }
            }
            'x' => {
                self.pos += 1;
                match self.number() {
                    Some(n) => AtomExpr::RingConnectivity(n.min(u8::MAX as u32) as u8),
                    None => AtomExpr::InRing,
                }
            }
            '+' | '-' => {
                self.pos += 1;
                let sign: i8 = if ch == '+' { 1 } else { -1 };
                let magnitude = match self.number() {
                    Some(n) => n.min(i8::MAX as u32) as i8,
                    None => {
                        let mut count: i8 = 1;
                        while self.eat(ch) {
                            count = count.saturating_add(1);
                        }
                        count
                    }
                };
                AtomExpr::Charge(sign * magnitude)
            }
            '@' => {
                self.pos += 1;
                if self.eat('@') {
                    AtomExpr::Chirality(Chirality::Cw)
                } else {
                    AtomExpr::Chirality(Chirality::Ccw)
                }
            }
            ':' => {
                self.pos += 1;
                let class = self.number().ok_or_else(|| self.unexpected())?;
                AtomExpr::AtomMapClass(class.min(u16::MAX as u32) as u16)
            }
            '$' => self.recursive()?,
            c if c.is_ascii_digit() => {
                let n = self.number().unwrap_or(0);
                AtomExpr::Isotope(n.min(u16::MAX as u32) as u16)
            }
            _ => self.element().ok_or_else(|| self.unexpected())?,
        };
        Ok(expr)
    }

    /// `H` names the element rather than a hydrogen count when it is the
    /// first primitive in the bracket (after any isotope) and nothing but a
    /// charge or the closing bracket follows.
    fn is_hydrogen_atom(&self) -> bool {
        let mut before = self.pos;
        while before > 0 && self.chars[before - 1].is_ascii_digit() {
            before -= 1;
        }
        let first = before > 0 && self.chars[before - 1] == '[';
        first && matches!(self.peek_at(1), Some(']') | Some('+') | Some('-'))
    }

    fn element_at_pos(&self) -> Option<u8> {
        let first = self.peek()?;
        let second = self.peek_at(1)?;
        if !first.is_ascii_uppercase() || !second.is_ascii_lowercase() {
            return None;
        }
        Element::from_symbol(&format!("{first}{second}")).map(|e| e.atomic_num())
    }

    /// Element symbol, aromatic lowercase or aliphatic uppercase.
    fn element(&mut self) -> Option<AtomExpr> {
        for &(sym, num) in AROMATIC_SYMBOLS {
            if self.starts_with(sym) {
                self.pos += sym.len();
                return Some(AtomExpr::Element {
                    atomic_num: num,
                    aromatic: Some(true),
                });
            }
        }

        if let Some(num) = self.element_at_pos() {
            self.pos += 2;
            return Some(AtomExpr::Element {
                atomic_num: num,
                aromatic: Some(false),
            });
        }

        let first = self.peek().filter(|c| c.is_ascii_uppercase())?;
        let element = Element::from_symbol(&first.to_string())?;
        self.pos += 1;
        Some(AtomExpr::Element {
            atomic_num: element.atomic_num(),
            aromatic: Some(false),
        })
    }

    /// `$(...)`: the body is compiled as its own pattern.
    fn recursive(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        self.pos += 1;
        if !self.eat('(') {
            return Err(SmartsError::UnclosedRecursive { pos: start });
        }
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        if depth != 0 {
            return Err(SmartsError::UnclosedRecursive { pos: start });
        }
        let body: String = self.chars[body_start..self.pos].iter().collect();
        self.pos += 1;

        let inner = parse(&body).map_err(|e| SmartsError::Recursive {
            pos: start,
            inner: Box::new(e),
        })?;
        Ok(AtomExpr::Recursive(inner))
    }
}

fn is_bond_start(c: char) -> bool {
    matches!(c, '-' | '=' | '#' | ':' | '~' | '@' | '/' | '\\' | '!')
}

/// Collapses nested nodes of the same operator and unwraps single parts.
fn flatten<E>(
    parts: Vec<E>,
    wrap: impl Fn(Vec<E>) -> E,
    unwrap: impl Fn(E) -> Result<Vec<E>, E>,
) -> E {
    let mut flat = Vec::with_capacity(parts.len());
    for part in parts {
        match unwrap(part) {
            Ok(inner) => flat.extend(inner),
            Err(single) => flat.push(single),
        }
    }
    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    wrap(flat)
}
