use std::fmt;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    /// The input was empty or contained only whitespace.
    EmptyInput,
    /// A character that cannot start or continue a token.
    UnexpectedChar { pos: usize, ch: char },
    /// An element symbol the reader does not know.
    InvalidElement { pos: usize, text: String },
    /// A `[` without its closing `]`.
    UnclosedBracket { pos: usize },
    /// A charge inside a bracket atom that does not fit in an `i8`.
    InvalidCharge { pos: usize },
    /// An isotope number that does not fit in a `u16`.
    InvalidIsotope { pos: usize },
    /// A ring-closure digit that was opened and never closed.
    UnclosedRing { digit: u16 },
    /// A ring-closure digit with no atom before it.
    DanglingRingBond { digit: u16, pos: usize },
    /// Both ends of a ring closure name a bond, and the bonds differ.
    RingBondConflict { digit: u16 },
    /// A ring closure that would join an atom to itself or duplicate a bond.
    InvalidRingBond { digit: u16, pos: usize },
    /// A parenthesis with no partner, or a branch with no atom before it.
    UnmatchedParen { pos: usize },
    /// A bond symbol with no atom on one of its sides.
    DanglingBond { pos: usize },
}

impl fmt::Display for SmilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty SMILES string"),
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{}' at position {}", ch, pos)
            }
            Self::InvalidElement { pos, text } => {
                write!(f, "invalid element '{}' at position {}", text, pos)
            }
            Self::UnclosedBracket { pos } => {
                write!(f, "unclosed bracket atom starting at position {}", pos)
            }
            Self::InvalidCharge { pos } => write!(f, "invalid charge at position {}", pos),
            Self::InvalidIsotope { pos } => write!(f, "isotope overflow at position {}", pos),
            Self::UnclosedRing { digit } => write!(f, "unclosed ring {}", digit),
            Self::DanglingRingBond { digit, pos } => {
                write!(f, "ring bond {} at position {} has no atom", digit, pos)
            }
            Self::RingBondConflict { digit } => {
                write!(f, "conflicting bond types on ring closure {}", digit)
            }
            Self::InvalidRingBond { digit, pos } => {
                write!(f, "invalid ring bond {} at position {}", digit, pos)
            }
            Self::UnmatchedParen { pos } => {
                write!(f, "unmatched parenthesis at position {}", pos)
            }
            Self::DanglingBond { pos } => write!(f, "bond at position {} has no atom", pos),
        }
    }
}

impl std::error::Error for SmilesError {}
