use std::fmt;

/// Errors produced when compiling a SMARTS pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartsError {
    /// The pattern text was empty.
    EmptyInput,
    /// A character that cannot appear where it was found.
    UnexpectedChar { pos: usize, ch: char },
    /// The pattern ended in the middle of an atom or bond expression.
    UnexpectedEnd { pos: usize },
    /// A `[` without its closing `]`.
    UnclosedBracket { pos: usize },
    /// A ring-closure digit that was opened and never closed.
    UnclosedRing { digit: u16 },
    /// A ring closure that would join an atom to itself or duplicate a bond.
    InvalidRingBond { digit: u16, pos: usize },
    /// A parenthesis with no partner, or a branch with no atom before it.
    UnmatchedParen { pos: usize },
    /// A bond expression with no atom on one of its sides.
    DanglingBond { pos: usize },
    /// `#n` with a missing or out-of-range atomic number.
    InvalidAtomicNum { pos: usize },
    /// A `$(` recursive pattern without its closing `)`.
    UnclosedRecursive { pos: usize },
    /// A recursive pattern whose body failed to compile.
    Recursive { pos: usize, inner: Box<SmartsError> },
}

impl fmt::Display for SmartsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty SMARTS string"),
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{ch}' at position {pos}")
            }
            Self::UnexpectedEnd { pos } => write!(f, "unexpected end of SMARTS at position {pos}"),
            Self::UnclosedBracket { pos } => {
                write!(f, "unclosed bracket starting at position {pos}")
            }
            Self::UnclosedRing { digit } => write!(f, "unclosed ring {digit}"),
            Self::InvalidRingBond { digit, pos } => {
                write!(f, "invalid ring bond {digit} at position {pos}")
            }
            Self::UnmatchedParen { pos } => {
                write!(f, "unmatched parenthesis at position {pos}")
            }
            Self::DanglingBond { pos } => write!(f, "bond at position {pos} has no atom"),
            Self::InvalidAtomicNum { pos } => {
                write!(f, "invalid atomic number at position {pos}")
            }
            Self::UnclosedRecursive { pos } => {
                write!(f, "unclosed recursive SMARTS at position {pos}")
            }
            Self::Recursive { pos, inner } => {
                write!(f, "in recursive SMARTS at position {pos}: {inner}")
            }
        }
    }
}

impl std::error::Error for SmartsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Recursive { inner, .. } => Some(inner.as_ref()),
            _ => None,
        }
    }
}
