use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Atom(AtomToken),
    Bond { bond: BondToken, pos: usize },
    Ring { digit: u16, pos: usize },
    Open(usize),
    Close(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtomToken {
    /// `None` for the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// Explicit count from a bracket atom; `None` for organic-subset atoms.
    pub hcount: Option<u8>,
    pub charge: i8,
}

impl AtomToken {
    fn bare(element: Option<Element>, is_aromatic: bool) -> Self {
        Self {
            element,
            is_aromatic,
            isotope: 0,
            hcount: None,
            charge: 0,
        }
    }
}

/// Bond symbols. `/` and `\` only carry stereo, which is not kept, so they
/// read as single bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
}

/// Aromatic symbols accepted inside brackets; two-letter forms first.
const BRACKET_AROMATICS: &[(&str, Element)] = &[
    ("se", Element::SE),
    ("te", Element::TE),
    ("as", Element::AS),
    ("b", Element::B),
    ("c", Element::C),
    ("n", Element::N),
    ("o", Element::O),
    ("p", Element::P),
    ("s", Element::S),
];

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
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

    fn next_token(&mut self) -> Result<Option<Token>, SmilesError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        self.pos += 1;

        let token = match ch {
            '[' => Token::Atom(self.bracket_atom(start)?),
            '*' => Token::Atom(AtomToken::bare(None, false)),
            'B' if self.eat('r') => Token::Atom(AtomToken::bare(Some(Element::BR), false)),
            'C' if self.eat('l') => Token::Atom(AtomToken::bare(Some(Element::CL), false)),
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => {
                let element = Element::from_symbol(&ch.to_string());
                Token::Atom(AtomToken::bare(element, false))
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                let element = Element::from_symbol(&ch.to_ascii_uppercase().to_string());
                Token::Atom(AtomToken::bare(element, true))
            }
            '-' | '/' | '\\' => Token::Bond {
                bond: BondToken::Single,
                pos: start,
            },
            '=' => Token::Bond {
                bond: BondToken::Double,
                pos: start,
            },
            '#' => Token::Bond {
                bond: BondToken::Triple,
                pos: start,
            },
            ':' => Token::Bond {
                bond: BondToken::Aromatic,
                pos: start,
            },
            '(' => Token::Open(start),
            ')' => Token::Close(start),
            '.' => Token::Dot(start),
            '%' => {
                let (Some(d1), Some(d2)) = (
                    self.peek().and_then(|c| c.to_digit(10)),
                    self.peek_at(1).and_then(|c| c.to_digit(10)),
                ) else {
                    return Err(SmilesError::UnexpectedChar { pos: start, ch });
                };
                self.pos += 2;
                Token::Ring {
                    digit: (d1 * 10 + d2) as u16,
                    pos: start,
                }
            }
            d if d.is_ascii_digit() => Token::Ring {
                digit: d as u16 - '0' as u16,
                pos: start,
            },
            ch => return Err(SmilesError::UnexpectedChar { pos: start, ch }),
        };
        Ok(Some(token))
    }

    /// Reads `[isotope? symbol chirality? hcount? charge? class?]`; the
    /// opening bracket has already been consumed.
    fn bracket_atom(&mut self, start: usize) -> Result<AtomToken, SmilesError> {
        let isotope = match self.number() {
            Some(n) => u16::try_from(n).map_err(|_| SmilesError::InvalidIsotope { pos: start })?,
            None => 0,
        };
        let (element, is_aromatic) = self.bracket_symbol(start)?;

        // Chirality is accepted and dropped.
        if self.eat('@') {
            self.eat('@');
        }

        let hcount = if self.eat('H') {
            self.peek()
                .and_then(|c| c.to_digit(10))
                .map(|d| {
                    self.pos += 1;
                    d as u8
                })
                .unwrap_or(1)
        } else {
            0
        };

        let charge = self.charge(start)?;

        if self.eat(':') {
            self.number();
        }

        if !self.eat(']') {
            return Err(SmilesError::UnclosedBracket { pos: start });
        }

        Ok(AtomToken {
            element,
            is_aromatic,
            isotope,
            hcount: Some(hcount),
            charge,
        })
    }

    fn bracket_symbol(&mut self, start: usize) -> Result<(Option<Element>, bool), SmilesError> {
        if self.eat('*') {
            return Ok((None, false));
        }

        for &(sym, element) in BRACKET_AROMATICS {
            let end = self.pos + sym.len();
            if end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(sym.chars()) {
                self.pos = end;
                return Ok((Some(element), true));
            }
        }

        let Some(first) = self.peek().filter(|c| c.is_ascii_uppercase()) else {
            return match self.peek() {
                Some(ch) => Err(SmilesError::InvalidElement {
                    pos: self.pos,
                    text: ch.to_string(),
                }),
                None => Err(SmilesError::UnclosedBracket { pos: start }),
            };
        };

        if let Some(second) = self.peek_at(1).filter(|c| c.is_ascii_lowercase()) {
            if let Some(e) = Element::from_symbol(&format!("{first}{second}")) {
                self.pos += 2;
                return Ok((Some(e), false));
            }
        }
        match Element::from_symbol(&first.to_string()) {
            Some(e) => {
                self.pos += 1;
                Ok((Some(e), false))
            }
            None => Err(SmilesError::InvalidElement {
                pos: self.pos,
                text: first.to_string(),
            }),
        }
    }

    /// `+`, `++`, `+2`, `-`, `--`, `-3`; nothing means neutral.
    fn charge(&mut self, start: usize) -> Result<i8, SmilesError> {
        let sign: i8 = match self.peek() {
            Some('+') => 1,
            Some('-') => -1,
            _ => return Ok(0),
        };
        let sym = if sign > 0 { '+' } else { '-' };
        self.pos += 1;

        let magnitude = if let Some(n) = self.number() {
            i8::try_from(n).map_err(|_| SmilesError::InvalidCharge { pos: start })?
        } else {
            let mut count: i8 = 1;
            while self.eat(sym) {
                count = count
                    .checked_add(1)
                    .ok_or(SmilesError::InvalidCharge { pos: start })?;
            }
            count
        };
        Ok(sign * magnitude)
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.pos += 1;
        }
        value
    }
}
