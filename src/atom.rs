/// Chirality tag carried by SMARTS atom expressions (`@`, `@@`).
///
/// Molecules read by this crate do not store stereochemistry, so the tag
/// constrains nothing during matching; it is kept so patterns that use it
/// still compile and so their expression trees stay faithful to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// No chirality constraint.
    #[default]
    None,
    /// Clockwise (`@@`) arrangement.
    Cw,
    /// Counterclockwise (`@`) arrangement.
    Ccw,
}

/// Atom of a molecule read from SMILES.
///
/// `Atom` stores what the notation says about the atom. Aromaticity comes
/// straight from the input (lowercase symbols); nothing is perceived after
/// parsing.
///
/// # Examples
///
/// ```
/// use smartstest::Atom;
///
/// let nitrogen = Atom {
///     atomic_num: 7,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(nitrogen.atomic_num, 7);
/// assert!(!nitrogen.is_aromatic);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` is the `*` dummy atom.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens on this atom (not graph nodes).
    pub hydrogen_count: u8,
    /// Whether the atom was written as aromatic.
    pub is_aromatic: bool,
}
