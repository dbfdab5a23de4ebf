//! Type-safe wrappers for Boolean variables and literals.
//!
//! Variables are 1-indexed (0 is reserved), and literals use the signed DIMACS
//! convention, so clauses can be written out without any further translation.

use std::fmt;
use std::ops::Neg;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved as the DIMACS clause terminator)
/// - Variable IDs are stable for the lifetime of the registry that issued them
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Position of the variable in a 0-indexed table.
    pub(crate) fn slot(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit::pos(self)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit::neg(self)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A signed literal: a variable or its negation.
///
/// The internal representation is the DIMACS integer itself, i.e. `+v` for the
/// positive and `-v` for the negative literal of variable `v`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Creates a literal of `var` with the given polarity.
    pub fn new(var: Var, negated: bool) -> Self {
        let v = var.id() as i32;
        Lit(if negated { -v } else { v })
    }

    pub fn pos(var: Var) -> Self {
        Self::new(var, false)
    }

    pub fn neg(var: Var) -> Self {
        Self::new(var, true)
    }

    /// Creates a literal from its DIMACS representation.
    ///
    /// # Panics
    ///
    /// Panics if `value == 0`.
    pub fn from_dimacs(value: i32) -> Self {
        assert_ne!(value, 0, "DIMACS literal must be non-zero");
        Lit(value)
    }

    /// Returns the DIMACS representation of the literal.
    pub const fn to_dimacs(self) -> i32 {
        self.0
    }

    pub fn var(self) -> Var {
        Var(self.0.unsigned_abs())
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn negate(self) -> Self {
        Lit(-self.0)
    }

    /// Evaluates the literal under the given variable value.
    pub fn eval(self, value: bool) -> bool {
        value != self.is_negated()
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Ord for Lit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.unsigned_abs(), self.is_negated()).cmp(&(other.0.unsigned_abs(), other.is_negated()))
    }
}

impl PartialOrd for Lit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.is_negated() { "~" } else { "" }, self.var())
    }
}

impl From<Var> for Lit {
    fn from(var: Var) -> Self {
        Lit::pos(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v1 = Var::new(1);
        let v2 = Var::new(2);
        assert_eq!(v1.id(), 1);
        assert_eq!(v2.id(), 2);
        assert!(v1 < v2);
    }

    #[test]
    #[should_panic(expected = "Variable IDs must be >= 1")]
    fn test_var_zero_panics() {
        Var::new(0);
    }

    #[test]
    fn test_lit_polarity() {
        let x = Var::new(3);
        assert!(x.pos().is_positive());
        assert!(x.neg().is_negated());
        assert_eq!(x.pos().var(), x);
        assert_eq!(x.neg().var(), x);
        assert_eq!(-x.pos(), x.neg());
        assert_eq!(-(-x.neg()), x.neg());
    }

    #[test]
    fn test_lit_dimacs() {
        let lit = Lit::from_dimacs(-7);
        assert_eq!(lit.var(), Var::new(7));
        assert!(lit.is_negated());
        assert_eq!(lit.to_dimacs(), -7);
        assert_eq!(Var::new(7).pos().to_dimacs(), 7);
    }

    #[test]
    fn test_lit_order() {
        let mut lits = vec![
            Lit::from_dimacs(-2),
            Lit::from_dimacs(3),
            Lit::from_dimacs(2),
            Lit::from_dimacs(-1),
        ];
        lits.sort();
        let dimacs: Vec<i32> = lits.into_iter().map(Lit::to_dimacs).collect();
        assert_eq!(dimacs, vec![-1, 2, -2, 3]);
    }

    #[test]
    fn test_lit_eval() {
        let x = Var::new(1);
        assert!(x.pos().eval(true));
        assert!(!x.pos().eval(false));
        assert!(x.neg().eval(false));
        assert!(!x.neg().eval(true));
    }

    #[test]
    fn test_display() {
        let x = Var::new(4);
        assert_eq!(x.to_string(), "x4");
        assert_eq!(x.neg().to_string(), "~x4");
    }
}
