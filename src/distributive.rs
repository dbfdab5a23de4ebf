//! Clausification by distributive expansion.
//!
//! The expander pushes negations down to the literals (De Morgan) and
//! distributes OR over AND, producing the exact CNF of a formula. Since this
//! can blow up exponentially, the expansion is bounded by [`Thresholds`] and
//! aborts with [`Overflow`] as soon as an intermediate result exceeds them.
//!
//! # Threshold semantics
//!
//! - A limit of `Count(0)` means "never expand": [`DistributiveExpander::expand`]
//!   overflows immediately, even for a formula that is already a clause.
//! - Otherwise, a literal or a disjunction of literals is returned as its single
//!   clause, whatever the limits.
//! - Otherwise, the number of clauses of every intermediate clause set and the
//!   width of every produced clause are checked against the limits. A product is
//!   counted as it is built, after tautologies and duplicates are dropped, so it
//!   is abandoned as soon as it really exceeds the limit.
//!
//! Produced clauses are normalized (sorted, duplicate literals merged),
//! tautological clauses are dropped and identical clauses are kept once. None
//! of this depends on the limits, so raising a limit never turns a successful
//! expansion into an overflow.

use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};

use crate::clause::Clause;
use crate::formula::{Expr, Formula};

/// An upper bound that may be absent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Limit {
    Count(usize),
    #[default]
    Unbounded,
}

impl Limit {
    pub fn is_zero(self) -> bool {
        self == Limit::Count(0)
    }

    /// Returns `true` if `value` is above the limit.
    pub fn exceeded_by(self, value: usize) -> bool {
        match self {
            Limit::Count(max) => value > max,
            Limit::Unbounded => false,
        }
    }
}

impl From<usize> for Limit {
    fn from(value: usize) -> Self {
        Limit::Count(value)
    }
}

impl From<Option<usize>> for Limit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Limit::Unbounded, Limit::Count)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Count(n) => write!(f, "{}", n),
            Limit::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Size bounds for the distributive expansion of one formula.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Thresholds {
    pub max_clauses: Limit,
    pub max_literals_per_clause: Limit,
}

impl Thresholds {
    /// Never overflow.
    pub const UNBOUNDED: Thresholds = Thresholds {
        max_clauses: Limit::Unbounded,
        max_literals_per_clause: Limit::Unbounded,
    };

    /// Always overflow.
    pub const ZERO: Thresholds = Thresholds {
        max_clauses: Limit::Count(0),
        max_literals_per_clause: Limit::Count(0),
    };

    pub fn new(max_clauses: Limit, max_literals_per_clause: Limit) -> Self {
        Self {
            max_clauses,
            max_literals_per_clause,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max_clauses.is_zero() || self.max_literals_per_clause.is_zero()
    }
}

/// Signal raised when a distributive expansion exceeds its [`Thresholds`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Overflow {
    Clauses(usize),
    Literals(usize),
    Disabled,
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overflow::Clauses(n) => write!(f, "too many clauses ({})", n),
            Overflow::Literals(n) => write!(f, "clause too wide ({} literals)", n),
            Overflow::Disabled => write!(f, "distributive expansion disabled"),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct DistributiveExpander {
    thresholds: Thresholds,
}

impl DistributiveExpander {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Expands `formula` into clauses, or reports an [`Overflow`].
    pub fn expand(&self, formula: &Formula) -> Result<Vec<Clause>, Overflow> {
        if self.thresholds.is_zero() {
            return Err(Overflow::Disabled);
        }
        if let Some(lits) = formula.as_clause() {
            trace!("expand: {} is already a clause", formula);
            return Ok(vec![Clause::new(lits).normalized()]);
        }
        let result = self.clauses(formula, false);
        match &result {
            Ok(clauses) => trace!("expand: {} -> {} clauses", formula, clauses.len()),
            Err(overflow) => debug!("expand: overflow ({}) for {}", overflow, formula),
        }
        result
    }

    fn check_clauses(&self, count: usize) -> Result<(), Overflow> {
        if self.thresholds.max_clauses.exceeded_by(count) {
            return Err(Overflow::Clauses(count));
        }
        Ok(())
    }

    fn check_literals(&self, width: usize) -> Result<(), Overflow> {
        if self.thresholds.max_literals_per_clause.exceeded_by(width) {
            return Err(Overflow::Literals(width));
        }
        Ok(())
    }

    /// Clauses of `formula`, or of its negation if `negated` is set.
    fn clauses(&self, formula: &Formula, negated: bool) -> Result<Vec<Clause>, Overflow> {
        match formula.expr() {
            Expr::Lit(lit) => {
                let lit = if negated { -*lit } else { *lit };
                Ok(vec![Clause::unit(lit)])
            }
            Expr::Not(inner) => self.clauses(inner, !negated),
            Expr::And(children) if !negated => self.conjunction(children, negated),
            Expr::Or(children) if negated => self.conjunction(children, negated),
            Expr::And(children) | Expr::Or(children) => self.disjunction(children, negated),
        }
    }

    fn conjunction(&self, children: &[Formula], negated: bool) -> Result<Vec<Clause>, Overflow> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for child in children {
            for clause in self.clauses(child, negated)? {
                if seen.insert(clause.clone()) {
                    result.push(clause);
                }
            }
            self.check_clauses(result.len())?;
        }
        Ok(result)
    }

    fn disjunction(&self, children: &[Formula], negated: bool) -> Result<Vec<Clause>, Overflow> {
        // The empty disjunction (false) is the single empty clause.
        let mut acc = vec![Clause::default()];
        for child in children {
            let rhs = self.clauses(child, negated)?;

            let mut seen = HashSet::new();
            let mut product = Vec::new();
            for a in &acc {
                for b in &rhs {
                    let merged: Clause = a.iter().chain(b.iter()).collect::<Clause>().normalized();
                    if merged.is_tautology() {
                        continue;
                    }
                    self.check_literals(merged.len())?;
                    if seen.insert(merged.clone()) {
                        product.push(merged);
                        self.check_clauses(product.len())?;
                    }
                }
            }
            acc = product;

            // Every combination was a tautology: the disjunction is true.
            if acc.is_empty() {
                break;
            }
        }
        Ok(acc)
    }
}
