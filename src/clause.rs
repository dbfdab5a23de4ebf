//! Clauses and CNFs.
//!
//! A [`Clause`] is a disjunction of [`Lit`]s and a [`Cnf`] is a sequence of
//! clauses together with the [`Registry`] naming their variables. Literals are
//! signed DIMACS integers, so a CNF can be serialized as-is (see
//! [`crate::dimacs`]).

use std::fmt;

use crate::registry::Registry;
use crate::types::{Lit, Var};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Clause(Vec<Lit>);

impl Clause {
    pub fn new(lits: Vec<Lit>) -> Self {
        Clause(lits)
    }

    pub fn from_dimacs(lits: impl IntoIterator<Item = i32>) -> Self {
        Clause(lits.into_iter().map(Lit::from_dimacs).collect())
    }

    pub fn unit(lit: Lit) -> Self {
        Clause(vec![lit])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lits(&self) -> &[Lit] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.0.iter().copied()
    }

    pub fn to_dimacs(&self) -> Vec<i32> {
        self.iter().map(Lit::to_dimacs).collect()
    }

    /// Sorts the literals and merges duplicates.
    pub fn normalized(mut self) -> Self {
        self.0.sort();
        self.0.dedup();
        self
    }

    /// Returns `true` if the clause contains a literal and its negation.
    ///
    /// Expects a [normalized][Clause::normalized] clause, where complementary
    /// literals are adjacent.
    pub fn is_tautology(&self) -> bool {
        self.0.windows(2).any(|w| w[0] == -w[1])
    }

    pub fn eval<F>(&self, assignment: &F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        self.iter().any(|lit| lit.eval(assignment(lit.var())))
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(lits: Vec<Lit>) -> Self {
        Clause(lits)
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        Clause(iter.into_iter().collect())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ")")
    }
}

/// A formula in conjunctive normal form.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    registry: Registry,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(registry: Registry, clauses: Vec<Clause>) -> Self {
        Self { registry, clauses }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn num_vars(&self) -> usize {
        self.registry.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Variables whose names start with `prefix`.
    pub fn aux_variables(&self, prefix: &str) -> Vec<Var> {
        self.registry
            .iter()
            .filter(|(_, name)| name.starts_with(prefix))
            .map(|(var, _)| var)
            .collect()
    }

    /// Evaluates all clauses under the given assignment.
    pub fn eval<F>(&self, assignment: &F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        self.clauses.iter().all(|c| c.eval(assignment))
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}
