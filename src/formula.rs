//! Immutable propositional formulas with shared sub-trees.
//!
//! A [`Formula`] is a cheap handle (`Rc`) to an [`Expr`] node. Cloning a
//! formula never copies the tree, so the same sub-formula may be referenced by
//! several parents. Nothing in this crate mutates a node after construction:
//! transformations always produce new formulas (or clauses).
//!
//! ```
//! use cnf_rs::formula::Formula;
//! use cnf_rs::types::Var;
//!
//! let a = Formula::var(Var::new(1));
//! let b = Formula::var(Var::new(2));
//! let a_or_b = Formula::or([a.clone(), b]);
//! let f = Formula::and([a_or_b.clone(), Formula::and([Formula::not(a), a_or_b])]);
//! assert_eq!(f.to_string(), "((x1 | x2) & (~x1 & (x1 | x2)))");
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::types::{Lit, Var};

/// Node of a formula tree.
///
/// An empty `And` is the constant true, an empty `Or` the constant false.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Lit(Lit),
    Not(Formula),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Formula(Rc<Expr>);

impl Formula {
    pub fn new(expr: Expr) -> Self {
        Formula(Rc::new(expr))
    }

    pub fn lit(lit: Lit) -> Self {
        Self::new(Expr::Lit(lit))
    }

    pub fn var(var: Var) -> Self {
        Self::lit(var.pos())
    }

    pub fn not(inner: Formula) -> Self {
        Self::new(Expr::Not(inner))
    }

    pub fn and(children: impl IntoIterator<Item = Formula>) -> Self {
        Self::new(Expr::And(children.into_iter().collect()))
    }

    pub fn or(children: impl IntoIterator<Item = Formula>) -> Self {
        Self::new(Expr::Or(children.into_iter().collect()))
    }

    /// Builds the clause `l1 | ... | ln` from DIMACS literals.
    pub fn clause(lits: impl IntoIterator<Item = i32>) -> Self {
        Self::or(lits.into_iter().map(|l| Self::lit(Lit::from_dimacs(l))))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    /// Returns `true` if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Formula) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared node, usable as an identity key while the node is alive.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Children of a top-level `And`, if this formula is one.
    pub fn conjuncts(&self) -> Option<&[Formula]> {
        match self.expr() {
            Expr::And(children) => Some(children),
            _ => None,
        }
    }

    /// Returns the literal if the formula is a (possibly negated) literal.
    pub fn as_literal(&self) -> Option<Lit> {
        match self.expr() {
            Expr::Lit(lit) => Some(*lit),
            Expr::Not(inner) => inner.as_literal().map(Lit::negate),
            _ => None,
        }
    }

    /// Returns the literals if the formula is a single literal or a disjunction of literals.
    pub fn as_clause(&self) -> Option<Vec<Lit>> {
        if let Some(lit) = self.as_literal() {
            return Some(vec![lit]);
        }
        match self.expr() {
            Expr::Or(children) => children.iter().map(Formula::as_literal).collect(),
            _ => None,
        }
    }

    /// All variables occurring in the formula, sorted.
    pub fn variables(&self) -> Vec<Var> {
        let mut vars = BTreeSet::new();
        let mut visited = HashSet::new();
        self.collect_variables(&mut vars, &mut visited);
        vars.into_iter().collect()
    }

    fn collect_variables(&self, vars: &mut BTreeSet<Var>, visited: &mut HashSet<usize>) {
        if !visited.insert(self.addr()) {
            return;
        }
        match self.expr() {
            Expr::Lit(lit) => {
                vars.insert(lit.var());
            }
            Expr::Not(inner) => inner.collect_variables(vars, visited),
            Expr::And(children) | Expr::Or(children) => {
                for child in children {
                    child.collect_variables(vars, visited);
                }
            }
        }
    }

    /// Number of distinct nodes (shared nodes are counted once).
    pub fn size(&self) -> usize {
        let mut visited = HashSet::new();
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            if !visited.insert(f.addr()) {
                continue;
            }
            match f.expr() {
                Expr::Lit(_) => {}
                Expr::Not(inner) => stack.push(inner),
                Expr::And(children) | Expr::Or(children) => stack.extend(children),
            }
        }
        visited.len()
    }

    /// Nesting depth: 1 for a literal, one more than the deepest child otherwise.
    ///
    /// Computed without recursion, so it is safe to call on formulas too deep
    /// for the recursive algorithms of this crate.
    pub fn depth(&self) -> usize {
        let mut depths: HashMap<usize, usize> = HashMap::new();
        let mut stack = vec![(self, false)];
        while let Some((f, expanded)) = stack.pop() {
            if depths.contains_key(&f.addr()) {
                continue;
            }
            let children: &[Formula] = match f.expr() {
                Expr::Lit(_) => &[],
                Expr::Not(inner) => std::slice::from_ref(inner),
                Expr::And(children) | Expr::Or(children) => children,
            };
            if expanded {
                let deepest = children
                    .iter()
                    .map(|c| depths.get(&c.addr()).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                depths.insert(f.addr(), deepest + 1);
            } else {
                stack.push((f, true));
                stack.extend(children.iter().map(|c| (c, false)));
            }
        }
        depths.get(&self.addr()).copied().unwrap_or(0)
    }

    /// Evaluates the formula under the given assignment.
    pub fn eval<F>(&self, assignment: &F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        match self.expr() {
            Expr::Lit(lit) => lit.eval(assignment(lit.var())),
            Expr::Not(inner) => !inner.eval(assignment),
            Expr::And(children) => children.iter().all(|c| c.eval(assignment)),
            Expr::Or(children) => children.iter().any(|c| c.eval(assignment)),
        }
    }

    /// Checks that every variable of the formula is known to `registry`.
    pub fn check_variables(&self, registry: &Registry) -> Result<()> {
        match self.variables().into_iter().find(|&v| !registry.contains(v)) {
            Some(var) => Err(Error::UnknownVariable(var)),
            None => Ok(()),
        }
    }

    /// Renders the formula using the variable names from `registry`.
    pub fn display<'a>(&'a self, registry: &'a Registry) -> impl fmt::Display + 'a {
        Named {
            formula: self,
            registry,
        }
    }

    fn fmt_with<N>(&self, f: &mut fmt::Formatter<'_>, name: &N) -> fmt::Result
    where
        N: Fn(&mut fmt::Formatter<'_>, Var) -> fmt::Result,
    {
        let join = |f: &mut fmt::Formatter<'_>, children: &[Formula], op: &str, empty: &str| {
            if children.is_empty() {
                return write!(f, "{}", empty);
            }
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                child.fmt_with(f, name)?;
            }
            write!(f, ")")
        };
        match self.expr() {
            Expr::Lit(lit) => {
                if lit.is_negated() {
                    write!(f, "~")?;
                }
                name(f, lit.var())
            }
            Expr::Not(inner) => {
                write!(f, "~")?;
                inner.fmt_with(f, name)
            }
            Expr::And(children) => join(f, children, "&", "true"),
            Expr::Or(children) => join(f, children, "|", "false"),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formula({})", self)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, &|f: &mut fmt::Formatter<'_>, v: Var| write!(f, "{}", v))
    }
}

struct Named<'a> {
    formula: &'a Formula,
    registry: &'a Registry,
}

impl fmt::Display for Named<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.formula.fmt_with(f, &|f: &mut fmt::Formatter<'_>, v: Var| match self.registry.name_of(v) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", v),
        })
    }
}

impl From<Lit> for Formula {
    fn from(lit: Lit) -> Self {
        Formula::lit(lit)
    }
}

impl From<Var> for Formula {
    fn from(var: Var) -> Self {
        Formula::var(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> (Formula, Formula, Formula) {
        (
            Formula::var(Var::new(1)),
            Formula::var(Var::new(2)),
            Formula::var(Var::new(3)),
        )
    }

    #[test]
    fn test_literal_and_clause_views() {
        let (a, b, _) = vars();
        assert_eq!(a.as_literal(), Some(Var::new(1).pos()));
        assert_eq!(Formula::not(Formula::not(a.clone())).as_literal(), Some(Var::new(1).pos()));
        assert_eq!(Formula::not(a.clone()).as_literal(), Some(Var::new(1).neg()));

        let clause = Formula::or([a.clone(), Formula::not(b.clone())]);
        assert_eq!(clause.as_clause(), Some(vec![Var::new(1).pos(), Var::new(2).neg()]));
        assert_eq!(Formula::and([a, b]).as_clause(), None);
        assert_eq!(Formula::or([]).as_clause(), Some(vec![]));
    }

    #[test]
    fn test_sharing_and_size() {
        let (a, b, c) = vars();
        let shared = Formula::or([a.clone(), b.clone()]);
        let f = Formula::and([shared.clone(), Formula::and([c, shared.clone()])]);

        // f, shared, inner and, a, b, c
        assert_eq!(f.size(), 6);
        let conjuncts = f.conjuncts().unwrap();
        assert!(conjuncts[0].ptr_eq(&shared));
        assert!(!Formula::or([a, b]).ptr_eq(&shared));
    }

    #[test]
    fn test_structural_equality() {
        let (a, b, _) = vars();
        let f = Formula::or([a.clone(), b.clone()]);
        let g = Formula::or([a.clone(), b.clone()]);
        let h = Formula::or([b, a]);
        assert_eq!(f, g);
        assert_ne!(f, h);
    }

    #[test]
    fn test_depth() {
        let (a, b, c) = vars();
        assert_eq!(a.depth(), 1);
        assert_eq!(Formula::and([]).depth(), 1);
        let shared = Formula::or([a.clone(), Formula::not(b)]);
        let f = Formula::and([a, shared.clone(), Formula::or([c, shared])]);
        assert_eq!(f.depth(), 5);
    }

    #[test]
    fn test_depth_of_long_chain() {
        let mut f = Formula::var(Var::new(1));
        for i in 0..10_000 {
            f = if i % 2 == 0 {
                Formula::and([f, Formula::var(Var::new(2))])
            } else {
                Formula::or([Formula::var(Var::new(3)), f])
            };
        }
        assert_eq!(f.depth(), 10_001);
        // Unwind the chain iteratively, dropping it recursively would need a deep stack.
        while let Expr::And(children) | Expr::Or(children) = f.expr() {
            let next = children.iter().find(|c| !matches!(c.expr(), Expr::Lit(_))).cloned();
            match next {
                Some(next) => f = next,
                None => break,
            }
        }
    }

    #[test]
    fn test_variables() {
        let f = Formula::and([Formula::clause([3, -1]), Formula::not(Formula::clause([1, 2]))]);
        assert_eq!(f.variables(), vec![Var::new(1), Var::new(2), Var::new(3)]);
    }

    #[test]
    fn test_eval() {
        let (a, b, c) = vars();
        let f = Formula::and([Formula::or([a, b]), Formula::not(c)]);
        assert!(f.eval(&|v: Var| v.id() == 1));
        assert!(!f.eval(&|v: Var| v.id() != 2));
        assert!(!f.eval(&|_| false));
        assert!(Formula::and([]).eval(&|_| false));
        assert!(!Formula::or([]).eval(&|_| true));
    }

    #[test]
    fn test_check_variables() {
        let registry = Registry::from_names(["A", "B"]).unwrap();
        assert_eq!(Formula::clause([1, -2]).check_variables(&registry), Ok(()));
        assert_eq!(
            Formula::clause([1, -3]).check_variables(&registry),
            Err(Error::UnknownVariable(Var::new(3)))
        );
    }

    #[test]
    fn test_display_named() {
        let registry = Registry::from_names(["A", "B"]).unwrap();
        let f = Formula::and([Formula::clause([1, -2]), Formula::not(Formula::and([]))]);
        assert_eq!(f.to_string(), "((x1 | ~x2) & ~true)");
        assert_eq!(f.display(&registry).to_string(), "((A | ~B) & ~true)");
    }
}
