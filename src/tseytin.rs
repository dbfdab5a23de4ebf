//! Tseytin encoding of arbitrary sub-formulas.
//!
//! Every AND/OR node is replaced by an auxiliary variable `v` constrained to
//! be equivalent to the node by the usual defining clauses:
//!
//! ```text
//! v <-> (c1 & ... & cn):   (~v | ci) for each i,   (v | ~c1 | ... | ~cn)
//! v <-> (c1 | ... | cn):   (~v | c1 | ... | cn),   (v | ~ci) for each i
//! ```
//!
//! Children are encoded first, so the defining clauses of a node only mention
//! its children's literals. A `Not` never needs a variable: it negates the
//! literal of its operand. A gate whose operands collapse to a single literal
//! is that literal.
//!
//! Before allocating a variable, the encoder consults its
//! [`SubstitutionCache`]. On a hit, the existing variable is reused and no
//! clauses are emitted, so each distinct gate is defined exactly once for the
//! whole lifetime of the encoder.
//!
//! Auxiliary variables are allocated in the target registry under the
//! transient [`TRANSIENT_PREFIX`]; the caller is expected to rename them once
//! encoding is complete.

use log::trace;

use crate::cache::{Fingerprint, Gate, SubstitutionCache};
use crate::clause::Clause;
use crate::error::Result;
use crate::formula::{Expr, Formula};
use crate::registry::Registry;
use crate::types::{Lit, Var};

/// Name prefix of auxiliary variables while encoding is in progress.
pub const TRANSIENT_PREFIX: &str = "k!";

/// An auxiliary variable together with its defining clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitute {
    pub variable: Var,
    pub gate: Gate,
    pub clauses: Vec<Clause>,
}

/// Result of encoding one formula.
#[derive(Debug, Clone)]
pub struct Encoding {
    /// Literal equivalent to the encoded formula.
    pub root: Lit,
    /// Substitutes created by this call, children before parents.
    pub substitutes: Vec<Substitute>,
}

impl Encoding {
    /// Number of defining clauses created by this call.
    pub fn num_clauses(&self) -> usize {
        self.substitutes.iter().map(|s| s.clauses.len()).sum()
    }
}

/// Defining clauses of `v <-> gate(inputs)`.
pub fn defining_clauses(gate: Gate, v: Lit, inputs: &[Lit]) -> Vec<Clause> {
    // AND and OR are dual: swap the polarity of v for OR.
    let (v, negate_inputs) = match gate {
        Gate::And => (v, false),
        Gate::Or => (-v, true),
    };
    let sign = |lit: Lit| if negate_inputs { -lit } else { lit };

    let mut clauses = Vec::with_capacity(inputs.len() + 1);
    let mut long = Vec::with_capacity(inputs.len() + 1);
    long.push(v);
    for &input in inputs {
        clauses.push(Clause::new(vec![-v, sign(input)]));
        long.push(-sign(input));
    }
    match gate {
        Gate::And => clauses.push(Clause::new(long)),
        Gate::Or => clauses.insert(0, Clause::new(long)),
    }
    clauses
}

/// Tseytin encoder bound to the registry of one transformation.
#[derive(Debug)]
pub struct TseytinEncoder<'a> {
    registry: &'a mut Registry,
    cache: SubstitutionCache,
}

impl<'a> TseytinEncoder<'a> {
    pub fn new(registry: &'a mut Registry) -> Self {
        Self {
            registry,
            cache: SubstitutionCache::new(),
        }
    }

    pub fn cache(&self) -> &SubstitutionCache {
        &self.cache
    }

    /// Encodes `formula`, returning the literal equivalent to it and the newly
    /// created substitutes.
    ///
    /// The only failure is the registry running out of fresh names.
    pub fn encode(&mut self, formula: &Formula) -> Result<Encoding> {
        let mut substitutes = Vec::new();
        let root = self.encode_node(formula, &mut substitutes)?;
        trace!("encode: {} -> {} ({} new substitutes)", formula, root, substitutes.len());
        Ok(Encoding { root, substitutes })
    }

    fn encode_node(&mut self, formula: &Formula, out: &mut Vec<Substitute>) -> Result<Lit> {
        if let Some(lit) = self.cache.get_node(formula) {
            return Ok(lit);
        }
        let lit = match formula.expr() {
            Expr::Lit(lit) => return Ok(*lit),
            Expr::Not(inner) => -self.encode_node(inner, out)?,
            Expr::And(children) => self.encode_gate(Gate::And, children, out)?,
            Expr::Or(children) => self.encode_gate(Gate::Or, children, out)?,
        };
        self.cache.insert_node(formula, lit);
        Ok(lit)
    }

    fn encode_gate(&mut self, gate: Gate, children: &[Formula], out: &mut Vec<Substitute>) -> Result<Lit> {
        let mut inputs = Vec::with_capacity(children.len());
        for child in children {
            inputs.push(self.encode_node(child, out)?);
        }
        let key = Fingerprint::new(gate, inputs);

        if let [single] = key.inputs() {
            return Ok(*single);
        }
        if let Some(lit) = self.cache.get(&key) {
            trace!("encode: reusing {} for {}", lit, key);
            return Ok(lit);
        }

        let variable = self.registry.add_fresh_boolean(TRANSIENT_PREFIX)?;
        let lit = variable.pos();
        let clauses = defining_clauses(gate, lit, key.inputs());
        trace!("encode: {} <-> {} with {} clauses", lit, key, clauses.len());
        out.push(Substitute {
            variable,
            gate,
            clauses,
        });
        self.cache.insert(key, lit);
        Ok(lit)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn dimacs(clauses: &[Clause]) -> Vec<Vec<i32>> {
        clauses.iter().map(Clause::to_dimacs).collect()
    }

    fn registry(n: usize) -> Registry {
        Registry::from_names((0..n).map(|i| format!("x{}", i + 1))).unwrap()
    }

    fn lit(x: i32) -> Lit {
        Lit::from_dimacs(x)
    }

    #[test]
    fn test_defining_clauses_and() {
        let clauses = defining_clauses(Gate::And, lit(3), &[lit(1), lit(-2)]);
        assert_eq!(dimacs(&clauses), vec![vec![-3, 1], vec![-3, -2], vec![3, -1, 2]]);
    }

    #[test]
    fn test_defining_clauses_or() {
        let clauses = defining_clauses(Gate::Or, lit(3), &[lit(1), lit(-2)]);
        assert_eq!(dimacs(&clauses), vec![vec![-3, 1, -2], vec![3, -1], vec![3, 2]]);
    }

    #[test]
    fn test_defining_clauses_empty() {
        assert_eq!(dimacs(&defining_clauses(Gate::And, lit(1), &[])), vec![vec![1]]);
        assert_eq!(dimacs(&defining_clauses(Gate::Or, lit(1), &[])), vec![vec![-1]]);
    }

    #[test]
    fn test_literals_need_no_variable() {
        let mut registry = registry(2);
        let mut encoder = TseytinEncoder::new(&mut registry);

        let f = Formula::not(Formula::not(Formula::not(Formula::var(Var::new(2)))));
        let encoding = encoder.encode(&f).unwrap();
        assert_eq!(encoding.root, lit(-2));
        assert!(encoding.substitutes.is_empty());
        drop(encoder);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_single_input_gate_collapses() {
        let mut registry = registry(1);
        let mut encoder = TseytinEncoder::new(&mut registry);

        let a = Formula::var(Var::new(1));
        let f = Formula::and([Formula::or([a.clone(), a.clone()]), a]);
        let encoding = encoder.encode(&f).unwrap();
        assert_eq!(encoding.root, lit(1));
        assert!(encoding.substitutes.is_empty());
    }

    #[test]
    fn test_encode_nested() {
        let mut registry = registry(3);
        let mut encoder = TseytinEncoder::new(&mut registry);

        // (x1 | x2) & ~x3
        let f = Formula::and([
            Formula::or([Formula::var(Var::new(1)), Formula::var(Var::new(2))]),
            Formula::not(Formula::var(Var::new(3))),
        ]);
        let encoding = encoder.encode(&f).unwrap();
        assert_eq!(encoding.root, lit(5));
        assert_eq!(encoding.substitutes.len(), 2);
        assert_eq!(encoding.num_clauses(), 6);

        let or = &encoding.substitutes[0];
        assert_eq!(or.variable, Var::new(4));
        assert_eq!(or.gate, Gate::Or);
        assert_eq!(dimacs(&or.clauses), vec![vec![-4, 1, 2], vec![4, -1], vec![4, -2]]);

        let and = &encoding.substitutes[1];
        assert_eq!(and.variable, Var::new(5));
        assert_eq!(dimacs(&and.clauses), vec![vec![-5, -3], vec![-5, 4], vec![5, 3, -4]]);

        drop(encoder);
        assert_eq!(registry.name_of(Var::new(4)), Some("k!0"));
        assert_eq!(registry.name_of(Var::new(5)), Some("k!1"));
    }

    #[test]
    fn test_cache_reuses_structure() {
        let mut registry = registry(2);
        let mut encoder = TseytinEncoder::new(&mut registry);

        let a = Formula::var(Var::new(1));
        let b = Formula::var(Var::new(2));
        let first = Formula::or([a.clone(), b.clone()]);
        // Structurally equal, different node, different operand order.
        let second = Formula::or([b, a]);

        let e1 = encoder.encode(&first).unwrap();
        let e2 = encoder.encode(&second).unwrap();
        assert_eq!(e1.root, e2.root);
        assert_eq!(e1.substitutes.len(), 1);
        assert!(e2.substitutes.is_empty());
        assert_eq!(encoder.cache().hits(), 1);
        assert_eq!(encoder.cache().misses(), 1);
    }

    #[test]
    fn test_cache_negated_reuse() {
        let mut registry = registry(2);
        let mut encoder = TseytinEncoder::new(&mut registry);

        let and = Formula::and([Formula::var(Var::new(1)), Formula::var(Var::new(2))]);
        let e1 = encoder.encode(&and).unwrap();
        let e2 = encoder.encode(&Formula::not(and.clone())).unwrap();
        assert_eq!(e2.root, -e1.root);
        assert!(e2.substitutes.is_empty());
    }

    #[test]
    fn test_encoding_is_equivalent() {
        let mut registry = registry(3);
        let mut encoder = TseytinEncoder::new(&mut registry);

        let x = |i: u32| Formula::var(Var::new(i));
        let f = Formula::or([
            Formula::and([x(1), Formula::not(x(2))]),
            Formula::not(Formula::or([x(3), x(1)])),
        ]);
        let encoding = encoder.encode(&f).unwrap();
        let root = encoding.root;
        let clauses: Vec<Clause> = encoding.substitutes.iter().flat_map(|s| s.clauses.clone()).collect();
        let aux: Vec<Var> = encoding.substitutes.iter().map(|s| s.variable).collect();

        // For every assignment of the inputs, the defining clauses force each
        // auxiliary variable, and the root literal agrees with the formula.
        for bits in 0u32..8 {
            let input = |v: Var| bits & (1 << (v.id() - 1)) != 0;
            let mut models = 0;
            for aux_bits in 0u32..(1 << aux.len()) {
                let assignment = |v: Var| match aux.iter().position(|&a| a == v) {
                    Some(i) => aux_bits & (1 << i) != 0,
                    None => input(v),
                };
                if clauses.iter().all(|c| c.eval(&assignment)) {
                    models += 1;
                    assert_eq!(root.eval(assignment(root.var())), f.eval(&input));
                }
            }
            assert_eq!(models, 1);
        }
    }
}
