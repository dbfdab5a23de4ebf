//! Substitution cache for the Tseytin encoder.
//!
//! Maps the structural [`Fingerprint`] of an encoded gate to the literal of its
//! auxiliary variable, so that identical sub-formulas (within one conjunct or
//! across conjuncts) share a single variable and a single set of defining
//! clauses.
//!
//! A fingerprint is computed *after* the children have been encoded: it is the
//! gate kind together with the children's literals. By induction, structurally
//! identical sub-formulas have identical child literals and thus equal
//! fingerprints. The child literals are sorted and deduplicated, so the
//! comparison is insensitive to the order (and repetition) of AND/OR operands.
//!
//! In addition to the structural map, the cache remembers the literal of every
//! visited node by address. This is a fast path for sub-formulas that are
//! shared by reference. The cache holds a handle to each such node, so an
//! address cannot be reused by another node while the cache is alive.

use std::collections::HashMap;
use std::fmt;

use crate::formula::Formula;
use crate::types::Lit;

/// Kind of gate defined by an auxiliary variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Gate {
    And,
    Or,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::And => write!(f, "AND"),
            Gate::Or => write!(f, "OR"),
        }
    }
}

/// Structural key of an encoded gate.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Fingerprint {
    gate: Gate,
    inputs: Vec<Lit>,
}

impl Fingerprint {
    pub fn new(gate: Gate, inputs: impl IntoIterator<Item = Lit>) -> Self {
        let mut inputs: Vec<Lit> = inputs.into_iter().collect();
        inputs.sort();
        inputs.dedup();
        Self { gate, inputs }
    }

    /// Canonical (sorted, deduplicated) input literals.
    pub fn inputs(&self) -> &[Lit] {
        &self.inputs
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.gate)?;
        for (i, lit) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ")")
    }
}

/// A cache of substitutes, scoped to one transformation.
#[derive(Debug, Default)]
pub struct SubstitutionCache {
    map: HashMap<Fingerprint, Lit>,
    nodes: HashMap<usize, (Formula, Lit)>,
    hits: usize,
    misses: usize,
}

impl SubstitutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of lookups (structural or by address) that found a substitute.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of structural lookups that found nothing.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Looks up a fingerprint.
    pub fn get(&mut self, key: &Fingerprint) -> Option<Lit> {
        match self.map.get(key) {
            Some(&lit) => {
                self.hits += 1;
                Some(lit)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: Fingerprint, lit: Lit) {
        self.map.insert(key, lit);
    }

    /// Looks up an already encoded node by identity.
    pub fn get_node(&mut self, node: &Formula) -> Option<Lit> {
        let lit = self.nodes.get(&node.addr()).map(|&(_, lit)| lit);
        if lit.is_some() {
            self.hits += 1;
        }
        lit
    }

    pub fn insert_node(&mut self, node: &Formula, lit: Lit) {
        self.nodes.insert(node.addr(), (node.clone(), lit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Var;

    fn lit(x: i32) -> Lit {
        Lit::from_dimacs(x)
    }

    #[test]
    fn test_fingerprint_canonical() {
        let f = Fingerprint::new(Gate::Or, [lit(2), lit(-1), lit(2)]);
        let g = Fingerprint::new(Gate::Or, [lit(-1), lit(2)]);
        assert_eq!(f, g);
        assert_eq!(f.inputs(), &[lit(-1), lit(2)]);
        assert_ne!(f, Fingerprint::new(Gate::And, [lit(-1), lit(2)]));
        assert_ne!(f, Fingerprint::new(Gate::Or, [lit(1), lit(2)]));
        assert_eq!(f.to_string(), "OR(~x1, x2)");
    }

    #[test]
    fn test_cache_basic() {
        let mut cache = SubstitutionCache::new();
        let key = Fingerprint::new(Gate::And, [lit(1), lit(2)]);
        let v = Var::new(3).pos();

        assert_eq!(cache.get(&key), None);
        cache.insert(key.clone(), v);
        assert_eq!(cache.get(&key), Some(v));
        assert_eq!(cache.get(&Fingerprint::new(Gate::And, [lit(2), lit(1)])), Some(v));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_cache_nodes() {
        let mut cache = SubstitutionCache::new();
        let node = Formula::or([Formula::clause([1]), Formula::clause([2])]);
        let twin = Formula::or([Formula::clause([1]), Formula::clause([2])]);

        assert_eq!(cache.get_node(&node), None);
        cache.insert_node(&node, lit(-4));
        assert_eq!(cache.get_node(&node.clone()), Some(lit(-4)));
        assert_eq!(cache.get_node(&twin), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 0);
    }
}
