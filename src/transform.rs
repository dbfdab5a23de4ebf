//! Hybrid CNF transformation.
//!
//! [`Transformer::transform`] clausifies a proto-CNF, i.e. a top-level AND of
//! arbitrary sub-formulas ("conjuncts"). Each conjunct goes through two states:
//!
//! 1. **Distributive**: the [`DistributiveExpander`] tries to expand the
//!    conjunct within the configured [`Thresholds`]. On success, its clauses
//!    are taken as they are.
//! 2. **Tseytin fallback**: on [`Overflow`][crate::distributive::Overflow], the
//!    conjunct is handed to the [`TseytinEncoder`], which returns the literal
//!    equivalent to the conjunct plus the defining clauses of any auxiliary
//!    variable it had to create. The literal is asserted by a unit clause.
//!
//! One encoder (and thus one substitution cache) is shared by all conjuncts of
//! a call, so a sub-formula occurring in several conjuncts is defined once.
//! Nothing is shared between calls.
//!
//! Finally, auxiliary variables are renamed from their transient names to
//! `aux_prefix + N` (the smallest free `N` in the caller's registry), and the
//! clauses are assembled in a fixed order: distributive clauses by conjunct,
//! then defining clauses by allocation order, then the unit clauses. A clause
//! that was already emitted is skipped.
//!
//! The two extremes are available as [`TransformKind::Distributive`] (never
//! overflow) and [`TransformKind::Tseytin`] (always overflow).
//!
//! # Example
//!
//! ```
//! use cnf_rs::formula::Formula;
//! use cnf_rs::registry::Registry;
//! use cnf_rs::transform::TransformKind;
//!
//! let registry = Registry::from_names(["A", "B"]).unwrap();
//! let a_or_b = Formula::clause([1, 2]);
//! let f = Formula::and([a_or_b.clone(), Formula::and([Formula::clause([-1]), a_or_b])]);
//!
//! let result = TransformKind::Distributive.transform(&f, &registry).unwrap();
//! assert_eq!(result.cnf.num_clauses(), 2);
//! assert_eq!(result.stats.tseytin_clause_count, 0);
//!
//! let result = TransformKind::Tseytin.transform(&f, &registry).unwrap();
//! assert_eq!(result.stats.tseytin_constraint_count, 2);
//! assert_eq!(result.stats.aux_variable_count, 2);
//! ```

use std::collections::HashSet;
use std::fmt;

use log::{debug, info};

use crate::clause::{Clause, Cnf};
use crate::distributive::{DistributiveExpander, Limit, Thresholds};
use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::registry::Registry;
use crate::tseytin::{Substitute, TseytinEncoder};
use crate::types::Lit;

/// Default name prefix of auxiliary variables in the output registry.
pub const DEFAULT_AUX_PREFIX: &str = "__temp__";

/// Default bound on the nesting depth of an input formula.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    pub thresholds: Thresholds,
    pub aux_prefix: String,
    /// Deepest accepted input, see [`Formula::depth`].
    pub max_depth: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::UNBOUNDED,
            aux_prefix: DEFAULT_AUX_PREFIX.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TransformConfig {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_max_clauses(mut self, max_clauses: Limit) -> Self {
        self.thresholds.max_clauses = max_clauses;
        self
    }

    pub fn with_max_literals(mut self, max_literals_per_clause: Limit) -> Self {
        self.thresholds.max_literals_per_clause = max_literals_per_clause;
        self
    }

    /// Sets the name prefix of auxiliary variables.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` is empty.
    pub fn with_aux_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        assert!(!prefix.is_empty(), "Auxiliary prefix must not be empty");
        self.aux_prefix = prefix;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Named operating points of the transformation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransformKind {
    /// Pure distributive expansion, exponential in the worst case.
    Distributive,
    /// Tseytin encoding of every conjunct, linear size.
    Tseytin,
    /// Distributive expansion within thresholds, Tseytin fallback otherwise.
    Hybrid(Thresholds),
}

impl TransformKind {
    pub fn thresholds(&self) -> Thresholds {
        match self {
            TransformKind::Distributive => Thresholds::UNBOUNDED,
            TransformKind::Tseytin => Thresholds::ZERO,
            TransformKind::Hybrid(thresholds) => *thresholds,
        }
    }

    pub fn config(&self) -> TransformConfig {
        TransformConfig::default().with_thresholds(self.thresholds())
    }

    pub fn transform(&self, formula: &Formula, registry: &Registry) -> Result<Transformation> {
        Transformer::new(self.config()).transform(formula, registry)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Distributive => write!(f, "distributive"),
            TransformKind::Tseytin => write!(f, "tseytin"),
            TransformKind::Hybrid(t) => write!(f, "hybrid(clauses={}, literals={})", t.max_clauses, t.max_literals_per_clause),
        }
    }
}

/// Statistics of one transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Conjuncts clausified by distributive expansion.
    pub distributive_constraint_count: usize,
    /// Conjuncts that fell back to the Tseytin encoding.
    pub tseytin_constraint_count: usize,
    /// Clauses emitted for distributively expanded conjuncts.
    pub distributive_clause_count: usize,
    /// Clauses emitted by the Tseytin path (defining and unit clauses).
    pub tseytin_clause_count: usize,
    /// Auxiliary variables added to the registry.
    pub aux_variable_count: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distributive: {} constraints / {} clauses, tseytin: {} constraints / {} clauses / {} variables, cache: {} hits / {} misses",
            self.distributive_constraint_count,
            self.distributive_clause_count,
            self.tseytin_constraint_count,
            self.tseytin_clause_count,
            self.aux_variable_count,
            self.cache_hits,
            self.cache_misses,
        )
    }
}

/// Output of [`Transformer::transform`].
#[derive(Debug, Clone)]
pub struct Transformation {
    pub cnf: Cnf,
    pub stats: TransformStats,
}

#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transforms the proto-CNF `formula` over the variables of `registry`
    /// into an equisatisfiable CNF.
    ///
    /// The caller's registry is left untouched; the output CNF carries a copy
    /// extended by the auxiliary variables.
    ///
    /// Expansion and encoding recurse along the formula, so the stack needed
    /// grows with its nesting depth. Formulas deeper than
    /// [`TransformConfig::max_depth`] are rejected with
    /// [`Error::MalformedInput`] before any other work is done. Raise the bound
    /// only together with the stack size of the calling thread.
    pub fn transform(&self, formula: &Formula, registry: &Registry) -> Result<Transformation> {
        let depth = formula.depth();
        if depth > self.config.max_depth {
            return Err(Error::MalformedInput(format!(
                "formula nesting depth {} exceeds the limit of {}",
                depth, self.config.max_depth
            )));
        }
        let conjuncts = formula
            .conjuncts()
            .ok_or_else(|| Error::MalformedInput(format!("expected a top-level AND, got {}", formula)))?;
        formula.check_variables(registry)?;

        let expander = DistributiveExpander::new(self.config.thresholds);
        let mut stats = TransformStats::default();
        let mut working = registry.clone();

        let mut distributive: Vec<Clause> = Vec::new();
        let mut substitutes: Vec<Substitute> = Vec::new();
        let mut roots: Vec<Lit> = Vec::new();

        let mut encoder = TseytinEncoder::new(&mut working);
        for (i, conjunct) in conjuncts.iter().enumerate() {
            match expander.expand(conjunct) {
                Ok(clauses) => {
                    stats.distributive_constraint_count += 1;
                    distributive.extend(clauses);
                }
                Err(overflow) => {
                    debug!("conjunct #{}: {}, using Tseytin encoding", i, overflow);
                    let encoding = encoder.encode(conjunct)?;
                    stats.tseytin_constraint_count += 1;
                    substitutes.extend(encoding.substitutes);
                    roots.push(encoding.root);
                }
            }
        }
        stats.cache_hits = encoder.cache().hits();
        stats.cache_misses = encoder.cache().misses();

        for substitute in &substitutes {
            let name = working.rename_fresh(substitute.variable, &self.config.aux_prefix)?;
            debug!("auxiliary {} ({}) named '{}'", substitute.variable, substitute.gate, name);
        }
        stats.aux_variable_count = substitutes.len();

        let mut seen = HashSet::new();
        let mut clauses = Vec::new();
        for clause in distributive {
            if seen.insert(clause.clone()) {
                clauses.push(clause);
            }
        }
        stats.distributive_clause_count = clauses.len();

        let tseytin = substitutes
            .into_iter()
            .flat_map(|s| s.clauses)
            .chain(roots.into_iter().map(Clause::unit));
        for clause in tseytin {
            if seen.insert(clause.clone()) {
                clauses.push(clause);
            }
        }
        stats.tseytin_clause_count = clauses.len() - stats.distributive_clause_count;

        info!(
            "Transformed {} constraints into {} clauses over {} variables ({})",
            conjuncts.len(),
            clauses.len(),
            working.len(),
            stats
        );

        Ok(Transformation {
            cnf: Cnf::new(working, clauses),
            stats,
        })
    }
}
