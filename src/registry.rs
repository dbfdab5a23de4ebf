//! Bidirectional name <-> index mapping for Boolean variables.
//!
//! A [`Registry`] hands out 1-indexed [`Var`]s in insertion order and keeps
//! each index stable for its whole lifetime: renames re-label a variable but
//! never move it. Registries are plain values, so [`Clone`] produces an
//! independent copy that may diverge from the original (this is how the
//! transformation adds auxiliary variables without touching the caller's
//! registry).
//!
//! # Fresh names
//!
//! [`Registry::add_fresh_boolean`] allocates `prefix + N` with the smallest
//! `N` not yet in use. To avoid rescanning from zero on every call, the
//! registry remembers, per prefix, a lower bound below which every suffix is
//! known to be taken. Since names are only removed by [`Registry::rename`],
//! the hints of every prefix matching the old name are dropped there.

use std::collections::HashMap;
use std::fmt;

use log::trace;

use crate::error::{Error, Result};
use crate::types::Var;

/// Default upper bound on the number of suffixes tried by a single fresh-name request.
pub const MAX_FRESH_ATTEMPTS: usize = 1 << 30;

/// Identifies a variable either by index or by name.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VarKey<'a> {
    Index(Var),
    Name(&'a str),
}

impl From<Var> for VarKey<'_> {
    fn from(var: Var) -> Self {
        VarKey::Index(var)
    }
}

impl<'a> From<&'a str> for VarKey<'a> {
    fn from(name: &'a str) -> Self {
        VarKey::Name(name)
    }
}

impl<'a> From<&'a String> for VarKey<'a> {
    fn from(name: &'a String) -> Self {
        VarKey::Name(name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    /// Names by index, `names[v - 1]` is the name of variable `v`.
    names: Vec<String>,
    indices: HashMap<String, Var>,
    /// Per-prefix lower bound for the next free suffix.
    fresh_hints: HashMap<String, usize>,
    max_fresh_attempts: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            indices: HashMap::new(),
            fresh_hints: HashMap::new(),
            max_fresh_attempts: MAX_FRESH_ATTEMPTS,
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of suffixes tried by a single fresh-name request.
    ///
    /// Copies made with [`Clone`] keep the bound.
    pub fn with_max_fresh_attempts(mut self, attempts: usize) -> Self {
        self.max_fresh_attempts = attempts;
        self
    }

    pub fn max_fresh_attempts(&self) -> usize {
        self.max_fresh_attempts
    }

    /// Creates a registry with the given names, indexed from 1 in iteration order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.add_boolean(name)?;
        }
        Ok(registry)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if `var` was issued by this registry.
    pub fn contains(&self, var: Var) -> bool {
        var.slot() < self.names.len()
    }

    pub fn name_of(&self, var: Var) -> Option<&str> {
        self.names.get(var.slot()).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<Var> {
        self.indices.get(name).copied()
    }

    /// Iterates over all variables in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Var, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (Var::new(i as u32 + 1), name.as_str()))
    }

    fn resolve(&self, key: VarKey<'_>) -> Result<Var> {
        match key {
            VarKey::Index(var) if self.contains(var) => Ok(var),
            VarKey::Index(var) => Err(Error::UnknownVariable(var)),
            VarKey::Name(name) => self.index_of(name).ok_or_else(|| Error::UnknownName(name.to_string())),
        }
    }

    /// Adds a new variable with the given name.
    pub fn add_boolean(&mut self, name: impl Into<String>) -> Result<Var> {
        let name = name.into();
        if self.indices.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        let var = Var::new(self.names.len() as u32 + 1);
        self.indices.insert(name.clone(), var);
        self.names.push(name);
        Ok(var)
    }

    /// Computes the smallest unused name of the form `prefix + N`, without adding it.
    pub fn fresh_name(&self, prefix: &str) -> Result<String> {
        self.find_fresh(prefix).map(|(name, _)| name)
    }

    fn find_fresh(&self, prefix: &str) -> Result<(String, usize)> {
        let start = self.fresh_hints.get(prefix).copied().unwrap_or(0);
        for suffix in (start..).take(self.max_fresh_attempts) {
            let name = format!("{}{}", prefix, suffix);
            if !self.indices.contains_key(&name) {
                return Ok((name, suffix));
            }
        }
        Err(Error::NameExhaustion {
            prefix: prefix.to_string(),
            attempts: self.max_fresh_attempts,
        })
    }

    /// Adds a new variable named `prefix + N` for the smallest unused `N`.
    pub fn add_fresh_boolean(&mut self, prefix: &str) -> Result<Var> {
        let (name, suffix) = self.find_fresh(prefix)?;
        let var = self.add_boolean(name)?;
        self.fresh_hints.insert(prefix.to_string(), suffix + 1);
        trace!("add_fresh_boolean(prefix = {:?}) -> {}", prefix, var);
        Ok(var)
    }

    /// Re-labels a variable without changing its index.
    ///
    /// Fails if `new_name` is already used by another variable.
    pub fn rename<'a>(&mut self, key: impl Into<VarKey<'a>>, new_name: impl Into<String>) -> Result<()> {
        let var = self.resolve(key.into())?;
        let new_name = new_name.into();
        let slot = var.slot();
        if self.names[slot] == new_name {
            return Ok(());
        }
        if self.indices.contains_key(&new_name) {
            return Err(Error::DuplicateName(new_name));
        }
        let old_name = std::mem::replace(&mut self.names[slot], new_name.clone());
        trace!("rename({}: {:?} -> {:?})", var, old_name, new_name);
        self.indices.remove(&old_name);
        self.indices.insert(new_name, var);
        // The old name may have been below a hint.
        self.fresh_hints.retain(|prefix, _| !old_name.starts_with(prefix.as_str()));
        Ok(())
    }

    /// Renames `var` to the smallest unused name of the form `prefix + N`.
    pub fn rename_fresh(&mut self, var: Var, prefix: &str) -> Result<String> {
        let old_name = self.name_of(var).ok_or(Error::UnknownVariable(var))?.to_string();
        let (name, suffix) = self.find_fresh(prefix)?;
        self.rename(var, name.clone())?;
        if !old_name.starts_with(prefix) {
            self.fresh_hints.insert(prefix.to_string(), suffix + 1);
        }
        Ok(name)
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, name)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", var.id(), name)?;
        }
        write!(f, "}}")
    }
}
