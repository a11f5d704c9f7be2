//! Per-run dedup cache
//!
//! One `GenerationCache` lives for exactly one `generate` call. It owns the
//! emitted DTOs (in emission order), the shape each DTO name was claimed for,
//! and the set of type names already handed out to any artifact.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::generation::{DtoArtifact, ObjectShape};

/// Outcome of claiming a DTO name for a shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A DTO with this name and an equal shape already exists
    Existing(String),
    /// Name reserved for a new DTO; the caller must insert it
    Fresh(String),
}

#[derive(Debug, Default)]
pub struct GenerationCache {
    dtos: IndexMap<String, DtoArtifact>,
    shapes: HashMap<String, ObjectShape>,
    taken: HashSet<String>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a type name as unavailable for inline DTOs and requests
    pub fn reserve(&mut self, name: impl Into<String>) -> bool {
        self.taken.insert(name.into())
    }

    /// Claims a DTO name for `shape`.
    ///
    /// Walks `candidate`, `candidate2`, `candidate3`, ... and returns the first
    /// name that was claimed for an equal shape, or the first free name. A
    /// fresh name is reserved before this returns, so recursion into nested
    /// shapes cannot take it.
    pub fn claim(&mut self, candidate: &str, shape: &ObjectShape) -> Claim {
        let mut n = 1;
        loop {
            let name = suffixed(candidate, n);
            if self.shapes.get(&name) == Some(shape) {
                return Claim::Existing(name);
            }
            if !self.taken.contains(&name) {
                if n > 1 {
                    tracing::warn!(
                        candidate = %candidate,
                        resolved = %name,
                        "DTO name already taken by a different shape"
                    );
                }
                self.bind(name.clone(), shape);
                return Claim::Fresh(name);
            }
            n += 1;
        }
    }

    /// Claims a name that was reserved up front, such as a registry schema name.
    ///
    /// The first caller binds the shape; later callers with an equal shape get
    /// `Existing`. Returns `None` when the name is bound to a different shape.
    pub fn claim_reserved(&mut self, name: &str, shape: &ObjectShape) -> Option<Claim> {
        match self.shapes.get(name) {
            Some(bound) if bound == shape => Some(Claim::Existing(name.to_string())),
            Some(_) => None,
            None => {
                self.bind(name.to_string(), shape);
                Some(Claim::Fresh(name.to_string()))
            }
        }
    }

    /// Returns `candidate` or the first free suffixed variant, and reserves it.
    pub fn unique_name(&mut self, candidate: &str) -> String {
        let mut n = 1;
        while self.taken.contains(&suffixed(candidate, n)) {
            n += 1;
        }
        let name = suffixed(candidate, n);
        if n > 1 {
            tracing::warn!(candidate = %candidate, resolved = %name, "Type name already taken");
        }
        self.taken.insert(name.clone());
        name
    }

    /// Stores a finished DTO. DTOs are never replaced once stored.
    pub fn insert(&mut self, dto: DtoArtifact) {
        debug_assert!(!self.dtos.contains_key(&dto.type_name));
        self.dtos.entry(dto.type_name.clone()).or_insert(dto);
    }

    pub fn get(&self, name: &str) -> Option<&DtoArtifact> {
        self.dtos.get(name)
    }

    pub fn dto_count(&self) -> usize {
        self.dtos.len()
    }

    /// Finished DTOs in emission order
    pub fn into_dtos(self) -> Vec<DtoArtifact> {
        self.dtos.into_values().collect()
    }

    fn bind(&mut self, name: String, shape: &ObjectShape) {
        self.taken.insert(name.clone());
        self.shapes.insert(name, shape.clone());
    }
}

fn suffixed(candidate: &str, n: usize) -> String {
    if n == 1 {
        candidate.to_string()
    } else {
        format!("{candidate}{n}")
    }
}
