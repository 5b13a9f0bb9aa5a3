// Copyright (C) Microsoft Corporation. All rights reserved.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::AlgorithmFamily;
use crate::adapter::Operation;
use crate::error::AdapterError;

/// Registry of algorithm families, keyed by canonical algorithm name.
///
/// Lookup is case-insensitive; keys are stored lowercased. Families carry no
/// shared mutable state, so they are registered once and shared as trait
/// objects by any number of concurrent operations.
#[derive(Default)]
pub struct AlgorithmRegistry {
    families: HashMap<String, Arc<dyn AlgorithmFamily>>,
}

impl AlgorithmRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a family under its canonical name, replacing any previous
    /// family with the same name.
    pub fn register(&mut self, family: Arc<dyn AlgorithmFamily>) {
        self.families
            .insert(family.name().to_ascii_lowercase(), family);
    }

    /// Resolve a family by requested algorithm name. An unknown name fails
    /// with [`AdapterError::NotSupported`] for the given operation.
    pub fn resolve(
        &self,
        name: &str,
        operation: Operation,
    ) -> Result<&Arc<dyn AlgorithmFamily>, AdapterError> {
        self.families
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| AdapterError::not_supported(name, operation))
    }

    /// Canonical names of all registered families.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.families.values().map(|f| f.name())
    }
}
