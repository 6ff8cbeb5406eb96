//! Catalog scope

use compass_core::Catalog;
use std::collections::HashMap;

/// Control catalogs in scope for resolution, keyed by catalog ID
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    catalogs: HashMap<String, Catalog>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a catalog under its own metadata ID, returning any catalog it replaced
    pub fn insert(&mut self, catalog: Catalog) -> Option<Catalog> {
        self.catalogs.insert(catalog.id().to_string(), catalog)
    }

    /// Get a catalog by ID
    pub fn get(&self, catalog_id: &str) -> Option<&Catalog> {
        self.catalogs.get(catalog_id)
    }

    pub fn contains(&self, catalog_id: &str) -> bool {
        self.catalogs.contains_key(catalog_id)
    }

    /// Catalog IDs in scope, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.catalogs.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl FromIterator<Catalog> for Scope {
    fn from_iter<I: IntoIterator<Item = Catalog>>(iter: I) -> Self {
        let mut scope = Self::new();
        for catalog in iter {
            scope.insert(catalog);
        }
        scope
    }
}
