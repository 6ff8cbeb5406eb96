//! Mapper trait and registry

use compass_core::{AssessmentPlan, Compliance, Evidence};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::plugins::basic::BasicMapper;
use crate::Scope;

/// Assessment plans owned by a mapper, keyed by catalog ID
///
/// Sorted so catalogs are always tried in lexicographic order.
pub type PlanStore = BTreeMap<String, Vec<AssessmentPlan>>;

/// Identity of a mapper, normally the name of the policy engine it serves
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapperId(String);

impl MapperId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MapperId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MapperId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MapperId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Trait for all mappers
///
/// Plans are added during startup only. After that a mapper is shared
/// behind an `Arc` and `map` is called concurrently.
pub trait Mapper: Send + Sync {
    /// Registry key of this mapper
    fn plugin_name(&self) -> &MapperId;

    /// Append assessment plans for a catalog; existing plans are kept
    fn add_evaluation_plan(&mut self, catalog_id: &str, plans: Vec<AssessmentPlan>);

    /// Plans loaded so far
    fn plans(&self) -> &PlanStore;

    /// Resolve evidence against the catalogs in scope
    ///
    /// Never fails: evidence that cannot be resolved yields
    /// [`Compliance::unmapped`].
    fn map(&self, evidence: &Evidence, scope: &Scope) -> Compliance;
}

/// Registry of mappers by ID with a designated fallback
#[derive(Clone)]
pub struct MapperSet {
    /// Registered mappers
    mappers: HashMap<MapperId, Arc<dyn Mapper>>,

    /// Used when no mapper is registered for an ID
    fallback: Arc<dyn Mapper>,
}

/// Mapper chosen for a lookup
pub struct MapperSelection<'a> {
    pub mapper: &'a Arc<dyn Mapper>,

    /// True when no mapper was registered and the fallback was chosen
    pub is_fallback: bool,
}

impl MapperSet {
    /// Create an empty set whose fallback is a basic mapper without plans
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            fallback: Arc::new(BasicMapper::new()),
        }
    }

    /// Replace the fallback mapper
    pub fn with_fallback(mut self, fallback: Arc<dyn Mapper>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Register a mapper under its plugin name, returning any mapper it replaced
    pub fn insert(&mut self, mapper: Arc<dyn Mapper>) -> Option<Arc<dyn Mapper>> {
        self.mappers.insert(mapper.plugin_name().clone(), mapper)
    }

    /// Get a registered mapper by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Mapper>> {
        self.mappers.get(id)
    }

    /// Get the mapper for an ID, falling back when none is registered
    pub fn select(&self, id: &str) -> MapperSelection<'_> {
        match self.mappers.get(id) {
            Some(mapper) => MapperSelection {
                mapper,
                is_fallback: false,
            },
            None => MapperSelection {
                mapper: &self.fallback,
                is_fallback: true,
            },
        }
    }

    pub fn fallback(&self) -> &Arc<dyn Mapper> {
        &self.fallback
    }

    pub fn contains(&self, id: &str) -> bool {
        self.mappers.contains_key(id)
    }

    /// Registered mapper IDs, sorted
    pub fn ids(&self) -> Vec<&MapperId> {
        let mut ids: Vec<&MapperId> = self.mappers.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl Default for MapperSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapperSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperSet")
            .field("mappers", &self.ids())
            .field("fallback", self.fallback.plugin_name())
            .finish()
    }
}
