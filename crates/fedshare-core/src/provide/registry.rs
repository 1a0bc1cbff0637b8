//! Per-pass registry of provided modules.

use super::host::ProvideSharedDependency;
use super::options::{ProvideDeclaration, ProvideVersion};
use std::collections::BTreeMap;

/// A module claimed by a provide declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvideEntry {
    /// Resolved resource path.
    pub resource: String,
    /// Declaration that claimed the module (share key already adjusted).
    pub config: ProvideDeclaration,
    /// `None` when no version could be determined.
    pub resolved_version: Option<ProvideVersion>,
}

impl ResolvedProvideEntry {
    /// The graph node this entry is included as. A missing version is provided as unversioned.
    #[must_use]
    pub fn to_dependency(&self) -> ProvideSharedDependency {
        ProvideSharedDependency {
            share_scope: self.config.share_scope.clone(),
            share_key: self.config.share_key.clone(),
            version: self
                .resolved_version
                .clone()
                .unwrap_or(ProvideVersion::Unversioned),
            request: self.resource.clone(),
            eager: self.config.eager,
        }
    }
}

/// Provided modules keyed by resolved resource path.
///
/// Entries are write-once: the first entry for a resource wins and later
/// writes are dropped. Two requests resolving to the same file collapse
/// into one provider.
#[derive(Debug, Clone, Default)]
pub struct SharedModuleRegistry {
    entries: BTreeMap<String, ResolvedProvideEntry>,
}

impl SharedModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, resource: &str) -> bool {
        self.entries.contains_key(resource)
    }

    #[must_use]
    pub fn get(&self, resource: &str) -> Option<&ResolvedProvideEntry> {
        self.entries.get(resource)
    }

    /// Insert the entry unless its resource is already claimed.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn set_if_absent(&mut self, entry: ResolvedProvideEntry) -> bool {
        match self.entries.entry(entry.resource.clone()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in resource order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProvideEntry> {
        self.entries.values()
    }

    /// Consume the registry, yielding entries in resource order.
    pub fn into_entries(self) -> impl Iterator<Item = ResolvedProvideEntry> {
        self.entries.into_values()
    }
}
