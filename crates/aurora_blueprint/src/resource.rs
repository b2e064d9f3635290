//! Lookup of game resources by resref.

use std::collections::HashMap;
use std::fmt;

use aurora_dlg::Dialog;
use aurora_gff::ResRef;

/// Kinds of resource a template can refer to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResourceType {
    Utc,
    Uti,
    Bic,
    Dlg,
    TwoDa,
    /// Compiled script
    Ncs,
    Wav,
}

impl ResourceType {
    pub fn extension(self) -> &'static str {
        match self {
            ResourceType::Utc => "utc",
            ResourceType::Uti => "uti",
            ResourceType::Bic => "bic",
            ResourceType::Dlg => "dlg",
            ResourceType::TwoDa => "2da",
            ResourceType::Ncs => "ncs",
            ResourceType::Wav => "wav",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        [
            ResourceType::Utc,
            ResourceType::Uti,
            ResourceType::Bic,
            ResourceType::Dlg,
            ResourceType::TwoDa,
            ResourceType::Ncs,
            ResourceType::Wav,
        ]
        .into_iter()
        .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Somewhere resources can be loaded from: a module, a hak, the game's key table
///
/// Resrefs are case-insensitive; implementations compare them normalized.
pub trait ResourceStore {
    fn load(&self, resref: &ResRef, kind: ResourceType) -> Option<Vec<u8>>;

    fn contains(&self, resref: &ResRef, kind: ResourceType) -> bool {
        self.load(resref, kind).is_some()
    }
}

/// Resource store backed by a hash map
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    resources: HashMap<(ResRef, ResourceType), Vec<u8>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resref: &ResRef, kind: ResourceType, data: impl Into<Vec<u8>>) {
        self.resources
            .insert((resref.normalized(), kind), data.into());
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceStore for MemoryResourceStore {
    fn load(&self, resref: &ResRef, kind: ResourceType) -> Option<Vec<u8>> {
        self.resources.get(&(resref.normalized(), kind)).cloned()
    }

    fn contains(&self, resref: &ResRef, kind: ResourceType) -> bool {
        self.resources.contains_key(&(resref.normalized(), kind))
    }
}

/// A document that names other resources
pub trait References {
    /// Every non-empty resref the document refers to, in field order, duplicates removed.
    fn references(&self) -> Vec<(ResRef, ResourceType)>;

    /// The references `store` cannot resolve.
    fn missing_resources(&self, store: &dyn ResourceStore) -> Vec<(ResRef, ResourceType)> {
        self.references()
            .into_iter()
            .filter(|(resref, kind)| !store.contains(resref, *kind))
            .collect()
    }
}

/// Collects references, skipping empty and repeated ones.
#[derive(Default)]
pub(crate) struct ReferenceList(Vec<(ResRef, ResourceType)>);

impl ReferenceList {
    pub fn push(&mut self, resref: &ResRef, kind: ResourceType) {
        if resref.is_empty() {
            return;
        }
        let entry = (resref.normalized(), kind);
        if !self.0.contains(&entry) {
            self.0.push(entry);
        }
    }

    pub fn into_inner(self) -> Vec<(ResRef, ResourceType)> {
        self.0
    }
}

impl References for Dialog {
    fn references(&self) -> Vec<(ResRef, ResourceType)> {
        let mut list = ReferenceList::default();
        list.push(&self.end_conversation, ResourceType::Ncs);
        list.push(&self.end_conver_abort, ResourceType::Ncs);
        for node in self.entries().iter().chain(self.replies()) {
            list.push(&node.script, ResourceType::Ncs);
            list.push(&node.sound, ResourceType::Wav);
        }
        for (_, _, pointer) in self.iter_pointers() {
            list.push(&pointer.condition, ResourceType::Ncs);
        }
        list.into_inner()
    }
}
