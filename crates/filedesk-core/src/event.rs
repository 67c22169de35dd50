//! Change events published after a successful operation.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::node::{FileSystemItem, ItemId, Selection};

/// The items an operation acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Affected {
    /// A single-item invocation.
    Single(FileSystemItem),
    /// A multi-item (batch) invocation.
    Batch(Vec<FileSystemItem>),
}

impl Affected {
    /// Get the affected items as a slice.
    pub fn items(&self) -> &[FileSystemItem] {
        match self {
            Self::Single(item) => std::slice::from_ref(item),
            Self::Batch(items) => items,
        }
    }

    /// Number of affected items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Check if this came from a batch invocation.
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Ids of the affected items, in order.
    pub fn ids(&self) -> Vec<&ItemId> {
        self.items().iter().map(FileSystemItem::id).collect()
    }
}

impl From<FileSystemItem> for Affected {
    fn from(item: FileSystemItem) -> Self {
        Self::Single(item)
    }
}

impl From<Selection> for Affected {
    fn from(selection: Selection) -> Self {
        Self::Batch(selection.into_vec())
    }
}

/// Immutable record of a completed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemEvent {
    affected: Affected,
    action: Action,
}

impl FileSystemEvent {
    /// Create a new event.
    pub fn new(affected: Affected, action: Action) -> Self {
        Self { affected, action }
    }

    pub fn affected(&self) -> &Affected {
        &self.affected
    }

    pub fn action(&self) -> Action {
        self.action
    }
}
