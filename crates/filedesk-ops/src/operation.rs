//! Fully resolved operations, ready for dispatch.

use filedesk_core::{Action, Affected, File, FileSystemEvent, FileSystemItem, Folder};

use crate::conflict::{can_copy_all_to, can_move_all_to};

/// The two operations that need a target folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Copy,
    Move,
}

impl Transfer {
    /// Map an action onto a transfer, if it is one.
    pub fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::Copy => Some(Self::Copy),
            Action::Move => Some(Self::Move),
            _ => None,
        }
    }

    pub fn action(self) -> Action {
        match self {
            Self::Copy => Action::Copy,
            Self::Move => Action::Move,
        }
    }

    /// Check if every item may be transferred into `target`.
    pub fn is_legal(self, items: &[FileSystemItem], target: &Folder) -> bool {
        match self {
            Self::Copy => can_copy_all_to(items, target),
            Self::Move => can_move_all_to(items, target),
        }
    }

    /// Build the operation for a resolved target.
    pub fn into_operation(self, items: Affected, target: Folder) -> ResolvedOperation {
        match self {
            Self::Copy => ResolvedOperation::Copy { items, target },
            Self::Move => ResolvedOperation::Move { items, target },
        }
    }
}

/// An operation whose action, items and target are all known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOperation {
    /// Copy items into a folder.
    Copy { items: Affected, target: Folder },
    /// Move items into a folder.
    Move { items: Affected, target: Folder },
    /// Delete items.
    Delete { items: Affected },
    /// Rename a single item.
    Rename {
        item: FileSystemItem,
        new_name: String,
    },
    /// Copy a file next to itself under a new name.
    CopyWithName { file: File, new_name: String },
}

impl ResolvedOperation {
    /// The action reported in the change event.
    pub fn action(&self) -> Action {
        match self {
            Self::Copy { .. } | Self::CopyWithName { .. } => Action::Copy,
            Self::Move { .. } => Action::Move,
            Self::Delete { .. } => Action::Delete,
            Self::Rename { .. } => Action::Rename,
        }
    }

    /// Number of items the call acts on.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Copy { items, .. } | Self::Move { items, .. } | Self::Delete { items } => {
                items.len()
            }
            Self::Rename { .. } | Self::CopyWithName { .. } => 1,
        }
    }

    /// Consume the operation, producing its change event.
    pub fn into_event(self) -> FileSystemEvent {
        let action = self.action();
        let affected = match self {
            Self::Copy { items, .. } | Self::Move { items, .. } | Self::Delete { items } => items,
            Self::Rename { item, .. } => Affected::Single(item),
            Self::CopyWithName { file, .. } => Affected::Single(file.into()),
        };
        FileSystemEvent::new(affected, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> File {
        File::new("f1", "d1", "r", "report.txt", "/r/d/report.txt", 1)
    }

    #[test]
    fn test_copy_with_name_reports_copy() {
        let op = ResolvedOperation::CopyWithName {
            file: report(),
            new_name: "copy.txt".into(),
        };
        assert_eq!(op.action(), Action::Copy);

        let event = op.into_event();
        assert_eq!(event.action(), Action::Copy);
        assert!(!event.affected().is_batch());
    }

    #[test]
    fn test_batch_event_keeps_batch_shape() {
        let items = Affected::Batch(vec![report().into()]);
        let op = ResolvedOperation::Delete { items };
        assert_eq!(op.item_count(), 1);
        assert!(op.into_event().affected().is_batch());
    }

    #[test]
    fn test_transfer_mapping() {
        assert_eq!(Transfer::from_action(Action::Move), Some(Transfer::Move));
        assert_eq!(Transfer::from_action(Action::Delete), None);
        assert_eq!(Transfer::Copy.action(), Action::Copy);
    }
}
