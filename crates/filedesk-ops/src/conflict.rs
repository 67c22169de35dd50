//! Path conflict detection for copy and move targets.
//!
//! Containment is decided by plain string prefix on item paths, and only
//! between items sharing a root. Items under different roots never conflict.

use serde::{Deserialize, Serialize};

use filedesk_core::{FileSystemItem, Folder};

/// Why an item cannot be copied or moved into a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// The item already lives directly in the target.
    AlreadyInTarget,
    /// The target is the folder itself.
    TargetIsSelf,
    /// The target lies inside the folder's own subtree.
    SourceIsAncestor,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInTarget => write!(f, "Item is already in the target folder"),
            Self::TargetIsSelf => write!(f, "Cannot move a folder into itself"),
            Self::SourceIsAncestor => write!(f, "Cannot copy/move a folder into its own subtree"),
        }
    }
}

/// Conflict preventing `item` from being copied into `target`, if any.
pub fn copy_conflict(item: &FileSystemItem, target: &Folder) -> Option<ConflictKind> {
    if item.parent_id() == &target.id {
        return Some(ConflictKind::AlreadyInTarget);
    }
    if item.is_folder() && inside_subtree(item, target) {
        return Some(ConflictKind::SourceIsAncestor);
    }
    None
}

/// Conflict preventing `item` from being moved into `target`, if any.
pub fn move_conflict(item: &FileSystemItem, target: &Folder) -> Option<ConflictKind> {
    match item {
        FileSystemItem::File(file) => {
            (file.parent_id == target.id).then_some(ConflictKind::AlreadyInTarget)
        }
        FileSystemItem::Folder(folder) => {
            if folder.id == target.id {
                Some(ConflictKind::TargetIsSelf)
            } else if inside_subtree(item, target) {
                Some(ConflictKind::SourceIsAncestor)
            } else {
                None
            }
        }
    }
}

/// Check if `item` may be copied into `target`.
pub fn can_copy_to(item: &FileSystemItem, target: &Folder) -> bool {
    copy_conflict(item, target).is_none()
}

/// Check if `item` may be moved into `target`.
pub fn can_move_to(item: &FileSystemItem, target: &Folder) -> bool {
    move_conflict(item, target).is_none()
}

/// Check if every item may be copied into `target`. One refusal blocks all.
pub fn can_copy_all_to(items: &[FileSystemItem], target: &Folder) -> bool {
    items.iter().all(|item| can_copy_to(item, target))
}

/// Check if every item may be moved into `target`. One refusal blocks all.
pub fn can_move_all_to(items: &[FileSystemItem], target: &Folder) -> bool {
    items.iter().all(|item| can_move_to(item, target))
}

fn inside_subtree(item: &FileSystemItem, target: &Folder) -> bool {
    item.root_id() == &target.root_id && target.path.starts_with(item.path())
}
