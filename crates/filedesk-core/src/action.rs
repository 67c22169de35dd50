//! The closed set of actions a caller can request.

use serde::{Deserialize, Serialize};

use crate::node::{FileSystemItem, ItemKind};

/// An action requested against an item or a selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Copy,
    Move,
    Rename,
    Delete,
    Download,
    DownloadAsZip,
    CopyHere,
    View,
    PublicLink,
}

impl Action {
    /// Check if this action is defined for an item variant.
    pub fn applies_to(self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::File => true,
            ItemKind::Folder => matches!(
                self,
                Self::Copy | Self::Move | Self::Rename | Self::Delete | Self::DownloadAsZip
            ),
        }
    }

    /// Check if this action is defined for a concrete item.
    pub fn is_applicable(self, item: &FileSystemItem) -> bool {
        self.applies_to(item.kind())
    }

    /// Check if this action is defined for a multi-item selection.
    pub fn is_batch_action(self) -> bool {
        matches!(
            self,
            Self::Copy | Self::Move | Self::Delete | Self::DownloadAsZip
        )
    }
}
