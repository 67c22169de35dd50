//! Interactive target folder resolution.

use std::collections::VecDeque;
use std::sync::Arc;

use filedesk_core::{
    Affected, FileSystemItem, Folder, MessageKey, ServiceResult, TextProvider,
};

use crate::operation::Transfer;
use crate::services::{Anchor, FolderPicker, ItemProvider, PickOutcome, PickerRequest};

/// Drives the folder picker when a copy or move has no target yet.
#[derive(Clone)]
pub struct TargetResolver {
    picker: Arc<dyn FolderPicker>,
    provider: Arc<dyn ItemProvider>,
    texts: Arc<dyn TextProvider>,
}

impl TargetResolver {
    pub fn new(
        picker: Arc<dyn FolderPicker>,
        provider: Arc<dyn ItemProvider>,
        texts: Arc<dyn TextProvider>,
    ) -> Self {
        Self {
            picker,
            provider,
            texts,
        }
    }

    /// Build the picker request for transferring `items`.
    ///
    /// Only folders are admissible, and only those the whole selection may
    /// be transferred into.
    pub fn request(
        &self,
        transfer: Transfer,
        items: &Affected,
        anchor: Option<Anchor>,
    ) -> PickerRequest {
        let (title, message) = self.texts_for(transfer, items);
        let label = match transfer {
            Transfer::Copy => MessageKey::CopyActionLabel,
            Transfer::Move => MessageKey::MoveActionLabel,
        };

        let selection = items.items().to_vec();
        let admissible = Box::new(move |candidate: &FileSystemItem| match candidate {
            FileSystemItem::Folder(folder) => transfer.is_legal(&selection, folder),
            FileSystemItem::File(_) => false,
        });

        PickerRequest {
            title,
            message,
            action_label: self.texts.text(label, &[]),
            provider: self.provider.clone(),
            admissible,
            anchor,
        }
    }

    /// Open the picker and wait for a choice.
    pub async fn resolve(
        &self,
        transfer: Transfer,
        items: &Affected,
        anchor: Option<Anchor>,
    ) -> PickOutcome {
        let request = self.request(transfer, items, anchor);
        tracing::debug!(action = %transfer.action(), items = items.len(), "opening folder picker");
        let outcome = self.picker.open(request).await;
        if let PickOutcome::Selected(folder) = &outcome {
            tracing::debug!(folder = %folder.id, "target selected");
        }
        outcome
    }

    fn texts_for(&self, transfer: Transfer, items: &Affected) -> (String, String) {
        use MessageKey::*;
        let (title, message, arg) = match (transfer, items) {
            (Transfer::Copy, Affected::Single(FileSystemItem::File(f))) => {
                (CopyFileTitle, CopyFileMessage, f.name.to_string())
            }
            (Transfer::Copy, Affected::Single(FileSystemItem::Folder(f))) => {
                (CopyFolderTitle, CopyFolderMessage, f.name.to_string())
            }
            (Transfer::Copy, Affected::Batch(batch)) => {
                (CopyItemsTitle, CopyItemsMessage, batch.len().to_string())
            }
            (Transfer::Move, Affected::Single(FileSystemItem::File(f))) => {
                (MoveFileTitle, MoveFileMessage, f.name.to_string())
            }
            (Transfer::Move, Affected::Single(FileSystemItem::Folder(f))) => {
                (MoveFolderTitle, MoveFolderMessage, f.name.to_string())
            }
            (Transfer::Move, Affected::Batch(batch)) => {
                (MoveItemsTitle, MoveItemsMessage, batch.len().to_string())
            }
        };
        (
            self.texts.text(title, &[]),
            self.texts.text(message, &[arg.as_str()]),
        )
    }
}

impl PickerRequest {
    /// Check if a candidate may be chosen.
    pub fn is_admissible(&self, candidate: &FileSystemItem) -> bool {
        (self.admissible)(candidate)
    }

    /// Walk the provider's tree breadth-first, collecting admissible folders.
    ///
    /// Inadmissible folders are still descended into: a folder's subtree can
    /// hold valid targets even when the folder itself is not one.
    pub async fn admissible_folders(&self) -> ServiceResult<Vec<Folder>> {
        let mut queue: VecDeque<Folder> = self.provider.root_folders().await?.into();
        let mut found = Vec::new();

        while let Some(folder) = queue.pop_front() {
            let children = self.provider.children(&folder).await?;
            let candidate = FileSystemItem::Folder(folder);
            if self.is_admissible(&candidate) {
                if let FileSystemItem::Folder(folder) = candidate {
                    found.push(folder);
                }
            }
            queue.extend(children.into_iter().filter_map(|child| match child {
                FileSystemItem::Folder(sub) => Some(sub),
                FileSystemItem::File(_) => None,
            }));
        }

        Ok(found)
    }
}
