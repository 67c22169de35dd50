//! Confirmation step in front of destructive operations.

use std::sync::Arc;

use filedesk_core::{Affected, FileSystemItem, MessageKey, TextProvider};

use crate::services::{ConfirmOutcome, ConfirmStyle, DialogService};

/// Title and message of a delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub message: String,
}

/// Asks the user before anything is deleted.
#[derive(Clone)]
pub struct ConfirmationGate {
    dialogs: Arc<dyn DialogService>,
    texts: Arc<dyn TextProvider>,
}

impl ConfirmationGate {
    pub fn new(dialogs: Arc<dyn DialogService>, texts: Arc<dyn TextProvider>) -> Self {
        Self { dialogs, texts }
    }

    /// Build the prompt: the item name for a single item, the count for a batch.
    pub fn delete_prompt(&self, items: &Affected) -> DeletePrompt {
        let (title, message) = match items {
            Affected::Single(FileSystemItem::File(file)) => (
                MessageKey::DeleteFileTitle,
                self.texts.text(MessageKey::ConfirmFileDelete, &[file.name.as_str()]),
            ),
            Affected::Single(FileSystemItem::Folder(folder)) => (
                MessageKey::DeleteFolderTitle,
                self.texts.text(MessageKey::ConfirmFolderDelete, &[folder.name.as_str()]),
            ),
            Affected::Batch(batch) => (
                MessageKey::DeleteItemsTitle,
                self.texts
                    .text(MessageKey::ConfirmItemsDelete, &[batch.len().to_string().as_str()]),
            ),
        };
        DeletePrompt {
            title: self.texts.text(title, &[]),
            message,
        }
    }

    /// Ask for confirmation to delete `items`.
    pub async fn confirm_delete(&self, items: &Affected) -> ConfirmOutcome {
        let prompt = self.delete_prompt(items);
        let outcome = self
            .dialogs
            .confirm(&prompt.title, &prompt.message, ConfirmStyle::Delete)
            .await;
        tracing::debug!(items = items.len(), ?outcome, "delete confirmation answered");
        outcome
    }
}
