//! Entry point: routes an item or a selection plus an action to the right
//! combination of confirmation, target resolution and dispatch.

use std::sync::Arc;

use tokio::sync::broadcast;

use filedesk_core::{
    Action, Affected, DispatchConfig, File, FileSystemEvent, FileSystemItem, Folder, ItemKind,
    MessageKey, Selection, TextProvider, ValidationError,
};

use crate::confirm::ConfirmationGate;
use crate::executor::{CompletionCallback, OperationDispatcher};
use crate::notify::NotificationBus;
use crate::operation::{ResolvedOperation, Transfer};
use crate::rename::{is_acceptable_name, validate_new_name};
use crate::services::{
    Anchor, ConfirmOutcome, DialogService, EventSink, FileSystemActionListener, FileViewer,
    FolderPicker, InputOutcome, InputPrompt, ItemProvider, Navigator, PickOutcome,
    RemoteFileService,
};
use crate::state::{DispatchState, Invocation, InvocationOutcome};
use crate::target::TargetResolver;

/// Everything the router talks to, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub service: Arc<dyn RemoteFileService>,
    pub items: Arc<dyn ItemProvider>,
    pub picker: Arc<dyn FolderPicker>,
    pub dialogs: Arc<dyn DialogService>,
    pub navigator: Arc<dyn Navigator>,
    pub viewer: Arc<dyn FileViewer>,
    pub texts: Arc<dyn TextProvider>,
}

/// Caller-supplied parameter of a single-item action.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActionParam {
    #[default]
    None,
    /// Pre-chosen destination for copy or move.
    Target(Folder),
    /// New name for rename.
    NewName(String),
    /// Viewer parameters.
    View(serde_json::Value),
}

/// Routes requested actions to their operations.
pub struct ActionRouter {
    config: DispatchConfig,
    service: Arc<dyn RemoteFileService>,
    dialogs: Arc<dyn DialogService>,
    navigator: Arc<dyn Navigator>,
    viewer: Arc<dyn FileViewer>,
    texts: Arc<dyn TextProvider>,
    gate: ConfirmationGate,
    resolver: TargetResolver,
    dispatcher: OperationDispatcher,
}

impl ActionRouter {
    /// Create a router over the given collaborators.
    pub fn new(collaborators: Collaborators, config: DispatchConfig) -> Self {
        let Collaborators {
            service,
            items,
            picker,
            dialogs,
            navigator,
            viewer,
            texts,
        } = collaborators;

        let bus = NotificationBus::new(config.event_channel_capacity);
        Self {
            gate: ConfirmationGate::new(dialogs.clone(), texts.clone()),
            resolver: TargetResolver::new(picker, items, texts.clone()),
            dispatcher: OperationDispatcher::new(service.clone(), dialogs.clone(), bus),
            config,
            service,
            dialogs,
            navigator,
            viewer,
            texts,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Register a sink for published events.
    pub fn add_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.dispatcher.bus_mut().add_sink(sink);
    }

    /// Register a listener notified after every successful mutation.
    pub fn add_listener(&mut self, listener: Arc<dyn FileSystemActionListener>) {
        self.dispatcher.bus_mut().add_listener(listener);
    }

    /// Subscribe to published events.
    pub fn subscribe(&self) -> broadcast::Receiver<FileSystemEvent> {
        self.dispatcher.bus().subscribe()
    }

    /// Handle an action on a single item.
    pub async fn on_action(
        &self,
        item: &FileSystemItem,
        action: Action,
        anchor: Option<Anchor>,
        param: ActionParam,
    ) -> InvocationOutcome {
        let mut invocation = Invocation::start(action);
        tracing::debug!(
            invocation = invocation.id(),
            %action,
            item = %item.id(),
            kind = %item.kind(),
            "single-item action"
        );

        let outcome = if action.is_applicable(item) {
            self.route_single(item, action, anchor, param, &mut invocation)
                .await
        } else {
            self.unsupported(action, item.kind(), &mut invocation)
        };

        invocation.finish();
        outcome
    }

    /// Handle an action on a multi-item selection.
    ///
    /// Only copy, move, delete and download-as-zip are defined for batches;
    /// anything else is ignored without a message.
    pub async fn on_batch_action(
        &self,
        selection: &Selection,
        action: Action,
        target: Option<&Folder>,
        anchor: Option<Anchor>,
        callback: Option<CompletionCallback>,
    ) -> InvocationOutcome {
        let mut invocation = Invocation::start(action);
        tracing::debug!(
            invocation = invocation.id(),
            %action,
            items = selection.len(),
            "batch action"
        );

        if !action.is_batch_action() {
            tracing::debug!(%action, "ignoring unsupported batch action");
            invocation.finish();
            return InvocationOutcome::Ignored;
        }

        let items = Affected::Batch(selection.to_vec());
        let outcome = match Transfer::from_action(action) {
            Some(transfer) => {
                self.transfer(
                    transfer,
                    items,
                    target.cloned(),
                    anchor,
                    callback,
                    &mut invocation,
                )
                .await
            }
            None if action == Action::Delete => self.delete(items, callback, &mut invocation).await,
            None => self.download_zip_batch(selection, callback).await,
        };

        invocation.finish();
        outcome
    }

    async fn route_single(
        &self,
        item: &FileSystemItem,
        action: Action,
        anchor: Option<Anchor>,
        param: ActionParam,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        match (item, action) {
            (FileSystemItem::File(file), Action::Download) => {
                let url = self
                    .service
                    .download_url(file, self.config.session_id.as_deref());
                self.navigator.open_download_url(&url);
                InvocationOutcome::Completed
            }
            (FileSystemItem::File(file), Action::PublicLink) => {
                let link = self.service.public_link(file);
                self.dialogs.info(
                    &self.texts.text(MessageKey::PublicLinkTitle, &[]),
                    &self
                        .texts
                        .text(MessageKey::PublicLinkMessage, &[file.name.as_str()]),
                    Some(&link),
                );
                InvocationOutcome::Completed
            }
            (FileSystemItem::File(file), Action::View) => {
                let params = match param {
                    ActionParam::View(params) => params,
                    _ => serde_json::Value::Null,
                };
                self.viewer.open_viewer(file, &params);
                InvocationOutcome::Completed
            }
            (_, Action::DownloadAsZip) => {
                let url = self
                    .service
                    .download_as_zip_url(item, self.config.session_id.as_deref());
                self.navigator.open_download_url(&url);
                InvocationOutcome::Completed
            }
            (_, Action::Rename) => self.rename(item, param, invocation).await,
            (FileSystemItem::File(file), Action::CopyHere) => {
                self.copy_here(file, invocation).await
            }
            (_, Action::Copy) => {
                let items = Affected::Single(item.clone());
                self.transfer(Transfer::Copy, items, param.into_target(), anchor, None, invocation)
                    .await
            }
            (_, Action::Move) => {
                let items = Affected::Single(item.clone());
                self.transfer(Transfer::Move, items, param.into_target(), anchor, None, invocation)
                    .await
            }
            (_, Action::Delete) => {
                self.delete(Affected::Single(item.clone()), None, invocation)
                    .await
            }
            _ => self.unsupported(action, item.kind(), invocation),
        }
    }

    async fn transfer(
        &self,
        transfer: Transfer,
        items: Affected,
        target: Option<Folder>,
        anchor: Option<Anchor>,
        callback: Option<CompletionCallback>,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        let target = match target {
            Some(target) => target,
            None => {
                invocation.advance(DispatchState::AwaitingTarget);
                match self.resolver.resolve(transfer, &items, anchor).await {
                    PickOutcome::Selected(folder) => {
                        invocation.advance(DispatchState::Validating);
                        folder
                    }
                    PickOutcome::Cancelled => return InvocationOutcome::Cancelled,
                }
            }
        };

        if !transfer.is_legal(items.items(), &target) {
            invocation.advance(DispatchState::Blocked);
            let (title, message) = self.illegal_target_texts(transfer, &items);
            self.dialogs.info(&title, &message, None);
            return InvocationOutcome::Rejected(ValidationError::IllegalTarget {
                action: transfer.action(),
                target: target.id,
            });
        }

        self.dispatcher
            .dispatch(transfer.into_operation(items, target), invocation, callback)
            .await
    }

    async fn delete(
        &self,
        items: Affected,
        callback: Option<CompletionCallback>,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        invocation.advance(DispatchState::AwaitingConfirmation);
        match self.gate.confirm_delete(&items).await {
            ConfirmOutcome::Confirmed => {
                self.dispatcher
                    .dispatch(ResolvedOperation::Delete { items }, invocation, callback)
                    .await
            }
            ConfirmOutcome::Cancelled => InvocationOutcome::Cancelled,
        }
    }

    async fn rename(
        &self,
        item: &FileSystemItem,
        param: ActionParam,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        let new_name = match param {
            ActionParam::NewName(name) => name,
            _ => {
                let message = self.texts.text(MessageKey::RenameMessage, &[item.name()]);
                match self
                    .prompt_name(MessageKey::RenameTitle, message, item.name(), invocation)
                    .await
                {
                    Some(name) => name,
                    None => return InvocationOutcome::Cancelled,
                }
            }
        };

        if let Err(e) = validate_new_name(item.name(), &new_name) {
            return self.reject_name(e, invocation);
        }

        let operation = ResolvedOperation::Rename {
            item: item.clone(),
            new_name,
        };
        self.dispatcher.dispatch(operation, invocation, None).await
    }

    async fn copy_here(&self, file: &File, invocation: &mut Invocation) -> InvocationOutcome {
        let message = self
            .texts
            .text(MessageKey::CopyHereMessage, &[file.name.as_str()]);
        let Some(new_name) = self
            .prompt_name(MessageKey::CopyHereTitle, message, &file.name, invocation)
            .await
        else {
            return InvocationOutcome::Cancelled;
        };

        if let Err(e) = validate_new_name(&file.name, &new_name) {
            return self.reject_name(e, invocation);
        }

        let operation = ResolvedOperation::CopyWithName {
            file: file.clone(),
            new_name,
        };
        self.dispatcher.dispatch(operation, invocation, None).await
    }

    async fn download_zip_batch(
        &self,
        selection: &Selection,
        callback: Option<CompletionCallback>,
    ) -> InvocationOutcome {
        let session_id = self.config.session_id.as_deref();
        match self
            .service
            .download_as_zip_url_for(selection, session_id)
            .await
        {
            Ok(url) => {
                if let Some(callback) = callback {
                    callback();
                }
                self.navigator.open_download_url(&url);
                InvocationOutcome::Completed
            }
            Err(error) => {
                tracing::warn!(%error, items = selection.len(), "zip url request failed");
                self.dialogs.error(&error);
                InvocationOutcome::Failed(error)
            }
        }
    }

    /// Ask for a name; `None` when the prompt is cancelled.
    async fn prompt_name(
        &self,
        title: MessageKey,
        message: String,
        current: &str,
        invocation: &mut Invocation,
    ) -> Option<String> {
        invocation.advance(DispatchState::AwaitingInput);

        let current_name = current.to_string();
        let prompt = InputPrompt {
            title: self.texts.text(title, &[]),
            message,
            default_value: current.to_string(),
            accept: Box::new(move |input: &str| is_acceptable_name(&current_name, input)),
        };

        match self.dialogs.input_text(prompt).await {
            InputOutcome::Accepted(name) => {
                invocation.advance(DispatchState::Validating);
                Some(name)
            }
            InputOutcome::Cancelled => None,
        }
    }

    fn reject_name(
        &self,
        error: ValidationError,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        invocation.advance(DispatchState::Blocked);
        self.dialogs.info(
            &self.texts.text(MessageKey::InvalidNameTitle, &[]),
            &error.to_string(),
            None,
        );
        InvocationOutcome::Rejected(error)
    }

    fn unsupported(
        &self,
        action: Action,
        kind: ItemKind,
        invocation: &mut Invocation,
    ) -> InvocationOutcome {
        invocation.advance(DispatchState::Blocked);
        tracing::debug!(%action, %kind, "unsupported action");
        self.dialogs.info(
            &self.texts.text(MessageKey::UnsupportedActionTitle, &[]),
            &self
                .texts
                .text(MessageKey::UnsupportedActionMessage, &[action.as_ref()]),
            None,
        );
        InvocationOutcome::Rejected(ValidationError::UnsupportedAction {
            action,
            kind: Some(kind),
        })
    }

    fn illegal_target_texts(&self, transfer: Transfer, items: &Affected) -> (String, String) {
        use MessageKey::*;
        let title = match (transfer, items) {
            (Transfer::Copy, Affected::Single(FileSystemItem::File(_))) => CopyFileTitle,
            (Transfer::Copy, Affected::Single(FileSystemItem::Folder(_))) => CopyFolderTitle,
            (Transfer::Copy, Affected::Batch(_)) => CopyItemsTitle,
            (Transfer::Move, Affected::Single(FileSystemItem::File(_))) => MoveFileTitle,
            (Transfer::Move, Affected::Single(FileSystemItem::Folder(_))) => MoveFolderTitle,
            (Transfer::Move, Affected::Batch(_)) => MoveItemsTitle,
        };
        let message = match (transfer, items) {
            (Transfer::Copy, Affected::Single(item)) => {
                self.texts.text(CannotCopyItem, &[item.name()])
            }
            (Transfer::Move, Affected::Single(item)) => {
                self.texts.text(CannotMoveItem, &[item.name()])
            }
            (Transfer::Copy, Affected::Batch(_)) => self.texts.text(CannotCopyAllItems, &[]),
            (Transfer::Move, Affected::Batch(_)) => self.texts.text(CannotMoveAllItems, &[]),
        };
        (self.texts.text(title, &[]), message)
    }
}

impl ActionParam {
    fn into_target(self) -> Option<Folder> {
        match self {
            Self::Target(folder) => Some(folder),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRouter")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
