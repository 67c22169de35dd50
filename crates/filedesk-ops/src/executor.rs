//! Single-call dispatch with unified success/failure handling.

use std::sync::Arc;

use filedesk_core::{Ack, ServiceResult};

use crate::notify::NotificationBus;
use crate::operation::ResolvedOperation;
use crate::services::{DialogService, RemoteFileService};
use crate::state::{DispatchState, Invocation, InvocationOutcome};

/// Invoked after a successful dispatch, between event publication and
/// listener notification.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Issues the remote call for a resolved operation and reports the result.
pub struct OperationDispatcher {
    service: Arc<dyn RemoteFileService>,
    dialogs: Arc<dyn DialogService>,
    bus: NotificationBus,
}

impl OperationDispatcher {
    pub fn new(
        service: Arc<dyn RemoteFileService>,
        dialogs: Arc<dyn DialogService>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            service,
            dialogs,
            bus,
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    /// Issue exactly one remote call for `operation`.
    ///
    /// On failure the error goes to the dialog service and nothing is
    /// published. On success the event is published, then `callback` runs,
    /// then listeners are notified. There is no retry.
    pub async fn dispatch(
        &self,
        operation: ResolvedOperation,
        invocation: &mut Invocation,
        callback: Option<CompletionCallback>,
    ) -> InvocationOutcome {
        invocation.advance(DispatchState::Dispatching);
        tracing::debug!(
            invocation = invocation.id(),
            action = %operation.action(),
            items = operation.item_count(),
            "dispatching"
        );

        match self.call(&operation).await {
            Ok(Ack) => {
                invocation.advance(DispatchState::Succeeded);
                let action = operation.action();
                let event = operation.into_event();

                self.bus.publish(&event);
                if let Some(callback) = callback {
                    callback();
                }
                self.bus.notify(action);

                invocation.finish();
                InvocationOutcome::Dispatched(event)
            }
            Err(error) => {
                invocation.advance(DispatchState::Failed);
                tracing::warn!(
                    invocation = invocation.id(),
                    action = %operation.action(),
                    %error,
                    "dispatch failed"
                );
                self.dialogs.error(&error);

                invocation.finish();
                InvocationOutcome::Failed(error)
            }
        }
    }

    async fn call(&self, operation: &ResolvedOperation) -> ServiceResult<Ack> {
        match operation {
            ResolvedOperation::Copy { items, target } => self.service.copy(items, target).await,
            ResolvedOperation::Move { items, target } => {
                self.service.move_to(items, target).await
            }
            ResolvedOperation::Delete { items } => self.service.delete(items).await,
            ResolvedOperation::Rename { item, new_name } => {
                self.service.rename(item, new_name).await
            }
            ResolvedOperation::CopyWithName { file, new_name } => {
                self.service.copy_with_name(file, new_name).await
            }
        }
    }
}

impl std::fmt::Debug for OperationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDispatcher")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
