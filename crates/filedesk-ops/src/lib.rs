//! Action orchestration for filedesk.
//!
//! This crate turns a requested action on an item or a selection into at most
//! one remote call: it checks applicability and target legality, asks for
//! confirmation or a target folder when needed, dispatches the call and
//! publishes the resulting change event.

mod confirm;
mod conflict;
mod executor;
mod notify;
mod operation;
mod rename;
mod router;
mod services;
mod state;
mod target;

pub use confirm::{ConfirmationGate, DeletePrompt};
pub use conflict::{
    can_copy_all_to, can_copy_to, can_move_all_to, can_move_to, copy_conflict, move_conflict,
    ConflictKind,
};
pub use executor::{CompletionCallback, OperationDispatcher};
pub use notify::NotificationBus;
pub use operation::{ResolvedOperation, Transfer};
pub use rename::{is_acceptable_name, validate_new_name};
pub use router::{ActionParam, ActionRouter, Collaborators};
pub use services::{
    Admissibility, Anchor, BoxFuture, ConfirmOutcome, ConfirmStyle, DialogService, EventSink,
    FileSystemActionListener, FileViewer, FolderPicker, InputAcceptance, InputOutcome,
    InputPrompt, ItemProvider, Navigator, PickOutcome, PickerRequest, RemoteFileService,
};
pub use state::{DispatchState, Invocation, InvocationOutcome, TransitionError};
pub use target::TargetResolver;

/// Default capacity of the change event broadcast channel.
pub const EVENT_CHANNEL_SIZE: usize = 100;
