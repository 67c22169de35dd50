//! Collaborator contracts consumed by the router.
//!
//! Every suspension point of an invocation (remote call, confirmation, folder
//! picker, text prompt) is an async method here that resolves to exactly one
//! outcome. Implementations are injected at construction through
//! [`Collaborators`](crate::Collaborators).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use filedesk_core::{
    Ack, Action, Affected, File, FileSystemEvent, FileSystemItem, Folder, ServiceError,
    ServiceResult,
};

/// Type alias for boxed futures returned by async collaborator methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote file system backend.
pub trait RemoteFileService: Send + Sync {
    /// Copy items into a folder.
    fn copy<'a>(
        &'a self,
        items: &'a Affected,
        target: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Ack>>;

    /// Move items into a folder.
    fn move_to<'a>(
        &'a self,
        items: &'a Affected,
        target: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Ack>>;

    /// Delete items.
    fn delete<'a>(&'a self, items: &'a Affected) -> BoxFuture<'a, ServiceResult<Ack>>;

    /// Rename a single item.
    fn rename<'a>(
        &'a self,
        item: &'a FileSystemItem,
        new_name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Ack>>;

    /// Copy a file next to itself under a new name.
    fn copy_with_name<'a>(
        &'a self,
        file: &'a File,
        new_name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Ack>>;

    /// URL that downloads a file.
    fn download_url(&self, file: &File, session_id: Option<&str>) -> String;

    /// URL that downloads an item as a zip archive.
    fn download_as_zip_url(&self, item: &FileSystemItem, session_id: Option<&str>) -> String;

    /// URL that downloads several items as one zip archive. Resolved remotely.
    fn download_as_zip_url_for<'a>(
        &'a self,
        items: &'a [FileSystemItem],
        session_id: Option<&'a str>,
    ) -> BoxFuture<'a, ServiceResult<String>>;

    /// Public link to a file.
    fn public_link(&self, file: &File) -> String;
}

/// Tree listing used to populate the folder picker.
pub trait ItemProvider: Send + Sync {
    /// Top-level folders, one per root.
    fn root_folders(&self) -> BoxFuture<'_, ServiceResult<Vec<Folder>>>;

    /// Direct children of a folder.
    fn children<'a>(
        &'a self,
        folder: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Vec<FileSystemItem>>>;
}

/// Predicate deciding which picker candidates may be chosen.
pub type Admissibility = Box<dyn Fn(&FileSystemItem) -> bool + Send + Sync>;

/// Predicate deciding whether typed text may be accepted.
pub type InputAcceptance = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Opaque reference to the UI element an invocation was triggered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor(pub String);

/// Everything a folder picker needs to present a choice.
pub struct PickerRequest {
    pub title: String,
    pub message: String,
    pub action_label: String,
    pub provider: Arc<dyn ItemProvider>,
    pub admissible: Admissibility,
    pub anchor: Option<Anchor>,
}

impl fmt::Debug for PickerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerRequest")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("action_label", &self.action_label)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

/// Outcome of a folder picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(Folder),
    Cancelled,
}

/// Interactive folder chooser.
pub trait FolderPicker: Send + Sync {
    fn open(&self, request: PickerRequest) -> BoxFuture<'_, PickOutcome>;
}

/// Visual style of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStyle {
    /// Destructive action.
    Delete,
}

/// Outcome of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Cancelled,
}

/// A text prompt with its acceptance predicate.
pub struct InputPrompt {
    pub title: String,
    pub message: String,
    pub default_value: String,
    pub accept: InputAcceptance,
}

impl InputPrompt {
    /// Check typed text against the acceptance predicate.
    pub fn is_acceptable(&self, input: &str) -> bool {
        (self.accept)(input)
    }
}

impl fmt::Debug for InputPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPrompt")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

/// Outcome of a text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted(String),
    Cancelled,
}

/// Dialogs and prompts.
pub trait DialogService: Send + Sync {
    /// Ask the user to confirm or cancel.
    fn confirm<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
        style: ConfirmStyle,
    ) -> BoxFuture<'a, ConfirmOutcome>;

    /// Show an informational message, optionally with a detail line.
    fn info(&self, title: &str, message: &str, detail: Option<&str>);

    /// Show a service error as received.
    fn error(&self, error: &ServiceError);

    /// Ask for a line of text.
    fn input_text(&self, prompt: InputPrompt) -> BoxFuture<'_, InputOutcome>;
}

/// Hands download URLs to the browser/shell.
pub trait Navigator: Send + Sync {
    fn open_download_url(&self, url: &str);
}

/// Opens the in-app file viewer.
pub trait FileViewer: Send + Sync {
    fn open_viewer(&self, file: &File, params: &serde_json::Value);
}

/// Receives every published change event. Fire-and-forget.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &FileSystemEvent);
}

/// Notified once after every successfully completed mutating invocation.
pub trait FileSystemActionListener: Send + Sync {
    fn on_file_system_action(&self, action: Action);
}
