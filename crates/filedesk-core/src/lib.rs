//! Core types for filedesk.
//!
//! This crate provides the data model shared by the rest of the workspace:
//! file system items, selections, actions, change events, errors and the
//! dispatch configuration.

mod action;
mod config;
mod error;
mod event;
mod node;
mod text;

pub use action::Action;
pub use config::{DispatchConfig, DispatchConfigBuilder};
pub use error::{Ack, ServiceError, ServiceResult, ValidationError};
pub use event::{Affected, FileSystemEvent};
pub use node::{extension_of, File, FileSystemItem, Folder, ItemId, ItemKind, Selection};
pub use text::{format_template, EnglishTexts, MessageKey, TextProvider};
