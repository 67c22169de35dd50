//! Service side of filedesk.
//!
//! Configuration for a remote file service, the `file_action` URL scheme it
//! speaks, and [`MemoryFileService`], an in-memory backend implementing the
//! collaborator traits of `filedesk-ops`.

mod config;
mod memory;
mod urls;

pub use config::{ConfigError, ServiceConfig, ServiceConfigBuilder, ServiceConfigBuilderError};
pub use memory::{MemoryFileService, Namespace};
pub use urls::UrlBuilder;
