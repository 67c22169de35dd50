//! File system item types.

use std::fmt;
use std::ops::Deref;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque, globally unique identifier of a file system item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub CompactString);

impl ItemId {
    /// Create a new ItemId.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Root folders carry an empty parent id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Variant tag of a file system item.
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
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
}

/// A file snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub root_id: ItemId,
    pub name: CompactString,
    /// Ancestor-delimited path, prefixed by the parent's path.
    pub path: String,
    /// Extension without the leading dot (empty if none).
    #[serde(default)]
    pub extension: CompactString,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}

impl File {
    /// Create a file, deriving the extension from the name.
    pub fn new(
        id: impl Into<ItemId>,
        parent_id: impl Into<ItemId>,
        root_id: impl Into<ItemId>,
        name: impl Into<CompactString>,
        path: impl Into<String>,
        size: u64,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            root_id: root_id.into(),
            extension: extension_of(&name),
            name,
            path: path.into(),
            size,
        }
    }
}

/// A folder snapshot. Children are not held here; they come from an item provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub root_id: ItemId,
    pub name: CompactString,
    pub path: String,
}

impl Folder {
    /// Create a folder.
    pub fn new(
        id: impl Into<ItemId>,
        parent_id: impl Into<ItemId>,
        root_id: impl Into<ItemId>,
        name: impl Into<CompactString>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            root_id: root_id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a root folder. Its id doubles as the root id.
    pub fn root(
        id: impl Into<ItemId>,
        name: impl Into<CompactString>,
        path: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            root_id: id.clone(),
            id,
            parent_id: ItemId::default(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Check if this folder is the top of its root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }
}

/// A file or folder in the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSystemItem {
    File(File),
    Folder(Folder),
}

impl FileSystemItem {
    pub fn id(&self) -> &ItemId {
        match self {
            Self::File(f) => &f.id,
            Self::Folder(f) => &f.id,
        }
    }

    pub fn parent_id(&self) -> &ItemId {
        match self {
            Self::File(f) => &f.parent_id,
            Self::Folder(f) => &f.parent_id,
        }
    }

    pub fn root_id(&self) -> &ItemId {
        match self {
            Self::File(f) => &f.root_id,
            Self::Folder(f) => &f.root_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => &f.name,
            Self::Folder(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::File(f) => &f.path,
            Self::Folder(f) => &f.path,
        }
    }

    /// Get the variant tag.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::File(_) => ItemKind::File,
            Self::Folder(_) => ItemKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(f) => Some(f),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(f) => Some(f),
            Self::File(_) => None,
        }
    }
}

impl From<File> for FileSystemItem {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Folder> for FileSystemItem {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

/// An ordered, non-empty list of items chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<FileSystemItem>);

impl Selection {
    /// Create a selection. Fails on an empty list.
    pub fn new(items: Vec<FileSystemItem>) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(Self(items))
    }

    /// Consume the selection, returning its items.
    pub fn into_vec(self) -> Vec<FileSystemItem> {
        self.0
    }
}

impl Deref for Selection {
    type Target = [FileSystemItem];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<FileSystemItem>> for Selection {
    type Error = ValidationError;

    fn try_from(items: Vec<FileSystemItem>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

/// Extension of a file name, without the dot. Leading-dot names have none.
pub fn extension_of(name: &str) -> CompactString {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => CompactString::from(ext),
        _ => CompactString::default(),
    }
}
