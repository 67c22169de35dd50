//! In-memory reference backend.
//!
//! [`MemoryFileService`] answers every remote call against a [`Namespace`]
//! held behind a lock. It is what the command-line driver and the end-to-end
//! tests run against.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use filedesk_core::{
    Ack, Affected, File, FileSystemItem, Folder, ItemId, ServiceError, ServiceResult,
    extension_of,
};
use filedesk_ops::{BoxFuture, ItemProvider, RemoteFileService, copy_conflict, move_conflict};

use crate::config::{ConfigError, ServiceConfig};
use crate::urls::UrlBuilder;

/// Insertion-ordered snapshot of a file system, keyed by item id.
///
/// Serializes as a flat array of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FileSystemItem>", into = "Vec<FileSystemItem>")]
pub struct Namespace {
    items: IndexMap<ItemId, FileSystemItem>,
    next_id: u64,
}

impl From<Vec<FileSystemItem>> for Namespace {
    fn from(items: Vec<FileSystemItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.id().clone(), item))
                .collect(),
            next_id: 1,
        }
    }
}

impl From<Namespace> for Vec<FileSystemItem> {
    fn from(namespace: Namespace) -> Self {
        namespace.items.into_values().collect()
    }
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON listing.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render as a pretty-printed JSON listing.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items.values().collect::<Vec<_>>())
    }

    /// Insert or replace an item.
    pub fn insert(&mut self, item: impl Into<FileSystemItem>) -> Option<FileSystemItem> {
        let item = item.into();
        self.items.insert(item.id().clone(), item)
    }

    pub fn get(&self, id: &ItemId) -> Option<&FileSystemItem> {
        self.items.get(id)
    }

    pub fn folder(&self, id: &ItemId) -> Option<&Folder> {
        self.get(id).and_then(FileSystemItem::as_folder)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSystemItem> {
        self.items.values()
    }

    /// Top-level folders, in insertion order.
    pub fn roots(&self) -> Vec<Folder> {
        self.items
            .values()
            .filter_map(FileSystemItem::as_folder)
            .filter(|folder| folder.is_root())
            .cloned()
            .collect()
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children(&self, parent: &ItemId) -> Vec<FileSystemItem> {
        self.items
            .values()
            .filter(|item| item.parent_id() == parent)
            .cloned()
            .collect()
    }

    /// `id` followed by all of its descendants, breadth-first.
    pub fn subtree(&self, id: &ItemId) -> Vec<ItemId> {
        let mut found = vec![id.clone()];
        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            for item in self.items.values() {
                if item.parent_id() == &current && item.id() != &current {
                    found.push(item.id().clone());
                    queue.push_back(item.id().clone());
                }
            }
        }
        found
    }

    /// The child of `parent` called `name`, if any.
    pub fn child_named(&self, parent: &ItemId, name: &str) -> Option<&FileSystemItem> {
        self.items
            .values()
            .find(|item| item.parent_id() == parent && item.name() == name)
    }

    fn allocate_id(&mut self) -> ItemId {
        loop {
            self.next_id += 1;
            let id = ItemId::new(format!("n{}", self.next_id));
            if !self.items.contains_key(&id) {
                return id;
            }
        }
    }

    /// Move `id` and its subtree under a new root and path prefix.
    fn rewrite_subtree(&mut self, id: &ItemId, root: &ItemId, new_path: &str) {
        let Some(old_path) = self.get(id).map(|item| item.path().to_string()) else {
            return;
        };
        for member in self.subtree(id) {
            if let Some(item) = self.items.get_mut(&member) {
                let path = match item.path().strip_prefix(old_path.as_str()) {
                    Some(rest) => format!("{new_path}{rest}"),
                    None => item.path().to_string(),
                };
                set_location(item, root, path);
            }
        }
    }
}

fn set_location(item: &mut FileSystemItem, root: &ItemId, path: String) {
    match item {
        FileSystemItem::File(file) => {
            file.root_id = root.clone();
            file.path = path;
        }
        FileSystemItem::Folder(folder) => {
            folder.root_id = root.clone();
            folder.path = path;
        }
    }
}

fn set_parent(item: &mut FileSystemItem, parent: &ItemId) {
    match item {
        FileSystemItem::File(file) => file.parent_id = parent.clone(),
        FileSystemItem::Folder(folder) => folder.parent_id = parent.clone(),
    }
}

fn set_name(item: &mut FileSystemItem, name: &str) {
    match item {
        FileSystemItem::File(file) => {
            file.name = name.into();
            file.extension = extension_of(name);
        }
        FileSystemItem::Folder(folder) => folder.name = name.into(),
    }
}

fn child_path(parent_path: &str, name: &str) -> String {
    format!("{}/{name}", parent_path.trim_end_matches('/'))
}

fn sibling_path(path: &str, name: &str) -> String {
    match path.rfind('/') {
        Some(i) => format!("{}/{name}", &path[..i]),
        None => name.to_string(),
    }
}

fn current_item(namespace: &Namespace, id: &ItemId) -> ServiceResult<FileSystemItem> {
    namespace
        .get(id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found(id.clone()))
}

fn current_folder(namespace: &Namespace, id: &ItemId) -> ServiceResult<Folder> {
    namespace
        .folder(id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found(id.clone()))
}

fn current_items(
    namespace: &Namespace,
    items: &[FileSystemItem],
) -> ServiceResult<Vec<FileSystemItem>> {
    items
        .iter()
        .map(|item| current_item(namespace, item.id()))
        .collect()
}

fn check_free_names<'a>(
    namespace: &Namespace,
    parent: &ItemId,
    names: impl IntoIterator<Item = &'a str>,
) -> ServiceResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "Name cannot be empty".to_string(),
            });
        }
        if !seen.insert(name) || namespace.child_named(parent, name).is_some() {
            return Err(ServiceError::request_failed(format!(
                "An item named '{name}' already exists"
            )));
        }
    }
    Ok(())
}

/// Copy `source` (recursively for folders) into `parent` under `name`.
fn copy_subtree(namespace: &mut Namespace, source: &FileSystemItem, parent: &Folder, name: &str) {
    let id = namespace.allocate_id();
    let path = child_path(&parent.path, name);
    match source {
        FileSystemItem::File(file) => {
            namespace.insert(File::new(
                id,
                parent.id.clone(),
                parent.root_id.clone(),
                name,
                path,
                file.size,
            ));
        }
        FileSystemItem::Folder(folder) => {
            let copy = Folder::new(id, parent.id.clone(), parent.root_id.clone(), name, path);
            let children = namespace.children(&folder.id);
            namespace.insert(copy.clone());
            for child in &children {
                copy_subtree(namespace, child, &copy, child.name());
            }
        }
    }
}

/// A [`RemoteFileService`] and [`ItemProvider`] backed by an in-memory namespace.
pub struct MemoryFileService {
    namespace: RwLock<Namespace>,
    urls: UrlBuilder,
    read_only_roots: HashSet<ItemId>,
}

impl MemoryFileService {
    pub fn new(namespace: Namespace, urls: UrlBuilder) -> Self {
        Self {
            namespace: RwLock::new(namespace),
            urls,
            read_only_roots: HashSet::new(),
        }
    }

    pub fn from_config(namespace: Namespace, config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            namespace: RwLock::new(namespace),
            urls: UrlBuilder::from_config(config)?,
            read_only_roots: config.read_only_roots.iter().cloned().collect(),
        })
    }

    /// Refuse mutations touching `root`.
    pub fn with_read_only_root(mut self, root: impl Into<ItemId>) -> Self {
        self.read_only_roots.insert(root.into());
        self
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Copy of the current namespace.
    pub async fn snapshot(&self) -> Namespace {
        self.namespace.read().await.clone()
    }

    /// Create an empty folder called `name` inside `parent`.
    pub async fn create_folder(&self, parent: &Folder, name: &str) -> ServiceResult<Folder> {
        tracing::debug!(folder = %parent.id, name, "memory create folder");
        let mut ns = self.namespace.write().await;
        let parent = current_folder(&ns, &parent.id)?;
        self.check_writable(&parent.root_id, &parent.id)?;
        check_free_names(&ns, &parent.id, [name])?;

        let id = ns.allocate_id();
        let path = child_path(&parent.path, name);
        let folder = Folder::new(id, parent.id.clone(), parent.root_id.clone(), name, path);
        ns.insert(folder.clone());
        Ok(folder)
    }

    fn check_writable(&self, root: &ItemId, item: &ItemId) -> ServiceResult<()> {
        if self.read_only_roots.contains(root) {
            return Err(ServiceError::permission_denied(item.clone()));
        }
        Ok(())
    }

    fn copy_items(
        &self,
        ns: &mut Namespace,
        items: &Affected,
        target: &Folder,
    ) -> ServiceResult<()> {
        let target = current_folder(ns, &target.id)?;
        self.check_writable(&target.root_id, &target.id)?;

        let sources = current_items(ns, items.items())?;
        for item in &sources {
            if let Some(conflict) = copy_conflict(item, &target) {
                return Err(ServiceError::InvalidRequest {
                    message: format!("{}: {conflict}", item.name()),
                });
            }
        }
        check_free_names(ns, &target.id, sources.iter().map(FileSystemItem::name))?;

        for item in &sources {
            copy_subtree(ns, item, &target, item.name());
        }
        Ok(())
    }

    fn move_items(
        &self,
        ns: &mut Namespace,
        items: &Affected,
        target: &Folder,
    ) -> ServiceResult<()> {
        let target = current_folder(ns, &target.id)?;
        self.check_writable(&target.root_id, &target.id)?;

        let sources = current_items(ns, items.items())?;
        for item in &sources {
            self.check_writable(item.root_id(), item.id())?;
            if let Some(conflict) = move_conflict(item, &target) {
                return Err(ServiceError::InvalidRequest {
                    message: format!("{}: {conflict}", item.name()),
                });
            }
        }
        check_free_names(ns, &target.id, sources.iter().map(FileSystemItem::name))?;

        for item in &sources {
            let path = child_path(&target.path, item.name());
            ns.rewrite_subtree(item.id(), &target.root_id, &path);
            if let Some(moved) = ns.items.get_mut(item.id()) {
                set_parent(moved, &target.id);
            }
        }
        Ok(())
    }

    fn delete_items(&self, ns: &mut Namespace, items: &Affected) -> ServiceResult<()> {
        let sources = current_items(ns, items.items())?;
        for item in &sources {
            self.check_writable(item.root_id(), item.id())?;
        }
        for item in &sources {
            for id in ns.subtree(item.id()) {
                ns.items.shift_remove(&id);
            }
        }
        Ok(())
    }

    fn rename_item(
        &self,
        ns: &mut Namespace,
        item: &FileSystemItem,
        new_name: &str,
    ) -> ServiceResult<()> {
        let current = current_item(ns, item.id())?;
        self.check_writable(current.root_id(), current.id())?;
        if current.name() != new_name {
            check_free_names(ns, current.parent_id(), [new_name])?;
        }

        let path = sibling_path(current.path(), new_name);
        ns.rewrite_subtree(current.id(), current.root_id(), &path);
        if let Some(renamed) = ns.items.get_mut(current.id()) {
            set_name(renamed, new_name);
        }
        Ok(())
    }

    fn copy_file_with_name(
        &self,
        ns: &mut Namespace,
        file: &File,
        new_name: &str,
    ) -> ServiceResult<()> {
        let current = current_item(ns, &file.id)?;
        if !current.is_file() {
            return Err(ServiceError::InvalidRequest {
                message: format!("{} is not a file", file.id),
            });
        }
        let parent = current_folder(ns, current.parent_id())?;
        self.check_writable(&parent.root_id, &parent.id)?;
        check_free_names(ns, &parent.id, [new_name])?;

        copy_subtree(ns, &current, &parent, new_name);
        Ok(())
    }
}

impl RemoteFileService for MemoryFileService {
    fn copy<'a>(
        &'a self,
        items: &'a Affected,
        target: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Ack>> {
        Box::pin(async move {
            tracing::debug!(items = items.len(), folder = %target.id, "memory copy");
            let mut ns = self.namespace.write().await;
            self.copy_items(&mut ns, items, target)?;
            Ok(Ack)
        })
    }

    fn move_to<'a>(
        &'a self,
        items: &'a Affected,
        target: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Ack>> {
        Box::pin(async move {
            tracing::debug!(items = items.len(), folder = %target.id, "memory move");
            let mut ns = self.namespace.write().await;
            self.move_items(&mut ns, items, target)?;
            Ok(Ack)
        })
    }

    fn delete<'a>(&'a self, items: &'a Affected) -> BoxFuture<'a, ServiceResult<Ack>> {
        Box::pin(async move {
            tracing::debug!(items = items.len(), "memory delete");
            let mut ns = self.namespace.write().await;
            self.delete_items(&mut ns, items)?;
            Ok(Ack)
        })
    }

    fn rename<'a>(
        &'a self,
        item: &'a FileSystemItem,
        new_name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Ack>> {
        Box::pin(async move {
            tracing::debug!(item = %item.id(), new_name, "memory rename");
            let mut ns = self.namespace.write().await;
            self.rename_item(&mut ns, item, new_name)?;
            Ok(Ack)
        })
    }

    fn copy_with_name<'a>(
        &'a self,
        file: &'a File,
        new_name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Ack>> {
        Box::pin(async move {
            tracing::debug!(item = %file.id, new_name, "memory copy with name");
            let mut ns = self.namespace.write().await;
            self.copy_file_with_name(&mut ns, file, new_name)?;
            Ok(Ack)
        })
    }

    fn download_url(&self, file: &File, session_id: Option<&str>) -> String {
        self.urls.download(file, session_id)
    }

    fn download_as_zip_url(&self, item: &FileSystemItem, session_id: Option<&str>) -> String {
        self.urls.download_as_zip(item, session_id)
    }

    fn download_as_zip_url_for<'a>(
        &'a self,
        items: &'a [FileSystemItem],
        session_id: Option<&'a str>,
    ) -> BoxFuture<'a, ServiceResult<String>> {
        Box::pin(async move {
            let ns = self.namespace.read().await;
            current_items(&ns, items)?;
            self.urls
                .batch_zip(items, session_id)
                .map_err(|e| ServiceError::InvalidRequest {
                    message: e.to_string(),
                })
        })
    }

    fn public_link(&self, file: &File) -> String {
        self.urls.public_link(file)
    }
}

impl ItemProvider for MemoryFileService {
    fn root_folders(&self) -> BoxFuture<'_, ServiceResult<Vec<Folder>>> {
        Box::pin(async move { Ok(self.namespace.read().await.roots()) })
    }

    fn children<'a>(
        &'a self,
        folder: &'a Folder,
    ) -> BoxFuture<'a, ServiceResult<Vec<FileSystemItem>>> {
        Box::pin(async move {
            let ns = self.namespace.read().await;
            if !ns.contains(&folder.id) {
                return Err(ServiceError::not_found(folder.id.clone()));
            }
            Ok(ns.children(&folder.id))
        })
    }
}

impl std::fmt::Debug for MemoryFileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFileService")
            .field("urls", &self.urls)
            .field("read_only_roots", &self.read_only_roots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Namespace {
        Namespace::from(vec![
            Folder::root("r1", "r1", "/r1").into(),
            Folder::new("d1", "r1", "r1", "docs", "/r1/docs").into(),
            File::new("f1", "d1", "r1", "a.txt", "/r1/docs/a.txt", 3).into(),
            Folder::new("d2", "r1", "r1", "docs2", "/r1/docs2").into(),
        ])
    }

    #[test]
    fn test_subtree_follows_parents_not_prefixes() {
        let ns = sample();
        let ids: Vec<_> = ns.subtree(&ItemId::new("d1"));
        assert_eq!(ids, vec![ItemId::new("d1"), ItemId::new("f1")]);
    }

    #[test]
    fn test_rewrite_subtree() {
        let mut ns = sample();
        ns.rewrite_subtree(&ItemId::new("d1"), &ItemId::new("r9"), "/r9/moved");
        let file = ns.get(&ItemId::new("f1")).unwrap();
        assert_eq!(file.path(), "/r9/moved/a.txt");
        assert_eq!(file.root_id().as_str(), "r9");
        assert_eq!(ns.get(&ItemId::new("d2")).unwrap().path(), "/r1/docs2");
    }

    #[test]
    fn test_allocate_id_skips_taken() {
        let mut ns = sample();
        ns.insert(Folder::root("n2", "n2", "/n2"));
        assert_eq!(ns.allocate_id().as_str(), "n3");
    }

    #[test]
    fn test_paths() {
        assert_eq!(child_path("/r1/", "x"), "/r1/x");
        assert_eq!(sibling_path("/r1/docs/a.txt", "b.txt"), "/r1/docs/b.txt");
        assert_eq!(sibling_path("root", "top"), "top");
    }
}
