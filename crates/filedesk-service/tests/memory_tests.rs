use std::io::Write;
use std::sync::{Arc, Mutex};

use filedesk_core::{
    Action, Affected, DispatchConfig, EnglishTexts, File, FileSystemItem, Folder, ItemId,
    Selection, ServiceError,
};
use filedesk_ops::{
    ActionParam, ActionRouter, BoxFuture, Collaborators, ConfirmOutcome, ConfirmStyle,
    DialogService, FileViewer, FolderPicker, InputOutcome, InputPrompt, InvocationOutcome,
    ItemProvider, Navigator, PickOutcome, PickerRequest, RemoteFileService,
};
use filedesk_service::{MemoryFileService, Namespace, ServiceConfig, UrlBuilder};

const LISTING: &str = r#"[
    {"type": "folder", "id": "r1", "parent_id": "", "root_id": "r1", "name": "r1", "path": "/r1"},
    {"type": "folder", "id": "d1", "parent_id": "r1", "root_id": "r1", "name": "docs", "path": "/r1/docs"},
    {"type": "file", "id": "f1", "parent_id": "d1", "root_id": "r1", "name": "a.txt", "path": "/r1/docs/a.txt", "size": 10},
    {"type": "folder", "id": "d3", "parent_id": "d1", "root_id": "r1", "name": "sub", "path": "/r1/docs/sub"},
    {"type": "file", "id": "f3", "parent_id": "d3", "root_id": "r1", "name": "b.txt", "path": "/r1/docs/sub/b.txt", "size": 20},
    {"type": "folder", "id": "d2", "parent_id": "r1", "root_id": "r1", "name": "docs2", "path": "/r1/docs2"},
    {"type": "folder", "id": "r2", "parent_id": "", "root_id": "r2", "name": "r2", "path": "/r2"}
]"#;

fn service() -> MemoryFileService {
    let urls = UrlBuilder::new("https://files.test/api".parse().unwrap());
    MemoryFileService::new(Namespace::from_json(LISTING).unwrap(), urls)
}

async fn item(service: &MemoryFileService, id: &str) -> FileSystemItem {
    service
        .snapshot()
        .await
        .get(&ItemId::new(id))
        .cloned()
        .unwrap_or_else(|| panic!("missing {id}"))
}

async fn folder(service: &MemoryFileService, id: &str) -> Folder {
    item(service, id).await.as_folder().cloned().unwrap()
}

fn by_path<'a>(ns: &'a Namespace, path: &str) -> Option<&'a FileSystemItem> {
    ns.iter().find(|item| item.path() == path)
}

#[test]
fn test_load_listing_and_config_from_files() {
    let mut listing = tempfile::NamedTempFile::new().unwrap();
    listing.write_all(LISTING.as_bytes()).unwrap();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "base_url = \"https://files.test/api\"").unwrap();
    writeln!(config, "read_only_roots = [\"r2\"]").unwrap();

    let json = std::fs::read_to_string(listing.path()).unwrap();
    let namespace = Namespace::from_json(&json).unwrap();
    assert_eq!(namespace.len(), 7);
    assert_eq!(namespace.roots().len(), 2);

    let config = ServiceConfig::load(config.path()).unwrap();
    let service = MemoryFileService::from_config(namespace, &config).unwrap();
    assert_eq!(
        service.download_url(&File::new("f1", "d1", "r1", "a.txt", "/r1/docs/a.txt", 10), None),
        "https://files.test/api/file_action?action=download&id=f1&item_type=f"
    );
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServiceConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_listing_roundtrip_keeps_order() {
    let namespace = Namespace::from_json(LISTING).unwrap();
    let again = Namespace::from_json(&namespace.to_json().unwrap()).unwrap();
    let ids: Vec<_> = again.iter().map(|item| item.id().to_string()).collect();
    assert_eq!(ids, vec!["r1", "d1", "f1", "d3", "f3", "d2", "r2"]);
}

#[tokio::test]
async fn test_copy_folder_is_recursive() {
    let service = service();
    let docs = Affected::Single(item(&service, "d1").await);
    let target = folder(&service, "r2").await;

    service.copy(&docs, &target).await.unwrap();

    let ns = service.snapshot().await;
    assert_eq!(ns.len(), 7 + 4);
    let copied = by_path(&ns, "/r2/docs/sub/b.txt").unwrap();
    assert_eq!(copied.root_id().as_str(), "r2");
    assert_ne!(copied.id().as_str(), "f3");
    assert!(by_path(&ns, "/r1/docs/sub/b.txt").is_some());
}

#[tokio::test]
async fn test_move_reroots_subtree() {
    let service = service();
    let docs = Affected::Single(item(&service, "d1").await);
    let target = folder(&service, "r2").await;

    service.move_to(&docs, &target).await.unwrap();

    let ns = service.snapshot().await;
    assert_eq!(ns.len(), 7);
    let moved = ns.get(&ItemId::new("d1")).unwrap();
    assert_eq!(moved.parent_id().as_str(), "r2");
    let nested = ns.get(&ItemId::new("f3")).unwrap();
    assert_eq!(nested.path(), "/r2/docs/sub/b.txt");
    assert_eq!(nested.root_id().as_str(), "r2");
    assert_eq!(ns.get(&ItemId::new("d2")).unwrap().path(), "/r1/docs2");
}

#[tokio::test]
async fn test_move_into_own_subtree_refused() {
    let service = service();
    let docs = Affected::Single(item(&service, "d1").await);
    let target = folder(&service, "d3").await;

    let err = service.move_to(&docs, &target).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_delete_removes_subtree() {
    let service = service();
    let docs = Affected::Single(item(&service, "d1").await);

    service.delete(&docs).await.unwrap();

    let ns = service.snapshot().await;
    let ids: Vec<_> = ns.iter().map(|item| item.id().to_string()).collect();
    assert_eq!(ids, vec!["r1", "d2", "r2"]);
}

#[tokio::test]
async fn test_rename_rewrites_paths() {
    let service = service();
    let docs = item(&service, "d1").await;

    service.rename(&docs, "papers").await.unwrap();

    let ns = service.snapshot().await;
    assert_eq!(ns.get(&ItemId::new("d1")).unwrap().name(), "papers");
    assert_eq!(ns.get(&ItemId::new("f3")).unwrap().path(), "/r1/papers/sub/b.txt");
    // Prefix siblings stay put.
    assert_eq!(ns.get(&ItemId::new("d2")).unwrap().path(), "/r1/docs2");
}

#[tokio::test]
async fn test_rename_file_updates_extension() {
    let service = service();
    let file = item(&service, "f1").await;

    service.rename(&file, "a.md").await.unwrap();

    let renamed = item(&service, "f1").await;
    assert_eq!(renamed.as_file().unwrap().extension, "md");
}

#[tokio::test]
async fn test_name_clash_fails_without_mutation() {
    let service = service();
    let docs2 = item(&service, "d2").await;
    let before = service.snapshot().await;

    let err = service.rename(&docs2, "docs").await.unwrap_err();

    assert!(matches!(err, ServiceError::RequestFailed { .. }));
    assert_eq!(service.snapshot().await, before);
}

#[tokio::test]
async fn test_missing_item_not_found() {
    let service = service();
    let ghost: FileSystemItem = File::new("ghost", "d1", "r1", "g.txt", "/r1/docs/g.txt", 0).into();

    let err = service.delete(&Affected::Single(ghost.clone())).await.unwrap_err();
    assert_eq!(err, ServiceError::not_found("ghost"));

    let err = service
        .download_as_zip_url_for(std::slice::from_ref(&ghost), None)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::not_found("ghost"));
}

#[tokio::test]
async fn test_create_folder() {
    let service = service();
    let docs = folder(&service, "d1").await;

    let created = service.create_folder(&docs, "new").await.unwrap();
    assert_eq!(created.path, "/r1/docs/new");
    assert_eq!(created.parent_id, ItemId::new("d1"));
    assert_eq!(created.root_id, ItemId::new("r1"));

    let ns = service.snapshot().await;
    assert_eq!(ns.len(), 8);
    assert_eq!(ns.children(&created.id), vec![]);
    assert_eq!(by_path(&ns, "/r1/docs/new").map(|i| i.id()), Some(&created.id));

    let err = service.create_folder(&docs, "sub").await.unwrap_err();
    assert!(matches!(err, ServiceError::RequestFailed { .. }));
    let err = service.create_folder(&docs, "").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest { .. }));

    let ghost = Folder::new("ghost", "r1", "r1", "ghost", "/r1/ghost");
    let err = service.create_folder(&ghost, "x").await.unwrap_err();
    assert_eq!(err, ServiceError::not_found("ghost"));
    assert_eq!(service.snapshot().await.len(), 8);
}

#[tokio::test]
async fn test_create_folder_in_read_only_root() {
    let service = service().with_read_only_root("r2");
    let r2 = folder(&service, "r2").await;

    let err = service.create_folder(&r2, "new").await.unwrap_err();
    assert_eq!(err, ServiceError::permission_denied("r2"));
}

#[tokio::test]
async fn test_read_only_root_denied() {
    let service = service().with_read_only_root("r1");
    let file = Affected::Single(item(&service, "f1").await);
    let target = folder(&service, "r2").await;

    let err = service.move_to(&file, &target).await.unwrap_err();
    assert_eq!(err, ServiceError::permission_denied("f1"));

    // Copying out of a read-only root is fine.
    service.copy(&file, &target).await.unwrap();
}

#[tokio::test]
async fn test_copy_with_name() {
    let service = service();
    let file = item(&service, "f1").await;

    service
        .copy_with_name(file.as_file().unwrap(), "a (copy).txt")
        .await
        .unwrap();

    let ns = service.snapshot().await;
    let copy = by_path(&ns, "/r1/docs/a (copy).txt").unwrap();
    assert_eq!(copy.parent_id().as_str(), "d1");
    assert_eq!(copy.as_file().unwrap().size, 10);
}

#[tokio::test]
async fn test_item_provider() {
    let service = service();
    let roots = service.root_folders().await.unwrap();
    assert_eq!(roots.len(), 2);

    let children = service.children(&roots[0]).await.unwrap();
    let names: Vec<_> = children.iter().map(FileSystemItem::name).collect();
    assert_eq!(names, vec!["docs", "docs2"]);
}

struct ScriptedPicker(Folder);

impl FolderPicker for ScriptedPicker {
    fn open(&self, request: PickerRequest) -> BoxFuture<'_, PickOutcome> {
        Box::pin(async move {
            let candidate = FileSystemItem::Folder(self.0.clone());
            if request.is_admissible(&candidate) {
                PickOutcome::Selected(self.0.clone())
            } else {
                PickOutcome::Cancelled
            }
        })
    }
}

#[derive(Default)]
struct QuietDialogs {
    shown: Mutex<Vec<String>>,
}

impl DialogService for QuietDialogs {
    fn confirm<'a>(
        &'a self,
        _title: &'a str,
        _message: &'a str,
        _style: ConfirmStyle,
    ) -> BoxFuture<'a, ConfirmOutcome> {
        Box::pin(async { ConfirmOutcome::Confirmed })
    }

    fn info(&self, title: &str, message: &str, _detail: Option<&str>) {
        self.shown.lock().unwrap().push(format!("{title}: {message}"));
    }

    fn error(&self, error: &ServiceError) {
        self.shown.lock().unwrap().push(error.to_string());
    }

    fn input_text(&self, _prompt: InputPrompt) -> BoxFuture<'_, InputOutcome> {
        Box::pin(async { InputOutcome::Cancelled })
    }
}

struct Nowhere;

impl Navigator for Nowhere {
    fn open_download_url(&self, _url: &str) {}
}

impl FileViewer for Nowhere {
    fn open_viewer(&self, _file: &File, _params: &serde_json::Value) {}
}

fn router(
    service: Arc<MemoryFileService>,
    pick: Folder,
    dialogs: Arc<QuietDialogs>,
) -> ActionRouter {
    ActionRouter::new(
        Collaborators {
            service: service.clone(),
            items: service,
            picker: Arc::new(ScriptedPicker(pick)),
            dialogs,
            navigator: Arc::new(Nowhere),
            viewer: Arc::new(Nowhere),
            texts: Arc::new(EnglishTexts),
        },
        DispatchConfig::default(),
    )
}

#[tokio::test]
async fn test_router_moves_through_memory_backend() {
    let service = Arc::new(service());
    let r2 = folder(&service, "r2").await;
    let dialogs = Arc::new(QuietDialogs::default());
    let router = router(service.clone(), r2, dialogs.clone());
    let mut events = router.subscribe();

    let docs = item(&service, "d1").await;
    let outcome = router
        .on_action(&docs, Action::Move, None, ActionParam::None)
        .await;

    assert!(outcome.is_dispatched());
    assert_eq!(events.try_recv().unwrap().action(), Action::Move);
    assert_eq!(item(&service, "f1").await.path(), "/r2/docs/a.txt");
    assert!(dialogs.shown.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_router_batch_delete_through_memory_backend() {
    let service = Arc::new(service());
    let r2 = folder(&service, "r2").await;
    let router = router(service.clone(), r2, Arc::new(QuietDialogs::default()));

    let selection = Selection::new(vec![
        item(&service, "f1").await,
        item(&service, "d2").await,
    ])
    .unwrap();
    let outcome = router
        .on_batch_action(&selection, Action::Delete, None, None, None)
        .await;

    assert_eq!(outcome.event().unwrap().affected().len(), 2);
    assert_eq!(service.snapshot().await.len(), 5);
}

#[tokio::test]
async fn test_router_reports_backend_failure() {
    let service = Arc::new(service().with_read_only_root("r2"));
    let r2 = folder(&service, "r2").await;
    let dialogs = Arc::new(QuietDialogs::default());
    let router = router(service.clone(), r2.clone(), dialogs.clone());

    let file = item(&service, "f1").await;
    let outcome = router
        .on_action(&file, Action::Copy, None, ActionParam::Target(r2))
        .await;

    assert_eq!(
        outcome,
        InvocationOutcome::Failed(ServiceError::permission_denied("r2"))
    );
    assert_eq!(
        dialogs.shown.lock().unwrap().as_slice(),
        ["Permission denied: r2"]
    );
    assert_eq!(service.snapshot().await.len(), 7);
}
