use filedesk_core::{
    Action, Affected, File, FileSystemEvent, FileSystemItem, Folder, ItemId, ItemKind, Selection,
    ServiceError, ValidationError,
};

fn docs() -> FileSystemItem {
    Folder::new("docs1", "root", "root", "docs", "/root/docs").into()
}

fn report() -> FileSystemItem {
    File::new("f1", "docs1", "root", "report.txt", "/root/docs/report.txt", 2048).into()
}

#[test]
fn test_item_id_operations() {
    let id1 = ItemId::new("abc");
    let id2 = ItemId::from("abc");

    assert_eq!(id1, id2);
    assert_eq!(id1.as_str(), "abc");
    assert_eq!(id1.to_string(), "abc");
    assert!(ItemId::default().is_empty());
}

#[test]
fn test_item_variant_discrimination() {
    let folder = docs();
    assert!(folder.is_folder());
    assert!(!folder.is_file());
    assert_eq!(folder.kind(), ItemKind::Folder);

    let file = report();
    assert!(file.is_file());
    assert_eq!(file.as_file().map(|f| f.size), Some(2048));
    assert_eq!(file.as_file().map(|f| f.extension.as_str()), Some("txt"));
}

#[test]
fn test_child_path_prefixed_by_parent() {
    let folder = docs();
    let file = report();

    assert_eq!(file.parent_id(), folder.id());
    assert!(file.path().starts_with(folder.path()));
    assert_eq!(file.root_id(), folder.root_id());
}

#[test]
fn test_selection_preserves_order_and_variants() {
    let selection = Selection::new(vec![report(), docs()]).unwrap();

    assert_eq!(selection.len(), 2);
    assert!(selection[0].is_file());
    assert!(selection[1].is_folder());
}

#[test]
fn test_selection_try_from_empty() {
    let result: Result<Selection, _> = Vec::<FileSystemItem>::new().try_into();
    assert_eq!(result, Err(ValidationError::EmptySelection));
}

#[test]
fn test_action_applicability_per_item() {
    let folder = docs();
    let file = report();

    assert!(Action::PublicLink.is_applicable(&file));
    assert!(!Action::PublicLink.is_applicable(&folder));
    assert!(Action::DownloadAsZip.is_applicable(&folder));
    assert!(!Action::Download.is_applicable(&folder));
    assert!(!Action::CopyHere.is_applicable(&folder));
}

#[test]
fn test_event_from_selection() {
    let selection = Selection::new(vec![report(), docs()]).unwrap();
    let event = FileSystemEvent::new(Affected::from(selection), Action::Move);

    assert_eq!(event.action(), Action::Move);
    assert_eq!(event.affected().len(), 2);
    assert!(event.affected().is_batch());
}

#[test]
fn test_item_json_roundtrip_listing() {
    let listing = r#"[
        {"type": "folder", "id": "root", "parent_id": "", "root_id": "root", "name": "root", "path": "/root"},
        {"type": "file", "id": "f1", "parent_id": "root", "root_id": "root", "name": "a.txt", "path": "/root/a.txt", "extension": "txt", "size": 5}
    ]"#;

    let items: Vec<FileSystemItem> = serde_json::from_str(listing).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].as_folder().is_some_and(Folder::is_root));
    assert_eq!(items[1].name(), "a.txt");
}

#[test]
fn test_service_error_variants() {
    let err = ServiceError::request_failed("boom");
    assert!(err.to_string().contains("boom"));
    assert_ne!(err, ServiceError::NoResponse);
}
