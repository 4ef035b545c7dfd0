use pretty_assertions::assert_eq;
use splash_notify::{FileNoticeStore, MemoryNoticeStore, Notice, NoticeLevel, NoticeStore};

#[test]
fn notice_ids_are_unique() {
    let a = Notice::new(NoticeLevel::Info, "a");
    let b = Notice::new(NoticeLevel::Info, "b");
    assert_ne!(a.id, b.id);
}

#[test]
fn memory_store_take_clears() {
    let store = MemoryNoticeStore::new();
    store
        .push(vec![Notice::new(NoticeLevel::Info, "synced 3 objects")])
        .unwrap();
    assert_eq!(store.peek().unwrap().len(), 1);
    assert_eq!(store.take_all().unwrap().len(), 1);
    assert!(store.peek().unwrap().is_empty());
}

#[test]
fn file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileNoticeStore::new(dir.path().join("notices.json"));
    assert!(store.peek().unwrap().is_empty());
    assert!(store.take_all().unwrap().is_empty());
}

#[test]
fn file_store_survives_reopen_then_clears() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notices.json");

    {
        let store = FileNoticeStore::new(&path);
        store
            .push(vec![Notice::new(NoticeLevel::Error, "commit failed")])
            .unwrap();
        store
            .push(vec![Notice::new(NoticeLevel::Info, "retry scheduled")])
            .unwrap();
    }

    let store = FileNoticeStore::new(&path);
    let notices = store.take_all().unwrap();
    assert_eq!(
        notices.iter().map(|n| n.message.as_str()).collect::<Vec<_>>(),
        vec!["commit failed", "retry scheduled"]
    );
    assert!(store.take_all().unwrap().is_empty());
}

#[test]
fn interrupted_write_leaves_stored_notices_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notices.json");
    let store = FileNoticeStore::new(&path);
    store
        .push(vec![Notice::new(NoticeLevel::Error, "commit failed")])
        .unwrap();
    assert!(!dir.path().join("notices.json.tmp").exists());

    // a crash between writing the staging file and renaming it
    std::fs::write(dir.path().join("notices.json.tmp"), "[{\"id\":").unwrap();
    assert_eq!(store.peek().unwrap().len(), 1);

    store
        .push(vec![Notice::new(NoticeLevel::Info, "retry scheduled")])
        .unwrap();
    assert_eq!(store.take_all().unwrap().len(), 2);
    assert!(!dir.path().join("notices.json.tmp").exists());
}

#[test]
fn file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notices.json");
    std::fs::write(&path, "{oops").unwrap();
    assert!(FileNoticeStore::new(&path).peek().is_err());
}

#[test]
fn levels_are_ordered_by_severity() {
    assert!(NoticeLevel::Error > NoticeLevel::Warning);
    assert!(NoticeLevel::Warning > NoticeLevel::Info);
}
