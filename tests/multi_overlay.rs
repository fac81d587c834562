//! Overlay scenarios mixing OS folders, archives and in-memory storage

use layered_vfs::{
    util, ArchiveFileSystem, CollectQuery, FilePath, FileSystem, FileSystemView,
    InMemoryFileSystem, MultiFileSystem, OverlayConfig, RegularFileSystem, VfsError,
};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

fn p(s: &str) -> FilePath {
    FilePath::of(s)
}

fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_read_only_member_first_wins() {
    let old = InMemoryFileSystem::preloaded(vec![(p("a.txt"), "old")], true).unwrap();
    let new = InMemoryFileSystem::preloaded(vec![(p("a.txt"), "new")], false).unwrap();
    let multi = MultiFileSystem::builder().layer(old).layer(new).build();

    assert_eq!(util::read_string(&multi, &p("a.txt")).unwrap(), "old");

    let writable = multi.writable_member().unwrap();
    assert_eq!(util::read_string(writable, &p("a.txt")).unwrap(), "new");
    util::write_string(writable, &p("b.txt"), "fresh").unwrap();
    assert_eq!(util::read_string(&multi, &p("b.txt")).unwrap(), "fresh");
}

#[test]
fn test_saves_shadow_archive() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArchiveFileSystem::from_reader(Cursor::new(zip_bytes(&[
        ("script/main.lua", "print('base')"),
        ("images/logo.png", "png"),
    ])))
    .unwrap();
    let saves = RegularFileSystem::new(temp_dir.path());
    util::write_string(&saves, &p("script/main.lua"), "print('patched')").unwrap();

    let multi = MultiFileSystem::builder().layer(saves).layer(archive).build();

    assert_eq!(
        util::read_string(&multi, &p("script/main.lua")).unwrap(),
        "print('patched')"
    );
    assert_eq!(util::read_string(&multi, &p("images/logo.png")).unwrap(), "png");
    assert_eq!(multi.file_size(&p("images/logo.png")).unwrap(), 3);

    let files = multi.collect(&CollectQuery::files(FilePath::empty())).unwrap();
    assert_eq!(files, vec![p("images/logo.png"), p("script/main.lua")]);

    // The archive is read-only, so writes land in the OS folder
    let writable = multi.require_writable_member().unwrap();
    util::write_string(writable, &p("images/new.png"), "new").unwrap();
    assert!(temp_dir.path().join("images/new.png").is_file());
}

#[test]
fn test_view_member() {
    let inner = Arc::new(InMemoryFileSystem::new(false));
    util::write_string(inner.as_ref(), &p("mods/cool/a.txt"), "mod").unwrap();
    util::write_string(inner.as_ref(), &p("a.txt"), "root").unwrap();

    let multi = MultiFileSystem::builder()
        .layer(FileSystemView::new(inner.clone(), p("mods/cool")))
        .shared_layer(inner)
        .build();

    assert_eq!(util::read_string(&multi, &p("a.txt")).unwrap(), "mod");
    assert!(multi.is_folder(&p("mods")));
}

#[test]
fn test_overlay_is_read_only() {
    let multi = MultiFileSystem::builder()
        .layer(InMemoryFileSystem::new(false))
        .build();
    assert!(multi.is_read_only());
    assert!(multi.as_writable().is_none());
}

#[test]
fn test_no_writable_member_differs_from_not_found() {
    let archive = ArchiveFileSystem::from_reader(Cursor::new(zip_bytes(&[("a.txt", "a")]))).unwrap();
    let multi = MultiFileSystem::builder().layer(archive).build();

    let err = multi.require_writable_member().err().expect("expected NoWritableMember error");
    assert!(matches!(err, VfsError::NoWritableMember));
    assert!(!err.is_not_found());
}

#[test]
fn test_closed_member_skipped_by_collect() {
    let first: Arc<dyn FileSystem> =
        Arc::new(InMemoryFileSystem::preloaded(vec![(p("a.txt"), "a")], false).unwrap());
    let second: Arc<dyn FileSystem> =
        Arc::new(InMemoryFileSystem::preloaded(vec![(p("b.txt"), "b")], false).unwrap());
    let multi = MultiFileSystem::new(vec![first.clone(), second]);

    first.close();
    let files = multi.collect(&CollectQuery::files(FilePath::empty())).unwrap();
    assert_eq!(files, vec![p("b.txt")]);
}

#[test]
fn test_overlay_from_config() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("base.zip"),
        zip_bytes(&[("a.txt", "from archive"), ("b.txt", "b")]),
    )
    .unwrap();
    std::fs::create_dir(temp_dir.path().join("saves")).unwrap();
    std::fs::write(temp_dir.path().join("saves/a.txt"), "from saves").unwrap();

    let config_path = temp_dir.path().join("overlay.toml");
    std::fs::write(
        &config_path,
        r#"
[[layer]]
kind = "regular"
path = "saves"

[[layer]]
kind = "archive"
path = "base.zip"
"#,
    )
    .unwrap();

    let multi = OverlayConfig::load(&config_path).unwrap().build().unwrap();
    assert_eq!(multi.members().len(), 2);
    assert_eq!(util::read_string(&multi, &p("a.txt")).unwrap(), "from saves");
    assert_eq!(util::read_string(&multi, &p("b.txt")).unwrap(), "b");

    multi.close();
    assert!(multi.members().iter().all(|fs| !fs.is_open()));
}

#[test]
fn test_config_with_missing_archive_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = OverlayConfig::from_toml_str(&format!(
        "[[layer]]\nkind = \"archive\"\npath = {:?}\n",
        temp_dir.path().join("missing.zip")
    ))
    .unwrap();
    assert!(config.build().unwrap_err().is_not_found());
}
