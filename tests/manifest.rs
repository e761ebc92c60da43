//! Manifest Comparison Integration Tests

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use expozice::core::manifest;
use serde_json::json;
use tempfile::TempDir;

fn write_json(path: &Path, value: serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn configs(temp: &TempDir) -> std::path::PathBuf {
    let configs = temp.path().join("content/configs");
    write_json(
        &configs.join("chronicles/1900-1950/items.json"),
        json!({"items": [
            {"path": "files/Kroniky/1901.pdf"},
            {"path": "files/Kroniky/1902.pdf"},
            {"title": "no path"},
            {"path": ""}
        ]}),
    );
    write_json(
        &configs.join("exhibition-panels/1-praveka/items.json"),
        json!({"items": [
            {"path": "files/Tabule/1-praveka.pdf"},
            {"path": "other/kept-prefix.jpg"}
        ]}),
    );
    fs::write(configs.join("exhibition-panels/broken.json"), "not json").unwrap();
    configs
}

#[test]
fn test_configured_paths_strip_prefix() {
    let temp = TempDir::new().unwrap();
    let configs = configs(&temp);

    let configured = manifest::collect_configured_paths(&configs, "files/").unwrap();
    assert_eq!(configured.files_read, 2);
    assert!(configured.failures.is_empty());
    assert_eq!(
        configured.paths,
        set(&[
            "Kroniky/1901.pdf",
            "Kroniky/1902.pdf",
            "Tabule/1-praveka.pdf",
            "other/kept-prefix.jpg"
        ])
    );
}

#[test]
fn test_unreadable_items_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let configs = configs(&temp);
    let bad = configs.join("chronicles/bad");
    fs::create_dir_all(&bad).unwrap();
    fs::write(bad.join("items.json"), "{ broken").unwrap();

    let configured = manifest::collect_configured_paths(&configs, "files/").unwrap();
    assert_eq!(configured.files_read, 2);
    assert_eq!(configured.failures.len(), 1);
}

#[test]
fn test_compare_writes_sorted_outputs() {
    let temp = TempDir::new().unwrap();
    let configs = configs(&temp);
    let manifest_path = temp.path().join("samples/parsed_files.txt");
    fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    fs::write(
        &manifest_path,
        "Tabule/1-praveka.pdf\nKroniky/1903.pdf\n\nKroniky/1901.pdf\nA/first.jpg\n",
    )
    .unwrap();

    let parsed = manifest::read_manifest(&manifest_path).unwrap();
    let configured = manifest::collect_configured_paths(&configs, "files/").unwrap();
    let diff = manifest::diff(&parsed, &configured.paths);

    let missing = temp.path().join("missing.txt");
    let not_existing = temp.path().join("not_existing.txt");
    manifest::write_path_list(&missing, &diff.missing).unwrap();
    manifest::write_path_list(&not_existing, &diff.not_existing).unwrap();

    assert_eq!(
        fs::read_to_string(&missing).unwrap(),
        "A/first.jpg\nKroniky/1903.pdf\n"
    );
    assert_eq!(
        fs::read_to_string(&not_existing).unwrap(),
        "Kroniky/1902.pdf\nother/kept-prefix.jpg\n"
    );

    // Re-running on unchanged inputs reproduces the same files
    let again = manifest::diff(
        &manifest::read_manifest(&manifest_path).unwrap(),
        &manifest::collect_configured_paths(&configs, "files/").unwrap().paths,
    );
    assert_eq!(again, diff);
}

#[test]
fn test_missing_manifest_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = manifest::read_manifest(&temp.path().join("samples/parsed_files.txt"));
    assert!(matches!(result, Err(manifest::ManifestError::NotFound(_))));
}
