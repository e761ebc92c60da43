//! Log Replay Integration Tests
//!
//! Replaying a rename log on a tree with the old names, and replaying it
//! again once the names are new.

use std::fs;
use std::path::Path;

use expozice::core::rename_log::{self, parse_log};
use expozice::{LogReplayer, RenameEntry};
use tempfile::TempDir;

fn touch(content: &Path, relative: &str, body: &str) {
    let path = content.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

const LOG: &str = "\
files/Tabule/1-praveka.pdf <- files/Tabule/1-PRAVĚKÁ.pdf
files/Tabule/4-pobělohorská/vyznaceni-sanci-katastru-nove.jpg <- files/Tabule/4-pobělohorská/Vyznačení šancí na katastru Nové\u{a0}Bělé.jpg
garbage line without separator
files/Tabule/gone.jpg <- files/Tabule/Neexistuje.jpg
";

#[test]
fn test_replay_applies_and_then_skips() {
    let temp = TempDir::new().unwrap();
    let content = temp.path().join("content");
    touch(&content, "files/Tabule/1-PRAVĚKÁ.pdf", "panel");
    // On this machine the file has a plain space where the log has an NBSP
    touch(
        &content,
        "files/Tabule/4-pobělohorská/Vyznačení šancí na katastru Nové Bělé.jpg",
        "mapa",
    );

    let parsed = parse_log(LOG);
    assert_eq!(parsed.entries.len(), 3);
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].line_number, 3);

    let replayer = LogReplayer::new(&content);

    let first = replayer.replay(&parsed.entries);
    assert_eq!(first.total, 3);
    assert_eq!(first.renamed.len(), 2);
    assert_eq!(
        first.not_found,
        vec![RenameEntry::new("files/Tabule/gone.jpg", "files/Tabule/Neexistuje.jpg")]
    );
    assert!(first.errors.is_empty());
    assert_eq!(
        fs::read_to_string(content.join("files/Tabule/1-praveka.pdf")).unwrap(),
        "panel"
    );
    assert!(content
        .join("files/Tabule/4-pobělohorská/vyznaceni-sanci-katastru-nove.jpg")
        .is_file());

    let second = replayer.replay(&parsed.entries);
    assert!(second.renamed.is_empty());
    assert_eq!(second.already_applied.len(), 2);
    assert_eq!(second.not_found.len(), 1);
    assert!(second.errors.is_empty());
}

#[test]
fn test_replay_never_overwrites() {
    let temp = TempDir::new().unwrap();
    let content = temp.path().join("content");
    touch(&content, "files/Tabule/1-PRAVĚKÁ.pdf", "old");
    touch(&content, "files/Tabule/1-praveka.pdf", "new");

    let entries = vec![RenameEntry::new(
        "files/Tabule/1-praveka.pdf",
        "files/Tabule/1-PRAVĚKÁ.pdf",
    )];
    let report = LogReplayer::new(&content).replay(&entries);

    assert_eq!(report.already_applied, entries);
    assert_eq!(
        fs::read_to_string(content.join("files/Tabule/1-PRAVĚKÁ.pdf")).unwrap(),
        "old"
    );
    assert_eq!(
        fs::read_to_string(content.join("files/Tabule/1-praveka.pdf")).unwrap(),
        "new"
    );
}

#[test]
fn test_dry_run_replay_moves_nothing() {
    let temp = TempDir::new().unwrap();
    let content = temp.path().join("content");
    touch(&content, "files/Tabule/1-PRAVĚKÁ.pdf", "panel");

    let entries = vec![RenameEntry::new(
        "files/Tabule/1-praveka.pdf",
        "files/Tabule/1-PRAVĚKÁ.pdf",
    )];
    let report = LogReplayer::new(&content).with_dry_run(true).replay(&entries);

    assert_eq!(report.renamed, entries);
    assert!(content.join("files/Tabule/1-PRAVĚKÁ.pdf").is_file());
    assert!(!content.join("files/Tabule/1-praveka.pdf").exists());
}

#[test]
fn test_written_log_replays_on_a_fresh_copy() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("tabule_rename_log.txt");
    let entries = vec![
        RenameEntry::new("files/Tabule/b.jpg", "files/Tabule/Dlouhý název B.jpg"),
        RenameEntry::new("files/Tabule/a.jpg", "files/Tabule/Dlouhý název A.jpg"),
    ];
    rename_log::write_log(&log_path, &entries).unwrap();

    let content = temp.path().join("copy");
    touch(&content, "files/Tabule/Dlouhý název A.jpg", "a");
    touch(&content, "files/Tabule/Dlouhý název B.jpg", "b");

    let parsed = rename_log::read_log(&log_path).unwrap();
    // Sorted by new path on disk
    assert_eq!(parsed.entries[0].new_path, "files/Tabule/a.jpg");

    let report = LogReplayer::new(&content).replay(&parsed.entries);
    assert_eq!(report.renamed.len(), 2);
    assert_eq!(fs::read_to_string(content.join("files/Tabule/a.jpg")).unwrap(), "a");
    assert_eq!(fs::read_to_string(content.join("files/Tabule/b.jpg")).unwrap(), "b");
}
