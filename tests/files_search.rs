mod common;

use common::{wait_until, RecordingRenderer};
use edge_launcher::actions::Action;
use edge_launcher::manager::{CollectionManager, Manager};
use edge_launcher::plugins::files::{search_files, CrawlLimits, FilesPlugin};
use edge_launcher::worker::Generation;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

#[test]
fn results_are_ranked_by_relevance() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("notes"));
    touch(&root.join("notes.txt"));
    touch(&root.join("old-notes.md"));
    touch(&root.join("notes-dir/inner.txt"));
    touch(&root.join("other/readme.md"));

    let generation = Generation::new();
    let token = generation.token(generation.advance());
    let found = search_files(&[root.to_path_buf()], "Notes", CrawlLimits::default(), &token);
    let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["notes", "notes-dir", "notes.txt", "old-notes.md", "inner.txt"]);
    assert!(found.iter().any(|f| f.name == "notes-dir" && f.is_dir));
}

#[test]
fn nested_roots_are_walked_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("inner/report.pdf"));

    let generation = Generation::new();
    let token = generation.token(generation.advance());
    let roots = vec![root.join("inner"), root.to_path_buf()];
    let found = search_files(&roots, "report", CrawlLimits::default(), &token);
    assert_eq!(found.len(), 1);
}

#[test]
fn cancelled_search_returns_nothing() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("match.txt"));

    let generation = Generation::new();
    let token = generation.token(generation.advance());
    generation.advance();
    let found = search_files(&[dir.path().to_path_buf()], "match", CrawlLimits::default(), &token);
    assert!(found.is_empty());
}

#[test]
fn result_limit_is_honoured() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        touch(&dir.path().join(format!("file{i}.log")));
    }
    let generation = Generation::new();
    let token = generation.token(generation.advance());
    let limits = CrawlLimits {
        max_results: 5,
        ..CrawlLimits::default()
    };
    let found = search_files(&[dir.path().to_path_buf()], "file", limits, &token);
    assert_eq!(found.len(), 5);
}

#[test]
fn plugin_searches_in_background() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("budget.ods"));
    touch(&dir.path().join("photo.png"));

    let mut ui = RecordingRenderer::default();
    let plugin = FilesPlugin::new(vec![dir.path().to_path_buf()], Duration::ZERO).with_limits(
        CrawlLimits {
            max_results: 10,
            max_scanned: 1_000,
        },
    );
    let mut manager = CollectionManager::new(plugin);
    manager.enter(&mut ui);
    assert_eq!(ui.status, "Type to search files...");

    manager.filter("budget", &mut ui);
    assert!(wait_until(Duration::from_secs(5), || {
        manager.poll(&mut ui);
        manager.len() == 1
    }));
    assert_eq!(ui.labels(), ["budget.ods"]);
    assert_eq!(
        manager.activate_selected(),
        Some(Action::Open(dir.path().join("budget.ods")))
    );

    manager.filter("", &mut ui);
    assert_eq!(manager.len(), 0);
    assert_eq!(ui.status, "Type to search files...");
}
