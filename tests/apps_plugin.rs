mod common;

use common::{wait_until, RecordingRenderer};
use edge_launcher::actions::Action;
use edge_launcher::manager::{CollectionManager, Manager};
use edge_launcher::plugins::apps::AppsPlugin;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_entry(dir: &Path, file: &str, name: &str, exec: &str) {
    let body = format!(
        "[Desktop Entry]\nType=Application\nName={name}\nExec={exec}\nIcon=app\n\n[Desktop Action new]\nName=Ignored\nExec=ignored\n"
    );
    fs::write(dir.join(file), body).unwrap();
}

fn loaded(dir: &Path, usage: HashMap<String, u32>) -> (CollectionManager<AppsPlugin>, RecordingRenderer) {
    let mut ui = RecordingRenderer::default();
    let mut manager = CollectionManager::new(AppsPlugin::new(vec![dir.to_path_buf()], usage));
    manager.enter(&mut ui);
    assert!(
        wait_until(Duration::from_secs(5), || {
            manager.poll(&mut ui);
            manager.len() > 0
        }),
        "applications never loaded"
    );
    (manager, ui)
}

#[test]
fn applications_load_in_background_sorted_by_name() {
    let dir = tempdir().unwrap();
    write_entry(dir.path(), "zebra.desktop", "Zebra", "zebra");
    write_entry(dir.path(), "apple.desktop", "apple", "apple %U");
    write_entry(dir.path(), "banana.desktop", "Banana", "banana");
    fs::write(
        dir.path().join("hidden.desktop"),
        "[Desktop Entry]\nType=Application\nName=Hidden\nExec=hidden\nNoDisplay=true\n",
    )
    .unwrap();

    let (manager, ui) = loaded(dir.path(), HashMap::new());
    assert_eq!(manager.len(), 3);
    assert_eq!(ui.labels(), ["Banana", "Zebra", "apple"]);
    assert_eq!(ui.status, "Banana");
}

#[test]
fn usage_counts_move_apps_up() {
    let dir = tempdir().unwrap();
    write_entry(dir.path(), "a.desktop", "Alpha", "alpha");
    write_entry(dir.path(), "b.desktop", "Beta", "beta");
    let usage = HashMap::from([("Beta".to_string(), 4)]);

    let (_manager, ui) = loaded(dir.path(), usage);
    assert_eq!(ui.labels(), ["Beta", "Alpha"]);
}

#[test]
fn activation_launches_without_field_codes() {
    let dir = tempdir().unwrap();
    write_entry(dir.path(), "apple.desktop", "apple", "apple --new %U");

    let (mut manager, _ui) = loaded(dir.path(), HashMap::new());
    assert_eq!(
        manager.activate_selected(),
        Some(Action::Launch {
            command: "apple --new".into(),
            usage_key: Some("apple".into()),
        })
    );
}

#[test]
fn filter_and_suggestion() {
    let dir = tempdir().unwrap();
    write_entry(dir.path(), "firefox.desktop", "Firefox", "firefox");
    write_entry(dir.path(), "files.desktop", "Files", "nautilus");
    write_entry(dir.path(), "term.desktop", "Terminal", "term");

    let (mut manager, mut ui) = loaded(dir.path(), HashMap::new());
    manager.filter("FI", &mut ui);
    assert_eq!(ui.labels(), ["Files", "Firefox"]);
    assert_eq!(manager.suggestion().as_deref(), Some("Files"));

    manager.filter("nothing here", &mut ui);
    assert_eq!(ui.status, "No applications found");
}
