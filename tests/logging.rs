use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("log.txt");

    edge_launcher::logging::init(true, Some(path.clone()));
    tracing::info!("first message");

    // A second install is ignored and must not panic.
    edge_launcher::logging::init(false, None);
    tracing::info!("second message");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("first message"));
    assert!(contents.contains("second message"));
    assert!(!contents.contains("\u{1b}["), "file output should not carry colours");
}
