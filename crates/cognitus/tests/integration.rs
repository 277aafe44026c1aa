use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cognitus_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cognitus");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[index]
path = "{root}/data/index.sqlite"

[collection]
path = "{root}/data/collection.sqlite"

[dedup]
threshold = 90

[log]
level = "warn"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("cognitus.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cognitus(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cognitus_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cognitus binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn admit(config_path: &Path, front: &str, back: &str) -> String {
    let (stdout, stderr, success) = run_cognitus(
        config_path,
        &["admit", "--topic", "Biology", "--front", front, "--back", back],
    );
    assert!(success, "admit failed: stdout={}, stderr={}", stdout, stderr);
    stdout
}

#[test]
fn test_init_creates_databases() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cognitus(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/index.sqlite").exists());
    assert!(tmp.path().join("data/collection.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_cognitus(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_cognitus(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_sync_empty_collection() {
    let (_tmp, config_path) = setup_test_env();

    run_cognitus(&config_path, &["init"]);
    let (stdout, stderr, success) =
        run_cognitus(&config_path, &["sync", "--progress", "off"]);
    assert!(success, "sync failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Sync complete: 0 inserted, 0 deleted, 0 skipped"));
}

#[test]
fn test_admit_then_reject_duplicate() {
    let (_tmp, config_path) = setup_test_env();

    let first = admit(
        &config_path,
        "What is the powerhouse of the cell?",
        "The mitochondria",
    );
    assert!(first.contains("admitted card 1"), "{}", first);

    let second = admit(
        &config_path,
        "What is the powerhouse of the cell",
        "The mitochondria!",
    );
    assert!(second.contains("rejected: matches card 1 (score 100)"), "{}", second);

    let (stdout, _, success) = run_cognitus(&config_path, &["status", "--json"]);
    assert!(success);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["health"]["collection"], 1);
    assert_eq!(status["health"]["indexed"], 1);
    assert_eq!(status["topics"][0]["topic"], "Biology");
}

#[test]
fn test_check_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();

    admit(&config_path, "Capital of France?", "Paris");

    let (stdout, _, success) = run_cognitus(
        &config_path,
        &["check", "--front", "Capital of France", "--back", "Paris."],
    );
    assert!(success);
    assert!(stdout.contains("duplicate of card 1 (score 100)"), "{}", stdout);

    let (stdout, _, success) = run_cognitus(
        &config_path,
        &["check", "--front", "Largest planet?", "--back", "Jupiter"],
    );
    assert!(success);
    assert!(stdout.trim() == "novel", "{}", stdout);

    let (stdout, _, _) = run_cognitus(&config_path, &["status", "--json"]);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["health"]["collection"], 1);
}

#[test]
fn test_import_admits_parsed_cards() {
    let (tmp, config_path) = setup_test_env();

    let response = "Here are your flashcards:\n\n\
        What is DNA?\n:::\nGenetic material.\n\n\
        What does RNA stand for?\n:::\nRibonucleic acid.\n\n\
        What is DNA\n:::\nGenetic material\n\n\
        dangling question\n:::\n";
    let file = tmp.path().join("response.txt");
    fs::write(&file, response).unwrap();

    let (stdout, stderr, success) = run_cognitus(
        &config_path,
        &["import", file.to_str().unwrap(), "--topic", "Biology"],
    );
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("Admitted 2 of 3 cards (1 rejected as duplicates)"),
        "{}",
        stdout
    );
}

#[test]
fn test_remove_card() {
    let (_tmp, config_path) = setup_test_env();

    admit(&config_path, "Boiling point of water at sea level?", "100 C");

    let (stdout, _, success) = run_cognitus(&config_path, &["remove", "1"]);
    assert!(success);
    assert!(stdout.contains("removed card 1"));

    let (_, stderr, success) = run_cognitus(&config_path, &["remove", "1"]);
    assert!(!success, "removing a missing card should fail");
    assert!(stderr.contains("not found"), "{}", stderr);
}

#[test]
fn test_generate_disabled() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_cognitus(&config_path, &["generate", "Rust"]);
    assert!(!success);
    assert!(stderr.contains("Generation is disabled"), "{}", stderr);
}

#[test]
fn test_corrupt_index_stops_commands() {
    let (tmp, config_path) = setup_test_env();

    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("index.sqlite"), vec![0x42u8; 8192]).unwrap();

    let (_, stderr, success) = run_cognitus(
        &config_path,
        &["admit", "--topic", "t", "--front", "q", "--back", "a"],
    );
    assert!(!success, "admit should refuse a corrupt index");
    assert!(stderr.contains("Failed to open index"), "{}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");

    let (_, stderr, success) = run_cognitus(&missing, &["status"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}
