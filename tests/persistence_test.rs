#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use payrelay::domain::identity::{Identity, KEY_LENGTH, Mint};
use std::process::Command;
use tempfile::tempdir;

fn payrelay(db_path: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(cargo_bin!("payrelay"))
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_rocksdb_persistence_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let owner = Identity::new([1; KEY_LENGTH]).to_string();
    let receiver = Identity::new([2; KEY_LENGTH]).to_string();
    let second_receiver = Identity::new([4; KEY_LENGTH]).to_string();
    let mint = Mint::new([10; KEY_LENGTH]).to_string();

    // 1. Claim the deployment
    let output = payrelay(
        &db_path,
        &["init", "--caller", &owner, "--receiver", &receiver, "--mint", &mint],
    );
    assert!(output.status.success());

    // 2. A second claim is rejected, even from another caller
    let output = payrelay(
        &db_path,
        &["init", "--caller", &receiver, "--receiver", &receiver, "--mint", &mint],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already initialized"));

    // 3. Owner-only mutations in separate runs
    assert!(payrelay(&db_path, &["pause", "--caller", &owner]).status.success());
    assert!(!payrelay(&db_path, &["resume", "--caller", &receiver]).status.success());
    assert!(
        payrelay(
            &db_path,
            &["set-receiver", "--caller", &owner, "--receiver", &second_receiver]
        )
        .status
        .success()
    );

    // 4. The state survived every run
    let output = payrelay(&db_path, &["state"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("-- Owner   : {}", owner)));
    assert!(stdout.contains(&format!("-- Receiver: {}", second_receiver)));
    assert!(stdout.contains(&format!("-- Mint    : {}", mint)));
    assert!(stdout.contains("-- Paused  : true"));
}
