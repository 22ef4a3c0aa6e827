use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn masroof(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("masroof").unwrap();
    cmd.env("MASROOF_DATA_DIR", data_dir);
    cmd
}

#[test]
fn test_ingest_and_category_flow() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    masroof(data)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized masroof"));

    masroof(data)
        .args([
            "rules",
            "add",
            "Al Nahdi,النهدي",
            "--classification",
            "Necessities",
            "--main-category",
            "Health",
            "--sub-category",
            "Pharmacy",
            "--limit",
            "500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added rule 1"));

    masroof(data)
        .args(["ingest", "مبلغ: 45.50 SAR\nلدى: Al Nahdi"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("45.50 SAR")
                .and(predicate::str::contains("Al Nahdi"))
                .and(predicate::str::contains("Health")),
        );

    masroof(data)
        .args(["ingest", "Your OTP code is 482913"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extraction failed"));

    masroof(data)
        .args(["category", "remaining", "Health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("454.50 SAR"));

    masroof(data)
        .args(["category", "remaining", "Travel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No limit set for Travel"));

    masroof(data)
        .args(["invoices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Al Nahdi").and(predicate::str::contains("failed")));

    masroof(data)
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Invoices:          2")
                .and(predicate::str::contains("Failed extraction: 1")),
        );
}

#[test]
fn test_cycle_flow() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    masroof(data).arg("init").assert().success();
    masroof(data)
        .args([
            "rules",
            "add",
            "Panda",
            "--classification",
            "Necessities",
            "--main-category",
            "Groceries",
            "--sub-category",
            "Supermarket",
            "--limit",
            "1000",
        ])
        .assert()
        .success();

    masroof(data)
        .args(["cycle", "start", "--date", "2020-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started cycle 1"));

    masroof(data)
        .args([
            "ingest",
            "مبلغ: 150 SAR\nلدى: Panda",
            "--received-at",
            "2020-01-10 09:00:00",
        ])
        .assert()
        .success();

    masroof(data)
        .args(["cycle", "analysis", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Groceries").and(predicate::str::contains("150.00 SAR")),
        );

    masroof(data)
        .args(["cycle", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150.00 SAR"));

    masroof(data)
        .args(["cycle", "analysis", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No cycle with ID 99"));

    // A bad date is rejected and the active cycle survives
    masroof(data)
        .args(["cycle", "start", "--date", "2020-13-99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
    masroof(data)
        .args(["cycle", "current"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle 1 (active)"));
}

#[test]
fn test_demo_seeds_explorable_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    masroof(data)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded"));

    masroof(data)
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries").and(predicate::str::contains("Health")));

    masroof(data)
        .args(["cycle", "analysis", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top merchants"));
}
