//! End-to-end tests of the `smartstest` binary.

#![allow(deprecated)] // cargo_bin still works, just deprecated for custom build-dir

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn smartstest() -> Command {
    let mut cmd = Command::cargo_bin("smartstest").expect("Failed to find smartstest binary");
    cmd.env_remove("TESTDATADIR");
    cmd
}

/// A data directory holding the three standard files. `None` leaves a
/// file out.
fn data_dir(patterns: Option<&str>, reference: Option<&str>, molecules: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let files = [
        ("smartstest.txt", patterns),
        ("smartsresults.txt", reference),
        ("attype.00.smi", molecules),
    ];
    for (name, content) in files {
        if let Some(content) = content {
            fs::write(dir.path().join(name), content).expect("Failed to write data file");
        }
    }
    dir
}

fn hydroxylamine(reference: &str) -> TempDir {
    data_dir(
        Some("[#6]\n[#7]\n"),
        Some(reference),
        Some("ON hydroxylamine\n"),
    )
}

fn verify_in(dir: &Path) -> assert_cmd::assert::Assert {
    smartstest().arg("--data-dir").arg(dir).assert()
}

// ============================================================================
// Verify mode
// ============================================================================

#[test]
fn test_verify_passing_molecule() {
    let dir = hydroxylamine("2 patterns\n\n1\n");
    verify_in(dir.path())
        .success()
        .stdout("# Testing SMARTS...\nok 1 # molecule passed tests\n1..1\n");
}

#[test]
fn test_verify_value_mismatch_still_exits_zero() {
    let dir = hydroxylamine("2 patterns\n\n2\n");
    verify_in(dir.path())
        .success()
        .stdout(predicate::str::contains(
            "not ok 1 # matching atom numbers different than reference",
        ))
        .stdout(predicate::str::contains("# Expected 2 but found 1"))
        .stdout(predicate::str::contains("# Molecule: hydroxylamine"))
        .stdout(predicate::str::ends_with("1..1\n"));
}

#[test]
fn test_verify_count_mismatch() {
    let dir = hydroxylamine("2 patterns\n\n1 2\n");
    verify_in(dir.path())
        .success()
        .stdout(predicate::str::contains(
            "not ok 1 # number of matches different than reference",
        ))
        .stdout(predicate::str::contains("# Expected 2 matches, found 1"))
        .stdout(predicate::str::contains("#  on pattern [#7]"));
}

#[test]
fn test_verify_reads_testdatadir() {
    let dir = hydroxylamine("2 patterns\n\n1\n");
    Command::cargo_bin("smartstest")
        .expect("Failed to find smartstest binary")
        .env("TESTDATADIR", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok 1 # molecule passed tests"));
}

#[test]
fn test_verify_file_overrides() {
    let dir = hydroxylamine("2 patterns\n\n1\n");
    let other = tempfile::tempdir().expect("Failed to create temp dir");
    let molecules = other.path().join("more.smi");
    fs::write(&molecules, "NO reversed\n").expect("Failed to write molecules");

    // N is now atom 0, so the stored "1" no longer matches.
    smartstest()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--molecules")
        .arg(&molecules)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Expected 1 but found 0"));
}

#[test]
fn test_verify_skips_non_utf8_molecule() {
    let dir = data_dir(Some("[#8]\n"), Some("1 patterns\n  0\n  0\n"), None);
    fs::write(dir.path().join("attype.00.smi"), b"O water\nO caf\xe9\nO b\n")
        .expect("Failed to write molecules");
    verify_in(dir.path()).success().stdout(
        "# Testing SMARTS...\nok 1 # molecule passed tests\nok 2 # molecule passed tests\n1..2\n",
    );
}

// ============================================================================
// Bail out
// ============================================================================

#[test]
fn test_bail_out_missing_patterns() {
    let dir = data_dir(None, Some("1 patterns\n"), Some("C\n"));
    verify_in(dir.path())
        .code(255)
        .stdout(predicate::str::starts_with("# Testing SMARTS...\n"))
        .stdout(predicate::str::contains("Bail out! Cannot read "))
        .stdout(predicate::str::contains("smartstest.txt"));
}

#[test]
fn test_bail_out_missing_reference() {
    let dir = data_dir(Some("C\n"), None, Some("C\n"));
    verify_in(dir.path())
        .code(255)
        .stdout(predicate::str::contains("Bail out! Cannot read in results file"));
}

#[test]
fn test_bail_out_pattern_count() {
    let dir = data_dir(Some("C\nO\n"), Some("3 patterns\n"), Some("CO\n"));
    verify_in(dir.path())
        .code(255)
        .stdout(predicate::str::contains(
            "Bail out! Correct number of patterns not read in. Read in 2 expected 3",
        ))
        .stdout(predicate::str::contains("1..").not());
}

#[test]
fn test_bail_out_missing_molecules() {
    let dir = data_dir(Some("C\n"), Some("1 patterns\n0\n"), None);
    verify_in(dir.path())
        .code(255)
        .stdout(predicate::str::contains("Bail out! Cannot read atom types"));
}

#[test]
fn test_bail_out_truncated_reference() {
    let dir = data_dir(Some("C\n"), Some("1 patterns\n0\n"), Some("C a\nC b\n"));
    verify_in(dir.path())
        .code(255)
        .stdout(predicate::str::contains("ok 1 # molecule passed tests"))
        .stdout(predicate::str::contains(
            "Bail out! Error reading reference data (after line 2)",
        ));
}

#[test]
fn test_strict_rejects_bad_pattern() {
    let dir = data_dir(Some("C\n[C\n"), Some("1 patterns\n0\n"), Some("C\n"));
    verify_in(dir.path()).success();
    smartstest()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--strict")
        .assert()
        .code(255)
        .stdout(predicate::str::contains(
            "Bail out! Pattern on line 2 failed to compile: [C",
        ));
}

// ============================================================================
// Generate mode
// ============================================================================

#[test]
fn test_generate_then_verify() {
    let dir = data_dir(
        Some("# carbons, then hydroxyls\n[#6]\n[OX2H]\n"),
        None,
        Some("CCO ethanol\nOCCO glycol\n"),
    );

    smartstest()
        .arg("-g")
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains(" SMARTS test results written successfully"));

    let reference = fs::read_to_string(dir.path().join("smartsresults.txt"))
        .expect("Failed to read generated reference");
    assert_eq!(reference, "2 patterns\n  0  1\n  2\n  1  2\n  0  3\n");

    verify_in(dir.path())
        .success()
        .stdout(predicate::str::contains("not ok").not())
        .stdout(predicate::str::ends_with("ok 2 # molecule passed tests\n1..2\n"));
}

#[test]
fn test_generate_ignores_extra_words() {
    let dir = data_dir(Some("[#8]\n"), None, Some("CO methanol\n"));
    smartstest()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["-g", "extra"])
        .assert()
        .success()
        .stderr(predicate::str::contains(" SMARTS test results written successfully"));

    let reference = fs::read_to_string(dir.path().join("smartsresults.txt"))
        .expect("Failed to read generated reference");
    assert_eq!(reference, "1 patterns\n  1\n");
}

#[test]
fn test_generate_failure_exits_zero() {
    let dir = data_dir(None, None, Some("C\n"));
    smartstest()
        .arg("-g")
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot read"))
        .stderr(predicate::str::contains("written successfully").not());
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn test_unknown_mode_prints_usage() {
    smartstest()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: smartstest"))
        .stdout(predicate::str::contains("Tests SMILES/SMARTS pattern matching."));
}

#[test]
fn test_extra_words_after_usage_mode() {
    smartstest()
        .args(["foo", "bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: smartstest"));
}

#[test]
fn test_help_flag() {
    smartstest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-dir"))
        .stdout(predicate::str::contains("--strict"));
}
