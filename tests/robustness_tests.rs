use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_failed_invocations_do_not_stop_replay() {
    let file = NamedTempFile::new().unwrap();
    let mut wtr = csv::Writer::from_path(file.path()).unwrap();
    wtr.write_record(["function", "argument"]).unwrap();
    wtr.write_record(["init", ""]).unwrap();
    // Malformed payload
    wtr.write_record(["createApplication", "{not json"]).unwrap();
    // Unknown stage
    wtr.write_record([
        "amendMortgage",
        r#"{"mortgageNumber": 1000001, "mortgageStage": "closed"}"#,
    ])
    .unwrap();
    // No such mortgage
    wtr.write_record(["getMortgage", "1000042"]).unwrap();
    // Valid intake still gets the first identifier
    wtr.write_record(["createApplication", &common::application_json("Ada", 100000)])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("mortgage-ledger"));
    cmd.arg("replay").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing invocation"))
        .stderr(predicate::str::contains("Malformed payload"))
        .stderr(predicate::str::contains("Unknown mortgage stage"))
        .stderr(predicate::str::contains("does not exist"))
        .stdout(predicate::str::diff("1000001\n"));
}

#[test]
fn test_generated_script_replays() {
    let file = NamedTempFile::new().unwrap();
    common::generate_script(file.path(), 10, 200).expect("Failed to generate script");

    let output = Command::new(cargo_bin!("mortgage-ledger"))
        .arg("replay")
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    for expected in 1_000_001..=1_000_010 {
        assert_eq!(lines.next(), Some(expected.to_string().as_str()));
    }
    assert_eq!(lines.count(), 200);
}
