use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const CATALOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" sourcelanguage="en_US" language="de_DE">
<context>
    <name>Dialog</name>
    <message>
        <location filename="dialog.cpp" line="40"/>
        <source>Save changes?</source>
        <translation>Speichern Sie die Änderungen?</translation>
    </message>
    <message>
        <location filename="dialog.cpp" line="55"/>
        <source>Discard</source>
        <translation>Verwerfen</translation>
    </message>
    <message>
        <location filename="dialog.cpp" line="58"/>
        <source>Apply</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

const OCCURRENCES: &str = r#"[
    {
        "context": "Dialog",
        "source": "Save changes?",
        "location": { "filename": "dialog.cpp", "line": 61 }
    },
    {
        "context": "Dialog",
        "source": "Revert",
        "location": { "filename": "dialog.cpp", "line": 70 }
    }
]"#;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("rustlinguist-cli")?)
}

#[test]
fn update_merges_occurrences_in_place() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let catalog = workspace.path().join("de_DE.ts");
    let occurrences = workspace.path().join("scan.json");
    fs::write(&catalog, CATALOG)?;
    fs::write(&occurrences, OCCURRENCES)?;

    cli()?
        .args([
            "update",
            "--catalog",
            catalog.to_str().unwrap(),
            "--occurrences",
            occurrences.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 occurrence(s)"));

    let written = fs::read_to_string(&catalog)?;
    // Existing translation kept, location refreshed.
    assert!(written.contains("Speichern Sie die Änderungen?"));
    assert!(written.contains("line=\"61\""));
    // New key starts unfinished; vanished translated key goes obsolete;
    // the never-translated one is dropped.
    assert!(written.contains("<source>Revert</source>"));
    assert!(written.contains("type=\"obsolete\">Verwerfen"));
    assert!(!written.contains("<source>Apply</source>"));

    Ok(())
}

#[test]
fn update_can_drop_obsolete_entries() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let catalog = workspace.path().join("de_DE.ts");
    let occurrences = workspace.path().join("scan.json");
    let output = workspace.path().join("merged.ts");
    fs::write(&catalog, CATALOG)?;
    fs::write(&occurrences, OCCURRENCES)?;

    cli()?
        .args([
            "update",
            "--catalog",
            catalog.to_str().unwrap(),
            "--occurrences",
            occurrences.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--no-obsolete",
        ])
        .assert()
        .success();

    // The input file is untouched when --output is given.
    assert_eq!(fs::read_to_string(&catalog)?, CATALOG);
    let written = fs::read_to_string(&output)?;
    assert!(!written.contains("Verwerfen"));

    Ok(())
}

#[test]
fn validate_reports_completeness() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let catalog = workspace.path().join("de_DE.ts");
    fs::write(&catalog, CATALOG)?;

    cli()?
        .args(["validate", catalog.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("de_DE"))
        .stdout(predicate::str::contains("3 messages"))
        .stdout(predicate::str::contains("1 unfinished"));

    cli()?
        .args([
            "validate",
            catalog.to_str().unwrap(),
            "--fail-on-unfinished",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unfinished"));

    Ok(())
}

#[test]
fn validate_rejects_malformed_catalogs() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let catalog = workspace.path().join("broken.ts");
    fs::write(&catalog, CATALOG.replace("</context>", ""))?;

    cli()?
        .args(["validate", catalog.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse catalog"));

    Ok(())
}

#[test]
fn query_resolves_and_falls_back() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let catalog = workspace.path().join("de_DE.ts");
    fs::write(&catalog, CATALOG)?;

    cli()?
        .args([
            "query",
            "--catalog",
            catalog.to_str().unwrap(),
            "--context",
            "Dialog",
            "--source",
            "Save changes?",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Speichern Sie die Änderungen?"));

    cli()?
        .args([
            "query",
            "--catalog",
            catalog.to_str().unwrap(),
            "--context",
            "Dialog",
            "--source",
            "Close without saving",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Close without saving"))
        .stderr(predicate::str::contains("no stored translation"));

    Ok(())
}
