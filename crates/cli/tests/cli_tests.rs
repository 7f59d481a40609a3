//! CLI argument-surface tests. Nothing here touches the network or
//! launches a browser; bundling itself is covered by the core crate's
//! pipeline tests.
use predicates::prelude::*;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("colligo").unwrap()
}

#[test]
fn test_cli_help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf"))
        .stdout(predicate::str::contains("epub"))
        .stdout(predicate::str::contains("html"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("colligo"));
}

#[test]
fn test_cli_requires_subcommand() {
    cmd().assert().failure();
}

#[test]
fn test_cli_unknown_subcommand() {
    cmd().arg("docx").assert().failure();
}

#[test]
fn test_cli_pdf_requires_urls() {
    cmd()
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}

#[test]
fn test_cli_pdf_help_lists_flags() {
    cmd()
        .args(["pdf", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--style"))
        .stdout(predicate::str::contains("--css"))
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--individual"))
        .stdout(predicate::str::contains("--no-sandbox"));
}

#[test]
fn test_cli_epub_help_lists_fetch_flags() {
    cmd()
        .args(["epub", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--user-agent"));
}

#[test]
fn test_cli_rejects_non_numeric_timeout() {
    cmd()
        .args(["html", "--timeout", "soon", "https://example.com"])
        .assert()
        .failure();
}

#[test]
fn test_cli_rejects_unknown_flag() {
    cmd()
        .args(["pdf", "--paginate", "https://example.com"])
        .assert()
        .failure();
}
