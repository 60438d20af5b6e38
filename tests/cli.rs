//! End-to-end tests that drive the compiled binary against a copy of
//! `fixtures/site/`.
//!
//! Run with: cargo test --test cli

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixture_copy() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let target = tmp.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prediction-ledger"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("ISSUE_TITLE")
        .env_remove("ISSUE_BODY")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn build_renders_site_and_prints_summary() {
    let tmp = fixture_copy();
    let out = run(tmp.path(), &["build"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let text = stdout(&out);
    assert!(text.contains("001 Ann Example → 5.77 (12 verified)"), "{text}");
    assert!(text.contains("Generated 2 authors, 16 posts → public"), "{text}");
    assert!(text.contains("data/posts/1000/16.md"), "{text}");

    let public = tmp.path().join("public");
    assert!(public.join("index.html").is_file());
    assert!(public.join("ru/1/verified/index.html").is_file());
    assert!(public.join("sitemap.xml").is_file());
}

#[test]
fn build_honors_output_flag() {
    let tmp = fixture_copy();
    let out = run(tmp.path(), &["--output", "dist", "build"]);
    assert!(out.status.success());
    assert!(tmp.path().join("dist/en/about/index.html").is_file());
    assert!(!tmp.path().join("public").exists());
}

#[test]
fn build_refuses_to_clear_project_root() {
    let tmp = fixture_copy();
    let out = run(tmp.path(), &["--output", ".", "build"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("output directory"));
    assert!(tmp.path().join("data/posts").is_dir());
    assert!(tmp.path().join("ssg/aux/locales.json").is_file());
}

#[test]
fn check_prints_inventory_without_writing() {
    let tmp = fixture_copy();
    let out = run(tmp.path(), &["check"]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.contains("001 Ann Example (12 posts, 12 verified, rating 5.77)"), "{text}");
    assert!(text.contains("002 Bob & Partners (4 posts, 2 verified"), "{text}");
    assert!(!tmp.path().join("public").exists());
}

#[test]
fn check_fails_on_orphan_post() {
    let tmp = fixture_copy();
    fs::write(
        tmp.path().join("data/posts/1000/77.md"),
        "### id\n77\n### author-id\n404\n### status\nawaiting\n\
         ### complexity\nregular\n### confidence\ncareful\n",
    )
    .unwrap();

    let out = run(tmp.path(), &["check"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("404"));
}

#[test]
fn intake_reads_issue_from_environment() {
    let tmp = fixture_copy();
    let body = "### id\n1001\n### author-id\n2\n### status\nawaiting\n";
    let out = Command::new(env!("CARGO_BIN_EXE_prediction-ledger"))
        .arg("--root")
        .arg(tmp.path())
        .arg("intake")
        .env("ISSUE_TITLE", "[NEW-PREDICTION] coalition")
        .env("ISSUE_BODY", body)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let saved = tmp.path().join("data/posts/2000/1001.md");
    assert_eq!(stdout(&out).trim(), saved.display().to_string());
    assert_eq!(fs::read_to_string(saved).unwrap(), body);
}

#[test]
fn intake_rejects_unmarked_title() {
    let tmp = fixture_copy();
    let out = run(tmp.path(), &["intake", "--title", "hello", "--body", "x"]);
    assert!(!out.status.success());
    assert!(!tmp.path().join("data/posts/2000/1001.md").exists());
}

#[test]
fn gen_config_prints_stock_config() {
    let tmp = TempDir::new().unwrap();
    let out = run(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("# Prediction Ledger Configuration"));
}
