use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    merits_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let merits_path = dir.path().join("merits.json");

        let mut merits = File::create(&merits_path).unwrap();
        writeln!(merits, "[1.0, 0.0, 0.0, 0.0]").unwrap();

        Self { dir, merits_path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn evoforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_evoforge"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

fn small_run(extra: &[&str]) -> Output {
    let mut args = vec![
        "run",
        "--world-size",
        "100",
        "--updates",
        "5",
        "--ancestor-length",
        "20",
        "--seed",
        "3",
    ];
    args.extend_from_slice(extra);
    evoforge(&args)
}

#[test]
fn test_cli_run_prints_summary() {
    let output = small_run(&[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "STDOUT:\n{}", stdout);

    assert!(stdout.contains("FINAL RESULT"), "STDOUT:\n{}", stdout);
    // Rep 0, seed 3, five updates
    let row = Regex::new(r"\|\s*0\s*\|\s*3\s*\|\s*5\s*\|").unwrap();
    assert!(row.is_match(&stdout), "STDOUT:\n{}", stdout);
}

#[test]
fn test_cli_run_is_reproducible() {
    let ctx = TestContext::new();
    let first = ctx.path("first.csv");
    let second = ctx.path("second.csv");

    for path in [&first, &second] {
        let output = small_run(&["--snapshot", path.to_str().unwrap()]);
        assert!(output.status.success());
    }

    let a = fs::read_to_string(&first).unwrap();
    let b = fs::read_to_string(&second).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_cli_run_writes_stats_csv() {
    let ctx = TestContext::new();
    let stats = ctx.path("stats.csv");

    let output = small_run(&["--replicates", "2", "--stats-csv", stats.to_str().unwrap()]);
    assert!(output.status.success());

    let mut rdr = csv::Reader::from_path(&stats).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "replicate");
    assert_eq!(headers.len(), 13);

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 10, "two replicates of five updates");
    assert_eq!(&rows[0][0], "0");
    assert_eq!(&rows[9][0], "1");
}

#[test]
fn test_cli_schedule_matches_merits() {
    let ctx = TestContext::new();
    let output = evoforge(&[
        "schedule",
        "--merits",
        ctx.merits_path.to_str().unwrap(),
        "--draws",
        "1000",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "STDOUT:\n{}", stdout);

    // Slot 0 holds all the weight and gets every draw.
    let row = Regex::new(r"\|\s*0\s*\|\s*1\.00\s*\|\s*1\.00000\s*\|\s*1\.00000\s*\|").unwrap();
    assert!(row.is_match(&stdout), "STDOUT:\n{}", stdout);
}

#[test]
fn test_cli_config_file_and_overrides() {
    let ctx = TestContext::new();
    let config = ctx.path("run.json");
    fs::write(
        &config,
        r#"{ "scheduler": { "world_size": 7, "num_demes": 2 }, "driver": { "updates": 2 } }"#,
    )
    .unwrap();

    // 7 slots cannot split into 2 demes.
    let output = evoforge(&["run", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());

    // The command line fixes the world size and keeps the file's demes.
    let output = evoforge(&[
        "run",
        "--config",
        config.to_str().unwrap(),
        "--world-size",
        "8",
        "--ancestor-length",
        "10",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "STDOUT:\n{}", stdout);
    assert!(stdout.contains("8 slots / 2 demes"), "STDOUT:\n{}", stdout);
}

#[test]
fn test_cli_rejects_unknown_policy() {
    let output = evoforge(&["run", "--updates", "1", "--base-merit-method", "bogus"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bogus"), "STDOUT:\n{}", stdout);
}
