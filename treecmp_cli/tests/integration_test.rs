use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper struct to manage test directories
struct TestFixture {
    _temp_dir: TempDir,
    left_dir: PathBuf,
    right_dir: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with left and right directories
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let left_dir = temp_dir.path().join("left");
        let right_dir = temp_dir.path().join("right");

        fs::create_dir(&left_dir).expect("Failed to create left dir");
        fs::create_dir(&right_dir).expect("Failed to create right dir");

        TestFixture {
            _temp_dir: temp_dir,
            left_dir,
            right_dir,
        }
    }

    fn create_left_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> PathBuf {
        Self::create_file(&self.left_dir, path, content)
    }

    fn create_right_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> PathBuf {
        Self::create_file(&self.right_dir, path, content)
    }

    fn create_file<P: AsRef<Path>>(base: &Path, path: P, content: &[u8]) -> PathBuf {
        let file_path = base.join(path.as_ref());
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    fn create_right_dir<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let dir_path = self.right_dir.join(path.as_ref());
        fs::create_dir_all(&dir_path).expect("Failed to create directory");
        dir_path
    }

    fn left(&self) -> &str {
        self.left_dir.to_str().unwrap()
    }

    fn right(&self) -> &str {
        self.right_dir.to_str().unwrap()
    }
}

/// Helper to run the CLI binary with an isolated configuration
fn run_cli(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_treecmp_cli");
    let config_dir = TempDir::new().expect("Failed to create config dir");
    Command::new(exe)
        .args(args)
        .env("XDG_CONFIG_HOME", config_dir.path())
        .env("APPDATA", config_dir.path())
        .env("HOME", config_dir.path())
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

/// Helper to run CLI and expect success
fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        eprintln!("STDOUT:\n{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
        panic!("Command failed with status: {}", output.status);
    }
    String::from_utf8(output.stdout).expect("stdout not utf-8")
}

#[test]
fn test_identical_directories() {
    let fixture = TestFixture::new();
    let left_file = fixture.create_left_file("file1.txt", b"Hello, world!");
    let right_file = fixture.create_right_file("file1.txt", b"Hello, world!");
    fixture.create_left_file("nested/file2.txt", b"Test content");
    fixture.create_right_file("nested/file2.txt", b"Test content");

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);

    assert_eq!(stdout, "NO DIFFERENCE FOUND :)\n");
    assert!(!left_file.exists());
    assert!(right_file.exists());
    assert!(!fixture.left_dir.join("nested/file2.txt").exists());
}

#[test]
fn test_unique_files_scenario() {
    let fixture = TestFixture::new();
    let left_a = fixture.create_left_file("a.txt", b"hello");
    fixture.create_left_file("b.txt", b"x");
    let right_a = fixture.create_right_file("a.txt", b"hello");
    fixture.create_right_file("c.txt", b"y");

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(
        lines,
        vec![
            format!("unique: {}/b.txt", fixture.left()),
            format!("unique: {}/c.txt", fixture.right()),
        ]
    );
    assert!(!left_a.exists());
    assert_eq!(fs::read(right_a).unwrap(), b"hello");
}

#[test]
fn test_different_files() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("sub/n.bin", &[0x01]);
    let right = fixture.create_right_file("sub/n.bin", &[0x02]);

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("diff: {}/sub/n.bin\tsha1: ", fixture.left())));
    assert!(lines[1].starts_with(&format!("diff: {}/sub/n.bin\tsha1: ", fixture.right())));
    assert!(lines.iter().all(|l| l.ends_with("\tsize: 1 byte")));
    assert_ne!(lines[0].split('\t').nth(1), lines[1].split('\t').nth(1));

    assert!(left.exists());
    assert!(right.exists());
}

#[test]
fn test_unique_directory_gets_trailing_slash() {
    let fixture = TestFixture::new();
    fixture.create_right_dir("only_right");
    fixture.create_right_file("only_right/inner.txt", b"x");

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);
    assert_eq!(stdout, format!("unique: {}/only_right/\n", fixture.right()));
}

#[test]
fn test_output_order_diff_then_left_then_right() {
    let fixture = TestFixture::new();
    fixture.create_left_file("d.txt", b"left");
    fixture.create_right_file("d.txt", b"right");
    fixture.create_left_file("z_left.txt", b"l");
    fixture.create_left_file("a_left.txt", b"l");
    fixture.create_right_file("m_right.txt", b"r");

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("diff: "));
    assert!(lines[1].starts_with("diff: "));
    assert_eq!(lines[2], format!("unique: {}/a_left.txt", fixture.left()));
    assert_eq!(lines[3], format!("unique: {}/z_left.txt", fixture.left()));
    assert_eq!(lines[4], format!("unique: {}/m_right.txt", fixture.right()));
}

#[test]
fn test_invalid_directory() {
    let fixture = TestFixture::new();
    let missing = fixture.right_dir.join("does_not_exist");
    let left_file = fixture.create_left_file("a.txt", b"dup");
    fixture.create_right_file("a.txt", b"dup");

    let output = run_cli(&["--dir1", fixture.left(), "--dir2", missing.to_str().unwrap()]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("{} is not a valid directory", missing.display())));
    assert!(left_file.exists());
}

#[test]
fn test_file_is_not_a_valid_directory() {
    let fixture = TestFixture::new();
    let file = fixture.create_left_file("plain.txt", b"x");

    let output = run_cli(&["--dir1", file.to_str().unwrap(), "--dir2", fixture.right()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is not a valid directory"));
}

#[test]
fn test_dry_run_keeps_files() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("same.txt", b"same");
    fixture.create_right_file("same.txt", b"same");

    let stdout = run_cli_success(&[
        "--dir1",
        fixture.left(),
        "--dir2",
        fixture.right(),
        "--dry-run",
    ]);

    assert_eq!(stdout, "NO DIFFERENCE FOUND :)\n");
    assert!(left.exists());
}

#[test]
fn test_json_output() {
    let fixture = TestFixture::new();
    fixture.create_left_file("same.txt", b"same");
    fixture.create_right_file("same.txt", b"same");
    fixture.create_left_file("diff.txt", b"one");
    fixture.create_right_file("diff.txt", b"two");
    fixture.create_right_file("extra.txt", b"extra");

    let stdout = run_cli_success(&[
        "--dir1",
        fixture.left(),
        "--dir2",
        fixture.right(),
        "--json",
        "--algorithm",
        "blake3",
        "--jobs",
        "2",
    ]);
    let report: Value = serde_json::from_str(&stdout).expect("invalid json output");

    assert_eq!(report["summary"]["differing"], 1);
    assert_eq!(report["summary"]["right_only"], 1);
    assert_eq!(report["summary"]["reclaimed"], 1);
    assert_eq!(report["summary"]["no_difference"], false);
    assert_eq!(report["differing"][0]["path"], "diff.txt");
    assert_eq!(report["differing"][0]["algorithm"], "blake3");
    assert_eq!(report["differing"][0]["left"]["hash"].as_str().unwrap().len(), 64);
    assert!(!fixture.left_dir.join("same.txt").exists());
}

#[test]
fn test_ignore_pattern() {
    let fixture = TestFixture::new();
    fixture.create_left_file("scratch.tmp", b"junk");
    fixture.create_right_file("keep.txt", b"k");
    fixture.create_left_file("keep.txt", b"k");

    let stdout = run_cli_success(&[
        "--dir1",
        fixture.left(),
        "--dir2",
        fixture.right(),
        "--ignore",
        "*.tmp",
    ]);

    assert_eq!(stdout, "NO DIFFERENCE FOUND :)\n");
    assert!(fixture.left_dir.join("scratch.tmp").exists());
}

#[test]
fn test_unreadable_file_aborts_run() {
    let fixture = TestFixture::new();
    // left is a file, right is a directory: resolved as a file by the left side
    fixture.create_left_file("clash", b"file");
    fixture.create_right_dir("clash");
    let dup = fixture.create_left_file("a.txt", b"dup");
    fixture.create_right_file("a.txt", b"dup");

    let output = run_cli(&["--dir1", fixture.left(), "--dir2", fixture.right()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("error:"));
    assert!(dup.exists());
}

#[test]
fn test_type_conflict_skip() {
    let fixture = TestFixture::new();
    fixture.create_left_file("clash", b"file");
    fixture.create_right_dir("clash");

    let stdout = run_cli_success(&[
        "--dir1",
        fixture.left(),
        "--dir2",
        fixture.right(),
        "--type-conflict",
        "skip",
    ]);

    assert_eq!(stdout, "NO DIFFERENCE FOUND :)\n");
    assert!(fixture.left_dir.join("clash").exists());
}

#[test]
fn test_vcs_directories_left_alone() {
    let fixture = TestFixture::new();
    let head = fixture.create_left_file(".git/HEAD", b"ref: refs/heads/main");
    fixture.create_right_file(".git/HEAD", b"ref: refs/heads/main");
    fixture.create_left_file("__pycache__/mod.pyc", b"cache");

    let stdout = run_cli_success(&["--dir1", fixture.left(), "--dir2", fixture.right()]);
    assert_eq!(stdout, "NO DIFFERENCE FOUND :)\n");
    assert!(head.exists());

    let stdout = run_cli_success(&[
        "--dir1",
        fixture.left(),
        "--dir2",
        fixture.right(),
        "--no-default-ignores",
        "--dry-run",
    ]);
    assert_eq!(stdout, format!("unique: {}/__pycache__/\n", fixture.left()));
    assert!(head.exists());
}

#[test]
fn test_same_directory_for_both_roots() {
    let fixture = TestFixture::new();
    let file = fixture.create_left_file("a.txt", b"dup");
    let alias = fixture.left_dir.join(".");

    let output = run_cli(&["--dir1", fixture.left(), "--dir2", alias.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("are the same directory"));
    assert!(file.exists());
}
