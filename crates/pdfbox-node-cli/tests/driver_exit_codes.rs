//! Spawns the built `pdfbox-driver` binary and checks the exit-code
//! contract the host relies on: 0 on success, 1 on any failure, with
//! diagnostics on stderr and stdout reserved for the payload.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const DRIVER: &str = env!("CARGO_BIN_EXE_pdfbox-driver");

fn run_driver(args: &[&str]) -> Output {
    Command::new(DRIVER).args(args).output().expect("driver binary runs")
}

/// Executable shell script standing in for the java binary. Answers the
/// `-version` availability probe with success, then behaves per `body`.
fn stub_java(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("java");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then exit 0; fi\n{body}\n"
    );
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn no_arguments_exits_one_with_usage_on_stderr() {
    let output = run_driver(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage:"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_subcommand_arguments_exit_one() {
    // extractImages requires both the PDF and the output directory
    let output = run_driver(&["extractImages", "only.pdf"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OUT_DIR") || stderr.contains("required"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_flag_exits_one() {
    let output = run_driver(&["--no-such-flag", "input.pdf"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unlaunchable_java_exits_one_with_detail_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("pdfbox.jar");
    std::fs::write(&jar, b"not a real jar").unwrap();

    let output = run_driver(&[
        "input.pdf",
        "--jar",
        jar.to_str().unwrap(),
        "--java",
        "/nonexistent/bin/java",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/bin/java"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn failing_tool_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let java = stub_java(dir.path(), "echo 'corrupt PDF stream' >&2\nexit 2");
    let jar = java.to_str().unwrap();

    let output = run_driver(&["input.pdf", "--jar", jar, "--java", jar]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("corrupt PDF stream"), "stderr was: {stderr}");
}

#[test]
fn successful_text_extraction_exits_zero_with_payload_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let java = stub_java(
        dir.path(),
        r#"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift 2; else shift; fi
done
printf 'Hello from PDFBox' > "$out"
exit 0
"#,
    );
    let jar = java.to_str().unwrap();

    let output = run_driver(&["input.pdf", "--jar", jar, "--java", jar]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello from PDFBox");
}

#[test]
fn help_exits_zero() {
    let output = run_driver(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("extractImages"));
}
