use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn txconv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_txconv"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run txconv")
}

fn write_input(dir: &TempDir, name: &str, bytes: &[u8]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

fn out_path(dir: &TempDir) -> String {
    dir.path().join("out.txt").to_string_lossy().into_owned()
}

#[test]
fn ansi_to_utf16le_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "hello.txt", b"Hello\n");
    let output = out_path(&dir);

    let result = txconv(&["-i", "ansi", "-o", "utf16", &input, &output]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        fs::read(&output).unwrap(),
        [0xFF, 0xFE, 0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00, 0x0A, 0x00]
    );
}

#[test]
fn auto_detected_utf8_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "e-acute.txt", &[0xEF, 0xBB, 0xBF, 0xC3, 0xA9, 0x0A]);

    let result = txconv(&["--outformat", "UTF16BE", &input]);
    assert!(result.status.success());
    assert_eq!(result.stdout, [0xFE, 0xFF, 0x00, 0xE9, 0x00, 0x0A]);
}

#[test]
fn default_output_format_is_ansi() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "wide.txt", &[0xFF, 0xFE, b'h', 0, b'i', 0, b'\n', 0]);

    let result = txconv(&[&input]);
    assert!(result.status.success());
    assert_eq!(result.stdout, b"hi\n");
}

#[test]
fn empty_input_fails_without_creating_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.txt", b"");
    let output = out_path(&dir);

    let result = txconv(&["-o", "utf8", &input, &output]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("empty input"));
    assert!(!Path::new(&output).exists());
}

#[test]
fn unresolved_auto_asks_for_informat() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "latin1.txt", b"caf\xE9 au lait, s'il vous pla\xEEt\n");
    let output = out_path(&dir);

    let result = txconv(&[&input, &output]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("--informat"));
    assert!(!Path::new(&output).exists());

    let result = txconv(&["-i", "ansi", "-o", "utf8", &input, &output]);
    assert!(result.status.success());
    assert_eq!(
        fs::read(&output).unwrap(),
        "\u{FEFF}café au lait, s'il vous plaît\n".as_bytes()
    );
}

#[test]
fn invalid_utf8_reports_offset() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "bad.txt", &[0xEF, 0xBB, 0xBF, b'a', 0xFF, b'\n']);

    let result = txconv(&["-o", "utf8", &input]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("0xFF at offset 5"), "{stderr}");
}

#[test]
fn auto_is_rejected_as_output_format() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "hello.txt", b"Hello\n");

    let result = txconv(&["-o", "auto", &input]);
    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
}

#[test]
fn verbose_report_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "two.txt", b"line one of text\nline two\n");

    let result = txconv(&["-v", &input]);
    assert!(result.status.success());
    assert_eq!(result.stdout, b"line one of text\nline two\n");

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Input format:  ANSI"), "{stderr}");
    assert!(stderr.contains("(stdout)"), "{stderr}");
    assert!(stderr.contains("First 8 bytes:  6C 69 6E 65 20 6F 6E 65"), "{stderr}");
    assert!(stderr.contains("Lines processed:  2"), "{stderr}");
    assert!(stderr.contains("Chars processed:  26"), "{stderr}");
}

#[test]
fn json_report() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "two.txt", b"line one of text\nline two\n");
    let output = out_path(&dir);

    let result = txconv(&["--format", "json", "-o", "utf16be", &input, &output]);
    assert!(result.status.success());

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("\"input_format\": \"ANSI\""), "{stderr}");
    assert!(stderr.contains("\"output_format\": \"UTF16BE\""), "{stderr}");
    assert!(stderr.contains("\"lines_processed\": 2"), "{stderr}");
    assert!(stderr.contains("\"bytes_written\": 54"), "{stderr}");
}
