//! 命令行端到端测试

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pagesim_cli::{command, execute};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_lib(args: &[&str]) -> anyhow::Result<pagesim_cli::RunOutput> {
    let matches = command()
        .try_get_matches_from(std::iter::once("pagesim").chain(args.iter().copied()))
        .unwrap();
    execute(&matches)
}

fn run_bin(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pagesim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

const SMALL: [&str; 8] = ["-p", "4", "-t", "2", "-f", "2", "-b", "8"];

#[test]
fn test_text_report_for_lru_trace() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n4\n8\n0\n");

    let mut args = SMALL.to_vec();
    args.push(path_str(&trace));
    let output = run_lib(&args).unwrap();

    assert!(output.mismatch.is_none());
    assert!(output.text.contains("Replacement Policy:         LRU"));
    assert!(output.text.contains("TLB Hits:                   0"));
    assert!(output.text.contains("TLB Misses:                 4"));
    assert!(output.text.contains("Page Faults:                4"));
}

#[test]
fn test_json_report_with_dump() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n4\n0\n8\n");

    let mut args = SMALL.to_vec();
    args.extend(["-r", "SecondChance", "--format", "json", "--dump", path_str(&trace)]);
    let output = run_lib(&args).unwrap();

    let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(value["config"]["replacement_policy"], "SecondChance");
    assert_eq!(value["stats"]["page_faults"], 3);
    let frames = value["snapshot"]["frames"].as_array().unwrap();
    assert!(frames.contains(&serde_json::json!(0)));
    assert!(value["snapshot"]["clock"].is_object());
}

#[test]
fn test_config_file_with_cli_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(
        &dir,
        "sim.toml",
        "page_size = 4\nnum_tlb_entries = 2\nnum_frames = 1\nva_bits = 8\n",
    );
    let trace = write_file(&dir, "trace.txt", "0\n4\n0\n");

    let output = run_lib(&["-c", path_str(&config), path_str(&trace)]).unwrap();
    assert!(output.text.contains("Frame Count:                1"));
    assert!(output.text.contains("Page Faults:                3"));

    let output = run_lib(&["-c", path_str(&config), "-f", "2", path_str(&trace)]).unwrap();
    assert!(output.text.contains("Frame Count:                2"));
    assert!(output.text.contains("Page Faults:                2"));
}

#[test]
fn test_expect_match_and_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n0\n");

    let mut args = SMALL.to_vec();
    args.push(path_str(&trace));
    let baseline = run_lib(&args).unwrap().text;

    let expected = write_file(&dir, "expected.txt", &baseline);
    let mut args = SMALL.to_vec();
    args.extend(["--expect", path_str(&expected), path_str(&trace)]);
    assert!(run_lib(&args).unwrap().mismatch.is_none());

    let wrong = baseline.replace("TLB Hits:                   1", "TLB Hits:                   2");
    let wrong = write_file(&dir, "wrong.txt", &wrong);
    let mut args = SMALL.to_vec();
    args.extend(["--expect", path_str(&wrong), path_str(&trace)]);
    let diff = run_lib(&args).unwrap().mismatch.unwrap();
    assert!(diff.starts_with("line 9:"), "{diff}");
}

#[test]
fn test_portuguese_labels_match_saida_format() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n4\n8\n0\n");
    let rule = "=".repeat(60);
    let light = "-".repeat(60);
    let expected = [
        rule.as_str(),
        "SIMULADOR DE MEMÓRIA - Estatísticas de Acesso",
        rule.as_str(),
        "Política de Substituição:   LRU",
        "Tamanho da Página:          4 bytes",
        "Entradas na TLB:            2",
        "Número de Frames:           2",
        light.as_str(),
        "TLB Hits:                   0",
        "TLB Misses:                 4",
        "Page Faults:                4",
        rule.as_str(),
    ]
    .join("\n");
    let saida = write_file(&dir, "saida_lru_simple.in", &expected);

    let mut args = SMALL.to_vec();
    args.extend(["--labels", "pt", "--expect", path_str(&saida), path_str(&trace)]);
    let output = run_lib(&args).unwrap();
    assert_eq!(output.mismatch, None);

    let mut args = SMALL.to_vec();
    args.extend(["--expect", path_str(&saida), path_str(&trace)]);
    assert!(run_lib(&args).unwrap().mismatch.is_some());
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n");

    let err = run_lib(&["-p", "3000", path_str(&trace)]).unwrap_err();
    assert!(format!("{err:#}").contains("power of two"), "{err:#}");

    let err = run_lib(&["-f", "0", path_str(&trace)]).unwrap_err();
    assert!(format!("{err:#}").contains("invalid simulator configuration"));
}

#[test]
fn test_bad_trace_line_reports_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n# skip\nfoo\n");

    let err = run_lib(&[path_str(&trace)]).unwrap_err();
    assert!(format!("{err:#}").contains("line 3"), "{err:#}");
}

#[test]
fn test_missing_trace_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    assert!(run_lib(&[path_str(&missing)]).is_err());
}

#[test]
fn test_binary_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_file(&dir, "trace.txt", "0\n4096\n0\n");

    let output = run_bin(&[path_str(&trace)]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("MEMORY SIMULATOR - Access Statistics"));
    assert!(stdout.contains("Page Faults:                2"));

    let wrong = write_file(&dir, "wrong.txt", "nothing like the report\n");
    let output = run_bin(&["--expect", path_str(&wrong), path_str(&trace)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not match"));

    let output = run_bin(&["-p", "0", path_str(&trace)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: invalid simulator configuration"));

    let wide = write_file(&dir, "wide.txt", "0\n8192\n");
    let output = run_bin(&["--strict-addresses", "-b", "13", path_str(&wide)]);
    assert_eq!(output.status.code(), Some(2));
}
