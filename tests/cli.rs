use std::fs;
use std::path::Path;

use assert_cmd::Command;
use clap::Parser;
use kira_roiqc::cli::{Cli, CohortArg, Commands, SampleTypeArg};
use tempfile::TempDir;

fn write_session(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let odors = [1, 8, 1, 8];
    let mut order = String::from("Trial,Odor\n");
    for (i, odor) in odors.iter().enumerate() {
        let trial = i + 1;
        order.push_str(&format!("{},{}\n", trial, odor));
        let mut text = String::from("\tMean1\n");
        for f in 1..=300 {
            let v = if *odor == 1 && f >= 65 { 30.0 } else { 10.0 };
            text.push_str(&format!("{}\t{}\n", f, v));
        }
        fs::write(dir.join(format!("A1_ROI3_{:03}.txt", trial)), text).unwrap();
    }
    fs::write(dir.join("A1_solenoid_order.csv"), order).unwrap();
}

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_args_parse() {
    let cli = Cli::try_parse_from([
        "kira-roiqc",
        "run",
        "--input",
        "a",
        "b",
        "--sample-type",
        "glomerulus",
        "--drop-trials",
        "3,7",
        "--json",
    ])
    .unwrap();
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.input.len(), 2);
    assert_eq!(args.sample_type, SampleTypeArg::Glomerulus);
    assert_eq!(args.drop_trials, vec![3, 7]);
    assert!(args.json);
    assert!(!args.no_tsv);
    assert!(args.out.is_none());
}

#[test]
fn compile_args_parse() {
    let cli = Cli::try_parse_from([
        "kira-roiqc",
        "compile",
        "--input",
        "x_analysis.tsv",
        "--cohort",
        "chronic",
        "--out",
        "o",
    ])
    .unwrap();
    let Commands::Compile(args) = cli.command else {
        panic!("expected compile");
    };
    assert_eq!(args.cohort, CohortArg::Chronic);
    assert!(Cli::try_parse_from(["kira-roiqc", "compile", "--cohort", "acute", "--out", "o"]).is_err());
}

#[test]
fn run_then_compile() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("230514--A1_ROI3");
    write_session(&session);

    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(&session)
        .arg("--sample-type")
        .arg("cell");
    cmd.assert().success();
    let analysis = session.join("230514_A1_ROI3_analysis.tsv");
    assert!(analysis.exists());

    let out = tmp.path().join("compiled");
    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("compile")
        .arg("--input")
        .arg(&analysis)
        .arg("--cohort")
        .arg("acute")
        .arg("--out")
        .arg(&out)
        .arg("--json");
    cmd.assert().success();
    assert!(out.join("compiled_Baseline.tsv").exists());
    assert!(out.join("compiled_dataset_summary.json").exists());
}

#[test]
fn failing_session_does_not_stop_the_others() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("230514--A1_ROI3");
    write_session(&good);
    let bad = tmp.path().join("230515--A1_ROI4");
    fs::create_dir_all(&bad).unwrap();

    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(&bad)
        .arg(&good)
        .arg("--sample-type")
        .arg("cell")
        .arg("--no-tsv")
        .arg("--json");
    cmd.assert().failure();
    assert!(good.join("230514_A1_ROI3_report.json").exists());
}

#[test]
fn solenoid_export() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("230514--A1_ROI3");
    write_session(&session);

    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("solenoid").arg("--input").arg(&session);
    cmd.assert().success();
    let content = fs::read_to_string(session.join("230514_A1_ROI3_solenoid_info.tsv")).unwrap();
    assert_eq!(content, "Odor\tTrial\n1\t1\n1\t3\n8\t2\n8\t4\n");
}

#[test]
fn validate_command_ok() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("230514--A1_ROI3");
    write_session(&session);

    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("validate")
        .arg("--input")
        .arg(&session)
        .arg("--sample-type")
        .arg("cell");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("validate ok"));
    assert!(stdout.contains("1:1 8:0"));
}

#[test]
fn badly_named_session_folder_fails() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session_one");
    write_session(&session);

    let mut cmd = Command::cargo_bin("kira-roiqc").unwrap();
    cmd.arg("validate")
        .arg("--input")
        .arg(&session)
        .arg("--sample-type")
        .arg("cell");
    cmd.assert().failure();
}
