use std::fs;
use std::path::Path;

use kira_roiqc::ctx::{Ctx, DatasetCtx};
use kira_roiqc::dataset::CohortKind;
use kira_roiqc::io::json_writer::build_session_report;
use kira_roiqc::io::summary::{format_dataset_summary, format_session_summary};
use kira_roiqc::pipeline::{DatasetPipeline, SessionPipeline};
use kira_roiqc::session::SampleType;
use serde_json::Value;
use tempfile::TempDir;

/// Odors 1, 2 and blank 8, two trials each. Sample 1 answers odor 1 from
/// frame 60 on; sample 2 stays flat.
fn write_session(dir: &Path, gain: f64) {
    fs::create_dir_all(dir).unwrap();
    let odors = [1, 2, 8, 1, 2, 8];
    let mut order = String::from("Trial,Odor\n");
    for (i, odor) in odors.iter().enumerate() {
        let trial = i + 1;
        order.push_str(&format!("{},{}\n", trial, odor));
        let mut text = String::from("\tMean1\tMean2\n");
        for f in 1..=300 {
            let s1 = if *odor == 1 && f >= 60 { 10.0 + gain } else { 10.0 };
            text.push_str(&format!("{}\t{}\t{}\n", f, s1, 20.0));
        }
        fs::write(dir.join(format!("A1_ROI3_{:03}.txt", trial)), text).unwrap();
    }
    fs::write(dir.join("A1_solenoid_order.csv"), order).unwrap();
}

fn run_session(dir: &Path, out: &Path, json: bool) -> Ctx {
    run_session_as(dir, out, json, SampleType::Cell)
}

fn run_session_as(dir: &Path, out: &Path, json: bool, sample_type: SampleType) -> Ctx {
    let mut ctx = Ctx::new(
        dir.to_path_buf(),
        Some(out.to_path_buf()),
        sample_type,
        true,
        json,
        "0.0.0-test",
    )
    .unwrap();
    SessionPipeline::session_run().run(&mut ctx).unwrap();
    ctx
}

#[test]
fn session_run_writes_every_table() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, 40.0);
    let out = tmp.path().join("out");

    let ctx = run_session(&dir, &out, true);
    for name in [
        "230514_A1_ROI3_analysis.tsv",
        "230514_A1_ROI3_avg_means.tsv",
        "230514_A1_ROI3_raw_means.tsv",
        "230514_A1_ROI3_solenoid_info.tsv",
        "230514_A1_ROI3_report.json",
    ] {
        assert!(out.join(name).exists(), "{} missing", name);
    }
    assert_eq!(ctx.records.len(), 2);
    assert_eq!(ctx.records[0].significant_odors(), vec![1]);
    assert!(ctx.records[1].significant_odors().is_empty());
}

#[test]
fn session_report_json() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, 40.0);
    let out = tmp.path().join("out");
    let ctx = run_session(&dir, &out, true);

    let report = build_session_report(&ctx).unwrap();
    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["tool"], "kira-roiqc");
    assert_eq!(json["schema_version"], "v1");
    assert_eq!(json["session"]["animal_id"], "A1");
    assert_eq!(json["session"]["n_trials"], 6);
    assert_eq!(json["session"]["trial_files"][0], "A1_ROI3_001.txt");
    assert_eq!(json["session"]["trial_files"][5], "A1_ROI3_006.txt");
    assert_eq!(json["session"]["n_samples"], 2);
    assert_eq!(json["session"]["stimulus_order_source"], "table");
    assert_eq!(json["protocol"]["baseline_frames"][1], 52);
    assert_eq!(json["significant_counts"]["1"], 1);
    assert_eq!(json["significant_counts"]["2"], 0);
    assert_eq!(json["samples"][0]["significant_odors"][0], 1);

    let written: Value =
        serde_json::from_str(&fs::read_to_string(out.join("230514_A1_ROI3_report.json")).unwrap())
            .unwrap();
    assert_eq!(written["session"]["roi_id"], "ROI3");
}

#[test]
fn session_summary_lists_significant_counts() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, 40.0);
    let ctx = run_session(&dir, &tmp.path().join("out"), false);
    let summary = format_session_summary(&ctx).unwrap();
    assert!(summary.starts_with("kira-roiqc v0.0.0-test\n"));
    assert!(summary.contains("Session: 230514_A1_ROI3"));
    assert!(summary.contains("Significant (odor:samples): 1:1 2:0 8:0"));
    assert!(summary.contains("Warnings: none"));
}

#[test]
fn validate_pipeline_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, 40.0);
    let before = fs::read_dir(&dir).unwrap().count();

    let mut ctx = Ctx::new(dir.clone(), None, SampleType::Cell, false, false, "0.0.0-test").unwrap();
    SessionPipeline::session_validate().run(&mut ctx).unwrap();
    assert_eq!(ctx.records.len(), 2);
    assert_eq!(fs::read_dir(&dir).unwrap().count(), before);
}

#[test]
fn compile_chronic_sessions() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("analysis");
    let late = tmp.path().join("230120--A1_ROI3");
    let early = tmp.path().join("230105--A1_ROI3");
    write_session(&late, 40.0);
    write_session(&early, 20.0);
    run_session(&late, &out, false);
    run_session(&early, &out, false);
    fs::write(out.join("230199_A1_ROI3_analysis.tsv"), "garbage\n").unwrap();

    let inputs = vec![
        out.join("230120_A1_ROI3_analysis.tsv"),
        out.join("230199_A1_ROI3_analysis.tsv"),
        out.join("230105_A1_ROI3_analysis.tsv"),
    ];
    let compiled = tmp.path().join("compiled");
    let mut ctx = DatasetCtx::new(inputs, &compiled, CohortKind::Chronic, true, "0.0.0-test");
    DatasetPipeline::dataset_compile().run(&mut ctx).unwrap();

    let names: Vec<String> = ctx.sessions.iter().map(|s| s.id.name()).collect();
    assert_eq!(names, vec!["230105_A1_ROI3", "230120_A1_ROI3"]);
    assert_eq!(ctx.skipped.len(), 1);

    let pct = fs::read_to_string(compiled.join("compiled_Blank-subtracted_DeltaFF_p.tsv")).unwrap();
    let lines: Vec<&str> = pct.lines().collect();
    assert_eq!(lines[0], "Date\tCell\tOdor 1\tOdor 2\tOdor 3\tOdor 4\tOdor 5\tOdor 6\tOdor 7");
    assert!(lines[1].starts_with("230105\t1\t200\t\t"));
    assert!(lines[3].starts_with("230120\t1\t400\t\t"));
    for stem in ["Baseline", "Blank_sub_AUC", "Latency__s", "Time_to_peak__s"] {
        assert!(compiled.join(format!("compiled_{}.tsv", stem)).exists(), "{}", stem);
    }

    let json: Value = serde_json::from_str(
        &fs::read_to_string(compiled.join("compiled_dataset_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["cohort"], "chronic");
    assert_eq!(json["odor_index"]["outcome"], "chronic");
    assert_eq!(json["odor_index"]["sig_odors"][0], 1);
    assert_eq!(json["tables"].as_array().unwrap().len(), 5);

    let summary = format_dataset_summary(&ctx);
    assert!(summary.contains("Cohort: chronic, 2 sessions, 1 skipped"));
}

#[test]
fn rejected_duplicate_name_keeps_the_assembled_session() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("cells").join("230514--A1_ROI3");
    let second = tmp.path().join("grids").join("230514--A1_ROI3");
    write_session(&first, 40.0);
    write_session(&second, 40.0);
    let cell_out = tmp.path().join("cell_out");
    let grid_out = tmp.path().join("grid_out");
    run_session(&first, &cell_out, false);
    run_session_as(&second, &grid_out, false, SampleType::Grid);

    let inputs = vec![
        cell_out.join("230514_A1_ROI3_analysis.tsv"),
        grid_out.join("230514_A1_ROI3_analysis.tsv"),
    ];
    let mut ctx = DatasetCtx::new(
        inputs,
        &tmp.path().join("compiled"),
        CohortKind::Acute,
        false,
        "0.0.0-test",
    );
    DatasetPipeline::dataset_compile().run(&mut ctx).unwrap();

    assert_eq!(ctx.sessions.len(), 1);
    assert_eq!(ctx.sessions[0].sample_type, SampleType::Cell);
    assert_eq!(ctx.skipped, vec!["230514_A1_ROI3"]);
    assert!(ctx.tables.iter().all(|t| t.rows.len() == 2));
}
