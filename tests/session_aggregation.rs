use std::fs;
use std::path::Path;

use kira_roiqc::RoiError;
use kira_roiqc::session::{LoaderOptions, SampleType, load_session};
use tempfile::TempDir;

/// Writes one trial per entry of `odors`; sample `s` of trial `t` at frame
/// `f` reads `value(t, s, f)`.
fn write_session(
    dir: &Path,
    odors: &[u32],
    n_samples: usize,
    n_frames: usize,
    value: impl Fn(usize, usize, usize) -> f64,
) {
    fs::create_dir_all(dir).unwrap();
    let mut order = String::from("Trial,Odor\n");
    for (i, odor) in odors.iter().enumerate() {
        let trial = i + 1;
        order.push_str(&format!("{},{}\n", trial, odor));

        let mut text = String::new();
        for s in 0..n_samples {
            text.push_str(&format!("\tMean{}", s + 1));
        }
        text.push('\n');
        for f in 1..=n_frames {
            text.push_str(&f.to_string());
            for s in 0..n_samples {
                text.push_str(&format!("\t{}", value(trial, s, f)));
            }
            text.push('\n');
        }
        fs::write(dir.join(format!("A1_ROI3_{:03}.txt", trial)), text).unwrap();
    }
    fs::write(dir.join("A1_solenoid_order.csv"), order).unwrap();
}

#[test]
fn trials_stack_with_relabelled_samples() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[2, 1, 2, 1], 3, 5, |t, s, f| (t * 100 + s * 10 + f) as f64);

    let loaded = load_session(&dir, SampleType::Glomerulus, &LoaderOptions::default()).unwrap();
    let table = &loaded.trials.table;
    assert_eq!(loaded.order.odors, vec![2, 1, 2, 1]);
    assert_eq!(table.samples, vec!["Glomerulus 1", "Glomerulus 2", "Glomerulus 3"]);
    assert_eq!(table.rows.len(), 4 * 5);
    assert_eq!(table.trials(), vec![1, 2, 3, 4]);
    assert_eq!(table.odors(), vec![1, 2]);

    let row = &table.rows[5];
    assert_eq!((row.trial, row.frame, row.odor), (2, 1, 1));
    assert_eq!(row.values, vec![201.0, 211.0, 221.0]);
}

#[test]
fn pivot_averages_trials_per_odor() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 8, 1, 8], 2, 4, |t, s, f| (t * 10 + s + f) as f64);

    let loaded = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap();
    let pivot = loaded.trials.table.collect_per_sample("Cell 2").unwrap();

    assert_eq!(pivot.raw.keys, vec![(1, 1), (1, 3), (8, 2), (8, 4)]);
    assert_eq!(pivot.raw.frames, vec![1, 2, 3, 4]);
    assert_eq!(pivot.raw.column(&(1, 3)).unwrap()[0], 32.0);

    assert_eq!(pivot.avg.keys, vec![1, 8]);
    // odor 1: trials 1 and 3 -> (11 + 31) / 2 + f
    let odor1 = pivot.avg.column(&1).unwrap();
    assert!((odor1[0] - 22.0).abs() < 1e-9);
    assert!((odor1[3] - 25.0).abs() < 1e-9);
    let blank = pivot.avg.column(&8).unwrap();
    assert!((blank[0] - 32.0).abs() < 1e-9);
}

#[test]
fn unknown_sample_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 8], 1, 3, |_, _, _| 1.0);
    let loaded = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap();
    let err = loaded.trials.table.collect_per_sample("Grid 1").unwrap_err();
    assert!(matches!(err, RoiError::UnknownSample(_)));
}

#[test]
fn dropping_absent_trial_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 2, 8, 1, 2, 8], 1, 6, |t, _, f| (t * f) as f64);

    let plain = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap();
    let absent = LoaderOptions {
        drop_trials: vec![42],
        ..LoaderOptions::default()
    };
    let same = load_session(&dir, SampleType::Cell, &absent).unwrap();
    assert_eq!(same.trials.dropped_rows, 0);

    let a = plain.trials.table.collect_per_sample("Cell 1").unwrap();
    let b = same.trials.table.collect_per_sample("Cell 1").unwrap();
    assert_eq!(a.avg, b.avg);
}

#[test]
fn dropping_present_trial_only_touches_its_odor() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 2, 8, 1, 2, 8], 1, 6, |t, _, f| (t * f) as f64);

    let plain = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap();
    let options = LoaderOptions {
        drop_trials: vec![4],
        ..LoaderOptions::default()
    };
    let dropped = load_session(&dir, SampleType::Cell, &options).unwrap();
    assert_eq!(dropped.trials.dropped_rows, 6);

    let a = plain.trials.table.collect_per_sample("Cell 1").unwrap();
    let b = dropped.trials.table.collect_per_sample("Cell 1").unwrap();

    let trials_of = |keys: &[(u32, usize)], odor: u32| keys.iter().filter(|(o, _)| *o == odor).count();
    assert_eq!(trials_of(&a.raw.keys, 1), 2);
    assert_eq!(trials_of(&b.raw.keys, 1), 1);
    for odor in [2, 8] {
        assert_eq!(trials_of(&a.raw.keys, odor), trials_of(&b.raw.keys, odor));
        assert_eq!(a.avg.column(&odor), b.avg.column(&odor));
    }
    // Remaining odor-1 trial is trial 1: value = f.
    assert_eq!(b.avg.column(&1).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn trial_count_must_match_stimulus_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 8], 1, 3, |_, _, _| 1.0);
    fs::write(dir.join("A1_solenoid_order.csv"), "Trial,Odor\n1,1\n2,8\n3,1\n").unwrap();

    let err = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        RoiError::InconsistentTrialCount { order: 3, files: 2 }
    ));
}

#[test]
fn sample_count_must_match_across_trials() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 8], 2, 3, |_, _, _| 1.0);
    fs::write(dir.join("A1_ROI3_002.txt"), "\tMean1\n1\t1\n2\t1\n3\t1\n").unwrap();

    let err = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        RoiError::SampleCountMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn legacy_order_line_drives_odor_labels() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("230514--A1_ROI3");
    write_session(&dir, &[1, 8], 1, 3, |_, _, _| 1.0);
    fs::remove_file(dir.join("A1_solenoid_order.csv")).unwrap();
    fs::write(dir.join("A1_solenoid_info.txt"), "8 1\n").unwrap();

    let loaded = load_session(&dir, SampleType::Cell, &LoaderOptions::default()).unwrap();
    assert_eq!(loaded.order.odors, vec![8, 1]);
    assert_eq!(loaded.trials.table.rows[0].odor, 8);
}
