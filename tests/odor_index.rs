use std::collections::BTreeMap;

use kira_roiqc::dataset::{
    CohortKind, OdorIndex, SessionId, SignificantExtract, build_odor_index,
};

fn extract(name: &str, odors: &[u32]) -> SignificantExtract {
    SignificantExtract {
        session: SessionId::from_file_name(name).unwrap(),
        odors: odors.to_vec(),
        samples: BTreeMap::new(),
    }
}

#[test]
fn zero_sessions_means_no_significant_sessions() {
    for kind in [CohortKind::Acute, CohortKind::Chronic] {
        let index = build_odor_index(kind, &[]);
        assert!(index.is_all_insignificant());
        assert!(index.sig_odors().is_empty());
    }
}

#[test]
fn all_quiet_sessions_are_listed() {
    let extracts = vec![
        extract("230514_A1_ROI1_analysis.tsv", &[]),
        extract("230514_A2_ROI1_analysis.tsv", &[]),
    ];
    let index = build_odor_index(CohortKind::Acute, &extracts);
    match index {
        OdorIndex::AllInsignificant { sessions } => {
            assert_eq!(sessions, vec!["230514_A1_ROI1", "230514_A2_ROI1"]);
        }
        other => panic!("unexpected index: {other:?}"),
    }
}

#[test]
fn acute_index_counts_regions_per_animal() {
    let extracts = vec![
        extract("230514_A1_ROI1_analysis.tsv", &[3, 1]),
        extract("230514_A1_ROI2_analysis.tsv", &[1]),
        extract("230515_B7_ROI1_analysis.tsv", &[3]),
        extract("230516_C2_ROI1_analysis.tsv", &[]),
    ];
    let index = build_odor_index(CohortKind::Acute, &extracts);
    assert_eq!(index.sig_odors(), &[1, 3]);

    let OdorIndex::Acute {
        per_odor,
        nosig_sessions,
        ..
    } = index
    else {
        panic!("expected an acute index");
    };
    assert_eq!(nosig_sessions, vec!["230516_C2_ROI1"]);

    let odor1 = &per_odor[&1];
    assert_eq!(odor1.total_animals, 1);
    assert_eq!(
        odor1.sessions_by_animal["A1"],
        vec!["230514_A1_ROI1", "230514_A1_ROI2"]
    );
    assert_eq!(odor1.roi_counts["A1"], 2);
    assert_eq!(odor1.roi_counts["B7"], 0);
    assert!(!odor1.roi_counts.contains_key("C2"));

    let odor3 = &per_odor[&3];
    assert_eq!(odor3.total_animals, 2);
    assert_eq!(odor3.roi_counts["A1"], 1);
    assert_eq!(odor3.roi_counts["B7"], 1);
}

#[test]
fn chronic_index_keeps_date_order() {
    let extracts = vec![
        extract("230102_A1_ROI1_analysis.tsv", &[2]),
        extract("230109_A1_ROI1_analysis.tsv", &[]),
        extract("230116_A1_ROI1_analysis.tsv", &[2, 5]),
    ];
    let index = build_odor_index(CohortKind::Chronic, &extracts);
    let OdorIndex::Chronic {
        sig_odors,
        per_odor,
        sessions,
        nosig_sessions,
    } = index
    else {
        panic!("expected a chronic index");
    };
    assert_eq!(sig_odors, vec![2, 5]);
    assert_eq!(per_odor[&2], vec!["230102_A1_ROI1", "230116_A1_ROI1"]);
    assert_eq!(per_odor[&5], vec!["230116_A1_ROI1"]);
    assert_eq!(
        sessions,
        vec!["230102_A1_ROI1", "230109_A1_ROI1", "230116_A1_ROI1"]
    );
    assert_eq!(nosig_sessions, vec!["230109_A1_ROI1"]);
}

#[test]
fn index_serializes_with_outcome_tag() {
    let index = build_odor_index(CohortKind::Acute, &[]);
    let json = serde_json::to_value(&index).unwrap();
    assert_eq!(json["outcome"], "all_insignificant");

    let index = build_odor_index(
        CohortKind::Chronic,
        &[extract("230102_A1_ROI1_analysis.tsv", &[4])],
    );
    let json = serde_json::to_value(&index).unwrap();
    assert_eq!(json["outcome"], "chronic");
    assert_eq!(json["per_odor"]["4"][0], "230102_A1_ROI1");
}
