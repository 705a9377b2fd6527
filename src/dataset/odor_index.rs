//! Which sessions responded significantly to which odor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{CohortKind, SignificantExtract};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcuteOdorEntry {
    /// animal -> sessions of that animal responding to the odor.
    pub sessions_by_animal: BTreeMap<String, Vec<String>>,
    /// Responding sessions per animal, every animal listed (zero included).
    pub roi_counts: BTreeMap<String, usize>,
    pub total_animals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OdorIndex {
    /// No loaded session had a single significant response.
    AllInsignificant { sessions: Vec<String> },
    Acute {
        sig_odors: Vec<u32>,
        per_odor: BTreeMap<u32, AcuteOdorEntry>,
        nosig_sessions: Vec<String>,
    },
    Chronic {
        sig_odors: Vec<u32>,
        /// odor -> responding sessions, in date order.
        per_odor: BTreeMap<u32, Vec<String>>,
        /// Every session, in date order.
        sessions: Vec<String>,
        nosig_sessions: Vec<String>,
    },
}

impl OdorIndex {
    pub fn sig_odors(&self) -> &[u32] {
        match self {
            OdorIndex::AllInsignificant { .. } => &[],
            OdorIndex::Acute { sig_odors, .. } | OdorIndex::Chronic { sig_odors, .. } => sig_odors,
        }
    }

    pub fn is_all_insignificant(&self) -> bool {
        matches!(self, OdorIndex::AllInsignificant { .. })
    }
}

/// Builds the index from per-session extracts; chronic extracts must already
/// be in date order.
pub fn build_odor_index(kind: CohortKind, extracts: &[SignificantExtract]) -> OdorIndex {
    let nosig_sessions: Vec<String> = extracts
        .iter()
        .filter(|e| e.is_empty())
        .map(|e| e.session.name())
        .collect();

    if nosig_sessions.len() == extracts.len() {
        return OdorIndex::AllInsignificant {
            sessions: nosig_sessions,
        };
    }

    let mut sig_odors: Vec<u32> = Vec::new();
    for odor in extracts.iter().flat_map(|e| e.odors.iter()) {
        if !sig_odors.contains(odor) {
            sig_odors.push(*odor);
        }
    }
    sig_odors.sort_unstable();

    let responding: Vec<&SignificantExtract> = extracts.iter().filter(|e| !e.is_empty()).collect();

    match kind {
        CohortKind::Acute => {
            let per_odor = sig_odors
                .iter()
                .map(|&odor| (odor, acute_entry(&responding, odor)))
                .collect();
            OdorIndex::Acute {
                sig_odors,
                per_odor,
                nosig_sessions,
            }
        }
        CohortKind::Chronic => {
            let per_odor = sig_odors
                .iter()
                .map(|&odor| {
                    let sessions = responding
                        .iter()
                        .filter(|e| e.has_odor(odor))
                        .map(|e| e.session.name())
                        .collect();
                    (odor, sessions)
                })
                .collect();
            OdorIndex::Chronic {
                sig_odors,
                per_odor,
                sessions: extracts.iter().map(|e| e.session.name()).collect(),
                nosig_sessions,
            }
        }
    }
}

fn acute_entry(responding: &[&SignificantExtract], odor: u32) -> AcuteOdorEntry {
    let mut sessions_by_animal: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut roi_counts: BTreeMap<String, usize> = BTreeMap::new();
    for extract in responding {
        let animal = &extract.session.animal_id;
        let count = roi_counts.entry(animal.clone()).or_insert(0);
        if extract.has_odor(odor) {
            *count += 1;
            sessions_by_animal
                .entry(animal.clone())
                .or_default()
                .push(extract.session.name());
        }
    }
    AcuteOdorEntry {
        total_animals: sessions_by_animal.len(),
        sessions_by_animal,
        roi_counts,
    }
}
