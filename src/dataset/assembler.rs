use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::dataset::{CohortKey, CohortKind, DatasetConfig, SessionAnalysis, SessionId};
use crate::error::{Result, RoiError};
use crate::response::{Cell, Field};
use crate::session::{SampleType, parse_sample_label};

/// One sample of one session in a statistic table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub key: CohortKey,
    /// Sample index `k` of `"<Type> <k>"`.
    pub sample: u32,
    pub values: BTreeMap<u32, Cell>,
}

/// Long-format table of one statistic across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTable {
    pub statistic: Field,
    pub cohort: CohortKind,
    pub sample_type: Option<SampleType>,
    /// Odor columns; the union of odors seen until finalized.
    pub odors: Vec<u32>,
    pub rows: Vec<DatasetRow>,
}

impl DatasetTable {
    pub fn new(statistic: Field, cohort: CohortKind) -> Self {
        Self {
            statistic,
            cohort,
            sample_type: None,
            odors: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn rows_for<'a>(&'a self, key: &'a CohortKey) -> impl Iterator<Item = &'a DatasetRow> + 'a {
        self.rows.iter().filter(move |r| &r.key == key)
    }

    fn note_odor(&mut self, odor: u32) {
        if let Err(pos) = self.odors.binary_search(&odor) {
            self.odors.insert(pos, odor);
        }
    }

    /// Canonical copy: fixed odor columns, missing ones filled, rows sorted by key then sample.
    pub fn finalized(&self, canonical_odors: &[u32]) -> DatasetTable {
        let mut rows: Vec<DatasetRow> = self
            .rows
            .iter()
            .map(|r| DatasetRow {
                key: r.key.clone(),
                sample: r.sample,
                values: canonical_odors
                    .iter()
                    .map(|o| (*o, r.values.get(o).copied().unwrap_or(Cell::Missing)))
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key).then(a.sample.cmp(&b.sample)));
        DatasetTable {
            statistic: self.statistic,
            cohort: self.cohort,
            sample_type: self.sample_type,
            odors: canonical_odors.to_vec(),
            rows,
        }
    }
}

/// Significant (odor -> statistic) entries of one session, used to pick plots.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificantExtract {
    pub session: SessionId,
    /// Significant odors, first-seen order across samples.
    pub odors: Vec<u32>,
    /// sample label -> odor -> statistic values.
    pub samples: BTreeMap<String, BTreeMap<u32, BTreeMap<Field, Cell>>>,
}

impl SignificantExtract {
    pub fn is_empty(&self) -> bool {
        self.odors.is_empty()
    }

    pub fn has_odor(&self, odor: u32) -> bool {
        self.odors.contains(&odor)
    }
}

/// Accumulates sessions into per-statistic tables.
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    config: DatasetConfig,
    cohort: CohortKind,
    tables: Vec<DatasetTable>,
    extracts: Vec<SignificantExtract>,
}

impl DatasetAssembler {
    pub fn new(config: DatasetConfig, cohort: CohortKind) -> Self {
        let tables = config
            .statistics
            .iter()
            .map(|s| DatasetTable::new(*s, cohort))
            .collect();
        Self {
            config,
            cohort,
            tables,
            extracts: Vec::new(),
        }
    }

    pub fn cohort(&self) -> CohortKind {
        self.cohort
    }

    pub fn tables(&self) -> &[DatasetTable] {
        &self.tables
    }

    pub fn extracts(&self) -> &[SignificantExtract] {
        &self.extracts
    }

    /// Appends one session's rows to every statistic table and records its
    /// significant entries. Nothing is appended if the session is rejected.
    pub fn add_session(&mut self, session: &SessionAnalysis) -> Result<()> {
        let key = session.id.cohort_key(self.cohort)?;

        let mut samples = Vec::with_capacity(session.sheets.len());
        for sheet in &session.sheets {
            let (kind, k) = parse_sample_label(&sheet.sample)
                .ok_or_else(|| RoiError::UnknownSample(sheet.sample.clone()))?;
            if kind != session.sample_type {
                return Err(RoiError::UnknownSample(sheet.sample.clone()));
            }
            samples.push(k);
        }

        let established = self.tables.iter().find_map(|t| t.sample_type);
        if let Some(t) = established.filter(|t| *t != session.sample_type) {
            warn!(
                session = %session.id,
                expected = %t,
                found = %session.sample_type,
                "sample type differs from earlier sessions"
            );
            let label = session
                .sheets
                .first()
                .map_or_else(|| session.sample_type.to_string(), |s| s.sample.clone());
            return Err(RoiError::UnknownSample(label));
        }

        for table in &mut self.tables {
            table.sample_type = Some(session.sample_type);

            let mut appended = 0usize;
            for (sheet, &k) in session.sheets.iter().zip(&samples) {
                let Some(row) = sheet.rows.get(&table.statistic) else {
                    continue;
                };
                let masked = self.config.masked_when_insignificant.contains(&table.statistic);
                let sig_row = sheet.rows.get(&Field::Significance);
                let mut values = BTreeMap::new();
                for (i, (&odor, &cell)) in sheet.odors.iter().zip(row).enumerate() {
                    let insignificant = matches!(
                        sig_row.and_then(|r| r.get(i)),
                        Some(Cell::NotSignificant)
                    );
                    let cell = if masked && insignificant {
                        Cell::Missing
                    } else {
                        cell
                    };
                    values.insert(odor, cell);
                }
                for odor in values.keys() {
                    table.note_odor(*odor);
                }
                table.rows.push(DatasetRow {
                    key: key.clone(),
                    sample: k,
                    values,
                });
                appended += 1;
            }
            if appended == 0 {
                debug!(
                    session = %session.id,
                    statistic = table.statistic.label(),
                    "session contributes no rows"
                );
            }
        }

        let extract = self.extract(session);
        self.extracts.push(extract);
        Ok(())
    }

    fn extract(&self, session: &SessionAnalysis) -> SignificantExtract {
        let mut odors = Vec::new();
        let mut samples = BTreeMap::new();
        for sheet in &session.sheets {
            let sig = sheet.significant_odors();
            if sig.is_empty() {
                continue;
            }
            let mut per_odor = BTreeMap::new();
            for odor in sig {
                let stats: BTreeMap<Field, Cell> = self
                    .config
                    .statistics
                    .iter()
                    .filter_map(|f| sheet.cell(*f, odor).map(|c| (*f, c)))
                    .collect();
                per_odor.insert(odor, stats);
                if !odors.contains(&odor) {
                    odors.push(odor);
                }
            }
            samples.insert(sheet.sample.clone(), per_odor);
        }
        SignificantExtract {
            session: session.id.clone(),
            odors,
            samples,
        }
    }

    /// Canonical tables in configuration order.
    pub fn finalize(&self) -> Vec<DatasetTable> {
        self.tables
            .iter()
            .map(|t| t.finalized(&self.config.canonical_odors))
            .collect()
    }
}
