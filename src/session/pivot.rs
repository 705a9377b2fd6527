//! Per-sample pivot of the session table.
//!
//! `collect_per_sample` yields the Frame x (Odor, Trial) matrix of raw
//! traces and its trial average, the Frame x Odor matrix the analyzer reads.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::math::stats;
use crate::session::SessionTable;

/// Column-major matrix indexed by frame number.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrix<K> {
    /// 1-based frame numbers, ascending.
    pub frames: Vec<usize>,
    pub keys: Vec<K>,
    /// `columns[k][f]`; NaN where a trial has no such frame.
    pub columns: Vec<Vec<f64>>,
}

impl<K: PartialEq> FrameMatrix<K> {
    pub fn column(&self, key: &K) -> Option<&[f64]> {
        let idx = self.keys.iter().position(|k| k == key)?;
        Some(&self.columns[idx])
    }
}

impl<K> FrameMatrix<K> {
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Values of column `k` whose frame number lies in `window`.
    pub fn window(&self, k: usize, window: &std::ops::RangeInclusive<usize>) -> Vec<f64> {
        self.frames
            .iter()
            .zip(&self.columns[k])
            .filter(|(f, _)| window.contains(f))
            .map(|(_, v)| *v)
            .collect()
    }

    /// Frame numbers falling in `window`, aligned with [`FrameMatrix::window`].
    pub fn window_frames(&self, window: &std::ops::RangeInclusive<usize>) -> Vec<usize> {
        self.frames
            .iter()
            .copied()
            .filter(|f| window.contains(f))
            .collect()
    }
}

/// Raw per-trial traces, columns keyed by (odor, trial).
pub type RawMeans = FrameMatrix<(u32, usize)>;
/// Trial-averaged traces, columns keyed by odor.
pub type AvgMeans = FrameMatrix<u32>;

#[derive(Debug, Clone)]
pub struct SamplePivot {
    pub sample: String,
    pub raw: RawMeans,
    pub avg: AvgMeans,
}

impl SessionTable {
    pub fn collect_per_sample(&self, sample: &str) -> Result<SamplePivot> {
        let s = self.sample_index(sample)?;

        let mut by_key: BTreeMap<(u32, usize), BTreeMap<usize, f64>> = BTreeMap::new();
        let mut frames: Vec<usize> = Vec::new();
        for row in &self.rows {
            by_key
                .entry((row.odor, row.trial))
                .or_default()
                .insert(row.frame, row.values[s]);
            frames.push(row.frame);
        }
        frames.sort_unstable();
        frames.dedup();

        let keys: Vec<(u32, usize)> = by_key.keys().copied().collect();
        let columns: Vec<Vec<f64>> = by_key
            .values()
            .map(|col| {
                frames
                    .iter()
                    .map(|f| col.get(f).copied().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        let raw = FrameMatrix {
            frames,
            keys,
            columns,
        };
        let avg = average_trials(&raw);

        Ok(SamplePivot {
            sample: sample.to_string(),
            raw,
            avg,
        })
    }
}

/// Collapses the (odor, trial) columns into one mean column per odor.
pub fn average_trials(raw: &RawMeans) -> AvgMeans {
    let mut odors: Vec<u32> = raw.keys.iter().map(|(o, _)| *o).collect();
    odors.dedup();

    let columns = odors
        .iter()
        .map(|odor| {
            let members: Vec<&Vec<f64>> = raw
                .keys
                .iter()
                .zip(&raw.columns)
                .filter(|((o, _), _)| o == odor)
                .map(|(_, c)| c)
                .collect();
            (0..raw.frames.len())
                .map(|f| {
                    let vals: Vec<f64> = members.iter().map(|c| c[f]).collect();
                    stats::mean(&vals)
                })
                .collect()
        })
        .collect();

    FrameMatrix {
        frames: raw.frames.clone(),
        keys: odors,
        columns,
    }
}
