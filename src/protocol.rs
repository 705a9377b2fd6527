//! Acquisition protocol constants.
//!
//! All frame numbers are 1-based and windows are inclusive on both ends.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Frame windows and conversion factors of the imaging protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolConfig {
    pub baseline_frames: RangeInclusive<usize>,
    pub peak_frames: RangeInclusive<usize>,
    pub auc_frames: RangeInclusive<usize>,
    /// Frame at which the odor reaches the animal (hardware trigger latency included).
    pub odor_onset_frame: usize,
    /// Seconds per frame.
    pub frame_to_seconds: f64,
    /// Fraction of deltaF that marks the response onset.
    pub onset_fraction: f64,
    /// Multiplier applied to the baseline SD for the significance threshold.
    pub std_multiplier: f64,
}

impl ProtocolConfig {
    pub fn v1() -> Self {
        Self {
            baseline_frames: 1..=52,
            peak_frames: 53..=300,
            auc_frames: 1..=300,
            odor_onset_frame: 57,
            frame_to_seconds: 0.0661,
            onset_fraction: 0.05,
            std_multiplier: 3.0,
        }
    }

    pub fn frames_to_seconds(&self, frame: usize) -> f64 {
        frame as f64 * self.frame_to_seconds
    }

    pub fn odor_onset_seconds(&self) -> f64 {
        self.frames_to_seconds(self.odor_onset_frame)
    }

    /// Window searched for the response onset: from odor onset to the AUC end.
    pub fn onset_search_frames(&self) -> RangeInclusive<usize> {
        let start = self.odor_onset_frame.max(*self.auc_frames.start());
        start..=*self.auc_frames.end()
    }

    /// Frames needed before any statistic is defined.
    pub fn min_frames(&self) -> usize {
        *self.baseline_frames.end() + 1
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::v1()
    }
}
