//! Baseline, peak, significance, AUC and timing statistics per odor.
//!
//! Pure function of the averaged matrix and the protocol: no I/O.
//! The last odor column is the blank (no-odor control).

use crate::error::{Result, RoiError};
use crate::math::stats;
use crate::protocol::ProtocolConfig;
use crate::response::{Cell, OdorResponse};
use crate::session::AvgMeans;

/// Per-odor quantities computed before the significance split.
#[derive(Debug, Clone, Copy)]
struct Initial {
    baseline: f64,
    peak: f64,
    delta_f: f64,
    baseline_std3: f64,
    auc: f64,
}

pub fn analyze_signal(avg: &AvgMeans, protocol: &ProtocolConfig) -> Result<Vec<OdorResponse>> {
    if avg.keys.is_empty() {
        return Err(RoiError::NoOdors);
    }
    let baseline_complete = avg.window_frames(&protocol.baseline_frames).len()
        == protocol.baseline_frames.clone().count();
    if !baseline_complete || avg.n_frames() < protocol.min_frames() {
        return Err(RoiError::TooFewFrames {
            needed: protocol.min_frames(),
            got: avg.n_frames(),
        });
    }

    let initial: Vec<Initial> = (0..avg.keys.len())
        .map(|k| initial_nums(avg, k, protocol))
        .collect();

    let blank = initial[initial.len() - 1];
    let delta_f_blank = blank.delta_f;
    let auc_blank = blank.auc;
    let odor_onset = protocol.odor_onset_seconds();

    let mut out = Vec::with_capacity(avg.keys.len());
    for (k, (&odor, init)) in avg.keys.iter().zip(&initial).enumerate() {
        let blank_sub_delta_f = init.delta_f - delta_f_blank;
        let blank_sub_delta_f_pct = blank_sub_delta_f / init.baseline * 100.0;
        let significant = blank_sub_delta_f > init.baseline_std3;

        let mut response = OdorResponse {
            odor,
            baseline: init.baseline,
            peak: init.peak,
            delta_f: init.delta_f,
            baseline_std3: init.baseline_std3,
            delta_f_blank,
            blank_sub_delta_f,
            blank_sub_delta_f_pct,
            significance: Cell::NotSignificant,
            auc: init.auc,
            auc_blank,
            blank_sub_auc: Cell::NotApplicable,
            peak_time: Cell::NotApplicable,
            odor_onset,
            response_onset: Cell::NotApplicable,
            latency: Cell::NotApplicable,
            time_to_peak: Cell::NotApplicable,
        };

        if significant {
            let timing = sig_timing(avg, k, odor, init, protocol)?;
            response.significance = Cell::Measured(blank_sub_delta_f_pct);
            response.blank_sub_auc = Cell::Measured(init.auc - auc_blank);
            response.peak_time = Cell::Measured(timing.peak_time);
            response.response_onset = Cell::Measured(timing.response_onset);
            response.latency = Cell::Measured(timing.response_onset - odor_onset);
            response.time_to_peak = Cell::Measured(timing.peak_time - timing.response_onset);
        }
        out.push(response);
    }

    Ok(out)
}

fn initial_nums(avg: &AvgMeans, k: usize, protocol: &ProtocolConfig) -> Initial {
    let base_win = avg.window(k, &protocol.baseline_frames);
    let baseline = stats::mean(&base_win);
    let baseline_std3 = stats::sample_std(&base_win) * protocol.std_multiplier;
    let peak = stats::max(&avg.window(k, &protocol.peak_frames));

    let auc_win = avg.window(k, &protocol.auc_frames);
    let n = auc_win.iter().filter(|v| !v.is_nan()).count();
    let raw_auc = (stats::sum(&auc_win) - baseline * n as f64) * protocol.frame_to_seconds;
    // Negative area has no physical meaning here; floor at zero.
    let auc = if raw_auc < 0.0 { 0.0 } else { raw_auc };

    Initial {
        baseline,
        peak,
        delta_f: peak - baseline,
        baseline_std3,
        auc,
    }
}

struct Timing {
    peak_time: f64,
    response_onset: f64,
}

fn sig_timing(
    avg: &AvgMeans,
    k: usize,
    odor: u32,
    init: &Initial,
    protocol: &ProtocolConfig,
) -> Result<Timing> {
    let auc_frames = avg.window_frames(&protocol.auc_frames);
    let auc_values = avg.window(k, &protocol.auc_frames);
    let peak_frame = stats::argmax(&auc_values)
        .map(|i| auc_frames[i])
        .ok_or(RoiError::TooFewFrames {
            needed: protocol.min_frames(),
            got: 0,
        })?;

    let search = protocol.onset_search_frames();
    let threshold = init.delta_f * protocol.onset_fraction;
    let onset_frame = avg
        .window_frames(&search)
        .into_iter()
        .zip(avg.window(k, &search))
        .find(|(_, v)| v - init.baseline >= threshold)
        .map(|(f, _)| f)
        .ok_or(RoiError::NoOnsetFound { odor, threshold })?;

    Ok(Timing {
        peak_time: protocol.frames_to_seconds(peak_frame),
        response_onset: protocol.frames_to_seconds(onset_frame),
    })
}
