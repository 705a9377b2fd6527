use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::ctx::{Ctx, DatasetCtx};
use crate::protocol::ProtocolConfig;
use crate::schema::v1::{
    DatasetReportV1, DatasetTableMeta, ProtocolMeta, SampleSummary, SessionInfo, SessionReportV1,
};
use crate::session::StimulusOrderSource;

const TOOL: &str = "kira-roiqc";
const SCHEMA_VERSION: &str = "v1";

fn protocol_meta(p: &ProtocolConfig) -> ProtocolMeta {
    ProtocolMeta {
        baseline_frames: [*p.baseline_frames.start(), *p.baseline_frames.end()],
        peak_frames: [*p.peak_frames.start(), *p.peak_frames.end()],
        auc_frames: [*p.auc_frames.start(), *p.auc_frames.end()],
        odor_onset_frame: p.odor_onset_frame,
        frame_to_seconds: p.frame_to_seconds,
    }
}

pub fn build_session_report(ctx: &Ctx) -> Result<SessionReportV1> {
    let table = ctx.session_table()?;

    let samples: Vec<SampleSummary> = ctx
        .records
        .iter()
        .map(|r| SampleSummary {
            sample: r.sample.clone(),
            significant_odors: r.significant_odors(),
        })
        .collect();

    let mut significant_counts: BTreeMap<u32, usize> = BTreeMap::new();
    for odor in table.odors() {
        significant_counts.insert(odor, 0);
    }
    for s in &samples {
        for odor in &s.significant_odors {
            *significant_counts.entry(*odor).or_insert(0) += 1;
        }
    }

    let stimulus_order_source = ctx.stimulus_order.as_ref().map(|o| {
        match o.source {
            StimulusOrderSource::Table => "table",
            StimulusOrderSource::LegacyLine => "legacy_line",
        }
        .to_string()
    });

    Ok(SessionReportV1 {
        tool: TOOL.to_string(),
        version: ctx.tool_version.clone(),
        schema_version: SCHEMA_VERSION.to_string(),
        session: SessionInfo {
            date: ctx.meta.date.clone(),
            animal_id: ctx.meta.animal_id.clone(),
            roi_id: ctx.meta.roi_id.clone(),
            sample_type: ctx.sample_type.as_str().to_string(),
            stimulus_order_source,
            n_trials: ctx.n_trials(),
            trial_files: ctx
                .trial_files
                .iter()
                .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
                .map(str::to_string)
                .collect(),
            n_samples: table.samples.len(),
            dropped_trials: ctx.loader.drop_trials.clone(),
        },
        protocol: protocol_meta(&ctx.protocol),
        samples,
        significant_counts,
        warnings: ctx.warnings.clone(),
    })
}

pub fn build_dataset_report(ctx: &DatasetCtx) -> Result<DatasetReportV1> {
    let tables = ctx
        .tables
        .iter()
        .map(|t| {
            let path = ctx.output.table_path(t.statistic.sheet_name());
            DatasetTableMeta {
                statistic: t.statistic.sheet_name().to_string(),
                file: path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string(),
                rows: t.rows.len(),
            }
        })
        .collect();

    let odor_index = ctx.odor_index.as_ref().context("odor index missing")?;
    let odor_index =
        serde_json::to_value(odor_index).context("failed to serialize odor index")?;

    Ok(DatasetReportV1 {
        tool: TOOL.to_string(),
        version: ctx.tool_version.clone(),
        schema_version: SCHEMA_VERSION.to_string(),
        cohort: ctx.cohort.as_str().to_string(),
        sessions: ctx.sessions.iter().map(|s| s.id.name()).collect(),
        skipped: ctx.skipped.clone(),
        tables,
        odor_index,
    })
}
