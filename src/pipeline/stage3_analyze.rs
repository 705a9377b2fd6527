use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::response::{ResponseRecord, analyze_signal};

pub struct Stage3Analyze;

impl Stage3Analyze {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<Ctx> for Stage3Analyze {
    fn name(&self) -> &'static str {
        "stage3_analyze"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.session_table()?;

        let mut pivots = Vec::with_capacity(table.samples.len());
        let mut records = Vec::with_capacity(table.samples.len());
        for sample in &table.samples {
            let pivot = table.collect_per_sample(sample)?;
            let responses = analyze_signal(&pivot.avg, &ctx.protocol)
                .with_context(|| format!("analyzing {}", sample))?;
            let record = ResponseRecord {
                sample: sample.clone(),
                responses,
            };
            debug!(
                sample = %sample,
                significant = ?record.significant_odors(),
                "sample_analyzed"
            );
            pivots.push(pivot);
            records.push(record);
        }

        let significant: usize = records.iter().map(|r| r.significant_odors().len()).sum();
        info!(
            samples = records.len(),
            significant_responses = significant,
            "responses_analyzed"
        );
        ctx.pivots = pivots;
        ctx.records = records;
        Ok(())
    }
}
