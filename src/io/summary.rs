use anyhow::Result;

use crate::ctx::{Ctx, DatasetCtx};
use crate::dataset::OdorIndex;

pub fn format_session_summary(ctx: &Ctx) -> Result<String> {
    let table = ctx.session_table()?;

    let mut out = String::new();
    out.push_str(&format!("kira-roiqc v{}\n", ctx.tool_version));
    out.push_str(&format!(
        "Session: {} (date {}, animal {}, roi {})\n",
        ctx.meta.file_prefix(),
        ctx.meta.date,
        ctx.meta.animal_id,
        ctx.meta.roi_id
    ));
    out.push_str(&format!(
        "Input: {} trials, {} {} samples, odors {:?}\n",
        ctx.n_trials(),
        table.samples.len(),
        ctx.sample_type.as_str().to_lowercase(),
        table.odors()
    ));

    let mut parts = Vec::new();
    for odor in table.odors() {
        let n = ctx
            .records
            .iter()
            .filter(|r| r.response(odor).is_some_and(|x| x.is_significant()))
            .count();
        parts.push(format!("{}:{}", odor, n));
    }
    out.push_str(&format!("Significant (odor:samples): {}\n", parts.join(" ")));

    push_warnings(&mut out, &ctx.warnings);
    Ok(out)
}

pub fn format_dataset_summary(ctx: &DatasetCtx) -> String {
    let mut out = String::new();
    out.push_str(&format!("kira-roiqc v{}\n", ctx.tool_version));
    out.push_str(&format!(
        "Cohort: {}, {} sessions, {} skipped\n",
        ctx.cohort.as_str(),
        ctx.sessions.len(),
        ctx.skipped.len()
    ));
    match &ctx.odor_index {
        Some(OdorIndex::AllInsignificant { .. }) => {
            out.push_str("No session had a significant response\n");
        }
        Some(index) => {
            out.push_str(&format!("Significant odors: {:?}\n", index.sig_odors()));
        }
        None => {}
    }
    push_warnings(&mut out, &ctx.warnings);
    out
}

fn push_warnings(out: &mut String, warnings: &[String]) {
    if warnings.is_empty() {
        out.push_str("Warnings: none\n");
    } else {
        out.push_str("Warnings:\n");
        for w in warnings {
            out.push_str(&format!("  - {}\n", w));
        }
    }
}
