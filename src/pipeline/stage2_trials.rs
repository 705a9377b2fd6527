use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::session::load_trials;

pub struct Stage2Trials;

impl Stage2Trials {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<Ctx> for Stage2Trials {
    fn name(&self) -> &'static str {
        "stage2_trials"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let order = ctx
            .stimulus_order
            .as_ref()
            .context("stimulus order missing")?;
        let loaded = load_trials(&ctx.input, ctx.sample_type, order, &ctx.loader)
            .with_context(|| format!("loading trials of {}", ctx.input.display()))?;

        if !ctx.loader.drop_trials.is_empty() && loaded.dropped_rows == 0 {
            ctx.warnings.push(format!(
                "trials {:?} not present; nothing dropped",
                ctx.loader.drop_trials
            ));
        }
        ctx.trial_files = loaded.files;
        ctx.table = Some(loaded.table);
        Ok(())
    }
}
