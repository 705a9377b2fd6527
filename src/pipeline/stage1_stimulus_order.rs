use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::session::loader::load_stimulus_order;

pub struct Stage1StimulusOrder;

impl Stage1StimulusOrder {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<Ctx> for Stage1StimulusOrder {
    fn name(&self) -> &'static str {
        "stage1_stimulus_order"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let order = load_stimulus_order(&ctx.input, &ctx.loader)
            .with_context(|| format!("reading stimulus order of {}", ctx.input.display()))?;
        info!(
            path = %order.path.display(),
            source = ?order.source,
            trials = order.len(),
            "stimulus_order_loaded"
        );
        ctx.stimulus_order = Some(order);
        Ok(())
    }
}
