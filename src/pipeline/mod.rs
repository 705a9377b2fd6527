use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::{Ctx, DatasetCtx};

pub mod stage0_scaffold;
pub mod stage1_stimulus_order;
pub mod stage2_trials;
pub mod stage3_analyze;
pub mod stage4_output;
pub mod stage5_load_analyses;
pub mod stage6_assemble;
pub mod stage7_odor_index;
pub mod stage8_dataset_output;

pub trait Stage<C> {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut C) -> Result<()>;
}

pub struct Pipeline<C> {
    stages: Vec<Box<dyn Stage<C>>>,
}

/// Stages over one session folder.
pub type SessionPipeline = Pipeline<Ctx>;
/// Stages over many session analysis files.
pub type DatasetPipeline = Pipeline<DatasetCtx>;

impl<C> Pipeline<C> {
    pub fn new(stages: Vec<Box<dyn Stage<C>>>) -> Self {
        Self { stages }
    }

    pub fn run(&self, ctx: &mut C) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    error = %err,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}

impl SessionPipeline {
    /// Full analysis of one session, files included.
    pub fn session_run() -> Self {
        Self::new(vec![
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage1_stimulus_order::Stage1StimulusOrder::new()),
            Box::new(stage2_trials::Stage2Trials::new()),
            Box::new(stage3_analyze::Stage3Analyze::new()),
            Box::new(stage4_output::Stage4Output::new()),
        ])
    }

    /// Load and analyze without touching the output directory.
    pub fn session_validate() -> Self {
        Self::new(vec![
            Box::new(stage1_stimulus_order::Stage1StimulusOrder::new()),
            Box::new(stage2_trials::Stage2Trials::new()),
            Box::new(stage3_analyze::Stage3Analyze::new()),
        ])
    }
}

impl DatasetPipeline {
    pub fn dataset_compile() -> Self {
        Self::new(vec![
            Box::new(stage5_load_analyses::Stage5LoadAnalyses::new()),
            Box::new(stage6_assemble::Stage6Assemble::new()),
            Box::new(stage7_odor_index::Stage7OdorIndex::new()),
            Box::new(stage8_dataset_output::Stage8DatasetOutput::new()),
        ])
    }
}
