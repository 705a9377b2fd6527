use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kira_roiqc::cli::{Cli, Commands, CompileArgs, RunArgs, SolenoidArgs, ValidateArgs};
use kira_roiqc::ctx::{Ctx, DatasetCtx};
use kira_roiqc::io;
use kira_roiqc::pipeline::stage0_scaffold::Stage0Scaffold;
use kira_roiqc::pipeline::stage1_stimulus_order::Stage1StimulusOrder;
use kira_roiqc::pipeline::{DatasetPipeline, SessionPipeline};
use kira_roiqc::session::SampleType;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_sessions(args),
        Commands::Validate(args) => validate_session(args),
        Commands::Solenoid(args) => export_solenoid(args),
        Commands::Compile(args) => compile_dataset(args),
    }
}

fn run_sessions(args: RunArgs) -> Result<()> {
    let pipeline = SessionPipeline::session_run();
    let mut failed: Vec<PathBuf> = Vec::new();

    for input in &args.input {
        let outcome = session_ctx(input, &args).and_then(|mut ctx| {
            pipeline.run(&mut ctx)?;
            Ok(ctx)
        });
        match outcome {
            Ok(ctx) => print!("{}", io::summary::format_session_summary(&ctx)?),
            Err(err) => {
                error!(input = %input.display(), error = %format!("{:#}", err), "session failed");
                failed.push(input.clone());
            }
        }
    }

    info!(
        sessions = args.input.len(),
        failed = failed.len(),
        "run finished"
    );
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(|p| p.display().to_string()).collect();
        anyhow::bail!("{} session(s) failed: {}", failed.len(), names.join(", "));
    }
    Ok(())
}

fn session_ctx(input: &Path, args: &RunArgs) -> Result<Ctx> {
    let out_dir = args.out.as_ref().map(|out| {
        if args.input.len() > 1 {
            out.join(input.file_name().unwrap_or_default())
        } else {
            out.clone()
        }
    });
    let mut ctx = Ctx::new(
        input.to_path_buf(),
        out_dir,
        args.sample_type.into(),
        !args.no_tsv,
        args.json,
        VERSION,
    )?;
    ctx.loader.allow_legacy_order = !args.no_legacy_order;
    ctx.loader.drop_trials = args.drop_trials.clone();
    Ok(ctx)
}

fn validate_session(args: ValidateArgs) -> Result<()> {
    let mut ctx = Ctx::new(
        args.input,
        None,
        args.sample_type.into(),
        false,
        false,
        VERSION,
    )?;
    ctx.loader.allow_legacy_order = !args.no_legacy_order;
    ctx.loader.drop_trials = args.drop_trials;

    SessionPipeline::session_validate().run(&mut ctx)?;

    println!("kira-roiqc validate ok");
    print!("{}", io::summary::format_session_summary(&ctx)?);
    Ok(())
}

fn export_solenoid(args: SolenoidArgs) -> Result<()> {
    // The sample type plays no part in reading the stimulus order.
    let mut ctx = Ctx::new(args.input, args.out, SampleType::Cell, true, false, VERSION)?;
    ctx.loader.allow_legacy_order = !args.no_legacy_order;

    SessionPipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1StimulusOrder::new()),
    ])
    .run(&mut ctx)?;

    let order = ctx
        .stimulus_order
        .as_ref()
        .context("stimulus order missing")?;
    io::tsv_writer::write_solenoid_info(&ctx.output.solenoid_path, order)?;
    println!(
        "{} trials written to {}",
        order.len(),
        ctx.output.solenoid_path.display()
    );
    Ok(())
}

fn compile_dataset(args: CompileArgs) -> Result<()> {
    let mut ctx = DatasetCtx::new(
        args.input,
        &args.out,
        args.cohort.into(),
        args.json,
        VERSION,
    );
    DatasetPipeline::dataset_compile().run(&mut ctx)?;
    print!("{}", io::summary::format_dataset_summary(&ctx));
    Ok(())
}
