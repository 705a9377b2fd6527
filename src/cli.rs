use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dataset::CohortKind;
use crate::session::SampleType;

#[derive(Debug, Parser)]
#[command(
    name = "kira-roiqc",
    version,
    about = "Odor response statistics for calcium-imaging sessions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze session folders and write per-session tables.
    Run(RunArgs),
    /// Load and analyze one session without writing anything.
    Validate(ValidateArgs),
    /// Export the stimulus order of one session.
    Solenoid(SolenoidArgs),
    /// Merge session analysis files into dataset tables.
    Compile(CompileArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(
        long,
        num_args = 1..,
        required = true,
        help = "Session folder named YYMMDD--<animal>_<roi> (repeatable)"
    )]
    pub input: Vec<PathBuf>,

    #[arg(long, value_enum)]
    pub sample_type: SampleTypeArg,

    #[arg(long, help = "Output directory (default: the session folder)")]
    pub out: Option<PathBuf>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "1-based trial numbers to exclude, e.g. 3,7"
    )]
    pub drop_trials: Vec<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub no_tsv: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Reject the single-line solenoid_info.txt order format"
    )]
    pub no_legacy_order: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, value_enum)]
    pub sample_type: SampleTypeArg,

    #[arg(long, value_delimiter = ',')]
    pub drop_trials: Vec<usize>,

    #[arg(long, default_value_t = false)]
    pub no_legacy_order: bool,
}

#[derive(Debug, Args)]
pub struct SolenoidArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, help = "Output directory (default: the session folder)")]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_legacy_order: bool,
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    #[arg(
        long,
        num_args = 1..,
        required = true,
        help = "<date>_<animal>_<roi>_analysis.tsv files (repeatable)"
    )]
    pub input: Vec<PathBuf>,

    #[arg(long, value_enum)]
    pub cohort: CohortArg,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleTypeArg {
    Cell,
    Glomerulus,
    Grid,
}

impl From<SampleTypeArg> for SampleType {
    fn from(arg: SampleTypeArg) -> Self {
        match arg {
            SampleTypeArg::Cell => SampleType::Cell,
            SampleTypeArg::Glomerulus => SampleType::Glomerulus,
            SampleTypeArg::Grid => SampleType::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CohortArg {
    Acute,
    Chronic,
}

impl From<CohortArg> for CohortKind {
    fn from(arg: CohortArg) -> Self {
        match arg {
            CohortArg::Acute => CohortKind::Acute,
            CohortArg::Chronic => CohortKind::Chronic,
        }
    }
}
