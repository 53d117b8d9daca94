use clap::{Args, Parser};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "decoygen",
    version,
    about = "decoygen - Generates protein structural decoys along elastic-network normal modes and repacks their side chains with an external refiner.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Original PDB structure
    #[arg(value_name = "PDB_STRUCTURE")]
    pub pdb_structure: PathBuf,

    /// Structure name, the stem of every produced file
    #[arg(value_name = "STRUCTURE_NAME")]
    pub structure_name: String,

    /// Number of decoys to be generated (one less is written; the reference
    /// conformation is kept out of the output)
    #[arg(short = 'd', long = "num-decoys", value_name = "INT")]
    pub num_decoys: Option<usize>,

    /// Ca RMSD between each decoy and the reference, in Angstroms
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub rmsd: Option<f64>,

    /// Number of low-frequency normal modes to consider
    #[arg(long = "normal-modes", alias = "nm", value_name = "INT")]
    pub normal_modes: Option<usize>,

    /// Centering behaviour; moving to the origin is the default
    #[command(flatten)]
    pub centering: CenteringFlags,

    /// Rotate the structure randomly before modeling
    #[arg(long = "random-rotation", alias = "rr")]
    pub random_rotation: bool,

    /// Output path folder
    #[arg(short = 'o', long = "output-path", alias = "op", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Save the calculated network models as CSV artifacts
    #[arg(long = "save-models", alias = "sm")]
    pub save_models: bool,

    /// Path to the side-chain refinement executable
    #[arg(long = "scwrl-bin", value_name = "PATH")]
    pub scwrl_bin: Option<PathBuf>,

    /// Skip side-chain refinement entirely
    #[arg(long = "no-refine")]
    pub no_refine: bool,

    /// Seed for the random generator; omit for a fresh seed per run
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Upper bound on concurrently running refiner processes.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// A group of mutually exclusive flags controlling pre-model centering.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct CenteringFlags {
    /// Move the structure to the center of coordinates (the default)
    #[arg(long = "to-center", alias = "tc")]
    pub to_center: bool,
    /// Keep the structure where it is
    #[arg(long = "no-center")]
    pub no_center: bool,
}
