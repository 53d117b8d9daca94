use crate::cli::Cli;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use decoygen::{
    core::io::{pdb::PdbFile, traits::MolecularFile},
    engine::progress::ProgressReporter,
    workflows,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

pub fn run(cli: &Cli) -> Result<()> {
    let config = config::build_config(cli)?;

    info!("Loading input structure from {:?}", &cli.pdb_structure);
    let (system, _metadata) =
        PdbFile::read_from_path(&cli.pdb_structure).map_err(|e| CliError::FileParsing {
            path: cli.pdb_structure.clone(),
            source: e.into(),
        })?;
    info!(
        "{} loaded ({} atoms)",
        cli.pdb_structure.display(),
        system.atom_count()
    );

    let mut rng = match cli.seed {
        Some(seed) => {
            info!("Using fixed random seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());

    println!("Generating decoys...");
    let report = workflows::generate::run(&system, &config, &reporter, &mut rng)?;

    println!("{} decoys generated.", report.written());
    if config.refine.is_some() {
        let failures: Vec<_> = report.refine_failures().collect();
        println!(
            "{} of {} decoys refined.",
            report.refined(),
            report.written()
        );
        if !failures.is_empty() {
            warn!("{} refinement(s) failed:", failures.len());
            for record in failures {
                warn!("  {} -> {:?}", record.path.display(), record.refine);
                println!("  ✗ refinement failed for {}", record.path.display());
            }
        }
    }

    Ok(())
}
