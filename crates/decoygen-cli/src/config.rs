use crate::cli::Cli;
use crate::error::{CliError, Result};
use decoygen::engine::config::{GenerateConfig, GenerateConfigBuilder, RefineConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the side-chain refinement executable.
pub const DEFAULT_SCWRL_BIN: &str = "./bin/scwrl3";
/// Default decoy output folder.
pub const DEFAULT_OUTPUT_DIR: &str = "decoys";

/// Optional values read from a TOML configuration file.
///
/// Precedence is defaults < file < command line; every field here can be
/// overridden by the corresponding flag.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub num_decoys: Option<usize>,
    pub rmsd: Option<f64>,
    pub normal_modes: Option<usize>,
    pub to_center: Option<bool>,
    pub random_rotation: Option<bool>,
    pub output_path: Option<PathBuf>,
    pub save_models: Option<bool>,
    pub cutoff: Option<f64>,
    pub gamma: Option<f64>,
    pub refine: Option<FileRefineConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRefineConfig {
    pub enabled: Option<bool>,
    pub scwrl_bin: Option<PathBuf>,
    pub max_workers: Option<usize>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

/// Merges the configuration file (if any) and the command line into the
/// engine's run configuration.
pub fn build_config(cli: &Cli) -> Result<GenerateConfig> {
    let file = match &cli.config {
        Some(path) => {
            debug!("Reading configuration file {}", path.display());
            FileConfig::from_file(path)?
        }
        None => FileConfig::default(),
    };
    let refine_file = file.refine.clone().unwrap_or_default();

    let to_center = match (cli.centering.to_center, cli.centering.no_center) {
        (true, false) => true,
        (false, true) => false,
        _ => file.to_center.unwrap_or(true),
    };

    let refine_enabled = !cli.no_refine && refine_file.enabled.unwrap_or(true);
    let refine = refine_enabled.then(|| RefineConfig {
        binary: cli
            .scwrl_bin
            .clone()
            .or(refine_file.scwrl_bin)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCWRL_BIN)),
        max_workers: cli.threads.or(refine_file.max_workers),
    });

    let mut builder = GenerateConfigBuilder::new()
        .structure_name(cli.structure_name.clone())
        .output_dir(
            cli.output_path
                .clone()
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        )
        .to_center(to_center)
        .random_rotation(cli.random_rotation || file.random_rotation.unwrap_or(false))
        .save_models(cli.save_models || file.save_models.unwrap_or(false))
        .refine(refine);

    if let Some(n) = cli.num_decoys.or(file.num_decoys) {
        builder = builder.num_decoys(n);
    }
    if let Some(r) = cli.rmsd.or(file.rmsd) {
        builder = builder.rmsd(r);
    }
    if let Some(m) = cli.normal_modes.or(file.normal_modes) {
        builder = builder.num_modes(m);
    }
    if let Some(c) = file.cutoff {
        builder = builder.cutoff(c);
    }
    if let Some(g) = file.gamma {
        builder = builder.gamma(g);
    }

    builder.build().map_err(CliError::from)
}
