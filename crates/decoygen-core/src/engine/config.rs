use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_NUM_DECOYS: usize = 10;
pub const DEFAULT_RMSD: f64 = 1.0;
pub const DEFAULT_NUM_MODES: usize = 3;
pub const DEFAULT_CUTOFF: f64 = 15.0;
pub const DEFAULT_GAMMA: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {message}")]
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },
}

/// How the external side-chain refiner is driven.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineConfig {
    /// Path to the repacking executable, invoked as `<binary> -i <in> -o <out>`.
    pub binary: PathBuf,
    /// Upper bound on concurrently running refiner processes.
    /// `None` means one per available core.
    pub max_workers: Option<usize>,
}

/// Parameters of a decoy generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    /// Name stem for every produced file.
    pub structure_name: String,
    /// Requested decoy count; the reference conformation counts toward it
    /// but is never written, so `num_decoys - 1` files are produced.
    pub num_decoys: usize,
    /// Target RMSD (Angstroms) of each sampled conformation from the reference.
    pub rmsd: f64,
    /// Number of low-frequency normal modes to sample along.
    pub num_modes: usize,
    /// Move the structure to the coordinate origin before modeling.
    pub to_center: bool,
    /// Apply a random rotation before modeling.
    pub random_rotation: bool,
    /// Directory decoy files are written into.
    pub output_dir: PathBuf,
    /// Export the calculated models as CSV artifacts.
    pub save_models: bool,
    /// Contact distance cutoff (Angstroms) of the elastic network.
    pub cutoff: f64,
    /// Uniform spring constant of the elastic network.
    pub gamma: f64,
    /// Side-chain refinement stage; `None` skips refinement entirely.
    pub refine: Option<RefineConfig>,
}

#[derive(Default)]
pub struct GenerateConfigBuilder {
    structure_name: Option<String>,
    num_decoys: Option<usize>,
    rmsd: Option<f64>,
    num_modes: Option<usize>,
    to_center: Option<bool>,
    random_rotation: Option<bool>,
    output_dir: Option<PathBuf>,
    save_models: Option<bool>,
    cutoff: Option<f64>,
    gamma: Option<f64>,
    refine: Option<RefineConfig>,
}

impl GenerateConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_name(mut self, name: impl Into<String>) -> Self {
        self.structure_name = Some(name.into());
        self
    }
    pub fn num_decoys(mut self, n: usize) -> Self {
        self.num_decoys = Some(n);
        self
    }
    pub fn rmsd(mut self, rmsd: f64) -> Self {
        self.rmsd = Some(rmsd);
        self
    }
    pub fn num_modes(mut self, n: usize) -> Self {
        self.num_modes = Some(n);
        self
    }
    pub fn to_center(mut self, yes: bool) -> Self {
        self.to_center = Some(yes);
        self
    }
    pub fn random_rotation(mut self, yes: bool) -> Self {
        self.random_rotation = Some(yes);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn save_models(mut self, yes: bool) -> Self {
        self.save_models = Some(yes);
        self
    }
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }
    pub fn refine(mut self, refine: Option<RefineConfig>) -> Self {
        self.refine = refine;
        self
    }

    pub fn build(self) -> Result<GenerateConfig, ConfigError> {
        let config = GenerateConfig {
            structure_name: self
                .structure_name
                .ok_or(ConfigError::MissingParameter("structure_name"))?,
            num_decoys: self.num_decoys.unwrap_or(DEFAULT_NUM_DECOYS),
            rmsd: self.rmsd.unwrap_or(DEFAULT_RMSD),
            num_modes: self.num_modes.unwrap_or(DEFAULT_NUM_MODES),
            to_center: self.to_center.unwrap_or(true),
            random_rotation: self.random_rotation.unwrap_or(false),
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            save_models: self.save_models.unwrap_or(false),
            cutoff: self.cutoff.unwrap_or(DEFAULT_CUTOFF),
            gamma: self.gamma.unwrap_or(DEFAULT_GAMMA),
            refine: self.refine,
        };

        if config.structure_name.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "structure_name",
                message: "must not be empty".into(),
            });
        }
        if config.num_decoys < 2 {
            return Err(ConfigError::InvalidParameter {
                parameter: "num_decoys",
                message: format!(
                    "{} requested, but at least 2 are needed to produce one decoy \
                     (the reference conformation is never written)",
                    config.num_decoys
                ),
            });
        }
        if !(config.rmsd > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "rmsd",
                message: format!("{} must be positive", config.rmsd),
            });
        }
        if config.num_modes == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "num_modes",
                message: "at least one mode is required".into(),
            });
        }
        if !(config.cutoff > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "cutoff",
                message: format!("{} must be positive", config.cutoff),
            });
        }
        if !(config.gamma > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "gamma",
                message: format!("{} must be positive", config.gamma),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> GenerateConfigBuilder {
        GenerateConfigBuilder::new()
            .structure_name("1abc")
            .output_dir(PathBuf::from("decoys"))
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = minimal().build().unwrap();
        assert_eq!(config.num_decoys, 10);
        assert_eq!(config.rmsd, 1.0);
        assert_eq!(config.num_modes, 3);
        assert!(config.to_center);
        assert!(!config.random_rotation);
        assert!(!config.save_models);
        assert_eq!(config.cutoff, 15.0);
        assert!(config.refine.is_none());
    }

    #[test]
    fn missing_structure_name_is_reported() {
        let err = GenerateConfigBuilder::new()
            .output_dir(PathBuf::from("decoys"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("structure_name"));
    }

    #[test]
    fn fewer_than_two_decoys_is_invalid() {
        let err = minimal().num_decoys(1).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                parameter: "num_decoys",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_rmsd_is_invalid() {
        for rmsd in [0.0, -1.0, f64::NAN] {
            let err = minimal().rmsd(rmsd).build().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidParameter {
                    parameter: "rmsd",
                    ..
                }
            ));
        }
    }

    #[test]
    fn zero_modes_is_invalid() {
        let err = minimal().num_modes(0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                parameter: "num_modes",
                ..
            }
        ));
    }
}
