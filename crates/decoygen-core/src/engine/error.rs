use crate::core::io::pdb::PdbError;
use crate::engine::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write decoy '{path}': {source}", path = path.display())]
    DecoyWrite {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Failed to save model '{path}': {source}", path = path.display())]
    ModelSave {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Structure has no alpha-carbon atoms to anchor the network model")]
    NoAlphaCarbons,

    #[error("Network model error: {0}")]
    Model(String),

    #[error("Sampling error: {0}")]
    Sampling(String),

    #[error("Refinement error: {0}")]
    Refinement(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
