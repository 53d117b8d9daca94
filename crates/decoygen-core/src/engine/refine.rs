use crate::engine::error::EngineError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Derives the refined-file path for a decoy.
///
/// The decoy file name is split on underscores and the 1st and 3rd fields
/// are recombined, so `name_anm_3.pdb` becomes `name_3.pdb`; the result sits
/// in the decoy's directory. File names with fewer than three fields do not
/// follow the decoy naming convention and are rejected.
pub fn derived_output_path(decoy: &Path) -> Result<PathBuf, EngineError> {
    let file_name = decoy
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EngineError::Refinement(format!("Unusable decoy path: {decoy:?}")))?;

    let fields: Vec<&str> = file_name.split('_').collect();
    if fields.len() < 3 {
        return Err(EngineError::Refinement(format!(
            "Decoy name '{file_name}' does not follow the <name>_anm_<index>.pdb convention"
        )));
    }

    Ok(decoy.with_file_name(format!("{}_{}", fields[0], fields[2])))
}

/// One pending refinement: a decoy to read and the file to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineJob {
    pub decoy: PathBuf,
    pub output: PathBuf,
}

impl RefineJob {
    /// Builds a job for a decoy with the conventionally derived output path.
    pub fn for_decoy(decoy: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let decoy = decoy.into();
        let output = derived_output_path(&decoy)?;
        Ok(Self { decoy, output })
    }
}

/// What became of one refinement process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineStatus {
    /// The refiner exited successfully.
    Refined,
    /// The refiner ran but exited with a failure status.
    Failed { code: Option<i32> },
    /// The refiner process could not be started at all.
    SpawnError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOutcome {
    pub decoy: PathBuf,
    pub output: PathBuf,
    pub status: RefineStatus,
}

impl RefineOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == RefineStatus::Refined
    }
}

/// Runs the external refiner over every job through a bounded worker pool.
///
/// At most `max_workers` refiner processes run at any moment (one per
/// available core when `None`). Each invocation is
/// `<binary> -i <decoy> -o <output>` with all three standard streams
/// detached; the exit status is captured and reported per decoy. Exactly one
/// outcome is returned per job, in job order, regardless of completion
/// order.
pub fn run_pool(
    binary: &Path,
    jobs: &[RefineJob],
    max_workers: Option<usize>,
) -> Result<Vec<RefineOutcome>, EngineError> {
    let workers = max_workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    if workers == 0 {
        return Err(EngineError::Refinement(
            "Worker pool size must be at least 1".into(),
        ));
    }

    debug!(
        "Refining {} decoys with {} worker(s) via {}",
        jobs.len(),
        workers,
        binary.display()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| EngineError::Refinement(format!("Failed to build worker pool: {e}")))?;

    let outcomes = pool.install(|| {
        jobs.par_iter()
            .map(|job| refine_one(binary, job))
            .collect::<Vec<_>>()
    });

    Ok(outcomes)
}

fn refine_one(binary: &Path, job: &RefineJob) -> RefineOutcome {
    let result = Command::new(binary)
        .arg("-i")
        .arg(&job.decoy)
        .arg("-o")
        .arg(&job.output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    let status = match result {
        Ok(status) if status.success() => RefineStatus::Refined,
        Ok(status) => {
            warn!(
                "Refiner failed on {} (exit code {:?})",
                job.decoy.display(),
                status.code()
            );
            RefineStatus::Failed {
                code: status.code(),
            }
        }
        Err(e) => {
            warn!(
                "Could not launch refiner for {}: {}",
                job.decoy.display(),
                e
            );
            RefineStatus::SpawnError {
                message: e.to_string(),
            }
        }
    };

    RefineOutcome {
        decoy: job.decoy.clone(),
        output: job.output.clone(),
        status,
    }
}
