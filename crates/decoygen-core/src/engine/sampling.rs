use crate::engine::anm::AnmModel;
use crate::engine::error::EngineError;
use nalgebra::{DVector, Point3, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

/// Redraw bound for the degenerate case of an all-zero coefficient vector.
const MAX_REDRAWS: usize = 8;

/// Samples an ensemble of conformations along the model's normal modes.
///
/// Each conformation displaces the reference along a random mode
/// combination: one standard-normal coefficient per mode, weighted by the
/// square root of the mode variance so soft modes dominate, with the total
/// displacement rescaled to put the conformation at exactly `rmsd` from the
/// reference.
///
/// # Errors
///
/// Fails when the reference length does not match the model, when `rmsd` is
/// not positive, or when repeated draws yield no usable displacement.
pub fn sample_ensemble(
    model: &AnmModel,
    reference: &[Point3<f64>],
    n_confs: usize,
    rmsd: f64,
    rng: &mut impl Rng,
) -> Result<Vec<Vec<Point3<f64>>>, EngineError> {
    if reference.len() != model.n_atoms() {
        return Err(EngineError::Sampling(format!(
            "Reference has {} atoms but the model covers {}",
            reference.len(),
            model.n_atoms()
        )));
    }
    if !(rmsd > 0.0) {
        return Err(EngineError::Sampling(format!(
            "Target RMSD must be positive, got {rmsd}"
        )));
    }

    let n_atoms = model.n_atoms();
    let n_modes = model.n_modes();
    let amplitudes: Vec<f64> = model.variances().iter().map(|v| v.sqrt()).collect();
    let target_norm = rmsd * (n_atoms as f64).sqrt();

    let mut ensemble = Vec::with_capacity(n_confs);
    for conf_index in 0..n_confs {
        let mut displacement = DVector::zeros(3 * n_atoms);
        let mut norm = 0.0;
        for attempt in 0..MAX_REDRAWS {
            displacement.fill(0.0);
            for k in 0..n_modes {
                let z: f64 = rng.sample(StandardNormal);
                let coefficient = z * amplitudes[k];
                displacement.axpy(coefficient, &model.eigenvectors().column(k), 1.0);
            }
            norm = displacement.norm();
            if norm > f64::EPSILON {
                break;
            }
            debug!("Degenerate mode draw (attempt {attempt}), redrawing");
        }
        if norm <= f64::EPSILON {
            return Err(EngineError::Sampling(format!(
                "Conformation {conf_index}: no usable displacement after {MAX_REDRAWS} draws"
            )));
        }

        let scale = target_norm / norm;
        let conformation: Vec<Point3<f64>> = reference
            .iter()
            .enumerate()
            .map(|(i, point)| {
                point
                    + Vector3::new(
                        displacement[3 * i],
                        displacement[3 * i + 1],
                        displacement[3 * i + 2],
                    ) * scale
            })
            .collect();
        ensemble.push(conformation);
    }

    Ok(ensemble)
}
