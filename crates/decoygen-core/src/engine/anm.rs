use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::engine::error::EngineError;
use nalgebra::{DMatrix, DVector, Point3, SymmetricEigen};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Eigenvalues below this magnitude are rigid-body modes (translations and
/// rotations of the whole network) and carry no internal motion.
const RIGID_MODE_EIGENVALUE_TOL: f64 = 1e-6;

/// Builds the 3N×3N Hessian of an anisotropic elastic network.
///
/// Every pair of nodes closer than `cutoff` is connected by a spring of
/// stiffness `gamma`. The off-diagonal super-element for a contact pair is
/// `-gamma/d² · (Δ ⊗ Δ)`; diagonal super-elements accumulate the negated
/// off-diagonal sums, which makes every row of the matrix sum to zero.
pub fn build_hessian(
    coords: &[Point3<f64>],
    cutoff: f64,
    gamma: f64,
) -> Result<DMatrix<f64>, EngineError> {
    let n = coords.len();
    if n < 3 {
        return Err(EngineError::Model(format!(
            "An anisotropic network needs at least 3 nodes, got {n}"
        )));
    }

    let cutoff_sq = cutoff * cutoff;
    let mut hessian = DMatrix::zeros(3 * n, 3 * n);

    for i in 0..n {
        for j in (i + 1)..n {
            let delta = coords[j] - coords[i];
            let dist_sq = delta.norm_squared();
            if dist_sq > cutoff_sq {
                continue;
            }
            if dist_sq < f64::EPSILON {
                return Err(EngineError::Model(format!(
                    "Network nodes {i} and {j} are coincident"
                )));
            }

            let k = -gamma / dist_sq;
            for a in 0..3 {
                for b in 0..3 {
                    let v = k * delta[a] * delta[b];
                    hessian[(3 * i + a, 3 * j + b)] += v;
                    hessian[(3 * j + a, 3 * i + b)] += v;
                    hessian[(3 * i + a, 3 * i + b)] -= v;
                    hessian[(3 * j + a, 3 * j + b)] -= v;
                }
            }
        }
    }

    Ok(hessian)
}

/// A set of low-frequency normal modes of an elastic network.
///
/// Mode vectors are unit columns of `eigenvectors`; the associated
/// eigenvalues are ascending and strictly positive (rigid-body modes are
/// excluded at construction). The model can describe either the reduced
/// alpha-carbon network or, after [`AnmModel::extend_to_atoms`], the full
/// atom set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnmModel {
    name: String,
    eigenvalues: DVector<f64>,
    eigenvectors: DMatrix<f64>,
    n_atoms: usize,
}

impl AnmModel {
    /// Diagonalizes a Hessian and keeps the `n_modes` softest internal modes.
    ///
    /// # Errors
    ///
    /// Fails when the matrix is not a 3N-square, or when fewer than
    /// `n_modes` non-rigid modes exist.
    pub fn from_hessian(
        name: impl Into<String>,
        hessian: DMatrix<f64>,
        n_modes: usize,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        let dim = hessian.nrows();
        if hessian.ncols() != dim || dim % 3 != 0 {
            return Err(EngineError::Model(format!(
                "Hessian must be square with 3N rows, got {}x{}",
                dim,
                hessian.ncols()
            )));
        }
        let n_atoms = dim / 3;

        let eigen = SymmetricEigen::new(hessian);
        let mut indexed: Vec<(usize, f64)> = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(i, &v)| (i, v))
            .collect();
        // nalgebra does not guarantee eigenvalue ordering
        indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let internal: Vec<(usize, f64)> = indexed
            .into_iter()
            .filter(|(_, value)| value.abs() >= RIGID_MODE_EIGENVALUE_TOL)
            .collect();
        debug!(
            "{}: {} internal modes available from a {}-node network",
            name,
            internal.len(),
            n_atoms
        );
        if internal.len() < n_modes {
            return Err(EngineError::Model(format!(
                "{}: requested {} modes but the network has only {} non-rigid modes",
                name,
                n_modes,
                internal.len()
            )));
        }

        let kept = &internal[..n_modes];
        let eigenvalues = DVector::from_iterator(n_modes, kept.iter().map(|(_, v)| *v));
        let columns: Vec<DVector<f64>> = kept
            .iter()
            .map(|(i, _)| eigen.eigenvectors.column(*i).into_owned())
            .collect();
        let eigenvectors = DMatrix::from_columns(&columns);

        info!("{}: calculated {} normal modes", name, n_modes);
        Ok(Self {
            name,
            eigenvalues,
            eigenvectors,
            n_atoms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_modes(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// Mode variances, the inverse eigenvalues. Soft modes get the largest
    /// share of the sampled motion.
    pub fn variances(&self) -> DVector<f64> {
        self.eigenvalues.map(|v| 1.0 / v)
    }

    /// Extends a reduced alpha-carbon model to an arbitrary atom set.
    ///
    /// Each atom inherits the mode components of its residue's alpha-carbon
    /// row, after which every mode column is renormalized to unit length.
    /// Eigenvalues carry over unchanged.
    ///
    /// # Errors
    ///
    /// Fails when an atom belongs to a residue that contributed no anchor to
    /// the reduced model.
    pub fn extend_to_atoms(
        &self,
        system: &MolecularSystem,
        ca_ids: &[AtomId],
        atom_ids: &[AtomId],
    ) -> Result<AnmModel, EngineError> {
        if ca_ids.len() != self.n_atoms {
            return Err(EngineError::Model(format!(
                "{}: anchor count {} does not match the model's {} nodes",
                self.name,
                ca_ids.len(),
                self.n_atoms
            )));
        }

        let mut residue_row: HashMap<ResidueId, usize> = HashMap::with_capacity(ca_ids.len());
        for (row, &ca_id) in ca_ids.iter().enumerate() {
            let atom = system
                .atom(ca_id)
                .ok_or_else(|| EngineError::Model("Unknown anchor atom ID".into()))?;
            residue_row.insert(atom.residue_id, row);
        }

        let n_modes = self.n_modes();
        let mut vectors = DMatrix::zeros(3 * atom_ids.len(), n_modes);
        for (i, &atom_id) in atom_ids.iter().enumerate() {
            let atom = system
                .atom(atom_id)
                .ok_or_else(|| EngineError::Model("Unknown atom ID in extension set".into()))?;
            let row = *residue_row.get(&atom.residue_id).ok_or_else(|| {
                EngineError::Model(format!(
                    "Atom '{}' belongs to a residue without an alpha-carbon anchor",
                    atom.name
                ))
            })?;
            for k in 0..n_modes {
                for a in 0..3 {
                    vectors[(3 * i + a, k)] = self.eigenvectors[(3 * row + a, k)];
                }
            }
        }

        for k in 0..n_modes {
            let norm = vectors.column(k).norm();
            if norm > 0.0 {
                vectors.column_mut(k).scale_mut(1.0 / norm);
            }
        }

        Ok(AnmModel {
            name: format!("{} extended", self.name),
            eigenvalues: self.eigenvalues.clone(),
            eigenvectors: vectors,
            n_atoms: atom_ids.len(),
        })
    }

    /// Exports the model as a CSV artifact: one column per mode, preceded by
    /// eigenvalue and variance rows.
    pub fn save_modes<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let path = path.as_ref();
        let map_err = |source: csv::Error| EngineError::ModelSave {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::Writer::from_path(path).map_err(map_err)?;

        let mut header = vec!["coordinate".to_string()];
        header.extend((1..=self.n_modes()).map(|k| format!("mode_{k}")));
        writer.write_record(&header).map_err(map_err)?;

        let mut eigenvalue_row = vec!["eigenvalue".to_string()];
        eigenvalue_row.extend(self.eigenvalues.iter().map(|v| v.to_string()));
        writer.write_record(&eigenvalue_row).map_err(map_err)?;

        let variances = self.variances();
        let mut variance_row = vec!["variance".to_string()];
        variance_row.extend(variances.iter().map(|v| v.to_string()));
        writer.write_record(&variance_row).map_err(map_err)?;

        for i in 0..self.eigenvectors.nrows() {
            let mut row = vec![i.to_string()];
            row.extend((0..self.n_modes()).map(|k| self.eigenvectors[(i, k)].to_string()));
            writer.write_record(&row).map_err(map_err)?;
        }
        writer.flush().map_err(|e| EngineError::Io(e))?;

        info!("{}: modes saved to {}", self.name, path.display());
        Ok(())
    }
}
