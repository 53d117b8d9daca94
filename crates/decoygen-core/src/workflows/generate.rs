use crate::core::io::pdb::{PdbFile, PdbMetadata};
use crate::core::io::traits::MolecularFile;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::{
    affine_from_rotation, center_of_coords, random_rotation_matrix,
};
use crate::engine::anm::{AnmModel, build_hessian};
use crate::engine::config::GenerateConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::refine::{RefineJob, RefineStatus, run_pool};
use crate::engine::sampling::sample_ensemble;
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// One generated decoy and, when refinement ran, what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyRecord {
    /// 1-based sequential index, part of the file name.
    pub index: usize,
    /// The written decoy file.
    pub path: PathBuf,
    /// Refinement status; `None` when refinement was not configured.
    pub refine: Option<RefineStatus>,
}

/// Result of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub decoys: Vec<DecoyRecord>,
}

impl GenerateReport {
    pub fn written(&self) -> usize {
        self.decoys.len()
    }

    pub fn refined(&self) -> usize {
        self.decoys
            .iter()
            .filter(|d| d.refine == Some(RefineStatus::Refined))
            .count()
    }

    pub fn refine_failures(&self) -> impl Iterator<Item = &DecoyRecord> {
        self.decoys
            .iter()
            .filter(|d| matches!(d.refine, Some(ref s) if *s != RefineStatus::Refined))
    }
}

/// Runs the decoy generation pipeline.
///
/// The input system is cloned and mutated internally; coordinates of the
/// caller's system are left untouched. `num_decoys - 1` decoy files named
/// `{structure_name}_anm_{i}.pdb` are written under the configured output
/// directory, then each one is handed to the external refiner (when
/// configured), producing `{structure_name}_{i}.pdb` alongside.
#[instrument(skip_all, name = "generate_workflow")]
pub fn run(
    system: &MolecularSystem,
    config: &GenerateConfig,
    reporter: &ProgressReporter,
    rng: &mut impl Rng,
) -> Result<GenerateReport, EngineError> {
    let mut working = system.clone();

    // === Phase 1: Orientation ===
    reporter.start_phase("Preparing structure");
    if config.to_center {
        let all_ids = working.ordered_atom_ids();
        if let Some(center) = center_of_coords(&working.positions_of(&all_ids)) {
            info!("Moving the structure to the coordinate origin");
            working.translate(&(-center.coords));
        }
    }
    if config.random_rotation {
        info!("Applying a random rotation");
        let rotation = random_rotation_matrix(rng);
        working.transform(&affine_from_rotation(&rotation));
    }
    reporter.finish_phase();

    // === Phase 2: Network model ===
    reporter.start_phase("Building network model");
    let ca_ids = working.alpha_carbon_ids();
    if ca_ids.is_empty() {
        return Err(EngineError::NoAlphaCarbons);
    }
    info!("Network anchored on {} alpha carbons", ca_ids.len());

    let ca_coords = working.positions_of(&ca_ids);
    let hessian = build_hessian(&ca_coords, config.cutoff, config.gamma)?;
    let reduced = AnmModel::from_hessian(
        format!("{} ca", config.structure_name),
        hessian,
        config.num_modes,
    )?;

    let atom_ids = working.anchored_atom_ids();
    let extended = reduced.extend_to_atoms(&working, &ca_ids, &atom_ids)?;

    if config.save_models {
        reduced.save_modes(format!("{}.modes.csv", config.structure_name))?;
        extended.save_modes(format!("{}_ext.modes.csv", config.structure_name))?;
    }
    reporter.finish_phase();

    // === Phase 3: Ensemble sampling ===
    reporter.start_phase("Sampling conformations");
    let reference = working.positions_of(&atom_ids);
    let n_samples = config.num_decoys - 1;
    let ensemble = sample_ensemble(&extended, &reference, n_samples, config.rmsd, rng)?;
    reporter.finish_phase();

    // Provenance flags: 1.0 marks the network anchors, 0.0 everything else.
    for (_, atom) in working.atoms_iter_mut() {
        atom.b_factor = 0.0;
    }
    for &ca_id in &ca_ids {
        if let Some(atom) = working.atom_mut(ca_id) {
            atom.b_factor = 1.0;
        }
    }

    if config.output_dir.exists() {
        warn!(
            "Folder {} already exists. Decoys may be overwritten.",
            config.output_dir.display()
        );
    } else {
        fs::create_dir_all(&config.output_dir)?;
    }

    // === Phase 4: Decoy writing ===
    reporter.start_task(n_samples as u64);
    let mut records = Vec::with_capacity(n_samples);
    for (offset, conformation) in ensemble.iter().enumerate() {
        let index = offset + 1;
        working
            .set_positions(&atom_ids, conformation)
            .ok_or_else(|| {
                EngineError::Sampling("Sampled conformation does not cover the atom set".into())
            })?;

        let path = config
            .output_dir
            .join(format!("{}_anm_{}.pdb", config.structure_name, index));
        PdbFile::write_to_path(&working, &PdbMetadata::default(), &path).map_err(|source| {
            EngineError::DecoyWrite {
                path: path.clone(),
                source,
            }
        })?;
        info!("Decoy {} written", path.display());
        records.push(DecoyRecord {
            index,
            path,
            refine: None,
        });
        reporter.advance();
    }
    reporter.finish_task();

    // === Phase 5: Side-chain refinement ===
    if let Some(refine) = &config.refine {
        reporter.start_phase("Minimizing side chains");
        info!("Minimizing side chains...");

        let jobs = records
            .iter()
            .map(|record| RefineJob::for_decoy(&record.path))
            .collect::<Result<Vec<_>, _>>()?;
        let outcomes = run_pool(&refine.binary, &jobs, refine.max_workers)?;

        // run_pool returns outcomes in job order, one per decoy.
        for (record, outcome) in records.iter_mut().zip(outcomes) {
            record.refine = Some(outcome.status);
        }
        reporter.finish_phase();
    }

    let report = GenerateReport { decoys: records };
    info!("{} decoys generated.", report.written());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbFile;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::utils::geometry::calculate_rmsd;
    use crate::engine::config::{GenerateConfigBuilder, RefineConfig};
    use nalgebra::{Point3, Vector3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;

    /// A compact helical protein-like system, big enough for a few
    /// non-degenerate modes.
    fn helical_system(n_residues: usize) -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let mut serial = 0;
        for r in 0..n_residues {
            let t = r as f64;
            let base = Point3::new(
                4.0 * (t * 0.6).cos(),
                4.0 * (t * 0.6).sin(),
                1.8 * t,
            );
            let residue_id = system.add_residue(chain, (r + 1) as isize, "ALA").unwrap();
            for (name, offset) in [
                ("N", Vector3::new(-1.2, 0.4, -0.3)),
                ("CA", Vector3::zeros()),
                ("C", Vector3::new(1.3, 0.2, 0.4)),
                ("O", Vector3::new(1.6, 1.2, 1.0)),
                ("CB", Vector3::new(-0.4, -1.3, 0.6)),
            ] {
                serial += 1;
                let atom = Atom::new(name, serial, residue_id, base + offset);
                system.add_atom_to_residue(residue_id, atom).unwrap();
            }
        }
        system
    }

    fn base_config(output_dir: &Path) -> GenerateConfigBuilder {
        GenerateConfigBuilder::new()
            .structure_name("1abc")
            .output_dir(output_dir.to_path_buf())
            .num_decoys(5)
            .rmsd(1.0)
            .num_modes(3)
    }

    #[test]
    fn writes_one_file_fewer_than_the_requested_decoy_count() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("decoys");
        let config = base_config(&output_dir).build().unwrap();
        let system = helical_system(12);
        let mut rng = StdRng::seed_from_u64(17);

        let report = run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();

        assert_eq!(report.written(), 4);
        for i in 1..=4 {
            let expected = output_dir.join(format!("1abc_anm_{i}.pdb"));
            assert!(expected.exists(), "{} missing", expected.display());
            assert_eq!(report.decoys[i - 1].path, expected);
            assert_eq!(report.decoys[i - 1].index, i);
            assert!(report.decoys[i - 1].refine.is_none());
        }
        assert!(!output_dir.join("1abc_anm_5.pdb").exists());
    }

    #[test]
    fn decoys_sit_at_the_target_rmsd_and_carry_anchor_flags() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("decoys");
        let config = base_config(&output_dir)
            .rmsd(1.5)
            .to_center(false)
            .build()
            .unwrap();
        let system = helical_system(12);
        let mut rng = StdRng::seed_from_u64(23);

        run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();

        let reference = system.positions_of(&system.anchored_atom_ids());
        for i in 1..=4 {
            let path = output_dir.join(format!("1abc_anm_{i}.pdb"));
            let (decoy, _) = PdbFile::read_from_path(&path).unwrap();
            let decoy_coords = decoy.positions_of(&decoy.anchored_atom_ids());
            let rmsd = calculate_rmsd(&reference, &decoy_coords).unwrap();
            assert!(
                (rmsd - 1.5).abs() < 2e-3,
                "decoy {i} RMSD {rmsd} off target"
            );

            for id in decoy.ordered_atom_ids() {
                let atom = decoy.atom(id).unwrap();
                let expected = if atom.is_alpha_carbon() { 1.0 } else { 0.0 };
                assert!((atom.b_factor - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn input_system_coordinates_are_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = base_config(&dir.path().join("decoys"))
            .random_rotation(true)
            .build()
            .unwrap();
        let system = helical_system(10);
        let ids = system.ordered_atom_ids();
        let before = system.positions_of(&ids);
        let mut rng = StdRng::seed_from_u64(29);

        run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();
        assert_eq!(system.positions_of(&ids), before);
    }

    #[test]
    fn a_structure_without_alpha_carbons_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = base_config(&dir.path().join("decoys")).build().unwrap();

        let mut system = MolecularSystem::new();
        let chain = system.add_chain('L', ChainType::Ligand);
        let residue = system.add_residue(chain, 1, "LIG").unwrap();
        for (i, name) in ["C1", "C2", "O1"].iter().enumerate() {
            let atom = Atom::new(
                name,
                i + 1,
                residue,
                Point3::new(i as f64 * 1.5, 0.0, 0.0),
            );
            system.add_atom_to_residue(residue, atom).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(31);
        let err = run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::NoAlphaCarbons));
    }

    #[test]
    fn an_existing_output_directory_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("decoys");
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(output_dir.join("leftover.txt"), "old run").unwrap();

        let config = base_config(&output_dir).build().unwrap();
        let system = helical_system(10);
        let mut rng = StdRng::seed_from_u64(37);

        let report = run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();
        assert_eq!(report.written(), 4);
        assert!(output_dir.join("leftover.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn refinement_produces_the_derived_file_set() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("decoys");
        let binary = dir.path().join("fake_refiner.sh");
        std::fs::write(&binary, "#!/bin/sh\ncp \"$2\" \"$4\"\n").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = base_config(&output_dir)
            .refine(Some(RefineConfig {
                binary,
                max_workers: Some(2),
            }))
            .build()
            .unwrap();
        let system = helical_system(12);
        let mut rng = StdRng::seed_from_u64(41);

        let report = run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();

        assert_eq!(report.written(), 4);
        assert_eq!(report.refined(), 4);
        assert_eq!(report.refine_failures().count(), 0);
        for i in 1..=4 {
            assert!(output_dir.join(format!("1abc_{i}.pdb")).exists());
        }
    }

    #[cfg(unix)]
    #[test]
    fn refinement_failures_are_reported_per_decoy_without_aborting() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("decoys");
        let binary = dir.path().join("broken_refiner.sh");
        std::fs::write(&binary, "#!/bin/sh\nexit 1\n").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = base_config(&output_dir)
            .refine(Some(RefineConfig {
                binary,
                max_workers: Some(2),
            }))
            .build()
            .unwrap();
        let system = helical_system(12);
        let mut rng = StdRng::seed_from_u64(43);

        let report = run(&system, &config, &ProgressReporter::new(), &mut rng).unwrap();

        assert_eq!(report.written(), 4);
        assert_eq!(report.refined(), 0);
        assert_eq!(report.refine_failures().count(), 4);
        for record in &report.decoys {
            assert_eq!(record.refine, Some(RefineStatus::Failed { code: Some(1) }));
        }
    }
}
