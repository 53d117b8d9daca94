//! Provides input/output functionality for molecular structure files.
//!
//! The decoy pipeline reads one reference structure and writes one file per
//! sampled conformation. [`traits::MolecularFile`] defines the reader/writer
//! interface; [`pdb`] implements it for the fixed-column PDB format.

pub mod pdb;
pub mod traits;
