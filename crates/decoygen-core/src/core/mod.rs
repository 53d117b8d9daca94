//! # Core Module
//!
//! Fundamental building blocks for decoy generation: the molecular data
//! model, PDB file I/O, and geometric utilities.
//!
//! The submodules are deliberately free of pipeline logic; everything here
//! is reusable data representation and pure computation:
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains, and systems
//! - **File I/O** ([`io`]) - Reading/writing PDB structure files
//! - **Geometry** ([`utils`]) - Random rotations, affine transforms, RMSD

pub mod io;
pub mod models;
pub mod utils;
