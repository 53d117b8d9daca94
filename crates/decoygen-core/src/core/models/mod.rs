//! # Core Models Module
//!
//! Data structures describing a molecular system: atoms, residues, chains,
//! and the system that owns them.
//!
//! Storage is slotmap-based so that components hold stable, copyable IDs into
//! their parents and neighbours instead of fragile indices. Construction goes
//! through [`builder::MolecularSystemBuilder`], which is what the file
//! parsers use.
//!
//! - [`atom`] - Individual atom representation with coordinates and provenance flags
//! - [`residue`] - Residue structure and amino-acid classification
//! - [`chain`] - Chain organization and typing
//! - [`system`] - Complete molecular system
//! - [`builder`] - Incremental construction used by parsers
//! - [`ids`] - Stable identifier types for atoms, residues, and chains

pub mod atom;
pub mod builder;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
