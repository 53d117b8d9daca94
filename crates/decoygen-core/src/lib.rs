//! # decoygen Core Library
//!
//! A library for generating structural "decoys" of a protein: alternative
//! conformations sampled along the low-frequency normal modes of an
//! anisotropic elastic network model, each followed by side-chain refinement
//! through an external repacking executable.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers so that data representation, the
//! numerical machinery, and the user-facing pipeline stay independently
//! testable.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`),
//!   PDB file I/O, and geometric utilities such as the random rotation
//!   generator.
//!
//! - **[`engine`]: The Logic Core.** The anisotropic network model (Hessian
//!   construction, mode calculation, all-atom extension), mode-space ensemble
//!   sampling, and the bounded process pool that drives the external
//!   side-chain refiner.
//!
//! - **[`workflows`]: The Public API.** The end-to-end decoy generation
//!   pipeline: center, rotate, model, sample, write, refine. This is the
//!   entry point consumed by the command-line interface.

pub mod core;
pub mod engine;
pub mod workflows;
