//! # Workflows Module
//!
//! High-level entry points tying the core and engine layers together.
//!
//! - **Generation Workflow** ([`generate`]) - The complete decoy pipeline:
//!   optional centering and random rotation, network model construction,
//!   mode sampling, decoy writing, and side-chain refinement.

pub mod generate;
