use super::atom::ALPHA_CARBON_NAME;
use super::ids::{AtomId, ChainId};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcidType {
    // --- Aliphatic, Nonpolar ---
    Alanine,
    Glycine,
    Isoleucine,
    Leucine,
    Proline,
    Valine,

    // --- Aromatic ---
    Phenylalanine,
    Tryptophan,
    Tyrosine,

    // --- Polar, Uncharged ---
    Asparagine,
    Cysteine,
    Glutamine,
    Serine,
    Threonine,
    Methionine,

    // --- Charged ---
    Arginine,
    Lysine,
    AsparticAcid,
    GlutamicAcid,

    // --- Histidine (all protonation-state aliases collapse here) ---
    Histidine,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown amino acid residue name: {0}")]
pub struct ParseAminoAcidError(pub String);

impl FromStr for AminoAcidType {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALA" => Ok(Self::Alanine),
            "GLY" => Ok(Self::Glycine),
            "ILE" => Ok(Self::Isoleucine),
            "LEU" => Ok(Self::Leucine),
            "PRO" => Ok(Self::Proline),
            "VAL" => Ok(Self::Valine),
            "PHE" => Ok(Self::Phenylalanine),
            "TRP" => Ok(Self::Tryptophan),
            "TYR" => Ok(Self::Tyrosine),
            "ASN" => Ok(Self::Asparagine),
            "CYS" => Ok(Self::Cysteine),
            "GLN" => Ok(Self::Glutamine),
            "SER" => Ok(Self::Serine),
            "THR" => Ok(Self::Threonine),
            "MET" => Ok(Self::Methionine),
            "ARG" => Ok(Self::Arginine),
            "LYS" => Ok(Self::Lysine),
            "ASP" => Ok(Self::AsparticAcid),
            "GLU" => Ok(Self::GlutamicAcid),
            "HIS" | "HSE" | "HSD" | "HSP" => Ok(Self::Histidine),
            other => Err(ParseAminoAcidError(other.to_string())),
        }
    }
}

/// Whether a residue name denotes one of the standard amino acids.
pub fn is_standard_amino_acid(name: &str) -> bool {
    AminoAcidType::from_str(name).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub id: isize,                          // Residue sequence number from source file
    pub name: String,                       // Name of the residue (e.g., "ALA", "GLY")
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Atoms belonging to this residue, in file order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(id: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            id,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// The residue's alpha-carbon atom, if it has one.
    pub fn alpha_carbon(&self) -> Option<AtomId> {
        self.get_atom_id_by_name(ALPHA_CARBON_NAME)
    }

    pub fn is_amino_acid(&self) -> bool {
        is_standard_amino_acid(&self.name)
    }
}
