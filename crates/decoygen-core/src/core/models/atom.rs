use super::ids::ResidueId;
use nalgebra::Point3;

/// Name of the alpha-carbon atom that anchors the reduced network model.
pub const ALPHA_CARBON_NAME: &str = "CA";

/// Represents the role of an atom within a molecular structure.
///
/// The distinction matters for decoy generation: the elastic network is
/// anchored on backbone alpha-carbons, while sidechain atoms ride along
/// through the extended model and are later repacked by the external refiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain atom of a protein residue (N, CA, C, O, OXT).
    Backbone,
    /// Side-group atom of a protein residue.
    Sidechain,
    /// Anything else: ligand, solvent, or unclassified.
    #[default]
    Other,
}

const BACKBONE_ATOM_NAMES: [&str; 5] = ["N", "CA", "C", "O", "OXT"];

impl AtomRole {
    /// Classifies a protein atom by its PDB atom name.
    pub fn from_protein_atom_name(name: &str) -> Self {
        if BACKBONE_ATOM_NAMES.contains(&name) {
            AtomRole::Backbone
        } else {
            AtomRole::Sidechain
        }
    }
}

/// Represents an atom in a molecular structure.
///
/// Beyond identity and coordinates, each atom carries the two per-atom
/// scalars of the PDB format, occupancy and B-factor. Decoy files repurpose
/// the B-factor as a provenance flag: 1.0 marks an alpha-carbon anchor of the
/// network model, 0.0 everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name from the source file (e.g., "CA", "N", "OD1").
    pub name: String,
    /// The serial number from the source file.
    pub serial: usize,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The role of the atom in the structure.
    pub role: AtomRole,
    /// The element symbol (e.g., "C", "N", "FE").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Crystallographic occupancy, carried through verbatim.
    pub occupancy: f64,
    /// Temperature factor, overwritten with the anchor flag before decoys are written.
    pub b_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with neutral occupancy and B-factor.
    pub fn new(name: &str, serial: usize, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            serial,
            residue_id,
            role: AtomRole::default(),
            element: String::new(),
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// Whether this atom is the residue's alpha carbon.
    pub fn is_alpha_carbon(&self) -> bool {
        self.name == ALPHA_CARBON_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_residue_id() -> ResidueId {
        ResidueId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn backbone_names_classify_as_backbone() {
        for name in ["N", "CA", "C", "O", "OXT"] {
            assert_eq!(
                AtomRole::from_protein_atom_name(name),
                AtomRole::Backbone,
                "{name} should be backbone"
            );
        }
    }

    #[test]
    fn sidechain_names_classify_as_sidechain() {
        for name in ["CB", "CG", "OD1", "NZ", "SD"] {
            assert_eq!(
                AtomRole::from_protein_atom_name(name),
                AtomRole::Sidechain
            );
        }
    }

    #[test]
    fn alpha_carbon_is_detected_by_name() {
        let ca = Atom::new("CA", 1, dummy_residue_id(), Point3::origin());
        let cb = Atom::new("CB", 2, dummy_residue_id(), Point3::origin());
        assert!(ca.is_alpha_carbon());
        assert!(!cb.is_alpha_carbon());
    }

    #[test]
    fn new_atom_has_neutral_scalars() {
        let atom = Atom::new("CA", 7, dummy_residue_id(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.occupancy, 1.0);
        assert_eq!(atom.b_factor, 0.0);
        assert_eq!(atom.serial, 7);
    }
}
