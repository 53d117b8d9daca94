use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use nalgebra::{Matrix4, Point3, Vector3};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Represents a complete molecular system with atoms, residues, and chains.
///
/// This struct is the central data structure of the library. Components are
/// stored in slot maps so that residues and atoms can refer to each other
/// through stable IDs, and lookup maps allow addressing by the identifiers
/// found in structure files (chain character, residue sequence number).
///
/// Coordinates are mutable in place: the decoy pipeline repeatedly overwrites
/// atom positions with sampled conformations before writing each decoy file.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    atoms: SlotMap<AtomId, Atom>,
    residues: SlotMap<ResidueId, Residue>,
    chains: SlotMap<ChainId, Chain>,
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    chain_id_map: HashMap<char, ChainId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Iterates chains in insertion order (file order for parsed systems).
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, residue_number)).copied()
    }

    /// Adds a chain, returning the existing ID if the character is taken.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id, chain_id);
        chain_id
    }

    /// Adds a residue to a chain.
    ///
    /// Returns `None` if the chain does not exist or the residue number is
    /// already present in it.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        if !self.chains.contains_key(chain_id) {
            return None;
        }
        if self.residue_id_map.contains_key(&(chain_id, residue_number)) {
            return None;
        }
        let residue_id = self
            .residues
            .insert(Residue::new(residue_number, name, chain_id));
        self.chains[chain_id].residues.push(residue_id);
        self.residue_id_map
            .insert((chain_id, residue_number), residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a residue, fixing up the atom's parent ID.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(Atom {
            residue_id,
            ..atom
        });
        self.residues[residue_id].add_atom(&name, atom_id);
        Some(atom_id)
    }

    /// Atom IDs in canonical traversal order: chain → residue → atom.
    pub fn ordered_atom_ids(&self) -> Vec<AtomId> {
        let mut ids = Vec::with_capacity(self.atoms.len());
        for (_, chain) in self.chains_iter() {
            for &residue_id in chain.residues() {
                ids.extend_from_slice(self.residues[residue_id].atoms());
            }
        }
        ids
    }

    /// Alpha-carbon atoms of amino-acid residues in protein chains, in
    /// traversal order. These anchor the reduced network model.
    pub fn alpha_carbon_ids(&self) -> Vec<AtomId> {
        let mut ids = Vec::new();
        for (_, chain) in self.chains_iter() {
            if chain.chain_type != ChainType::Protein {
                continue;
            }
            for &residue_id in chain.residues() {
                let residue = &self.residues[residue_id];
                if !residue.is_amino_acid() {
                    continue;
                }
                if let Some(ca) = residue.alpha_carbon() {
                    ids.push(ca);
                }
            }
        }
        ids
    }

    /// All atoms of anchored residues (amino acids that have an alpha
    /// carbon), in traversal order. These are the atoms the extended model
    /// and the sampled conformations cover; anything else keeps its
    /// reference coordinates in every decoy.
    pub fn anchored_atom_ids(&self) -> Vec<AtomId> {
        let mut ids = Vec::new();
        for (_, chain) in self.chains_iter() {
            if chain.chain_type != ChainType::Protein {
                continue;
            }
            for &residue_id in chain.residues() {
                let residue = &self.residues[residue_id];
                if residue.is_amino_acid() && residue.alpha_carbon().is_some() {
                    ids.extend_from_slice(residue.atoms());
                }
            }
        }
        ids
    }

    /// Snapshot of the positions of the given atoms.
    ///
    /// Unknown IDs are skipped; callers pass IDs obtained from this system.
    pub fn positions_of(&self, ids: &[AtomId]) -> Vec<Point3<f64>> {
        ids.iter()
            .filter_map(|&id| self.atoms.get(id).map(|a| a.position))
            .collect()
    }

    /// Overwrites the positions of the given atoms with a sampled
    /// conformation. Returns `None` on length mismatch or unknown ID.
    pub fn set_positions(&mut self, ids: &[AtomId], positions: &[Point3<f64>]) -> Option<()> {
        if ids.len() != positions.len() {
            return None;
        }
        for (&id, &position) in ids.iter().zip(positions.iter()) {
            self.atoms.get_mut(id)?.position = position;
        }
        Some(())
    }

    /// Translates every atom by the given vector.
    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for (_, atom) in self.atoms.iter_mut() {
            atom.position += shift;
        }
    }

    /// Applies a homogeneous affine transform to every atom position.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for (_, atom) in self.atoms.iter_mut() {
            let transformed = matrix * atom.position.to_homogeneous();
            if let Some(position) = Point3::from_homogeneous(transformed) {
                atom.position = position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::{affine_from_rotation, random_rotation_matrix};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_residue_system() -> (MolecularSystem, Vec<AtomId>) {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let mut ids = Vec::new();

        let res1 = system.add_residue(chain, 1, "GLY").unwrap();
        for (i, (name, x)) in [("N", 0.0), ("CA", 1.0), ("C", 2.0), ("O", 3.0)]
            .iter()
            .enumerate()
        {
            let atom = Atom::new(name, i + 1, res1, Point3::new(*x, 0.0, 0.0));
            ids.push(system.add_atom_to_residue(res1, atom).unwrap());
        }

        let res2 = system.add_residue(chain, 2, "ALA").unwrap();
        for (i, (name, x)) in [("N", 4.0), ("CA", 5.0), ("CB", 6.0)].iter().enumerate() {
            let atom = Atom::new(name, i + 5, res2, Point3::new(*x, 1.0, 0.0));
            ids.push(system.add_atom_to_residue(res2, atom).unwrap());
        }

        (system, ids)
    }

    #[test]
    fn duplicate_chain_characters_reuse_the_chain() {
        let mut system = MolecularSystem::new();
        let first = system.add_chain('A', ChainType::Protein);
        let second = system.add_chain('A', ChainType::Protein);
        assert_eq!(first, second);
        assert_eq!(system.chains_iter().count(), 1);
    }

    #[test]
    fn duplicate_residue_numbers_are_rejected() {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        assert!(system.add_residue(chain, 1, "GLY").is_some());
        assert!(system.add_residue(chain, 1, "ALA").is_none());
    }

    #[test]
    fn ordered_atom_ids_follow_file_order() {
        let (system, ids) = two_residue_system();
        assert_eq!(system.ordered_atom_ids(), ids);
    }

    #[test]
    fn alpha_carbons_are_collected_in_order() {
        let (system, _) = two_residue_system();
        let ca_ids = system.alpha_carbon_ids();
        assert_eq!(ca_ids.len(), 2);
        let names: Vec<_> = ca_ids
            .iter()
            .map(|&id| system.atom(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["CA", "CA"]);
    }

    #[test]
    fn water_chains_contribute_no_anchors() {
        let (mut system, _) = two_residue_system();
        let water = system.add_chain('W', ChainType::Water);
        let res = system.add_residue(water, 100, "HOH").unwrap();
        system
            .add_atom_to_residue(res, Atom::new("O", 50, res, Point3::origin()))
            .unwrap();

        assert_eq!(system.alpha_carbon_ids().len(), 2);
        assert_eq!(system.anchored_atom_ids().len(), 7);
    }

    #[test]
    fn set_positions_rejects_length_mismatch() {
        let (mut system, ids) = two_residue_system();
        assert!(system.set_positions(&ids, &[Point3::origin()]).is_none());
    }

    #[test]
    fn set_positions_overwrites_coordinates() {
        let (mut system, ids) = two_residue_system();
        let moved: Vec<_> = (0..ids.len())
            .map(|i| Point3::new(i as f64, -1.0, 2.0))
            .collect();
        system.set_positions(&ids, &moved).unwrap();
        assert_eq!(system.positions_of(&ids), moved);
    }

    #[test]
    fn translate_shifts_every_atom() {
        let (mut system, ids) = two_residue_system();
        let before = system.positions_of(&ids);
        system.translate(&Vector3::new(0.0, 0.0, 5.0));
        let after = system.positions_of(&ids);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(a.z, b.z + 5.0);
        }
    }

    #[test]
    fn affine_transform_preserves_pairwise_distances() {
        let (mut system, ids) = two_residue_system();
        let before = system.positions_of(&ids);
        let mut rng = StdRng::seed_from_u64(11);
        let rotation = random_rotation_matrix(&mut rng);
        system.transform(&affine_from_rotation(&rotation));
        let after = system.positions_of(&ids);
        for i in 0..before.len() {
            for j in (i + 1)..before.len() {
                let d_before = (before[i] - before[j]).norm();
                let d_after = (after[i] - after[j]).norm();
                assert!((d_before - d_after).abs() < 1e-9);
            }
        }
    }
}
