use super::atom::Atom;
use super::chain::ChainType;
use super::ids::{ChainId, ResidueId};
use super::system::MolecularSystem;

/// Incrementally assembles a [`MolecularSystem`] while a file is parsed.
///
/// Parsers walk their records in file order, announcing chain and residue
/// boundaries as they cross them; the builder keeps track of the current
/// insertion point. Calling `add_atom` without a current residue is a
/// programming error in the parser, not a data error.
pub struct MolecularSystemBuilder {
    system: MolecularSystem,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
}

impl Default for MolecularSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self {
            system: MolecularSystem::new(),
            current_chain: None,
            current_residue: None,
        }
    }

    /// Enters a chain, creating it on first sight. Re-entering a seen chain
    /// resumes it.
    pub fn start_chain(&mut self, id: char, chain_type: ChainType) -> &mut Self {
        let chain_id = self.system.add_chain(id, chain_type);
        self.current_chain = Some(chain_id);
        self.current_residue = None;
        self
    }

    /// Enters a residue of the current chain, creating it on first sight.
    pub fn start_residue(&mut self, residue_number: isize, name: &str) -> &mut Self {
        let chain_id = self
            .current_chain
            .expect("Must start a chain before starting a residue");
        let residue_id = self
            .system
            .find_residue_by_id(chain_id, residue_number)
            .or_else(|| self.system.add_residue(chain_id, residue_number, name))
            .expect("Residue insertion cannot fail after lookup");
        self.current_residue = Some(residue_id);
        self
    }

    /// Adds an atom to the current residue.
    pub fn add_atom(&mut self, atom: Atom) -> &mut Self {
        let residue_id = self
            .current_residue
            .expect("Cannot add an atom without a current residue");
        self.system
            .add_atom_to_residue(residue_id, atom)
            .expect("Current residue is always present");
        self
    }

    pub fn current_residue_number(&self) -> Option<isize> {
        self.current_residue
            .and_then(|id| self.system.residue(id))
            .map(|r| r.id)
    }

    pub fn current_chain_char(&self) -> Option<char> {
        self.current_chain
            .and_then(|id| self.system.chain(id))
            .map(|c| c.id)
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use slotmap::KeyData;

    use crate::core::models::ids::ResidueId;

    fn placeholder_residue_id() -> ResidueId {
        ResidueId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn builds_a_system_in_file_order() {
        let mut builder = MolecularSystemBuilder::new();
        builder
            .start_chain('A', ChainType::Protein)
            .start_residue(1, "GLY");
        builder.add_atom(Atom::new(
            "N",
            1,
            placeholder_residue_id(),
            Point3::origin(),
        ));
        builder.add_atom(Atom::new(
            "CA",
            2,
            placeholder_residue_id(),
            Point3::new(1.5, 0.0, 0.0),
        ));
        builder.start_residue(2, "ALA");
        builder.add_atom(Atom::new(
            "CA",
            3,
            placeholder_residue_id(),
            Point3::new(5.3, 0.0, 0.0),
        ));

        let system = builder.build();
        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.chains_iter().count(), 1);
        assert_eq!(system.alpha_carbon_ids().len(), 2);
    }

    #[test]
    fn reentering_a_chain_resumes_it() {
        let mut builder = MolecularSystemBuilder::new();
        builder
            .start_chain('A', ChainType::Protein)
            .start_residue(1, "GLY");
        builder
            .start_chain('B', ChainType::Protein)
            .start_residue(1, "ALA");
        builder
            .start_chain('A', ChainType::Protein)
            .start_residue(2, "SER");

        let system = builder.build();
        assert_eq!(system.chains_iter().count(), 2);
        let chain_a = system.find_chain_by_id('A').unwrap();
        assert_eq!(system.chain(chain_a).unwrap().residues().len(), 2);
    }
}
