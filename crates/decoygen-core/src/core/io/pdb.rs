use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::builder::MolecularSystemBuilder;
use crate::core::models::chain::ChainType;
use crate::core::models::residue::is_standard_amino_acid;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawLine {
    pub content: String,
}

/// Non-coordinate content of a PDB file, keyed by source line number.
///
/// Decoy files are written with `PdbMetadata::default()` so they carry no
/// stale header from the reference structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub header_lines: BTreeMap<usize, RawLine>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for an ATOM/HETATM record (must reach the coordinate columns)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn classify_chain(record_type: &str, res_name: &str) -> ChainType {
    if record_type == "ATOM" && is_standard_amino_acid(res_name) {
        ChainType::Protein
    } else if matches!(res_name, "HOH" | "WAT" | "DOD") {
        ChainType::Water
    } else {
        ChainType::Ligand
    }
}

/// Fixed-column PDB reader/writer.
///
/// The reader consumes ATOM and HETATM records of the first model, skipping
/// alternate locations other than blank or 'A'; every other line before the
/// first coordinate record is preserved as header metadata. The writer emits
/// one ATOM/HETATM record per atom in chain → residue → atom order, a TER
/// after each protein chain, and a final END.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut builder = MolecularSystemBuilder::new();
        let mut metadata = PdbMetadata::default();
        let mut seen_serials = HashSet::new();
        let mut seen_any_atom = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = slice_and_trim(&line, 16, 17);
                    if !alt_loc.is_empty() && alt_loc != "A" {
                        continue;
                    }

                    let serial_str = slice_and_trim(&line, 6, 11);
                    let name = slice_and_trim(&line, 12, 16);
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_id = slice_and_trim(&line, 21, 22).chars().next().unwrap_or('A');
                    let res_seq_str = slice_and_trim(&line, 22, 26);

                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "7-11".into(),
                            value: serial_str.into(),
                        },
                    })?;
                    if !seen_serials.insert(serial) {
                        return Err(PdbError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }
                    let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_seq_str.into(),
                        },
                    })?;

                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;

                    let occupancy = if line.len() >= 60 {
                        let field = slice_and_trim(&line, 54, 60);
                        if field.is_empty() {
                            1.0
                        } else {
                            parse_float(&line, line_num, 54, 60)?
                        }
                    } else {
                        1.0
                    };
                    let b_factor = if line.len() >= 66 {
                        let field = slice_and_trim(&line, 60, 66);
                        if field.is_empty() {
                            0.0
                        } else {
                            parse_float(&line, line_num, 60, 66)?
                        }
                    } else {
                        0.0
                    };

                    let element = {
                        let field = slice_and_trim(&line, 76, 78);
                        if field.is_empty() {
                            name.chars()
                                .find(|c| c.is_ascii_alphabetic())
                                .map(String::from)
                                .unwrap_or_default()
                        } else {
                            field.to_string()
                        }
                    };

                    if builder.current_chain_char() != Some(chain_id) {
                        builder.start_chain(chain_id, classify_chain(record_type, res_name));
                        builder.start_residue(res_seq, res_name);
                    } else if builder.current_residue_number() != Some(res_seq) {
                        builder.start_residue(res_seq, res_name);
                    }

                    let mut atom = Atom::new(
                        name,
                        serial,
                        Default::default(),
                        Point3::new(x, y, z),
                    );
                    atom.occupancy = occupancy;
                    atom.b_factor = b_factor;
                    atom.element = element;
                    atom.role = if record_type == "ATOM" && is_standard_amino_acid(res_name) {
                        AtomRole::from_protein_atom_name(name)
                    } else {
                        AtomRole::Other
                    };

                    builder.add_atom(atom);
                    seen_any_atom = true;
                }
                "TER" | "END" => {}
                "ENDMDL" => break,
                _ => {
                    if !seen_any_atom && !line.trim().is_empty() {
                        metadata
                            .header_lines
                            .insert(line_num, RawLine { content: line });
                    }
                }
            }
        }

        if !seen_any_atom {
            return Err(PdbError::MissingRecord("ATOM".into()));
        }

        Ok((builder.build(), metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in metadata.header_lines.values() {
            writeln!(writer, "{}", line.content)?;
        }

        for (_, chain) in system.chains_iter() {
            for &residue_id in chain.residues() {
                let residue = system.residue(residue_id).ok_or_else(|| {
                    PdbError::Inconsistency("Chain references an unknown residue".into())
                })?;
                let is_protein_residue =
                    chain.chain_type == ChainType::Protein && residue.is_amino_acid();
                let record_type = if is_protein_residue { "ATOM" } else { "HETATM" };

                for &atom_id in residue.atoms() {
                    let atom = system.atom(atom_id).ok_or_else(|| {
                        PdbError::Inconsistency("Residue references an unknown atom".into())
                    })?;
                    // Short names sit one column in, per the PDB convention.
                    let name_field = if atom.name.len() >= 4 {
                        atom.name.clone()
                    } else {
                        format!(" {:<3}", atom.name)
                    };
                    writeln!(
                        writer,
                        "{:<6}{:>5} {:<4} {:>3} {}{:>4}    {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}",
                        record_type,
                        atom.serial,
                        name_field,
                        residue.name,
                        chain.id,
                        residue.id,
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.b_factor,
                        atom.element,
                    )?;
                }
            }
            if chain.chain_type == ChainType::Protein {
                writeln!(writer, "TER")?;
            }
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
