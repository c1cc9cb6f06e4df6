use crate::core::io::traits::MoleculeFile;
use crate::core::models::molecule::{Atom, Bond, Molecule};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: SdfParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum SdfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Atom element field in columns 32-34 is empty")]
    MissingElement,
    #[error("Bond references atom {index} but the molecule has only {atoms} atoms")]
    BondIndexOutOfRange { index: usize, atoms: usize },
    #[error("Counts line does not declare a V2000 connection table")]
    UnsupportedVersion,
    #[error("Unexpected end of file inside a molecule record")]
    UnexpectedEof,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_usize(line: &str, start: usize, end: usize, line_num: usize) -> Result<usize, SdfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| SdfError::Parse {
        line: line_num,
        kind: SdfParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

fn parse_f64(line: &str, start: usize, end: usize, line_num: usize) -> Result<f64, SdfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| SdfError::Parse {
        line: line_num,
        kind: SdfParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

struct LineReader<'a, R: BufRead> {
    inner: &'a mut R,
    line: usize,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, line: 0 }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.inner.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn current(&self) -> usize {
        self.line
    }
}

/// Reader and writer for the MDL SDF format with V2000 connection tables.
///
/// Only the structural content is interpreted: the title line, the atom block
/// (coordinates and element symbols), and the bond block. Property blocks and
/// SDF data items are skipped on read and never written. This is sufficient
/// for the pipeline, which treats SDF files as carriers of 3D molecular
/// graphs between the sampler and the docking engines.
pub struct SdfFile;

impl SdfFile {
    /// Reads the first molecule record from `path`, failing if the file
    /// contains none.
    ///
    /// Generated sample files hold exactly one record, so this is the common
    /// entry point during evaluation.
    pub fn read_single_from_path<P: AsRef<Path>>(path: P) -> Result<Molecule, SdfError> {
        Self::read_from_path(path)?
            .into_iter()
            .next()
            .ok_or_else(|| SdfError::MissingRecord("no molecule records in file".to_string()))
    }
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, SdfError> {
    let x = parse_f64(line, 0, 10, line_num)?;
    let y = parse_f64(line, 10, 20, line_num)?;
    let z = parse_f64(line, 20, 30, line_num)?;
    let element = slice_and_trim(line, 31, 34);
    if element.is_empty() {
        return Err(SdfError::Parse {
            line: line_num,
            kind: SdfParseErrorKind::MissingElement,
        });
    }
    Ok(Atom::new(element, Point3::new(x, y, z)))
}

fn parse_bond_line(line: &str, line_num: usize, num_atoms: usize) -> Result<Bond, SdfError> {
    let a = parse_usize(line, 0, 3, line_num)?;
    let b = parse_usize(line, 3, 6, line_num)?;
    let order = parse_usize(line, 6, 9, line_num)?;
    for index in [a, b] {
        if index == 0 || index > num_atoms {
            return Err(SdfError::Parse {
                line: line_num,
                kind: SdfParseErrorKind::BondIndexOutOfRange {
                    index,
                    atoms: num_atoms,
                },
            });
        }
    }
    Ok(Bond::new(a - 1, b - 1, order.min(u8::MAX as usize) as u8))
}

impl MoleculeFile for SdfFile {
    type Error = SdfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error> {
        let mut lines = LineReader::new(reader);
        let mut molecules = Vec::new();

        loop {
            // Header block: title, program line, comment, counts.
            let mut header: Vec<String> = Vec::with_capacity(4);
            let mut reached_eof = false;
            while header.len() < 4 {
                match lines.next_line()? {
                    Some(line) => header.push(line),
                    None => {
                        reached_eof = true;
                        break;
                    }
                }
            }
            if reached_eof {
                if header.iter().all(|line| line.trim().is_empty()) {
                    break;
                }
                return Err(SdfError::Parse {
                    line: lines.current(),
                    kind: SdfParseErrorKind::UnexpectedEof,
                });
            }

            let counts_line_num = lines.current();
            let counts = &header[3];
            if counts.contains("V3000") {
                return Err(SdfError::Parse {
                    line: counts_line_num,
                    kind: SdfParseErrorKind::UnsupportedVersion,
                });
            }
            let num_atoms = parse_usize(counts, 0, 3, counts_line_num)?;
            let num_bonds = parse_usize(counts, 3, 6, counts_line_num)?;

            let mut molecule = Molecule::new(header[0].trim());
            for _ in 0..num_atoms {
                let line = lines.next_line()?.ok_or(SdfError::Parse {
                    line: lines.current(),
                    kind: SdfParseErrorKind::UnexpectedEof,
                })?;
                molecule.atoms.push(parse_atom_line(&line, lines.current())?);
            }
            for _ in 0..num_bonds {
                let line = lines.next_line()?.ok_or(SdfError::Parse {
                    line: lines.current(),
                    kind: SdfParseErrorKind::UnexpectedEof,
                })?;
                molecule
                    .bonds
                    .push(parse_bond_line(&line, lines.current(), num_atoms)?);
            }

            // Skip properties and data items up to the record delimiter. A
            // final record may end at EOF without one.
            loop {
                match lines.next_line()? {
                    None => {
                        reached_eof = true;
                        break;
                    }
                    Some(line) if line.trim_end() == "$$$$" => break,
                    Some(_) => {}
                }
            }

            molecules.push(molecule);
            if reached_eof {
                break;
            }
        }

        Ok(molecules)
    }

    fn write_to(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), Self::Error> {
        for molecule in molecules {
            writeln!(writer, "{}", molecule.name)?;
            writeln!(writer, "  diffhopp          3D")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
                molecule.num_atoms(),
                molecule.num_bonds()
            )?;
            for atom in &molecule.atoms {
                writeln!(
                    writer,
                    "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
                    atom.position.x, atom.position.y, atom.position.z, atom.element
                )?;
            }
            for bond in &molecule.bonds {
                writeln!(writer, "{:>3}{:>3}{:>3}  0", bond.a + 1, bond.b + 1, bond.order)?;
            }
            writeln!(writer, "M  END")?;
            writeln!(writer, "$$$$")?;
        }
        Ok(())
    }
}
