use crate::core::models::atom::{Atom, strip_bond_padding};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum number of whitespace fields of an atom line: serial, symbol, x, y, z, type.
const MIN_ATOM_FIELDS: usize = 7;
/// Fields preceding the bond list on an atom line.
const ATOM_PREFIX_FIELDS: usize = 6;
/// The header count is untrusted until the atom lines have been read.
const MAX_PREALLOCATED_ATOMS: usize = 1 << 16;

#[derive(Debug, Error)]
pub enum ArcError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Trajectory file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("First line must be the atom count, found '{value}'")]
    MalformedHeader { value: String },
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ArcParseErrorKind },
}

#[derive(Debug, Error)]
pub enum ArcParseErrorKind {
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
}

/// The line that opens every frame and the number of times it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// The first line of the file, trimmed. Compared verbatim, never interpreted.
    pub text: String,
    pub frame_count: usize,
}

/// A parsed trajectory: the first frame's atoms plus the frame header.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub path: PathBuf,
    pub atoms: Vec<Atom>,
    pub header: FrameHeader,
}

pub struct ArcFile;

impl ArcFile {
    /// Reads the first frame's atoms and counts the frames in a single pass.
    ///
    /// The first line holds the atom count `n`. The following `n + 1` lines (one extra
    /// for the optional box/title line) are candidate atom lines; blank lines and lines
    /// with fewer than seven fields are skipped. Every later line equal to the trimmed
    /// first line opens another frame, wherever it appears.
    pub fn read_from(reader: &mut impl BufRead) -> Result<(Vec<Atom>, FrameHeader), ArcError> {
        let mut lines = reader.lines();

        let header_text = match lines.next() {
            Some(line) => line?.trim().to_string(),
            None => String::new(),
        };
        let n_atoms: usize = header_text
            .parse()
            .map_err(|_| ArcError::MalformedHeader {
                value: header_text.clone(),
            })?;

        let atom_window = n_atoms.saturating_add(2);
        let mut atoms = Vec::with_capacity(n_atoms.min(MAX_PREALLOCATED_ATOMS));
        let mut frame_count = 1;
        let mut line_num = 1;

        for line_res in lines {
            let line = line_res?;
            line_num += 1;

            if line.trim() == header_text {
                frame_count += 1;
            } else if line_num <= atom_window {
                if let Some(atom) = parse_atom_line(&line, line_num)? {
                    atoms.push(atom);
                }
            }
        }

        Ok((
            atoms,
            FrameHeader {
                text: header_text,
                frame_count,
            },
        ))
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Trajectory, ArcError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArcError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArcError::Io(e),
        })?;
        let (atoms, header) = Self::read_from(&mut BufReader::new(file))?;
        Ok(Trajectory {
            path: path.to_path_buf(),
            atoms,
            header,
        })
    }

    /// Copies an archive, dropping the `0` padding from every bond list.
    ///
    /// Every line after the first with more than six fields is rewritten as its first
    /// six fields followed by the non-zero bond serials, single-space separated. All
    /// other lines pass through untouched, so the rewrite is idempotent.
    pub fn normalize_connectivity(
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> Result<(), ArcError> {
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();

            if line_num == 1 || fields.len() <= ATOM_PREFIX_FIELDS {
                writeln!(writer, "{}", line)?;
                continue;
            }

            let bonds = parse_bonds(&fields[ATOM_PREFIX_FIELDS..], line_num)?;
            let mut rewritten = fields[..ATOM_PREFIX_FIELDS].join(" ");
            for serial in bonds {
                rewritten.push(' ');
                rewritten.push_str(&serial.to_string());
            }
            writeln!(writer, "{}", rewritten)?;
        }
        Ok(())
    }

    /// Rewrites the file at `path` in place with [`ArcFile::normalize_connectivity`].
    pub fn normalize_connectivity_in_place<P: AsRef<Path>>(path: P) -> Result<(), ArcError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArcError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArcError::Io(e),
        })?;
        let mut output = Vec::with_capacity(content.len());
        Self::normalize_connectivity(&mut content.as_bytes(), &mut output)?;
        std::fs::write(path, output)?;
        Ok(())
    }
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Option<Atom>, ArcError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_ATOM_FIELDS {
        return Ok(None);
    }

    let serial = parse_int::<usize>(fields[0], "serial", line_num)?;
    let x = parse_float(fields[2], "x", line_num)?;
    let y = parse_float(fields[3], "y", line_num)?;
    let z = parse_float(fields[4], "z", line_num)?;
    let type_code = parse_int::<i64>(fields[5], "type", line_num)?;
    let bonds = parse_bonds(&fields[ATOM_PREFIX_FIELDS..], line_num)?;

    Ok(Some(
        Atom::new(serial, fields[1], Point3::new(x, y, z), type_code).with_bonds(bonds),
    ))
}

fn parse_bonds(fields: &[&str], line_num: usize) -> Result<Vec<usize>, ArcError> {
    let bonds = fields
        .iter()
        .map(|value| parse_int::<usize>(value, "bond", line_num))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(strip_bond_padding(bonds))
}

fn parse_int<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T, ArcError> {
    value.parse().map_err(|_| ArcError::Parse {
        line,
        kind: ArcParseErrorKind::InvalidInt {
            field,
            value: value.into(),
        },
    })
}

fn parse_float(value: &str, field: &'static str, line: usize) -> Result<f64, ArcError> {
    value.parse().map_err(|_| ArcError::Parse {
        line,
        kind: ArcParseErrorKind::InvalidFloat {
            field,
            value: value.into(),
        },
    })
}
