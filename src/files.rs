// v2-samplesheet-maker: Conversion between Illumina v2 samplesheets, JSON and RunInfo.xml.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Input and output paths of the command-line client.
//!
//! A path of `-` refers to stdin or stdout. Paths are checked with
//! [check_input] and [check_output] before anything is read, and outputs
//! are written to a temporary file next to the target that replaces it only
//! once the whole output has been written.
//!
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

type E = Box<dyn std::error::Error>;

const STDIO: &str = "-";

/// The input file does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNotFoundError {
    pub path: PathBuf,
}

impl std::fmt::Display for FileNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Input file {} does not exist", self.path.display())
    }
}

impl std::error::Error for FileNotFoundError {}

/// The directory that should contain the output file does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotADirectoryError {
    pub path: PathBuf,
}

impl std::fmt::Display for NotADirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Output directory {} does not exist", self.path.display())
    }
}

impl std::error::Error for NotADirectoryError {}

pub fn is_stdio(
    path: &Path,
) -> bool {
    path.as_os_str() == STDIO
}

// Relative file names have an empty parent.
fn output_dir(
    path: &Path,
) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn check_input(
    path: &Path,
) -> Result<(), E> {
    if !is_stdio(path) && !path.is_file() {
        return Err(Box::new(FileNotFoundError{ path: path.to_path_buf() }))
    }
    Ok(())
}

pub fn check_output(
    path: &Path,
) -> Result<(), E> {
    if !is_stdio(path) && !output_dir(path).is_dir() {
        return Err(Box::new(NotADirectoryError{ path: output_dir(path) }))
    }
    Ok(())
}

/// Read all of `path`, or stdin if `path` is `-`.
pub fn read_input(
    path: &Path,
) -> Result<Vec<u8>, E> {
    check_input(path)?;
    let mut contents: Vec<u8> = Vec::new();
    if is_stdio(path) {
        std::io::stdin().read_to_end(&mut contents)?;
    } else {
        File::open(path)?.read_to_end(&mut contents)?;
    }
    Ok(contents)
}

/// Write `contents` to `path`, or stdout if `path` is `-`.
///
/// Files are written to a temporary file in the same directory that then
/// replaces `path`, so a failed write never leaves a partial file behind.
pub fn write_output(
    path: &Path,
    contents: &[u8],
) -> Result<(), E> {
    if is_stdio(path) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(contents)?;
        stdout.flush()?;
        return Ok(())
    }

    check_output(path)?;
    let mut tmp = NamedTempFile::new_in(output_dir(path))?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path)?;
    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());

    Ok(())
}
