// This file is part of posh, a job-control POSIX shell.
// Copyright (C) 2026 The posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Logical canonicalization of the target directory path

use posh_env::System;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error returned when a component preceding `..` is not a directory
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{}: no such directory", .missing.display())]
pub struct NonExistingDirectoryError {
    /// Path to the non-existing directory
    pub missing: PathBuf,
}

/// Canonicalizes the target directory path.
///
/// - Removes dot components.
/// - Removes dot-dot components along with the preceding component.
/// - Removes redundant slashes.
///
/// It is an error if a component preceding a dot-dot component refers to a
/// non-existent directory. In other words, in order to canonicalize "a/b/../c"
/// into "a/c", the directory "a/b" must exist. Dot-dot components at the
/// root are removed.
pub fn canonicalize(
    system: &dyn System,
    path: &Path,
) -> Result<PathBuf, NonExistingDirectoryError> {
    let path = path.to_string_lossy();
    let is_absolute = path.starts_with('/');
    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => (),
            ".." => match components.last() {
                Some(&"..") | None if !is_absolute => components.push(".."),
                None => (),
                Some(_) => {
                    ensure_directory(system, create_path(is_absolute, &components))?;
                    components.pop();
                }
            },
            _ => components.push(component),
        }
    }
    Ok(create_path(is_absolute, &components))
}

fn create_path(is_absolute: bool, components: &[&str]) -> PathBuf {
    let joined = components.join("/");
    if is_absolute {
        PathBuf::from(format!("/{joined}"))
    } else {
        PathBuf::from(joined)
    }
}

fn ensure_directory(system: &dyn System, path: PathBuf) -> Result<(), NonExistingDirectoryError> {
    match CString::new(path.to_string_lossy().into_owned()) {
        Ok(c_path) if system.is_directory(&c_path) => Ok(()),
        _ => Err(NonExistingDirectoryError { missing: path }),
    }
}
