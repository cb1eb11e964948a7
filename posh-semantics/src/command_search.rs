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

//! Command search
//!
//! The command search determines what kind of utility a command name refers
//! to:
//!
//! 1. If the name is a built-in, the built-in is the target.
//! 2. If the name contains a slash, the name itself is the pathname of the
//!    external utility.
//! 3. Otherwise, the directories in `$PATH` are searched in order for an
//!    executable regular file with the name. An empty directory name means
//!    the working directory.
//!
//! If no executable file is found in `$PATH` but a non-executable file is,
//! the file is the target so that executing it fails with a permission error
//! rather than being reported as not found.

use posh_env::Env;
use posh_env::builtin::Builtin;
use posh_env::variable::PATH;
use std::ffi::CString;

/// Result of the command search
#[derive(Clone, Debug)]
pub enum Target {
    /// Built-in utility
    Builtin(Builtin),
    /// External utility at the pathname
    External { path: CString },
}

impl From<Builtin> for Target {
    fn from(builtin: Builtin) -> Target {
        Target::Builtin(builtin)
    }
}

/// Performs the command search.
///
/// Returns `None` if the command is not found.
#[must_use]
pub fn search(env: &Env, name: &str) -> Option<Target> {
    if let Some(builtin) = env.builtins.get(name) {
        return Some((*builtin).into());
    }

    if name.contains('/') {
        let path = CString::new(name).ok()?;
        return Some(Target::External { path });
    }

    search_path(env, name).map(|path| Target::External { path })
}

/// Searches `$PATH` for an executable file.
///
/// Returns the pathname of the file found, if any.
#[must_use]
pub fn search_path(env: &Env, name: &str) -> Option<CString> {
    let dirs = env.variables.get_scalar(PATH)?;
    let mut non_executable = None;
    for dir in dirs.split(':') {
        let dir = if dir.is_empty() { "." } else { dir };
        let Ok(path) = CString::new(format!("{dir}/{name}")) else {
            continue;
        };
        if env.system.is_executable_file(&path) {
            return Some(path);
        }
        if non_executable.is_none()
            && env.system.file_exists(&path)
            && !env.system.is_directory(&path)
        {
            non_executable = Some(path);
        }
    }
    non_executable
}
