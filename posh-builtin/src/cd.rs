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

//! Cd built-in
//!
//! The **`cd`** built-in changes the working directory.
//!
//! # Synopsis
//!
//! ```sh
//! cd [directory]
//! ```
//!
//! # Operands
//!
//! The *directory* operand names the new working directory. If omitted, it
//! defaults to the value of the `HOME` variable. An operand of `-` means the
//! value of the `OLDPWD` variable, and the new working directory is printed
//! to the standard output in that case.
//!
//! A relative *directory* is resolved against the current value of `PWD`. The
//! resulting path is canonicalized logically: `.` components are removed and
//! each `..` component cancels the preceding component.
//!
//! # Exit status
//!
//! Zero on success, one if the working directory could not be changed, and
//! two on a usage error.
//!
//! # Side effects
//!
//! On success, `OLDPWD` is set to the previous value of `PWD` and `PWD` is
//! set to the new working directory.

use crate::common::{output, reject_extra_operands, report_failure, syntax_error};
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::system::Errno;
use posh_env::variable::{HOME, OLDPWD, PWD};
use std::ffi::CString;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod canonicalize;

pub use self::canonicalize::{NonExistingDirectoryError, canonicalize};

const NAME: &str = "cd";

/// Error in changing the working directory
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The target path contains a nul byte.
    #[error("path contains a nul byte")]
    NulByteInPath,

    /// A `..` component follows a path that is not a directory.
    #[error(transparent)]
    NonExistingDirectory(#[from] NonExistingDirectoryError),

    /// Error from the underlying system call
    #[error("{}", .0.desc())]
    SystemError(#[from] Errno),
}

/// Determines the path of the new working directory from the operand.
///
/// Returns `Err` with the error message if the operand is missing and the
/// variable that provides the default is not set.
fn target(env: &Env, operand: Option<&Field>) -> std::result::Result<(String, bool), String> {
    match operand.map(|field| field.value.as_str()) {
        None => match env.variables.get_scalar(HOME) {
            Some(home) if !home.is_empty() => Ok((home.to_owned(), false)),
            _ => Err(format!("${HOME} not set")),
        },
        Some("-") => match env.variables.get_scalar(OLDPWD) {
            Some(oldpwd) if !oldpwd.is_empty() => Ok((oldpwd.to_owned(), true)),
            _ => Err(format!("${OLDPWD} not set")),
        },
        Some(path) => Ok((path.to_owned(), false)),
    }
}

/// Returns the current working directory the `cd` built-in starts from.
///
/// The value of `PWD` is used if it is an absolute path. Otherwise, the
/// working directory is obtained from the system.
fn current_directory(env: &Env) -> Option<PathBuf> {
    match env.variables.get_scalar(PWD) {
        Some(pwd) if pwd.starts_with('/') => Some(PathBuf::from(pwd)),
        _ => env.system.getcwd().ok(),
    }
}

/// Computes the canonical absolute path of the target directory and changes
/// the working directory to it.
fn change_directory(
    env: &mut Env,
    old: Option<&Path>,
    target: &str,
) -> std::result::Result<PathBuf, Error> {
    let path = match old {
        Some(old) if !target.starts_with('/') => old.join(target),
        _ => PathBuf::from(target),
    };
    let path = canonicalize(&*env.system, &path)?;
    let c_path =
        CString::new(path.to_string_lossy().into_owned()).map_err(|_| Error::NulByteInPath)?;
    env.system.chdir(&c_path)?;
    Ok(path)
}

/// Entry point of the `cd` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if let Some(result) = reject_extra_operands(env, NAME, &args, 1) {
        return result;
    }

    let (target, print) = match target(env, args.first()) {
        Ok(target) => target,
        Err(message) => return report_failure(env, NAME, message),
    };
    if target.is_empty() {
        return syntax_error(env, NAME, "empty directory operand");
    }

    let old = current_directory(env);
    let new = match change_directory(env, old.as_deref(), &target) {
        Ok(new) => new,
        Err(error) => {
            tracing::debug!(%target, %error, "cd failed");
            return report_failure(env, NAME, format_args!("{target}: {error}"));
        }
    };

    let new = new.to_string_lossy().into_owned();
    if let Some(old) = env.variables.get_scalar(PWD).map(str::to_owned) {
        env.variables.assign(OLDPWD, old);
    } else if let Some(old) = old {
        env.variables.assign(OLDPWD, old.to_string_lossy());
    }
    env.variables.assign(PWD, new.as_str());

    if print {
        output(env, &format!("{new}\n")).into()
    } else {
        Result::new(ExitStatus::SUCCESS)
    }
}
