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

//! Preparing the input for the main read-eval loop

use super::args::Source;
use posh_env::Env;
use posh_env::input::{FdReader, Input, Memory, Prompter};
use posh_env::io::Fd;
use posh_env::semantics::ExitStatus;
use posh_env::system::{Errno, Mode, OFlag, SystemEx as _};
use std::ffi::CString;
use thiserror::Error;

/// Error returned by [`prepare_input`]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot open script file '{path}': {desc}", desc = .errno.desc())]
pub struct PrepareInputError<'a> {
    /// Raw error value returned by the underlying system call
    pub errno: Errno,
    /// Path of the script file that could not be opened
    pub path: &'a str,
}

impl PrepareInputError<'_> {
    /// Returns the exit status the shell exits with because of this error.
    ///
    /// A missing script file results in 127. Other errors result in 126.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self.errno {
            Errno::ENOENT | Errno::ENOTDIR | Errno::EILSEQ => ExitStatus::NOT_FOUND,
            _ => ExitStatus::NOEXEC,
        }
    }
}

/// Prepares the input for the shell.
///
/// This function constructs an input object from the given source. If the
/// shell is interactive and reads the standard input, the [`Prompter`]
/// decorator is applied to show the prompt.
///
/// A script file is opened with a file descriptor moved out of the range
/// commands usually use.
pub fn prepare_input<'a>(
    env: &mut Env,
    source: &'a Source,
) -> Result<Box<dyn Input + 'a>, PrepareInputError<'a>> {
    match source {
        Source::Stdin => {
            let reader = FdReader::new(Fd::STDIN);
            if env.is_interactive() {
                Ok(Box::new(Prompter::new(reader)))
            } else {
                Ok(Box::new(reader))
            }
        }

        Source::File { path } => {
            let c_path = CString::new(path.as_str()).map_err(|_| PrepareInputError {
                errno: Errno::EILSEQ,
                path,
            })?;
            let fd = env
                .system
                .open(&c_path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())
                .and_then(|fd| env.system.move_fd_internal(fd))
                .map_err(|errno| PrepareInputError { errno, path })?;
            tracing::debug!(%path, ?fd, "opened script file");
            Ok(Box::new(FdReader::new(fd)))
        }

        Source::String(command) => Ok(Box::new(Memory::new(command))),
    }
}
