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

//! `FdReader` definition

use super::{Context, Input, Result};
use crate::Env;
use crate::io::Fd;
use std::slice::from_mut;

/// Input function that reads from a file descriptor
///
/// The reader reads one byte at a time so that it never consumes bytes past
/// the end of the current line. Commands run by the shell may read the rest
/// of the same file descriptor.
#[derive(Clone, Debug)]
#[must_use = "FdReader does nothing unless used by the read-eval loop"]
pub struct FdReader {
    /// File descriptor to read from
    fd: Fd,
}

impl FdReader {
    /// Creates a new `FdReader` instance.
    ///
    /// The `fd` argument is the file descriptor to read from. It should be
    /// readable and remain open for the lifetime of the `FdReader` instance.
    pub fn new(fd: Fd) -> Self {
        FdReader { fd }
    }

    /// Returns the file descriptor this reader reads from.
    #[must_use]
    pub fn fd(&self) -> Fd {
        self.fd
    }
}

impl Input for FdReader {
    fn next_line(&mut self, env: &mut Env, _context: &Context) -> Result {
        let mut bytes = Vec::new();
        loop {
            let mut byte = 0;
            match env.system.read(self.fd, from_mut(&mut byte)) {
                // End of input
                Ok(0) => break,

                Ok(_) => {
                    bytes.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }

                Err(errno) => return Err(errno),
            }
        }

        let line = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).into());
        Ok(line)
    }
}
