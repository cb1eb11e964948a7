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

//! Sources of command lines
//!
//! The read-eval loop obtains source text from an implementor of [`Input`]
//! one line at a time. This module provides three implementors:
//!
//! - [`Memory`] reads from a string, as for the `-c` option.
//! - [`FdReader`] reads from a file descriptor, as for a script file or the
//!   standard input.
//! - [`Prompter`] decorates another input by printing a prompt before each
//!   line, as for an interactive shell.

mod fd_reader;
mod memory;
mod prompter;

pub use fd_reader::FdReader;
pub use memory::Memory;
pub use prompter::Prompter;

use crate::Env;
use crate::system::Errno;

/// Additional information passed to [`Input::next_line`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Context {
    is_first_line: bool,
}

impl Default for Context {
    fn default() -> Self {
        Context { is_first_line: true }
    }
}

impl Context {
    /// Creates a context.
    ///
    /// `is_first_line` should be false when the line is read to complete a
    /// command line that has been partially read.
    #[must_use]
    pub const fn new(is_first_line: bool) -> Self {
        Context { is_first_line }
    }

    /// Whether the line is the first line of a command line.
    #[must_use]
    pub const fn is_first_line(&self) -> bool {
        self.is_first_line
    }
}

/// Result of [`Input::next_line`]
///
/// An empty string means the end of input.
pub type Result = std::result::Result<String, Errno>;

/// Line-oriented source code reader
pub trait Input {
    /// Reads a next line of the source code.
    ///
    /// The line is returned with the trailing newline, if any. If the input
    /// has ended, an empty string is returned.
    fn next_line(&mut self, env: &mut Env, context: &Context) -> Result;
}

impl<T: Input + ?Sized> Input for Box<T> {
    fn next_line(&mut self, env: &mut Env, context: &Context) -> Result {
        (**self).next_line(env, context)
    }
}
