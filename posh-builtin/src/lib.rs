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

//! Implementation of the shell built-in utilities
//!
//! Each built-in utility is implemented in the submodule named after the
//! utility. The submodule contains the `main` function that implements the
//! built-in utility. The module documentation for each submodule describes how the
//! built-in utility behaves.
//!
//! The [`common`] module provides common functions that are used for
//! implementing built-in utilities.
//!
//! Every built-in in this crate runs in the shell process. Assignments that
//! precede a built-in remain in effect after the built-in returns, and the
//! built-ins' failures never make the shell exit by themselves.

pub mod cd;
pub mod clearenv;
pub mod common;
pub mod exec;
pub mod exit;
pub mod export;
pub mod history;
pub mod unset;

#[doc(no_inline)]
pub use posh_env::builtin::*;

/// Array of all the implemented built-in utilities.
///
/// The array items are ordered alphabetically.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("cd", Builtin::new(cd::main)),
    ("clearenv", Builtin::new(clearenv::main)),
    ("exec", Builtin::new(exec::main)),
    ("exit", Builtin::new(exit::main)),
    ("export", Builtin::new(export::main)),
    ("history", Builtin::new(history::main)),
    ("unset", Builtin::new(unset::main)),
];
