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

//! Semantics of the shell language
//!
//! This crate gives meaning to the syntax trees built by `posh-syntax`.
//! The core of the semantics is word expansion and command execution.
//!
//! - The [`expansion`] module turns words into fields by parameter expansion,
//!   field splitting, pathname expansion, and quote removal.
//! - The [`redir`] module opens files and duplicates file descriptors as
//!   redirections specify.
//! - The [`command_search`] module locates built-ins and external utilities.
//! - A command is executed by calling
//!   [`Command::execute`](command::Command::execute). Pipelines become
//!   [jobs](job) whose processes are waited for or left in the background.
//!
//! [`read_eval_loop`] reads, parses, and executes commands from an
//! [input](posh_env::input::Input). It is the main loop of the shell.

pub mod command;
pub mod command_search;
pub mod expansion;
pub mod job;
pub mod redir;

#[doc(no_inline)]
pub use posh_env::semantics::*;

mod handle;
pub use handle::Handle;

mod runner;
pub use runner::read_eval_loop;

#[cfg(test)]
pub(crate) mod tests;
