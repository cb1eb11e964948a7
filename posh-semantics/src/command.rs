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

//! Command execution

mod and_or;
mod item;
pub mod pipeline;
pub mod simple_command;

use posh_env::Env;
use posh_env::semantics::Result;
use posh_syntax::syntax;
use std::ops::ControlFlow::Continue;

/// Syntactic construct that can be executed.
pub trait Command {
    /// Executes this command.
    ///
    /// Implementations of this method are expected to update
    /// `env.exit_status` reflecting the result of the command execution.
    fn execute(&self, env: &mut Env) -> Result;
}

/// Executes the list.
///
/// The list is executed by executing each item in sequence. If any item results
/// in a [`Divert`](posh_env::semantics::Divert), the remaining items are not
/// executed.
impl Command for syntax::List {
    fn execute(&self, env: &mut Env) -> Result {
        for item in &self.0 {
            tracing::trace!(%item, "executing item");
            item.execute(env)?;
        }
        Continue(())
    }
}
