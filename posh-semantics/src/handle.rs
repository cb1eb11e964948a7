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

//! Error handlers

use crate::ExitStatus;
use posh_env::Env;
use posh_env::semantics::Divert;
use std::ops::ControlFlow::{Break, Continue};

/// Error handler
///
/// Most errors in the shell are handled by printing an error message to the
/// standard error and returning a non-zero exit status. This trait provides a
/// standard interface for implementing that behavior.
pub trait Handle {
    /// Handles the argument error.
    fn handle(&self, env: &mut Env) -> crate::Result;
}

/// Prints an error message.
///
/// An interactive shell sets the exit status to [`ExitStatus::ERROR`] and
/// continues. A non-interactive shell returns
/// `Divert::Exit(Some(ExitStatus::SYNTAX_ERROR))` to exit.
impl Handle for posh_syntax::parser::Error {
    fn handle(&self, env: &mut Env) -> crate::Result {
        env.print_error_at(&self.location, format_args!("syntax error: {self}"));
        if env.is_interactive() {
            env.exit_status = ExitStatus::ERROR;
            Continue(())
        } else {
            Break(Divert::Exit(Some(ExitStatus::SYNTAX_ERROR)))
        }
    }
}

/// Prints an error message and sets the exit status to [`ExitStatus::ERROR`].
///
/// Only the pipeline containing the erroneous word is abandoned. The caller
/// continues with the next command, so the `ErrExit` option is honored by
/// the and-or list that contains the pipeline.
impl Handle for crate::expansion::Error {
    fn handle(&self, env: &mut Env) -> crate::Result {
        env.print_error_at(&self.location, self);
        env.exit_status = ExitStatus::ERROR;
        Continue(())
    }
}

/// Prints an error message and sets the exit status to non-zero.
///
/// The command whose redirection failed is not executed, but the shell
/// continues with the next command.
impl Handle for crate::redir::Error {
    fn handle(&self, env: &mut Env) -> crate::Result {
        env.print_error_at(&self.location, self);
        env.exit_status = ExitStatus::ERROR;
        Continue(())
    }
}
