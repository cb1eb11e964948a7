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

//! Exit built-in
//!
//! The **`exit`** built-in makes the shell exit.
//!
//! # Synopsis
//!
//! ```sh
//! exit [exit_status]
//! ```
//!
//! # Operands
//!
//! The optional *exit_status* operand is a non-negative decimal integer that
//! becomes the exit status of the shell. Without the operand, the shell exits
//! with the current value of `$?`.
//!
//! # Errors
//!
//! An operand that is not a non-negative integer, or more than one operand,
//! is a usage error. The built-in then prints an error message and returns
//! exit status 2 without exiting.
//!
//! # Implementation notes
//!
//! The built-in does not exit the process itself. It returns a result with
//! [`Divert::Exit`], and the read-eval loop unwinds and exits.

use crate::common::{reject_extra_operands, syntax_error};
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{Divert, ExitStatus, Field};
use std::ops::ControlFlow::Break;

const NAME: &str = "exit";

/// Parses the exit status operand.
fn parse_exit_status(value: &str) -> Option<ExitStatus> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().map(ExitStatus)
}

/// Entry point of the `exit` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if let Some(result) = reject_extra_operands(env, NAME, &args, 1) {
        return result;
    }

    match args.first() {
        None => Result::with_exit_status_and_divert(env.exit_status, Break(Divert::Exit(None))),
        Some(operand) => match parse_exit_status(&operand.value) {
            Some(exit_status) => {
                tracing::debug!(%exit_status, "exit requested");
                Result::with_exit_status_and_divert(
                    exit_status,
                    Break(Divert::Exit(Some(exit_status))),
                )
            }
            None => syntax_error(
                env,
                NAME,
                format_args!("{}: not a valid exit status", operand.value),
            ),
        },
    }
}
