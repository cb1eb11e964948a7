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

//! Clearenv built-in
//!
//! The **`clearenv`** built-in removes all variables from the shell, exported
//! or not. It takes no operands. Positional parameters are kept.

use crate::common::reject_extra_operands;
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};

/// Entry point of the `clearenv` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if let Some(result) = reject_extra_operands(env, "clearenv", &args, 0) {
        return result;
    }
    tracing::debug!("clearing all variables");
    env.variables.clear();
    Result::new(ExitStatus::SUCCESS)
}
