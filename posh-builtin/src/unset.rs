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

//! Unset built-in
//!
//! The **`unset`** built-in removes variables.
//!
//! # Synopsis
//!
//! ```sh
//! unset name...
//! ```
//!
//! Unsetting a variable that is not set is not an error.
//!
//! # Exit status
//!
//! Zero unless an operand is not a valid variable name, in which case the
//! exit status is one. Valid operands are processed regardless.

use crate::common::report_failure;
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_syntax::syntax::is_name;

const NAME: &str = "unset";

/// Entry point of the `unset` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut result = Result::new(ExitStatus::SUCCESS);
    for field in &args {
        if is_name(&field.value) {
            env.variables.unset(&field.value);
        } else {
            result = report_failure(
                env,
                NAME,
                format_args!("`{}': not a valid identifier", field.value),
            );
        }
    }
    result
}
