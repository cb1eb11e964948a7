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

//! Common items for implementing built-ins

use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::io::Fd;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::system::SystemEx as _;
use std::fmt::Display;

/// Prints a string to the standard output.
///
/// If an error occurs while printing, an error message is printed to the
/// standard error and [`ExitStatus::FAILURE`] is returned.
pub fn output(env: &mut Env, text: &str) -> ExitStatus {
    match env.system.write_all(Fd::STDOUT, text.as_bytes()) {
        Ok(()) => ExitStatus::SUCCESS,
        Err(errno) => {
            env.print_system_error(errno, "cannot print to the standard output");
            ExitStatus::FAILURE
        }
    }
}

/// Prints an error message for a built-in and returns the exit status.
///
/// The message is prefixed with the built-in name, as in
/// `posh: cd: $HOME not set`.
pub fn report<M: Display>(
    env: &mut Env,
    name: &str,
    message: M,
    exit_status: ExitStatus,
) -> Result {
    env.print_error(format_args!("{name}: {message}"));
    Result::new(exit_status)
}

/// Reports a failure with [`ExitStatus::FAILURE`].
pub fn report_failure<M: Display>(env: &mut Env, name: &str, message: M) -> Result {
    report(env, name, message, ExitStatus::FAILURE)
}

/// Reports invalid usage with [`ExitStatus::ERROR`].
pub fn syntax_error<M: Display>(env: &mut Env, name: &str, message: M) -> Result {
    report(env, name, message, ExitStatus::ERROR)
}

/// Reports that the built-in does not take operands beyond `max` if there are
/// more.
///
/// Returns `Some` with the error result if `operands` are too many.
pub fn reject_extra_operands(
    env: &mut Env,
    name: &str,
    operands: &[Field],
    max: usize,
) -> Option<Result> {
    let extra = operands.get(max)?;
    Some(syntax_error(
        env,
        name,
        format_args!("{}: too many operands", extra.value),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env_test_helper::{assert_stderr, virtual_env};

    #[test]
    fn extra_operands_are_reported() {
        let (mut env, state) = virtual_env();
        let operands = Field::dummies(["a", "b"]);
        assert!(reject_extra_operands(&mut env, "x", &operands, 2).is_none());
        let result = reject_extra_operands(&mut env, "x", &operands, 1).unwrap();
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "posh: x: b: too many operands\n")
        });
    }
}
