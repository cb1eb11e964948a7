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

//! History built-in
//!
//! The **`history`** built-in prints the command history. Each entry is
//! printed on its own line, preceded by its number right-aligned in five
//! columns and two spaces. Entries are numbered from 1 in the order they were
//! entered. The built-in takes no operands.

use crate::common::{output, reject_extra_operands};
use itertools::Itertools as _;
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::Field;

/// Entry point of the `history` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if let Some(result) = reject_extra_operands(env, "history", &args, 0) {
        return result;
    }
    let text = env
        .history
        .iter()
        .map(|(number, line)| format!("{number:5}  {line}\n"))
        .join("");
    output(env, &text).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::semantics::ExitStatus;
    use posh_env_test_helper::{assert_stdout, virtual_env};

    #[test]
    fn entries_are_numbered() {
        let (mut env, state) = virtual_env();
        env.history.add("echo a\n");
        env.history.add("cd /tmp && ls\n");
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| {
            assert_eq!(stdout, "    1  echo a\n    2  cd /tmp && ls\n")
        });
    }

    #[test]
    fn empty_history() {
        let (mut env, state) = virtual_env();
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn operands_are_rejected() {
        let (mut env, _state) = virtual_env();
        env.history.add("echo a");
        let result = main(&mut env, Field::dummies(["1"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }
}
