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

//! Export built-in
//!
//! The **`export`** built-in marks variables for export to the environment of
//! external utilities.
//!
//! # Synopsis
//!
//! ```sh
//! export [name[=value]...]
//! ```
//!
//! # Operands
//!
//! An operand of the form `name=value` assigns the value to the variable and
//! exports it. An operand without `=` exports the variable, which is created
//! without a value if it does not exist.
//!
//! Without operands, the built-in prints the exported variables in the form
//! `export name=value` sorted by name. The value is quoted if the shell would
//! not read it back as is. An exported variable without a value is printed as
//! `export name`.
//!
//! # Exit status
//!
//! Zero unless an operand has an invalid variable name, in which case the
//! other operands are still processed and the exit status is one.

use crate::common::{output, report_failure};
use itertools::Itertools as _;
use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_syntax::syntax::is_name;
use yash_quote::quoted;

const NAME: &str = "export";

/// Formats the exported variables as they are printed without operands.
fn exported_variables(env: &Env) -> String {
    env.variables
        .iter()
        .filter(|(_, variable)| variable.is_exported)
        .map(|(name, variable)| match &variable.value {
            Some(value) => format!("export {name}={}\n", quoted(value)),
            None => format!("export {name}\n"),
        })
        .join("")
}

/// Entry point of the `export` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        let text = exported_variables(env);
        return output(env, &text).into();
    }

    let mut result = Result::new(ExitStatus::SUCCESS);
    for Field { value, .. } in args {
        let (name, assigned) = match value.split_once('=') {
            Some((name, assigned)) => (name, Some(assigned)),
            None => (value.as_str(), None),
        };
        if !is_name(name) {
            result = report_failure(env, NAME, format_args!("`{name}': not a valid identifier"));
            continue;
        }
        if let Some(assigned) = assigned {
            env.variables.assign(name, assigned);
        }
        env.variables.export(name);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env_test_helper::{assert_stderr, assert_stdout, virtual_env};

    #[test]
    fn export_with_value() {
        let (mut env, _state) = virtual_env();
        let result = main(&mut env, Field::dummies(["FOO=a=b"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        let variable = env.variables.get("FOO").unwrap();
        assert_eq!(variable.value.as_deref(), Some("a=b"));
        assert!(variable.is_exported);
    }

    #[test]
    fn export_existing_and_missing_variables() {
        let (mut env, _state) = virtual_env();
        env.variables.assign("X", "1");
        let result = main(&mut env, Field::dummies(["X", "Y"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert!(env.variables.get("X").unwrap().is_exported);
        assert_eq!(env.variables.get("X").unwrap().value.as_deref(), Some("1"));
        assert!(env.variables.get("Y").unwrap().is_exported);
        assert_eq!(env.variables.get("Y").unwrap().value, None);
    }

    #[test]
    fn printing_exported_variables() {
        let (mut env, state) = virtual_env();
        env.variables.assign("B", "it's");
        env.variables.assign("A", "x y");
        env.variables.assign("D", "plain");
        env.variables.assign("E", "");
        env.variables.assign("HIDDEN", "z");
        env.variables.export("B");
        env.variables.export("A");
        env.variables.export("C");
        env.variables.export("D");
        env.variables.export("E");

        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| {
            assert_eq!(
                stdout,
                "export A='x y'\nexport B=\"it's\"\nexport C\nexport D=plain\nexport E=''\n"
            )
        });
    }

    #[test]
    fn invalid_name() {
        let (mut env, state) = virtual_env();
        let result = main(&mut env, Field::dummies(["1X=a", "OK=b"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
        assert!(env.variables.get("OK").unwrap().is_exported);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "posh: export: `1X': not a valid identifier\n")
        });
    }
}
