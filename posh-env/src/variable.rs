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

//! Items for shell variables
//!
//! A [`Variable`] is a named parameter that can be assigned and exported. The
//! [`VariableSet`] in [`Env::variables`](crate::Env::variables) maps names to
//! variables and also holds the positional parameters.
//!
//! Exported variables are passed to external utilities as environment
//! variables. A variable can be exported before it is assigned a value, in
//! which case it is exported once it gets one.
//!
//! # Examples
//!
//! ```
//! use posh_env::variable::VariableSet;
//! let mut set = VariableSet::new();
//! set.assign("foo", "hello");
//! set.export("foo");
//! assert_eq!(set.get_scalar("foo"), Some("hello"));
//! assert_eq!(set.env_c_strings(), [c"foo=hello".to_owned()]);
//! ```

use itertools::Itertools as _;
use std::collections::HashMap;
use std::ffi::CString;

/// Name of the variable holding the home directory
pub const HOME: &str = "HOME";
/// Name of the variable holding the previous working directory
pub const OLDPWD: &str = "OLDPWD";
/// Name of the variable holding the command search path
pub const PATH: &str = "PATH";
/// Name of the variable holding the parent process ID
pub const PPID: &str = "PPID";
/// Name of the variable holding the primary prompt string
pub const PS1: &str = "PS1";
/// Initial value of [`PS1`]
pub const PS1_INITIAL_VALUE: &str = "$ ";
/// Name of the variable holding the secondary prompt string
pub const PS2: &str = "PS2";
/// Initial value of [`PS2`]
pub const PS2_INITIAL_VALUE: &str = "> ";
/// Name of the variable holding the current working directory
pub const PWD: &str = "PWD";
/// Name of the variable holding the shell nesting level
pub const SHLVL: &str = "SHLVL";

/// Definition of a variable
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Variable {
    /// Value of the variable
    ///
    /// The value is `None` if the variable has been exported without being
    /// assigned.
    pub value: Option<String>,

    /// Whether this variable is exported or not
    pub is_exported: bool,
}

impl Variable {
    /// Creates a new non-exported variable with the given value.
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(value.into()),
            is_exported: false,
        }
    }

    /// Sets the `is_exported` flag and returns the variable.
    #[must_use]
    pub fn export(mut self) -> Self {
        self.is_exported = true;
        self
    }
}

/// Collection of variables and positional parameters
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VariableSet {
    variables: HashMap<String, Variable>,
    positional_params: Vec<String>,
}

impl VariableSet {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> VariableSet {
        Default::default()
    }

    /// Gets a reference to the variable with the specified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Gets the value of the specified variable.
    ///
    /// Returns `None` if the variable is not set.
    #[must_use]
    pub fn get_scalar(&self, name: &str) -> Option<&str> {
        self.get(name)?.value.as_deref()
    }

    /// Assigns a value to a variable.
    ///
    /// The variable keeps its export attribute. Returns the old value.
    pub fn assign<N, V>(&mut self, name: N, value: V) -> Option<String>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let variable = self.variables.entry(name.into()).or_default();
        variable.value.replace(value.into())
    }

    /// Marks a variable as exported.
    ///
    /// If the variable does not exist, an exported variable without a value is
    /// created.
    pub fn export<N: Into<String>>(&mut self, name: N) {
        self.variables.entry(name.into()).or_default().is_exported = true;
    }

    /// Removes a variable.
    ///
    /// Returns the removed variable, if any.
    pub fn unset(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Removes all variables.
    ///
    /// Positional parameters are not affected.
    pub fn clear(&mut self) {
        self.variables.clear();
    }

    /// Returns an iterator of all variables sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables
            .iter()
            .map(|(name, variable)| (name.as_str(), variable))
            .sorted_unstable_by_key(|&(name, _)| name)
    }

    /// Returns environment variables in a new vector of C strings.
    ///
    /// Only exported variables with a value are included. Variables whose name
    /// or value contains a null character are skipped.
    #[must_use]
    pub fn env_c_strings(&self) -> Vec<CString> {
        self.iter()
            .filter(|(_, variable)| variable.is_exported)
            .filter_map(|(name, variable)| {
                let value = variable.value.as_ref()?;
                CString::new(format!("{name}={value}")).ok()
            })
            .collect()
    }

    /// Imports environment variables from an iterator.
    ///
    /// The argument iterator must yield name-value pairs. This function assigns
    /// the values to the variable set, overwriting existing variables. The
    /// variables are exported.
    pub fn extend_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let name = name.into();
            self.assign(name.clone(), value);
            self.export(name);
        }
    }

    /// Initializes default variables.
    ///
    /// This function assigns `PS1='$ '` and `PS2='> '` unless they are already
    /// set.
    pub fn init(&mut self) {
        for (name, value) in [(PS1, PS1_INITIAL_VALUE), (PS2, PS2_INITIAL_VALUE)] {
            if self.get_scalar(name).is_none() {
                self.assign(name, value);
            }
        }
    }

    /// Returns the positional parameters.
    #[must_use]
    pub fn positional_params(&self) -> &[String] {
        &self.positional_params
    }

    /// Replaces the positional parameters.
    pub fn set_positional_params(&mut self, params: Vec<String>) {
        self.positional_params = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_keeps_export_attribute() {
        let mut set = VariableSet::new();
        set.export("x");
        assert_eq!(set.get("x"), Some(&Variable { value: None, is_exported: true }));

        let old = set.assign("x", "1");
        assert_eq!(old, None);
        assert_eq!(set.get("x"), Some(&Variable::new("1").export()));

        let old = set.assign("x", "2");
        assert_eq!(old.as_deref(), Some("1"));
        assert!(set.get("x").unwrap().is_exported);
    }

    #[test]
    fn unset_and_clear() {
        let mut set = VariableSet::new();
        set.assign("a", "1");
        set.assign("b", "2");
        set.set_positional_params(vec!["p".to_string()]);

        assert_eq!(set.unset("a"), Some(Variable::new("1")));
        assert_eq!(set.unset("a"), None);
        assert_eq!(set.get_scalar("b"), Some("2"));

        set.clear();
        assert_eq!(set.get("b"), None);
        assert_eq!(set.positional_params(), ["p"]);
    }

    #[test]
    fn env_c_strings_include_only_exported_values() {
        let mut set = VariableSet::new();
        set.assign("local", "x");
        set.export("unassigned");
        set.extend_env([("B", "2"), ("A", "1")]);
        assert_eq!(set.env_c_strings(), [c"A=1".to_owned(), c"B=2".to_owned()]);
    }

    #[test]
    fn iter_is_sorted() {
        let mut set = VariableSet::new();
        set.assign("zeta", "");
        set.assign("alpha", "");
        set.assign("mu", "");
        let names: Vec<_> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["alpha", "mu", "zeta"]);
    }

    #[test]
    fn init_does_not_override() {
        let mut set = VariableSet::new();
        set.assign(PS1, "% ");
        set.init();
        assert_eq!(set.get_scalar(PS1), Some("% "));
        assert_eq!(set.get_scalar(PS2), Some(PS2_INITIAL_VALUE));
    }
}
