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

//! Defines the `Prompter` decorator.

use super::{Context, Input, Result};
use crate::Env;
use crate::io::Fd;
use crate::system::SystemEx as _;
use crate::variable::{PS1, PS2, VariableSet};

/// [`Input`] decorator that shows a command prompt
///
/// This decorator prints the command prompt to the standard error before the
/// input is read by the inner `Input`. The prompt is the value of `PS1` for
/// the first line of a command line and `PS2` for continuation lines. The
/// value is printed as is, without any expansion.
#[derive(Clone, Debug)]
#[must_use = "Prompter does nothing unless used by the read-eval loop"]
pub struct Prompter<T> {
    inner: T,
}

impl<T> Prompter<T> {
    /// Creates a new `Prompter` decorator.
    ///
    /// The argument is the inner `Input` that performs the actual input
    /// operation.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Input> Input for Prompter<T> {
    fn next_line(&mut self, env: &mut Env, context: &Context) -> Result {
        let prompt = fetch_prompt(&env.variables, context);
        // A failure to show the prompt does not prevent reading input.
        let _ = env.system.write_all(Fd::STDERR, prompt.as_bytes());
        self.inner.next_line(env, context)
    }
}

/// Fetches the command prompt string from the variable set.
///
/// [`Context::is_first_line`] determines which of `PS1` and `PS2` is used.
/// An empty string is returned if the variable is not set.
pub fn fetch_prompt(variables: &VariableSet, context: &Context) -> String {
    let var = if context.is_first_line() { PS1 } else { PS2 };
    variables.get_scalar(var).unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Memory;
    use crate::system::r#virtual::VirtualSystem;
    use std::rc::Rc;

    fn stderr(state: &Rc<std::cell::RefCell<crate::system::r#virtual::SystemState>>) -> String {
        let content = state.borrow().file_content("/dev/stderr").unwrap();
        String::from_utf8(content).unwrap()
    }

    #[test]
    fn primary_prompt_is_printed_before_reading() {
        let system = VirtualSystem::new();
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(Box::new(system));
        env.variables.assign(PS1, "my$ ");
        let mut prompter = Prompter::new(Memory::new("echo\n"));

        let line = prompter.next_line(&mut env, &Context::default()).unwrap();
        assert_eq!(line, "echo\n");
        assert_eq!(stderr(&state), "my$ ");
    }

    #[test]
    fn secondary_prompt_for_continuation_lines() {
        let system = VirtualSystem::new();
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(Box::new(system));
        env.variables.assign(PS2, ">> ");
        let mut prompter = Prompter::new(Memory::new("'\n"));

        prompter.next_line(&mut env, &Context::new(false)).unwrap();
        assert_eq!(stderr(&state), ">> ");
    }

    #[test]
    fn unset_prompt_prints_nothing() {
        let system = VirtualSystem::new();
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(Box::new(system));
        env.variables.unset(PS1);
        let mut prompter = Prompter::new(Memory::new(""));

        prompter.next_line(&mut env, &Context::default()).unwrap();
        assert_eq!(stderr(&state), "");
    }
}
