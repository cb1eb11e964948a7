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

//! Utilities for unit tests

use posh_env::Env;
use posh_env::system::r#virtual::SystemState;
use posh_env::variable::PATH;
use posh_env_test_helper::program::install_standard_programs;
use posh_env_test_helper::virtual_env;
use posh_syntax::syntax::{AndOrList, Item, List, Pipeline, SimpleCommand};
use std::cell::RefCell;
use std::rc::Rc;

/// Creates a virtual environment with the standard programs in `$PATH`.
pub fn test_env() -> (Env, Rc<RefCell<SystemState>>) {
    let (mut env, state) = virtual_env();
    install_standard_programs(&state);
    env.variables.assign(PATH, "/bin");
    (env, state)
}

pub fn parse_item(source: &str) -> Item {
    let mut list = source.parse::<List>().unwrap();
    assert_eq!(list.0.len(), 1, "{source:?}");
    list.0.remove(0)
}

pub fn parse_and_or(source: &str) -> AndOrList {
    parse_item(source).and_or
}

pub fn parse_pipeline(source: &str) -> Pipeline {
    let and_or = parse_and_or(source);
    assert!(and_or.rest.is_empty(), "{source:?}");
    and_or.first
}

pub fn parse_simple_command(source: &str) -> SimpleCommand {
    let mut pipeline = parse_pipeline(source);
    assert_eq!(pipeline.commands.len(), 1, "{source:?}");
    pipeline.commands.remove(0)
}
