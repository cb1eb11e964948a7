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

//! This crate contains utility functions for use in tests that interact with
//! the shell environment ([`posh_env::Env`]).

pub mod program;

use assert_matches::assert_matches;
use posh_env::Env;
use posh_env::system::r#virtual::{FileBody, Inode, SystemState, VirtualSystem};
use std::cell::RefCell;
use std::rc::Rc;
use std::str::from_utf8;

/// Creates an environment with a new virtual system.
///
/// Returns the environment and a shared reference to the system state, which
/// can be used to inspect or modify the virtual system.
#[must_use]
pub fn virtual_env() -> (Env, Rc<RefCell<SystemState>>) {
    let system = VirtualSystem::new();
    let state = Rc::clone(&system.state);
    (Env::with_system(Box::new(system)), state)
}

/// Creates a terminal device at /dev/tty.
///
/// The terminal is made the controlling terminal whose foreground process
/// group is the process group of the initial process of the virtual system.
pub fn stub_tty(state: &RefCell<SystemState>) {
    let mut state = state.borrow_mut();
    state
        .file_system
        .save("/dev/tty", Rc::new(RefCell::new(Inode::terminal())))
        .unwrap();
    let pgid = state.processes.values().next().map(|process| process.pgid());
    state.foreground = pgid;
}

/// Replaces the content of /dev/stdin.
pub fn set_stdin<B: Into<Vec<u8>>>(state: &RefCell<SystemState>, content: B) {
    let file = state.borrow().file_system.get("/dev/stdin").unwrap();
    file.borrow_mut().body = FileBody::new(content);
}

fn assert_file<F, T>(state: &RefCell<SystemState>, path: &str, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    let file = state.borrow().file_system.get(path).unwrap();
    let file = file.borrow();
    assert_matches!(&file.body, FileBody::Regular { content, .. } => {
        f(from_utf8(content).unwrap())
    })
}

/// Helper function for asserting on the content of /dev/stdout
///
/// This function asserts on the content of /dev/stdout. The argument function
/// `f` is called with the content of /dev/stdout as a string slice.
///
/// This function panics if /dev/stdout does not exist, is not a regular file,
/// or does not contain a valid UTF-8 string.
///
/// # Example
///
/// ```
/// # use posh_env::io::Fd;
/// # use posh_env::system::System;
/// # use posh_env_test_helper::{assert_stdout, virtual_env};
/// let (mut env, state) = virtual_env();
/// env.system.write(Fd::STDOUT, b"Hello, world!\n").unwrap();
/// assert_stdout(&state, |stdout| assert_eq!(stdout, "Hello, world!\n"));
/// ```
pub fn assert_stdout<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    assert_file(state, "/dev/stdout", f)
}

/// Helper function for asserting on the content of /dev/stderr
///
/// This function asserts on the content of /dev/stderr. The argument function
/// `f` is called with the content of /dev/stderr as a string slice.
///
/// This function panics if /dev/stderr does not exist, is not a regular file,
/// or does not contain a valid UTF-8 string.
///
/// This function is analogous to [`assert_stdout`]. See its documentation for
/// an example.
pub fn assert_stderr<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    assert_file(state, "/dev/stderr", f)
}
