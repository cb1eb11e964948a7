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

//! Exec built-in
//!
//! The **`exec`** built-in replaces the shell process with an external
//! utility, or makes redirections permanent in the shell.
//!
//! # Synopsis
//!
//! ```sh
//! exec [name [arguments...]]
//! ```
//!
//! # Semantics
//!
//! Without operands, the redirections performed for the built-in are not
//! undone after the built-in returns. They remain in effect for the rest of
//! the shell session.
//!
//! With operands, the built-in searches for the external utility *name* the
//! same way as a simple command, ignoring built-ins, and executes it in place
//! of the shell process. Exported variables are passed to the utility.
//!
//! # Exit status
//!
//! Without operands, zero. If the utility is not found, the built-in returns
//! 127; if it is found but cannot be executed, 126. The shell does not exit
//! in either case. If the utility is executed, the shell process ceases to
//! exist.

use posh_env::Env;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_semantics::command::simple_command::replace_current_process;
use posh_semantics::command_search::search_path;
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};

/// Entry point of the `exec` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(name) = args.first() else {
        let mut result = Result::new(ExitStatus::SUCCESS);
        result.retain_redirs();
        return result;
    };

    let path = if name.value.contains('/') {
        CString::new(name.value.as_str()).ok()
    } else {
        search_path(env, &name.value)
    };
    let Some(path) = path else {
        env.print_error_at(&name.origin, format_args!("{}: command not found", name.value));
        return Result::new(ExitStatus::NOT_FOUND);
    };

    let ignored = env.ignored_signals().collect::<Vec<_>>();
    env.restore_signals();

    match replace_current_process(env, path, args) {
        Break(divert) => {
            let exit_status = divert.exit_status().unwrap_or(env.exit_status);
            Result::with_exit_status_and_divert(exit_status, Break(divert))
        }
        Continue(exit_status) => {
            for signal in ignored {
                if let Err(errno) = env.ignore_signal(signal) {
                    tracing::warn!(?signal, %errno, "cannot ignore signal again");
                }
            }
            Result::new(exit_status)
        }
    }
}
