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

//! Implementation of the simple command semantics
//!
//! A simple command is executed in the following steps:
//!
//! 1. The command words are expanded to fields, the redirection operands are
//!    expanded, and the assignment values are expanded, in this order
//!    ([`ExpandedCommand::expand`]). Assignment values are expanded from left
//!    to right, each seeing the values of the assignments before it.
//! 2. The first field is looked up by the [command search](crate::command_search).
//! 3. Depending on the search result:
//!     - If there is no field, the redirections are performed and the
//!       assignments are applied to the shell. The exit status is zero.
//!     - A built-in runs in the shell process with the redirections in effect.
//!       The assignments persist in the shell after the built-in returns.
//!     - An external utility runs in a child process that forms a job. The
//!       assignments are exported to the utility only.
//!     - If the command is not found, the shell prints an error and the exit
//!       status is 127.

use super::Command;
use crate::Handle as _;
use crate::command_search::{Target, search};
use crate::expansion;
use crate::job::{running_job, wait_for_foreground};
use crate::redir::{ExpandedRedir, RedirGuard};
use posh_env::Env;
use posh_env::builtin::Builtin;
use posh_env::semantics::{Divert, ExitStatus, Field, Result};
use posh_env::subshell::{JobControl, Subshell};
use posh_env::system::Errno;
use posh_syntax::syntax::{Assign, SimpleCommand};
use std::ffi::{CStr, CString};
use std::ops::ControlFlow::{Break, Continue};

/// Simple command whose words have been expanded
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpandedCommand {
    /// Names and expanded values of the assignments
    pub assigns: Vec<(String, Field)>,
    /// Command name and arguments
    pub fields: Vec<Field>,
    /// Redirections with expanded operands
    pub redirs: Vec<ExpandedRedir>,
}

impl ExpandedCommand {
    /// Expands the words of a simple command.
    ///
    /// Assignment values are neither split nor globbed. While expanding an
    /// assignment value, the variables assigned by the preceding assignments
    /// of the command have their new values. The variables are restored
    /// before this function returns.
    pub fn expand(env: &mut Env, command: &SimpleCommand) -> expansion::Result<Self> {
        let fields = expansion::expand_words(env, &command.words)?;
        let redirs = command
            .redirs
            .iter()
            .map(|redir| ExpandedRedir::expand(env, redir))
            .collect::<expansion::Result<_>>()?;
        let assigns = expand_assigns(env, &command.assigns)?;
        Ok(ExpandedCommand {
            assigns,
            fields,
            redirs,
        })
    }
}

fn expand_assigns(env: &mut Env, assigns: &[Assign]) -> expansion::Result<Vec<(String, Field)>> {
    if assigns.len() < 2 {
        return assigns
            .iter()
            .map(|assign| {
                let value = expansion::expand_value(env, &assign.value)?;
                Ok::<_, expansion::Error>((assign.name.clone(), value))
            })
            .collect();
    }

    let saved = env.variables.clone();
    let result = assigns
        .iter()
        .map(|assign| {
            let value = expansion::expand_value(env, &assign.value)?;
            env.variables.assign(assign.name.as_str(), value.value.as_str());
            Ok::<_, expansion::Error>((assign.name.clone(), value))
        })
        .collect();
    env.variables = saved;
    result
}

impl Command for SimpleCommand {
    /// Executes the simple command in the foreground.
    fn execute(&self, env: &mut Env) -> Result {
        let command = match ExpandedCommand::expand(env, self) {
            Ok(command) => command,
            Err(error) => return error.handle(env),
        };

        let Some(name) = command.fields.first() else {
            return execute_absent(env, command);
        };
        match search(env, &name.value) {
            Some(Target::Builtin(builtin)) => execute_builtin(env, builtin, command),
            Some(Target::External { .. }) => execute_external(env, command, self.to_string()),
            None => execute_not_found(env, command),
        }
    }
}

fn assign_variables(env: &mut Env, assigns: Vec<(String, Field)>, export: bool) {
    for (name, value) in assigns {
        if export {
            env.variables.export(name.as_str());
        }
        env.variables.assign(name, value.value);
    }
}

fn execute_absent(env: &mut Env, command: ExpandedCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        return error.handle(&mut env);
    }
    assign_variables(&mut env, command.assigns, false);
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}

fn execute_builtin(env: &mut Env, builtin: Builtin, command: ExpandedCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        return error.handle(&mut env);
    }
    assign_variables(&mut env, command.assigns, false);

    let operands = command.fields.into_iter().skip(1).collect();
    let result = (builtin.execute)(&mut env, operands);
    if result.should_retain_redirs() {
        env.preserve_redirs();
    }
    env.exit_status = result.exit_status();
    result.divert()
}

fn execute_external(env: &mut Env, command: ExpandedCommand, name: String) -> Result {
    let job_control = env.controls_jobs().then_some(JobControl::Foreground);
    let subshell =
        Subshell::new(move |env: &mut Env| run_in_child(env, command)).job_control(job_control);
    let pid = match subshell.start(env) {
        Ok(pid) => pid,
        Err(errno) => {
            env.print_system_error(errno, "cannot start a child process");
            return Break(Divert::Abort(Some(ExitStatus::ERROR)));
        }
    };

    let Some(job) = running_job(&[pid], job_control.is_some(), name) else {
        return Continue(());
    };
    wait_for_foreground(env, job)
}

fn print_not_found(env: &mut Env, name: &Field) {
    env.print_error_at(&name.origin, format_args!("{}: command not found", name.value));
}

fn execute_not_found(env: &mut Env, command: ExpandedCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        return error.handle(&mut env);
    }
    if let Some(name) = command.fields.first() {
        print_not_found(&mut env, name);
    }
    env.exit_status = ExitStatus::NOT_FOUND;
    Continue(())
}

/// Executes an expanded simple command in a child process.
///
/// This function is the task of every subshell that runs a pipeline stage.
/// An external utility replaces the child process. A redirection error makes
/// the child exit with [`ExitStatus::ERROR`].
pub fn run_in_child(env: &mut Env, command: ExpandedCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        env.print_error_at(&error.location, &error);
        return Break(Divert::Exit(Some(ExitStatus::ERROR)));
    }

    let Some(name) = command.fields.first() else {
        assign_variables(&mut env, command.assigns, false);
        env.exit_status = ExitStatus::SUCCESS;
        return Continue(());
    };
    match search(&env, &name.value) {
        Some(Target::Builtin(builtin)) => {
            assign_variables(&mut env, command.assigns, false);
            let operands = command.fields.into_iter().skip(1).collect();
            let result = (builtin.execute)(&mut env, operands);
            env.exit_status = result.exit_status();
            result.divert()
        }
        Some(Target::External { path }) => {
            assign_variables(&mut env, command.assigns, true);
            let exit_status = replace_current_process(&mut env, path, command.fields)?;
            Break(Divert::Exit(Some(exit_status)))
        }
        None => {
            print_not_found(&mut env, name);
            env.exit_status = ExitStatus::NOT_FOUND;
            Continue(())
        }
    }
}

/// Substitutes the currently executing shell process with the external
/// utility.
///
/// This function calls [`System::execve`](posh_env::System::execve) with the
/// exported variables as the environment. If the file is not in an executable
/// format, it is run by `/bin/sh` instead. If the utility could not be
/// started, this function prints an error message and returns
/// `Continue(ExitStatus::NOT_FOUND)` for a missing file or
/// `Continue(ExitStatus::NOEXEC)` otherwise.
///
/// On a real system, this function never returns on success. The virtual
/// system runs the utility in place, in which case this function returns
/// `Break(Divert::Exit(..))` with the utility's exit status.
pub fn replace_current_process(
    env: &mut Env,
    path: CString,
    fields: Vec<Field>,
) -> Result<ExitStatus> {
    let args = fields
        .into_iter()
        .filter_map(|field| CString::new(field.value).ok())
        .collect::<Vec<_>>();
    let envs = env.variables.env_c_strings();
    tracing::debug!(path = ?path, "executing external utility");

    let errno = match env.system.execve(&path, &args, &envs) {
        Ok(exit_status) => return Break(Divert::Exit(Some(exit_status))),
        Err(Errno::ENOEXEC) => {
            let mut sh_args = Vec::with_capacity(args.len() + 1);
            sh_args.push(c"sh".to_owned());
            sh_args.push(path.clone());
            sh_args.extend(args.into_iter().skip(1));
            match env.system.execve(c"/bin/sh", &sh_args, &envs) {
                Ok(exit_status) => return Break(Divert::Exit(Some(exit_status))),
                Err(errno) => errno,
            }
        }
        Err(errno) => errno,
    };
    Continue(exec_failure(env, &path, errno))
}

fn exec_failure(env: &mut Env, path: &CStr, errno: Errno) -> ExitStatus {
    env.print_system_error(
        errno,
        format_args!("cannot execute external utility {}", path.to_string_lossy()),
    );
    match errno {
        Errno::ENOENT | Errno::ENOTDIR => ExitStatus::NOT_FOUND,
        _ => ExitStatus::NOEXEC,
    }
}
