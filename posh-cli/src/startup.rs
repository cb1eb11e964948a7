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

//! Shell startup
//!
//! The functions in this module turn the parsed command line into the
//! initial state of the shell environment.

use self::args::{Run, Source};
use posh_builtin::BUILTINS;
use posh_env::Env;
use posh_env::System;
use posh_env::io::Fd;
use posh_env::job::Pid;
use posh_env::option::{Interactive, Monitor};
use posh_env::system::{Errno, Signal, SystemEx as _};
use posh_env::variable::{PPID, SHLVL};

pub mod args;
pub mod input;

/// Tests whether the shell should be implicitly interactive.
///
/// The shell is interactive if there are no operands and the standard input
/// and standard error are attached to a terminal.
pub fn auto_interactive(system: &dyn System, run: &Run) -> bool {
    if run.source != Source::Stdin {
        return false;
    }
    if !run.positional_params.is_empty() {
        return false;
    }
    system.isatty(Fd::STDIN) && system.isatty(Fd::STDERR)
}

/// Initializes the variables the shell maintains.
///
/// - `PS1` and `PS2` get the default values unless set.
/// - `SHLVL` is incremented, treating a non-numeric value as zero, and
///   exported.
/// - `PPID` is set to the parent process ID.
/// - `PWD` is kept if it names the working directory and reset otherwise.
pub fn init_variables(env: &mut Env) {
    env.variables.init();

    let level = env
        .variables
        .get_scalar(SHLVL)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0);
    env.variables.assign(SHLVL, level.saturating_add(1).to_string());
    env.variables.export(SHLVL);

    let ppid = env.system.getppid();
    env.variables.assign(PPID, ppid.to_string());

    if let Err(errno) = env.prepare_pwd() {
        tracing::warn!(%errno, "cannot determine the working directory");
    }
}

/// Makes the shell the foreground process group of its own.
///
/// The shell ignores the job-control signals, puts itself in a new process
/// group, and makes the group the foreground of the terminal.
fn take_terminal(env: &mut Env) -> Result<(), Errno> {
    for signal in [Signal::SIGTTOU, Signal::SIGTTIN, Signal::SIGTSTP] {
        env.ignore_signal(signal)?;
    }

    let tty = env.get_tty()?;
    match env.system.setpgid(Pid::from_raw(0), Pid::from_raw(0)) {
        // A session leader cannot change its process group, but it already is
        // the leader of its own group.
        Ok(()) | Err(Errno::EPERM) => (),
        Err(errno) => return Err(errno),
    }
    env.main_pgid = env.system.getpgrp();
    env.system.tcsetpgrp_with_block(tty, env.main_pgid)?;
    tracing::debug!(pgid = ?env.main_pgid, "took the terminal");
    Ok(())
}

/// Enables job control.
///
/// On success, the [`Monitor`] option is turned on. On failure, an error
/// message is printed and the shell continues without job control.
pub fn init_job_control(env: &mut Env) {
    match take_terminal(env) {
        Ok(()) => {
            env.options.insert(Monitor);
        }
        Err(errno) => {
            env.print_system_error(errno, "cannot enable job control");
        }
    }
}

/// Prepares an interactive shell.
///
/// The interactive shell ignores SIGINT and SIGQUIT so that the keyboard
/// interrupts affect only the foreground job. Job control is enabled if the
/// standard input is a terminal.
pub fn init_interactive(env: &mut Env) {
    for signal in [Signal::SIGINT, Signal::SIGQUIT] {
        if let Err(errno) = env.ignore_signal(signal) {
            tracing::warn!(?signal, %errno, "cannot ignore signal");
        }
    }
    if env.system.isatty(Fd::STDIN) {
        init_job_control(env);
    }
}

/// Configures the environment according to the command line.
///
/// Returns the source of commands for the read-eval loop. The caller should
/// import the environment variables before calling this function.
pub fn configure_environment(env: &mut Env, run: Run) -> Source {
    let is_interactive =
        run.options.contains(Interactive) || auto_interactive(&*env.system, &run);

    env.options = run.options;
    if is_interactive {
        env.options.insert(Interactive);
    }
    env.arg0 = run.arg0;
    env.variables.set_positional_params(run.positional_params);
    env.builtins.extend(BUILTINS.iter().copied());

    init_variables(env);
    if is_interactive {
        init_interactive(env);
    }

    tracing::debug!(options = ?env.options, source = ?run.source, "shell configured");
    run.source
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::option::{ErrExit, OptionSet};
    use posh_env::system::SignalHandling;
    use posh_env::variable::{PS1, PWD};
    use posh_env_test_helper::{assert_stderr, stub_tty, virtual_env};

    #[test]
    fn configure_non_interactive_command_string() {
        let (mut env, _state) = virtual_env();
        let run = Run {
            source: Source::String("echo".to_owned()),
            options: ErrExit.into(),
            arg0: "name".to_owned(),
            positional_params: vec!["a".to_owned(), "b".to_owned()],
        };

        let source = configure_environment(&mut env, run);
        assert_eq!(source, Source::String("echo".to_owned()));
        assert_eq!(env.options, OptionSet::from(ErrExit));
        assert_eq!(env.arg0, "name");
        assert_eq!(env.variables.positional_params(), ["a", "b"]);
        assert!(env.builtins.contains_key("cd"));
        assert!(env.builtins.contains_key("exec"));
        assert_eq!(env.variables.get_scalar(PS1), Some("$ "));
        assert_eq!(env.variables.get_scalar(PWD), Some("/"));
    }

    #[test]
    fn shlvl_is_incremented_and_exported() {
        let (mut env, _state) = virtual_env();
        env.variables.assign(SHLVL, "3");
        init_variables(&mut env);
        let shlvl = env.variables.get(SHLVL).unwrap();
        assert_eq!(shlvl.value.as_deref(), Some("4"));
        assert!(shlvl.is_exported);
    }

    #[test]
    fn shlvl_without_numeric_value() {
        let (mut env, _state) = virtual_env();
        init_variables(&mut env);
        assert_eq!(env.variables.get_scalar(SHLVL), Some("1"));

        env.variables.assign(SHLVL, "x");
        init_variables(&mut env);
        assert_eq!(env.variables.get_scalar(SHLVL), Some("1"));
    }

    #[test]
    fn ppid_is_set() {
        let (mut env, _state) = virtual_env();
        init_variables(&mut env);
        let ppid = env.system.getppid().to_string();
        assert_eq!(env.variables.get_scalar(PPID), Some(ppid.as_str()));
    }

    #[test]
    fn job_control_takes_terminal() {
        let (mut env, state) = virtual_env();
        stub_tty(&state);
        init_job_control(&mut env);

        assert!(env.controls_jobs());
        let pid = env.system.getpid();
        assert_eq!(env.main_pgid, pid);
        let state = state.borrow();
        assert_eq!(state.foreground, Some(pid));
        let process = &state.processes[&pid];
        assert_eq!(process.pgid(), pid);
        for signal in [Signal::SIGTTOU, Signal::SIGTTIN, Signal::SIGTSTP] {
            assert_eq!(process.signal_handling(signal), SignalHandling::Ignore);
        }
    }

    #[test]
    fn job_control_without_terminal() {
        let (mut env, state) = virtual_env();
        init_job_control(&mut env);
        assert!(!env.controls_jobs());
        assert_stderr(&state, |stderr| {
            assert!(stderr.starts_with("posh: cannot enable job control: "), "{stderr:?}")
        });
    }

    #[test]
    fn interactive_shell_ignores_keyboard_signals() {
        let (mut env, state) = virtual_env();
        let run = Run {
            options: Interactive.into(),
            ..Run::default()
        };
        configure_environment(&mut env, run);
        assert!(env.is_interactive());
        // The standard input of the virtual system is not a terminal.
        assert!(!env.controls_jobs());
        let pid = env.system.getpid();
        let state = state.borrow();
        let process = &state.processes[&pid];
        assert_eq!(process.signal_handling(Signal::SIGINT), SignalHandling::Ignore);
        assert_eq!(process.signal_handling(Signal::SIGQUIT), SignalHandling::Ignore);
    }
}
