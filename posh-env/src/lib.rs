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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment, [`Env`], is a collection of data that may
//! affect or be affected by the execution of commands. The environment consists
//! of application-managed parts and system-managed parts. Application-managed
//! parts are implemented in pure Rust in this crate. Many application-managed
//! parts like [variable]s and [job]s can be manipulated independently of
//! interactions with the underlying system. System-managed parts, on the other
//! hand, depend on the underlying system. Attributes like the working directory
//! and the foreground process group are managed by the system to be accessed
//! only by interaction with the system interface.
//!
//! The [`System`] trait is the interface to the system-managed parts.
//! [`RealSystem`] provides an implementation for `System` that interacts with
//! the underlying system. [`VirtualSystem`] is a dummy for simulating the
//! system's behavior without affecting the actual system.

pub mod builtin;
pub mod history;
pub mod input;
pub mod io;
pub mod job;
pub mod option;
mod pwd;
pub mod semantics;
pub mod subshell;
pub mod system;
pub mod variable;

use self::builtin::Builtin;
use self::history::History;
use self::io::Fd;
use self::job::JobList;
use self::job::Pid;
use self::job::ProcessState;
use self::option::Interactive;
use self::option::Monitor;
use self::option::OptionSet;
use self::semantics::ExitStatus;
use self::system::Errno;
use self::system::Mode;
use self::system::OFlag;
use self::system::Signal;
use self::system::SignalHandling;
pub use self::system::System;
use self::system::SystemEx as _;
use self::system::WaitMode;
pub use self::system::real::RealSystem;
pub use self::system::r#virtual::VirtualSystem;
use self::variable::VariableSet;
use posh_syntax::source::Location;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::ControlFlow::{Break, Continue};

/// Whole shell execution environment.
///
/// The shell execution environment consists of application-managed parts and
/// system-managed parts. Application-managed parts are directly implemented in
/// the `Env` instance. System-managed parts are managed by a boxed
/// [`System`] instance.
///
/// `Env` does not implement `Clone` because the system cannot be cloned. Use
/// [`clone_with_system`](Self::clone_with_system) to make a copy for a
/// subshell.
#[derive(Debug)]
pub struct Env {
    /// Name of the shell or the script, used as `$0` and in error messages
    pub arg0: String,

    /// Built-in utilities available in the environment
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command
    pub exit_status: ExitStatus,

    /// Command lines entered in the interactive shell
    pub history: History,

    /// Jobs managed in the environment
    pub jobs: JobList,

    /// Process ID of the main shell process
    ///
    /// This process ID identifies the shell process that started running
    /// first. It is the value of the `$` special parameter, even in
    /// subshells.
    pub main_pid: Pid,

    /// Process group ID of the main shell process
    ///
    /// The shell returns the terminal to this process group after a
    /// foreground job stops or finishes.
    pub main_pgid: Pid,

    /// Shell option settings
    pub options: OptionSet,

    /// File descriptor to the controlling terminal
    ///
    /// [`get_tty`](Self::get_tty) caches the FD in this field.
    pub tty: Option<Fd>,

    /// Variables and positional parameters defined in the environment
    pub variables: VariableSet,

    /// Signal handlings in effect before the shell changed them
    original_signal_handlings: HashMap<Signal, SignalHandling>,

    /// Interface to the system-managed parts of the environment
    pub system: Box<dyn System>,
}

impl Env {
    /// Creates a new environment with the given system.
    ///
    /// Members of the new environments are default-constructed except that:
    /// - `arg0` is `"posh"`,
    /// - `main_pid` is initialized as `system.getpid()`,
    /// - `main_pgid` is initialized as `system.getpgrp()`, and
    /// - `system` is initialized as the given system.
    #[must_use]
    pub fn with_system(system: Box<dyn System>) -> Env {
        Env {
            arg0: "posh".to_owned(),
            builtins: HashMap::new(),
            exit_status: ExitStatus::default(),
            history: History::default(),
            jobs: JobList::default(),
            main_pid: system.getpid(),
            main_pgid: system.getpgrp(),
            options: OptionSet::empty(),
            tty: None,
            variables: VariableSet::new(),
            original_signal_handlings: HashMap::new(),
            system,
        }
    }

    /// Creates a new environment with a default-constructed [`VirtualSystem`].
    #[must_use]
    pub fn new_virtual() -> Env {
        Env::with_system(Box::new(VirtualSystem::default()))
    }

    /// Clones this environment.
    ///
    /// The application-managed parts of the environment are cloned normally.
    /// The system-managed parts are replaced with the provided `System`
    /// instance.
    #[must_use]
    pub fn clone_with_system(&self, system: Box<dyn System>) -> Env {
        Env {
            arg0: self.arg0.clone(),
            builtins: self.builtins.clone(),
            exit_status: self.exit_status,
            history: self.history.clone(),
            jobs: self.jobs.clone(),
            main_pid: self.main_pid,
            main_pgid: self.main_pgid,
            options: self.options,
            tty: self.tty,
            variables: self.variables.clone(),
            original_signal_handlings: self.original_signal_handlings.clone(),
            system,
        }
    }

    /// Whether the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.options.contains(Interactive)
    }

    /// Whether the shell is performing job control.
    ///
    /// Job control puts each job in its own process group and moves the
    /// terminal foreground between jobs and the shell.
    #[must_use]
    pub fn controls_jobs(&self) -> bool {
        self.options.contains(Monitor)
    }

    /// Returns a file descriptor to the controlling terminal.
    ///
    /// This function returns `self.tty` if it is `Some` FD. Otherwise, it
    /// opens `/dev/tty` and saves the new FD to `self.tty` before returning it.
    /// The FD is moved to [`MIN_INTERNAL_FD`](io::MIN_INTERNAL_FD) or above
    /// and has the close-on-exec flag set.
    pub fn get_tty(&mut self) -> Result<Fd, Errno> {
        if let Some(fd) = self.tty {
            return Ok(fd);
        }

        let fd = self.system.open(
            c"/dev/tty",
            OFlag::O_RDWR | OFlag::O_CLOEXEC | OFlag::O_NOCTTY,
            Mode::empty(),
        )?;
        let fd = self.system.move_fd_internal(fd)?;
        self.tty = Some(fd);
        Ok(fd)
    }

    /// Makes the shell ignore the signal.
    ///
    /// The handling in effect before the first call for the signal is
    /// remembered so that [`restore_signals`](Self::restore_signals) can reset
    /// it in subshells.
    pub fn ignore_signal(&mut self, signal: Signal) -> Result<(), Errno> {
        let old = self.system.sigaction(signal, SignalHandling::Ignore)?;
        self.original_signal_handlings.entry(signal).or_insert(old);
        Ok(())
    }

    /// Returns the signals the shell has made ignored by
    /// [`ignore_signal`](Self::ignore_signal).
    pub fn ignored_signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.original_signal_handlings.keys().copied()
    }

    /// Restores the signal handlings changed by
    /// [`ignore_signal`](Self::ignore_signal).
    ///
    /// Errors are ignored.
    pub fn restore_signals(&mut self) {
        for (signal, handling) in std::mem::take(&mut self.original_signal_handlings) {
            let _ = self.system.sigaction(signal, handling);
        }
    }

    /// Waits for the child process to change its state.
    ///
    /// This function blocks until the process specified by `target` stops or
    /// terminates and returns its new state. The state is also recorded in
    /// the job list.
    pub fn wait_for_subshell(&mut self, target: Pid) -> Result<ProcessState, Errno> {
        loop {
            if let Some((pid, state)) = self.system.wait(Some(target), WaitMode::Block)? {
                self.jobs.update_status(pid, state);
                tracing::trace!(?pid, ?state, "waited for child");
                return Ok(state);
            }
        }
    }

    /// Applies the result of command execution to the exit status.
    ///
    /// If the result is a `Break` with an exit status, the status is stored
    /// in `self.exit_status`. Otherwise, the exit status is not modified.
    pub fn apply_result(&mut self, result: semantics::Result) {
        match result {
            Continue(()) => (),
            Break(divert) => {
                if let Some(exit_status) = divert.exit_status() {
                    self.exit_status = exit_status;
                }
            }
        }
    }

    /// Prints an error message to the standard error.
    ///
    /// The message is prefixed with the shell name. Any errors that may
    /// happen writing to the standard error are ignored.
    pub fn print_error<M: Display>(&mut self, message: M) {
        let message = format!("{}: {}\n", self.arg0, message);
        let _ = self.system.write_all(Fd::STDERR, message.as_bytes());
    }

    /// Prints an error message about the source code at the location.
    ///
    /// A non-interactive shell includes the line number in the message.
    pub fn print_error_at<M: Display>(&mut self, location: &Location, message: M) {
        if self.is_interactive() {
            self.print_error(message)
        } else {
            self.print_error(format_args!("{location}: {message}"))
        }
    }

    /// Prints an error message for the given `errno`.
    ///
    /// This function prints `"{arg0}: {message}: {description}"` where the
    /// description is given by [`Errno::desc`].
    pub fn print_system_error<M: Display>(&mut self, errno: Errno, message: M) {
        self.print_error(format_args!("{}: {}", message, errno.desc()))
    }
}
