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

//! Utility for starting subshells
//!
//! This module defines [`Subshell`], a builder for starting a subshell. It is
//! [constructed](Subshell::new) with a function you want to run in a subshell.
//! After configuring the builder with some options, you can
//! [start](Subshell::start) the subshell.
//!
//! [`Subshell`] is implemented as a wrapper around
//! [`System::new_child_process`](crate::System::new_child_process). You should
//! prefer `Subshell` for the purpose of creating a subshell because it helps
//! to arrange the child process properly.

use crate::Env;
use crate::job::JobList;
use crate::job::Pid;
use crate::option::Interactive;
use crate::option::Monitor;
use crate::system::ChildProcessTask;
use crate::system::Errno;
use crate::system::SigSet;
use crate::system::SigmaskHow;
use crate::system::Signal;
use crate::system::SignalHandling;
use crate::system::SystemEx as _;

/// Job state of a newly created subshell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobControl {
    /// The subshell becomes the foreground process group.
    Foreground,
    /// The subshell becomes a background process group.
    Background,
}

/// Subshell builder
///
/// See the [module documentation](self) for details.
#[must_use = "a subshell is not started unless you call `Subshell::start`"]
pub struct Subshell<F> {
    task: F,
    job_control: Option<JobControl>,
    process_group: Option<Pid>,
    ignores_sigint_sigquit: bool,
}

impl<F> std::fmt::Debug for Subshell<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subshell")
            .field("job_control", &self.job_control)
            .field("process_group", &self.process_group)
            .finish_non_exhaustive()
    }
}

impl<F> Subshell<F>
where
    F: FnOnce(&mut Env) -> crate::semantics::Result + 'static,
{
    /// Creates a new subshell builder with a task.
    ///
    /// The task will run in a subshell after it is started.
    /// If the task returns a `Break(Divert::...)` with an exit status, the
    /// status overrides the exit status in `Env`, which is the exit status of
    /// the subshell.
    pub fn new(task: F) -> Self {
        Subshell {
            task,
            job_control: None,
            process_group: None,
            ignores_sigint_sigquit: false,
        }
    }

    /// Specifies disposition of the subshell with respect to job control.
    ///
    /// If the argument is `None`, the subshell runs in the same process group
    /// as the parent process. If it is `Some(_)`, the subshell is put in the
    /// process group specified by [`process_group`](Self::process_group). For
    /// `JobControl::Foreground`, it also brings the group to the foreground.
    pub fn job_control<J: Into<Option<JobControl>>>(mut self, job_control: J) -> Self {
        self.job_control = job_control.into();
        self
    }

    /// Specifies the process group the subshell joins.
    ///
    /// If the argument is `None`, the subshell starts a new process group
    /// whose ID is the subshell's process ID. This setting is effective only
    /// if [`job_control`](Self::job_control) is `Some(_)`.
    pub fn process_group(mut self, pgid: Option<Pid>) -> Self {
        self.process_group = pgid;
        self
    }

    /// Makes the subshell ignore `SIGINT` and `SIGQUIT`.
    ///
    /// A shell without job control starts asynchronous commands this way so
    /// that they are not interrupted from the terminal.
    pub fn ignore_sigint_sigquit(mut self, ignore: bool) -> Self {
        self.ignores_sigint_sigquit = ignore;
        self
    }

    /// Starts a subshell.
    ///
    /// This function creates a new child process that runs the task contained
    /// in this builder. If the child was started successfully, this function
    /// returns the child's process ID. Otherwise, it returns an error.
    ///
    /// This function does not wait for the child to finish. To wait for the
    /// child, call [`Env::wait_for_subshell`].
    pub fn start(self, env: &mut Env) -> Result<Pid, Errno> {
        let tty = match self.job_control {
            None | Some(JobControl::Background) => None,
            // The shell keeps the terminal FD in `env.tty` across jobs.
            Some(JobControl::Foreground) => Some(env.get_tty()?),
        };

        let Subshell {
            task,
            job_control,
            process_group,
            ignores_sigint_sigquit,
        } = self;
        let me = Pid::from_raw(0);
        let pgid = process_group.unwrap_or(me);

        let task: ChildProcessTask = Box::new(move |env: &mut Env| {
            if job_control.is_some() && env.system.setpgid(me, pgid).is_ok() {
                if let Some(tty) = tty {
                    let pgid = env.system.getpgrp();
                    let _ = env.system.tcsetpgrp_with_block(tty, pgid);
                }
            }

            env.restore_signals();
            if ignores_sigint_sigquit {
                let _ = env.system.sigaction(Signal::SIGINT, SignalHandling::Ignore);
                let _ = env.system.sigaction(Signal::SIGQUIT, SignalHandling::Ignore);
            }
            let _ = env
                .system
                .sigmask(SigmaskHow::SIG_SETMASK, &SigSet::empty());

            env.jobs = JobList::default();
            env.options.remove(Interactive);
            env.options.remove(Monitor);

            let result = task(env);
            env.apply_result(result);
        });

        let child = env.system.new_child_process()?;
        let child_pid = child(env, task);

        if job_control.is_some() {
            // Both sides call setpgid. Later stages of a pipeline join this
            // group, so it must exist by the time `start` returns.
            let pgid = process_group.unwrap_or(child_pid);
            let _ = env.system.setpgid(child_pid, pgid);

            // Only the child moves the terminal to the new group. The shell
            // takes it back in the foreground wait.
        }

        tracing::debug!(pid = ?child_pid, ?job_control, ?process_group, "started subshell");
        Ok(child_pid)
    }
}
