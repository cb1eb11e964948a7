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

//! Utilities for job control
//!
//! The functions in this module move [`Job`]s through their
//! [life cycle](posh_env::job) and print the reports an interactive shell
//! shows to the user.

use posh_env::Env;
use posh_env::io::Fd;
use posh_env::job::fmt::{Report, StartReport};
use posh_env::job::{Job, JobState, Pid, ProcessState};
use posh_env::semantics::{Divert, ExitStatus};
use posh_env::system::{Signal, SystemEx as _, WaitMode};
use std::ops::ControlFlow::{Break, Continue};

/// Moves the job to a new state, logging an invalid transition.
pub fn transition(job: &mut Job, to: JobState) {
    if let Err(error) = job.set_state(to) {
        tracing::warn!(%error, pgid = %job.pgid, "ignored job state transition");
    }
}

/// Prints a report of the job to the standard error.
pub fn report(env: &mut Env, number: usize, job: &Job) {
    let report = format!("{}\n", Report { number, job });
    let _ = env.system.write_all(Fd::STDERR, report.as_bytes());
}

/// Creates a job in the `Running` state from the started processes.
///
/// The first process is the process group leader. Returns `None` if `pids`
/// is empty.
#[must_use]
pub fn running_job(pids: &[Pid], job_controlled: bool, name: String) -> Option<Job> {
    let &pgid = pids.first()?;
    let mut job = Job::new(pgid);
    job.job_controlled = job_controlled;
    job.name = name;
    job.processes = pids
        .iter()
        .map(|&pid| (pid, ProcessState::Running))
        .collect();
    transition(&mut job, JobState::Running);
    Some(job)
}

/// Waits for a job running in the foreground.
///
/// This function blocks until the last process of the job has terminated or
/// stopped. The other processes are not waited for. Their states are
/// discarded and the processes are reaped by a later [`reap_jobs`]. If the
/// job is job-controlled, the shell then takes back the terminal.
///
/// A terminated job is removed from the job list and the exit status of its
/// last process becomes `env.exit_status`. A job killed by a signal other than
/// `SIGPIPE` is reported in an interactive shell.
///
/// If the last process has stopped, the job is kept in the job list in the
/// `Stopped` state and the exit status is `128 + signal`. An interactive shell
/// reports the job and returns `Divert::Interrupt` to abandon the rest of the
/// command line.
pub fn wait_for_foreground(env: &mut Env, mut job: Job) -> crate::Result {
    transition(&mut job, JobState::ForegroundWait);
    let job_controlled = job.job_controlled;
    let Some(&(last_pid, _)) = job.processes.last() else {
        return Continue(());
    };
    let number = env.jobs.add(job);

    if let Err(errno) = env.wait_for_subshell(last_pid) {
        tracing::warn!(pid = %last_pid, %errno, "cannot wait for child process");
        env.jobs
            .update_status(last_pid, ProcessState::Exited(ExitStatus::ERROR));
    }

    if job_controlled {
        if let Some(tty) = env.tty {
            let pgid = env.main_pgid;
            match env.system.tcsetpgrp_with_block(tty, pgid) {
                Ok(()) => tracing::debug!(%pgid, "shell took back the terminal"),
                Err(errno) => tracing::warn!(%errno, "cannot take back the terminal"),
            }
        }
    }

    let Some(job) = env.jobs.get_mut(number) else {
        return Continue(());
    };
    if let Some(ProcessState::Stopped(signal)) = job.last_process_state() {
        transition(job, JobState::Stopped);
        let exit_status = ExitStatus::from(signal);
        env.exit_status = exit_status;
        if !env.is_interactive() {
            return Continue(());
        }
        if let Some(job) = env.jobs.get(number).cloned() {
            report(env, number, &job);
        }
        return Break(Divert::Interrupt(Some(exit_status)));
    }

    let Some(mut job) = env.jobs.remove(number) else {
        return Continue(());
    };
    let pending = job
        .processes
        .iter()
        .filter(|(_, state)| state.is_alive())
        .count();
    if pending > 0 {
        tracing::trace!(pgid = %job.pgid, pending, "leaving earlier stages to the reaper");
    }
    transition(&mut job, JobState::Reaped);
    let state = job.last_process_state();
    env.exit_status = state
        .and_then(|state| state.exit_status())
        .unwrap_or(ExitStatus::ERROR);
    if let Some(ProcessState::Signaled { signal, .. }) = state {
        if signal != Signal::SIGPIPE && env.is_interactive() {
            report(env, number, &job);
        }
    }
    Continue(())
}

/// Leaves a job running in the background.
///
/// The job is added to the job list and its last process becomes `$!`.
/// An interactive shell reports the job number and process group ID. The exit
/// status is zero.
pub fn start_background(env: &mut Env, mut job: Job) -> crate::Result {
    transition(&mut job, JobState::Backgrounded);
    if let Some(&(pid, _)) = job.processes.last() {
        env.jobs.set_last_async_pid(pid);
    }
    let number = env.jobs.add(job);
    if env.is_interactive() {
        if let Some(job) = env.jobs.get(number) {
            let report = format!("{}\n", StartReport { number, job });
            let _ = env.system.write_all(Fd::STDERR, report.as_bytes());
        }
    }
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}

/// Collects the states of terminated and stopped child processes without
/// blocking, and reaps the finished jobs.
///
/// Every job that has finished in the background is removed from the job
/// list. A background job that has been stopped moves to the `Stopped`
/// state. An interactive shell reports such jobs.
pub fn reap_jobs(env: &mut Env) {
    while let Ok(Some((pid, state))) = env.system.wait(None, WaitMode::NoHang) {
        let number = env.jobs.update_status(pid, state);
        tracing::trace!(%pid, ?state, ?number, "collected child state");
    }

    let changed = env
        .jobs
        .iter()
        .filter(|(_, job)| {
            job.is_finished() || (job.is_stopped() && job.state() == JobState::Backgrounded)
        })
        .map(|(number, _)| number)
        .collect::<Vec<_>>();
    for number in changed {
        let Some(job) = env.jobs.get_mut(number) else {
            continue;
        };
        if job.is_finished() {
            let Some(mut job) = env.jobs.remove(number) else {
                continue;
            };
            transition(&mut job, JobState::Reaped);
            if env.is_interactive() {
                report(env, number, &job);
            }
        } else {
            transition(job, JobState::Stopped);
            if env.is_interactive() {
                if let Some(job) = env.jobs.get(number).cloned() {
                    report(env, number, &job);
                }
            }
        }
    }
}
