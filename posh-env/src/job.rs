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

//! Type definitions for job management.
//!
//! A [`Job`] is a pipeline run by the shell, identified by the process group
//! its processes belong to. The [`JobList`] in [`Env::jobs`](crate::Env::jobs)
//! keeps every job that has been started and not yet reaped. Jobs are
//! numbered from 1; a number is reused after its job has been removed.
//!
//! The life cycle of a job is an explicit state machine, [`JobState`]:
//!
//! ```text
//! Building -> Running -> ForegroundWait -> Reaped
//!                    \         |    ^
//!                     \        v    |
//!                      \    Stopped-+
//!                       \      ^    |
//!                        \     |    v
//!                         +-> Backgrounded -> Reaped
//! ```
//!
//! A job is `Building` while its processes are being spawned and `Running`
//! once all of them have started. It then either waits in the foreground or
//! is put in the background. A stopped job stays in the list until it
//! terminates.

pub mod fmt;

use crate::semantics::ExitStatus;
use nix::sys::signal::Signal;
#[doc(no_inline)]
pub use nix::unistd::Pid;
use std::collections::BTreeMap;
use thiserror::Error;

/// Execution state of a process
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProcessState {
    /// The process is running.
    Running,
    /// The process has been stopped by a signal.
    Stopped(Signal),
    /// The process has exited.
    Exited(ExitStatus),
    /// The process has been terminated by a signal.
    Signaled { signal: Signal, core_dump: bool },
}

impl ProcessState {
    /// Whether the process is not yet terminated.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match self {
            ProcessState::Running | ProcessState::Stopped(_) => true,
            ProcessState::Exited(_) | ProcessState::Signaled { .. } => false,
        }
    }

    /// Whether the process is stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, ProcessState::Stopped(_))
    }

    /// Converts the state into the exit status the shell reports for it.
    ///
    /// A process stopped or terminated by a signal yields `128 + signal`.
    /// Returns `None` for a running process.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match *self {
            ProcessState::Running => None,
            ProcessState::Exited(exit_status) => Some(exit_status),
            ProcessState::Stopped(signal) | ProcessState::Signaled { signal, .. } => {
                Some(ExitStatus::from(signal))
            }
        }
    }
}

/// Stage in the life cycle of a job
///
/// See the [module documentation](self) for the allowed transitions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JobState {
    /// Processes are being spawned.
    Building,
    /// All processes have been spawned.
    Running,
    /// The shell is waiting for the job in the foreground.
    ForegroundWait,
    /// The job runs in the background.
    Backgrounded,
    /// The job has been stopped by a signal.
    Stopped,
    /// The job has terminated and left the job list.
    ///
    /// For a foreground job, only the last process is known to have
    /// terminated. The other processes are reaped later without being tracked.
    Reaped,
}

/// Error returned by [`JobState::transition`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("invalid job state transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: JobState,
    pub to: JobState,
}

impl JobState {
    /// Computes the state after a transition.
    ///
    /// Returns an error if the transition from `self` to `to` is not allowed.
    pub fn transition(self, to: JobState) -> Result<JobState, InvalidTransition> {
        use JobState::*;
        let valid = matches!(
            (self, to),
            (Building, Running)
                | (Running, ForegroundWait | Backgrounded | Reaped)
                | (ForegroundWait, Reaped | Stopped)
                | (Backgrounded, Reaped | Stopped)
                | (Stopped, Backgrounded | ForegroundWait | Reaped)
        );
        if valid {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

/// Set of processes executing a pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process group ID
    ///
    /// If the job is not job-controlled, this is the process ID of the first
    /// process.
    pub pgid: Pid,

    /// Whether the job runs in its own process group
    pub job_controlled: bool,

    /// Processes of the job in the order of the pipeline
    pub processes: Vec<(Pid, ProcessState)>,

    /// String representation of the job, shown in job reports
    pub name: String,

    state: JobState,
}

impl Job {
    /// Creates a job in the `Building` state with no processes.
    #[must_use]
    pub fn new(pgid: Pid) -> Self {
        Job {
            pgid,
            job_controlled: false,
            processes: Vec::new(),
            name: String::new(),
            state: JobState::Building,
        }
    }

    /// Returns the current state of the job.
    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Moves the job to a new state.
    ///
    /// If the transition is not allowed, the state is unchanged and an error
    /// is returned.
    pub fn set_state(&mut self, to: JobState) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(to)?;
        tracing::debug!(pgid = %self.pgid, state = ?to, name = %self.name, "job state changed");
        Ok(())
    }

    /// Updates the state of a process in this job.
    ///
    /// Returns true if the job contains the process.
    pub fn update_process(&mut self, pid: Pid, state: ProcessState) -> bool {
        match self.processes.iter_mut().find(|(p, _)| *p == pid) {
            Some((_, process_state)) => {
                *process_state = state;
                true
            }
            None => false,
        }
    }

    /// Whether all the processes have terminated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.processes.iter().all(|(_, state)| !state.is_alive())
    }

    /// Whether the job has been stopped.
    ///
    /// A job is stopped if no process is running and at least one process is
    /// stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.processes.iter().any(|(_, state)| state.is_stopped())
            && self
                .processes
                .iter()
                .all(|(_, state)| *state != ProcessState::Running)
    }

    /// Returns the state of the last process of the pipeline.
    #[must_use]
    pub fn last_process_state(&self) -> Option<ProcessState> {
        self.processes.last().map(|&(_, state)| state)
    }

    /// Returns the signal that stopped the job, if any.
    #[must_use]
    pub fn stop_signal(&self) -> Option<Signal> {
        self.processes.iter().find_map(|(_, state)| match state {
            ProcessState::Stopped(signal) => Some(*signal),
            _ => None,
        })
    }
}

/// Collection of jobs
///
/// Each job is identified by a job number that starts from 1. When a job is
/// added, it gets the smallest number that is not in use.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobList {
    jobs: BTreeMap<usize, Job>,
    last_async_pid: Option<Pid>,
}

impl JobList {
    /// Adds a job and returns its job number.
    pub fn add(&mut self, job: Job) -> usize {
        let number = (1..)
            .find(|n| !self.jobs.contains_key(n))
            .unwrap_or(usize::MAX);
        self.jobs.insert(number, job);
        number
    }

    /// Returns the job with the given number.
    #[must_use]
    pub fn get(&self, number: usize) -> Option<&Job> {
        self.jobs.get(&number)
    }

    /// Returns the job with the given number.
    #[must_use]
    pub fn get_mut(&mut self, number: usize) -> Option<&mut Job> {
        self.jobs.get_mut(&number)
    }

    /// Removes the job with the given number.
    pub fn remove(&mut self, number: usize) -> Option<Job> {
        self.jobs.remove(&number)
    }

    /// Iterates over the jobs in the order of job numbers.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().map(|(number, job)| (*number, job))
    }

    /// Returns the number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether there is no job.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Returns the number of the job that contains the process.
    #[must_use]
    pub fn find_by_pid(&self, pid: Pid) -> Option<usize> {
        self.jobs
            .iter()
            .find(|(_, job)| job.processes.iter().any(|(p, _)| *p == pid))
            .map(|(number, _)| *number)
    }

    /// Updates the state of a process.
    ///
    /// Returns the number of the job containing the process, or `None` if no
    /// job contains it.
    pub fn update_status(&mut self, pid: Pid, state: ProcessState) -> Option<usize> {
        let number = self.find_by_pid(pid)?;
        let job = self.jobs.get_mut(&number)?;
        job.update_process(pid, state);
        Some(number)
    }

    /// Returns the process ID of the most recently started asynchronous
    /// command (`$!`).
    #[must_use]
    pub fn last_async_pid(&self) -> Option<Pid> {
        self.last_async_pid
    }

    /// Sets the process ID of the most recently started asynchronous command.
    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn job_with_processes(pids: &[i32]) -> Job {
        let mut job = Job::new(Pid::from_raw(pids[0]));
        job.processes = pids
            .iter()
            .map(|&pid| (Pid::from_raw(pid), ProcessState::Running))
            .collect();
        job
    }

    #[test]
    fn valid_transitions() {
        use JobState::*;
        assert_eq!(Building.transition(Running), Ok(Running));
        assert_eq!(Running.transition(ForegroundWait), Ok(ForegroundWait));
        assert_eq!(Running.transition(Backgrounded), Ok(Backgrounded));
        assert_eq!(ForegroundWait.transition(Stopped), Ok(Stopped));
        assert_eq!(ForegroundWait.transition(Reaped), Ok(Reaped));
        assert_eq!(Stopped.transition(Backgrounded), Ok(Backgrounded));
        assert_eq!(Backgrounded.transition(Reaped), Ok(Reaped));
    }

    #[test]
    fn invalid_transitions() {
        use JobState::*;
        assert_matches!(
            Building.transition(ForegroundWait),
            Err(InvalidTransition { from: Building, to: ForegroundWait })
        );
        assert!(Reaped.transition(Running).is_err());
        assert!(Backgrounded.transition(ForegroundWait).is_err());
        assert!(Running.transition(Stopped).is_err());
    }

    #[test]
    fn job_set_state_keeps_state_on_error() {
        let mut job = Job::new(Pid::from_raw(10));
        assert!(job.set_state(JobState::Reaped).is_err());
        assert_eq!(job.state(), JobState::Building);
        job.set_state(JobState::Running).unwrap();
        assert_eq!(job.state(), JobState::Running);
    }

    #[test]
    fn process_state_exit_status() {
        assert_eq!(ProcessState::Running.exit_status(), None);
        assert_eq!(
            ProcessState::Exited(ExitStatus(3)).exit_status(),
            Some(ExitStatus(3))
        );
        let state = ProcessState::Signaled {
            signal: Signal::SIGKILL,
            core_dump: false,
        };
        assert_eq!(state.exit_status(), Some(ExitStatus(137)));
        assert_eq!(
            ProcessState::Stopped(Signal::SIGTSTP).exit_status(),
            Some(ExitStatus::from(Signal::SIGTSTP))
        );
    }

    #[test]
    fn job_finished_and_stopped() {
        let mut job = job_with_processes(&[10, 11]);
        assert!(!job.is_finished());
        assert!(!job.is_stopped());

        job.update_process(Pid::from_raw(10), ProcessState::Exited(ExitStatus(0)));
        job.update_process(Pid::from_raw(11), ProcessState::Stopped(Signal::SIGTSTP));
        assert!(!job.is_finished());
        assert!(job.is_stopped());
        assert_eq!(job.stop_signal(), Some(Signal::SIGTSTP));

        job.update_process(Pid::from_raw(11), ProcessState::Exited(ExitStatus(1)));
        assert!(job.is_finished());
        assert_eq!(
            job.last_process_state(),
            Some(ProcessState::Exited(ExitStatus(1)))
        );
    }

    #[test]
    fn job_numbers_are_reused() {
        let mut list = JobList::default();
        let first = list.add(job_with_processes(&[10]));
        let second = list.add(job_with_processes(&[20]));
        assert_eq!((first, second), (1, 2));

        list.remove(1);
        assert_eq!(list.add(job_with_processes(&[30])), 1);
        assert_eq!(list.add(job_with_processes(&[40])), 3);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn update_status_finds_job() {
        let mut list = JobList::default();
        list.add(job_with_processes(&[10, 11]));
        let number = list.add(job_with_processes(&[20]));

        let state = ProcessState::Exited(ExitStatus(0));
        assert_eq!(list.update_status(Pid::from_raw(20), state), Some(number));
        assert!(list.get(number).unwrap().is_finished());
        assert_eq!(list.update_status(Pid::from_raw(99), state), None);
    }
}
