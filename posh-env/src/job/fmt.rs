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

//! Job report formatting
//!
//! An interactive shell reports the state of a job when the job is started in
//! the background, stopped, or found finished. To format a report, create a
//! [`Report`] and use its `Display` implementation:
//!
//! ```
//! use posh_env::job::{Job, Pid, ProcessState};
//! use posh_env::job::fmt::Report;
//! use posh_env::semantics::ExitStatus;
//! let mut job = Job::new(Pid::from_raw(123));
//! job.name = "sleep 10".to_string();
//! job.processes.push((Pid::from_raw(123), ProcessState::Exited(ExitStatus(0))));
//! let report = Report { number: 2, job: &job };
//! assert_eq!(report.to_string(), "[2] Done sleep 10");
//! ```

use super::Job;
use super::ProcessState;
use crate::semantics::ExitStatus;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Formats a process state into a string.
///
/// Process states are formatted as follows:
///
/// - `Running` for a running process
/// - `Stopped` for a stopped process
/// - `Done` for a process that exited with exit status 0
/// - `Done(…)` for a process that exited with a non-zero exit status where
///   `…` is the exit status
/// - `Killed(SIG…)` for a process that was terminated by the signal `SIG…`
///   without a core dump
/// - `Killed(SIG…: core dumped)` for a process that was terminated by the
///   signal `SIG…` with a core dump
impl Display for ProcessState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Running => "Running".fmt(f),
            Self::Stopped(_) => "Stopped".fmt(f),
            Self::Exited(ExitStatus::SUCCESS) => "Done".fmt(f),
            Self::Exited(exit_status) => write!(f, "Done({exit_status})"),
            Self::Signaled {
                signal,
                core_dump: false,
            } => write!(f, "Killed({signal})"),
            Self::Signaled {
                signal,
                core_dump: true,
            } => write!(f, "Killed({signal}: core dumped)"),
        }
    }
}

/// Job report
///
/// The report shows the job number, the state of the job, and the job name.
/// The state is that of the last process of the pipeline, except that a
/// stopped job is always shown as `Stopped`.
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    /// Job number
    pub number: usize,
    /// Job to report
    pub job: &'a Job,
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let state = if self.job.is_stopped() {
            "Stopped".to_owned()
        } else {
            self.job
                .last_process_state()
                .unwrap_or(ProcessState::Running)
                .to_string()
        };
        write!(f, "[{}] {} {}", self.number, state, self.job.name)
    }
}

/// Report printed when a job is started in the background
///
/// The report shows the job number and the process group ID, like `[1] 1234`.
#[derive(Clone, Copy, Debug)]
pub struct StartReport<'a> {
    /// Job number
    pub number: usize,
    /// Started job
    pub job: &'a Job,
}

impl Display for StartReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[{}] {}", self.number, self.job.pgid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Pid;
    use nix::sys::signal::Signal;

    #[test]
    fn process_state_display() {
        assert_eq!(ProcessState::Running.to_string(), "Running");
        assert_eq!(ProcessState::Exited(ExitStatus(0)).to_string(), "Done");
        assert_eq!(ProcessState::Exited(ExitStatus(3)).to_string(), "Done(3)");
        let state = ProcessState::Signaled {
            signal: Signal::SIGTERM,
            core_dump: false,
        };
        assert_eq!(state.to_string(), "Killed(SIGTERM)");
        let state = ProcessState::Signaled {
            signal: Signal::SIGQUIT,
            core_dump: true,
        };
        assert_eq!(state.to_string(), "Killed(SIGQUIT: core dumped)");
    }

    #[test]
    fn stopped_job_report() {
        let mut job = Job::new(Pid::from_raw(42));
        job.name = "cat | less".to_string();
        job.processes = vec![
            (Pid::from_raw(42), ProcessState::Exited(ExitStatus(0))),
            (Pid::from_raw(43), ProcessState::Stopped(Signal::SIGTSTP)),
        ];
        let report = Report { number: 1, job: &job };
        assert_eq!(report.to_string(), "[1] Stopped cat | less");
    }

    #[test]
    fn start_report() {
        let job = Job::new(Pid::from_raw(1234));
        let report = StartReport { number: 3, job: &job };
        assert_eq!(report.to_string(), "[3] 1234");
    }
}
