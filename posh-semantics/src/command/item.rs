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

//! Implementation of the item semantics
//!
//! An item is an and-or list optionally followed by `&`. An asynchronous item
//! that consists of a single pipeline starts the pipeline as a background
//! job. An asynchronous and-or list with more pipelines runs as a whole in a
//! subshell, which forms one background job.

use super::Command;
use super::pipeline::start_in_background;
use crate::job::{running_job, start_background};
use posh_env::Env;
use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::subshell::{JobControl, Subshell};
use posh_syntax::syntax::{AndOrList, Item};
use std::ops::ControlFlow::Break;

impl Command for Item {
    fn execute(&self, env: &mut Env) -> Result {
        if !self.is_async {
            return self.and_or.execute(env);
        }
        if self.and_or.rest.is_empty() {
            return start_in_background(env, &self.and_or.first);
        }
        start_and_or_in_background(env, &self.and_or)
    }
}

fn start_and_or_in_background(env: &mut Env, and_or: &AndOrList) -> Result {
    let job_control = env.controls_jobs().then_some(JobControl::Background);
    let and_or_2 = and_or.clone();
    let subshell = Subshell::new(move |env: &mut Env| and_or_2.execute(env))
        .job_control(job_control)
        .ignore_sigint_sigquit(job_control.is_none());
    let pid = match subshell.start(env) {
        Ok(pid) => pid,
        Err(errno) => {
            env.print_system_error(errno, "cannot start a child process");
            return Break(Divert::Abort(Some(ExitStatus::ERROR)));
        }
    };

    match running_job(&[pid], job_control.is_some(), and_or.to_string()) {
        Some(job) => start_background(env, job),
        None => Break(Divert::Interrupt(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{parse_item, test_env};
    use posh_env::job::JobState;
    use posh_env::option::Monitor;
    use posh_env_test_helper::{assert_stdout, stub_tty};
    use std::ops::ControlFlow::Continue;

    #[test]
    fn synchronous_item_runs_and_or_list() {
        let (mut env, state) = test_env();
        let result = parse_item("echo sync").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert!(env.jobs.is_empty());
        assert_stdout(&state, |stdout| assert_eq!(stdout, "sync\n"));
    }

    #[test]
    fn asynchronous_pipeline_becomes_job() {
        let (mut env, _state) = test_env();
        env.exit_status = ExitStatus(1);
        let result = parse_item("sleep 5 &").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.jobs.len(), 1);
        assert!(env.jobs.last_async_pid().is_some());
    }

    #[test]
    fn asynchronous_and_or_list_runs_in_one_subshell() {
        let (mut env, state) = test_env();
        stub_tty(&state);
        env.options.insert(Monitor);
        let result = parse_item("true && echo async &").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "async\n"));

        assert_eq!(env.jobs.len(), 1);
        let (_, job) = env.jobs.iter().next().unwrap();
        assert_eq!(job.state(), JobState::Backgrounded);
        assert_eq!(job.processes.len(), 1);
        assert_eq!(job.name, "true && echo async");
        assert_ne!(job.pgid, env.main_pgid);
        assert_eq!(state.borrow().foreground, Some(env.main_pgid));
    }
}
