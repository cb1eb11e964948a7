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

//! Implementation of the pipeline semantics
//!
//! A pipeline with one command runs the command as a
//! [simple command](super::simple_command). Otherwise, every command of the
//! pipeline runs in its own subshell. The standard output of each command is
//! connected to the standard input of the next by a pipe.
//!
//! All the commands are expanded before the first subshell starts, so an
//! expansion error abandons the pipeline before any process is created. The
//! exit status is then [`ExitStatus::ERROR`] and the shell goes on with the
//! next command.
//! The first subshell becomes the process group leader, and the others join
//! its group, if job control is active.

use super::Command;
use super::simple_command::{ExpandedCommand, run_in_child};
use crate::Handle as _;
use crate::job::{running_job, start_background, wait_for_foreground};
use itertools::Itertools as _;
use posh_env::Env;
use posh_env::io::Fd;
use posh_env::job::Job;
use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::subshell::{JobControl, Subshell};
use posh_env::system::{Errno, Mode, OFlag};
use posh_syntax::syntax::{Pipeline, SimpleCommand};
use std::ops::ControlFlow::{Break, Continue};

impl Command for Pipeline {
    /// Executes the pipeline in the foreground.
    ///
    /// The exit status of the pipeline is that of the last command.
    fn execute(&self, env: &mut Env) -> Result {
        match self.commands.as_slice() {
            [] => {
                env.exit_status = ExitStatus::SUCCESS;
                Continue(())
            }
            [command] => command.execute(env),
            commands => {
                let job_control = env.controls_jobs().then_some(JobControl::Foreground);
                match start_job(env, commands, job_control, false)? {
                    Some(job) => wait_for_foreground(env, job),
                    None => Continue(()),
                }
            }
        }
    }
}

/// Starts the pipeline as a background job.
///
/// Without job control, the commands ignore `SIGINT` and `SIGQUIT` and the
/// standard input of the first command is redirected to `/dev/null`.
pub fn start_in_background(env: &mut Env, pipeline: &Pipeline) -> Result {
    if pipeline.commands.is_empty() {
        env.exit_status = ExitStatus::SUCCESS;
        return Continue(());
    }
    let job_control = env.controls_jobs().then_some(JobControl::Background);
    match start_job(env, &pipeline.commands, job_control, true)? {
        Some(job) => start_background(env, job),
        None => Continue(()),
    }
}

fn start_job(
    env: &mut Env,
    commands: &[SimpleCommand],
    job_control: Option<JobControl>,
    background: bool,
) -> Result<Option<Job>> {
    let expanded = match commands
        .iter()
        .map(|command| ExpandedCommand::expand(env, command))
        .collect::<crate::expansion::Result<Vec<_>>>()
    {
        Ok(expanded) => expanded,
        Err(error) => {
            error.handle(env)?;
            return Continue(None);
        }
    };

    let detached = background && job_control.is_none();
    let mut pipes = PipeSet::default();
    let mut pids = Vec::with_capacity(expanded.len());
    let count = expanded.len();
    for (index, command) in expanded.into_iter().enumerate() {
        if let Err(errno) = pipes.shift(env, index + 1 < count) {
            pipes.close(env);
            env.print_system_error(errno, "cannot connect pipes in the pipeline");
            return Break(Divert::Abort(Some(ExitStatus::ERROR)));
        }

        let stage_pipes = pipes;
        let null_stdin = detached && index == 0;
        let subshell = Subshell::new(move |env: &mut Env| {
            if let Err(errno) = stage_pipes.move_to_stdin_stdout(env) {
                env.print_system_error(errno, "cannot connect pipes in the pipeline");
                return Break(Divert::Exit(Some(ExitStatus::ERROR)));
            }
            if null_stdin {
                connect_stdin_to_null(env);
            }
            run_in_child(env, command)
        })
        .job_control(job_control)
        .process_group(pids.first().copied())
        .ignore_sigint_sigquit(detached);

        match subshell.start(env) {
            Ok(pid) => pids.push(pid),
            Err(errno) => {
                pipes.close(env);
                env.print_system_error(errno, "cannot start a child process");
                return Break(Divert::Abort(Some(ExitStatus::ERROR)));
            }
        }
    }
    pipes.close(env);

    let name = commands.iter().join(" | ");
    Continue(running_job(&pids, job_control.is_some(), name))
}

fn connect_stdin_to_null(env: &mut Env) {
    if let Ok(fd) = env.system.open(c"/dev/null", OFlag::O_RDONLY, Mode::empty()) {
        if fd != Fd::STDIN {
            let _ = env.system.dup2(fd, Fd::STDIN);
            let _ = env.system.close(fd);
        }
    }
}

/// Pipe file descriptors held by the shell while starting a pipeline
#[derive(Clone, Copy, Debug, Default)]
struct PipeSet {
    /// Reading end of the pipe from the previous command
    read_previous: Option<Fd>,
    /// Reader and writer of the pipe to the next command
    next: Option<(Fd, Fd)>,
}

impl PipeSet {
    /// Updates the pipe set for the next command.
    ///
    /// Closes FDs that are no longer necessary and opens a new pipe if there is
    /// a next command.
    fn shift(&mut self, env: &mut Env, has_next: bool) -> std::result::Result<(), Errno> {
        if let Some(fd) = self.read_previous.take() {
            let _ = env.system.close(fd);
        }
        if let Some((reader, writer)) = self.next.take() {
            let _ = env.system.close(writer);
            self.read_previous = Some(reader);
        }
        if has_next {
            self.next = Some(env.system.pipe()?);
        }
        Ok(())
    }

    /// Closes all the FDs in the set.
    fn close(&mut self, env: &mut Env) {
        if let Some(fd) = self.read_previous.take() {
            let _ = env.system.close(fd);
        }
        if let Some((reader, writer)) = self.next.take() {
            let _ = env.system.close(reader);
            let _ = env.system.close(writer);
        }
    }

    /// Moves the pipe FDs to stdin/stdout and closes the FDs that are no longer
    /// necessary.
    fn move_to_stdin_stdout(mut self, env: &mut Env) -> std::result::Result<(), Errno> {
        if let Some((reader, writer)) = self.next {
            env.system.close(reader)?;
            if writer != Fd::STDOUT {
                if self.read_previous == Some(Fd::STDOUT) {
                    self.read_previous = Some(env.system.dup(Fd::STDOUT, Fd(0), false)?);
                }
                env.system.dup2(writer, Fd::STDOUT)?;
                env.system.close(writer)?;
            }
        }
        if let Some(reader) = self.read_previous {
            if reader != Fd::STDIN {
                env.system.dup2(reader, Fd::STDIN)?;
                env.system.close(reader)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{parse_pipeline, test_env};
    use posh_env::job::JobState;
    use posh_env::option::{Interactive, Monitor};
    use posh_env_test_helper::{assert_stderr, assert_stdout, set_stdin, stub_tty};

    #[test]
    fn empty_pipeline() {
        let (mut env, _state) = test_env();
        env.exit_status = ExitStatus(9);
        let pipeline = Pipeline { commands: vec![] };
        assert_eq!(pipeline.execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn output_flows_through_pipes() {
        let (mut env, state) = test_env();
        let result = parse_pipeline("echo piped text | cat | cat").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "piped text\n"));
    }

    #[test]
    fn exit_status_is_that_of_last_command() {
        let (mut env, _state) = test_env();
        let _ = parse_pipeline("false | true").execute(&mut env);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        let _ = parse_pipeline("true | false").execute(&mut env);
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }

    #[test]
    fn earlier_stages_are_left_to_reaper() {
        let (mut env, state) = test_env();
        let _ = parse_pipeline("true | true | true").execute(&mut env);
        assert!(env.jobs.is_empty());
        let unreaped = state
            .borrow()
            .processes
            .values()
            .filter(|process| process.state_has_changed())
            .count();
        assert_eq!(unreaped, 2);

        crate::job::reap_jobs(&mut env);
        for (pid, process) in &state.borrow().processes {
            if *pid != env.main_pid {
                assert!(!process.state_has_changed(), "{pid}");
                assert!(!process.state().is_alive(), "{pid}");
            }
        }
    }

    #[test]
    fn shell_closes_pipe_fds() {
        let (mut env, state) = test_env();
        let _ = parse_pipeline("true | true").execute(&mut env);
        let state = state.borrow();
        let shell = &state.processes[&env.main_pid];
        assert_eq!(shell.fds().keys().copied().max(), Some(Fd::STDERR));
    }

    #[test]
    fn pipeline_stages_join_first_process_group() {
        let (mut env, state) = test_env();
        stub_tty(&state);
        env.options.insert(Monitor);
        let _ = parse_pipeline("true | true | true").execute(&mut env);

        let state = state.borrow();
        let children = state
            .processes
            .iter()
            .filter(|(pid, _)| **pid != env.main_pid)
            .collect::<Vec<_>>();
        assert_eq!(children.len(), 3);
        let leader = *children[0].0;
        for (_, process) in children {
            assert_eq!(process.pgid(), leader);
        }
        assert_eq!(state.foreground, Some(env.main_pgid));
    }

    #[test]
    fn expansion_error_starts_no_process() {
        let (mut env, state) = test_env();
        let result = parse_pipeline("echo | echo ${oops").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(state.borrow().processes.len(), 1);
        assert!(env.jobs.is_empty());
    }

    #[test]
    fn expansion_error_in_background_pipeline_starts_no_job() {
        let (mut env, state) = test_env();
        let result = start_in_background(&mut env, &parse_pipeline("echo ${oops | cat"));
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(state.borrow().processes.len(), 1);
        assert_eq!(env.jobs.last_async_pid(), None);
    }

    #[test]
    fn background_pipeline_returns_immediately_with_zero() {
        let (mut env, _state) = test_env();
        env.exit_status = ExitStatus(4);
        let result = start_in_background(&mut env, &parse_pipeline("sleep 5"));
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.jobs.len(), 1);
        let (_, job) = env.jobs.iter().next().unwrap();
        assert_eq!(job.state(), JobState::Backgrounded);
        assert_eq!(job.name, "sleep 5");
        assert_eq!(env.jobs.last_async_pid(), Some(job.pgid));
    }

    #[test]
    fn background_job_does_not_take_terminal() {
        let (mut env, state) = test_env();
        stub_tty(&state);
        env.options.insert(Monitor);
        let _ = start_in_background(&mut env, &parse_pipeline("sleep 5 | cat"));
        let state = state.borrow();
        assert_eq!(state.foreground, Some(env.main_pgid));
        let (_, job) = env.jobs.iter().next().unwrap();
        assert!(job.job_controlled);
        assert_ne!(job.pgid, env.main_pgid);
    }

    #[test]
    fn background_without_job_control_reads_dev_null() {
        let (mut env, state) = test_env();
        set_stdin(&state, "from stdin\n");
        state
            .borrow_mut()
            .file_system
            .save(
                "/dev/null",
                std::rc::Rc::new(std::cell::RefCell::new(
                    posh_env::system::r#virtual::Inode::new(""),
                )),
            )
            .unwrap();
        let _ = start_in_background(&mut env, &parse_pipeline("cat"));
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn interactive_background_start_is_reported() {
        let (mut env, state) = test_env();
        env.options.insert(Interactive);
        let _ = start_in_background(&mut env, &parse_pipeline("true"));
        let pgid = env.jobs.get(1).unwrap().pgid;
        assert_stderr(&state, |stderr| assert_eq!(stderr, format!("[1] {pgid}\n")));
    }
}
