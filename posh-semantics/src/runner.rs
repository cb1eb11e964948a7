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

//! Implementation of the read-eval loop

use crate::Handle as _;
use crate::command::Command as _;
use crate::job::reap_jobs;
use posh_env::Env;
use posh_env::input::{Context, Input};
use posh_env::option::ErrExit;
use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_syntax::parser::parse;
use posh_syntax::token::CommandLine;
use posh_syntax::tokenizer::Tokenizer;
use std::ops::ControlFlow::{Break, Continue};

/// Reads and executes commands until the input ends.
///
/// The loop feeds each line read from `input` to a [`Tokenizer`] and executes
/// every command line as soon as the tokenizer completes it. Before reading
/// the first line of a command line, finished background jobs are
/// [reaped](reap_jobs). The input is told whether the line is the first line
/// of a command line so that it can show the right prompt.
///
/// A syntax error is [handled](crate::Handle): an interactive shell goes on
/// to the next command line, while the loop returns
/// `Break(Divert::Exit(Some(ExitStatus::SYNTAX_ERROR)))` in a non-interactive
/// shell. A `Divert::Interrupt` abandons the current command line only. A
/// `Divert::Abort` ends the loop unless the shell is interactive. A
/// `Divert::Exit` always ends the loop and is returned.
///
/// A non-interactive shell with the `ErrExit` option also ends the loop when
/// an interrupted command line leaves a non-zero exit status.
pub fn read_eval_loop(env: &mut Env, input: &mut dyn Input) -> Result {
    let mut tokenizer = Tokenizer::new();
    loop {
        if tokenizer.is_complete() {
            reap_jobs(env);
        }

        let context = Context::new(tokenizer.is_complete());
        let line = match input.next_line(env, &context) {
            Ok(line) => line,
            Err(errno) => {
                env.print_system_error(errno, "cannot read commands");
                return Break(Divert::Exit(Some(ExitStatus::ERROR)));
            }
        };

        if line.is_empty() {
            return match tokenizer.finish() {
                Ok(Some(command_line)) => run_command_line(env, &command_line),
                Ok(None) => Continue(()),
                Err(error) => error.handle(env),
            };
        }

        for command_line in tokenizer.feed(&line) {
            run_command_line(env, &command_line)?;
        }
    }
}

fn run_command_line(env: &mut Env, command_line: &CommandLine) -> Result {
    if env.is_interactive() {
        env.history.add(&command_line.text);
    }
    let list = match parse(command_line) {
        Ok(list) => list,
        Err(error) => return error.handle(env),
    };

    tracing::debug!(location = %command_line.location, %list, "executing command line");
    match list.execute(env) {
        Continue(()) => Continue(()),
        Break(Divert::Interrupt(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            if !env.is_interactive()
                && env.options.contains(ErrExit)
                && !env.exit_status.is_successful()
            {
                return Break(Divert::Exit(None));
            }
            Continue(())
        }
        Break(Divert::Abort(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            if env.is_interactive() {
                Continue(())
            } else {
                Break(Divert::Exit(exit_status))
            }
        }
        Break(divert @ Divert::Exit(_)) => Break(divert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_env;
    use posh_env::input::Memory;
    use posh_env::option::Interactive;
    use posh_env_test_helper::{assert_stderr, assert_stdout};

    #[test]
    fn commands_run_in_order() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo a\necho b; echo c\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a\nb\nc\n"));
    }

    #[test]
    fn last_line_without_newline_runs() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo last");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "last\n"));
    }

    #[test]
    fn quotation_spans_lines() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo 'a\nb'\n");
        let _ = read_eval_loop(&mut env, &mut input);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a\nb\n"));
    }

    #[test]
    fn exit_status_of_empty_input() {
        let (mut env, _state) = test_env();
        let mut input = Memory::new("");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn syntax_error_exits_non_interactive_shell() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo a\n| echo x\necho b\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus::SYNTAX_ERROR))));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a\n"));
    }

    #[test]
    fn unclosed_quote_at_end_of_input() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo 'oops\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus::SYNTAX_ERROR))));
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn interactive_shell_survives_syntax_error() {
        let (mut env, state) = test_env();
        env.options.insert(Interactive);
        let mut input = Memory::new("echo a |\necho b\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "b\n"));
    }

    #[test]
    fn expansion_error_abandons_only_its_pipeline() {
        let (mut env, state) = test_env();
        let mut input = Memory::new("echo ${x; echo st=$?\necho ok\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "st=2\nok\n"));
    }

    #[test]
    fn errexit_ends_loop_on_expansion_error() {
        let (mut env, state) = test_env();
        env.options.insert(ErrExit);
        let mut input = Memory::new("echo ${x\necho not reached\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Break(Divert::Exit(None)));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn exit_divert_ends_loop() {
        let (mut env, state) = test_env();
        env.options.insert(ErrExit);
        let mut input = Memory::new("false\necho not reached\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Break(Divert::Exit(None)));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn interactive_shell_records_history() {
        let (mut env, _state) = test_env();
        env.options.insert(Interactive);
        let mut input = Memory::new("echo 1\n\necho 'x\ny'\n");
        let _ = read_eval_loop(&mut env, &mut input);
        let entries = env.history.iter().map(|(_, line)| line).collect::<Vec<_>>();
        assert_eq!(entries, ["echo 1", "echo 'x\ny'"]);
    }

    #[test]
    fn finished_background_job_is_reported_before_next_line() {
        let (mut env, state) = test_env();
        env.options.insert(Interactive);
        let mut input = Memory::new("true &\necho next\n");
        let result = read_eval_loop(&mut env, &mut input);
        assert_eq!(result, Continue(()));
        assert!(env.jobs.is_empty());
        let pid = env.jobs.last_async_pid().unwrap();
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, format!("[1] {pid}\n[1] Done true\n"))
        });
    }
}
