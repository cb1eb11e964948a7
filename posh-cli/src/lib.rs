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

//! This is an internal library crate for the posh shell. It is not intended
//! to be used as a library by other crates.
//!
//! The entry point for the shell is the [`main`] function, which is to be used
//! as the `main` function in the binary crate. The function sets up the shell
//! environment and runs the main read-eval loop.
//!
//! Set the `POSH_LOG` environment variable to a [`tracing_subscriber`] filter
//! directive such as `debug` or `posh_semantics=trace` to see the internal
//! log on the standard error.

pub mod startup;

use self::startup::configure_environment;
use self::startup::input::prepare_input;
use posh_env::Env;
use posh_env::RealSystem;
use posh_env::semantics::ExitStatus;
use posh_env::system::{Signal, SignalHandling};
use posh_semantics::read_eval_loop;
use tracing_subscriber::EnvFilter;

/// Name of the environment variable that configures logging
pub const LOG_ENV_VAR: &str = "POSH_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_as_shell_process(env: &mut Env) {
    let args = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    if let Some(arg0) = args.first() {
        env.arg0.clone_from(arg0);
    }

    let run = match startup::args::parse(args) {
        Ok(run) => run,
        Err(error) => {
            env.print_error(error);
            env.exit_status = ExitStatus::ERROR;
            return;
        }
    };

    let vars = std::env::vars_os().filter_map(|(name, value)| {
        let name = name.into_string().ok()?;
        let value = value.into_string().ok()?;
        Some((name, value))
    });
    env.variables.extend_env(vars);

    let source = configure_environment(env, run);

    let mut input = match prepare_input(env, &source) {
        Ok(input) => input,
        Err(error) => {
            env.print_error(&error);
            env.exit_status = error.exit_status();
            return;
        }
    };

    let result = read_eval_loop(env, &mut *input);
    env.apply_result(result);
}

/// Runs the shell and exits the process.
pub fn main() -> ! {
    init_logging();

    // SAFETY: `main` runs once per process and no other code creates a
    // RealSystem.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(Box::new(system));

    // Rust sets SIGPIPE to SIG_IGN before `main`, which children would inherit.
    if let Err(errno) = env.system.sigaction(Signal::SIGPIPE, SignalHandling::Default) {
        tracing::warn!(%errno, "cannot reset SIGPIPE");
    }

    run_as_shell_process(&mut env);
    tracing::debug!(exit_status = %env.exit_status, "exiting");
    std::process::exit(env.exit_status.0)
}
