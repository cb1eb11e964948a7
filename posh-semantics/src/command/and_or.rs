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

//! Implementation of the and-or list semantics

use super::Command;
use posh_env::Env;
use posh_env::option::ErrExit;
use posh_env::semantics::{Divert, Result};
use posh_syntax::syntax::{AndOr, AndOrList};
use std::ops::ControlFlow::{Break, Continue};

impl Command for AndOrList {
    /// Executes the and-or list.
    ///
    /// The first pipeline always runs. A pipeline after `&&` runs only if the
    /// exit status is zero, and one after `||` only if it is non-zero. Once a
    /// pipeline is skipped, every remaining pipeline of the list is skipped
    /// too, and the exit status stays that of the last pipeline that ran.
    ///
    /// If the `ErrExit` option is set and the last pipeline ran and returned a
    /// non-zero exit status, this function returns `Divert::Exit(None)`.
    /// Pipelines other than the last never trigger the option.
    fn execute(&self, env: &mut Env) -> Result {
        self.first.execute(env)?;

        for (and_or, pipeline) in &self.rest {
            let success = env.exit_status.is_successful();
            let proceed = match and_or {
                AndOr::AndThen => success,
                AndOr::OrElse => !success,
            };
            if !proceed {
                return Continue(());
            }
            pipeline.execute(env)?;
        }

        if !env.exit_status.is_successful() && env.options.contains(ErrExit) {
            tracing::debug!(exit_status = %env.exit_status, "exiting on error");
            return Break(Divert::Exit(None));
        }
        Continue(())
    }
}
