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

//! Command line argument parser for the shell

use posh_env::option::{CmdLine, Login, OptionSet, ShellOption, Stdin, parse_short};
use std::iter::Peekable;
use thiserror::Error;

/// Input to the main read-eval loop
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Source {
    /// Read from standard input (the `-s` option or no operand)
    #[default]
    Stdin,
    /// Read from a script file (the first operand)
    File { path: String },
    /// Read from a string (the `-c` option)
    String(String),
}

/// Configuration for starting the main read-eval loop
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Run {
    /// Input source
    pub source: Source,
    /// Shell options specified on the command line
    pub options: OptionSet,
    /// Value of the special parameter `0` and the name in error messages
    pub arg0: String,
    /// Positional parameters
    pub positional_params: Vec<String>,
}

/// Error in command line parsing
///
/// Any of these errors makes the shell exit with status 2.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not a shell option
    #[error("unknown option `-{0}`")]
    UnknownShortOption(char),

    /// Argument that looks like an option but is not supported
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    /// The `-c` and `-s` options used together
    #[error("cannot specify both `-c` and `-s`")]
    ConflictingSources,

    /// The `-c` option without a command string
    #[error("missing command string for `-c`")]
    MissingCommandString,
}

/// Parses command line arguments.
///
/// The first item of `args` is the command name, which is used as
/// [`Run::arg0`] unless overridden by an operand. A command name starting
/// with `-` makes the shell a login shell.
pub fn parse<I, S>(args: I) -> Result<Run, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut result = Run::default();

    if let Some(arg0) = args.next() {
        if arg0.starts_with('-') {
            result.options.insert(Login);
        }
        result.arg0 = arg0;
    }

    while parse_short_options(&mut args, &mut result.options)? {}

    args.next_if(|arg| arg == "-" || arg == "--");

    if result.options.contains(CmdLine) {
        if result.options.contains(Stdin) {
            return Err(Error::ConflictingSources);
        }
        let command = args.next().ok_or(Error::MissingCommandString)?;
        result.source = Source::String(command);
        if let Some(name) = args.next() {
            result.arg0 = name;
        }
    } else if !result.options.contains(Stdin) {
        if let Some(path) = args.next() {
            result.arg0.clone_from(&path);
            result.source = Source::File { path };
        }
    }
    result.positional_params = args.collect();

    Ok(result)
}

/// Parses the next argument as short options if it is one.
///
/// Returns `Ok(true)` if an argument was consumed.
fn parse_short_options<I: Iterator<Item = String>>(
    args: &mut Peekable<I>,
    options: &mut OptionSet,
) -> Result<bool, Error> {
    let Some(arg) = args.next_if(|arg| is_option(arg)) else {
        return Ok(false);
    };

    let mut chars = arg.chars();
    if chars.next() != Some('-') || arg.starts_with("--") {
        return Err(Error::UnknownOption(arg));
    }
    for c in chars {
        let option: ShellOption = parse_short(c).ok_or(Error::UnknownShortOption(c))?;
        options.insert(option);
    }
    Ok(true)
}

/// Tests if the argument should be parsed as an option.
///
/// `-` and `--` are not options. Arguments starting with `+` are options
/// that are always rejected.
fn is_option(arg: &str) -> bool {
    match arg.strip_prefix(['-', '+']) {
        Some(rest) => !rest.is_empty() && arg != "--",
        None => false,
    }
}
