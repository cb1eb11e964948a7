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

//! Shell options
//!
//! A [`ShellOption`] is a flag that changes the behavior of the shell. The
//! set of enabled options is stored in [`Env::options`](crate::Env::options)
//! as an [`OptionSet`].
//!
//! Most options are set from the command line when the shell starts up. The
//! [`Monitor`](ShellOption::Monitor) option is enabled by the startup code when
//! the shell is interactive and its standard input is a terminal.

use enumset::EnumSet;
use enumset::EnumSetType;
use std::fmt::Display;
use std::fmt::Formatter;

/// Shell option
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
pub enum ShellOption {
    /// Executes a command string specified as a command line argument.
    CmdLine,
    /// Makes the shell exit when a command returns a non-zero exit status.
    ErrExit,
    /// Makes the shell interactive.
    Interactive,
    /// Makes the shell a login shell.
    Login,
    /// Enables job control.
    Monitor,
    /// Reads commands from the standard input.
    Stdin,
}

pub use ShellOption::*;

/// Set of enabled shell options
pub type OptionSet = EnumSet<ShellOption>;

impl ShellOption {
    /// Returns the long name of the option.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            CmdLine => "cmdline",
            ErrExit => "errexit",
            Interactive => "interactive",
            Login => "login",
            Monitor => "monitor",
            Stdin => "stdin",
        }
    }

    /// Returns the single-character name of the option.
    #[must_use]
    pub const fn short_name(self) -> Option<char> {
        match self {
            CmdLine => Some('c'),
            ErrExit => Some('e'),
            Interactive => Some('i'),
            Login => Some('l'),
            Monitor => None,
            Stdin => Some('s'),
        }
    }
}

impl Display for ShellOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Parses a short option name.
///
/// ```
/// # use posh_env::option::*;
/// assert_eq!(parse_short('c'), Some(CmdLine));
/// assert_eq!(parse_short('e'), Some(ErrExit));
/// assert_eq!(parse_short('i'), Some(Interactive));
/// assert_eq!(parse_short('l'), Some(Login));
/// assert_eq!(parse_short('s'), Some(Stdin));
/// assert_eq!(parse_short('m'), None);
/// ```
///
/// The name argument is case-sensitive.
#[must_use]
pub fn parse_short(name: char) -> Option<ShellOption> {
    EnumSet::<ShellOption>::all()
        .iter()
        .find(|option| option.short_name() == Some(name))
}
