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

//! Source code locations

use std::num::NonZeroU64;

/// Position of a syntax element in the source code
///
/// The shell only tracks line numbers. A line number counts physical lines
/// fed to the [tokenizer](crate::tokenizer::Tokenizer), starting from 1.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Location {
    /// Line number
    pub line: NonZeroU64,
}

impl Location {
    /// Creates a location at the first line.
    ///
    /// This function is mainly for testing, where the location is irrelevant.
    #[must_use]
    pub const fn dummy() -> Self {
        Location { line: NonZeroU64::MIN }
    }

    /// Creates a location at the given line.
    ///
    /// Line numbers start from 1, so `line` of zero is adjusted to 1.
    #[must_use]
    pub fn at_line(line: u64) -> Self {
        let line = NonZeroU64::new(line).unwrap_or(NonZeroU64::MIN);
        Location { line }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::dummy()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.line)
    }
}
