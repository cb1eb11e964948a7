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

//! Command history store
//!
//! An interactive shell records every command line it reads in the
//! [`History`]. Entries are numbered from 1 in the order they were added.
//! Persisting the history to a file is not handled here.

/// List of command lines entered in an interactive shell
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    /// Adds a command line.
    ///
    /// Trailing newlines are removed. A line that is empty after the removal
    /// is not added.
    pub fn add(&mut self, line: &str) {
        let line = line.trim_end_matches('\n');
        if !line.trim().is_empty() {
            self.entries.push(line.to_owned());
        }
    }

    /// Iterates over the entries with their numbers.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, line)| (index + 1, line.as_str()))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
