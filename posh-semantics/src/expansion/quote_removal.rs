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

//! Quote removal
//!
//! Quote removal is the last step of the word expansion. It removes the
//! quotation characters (backslashes, single quotes, and double quotes) that
//! were part of the original word. Characters that resulted from parameter
//! expansion are never removed even if they look like quotes.

use super::attr::AttrChar;
use super::attr::AttrField;
use posh_env::semantics::Field;

/// Removes quoting characters from the sequence.
pub fn skip_quotes<I>(chars: I) -> impl Iterator<Item = char>
where
    I: IntoIterator<Item = AttrChar>,
{
    chars
        .into_iter()
        .filter(|c| !c.is_quoting)
        .map(|c| c.value)
}

impl AttrField {
    /// Performs quote removal, producing the final field.
    pub fn remove_quotes(self) -> Field {
        let value = skip_quotes(self.chars).collect();
        let origin = self.origin;
        Field { value, origin }
    }
}
