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

//! Intermediate expansion results
//!
//! An [`AttrChar`] is a character with attributes describing how the
//! character was derived in the initial expansion. The attributes affect the
//! behavior of field splitting, pathname expansion, and quote removal. An
//! [`AttrField`] is a string of `AttrChar`s associated with the location of
//! the originating word.

use posh_syntax::source::Location;

/// Category of syntactic elements from which expansion originates
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Origin {
    /// The character appeared literally in the original word.
    Literal,

    /// The character originates from a tilde expansion.
    ///
    /// A hard expansion is neither split nor interpreted as a pattern.
    HardExpansion,

    /// The character originates from a parameter expansion.
    ///
    /// An unquoted soft expansion is subject to field splitting and pathname
    /// expansion.
    SoftExpansion,
}

/// Character with attributes describing its origin
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttrChar {
    /// Character value
    pub value: char,
    /// Syntactic element from which this character originates
    pub origin: Origin,
    /// Whether this character is quoted by another character
    pub is_quoted: bool,
    /// Whether this is a quotation character that quotes another character
    ///
    /// Quoting characters are removed in quote removal.
    pub is_quoting: bool,
}

/// String of `AttrChar`s with the location of the originating word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrField {
    /// Value of the field
    pub chars: Vec<AttrChar>,
    /// Location of the word this field resulted from
    pub origin: Location,
}
