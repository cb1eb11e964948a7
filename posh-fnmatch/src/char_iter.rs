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

//! Iterators that classify pattern characters

use std::str::Chars;

/// Character appearing in a pattern
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PatternChar {
    /// Normal character that may have a special meaning in the pattern
    Normal(char),
    /// Quoted character, which is always regarded as a literal character
    Literal(char),
}

impl PatternChar {
    /// Returns the character value, ignoring whether it is quoted.
    #[must_use]
    pub const fn char_value(self) -> char {
        match self {
            PatternChar::Normal(c) | PatternChar::Literal(c) => c,
        }
    }
}

/// Iterator returned by [`with_escape`]
#[derive(Clone, Debug)]
pub struct WithEscape<'a> {
    chars: Chars<'a>,
}

impl Iterator for WithEscape<'_> {
    type Item = PatternChar;
    fn next(&mut self) -> Option<PatternChar> {
        match self.chars.next() {
            None => None,
            Some('\\') => self.chars.next().map(PatternChar::Literal),
            Some(c) => Some(PatternChar::Normal(c)),
        }
    }
}

/// Creates an iterator that treats a backslash as escaping the next
/// character.
///
/// The backslash itself is not yielded. A trailing backslash is ignored.
pub fn with_escape(pattern: &str) -> WithEscape<'_> {
    let chars = pattern.chars();
    WithEscape { chars }
}

/// Iterator returned by [`without_escape`]
#[derive(Clone, Debug)]
pub struct WithoutEscape<'a> {
    chars: Chars<'a>,
}

impl Iterator for WithoutEscape<'_> {
    type Item = PatternChar;
    fn next(&mut self) -> Option<PatternChar> {
        self.chars.next().map(PatternChar::Normal)
    }
}

/// Creates an iterator that yields every character as a normal character.
pub fn without_escape(pattern: &str) -> WithoutEscape<'_> {
    let chars = pattern.chars();
    WithoutEscape { chars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PatternChar::*;

    #[test]
    fn with_escape_as_iterator() {
        let v: Vec<_> = with_escape(r"a\bc\").collect();
        assert_eq!(v, [Normal('a'), Literal('b'), Normal('c')]);
    }

    #[test]
    fn without_escape_as_iterator() {
        let v: Vec<_> = without_escape(r"a\b").collect();
        assert_eq!(v, [Normal('a'), Normal('\\'), Normal('b')]);
    }
}
