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

//! Conversion to regular expression

use super::*;
use crate::Error;
use std::fmt::Write;

/// Character class names accepted in bracket expressions
const CHAR_CLASSES: &[&str] = &[
    "alnum", "alpha", "blank", "cntrl", "digit", "graph", "lower", "print", "punct", "space",
    "upper", "xdigit",
];

/// Writes a character so that it is literal in a regular expression.
fn write_literal(c: char, regex: &mut String) {
    regex.push_str(&::regex::escape(c.encode_utf8(&mut [0; 4])));
}

/// Writes a character so that it is literal in a regex character class.
fn write_class_literal(c: char, regex: &mut String) {
    if c.is_ascii_punctuation() {
        regex.push('\\');
    }
    regex.push(c);
}

pub trait ToRegex {
    /// Converts this pattern to a regular expression.
    ///
    /// The result is appended to `regex`.
    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error>;
}

impl ToRegex for BracketItem {
    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            BracketItem::Atom(BracketAtom::Char(c)) => write_class_literal(*c, regex),
            BracketItem::Atom(BracketAtom::CharClass(name)) => {
                if !CHAR_CLASSES.contains(&name.as_str()) {
                    return Err(Error::UndefinedCharClass(name.clone()));
                }
                let _ = write!(regex, "[:{name}:]");
            }
            BracketItem::Atom(
                BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value),
            ) => return Err(Error::UndefinedCollatingSymbol(value.clone())),
            BracketItem::Range(start, end) => {
                if start > end {
                    return Err(Error::InvalidRange(*start, *end));
                }
                write_class_literal(*start, regex);
                regex.push('-');
                write_class_literal(*end, regex);
            }
        }
        Ok(())
    }
}

impl ToRegex for Atom {
    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            Atom::Char(c) => write_literal(*c, regex),
            Atom::AnyChar => regex.push('.'),
            Atom::AnyString => regex.push_str(".*"),
            Atom::Bracket(bracket) => {
                regex.push('[');
                if bracket.complement {
                    regex.push('^');
                }
                for item in &bracket.items {
                    item.fmt_regex(regex)?;
                }
                regex.push(']');
            }
        }
        Ok(())
    }
}

impl ToRegex for Ast {
    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        self.atoms.iter().try_for_each(|atom| atom.fmt_regex(regex))
    }
}
