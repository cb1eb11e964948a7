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

//! Abstract syntax tree for globbing patterns

mod parse;
mod regex;

pub use self::regex::ToRegex;

/// Element of a bracket expression that matches one character
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketAtom {
    /// Literal character
    Char(char),
    /// Collating symbol (`[.x.]`)
    CollatingSymbol(String),
    /// Equivalence class (`[=x=]`)
    EquivalenceClass(String),
    /// Character class (`[:alpha:]`)
    CharClass(String),
}

/// Item of a bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Single atom
    Atom(BracketAtom),
    /// Character range (`a-z`)
    Range(char, char),
}

impl From<BracketAtom> for BracketItem {
    fn from(atom: BracketAtom) -> Self {
        BracketItem::Atom(atom)
    }
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the bracket expression starts with `!` or `^`
    pub complement: bool,
    /// Content of the bracket expression
    pub items: Vec<BracketItem>,
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// Pattern that matches a single character (`?`)
    AnyChar,
    /// Pattern that matches any string (`*`)
    AnyString,
    /// Bracket expression
    Bracket(Bracket),
}

/// Abstract syntax tree for a whole pattern
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    /// Components of the pattern
    pub atoms: Vec<Atom>,
}

impl Ast {
    /// Returns the literal string the pattern matches, if the pattern has no
    /// special components.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}
