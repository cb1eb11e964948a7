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

//! AST parser

use super::*;
use crate::PatternChar;

impl BracketAtom {
    /// Parses an inner bracket expression (except the initial '[').
    ///
    /// This function parses a collating symbol, equivalence class, or character
    /// class.
    ///
    /// If successful, returns the result as well as an iterator that yields
    /// characters following the closing bracket. Returns `None` if the inner
    /// bracket expression is not valid.
    fn parse_inner<I>(mut i: I) -> Option<(Self, I)>
    where
        I: Iterator<Item = PatternChar>,
    {
        let delimiter = match i.next() {
            Some(PatternChar::Normal(c @ ('.' | '=' | ':'))) => c,
            _ => return None,
        };
        let terminator = [PatternChar::Normal(delimiter), PatternChar::Normal(']')];

        let mut value = Vec::new();
        for pc in i.by_ref() {
            value.push(pc);
            if value.ends_with(&terminator) {
                value.truncate(value.len() - 2);
                let value = value.into_iter().map(PatternChar::char_value).collect();
                let atom = match delimiter {
                    '.' => BracketAtom::CollatingSymbol(value),
                    '=' => BracketAtom::EquivalenceClass(value),
                    _ => BracketAtom::CharClass(value),
                };
                return Some((atom, i));
            }
        }
        None
    }
}

/// Converts the last three items into a range if applicable.
fn make_range(items: &mut Vec<BracketItem>) {
    use BracketAtom::Char;
    use BracketItem::Atom;

    if let [.., Atom(Char(start)), Atom(Char('-')), Atom(Char(end))] = items[..] {
        items.truncate(items.len() - 3);
        items.push(BracketItem::Range(start, end));
    }
}

impl Bracket {
    /// Parses a bracket expression (except the initial '[').
    ///
    /// If successful, returns the result as well as an iterator that yields
    /// characters following the bracket expression. Returns `None` if a
    /// bracket expression is not found.
    fn parse<I>(mut i: I) -> Option<(Self, I)>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        use BracketAtom::Char;
        use BracketItem::Atom;

        let mut bracket = Bracket {
            complement: false,
            items: Vec::new(),
        };
        while let Some(pc) = i.next() {
            match pc {
                PatternChar::Normal(']') if !bracket.items.is_empty() => return Some((bracket, i)),
                PatternChar::Normal('!' | '^')
                    if !bracket.complement && bracket.items.is_empty() =>
                {
                    bracket.complement = true;
                    continue;
                }
                PatternChar::Normal('[') => match BracketAtom::parse_inner(i.clone()) {
                    Some((atom, j)) => {
                        let atom = match atom {
                            BracketAtom::CollatingSymbol(s) | BracketAtom::EquivalenceClass(s)
                                if s.chars().count() == 1 =>
                            {
                                Char(s.chars().next().unwrap_or_default())
                            }
                            atom => atom,
                        };
                        bracket.items.push(atom.into());
                        i = j;
                    }
                    None => bracket.items.push(Atom(Char('['))),
                },
                c => bracket.items.push(Atom(Char(c.char_value()))),
            }
            make_range(&mut bracket.items);
        }
        None
    }
}

impl Atom {
    fn parse<I>(mut i: I) -> Option<(Self, I)>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        i.next().map(|pc| {
            let atom = match pc {
                PatternChar::Normal('?') => Atom::AnyChar,
                PatternChar::Normal('*') => Atom::AnyString,
                PatternChar::Normal('[') => match Bracket::parse(i.clone()) {
                    Some((bracket, j)) => {
                        i = j;
                        Atom::Bracket(bracket)
                    }
                    None => Atom::Char('['),
                },
                c => Atom::Char(c.char_value()),
            };
            (atom, i)
        })
    }
}

impl Ast {
    /// Parses a pattern.
    ///
    /// Parsing never fails: characters that do not form a valid pattern
    /// component are literal.
    pub fn new<I>(pattern: I) -> Self
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let mut atoms = Vec::new();
        let mut i = pattern.into_iter();
        while let Some((atom, j)) = Atom::parse(i) {
            atoms.push(atom);
            i = j;
        }
        Ast { atoms }
    }
}
