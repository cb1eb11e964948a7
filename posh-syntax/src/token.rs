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

//! Tokens produced by the [tokenizer](crate::tokenizer)

use crate::source::Location;
use crate::syntax::Fd;
use crate::syntax::RedirOp;
use crate::syntax::Word;
use std::fmt;

/// Operator token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `;`
    Semicolon,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `<`
    Less,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<&`
    LessAnd,
    /// `>`
    Greater,
    /// `>>`
    GreaterGreater,
    /// `>&`
    GreaterAnd,
}

impl Operator {
    /// Returns the operator that consists of the single character `c`.
    ///
    /// Returns `None` if no operator starts with `c`.
    #[must_use]
    pub const fn starting_with(c: char) -> Option<Operator> {
        use Operator::*;
        match c {
            ';' => Some(Semicolon),
            '&' => Some(And),
            '|' => Some(Bar),
            '<' => Some(Less),
            '>' => Some(Greater),
            _ => None,
        }
    }

    /// Returns the operator that is made by appending `c` to `self`.
    ///
    /// Returns `None` if the result would not be a valid operator.
    #[must_use]
    pub const fn extend(self, c: char) -> Option<Operator> {
        use Operator::*;
        match (self, c) {
            (And, '&') => Some(AndAnd),
            (Bar, '|') => Some(BarBar),
            (Less, '<') => Some(LessLess),
            (Less, '&') => Some(LessAnd),
            (LessLess, '-') => Some(LessLessDash),
            (Greater, '>') => Some(GreaterGreater),
            (Greater, '&') => Some(GreaterAnd),
            _ => None,
        }
    }

    /// Returns true if this operator starts a redirection.
    #[must_use]
    pub const fn is_redirection(self) -> bool {
        use Operator::*;
        match self {
            Less | LessLess | LessLessDash | LessAnd | Greater | GreaterGreater | GreaterAnd => {
                true
            }
            Semicolon | And | AndAnd | Bar | BarBar => false,
        }
    }

    /// Converts this operator to the corresponding redirection operator.
    ///
    /// Returns `None` if this is not a redirection operator or is a
    /// here-document operator.
    #[must_use]
    pub const fn to_redir_op(self) -> Option<RedirOp> {
        use Operator::*;
        match self {
            Less => Some(RedirOp::FileIn),
            Greater => Some(RedirOp::FileOut),
            GreaterGreater => Some(RedirOp::FileAppend),
            LessAnd => Some(RedirOp::FdIn),
            GreaterAnd => Some(RedirOp::FdOut),
            _ => None,
        }
    }

    /// Returns the operator as it appears in the source code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            Semicolon => ";",
            And => "&",
            AndAnd => "&&",
            Bar => "|",
            BarBar => "||",
            Less => "<",
            LessLess => "<<",
            LessLessDash => "<<-",
            LessAnd => "<&",
            Greater => ">",
            GreaterGreater => ">>",
            GreaterAnd => ">&",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical unit of the shell language
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// Word, with quotes and backslashes intact
    Word(Word),
    /// Operator
    Operator(Operator),
    /// Sequence of digits that immediately precedes a redirection operator
    IoNumber(Fd),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => word.fmt(f),
            Token::Operator(op) => op.fmt(f),
            Token::IoNumber(fd) => fd.fmt(f),
        }
    }
}

/// Tokens of one logical input line
///
/// A command line may span multiple physical lines if a quotation or line
/// continuation is open at the end of a line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandLine {
    /// Tokens in the order of appearance
    pub tokens: Vec<Token>,
    /// Source text of the command line, including the trailing newline if any
    pub text: String,
    /// Location of the first line
    pub location: Location,
}

impl CommandLine {
    /// Returns true if the command line has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
