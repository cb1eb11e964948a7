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

//! Shell command language syntax.
//!
//! This module contains types that represent the structure of a command line.
//! The structure is built by the [parser](crate::parser) from the
//! [tokens](crate::token) of one command line.
//!
//! ## Syntactic elements
//!
//! The nesting of the elements is as follows:
//!
//! - A [`List`] is a sequence of [`Item`]s separated by `;` or `&`.
//! - An [`Item`] is an [`AndOrList`] that may be run asynchronously.
//! - An [`AndOrList`] is a sequence of [`Pipeline`]s joined by `&&` or `||`.
//! - A [`Pipeline`] is a sequence of [`SimpleCommand`]s joined by `|`.
//! - A [`SimpleCommand`] is made of [`Assign`]s, [`Word`]s, and [`Redir`]s.
//!
//! A [`Word`] keeps the raw text of its token, including quotes and
//! backslashes. The text is interpreted only when the word is expanded.
//!
//! All types implement [`Display`](std::fmt::Display), which reconstructs the
//! source code. Job names shown to the user are made this way.

use crate::source::Location;
use itertools::Itertools;
use std::fmt;
use std::os::unix::io::RawFd;

/// Token that may be expanded to fields
///
/// The `text` is the raw text of the word as it appeared in the source code.
/// Quotes and backslashes are kept as they are.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Word {
    /// Raw text of the word
    pub text: String,
    /// Location of the first character of the word
    pub location: Location,
}

impl Word {
    /// Creates a word with a dummy location.
    pub fn dummy<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let location = Location::dummy();
        Word { text, location }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.fmt(f)
    }
}

/// Returns true if the string is a valid variable name.
///
/// A name consists of ASCII alphanumerics and underscores and does not start
/// with a digit.
#[must_use]
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Assignment word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    /// Name of the variable to assign to
    pub name: String,
    /// Value assigned to the variable
    ///
    /// The value is the part of the word after the first `=`.
    pub value: Word,
}

impl Assign {
    /// Interprets a word as an assignment.
    ///
    /// Returns `None` if the word does not start with a name followed by `=`.
    #[must_use]
    pub fn from_word(word: &Word) -> Option<Assign> {
        let (name, value) = word.text.split_once('=')?;
        if !is_name(name) {
            return None;
        }
        Some(Assign {
            name: name.to_owned(),
            value: Word {
                text: value.to_owned(),
                location: word.location,
            },
        })
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// File descriptor
///
/// This is the `newtype` pattern applied to [`RawFd`], which is merely a type
/// alias.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl From<RawFd> for Fd {
    fn from(raw_fd: RawFd) -> Fd {
        Fd(raw_fd)
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Redirection operators
///
/// Here-document operators are recognized by the tokenizer but rejected by the
/// parser, so they have no counterpart here.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `>` (open a file for output)
    FileOut,
    /// `>>` (open a file for appending)
    FileAppend,
    /// `<&` (copy or close a file descriptor for input)
    FdIn,
    /// `>&` (copy or close a file descriptor for output)
    FdOut,
}

impl RedirOp {
    /// Returns the file descriptor affected when no IO number is given.
    #[must_use]
    pub const fn default_fd(self) -> Fd {
        use RedirOp::*;
        match self {
            FileIn | FdIn => Fd::STDIN,
            FileOut | FileAppend | FdOut => Fd::STDOUT,
        }
    }

    /// Returns the operator as it appears in the source code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        use RedirOp::*;
        match self {
            FileIn => "<",
            FileOut => ">",
            FileAppend => ">>",
            FdIn => "<&",
            FdOut => ">&",
        }
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// File descriptor that is modified by this redirection
    ///
    /// This is the IO number preceding the operator, if any.
    pub fd: Option<Fd>,
    /// Redirection operator
    pub op: RedirOp,
    /// Operand word
    pub operand: Word,
}

impl Redir {
    /// Computes the file descriptor that is modified by this redirection.
    ///
    /// If `self.fd` is `Some(_)`, the `RawFd` value is returned intact. Otherwise,
    /// the default file descriptor is selected depending on the type of `self.op`.
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        self.fd.unwrap_or_else(|| self.op.default_fd())
    }
}

impl fmt::Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{fd}")?;
        }
        write!(f, "{}{}", self.op, self.operand)
    }
}

/// Command that involves assignments, redirections, and word expansions
///
/// In the shell language syntax, a valid simple command must contain at least
/// one of assignments, redirections, and words. The parser must not produce a
/// completely empty simple command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    /// Leading assignments
    pub assigns: Vec<Assign>,
    /// Command name and arguments
    pub words: Vec<Word>,
    /// Redirections in the order of appearance
    pub redirs: Vec<Redir>,
}

impl SimpleCommand {
    /// Returns true if the simple command does not contain any assignments,
    /// words, or redirections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assigns = self.assigns.iter().map(|a| a as &dyn fmt::Display);
        let words = self.words.iter().map(|w| w as &dyn fmt::Display);
        let redirs = self.redirs.iter().map(|r| r as &dyn fmt::Display);
        write!(f, "{}", assigns.chain(words).chain(redirs).format(" "))
    }
}

/// Commands separated by `|`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pipeline {
    /// Elements of the pipeline
    ///
    /// A valid pipeline must have at least one command.
    pub commands: Vec<SimpleCommand>,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.commands.iter().format(" | "))
    }
}

/// Condition that decides if a [`Pipeline`] in an [and-or list](AndOrList)
/// should be executed
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

impl fmt::Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AndOr::AndThen => f.write_str("&&"),
            AndOr::OrElse => f.write_str("||"),
        }
    }
}

/// Pipelines separated by `&&` and `||`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

impl AndOrList {
    /// Iterates over all the pipelines in this list.
    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, p)| p))
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        self.rest
            .iter()
            .try_for_each(|(c, p)| write!(f, " {c} {p}"))
    }
}

/// Element of a [`List`]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Item {
    /// Main part of this item
    pub and_or: AndOrList,
    /// Whether this item is terminated by `&`
    pub is_async: bool,
}

/// Shows the and-or list.
///
/// The `&` terminator is not included in the output.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.and_or.fmt(f)
    }
}

/// Sequence of [and-or lists](AndOrList) separated by `;` or `&`
///
/// An empty list is valid and represents an empty command line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((last, others)) = self.0.split_last() else {
            return Ok(());
        };
        for item in others {
            let separator = if item.is_async { "&" } else { ";" };
            write!(f, "{item}{separator} ")?;
        }
        write!(f, "{last}")?;
        if last.is_async { f.write_str("&") } else { Ok(()) }
    }
}
