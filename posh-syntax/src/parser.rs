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

//! Structural parser
//!
//! The parser partitions the tokens of a [`CommandLine`] into the
//! [syntax tree](crate::syntax). The grammar is:
//!
//! ```text
//! list           := (and_or_list (";" | "&"))* and_or_list?
//! and_or_list    := pipeline (("&&" | "||") pipeline)*
//! pipeline       := simple_command ("|" simple_command)*
//! simple_command := (assignment | word | redirection)+
//! redirection    := io_number? redir_op word
//! ```
//!
//! Leading words of the form `name=value` are assignments until the first
//! word that is not.

use crate::source::Location;
use crate::syntax::AndOr;
use crate::syntax::AndOrList;
use crate::syntax::Assign;
use crate::syntax::Fd;
use crate::syntax::Item;
use crate::syntax::List;
use crate::syntax::Pipeline;
use crate::syntax::Redir;
use crate::syntax::SimpleCommand;
use crate::token::CommandLine;
use crate::token::Operator;
use crate::token::Token;
use crate::tokenizer::tokenize;
use std::iter::Peekable;
use std::slice::Iter;
use std::str::FromStr;
use thiserror::Error;

/// Types of syntax errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// A single quotation lacks a closing `'`.
    #[error("the single quote is not closed")]
    UnclosedSingleQuote,
    /// A double quotation lacks a closing `"`.
    #[error("the double quote is not closed")]
    UnclosedDoubleQuote,
    /// The input ends with a backslash.
    #[error("the backslash is not followed by any character")]
    IncompleteEscape,
    /// An operator appears where a command is expected.
    #[error("unexpected token `{0}`")]
    UnexpectedToken(Operator),
    /// The command line ends right after `&&`, `||`, or `|`.
    #[error("a command is missing after `{0}`")]
    MissingCommandAfter(Operator),
    /// A command is expected but the command line has ended.
    #[error("a command is missing")]
    MissingCommand,
    /// A redirection operator is not followed by a word.
    #[error("the redirection operator `{0}` is missing its operand")]
    MissingRedirOperand(Operator),
    /// A here-document operator is used.
    #[error("here-documents are not supported")]
    HereDocUnsupported,
}

/// Syntax error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: SyntaxError,
    pub location: Location,
}

struct Parser<'a> {
    tokens: Peekable<Iter<'a, Token>>,
    /// Location of the last word consumed
    location: Location,
}

impl Parser<'_> {
    fn error(&self, cause: SyntaxError) -> Error {
        let location = self.location;
        Error { cause, location }
    }

    fn peek_operator(&mut self) -> Option<Operator> {
        match self.tokens.peek() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn list(&mut self) -> Result<List, Error> {
        let mut items = Vec::new();
        while self.tokens.peek().is_some() {
            let and_or = self.and_or_list()?;
            let is_async = match self.tokens.next() {
                Some(Token::Operator(Operator::And)) => true,
                Some(Token::Operator(Operator::Semicolon)) | None => false,
                Some(Token::Operator(op)) => return Err(self.error(SyntaxError::UnexpectedToken(*op))),
                Some(_) => return Err(self.error(SyntaxError::MissingCommand)),
            };
            items.push(Item { and_or, is_async });
        }
        Ok(List(items))
    }

    fn and_or_list(&mut self) -> Result<AndOrList, Error> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            let (condition, op) = match self.peek_operator() {
                Some(Operator::AndAnd) => (AndOr::AndThen, Operator::AndAnd),
                Some(Operator::BarBar) => (AndOr::OrElse, Operator::BarBar),
                _ => break,
            };
            self.tokens.next();
            if self.tokens.peek().is_none() {
                return Err(self.error(SyntaxError::MissingCommandAfter(op)));
            }
            rest.push((condition, self.pipeline()?));
        }
        Ok(AndOrList { first, rest })
    }

    fn pipeline(&mut self) -> Result<Pipeline, Error> {
        let mut commands = vec![self.simple_command()?];
        while self.peek_operator() == Some(Operator::Bar) {
            self.tokens.next();
            if self.tokens.peek().is_none() {
                return Err(self.error(SyntaxError::MissingCommandAfter(Operator::Bar)));
            }
            commands.push(self.simple_command()?);
        }
        Ok(Pipeline { commands })
    }

    fn simple_command(&mut self) -> Result<SimpleCommand, Error> {
        let mut command = SimpleCommand::default();
        loop {
            match self.tokens.peek() {
                Some(Token::Word(word)) => {
                    self.location = word.location;
                    self.tokens.next();
                    match Assign::from_word(word) {
                        Some(assign) if command.words.is_empty() => command.assigns.push(assign),
                        _ => command.words.push(word.clone()),
                    }
                }
                Some(Token::IoNumber(fd)) => {
                    let fd = *fd;
                    self.tokens.next();
                    match self.tokens.next() {
                        Some(Token::Operator(op)) => {
                            let redir = self.redir(Some(fd), *op)?;
                            command.redirs.push(redir);
                        }
                        // The tokenizer produces an IO number only before a
                        // redirection operator.
                        _ => return Err(self.error(SyntaxError::MissingCommand)),
                    }
                }
                Some(Token::Operator(op)) if op.is_redirection() => {
                    let op = *op;
                    self.tokens.next();
                    let redir = self.redir(None, op)?;
                    command.redirs.push(redir);
                }
                Some(Token::Operator(_)) | None => break,
            }
        }

        if command.is_empty() {
            return Err(match self.peek_operator() {
                Some(op) => self.error(SyntaxError::UnexpectedToken(op)),
                None => self.error(SyntaxError::MissingCommand),
            });
        }
        Ok(command)
    }

    fn redir(&mut self, fd: Option<Fd>, op: Operator) -> Result<Redir, Error> {
        let Some(redir_op) = op.to_redir_op() else {
            return Err(self.error(SyntaxError::HereDocUnsupported));
        };
        match self.tokens.next() {
            Some(Token::Word(operand)) => {
                self.location = operand.location;
                Ok(Redir {
                    fd,
                    op: redir_op,
                    operand: operand.clone(),
                })
            }
            _ => Err(self.error(SyntaxError::MissingRedirOperand(op))),
        }
    }
}

/// Parses the tokens of a command line.
///
/// An empty command line yields an empty list.
pub fn parse(line: &CommandLine) -> Result<List, Error> {
    let mut parser = Parser {
        tokens: line.tokens.iter().peekable(),
        location: line.location,
    };
    parser.list()
}

/// Parses a whole script.
///
/// The lists of all the command lines are concatenated.
impl FromStr for List {
    type Err = Error;

    fn from_str(s: &str) -> Result<List, Error> {
        let mut items = Vec::new();
        for line in tokenize(s)? {
            items.extend(parse(&line)?.0);
        }
        Ok(List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::RedirOp;
    use assert_matches::assert_matches;

    fn parse_str(s: &str) -> Result<List, Error> {
        s.parse()
    }

    #[test]
    fn empty_line() {
        assert_eq!(parse_str("\n").unwrap(), List::default());
        assert_eq!(parse_str("").unwrap(), List::default());
    }

    #[test]
    fn sequence_and_async() {
        let list = parse_str("a; b & c").unwrap();
        assert_eq!(list.0.len(), 3);
        assert!(!list.0[0].is_async);
        assert!(list.0[1].is_async);
        assert!(!list.0[2].is_async);
        assert_eq!(list.to_string(), "a; b& c");
    }

    #[test]
    fn trailing_separator() {
        let list = parse_str("sleep 5 &").unwrap();
        assert_eq!(list.0.len(), 1);
        assert!(list.0[0].is_async);
        let list = parse_str("true;").unwrap();
        assert_eq!(list.0.len(), 1);
        assert!(!list.0[0].is_async);
    }

    #[test]
    fn and_or_list() {
        let list = parse_str("a && b || c | d").unwrap();
        let and_or = &list.0[0].and_or;
        assert_eq!(and_or.first.to_string(), "a");
        assert_eq!(and_or.rest.len(), 2);
        assert_eq!(and_or.rest[0].0, AndOr::AndThen);
        assert_eq!(and_or.rest[1].0, AndOr::OrElse);
        assert_eq!(and_or.rest[1].1.commands.len(), 2);
        assert_eq!(and_or.pipelines().count(), 3);
    }

    #[test]
    fn assignments_are_leading_only() {
        let list = parse_str("A=1 B=2 cmd C=3").unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert_eq!(command.assigns.len(), 2);
        assert_eq!(command.assigns[0].name, "A");
        assert_eq!(command.assigns[1].value.text, "2");
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.words[1].text, "C=3");
    }

    #[test]
    fn assignment_only_command() {
        let list = parse_str("X=1").unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert_eq!(command.assigns.len(), 1);
        assert!(command.words.is_empty());
    }

    #[test]
    fn quoted_name_is_not_assignment() {
        let list = parse_str("'X'=1").unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert!(command.assigns.is_empty());
        assert_eq!(command.words[0].text, "'X'=1");
    }

    #[test]
    fn redirections() {
        let list = parse_str("<in cmd >out arg 2>>log 3<&0 2>&-").unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.redirs.len(), 5);
        assert_eq!(command.redirs[0].op, RedirOp::FileIn);
        assert_eq!(command.redirs[0].fd, None);
        assert_eq!(command.redirs[1].operand.text, "out");
        assert_eq!(command.redirs[2].fd, Some(Fd(2)));
        assert_eq!(command.redirs[2].op, RedirOp::FileAppend);
        assert_eq!(command.redirs[3].op, RedirOp::FdIn);
        assert_eq!(command.redirs[4].operand.text, "-");
    }

    #[test]
    fn redirection_only_command() {
        let list = parse_str(">file").unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert!(command.words.is_empty());
        assert_eq!(command.redirs.len(), 1);
    }

    #[test]
    fn multiple_lines() {
        let list = parse_str("a\nb; c\n").unwrap();
        assert_eq!(list.0.len(), 3);
    }

    #[test]
    fn unexpected_operators() {
        assert_matches!(
            parse_str("; a"),
            Err(Error { cause: SyntaxError::UnexpectedToken(Operator::Semicolon), .. })
        );
        assert_matches!(
            parse_str("a ;; b"),
            Err(Error { cause: SyntaxError::UnexpectedToken(Operator::Semicolon), .. })
        );
        assert_matches!(
            parse_str("a && | b"),
            Err(Error { cause: SyntaxError::UnexpectedToken(Operator::Bar), .. })
        );
        assert_matches!(
            parse_str("& a"),
            Err(Error { cause: SyntaxError::UnexpectedToken(Operator::And), .. })
        );
    }

    #[test]
    fn missing_command_after_operator() {
        assert_matches!(
            parse_str("a &&"),
            Err(Error { cause: SyntaxError::MissingCommandAfter(Operator::AndAnd), .. })
        );
        assert_matches!(
            parse_str("a ||\n"),
            Err(Error { cause: SyntaxError::MissingCommandAfter(Operator::BarBar), .. })
        );
        assert_matches!(
            parse_str("a |"),
            Err(Error { cause: SyntaxError::MissingCommandAfter(Operator::Bar), .. })
        );
    }

    #[test]
    fn missing_redirection_operand() {
        assert_matches!(
            parse_str("cmd >"),
            Err(Error { cause: SyntaxError::MissingRedirOperand(Operator::Greater), .. })
        );
        assert_matches!(
            parse_str("cmd 2>&; b"),
            Err(Error { cause: SyntaxError::MissingRedirOperand(Operator::GreaterAnd), .. })
        );
    }

    #[test]
    fn here_document_is_rejected() {
        assert_matches!(
            parse_str("cat <<EOF"),
            Err(Error { cause: SyntaxError::HereDocUnsupported, .. })
        );
        assert_matches!(
            parse_str("cat <<-EOF"),
            Err(Error { cause: SyntaxError::HereDocUnsupported, .. })
        );
    }

    #[test]
    fn error_location() {
        let error = parse_str("a\nb\nc &&").unwrap_err();
        assert_eq!(error.location, Location::at_line(3));
    }

    #[test]
    fn error_message() {
        let error = parse_str("|").unwrap_err();
        assert_eq!(error.to_string(), "unexpected token `|`");
    }
}
