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

//! Resumable tokenizer
//!
//! A [`Tokenizer`] converts source text into [tokens](Token). The text is fed
//! in chunks of arbitrary size with [`Tokenizer::feed`], which returns every
//! [`CommandLine`] completed by the chunk. The tokenizer keeps the partially
//! built token and the open quotation between calls, so the same object
//! serves both a whole script file and a line-by-line interactive session.
//!
//! # Character classification
//!
//! Outside quotes:
//!
//! - A backslash escapes the next character. A backslash followed by a
//!   newline is a line continuation and both characters are removed.
//! - A single quote starts a single-quoted region that ends at the next
//!   single quote. Backslashes are ordinary characters in it.
//! - A double quote starts a double-quoted region that ends at the next
//!   unescaped double quote. A backslash in it is kept together with the next
//!   character; the expander decides whether it is an escape.
//! - A `#` at the start of a word starts a comment that extends to the end of
//!   the line.
//! - A blank ends the current word.
//! - `;`, `&`, `|`, `<`, and `>` start an operator. The operator is extended
//!   as long as the next character makes a longer valid operator.
//! - A newline ends the current command line.
//!
//! Quotes and backslashes are never removed from word tokens (except for line
//! continuations). Quote removal happens in word expansion.
//!
//! # Completeness
//!
//! A command line is complete when its terminating newline has been consumed
//! outside any quotation. If input ends while a quotation or a line
//! continuation is still open, the tokenizer is merely waiting for more input:
//! [`is_complete`](Tokenizer::is_complete) returns false. Only when the input
//! is known to be exhausted ([`finish`](Tokenizer::finish)) does an open
//! quotation become a syntax error.

use crate::parser::Error;
use crate::parser::SyntaxError;
use crate::source::Location;
use crate::syntax::Fd;
use crate::syntax::Word;
use crate::token::CommandLine;
use crate::token::Operator;
use crate::token::Token;

/// Character class the next character falls into
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Normal,
    Escaped,
    SingleQuote,
    DoubleQuote,
    DoubleQuoteEscaped,
    Comment,
    Operator(Operator),
}

/// Resumable tokenizer
///
/// See the [module documentation](self) for details.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    state: State,
    /// Raw text of the word being built
    word: String,
    /// Location of the first character of `word`
    word_location: Location,
    /// Location where the innermost open quotation started
    quote_location: Location,
    /// Tokens of the command line being built
    tokens: Vec<Token>,
    /// Source text of the command line being built
    text: String,
    /// Line number of the next character
    line: u64,
    /// Line number where the command line being built started
    start_line: u64,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Creates a tokenizer that starts at line 1.
    #[must_use]
    pub fn new() -> Self {
        Tokenizer {
            state: State::Normal,
            word: String::new(),
            word_location: Location::dummy(),
            quote_location: Location::dummy(),
            tokens: Vec::new(),
            text: String::new(),
            line: 1,
            start_line: 1,
        }
    }

    /// Returns the line number of the next character to be fed.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns true if no command line is partially built.
    ///
    /// This is true right after the tokenizer has been created or a command
    /// line has been completed by a newline. It is false if any character has
    /// been fed since then, including when a quotation or line continuation is
    /// open.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.text.is_empty()
    }

    /// Feeds a chunk of source text.
    ///
    /// Returns the command lines completed by the chunk. The chunk may
    /// complete any number of command lines, including none.
    pub fn feed(&mut self, chunk: &str) -> Vec<CommandLine> {
        chunk.chars().filter_map(|c| self.step(c)).collect()
    }

    /// Tells the tokenizer that the input has ended.
    ///
    /// If there is a partially built command line, it is returned. It is an
    /// error if a quotation or line continuation is still open. In either
    /// case, the tokenizer is reset so that it can be reused.
    pub fn finish(&mut self) -> Result<Option<CommandLine>, Error> {
        let cause = match self.state {
            State::Normal | State::Comment => None,
            State::Operator(op) => {
                self.tokens.push(Token::Operator(op));
                None
            }
            State::SingleQuote => Some(SyntaxError::UnclosedSingleQuote),
            State::DoubleQuote | State::DoubleQuoteEscaped => {
                Some(SyntaxError::UnclosedDoubleQuote)
            }
            State::Escaped => Some(SyntaxError::IncompleteEscape),
        };
        if let Some(cause) = cause {
            let location = self.quote_location;
            self.reset();
            return Err(Error { cause, location });
        }

        self.end_word(None);
        if self.text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.end_line()))
        }
    }

    /// Discards the partially built command line.
    pub fn reset(&mut self) {
        let line = self.line;
        *self = Tokenizer::new();
        self.line = line;
        self.start_line = line;
    }

    fn step(&mut self, c: char) -> Option<CommandLine> {
        self.text.push(c);
        let result = match self.state {
            State::Normal => self.normal(c),
            State::Escaped => {
                if c == '\n' {
                    self.word.pop();
                } else {
                    self.word.push(c);
                }
                self.state = State::Normal;
                None
            }
            State::SingleQuote => {
                self.word.push(c);
                if c == '\'' {
                    self.state = State::Normal;
                }
                None
            }
            State::DoubleQuote => {
                self.word.push(c);
                match c {
                    '"' => self.state = State::Normal,
                    '\\' => self.state = State::DoubleQuoteEscaped,
                    _ => (),
                }
                None
            }
            State::DoubleQuoteEscaped => {
                if c == '\n' {
                    self.word.pop();
                } else {
                    self.word.push(c);
                }
                self.state = State::DoubleQuote;
                None
            }
            State::Comment => {
                if c == '\n' {
                    self.state = State::Normal;
                    Some(self.end_line())
                } else {
                    None
                }
            }
            State::Operator(op) => match op.extend(c) {
                Some(longer) => {
                    self.state = State::Operator(longer);
                    None
                }
                None => {
                    self.tokens.push(Token::Operator(op));
                    self.state = State::Normal;
                    self.normal(c)
                }
            },
        };
        if c == '\n' {
            self.line += 1;
        }
        result
    }

    /// Processes a character outside quotes.
    fn normal(&mut self, c: char) -> Option<CommandLine> {
        match c {
            '\n' => {
                self.end_word(None);
                return Some(self.end_line());
            }
            ' ' | '\t' => self.end_word(None),
            '\\' => {
                self.open_quote();
                self.state = State::Escaped;
            }
            '\'' => {
                self.open_quote();
                self.state = State::SingleQuote;
            }
            '"' => {
                self.open_quote();
                self.state = State::DoubleQuote;
            }
            '#' if self.word.is_empty() => self.state = State::Comment,
            _ => match Operator::starting_with(c) {
                Some(op) => {
                    self.end_word(Some(op));
                    self.state = State::Operator(op);
                }
                None => {
                    self.start_word();
                    self.word.push(c);
                }
            },
        }
        None
    }

    fn current_location(&self) -> Location {
        Location::at_line(self.line)
    }

    fn start_word(&mut self) {
        if self.word.is_empty() {
            self.word_location = self.current_location();
        }
    }

    /// Starts a quotation or escape, pushing the quoting character.
    fn open_quote(&mut self) {
        self.start_word();
        self.quote_location = self.current_location();
        let quote = self.text.chars().next_back().unwrap_or_default();
        self.word.push(quote);
    }

    /// Ends the current word, if any.
    ///
    /// If the word is followed by a redirection operator and consists of
    /// digits only, it becomes an IO number.
    fn end_word(&mut self, next_operator: Option<Operator>) {
        if self.word.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.word);
        let is_redirection = next_operator.is_some_and(Operator::is_redirection);
        if is_redirection && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(fd) = text.parse() {
                self.tokens.push(Token::IoNumber(Fd(fd)));
                return;
            }
        }
        let location = self.word_location;
        self.tokens.push(Token::Word(Word { text, location }));
    }

    fn end_line(&mut self) -> CommandLine {
        let line = CommandLine {
            tokens: std::mem::take(&mut self.tokens),
            text: std::mem::take(&mut self.text),
            location: Location::at_line(self.start_line),
        };
        // The line counter is incremented after the newline is processed.
        self.start_line = self.line + u64::from(line.text.ends_with('\n'));
        line
    }
}

/// Tests whether the text ends at the end of a complete command line.
///
/// This function returns false if the text ends inside a quotation, after a
/// line continuation, or in the middle of a line. Line readers use this
/// function to decide whether to read another line before executing the
/// commands.
#[must_use]
pub fn is_complete(text: &str) -> bool {
    let mut tokenizer = Tokenizer::new();
    tokenizer.feed(text);
    tokenizer.is_complete()
}

/// Tokenizes the whole text.
///
/// This is a convenience function that feeds the text to a new tokenizer and
/// [finishes](Tokenizer::finish) it.
pub fn tokenize(text: &str) -> Result<Vec<CommandLine>, Error> {
    let mut tokenizer = Tokenizer::new();
    let mut lines = tokenizer.feed(text);
    lines.extend(tokenizer.finish()?);
    Ok(lines)
}
