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

//! Shell language tokens and command-line structure.
//!
//! Source text goes through two stages in this crate:
//!
//! 1. The [`Tokenizer`](tokenizer::Tokenizer) splits raw text into
//!    [tokens](token::Token). It is a resumable state machine: you feed it
//!    chunks of text as they arrive, and it hands back a
//!    [`CommandLine`](token::CommandLine) each time an unquoted newline
//!    completes one. Quoting characters are classified but never removed, so
//!    a [word](syntax::Word) token still contains its quotes and backslashes.
//! 2. The [parser](parser) partitions the tokens of a command line at the
//!    `;`, `&`, `&&`, `||`, and `|` operators, building the
//!    [syntax tree](syntax). This step is purely structural; no expansion
//!    happens here.
//!
//! The [`is_complete`](tokenizer::is_complete) predicate tells line readers
//! whether the text read so far can be handed to the parser or whether more
//! lines are needed to close a quotation or a line continuation.
//!
//! [`List`](syntax::List) implements [`FromStr`](std::str::FromStr), so you
//! can parse a whole script directly with `"echo foo | cat".parse::<syntax::List>()`.

pub mod parser;
pub mod source;
pub mod syntax;
pub mod token;
pub mod tokenizer;
