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

//! Word expansion
//!
//! The word expansion involves many kinds of operations described below.
//! The [`expand_words`] function performs all of them and produces any number
//! of fields depending on the expanded word. The [`expand_value`] function
//! produces exactly one field without field splitting and pathname expansion,
//! as for the value of an assignment. The [`expand_redir_target`] function
//! performs all of them but requires the result to be exactly one field, as
//! for the operand of a redirection.
//!
//! # Initial expansion
//!
//! The [initial expansion](initial) evaluates the word text into
//! [attributed characters](attr). It performs tilde expansion and parameter
//! expansion. Single-quoted regions are left intact; double-quoted regions
//! only undergo parameter expansion.
//!
//! # Field splitting
//!
//! The [field splitting](split) divides the result of unquoted parameter
//! expansions at whitespace.
//!
//! # Pathname expansion
//!
//! The [pathname expansion](glob) replaces a field containing unquoted `*`,
//! `?`, or `[` with the sorted list of matching pathnames.
//!
//! # Quote removal
//!
//! The [quote removal](quote_removal) drops the quotation characters that
//! were part of the original word.

pub mod attr;
pub mod glob;
pub mod initial;
pub mod quote_removal;
pub mod split;

use self::attr::AttrField;
use self::initial::Mode;
use posh_env::Env;
use posh_env::semantics::Field;
use posh_syntax::source::Location;
use posh_syntax::syntax::Word;
use thiserror::Error;

/// Types of errors that may occur in the word expansion
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorCause {
    /// A parameter expansion is malformed, like `${` without `}`.
    #[error("{0}: bad substitution")]
    BadSubstitution(String),

    /// A redirection operand did not expand to exactly one field.
    #[error("{0}: ambiguous redirect")]
    AmbiguousRedirect(String),
}

/// Explanation of an expansion failure
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

/// Result of word expansion
pub type Result<T> = std::result::Result<T, Error>;

fn initial_expand(env: &Env, word: &Word, mode: Mode) -> Result<Vec<AttrField>> {
    let origin = word.location;
    match initial::expand(env, &word.text, mode) {
        Ok(fields) => Ok(fields
            .into_iter()
            .map(|chars| AttrField { chars, origin })
            .collect()),
        Err(cause) => Err(Error {
            cause,
            location: origin,
        }),
    }
}

/// Expands a word to fields, pushing them into `results`.
pub fn expand_word_into(env: &Env, word: &Word, results: &mut Vec<Field>) -> Result<()> {
    let mut fields = Vec::new();
    for field in initial_expand(env, word, Mode::Multiple)? {
        split::split_into(field, &mut fields);
    }
    for field in fields {
        glob::glob_into(env, field, results);
    }
    Ok(())
}

/// Expands words to fields.
///
/// This function performs the initial expansion, field splitting, pathname
/// expansion, and quote removal on each word. Any word may expand to any
/// number of fields.
pub fn expand_words<'a, I>(env: &Env, words: I) -> Result<Vec<Field>>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut results = Vec::new();
    for word in words {
        expand_word_into(env, word, &mut results)?;
    }
    Ok(results)
}

/// Expands a word to a single field.
///
/// This function performs the initial expansion and quote removal, but not
/// field splitting or pathname expansion. `"$@"` is expanded like `"$*"`.
pub fn expand_value(env: &Env, word: &Word) -> Result<Field> {
    let mut value = String::new();
    for field in initial_expand(env, word, Mode::Single)? {
        value.extend(quote_removal::skip_quotes(field.chars));
    }
    let origin = word.location;
    Ok(Field { value, origin })
}

/// Expands the operand of a redirection.
///
/// The word is expanded like [`expand_words`], but the result must be exactly
/// one field. Otherwise, this function fails with
/// [`ErrorCause::AmbiguousRedirect`].
pub fn expand_redir_target(env: &Env, word: &Word) -> Result<Field> {
    let mut fields = Vec::new();
    expand_word_into(env, word, &mut fields)?;
    if fields.len() == 1 {
        if let Some(field) = fields.pop() {
            return Ok(field);
        }
    }
    Err(Error {
        cause: ErrorCause::AmbiguousRedirect(word.text.clone()),
        location: word.location,
    })
}
