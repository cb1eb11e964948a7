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

//! This crate provides pattern matching based on a globbing pattern.
//!
//! This implementation supports the following syntax in patterns:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expression (`[...]`)
//!     - Character literals
//!     - Character ranges (e.g. `a-z`)
//!     - Complement (`[!...]` and `[^...]`)
//!     - Single-character collating symbols (e.g. `[.-.]`) and equivalence
//!       classes (e.g. `[=a=]`)
//!     - Character classes (`[:alpha:]`)
//!
//! The current implementation does not support any locale-specific
//! characteristics. Character classes only match ASCII characters.
//!
//! A pattern is converted to a regular expression of the [`regex`] crate.
//!
//! ```
//! use posh_fnmatch::{Pattern, with_escape};
//! let pattern = Pattern::parse(with_escape(r"*.r[s-t]")).unwrap();
//! assert!(pattern.is_match("main.rs"));
//! assert!(!pattern.is_match("main.rb"));
//! ```

mod ast;
mod char_iter;

use self::ast::Ast;
use self::ast::ToRegex as _;
pub use self::char_iter::*;
use regex::Regex;
use thiserror::Error;

/// Error that may happen in building a pattern
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A bracket expression contains an unknown character class.
    #[error("undefined character class [:{0}:]")]
    UndefinedCharClass(String),
    /// A bracket expression contains a multi-character collating element.
    #[error("undefined collating symbol [.{0}.]")]
    UndefinedCollatingSymbol(String),
    /// The start of a range is larger than the end.
    #[error("invalid character range {0}-{1}")]
    InvalidRange(char, char),
    /// The regular expression could not be compiled.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Configuration for a pattern
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Config {
    /// Whether a leading period must be matched by a literal period
    ///
    /// If true, `*`, `?`, and bracket expressions do not match a period at the
    /// beginning of a string. Pathname expansion uses this setting so that
    /// hidden files are not matched by accident.
    pub literal_period: bool,
}

/// Compiled globbing pattern
#[derive(Clone, Debug)]
pub struct Pattern {
    ast: Ast,
    config: Config,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern with the default configuration.
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        Self::parse_with_config(pattern, Config::default())
    }

    /// Compiles a pattern with the specified configuration.
    pub fn parse_with_config<I>(pattern: I, config: Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let ast = Ast::new(pattern);
        let mut regex = String::from(r"(?s)\A(?:");
        ast.fmt_regex(&mut regex)?;
        regex.push_str(r")\z");
        let regex = Regex::new(&regex)?;
        Ok(Pattern { ast, config, regex })
    }

    /// Returns the configuration of this pattern.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Returns the string this pattern matches if the pattern contains no
    /// special components.
    ///
    /// Pathname expansion uses this function to skip reading directories for
    /// literal path components.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        self.ast.to_literal()
    }

    /// Tests whether the whole string matches this pattern.
    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        if self.config.literal_period
            && s.starts_with('.')
            && self.ast.atoms.first() != Some(&ast::Atom::Char('.'))
        {
            return false;
        }
        self.regex.is_match(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn matches(pattern: &str, s: &str) -> bool {
        Pattern::parse(with_escape(pattern)).unwrap().is_match(s)
    }

    #[test]
    fn literal_patterns() {
        assert!(matches("", ""));
        assert!(matches("abc", "abc"));
        assert!(!matches("abc", "abcd"));
        assert!(!matches("abc", "xabc"));
        assert!(matches("a.c", "a.c"));
        assert!(!matches("a.c", "abc"));
    }

    #[test]
    fn wildcard_patterns() {
        assert!(matches("*", ""));
        assert!(matches("*", "anything\nat all"));
        assert!(matches("a*z", "az"));
        assert!(matches("a*z", "a-to-z"));
        assert!(!matches("a*z", "a-to-y"));
        assert!(matches("??", "ab"));
        assert!(!matches("??", "abc"));
        assert!(matches("?", "é"));
    }

    #[test]
    fn escaped_wildcards_are_literal() {
        assert!(matches(r"\*", "*"));
        assert!(!matches(r"\*", "x"));
        assert!(matches(r"\[a]", "[a]"));
    }

    #[test]
    fn bracket_patterns() {
        assert!(matches("[abc]", "b"));
        assert!(!matches("[abc]", "d"));
        assert!(matches("[!abc]", "d"));
        assert!(matches("[^abc]", "d"));
        assert!(!matches("[!abc]", "a"));
        assert!(matches("[a-c]x", "bx"));
        assert!(matches("[]]", "]"));
        assert!(matches("[[:digit:]]", "7"));
        assert!(!matches("[[:digit:]]", "x"));
        assert!(matches("[[:upper:][:space:]]", " "));
        assert!(matches("[a-]", "-"));
        assert!(matches("[", "["));
    }

    #[test]
    fn leading_period() {
        let config = Config {
            literal_period: true,
        };
        let pattern = Pattern::parse_with_config(without_escape("*"), config).unwrap();
        assert!(pattern.is_match("file"));
        assert!(!pattern.is_match(".hidden"));

        let pattern = Pattern::parse_with_config(without_escape(".*"), config).unwrap();
        assert!(pattern.is_match(".hidden"));

        let pattern = Pattern::parse(without_escape("*")).unwrap();
        assert!(pattern.is_match(".hidden"));
    }

    #[test]
    fn literal_detection() {
        let pattern = Pattern::parse(with_escape(r"ab\*")).unwrap();
        assert_eq!(pattern.as_literal().as_deref(), Some("ab*"));
        let pattern = Pattern::parse(with_escape("ab*")).unwrap();
        assert_eq!(pattern.as_literal(), None);
    }

    #[test]
    fn invalid_patterns() {
        assert_matches!(
            Pattern::parse(without_escape("[[:nope:]]")),
            Err(Error::UndefinedCharClass(_))
        );
        assert_matches!(
            Pattern::parse(without_escape("[z-a]")),
            Err(Error::InvalidRange('z', 'a'))
        );
    }
}
