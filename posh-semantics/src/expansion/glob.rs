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

//! Pathname expansion
//!
//! Pathname expansion (a.k.a. globbing) scans directories and produces
//! pathnames matching the input field.
//!
//! # Pattern syntax
//!
//! An input field is split by `/`, and each component is parsed as a pattern
//! that may contain `?`, `*`, and bracket expressions. Characters that are
//! quoted or result from tilde expansion are literal. Refer to the
//! [`posh-fnmatch`](posh_fnmatch) crate for the pattern syntax.
//!
//! A leading period in a file name is matched only by a literal period in the
//! pattern, so hidden files are not matched by accident.
//!
//! # Results
//!
//! Pathname expansion returns the matching pathnames sorted in byte order.
//! Directory read errors are silently ignored. If no pathname matches, or the
//! field contains no pattern characters at all, the result is the input field
//! after quote removal.

use super::attr::AttrChar;
use super::attr::AttrField;
use super::attr::Origin;
use super::quote_removal::skip_quotes;
use posh_env::Env;
use posh_env::semantics::Field;
use posh_fnmatch::Config;
use posh_fnmatch::Pattern;
use posh_fnmatch::PatternChar;
use posh_syntax::source::Location;
use std::ffi::CString;

/// Converts a field to a glob pattern.
fn to_pattern(field: &[AttrChar]) -> Option<Pattern> {
    let chars = field.iter().filter_map(|c| {
        if c.is_quoting {
            None
        } else if c.is_quoted || c.origin == Origin::HardExpansion {
            Some(PatternChar::Literal(c.value))
        } else {
            Some(PatternChar::Normal(c.value))
        }
    });
    let config = Config {
        literal_period: true,
    };
    Pattern::parse_with_config(chars, config).ok()
}

#[derive(Debug)]
struct SearchEnv<'e> {
    env: &'e Env,
    prefix: String,
    origin: Location,
    results: Vec<Field>,
}

impl SearchEnv<'_> {
    /// Recursively searches directories for matching pathnames.
    fn search_dir(&mut self, suffix: &[AttrChar]) {
        let (this, new_suffix) = match suffix.iter().position(|c| c.value == '/') {
            None => (suffix, None),
            Some(index) => (&suffix[..index], Some(&suffix[index + 1..])),
        };

        let Some(pattern) = to_pattern(this) else {
            self.push_component(new_suffix, false, |prefix| {
                prefix.extend(skip_quotes(this.iter().copied()))
            });
            return;
        };
        if let Some(literal) = pattern.as_literal() {
            self.push_component(new_suffix, false, |prefix| prefix.push_str(&literal));
            return;
        }

        let dir_path = if self.prefix.is_empty() {
            c".".to_owned()
        } else {
            match CString::new(self.prefix.as_str()) {
                Ok(path) => path,
                Err(_) => return,
            }
        };
        let Ok(names) = self.env.system.read_dir(&dir_path) else {
            return;
        };
        for name in names {
            let Some(name) = name.to_str() else { continue };
            if pattern.is_match(name) {
                self.push_component(new_suffix, true, |prefix| prefix.push_str(name));
            }
        }
    }

    fn file_exists(&self) -> bool {
        match CString::new(self.prefix.as_str()) {
            Ok(path) => self.env.system.file_exists(&path),
            Err(_) => false,
        }
    }

    /// Pushes a pathname component to `prefix` and starts processing the next
    /// suffix component.
    ///
    /// `exists` tells whether the component is known to exist because it was
    /// found in a directory.
    fn push_component<F>(&mut self, suffix: Option<&[AttrChar]>, exists: bool, push: F)
    where
        F: FnOnce(&mut String),
    {
        let old_prefix_len = self.prefix.len();
        push(&mut self.prefix);

        match suffix {
            None => {
                if exists || self.file_exists() {
                    self.results.push(Field {
                        value: self.prefix.clone(),
                        origin: self.origin,
                    });
                }
            }
            Some(suffix) => {
                self.prefix.push('/');
                self.search_dir(suffix);
            }
        }

        self.prefix.truncate(old_prefix_len);
    }
}

/// Whether the field contains a character that may make it a pattern
fn has_pattern_char(field: &[AttrChar]) -> bool {
    field.iter().any(|c| {
        !c.is_quoting
            && !c.is_quoted
            && c.origin != Origin::HardExpansion
            && matches!(c.value, '*' | '?' | '[')
    })
}

/// Performs pathname expansion, pushing the results into `results`.
pub fn glob_into(env: &Env, field: AttrField, results: &mut Vec<Field>) {
    if !has_pattern_char(&field.chars) {
        results.push(field.remove_quotes());
        return;
    }

    let mut search_env = SearchEnv {
        env,
        prefix: String::new(),
        origin: field.origin,
        results: Vec::new(),
    };
    search_env.search_dir(&field.chars);

    let mut matches = search_env.results;
    if matches.is_empty() {
        results.push(field.remove_quotes());
    } else {
        matches.sort_unstable_by(|a, b| a.value.cmp(&b.value));
        results.extend(matches);
    }
}

/// Performs pathname expansion.
#[must_use]
pub fn glob(env: &Env, field: AttrField) -> Vec<Field> {
    let mut results = Vec::new();
    glob_into(env, field, &mut results);
    results
}
