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

//! Field splitting
//!
//! Field splitting divides a field at whitespace that resulted from an
//! unquoted parameter expansion. Whitespace that appeared literally in the
//! word, or inside quotes, is never a separator.
//!
//! A run of adjacent separators is one delimiter, and separators at the
//! beginning or end of the field produce no empty fields. A field that
//! contains no characters at all, such as the expansion of an unset variable,
//! is removed. A field with quotes, such as `""`, is kept even if it is empty
//! after quote removal.

use super::attr::AttrChar;
use super::attr::AttrField;
use super::attr::Origin;

/// Whether the character separates fields.
#[must_use]
pub fn is_separator(c: &AttrChar) -> bool {
    c.origin == Origin::SoftExpansion
        && !c.is_quoted
        && !c.is_quoting
        && matches!(c.value, ' ' | '\t' | '\n')
}

/// Splits a field, pushing the results into `results`.
pub fn split_into(field: AttrField, results: &mut Vec<AttrField>) {
    let origin = field.origin;
    let mut chars = Vec::new();
    for c in field.chars {
        if !is_separator(&c) {
            chars.push(c);
        } else if !chars.is_empty() {
            let chars = std::mem::take(&mut chars);
            results.push(AttrField { chars, origin });
        }
    }
    if !chars.is_empty() {
        results.push(AttrField { chars, origin });
    }
}

/// Splits a field.
#[must_use]
pub fn split(field: AttrField) -> Vec<AttrField> {
    let mut results = Vec::new();
    split_into(field, &mut results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::source::Location;

    fn field(text: &str, origin: Origin, is_quoted: bool) -> AttrField {
        let chars = text
            .chars()
            .map(|value| AttrChar {
                value,
                origin,
                is_quoted,
                is_quoting: false,
            })
            .collect();
        AttrField {
            chars,
            origin: Location::dummy(),
        }
    }

    fn values(fields: Vec<AttrField>) -> Vec<String> {
        fields
            .into_iter()
            .map(|field| field.chars.iter().map(|c| c.value).collect())
            .collect()
    }

    #[test]
    fn unquoted_expansion_is_split_on_whitespace_runs() {
        let result = split(field("  a  b\t\nc ", Origin::SoftExpansion, false));
        assert_eq!(values(result), ["a", "b", "c"]);
    }

    #[test]
    fn quoted_expansion_is_not_split() {
        let result = split(field("a  b", Origin::SoftExpansion, true));
        assert_eq!(values(result), ["a  b"]);
    }

    #[test]
    fn literal_whitespace_is_not_a_separator() {
        let result = split(field("a b", Origin::Literal, false));
        assert_eq!(values(result), ["a b"]);
        let result = split(field("a b", Origin::HardExpansion, false));
        assert_eq!(values(result), ["a b"]);
    }

    #[test]
    fn empty_fields_are_removed() {
        assert_eq!(split(field("", Origin::Literal, false)), []);
        assert_eq!(split(field("   ", Origin::SoftExpansion, false)), []);
    }

    #[test]
    fn quotes_keep_empty_field() {
        let quote = AttrChar {
            value: '"',
            origin: Origin::Literal,
            is_quoted: false,
            is_quoting: true,
        };
        let input = AttrField {
            chars: vec![quote, quote],
            origin: Location::dummy(),
        };
        assert_eq!(split(input.clone()), [input]);
    }
}
