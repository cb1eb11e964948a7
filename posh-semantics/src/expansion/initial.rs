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

//! Initial expansion
//!
//! The initial expansion interprets the raw text of a word. It performs tilde
//! expansion and parameter expansion, and marks every character with
//! [attributes](super::attr) that tell the later steps how the character was
//! derived. Quotation characters are kept but marked as quoting so that
//! [quote removal](super::quote_removal) can drop them at the end.
//!
//! The result is a list of character strings rather than a single string
//! because `"$@"` expands to one field per positional parameter.

use super::ErrorCause;
use super::attr::AttrChar;
use super::attr::Origin;
use posh_env::Env;
use posh_env::variable::HOME;
use posh_syntax::syntax::is_name;
use std::iter::Peekable;
use std::str::Chars;

/// How `"$@"` expands
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// `"$@"` produces a field per positional parameter.
    Multiple,
    /// `"$@"` joins the positional parameters with spaces, as `"$*"` does.
    Single,
}

/// Special parameters that consist of a single non-alphanumeric character
const SPECIAL_PARAMS: &str = "?$!#*@";

struct Expander<'a> {
    env: &'a Env,
    chars: Peekable<Chars<'a>>,
    mode: Mode,
    in_double_quote: bool,
    /// Expanded fields, the last of which is being built
    fields: Vec<Vec<AttrChar>>,
    /// Whether `"$@"` expanded to nothing
    has_empty_at: bool,
}

impl Expander<'_> {
    fn push(&mut self, value: char, origin: Origin, is_quoted: bool, is_quoting: bool) {
        let c = AttrChar {
            value,
            origin,
            is_quoted,
            is_quoting,
        };
        if let Some(field) = self.fields.last_mut() {
            field.push(c);
        }
    }

    fn push_literal(&mut self, value: char) {
        self.push(value, Origin::Literal, self.in_double_quote, false)
    }

    fn push_quoting(&mut self, value: char) {
        self.push(value, Origin::Literal, self.in_double_quote, true)
    }

    fn push_quoted(&mut self, value: char) {
        self.push(value, Origin::Literal, true, false)
    }

    fn push_expansion(&mut self, value: &str, origin: Origin) {
        for c in value.chars() {
            self.push(c, origin, self.in_double_quote, false)
        }
    }

    fn tilde(&mut self, text: &str) {
        if !(text == "~" || text.starts_with("~/")) {
            return;
        }
        let env = self.env;
        let Some(home) = env.variables.get_scalar(HOME) else {
            return;
        };
        self.chars.next();
        self.push_expansion(home, Origin::HardExpansion);
    }

    fn single_quote(&mut self) {
        self.push_quoting('\'');
        while let Some(c) = self.chars.next() {
            if c == '\'' {
                self.push_quoting(c);
                break;
            }
            self.push_quoted(c);
        }
    }

    fn backslash(&mut self) {
        let in_double_quote = self.in_double_quote;
        let escapable = |c: &char| !in_double_quote || matches!(c, '$' | '`' | '"' | '\\');
        match self.chars.next_if(escapable) {
            Some(c) => {
                self.push_quoting('\\');
                self.push_quoted(c);
            }
            None => self.push_literal('\\'),
        }
    }

    fn dollar(&mut self) -> Result<(), ErrorCause> {
        if self.chars.next_if_eq(&'{').is_some() {
            return self.braced_param();
        }

        let mut name = String::new();
        if let Some(c) = self.chars.next_if(|c| c.is_ascii_alphabetic() || *c == '_') {
            name.push(c);
            while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                name.push(c);
            }
        } else if let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_digit() || SPECIAL_PARAMS.contains(*c))
        {
            name.push(c);
        } else {
            self.push_literal('$');
            return Ok(());
        }
        self.param(&name);
        Ok(())
    }

    fn braced_param(&mut self) -> Result<(), ErrorCause> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => return Err(ErrorCause::BadSubstitution(format!("${{{name}"))),
            }
        }

        let is_special = name.len() == 1 && SPECIAL_PARAMS.contains(name.as_str());
        let is_positional = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
        if is_name(&name) || is_special || is_positional {
            self.param(&name);
            Ok(())
        } else {
            Err(ErrorCause::BadSubstitution(format!("${{{name}}}")))
        }
    }

    fn param(&mut self, name: &str) {
        let env = self.env;
        let params = env.variables.positional_params();
        let value = match name {
            "@" if self.in_double_quote && self.mode == Mode::Multiple => {
                self.has_empty_at |= params.is_empty();
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.fields.push(Vec::new());
                    }
                    self.push_expansion(param, Origin::SoftExpansion);
                }
                return;
            }
            "@" | "*" => params.join(" "),
            "#" => params.len().to_string(),
            "?" => env.exit_status.to_string(),
            "$" => env.main_pid.to_string(),
            "!" => env
                .jobs
                .last_async_pid()
                .map(|pid| pid.to_string())
                .unwrap_or_default(),
            "0" => env.arg0.clone(),
            _ => match name.parse::<usize>() {
                Ok(index) => index
                    .checked_sub(1)
                    .and_then(|i| params.get(i))
                    .cloned()
                    .unwrap_or_default(),
                Err(_) => env
                    .variables
                    .get_scalar(name)
                    .unwrap_or_default()
                    .to_owned(),
            },
        };
        self.push_expansion(&value, Origin::SoftExpansion);
    }
}

/// Performs the initial expansion on the raw text of a word.
///
/// Returns the characters of the resultant fields. The result is empty only
/// if the word is `"$@"` and there are no positional parameters.
pub fn expand(env: &Env, text: &str, mode: Mode) -> Result<Vec<Vec<AttrChar>>, ErrorCause> {
    let mut expander = Expander {
        env,
        chars: text.chars().peekable(),
        mode,
        in_double_quote: false,
        fields: vec![Vec::new()],
        has_empty_at: false,
    };

    expander.tilde(text);
    while let Some(c) = expander.chars.next() {
        match c {
            '\'' if !expander.in_double_quote => expander.single_quote(),
            '"' => {
                expander.push(c, Origin::Literal, false, true);
                expander.in_double_quote = !expander.in_double_quote;
            }
            '\\' => expander.backslash(),
            '$' => expander.dollar()?,
            _ => expander.push_literal(c),
        }
    }

    let fields = expander.fields;
    if expander.has_empty_at && fields.len() == 1 && fields[0].iter().all(|c| c.is_quoting) {
        return Ok(Vec::new());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn values(fields: &[Vec<AttrChar>]) -> Vec<String> {
        fields
            .iter()
            .map(|chars| chars.iter().map(|c| c.value).collect())
            .collect()
    }

    #[test]
    fn plain_word_is_literal() {
        let env = Env::new_virtual();
        let fields = expand(&env, "echo", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["echo"]);
        assert!(fields[0].iter().all(|c| c.origin == Origin::Literal
            && !c.is_quoted
            && !c.is_quoting));
    }

    #[test]
    fn single_quotes_are_marked() {
        let env = Env::new_virtual();
        let fields = expand(&env, r"'a\$'", Mode::Multiple).unwrap();
        let chars = &fields[0];
        assert_eq!(chars.len(), 5);
        assert!(chars[0].is_quoting);
        assert!(chars[1..4].iter().all(|c| c.is_quoted && !c.is_quoting));
        assert!(chars[4].is_quoting);
    }

    #[test]
    fn backslash_in_double_quotes() {
        let env = Env::new_virtual();
        let fields = expand(&env, r#""\$\a""#, Mode::Multiple).unwrap();
        let chars = &fields[0];
        assert_eq!(values(&fields), [r#""\$\a""#]);
        assert!(chars[1].is_quoting);
        assert_eq!(chars[2].value, '$');
        assert!(chars[2].is_quoted);
        assert_eq!(chars[3].value, '\\');
        assert!(!chars[3].is_quoting);
    }

    #[test]
    fn variables_are_soft_expansions() {
        let mut env = Env::new_virtual();
        env.variables.assign("v", "x y");
        let fields = expand(&env, r#"$v"$v"${v}"#, Mode::Multiple).unwrap();
        let chars = &fields[0];
        assert_eq!(values(&fields), [r#"x y"x y"x y"#]);
        assert!(!chars[0].is_quoted);
        assert_eq!(chars[0].origin, Origin::SoftExpansion);
        assert!(chars[5].is_quoted);
        assert!(!chars[9].is_quoted);
    }

    #[test]
    fn unset_variable_expands_to_nothing() {
        let env = Env::new_virtual();
        let fields = expand(&env, "a${unset}b$unset", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["ab"]);
    }

    #[test]
    fn special_parameters() {
        let mut env = Env::new_virtual();
        env.exit_status = posh_env::semantics::ExitStatus(42);
        env.arg0 = "script".to_owned();
        env.variables
            .set_positional_params(vec!["a".to_owned(), "b".to_owned()]);
        let fields = expand(&env, "$?,$#,$0,$1,$2,$3,$*,$!", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["42,2,script,a,b,,a b,"]);
        let fields = expand(&env, "$$", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), [env.main_pid.to_string()]);
    }

    #[test]
    fn positional_parameter_beyond_nine_needs_braces() {
        let mut env = Env::new_virtual();
        let params = (1..=10).map(|i| format!("p{i}")).collect();
        env.variables.set_positional_params(params);
        let fields = expand(&env, "$10,${10}", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["p10,p10"]);
    }

    #[test]
    fn quoted_at_produces_multiple_fields() {
        let mut env = Env::new_virtual();
        env.variables
            .set_positional_params(vec!["1".to_owned(), "2 3".to_owned()]);
        let fields = expand(&env, r#"x"$@"y"#, Mode::Multiple).unwrap();
        assert_eq!(values(&fields), [r#"x"1"#, r#"2 3"y"#]);
        let fields = expand(&env, r#""$@""#, Mode::Single).unwrap();
        assert_eq!(values(&fields), [r#""1 2 3""#]);
    }

    #[test]
    fn quoted_at_without_params_produces_no_field() {
        let env = Env::new_virtual();
        let fields = expand(&env, r#""$@""#, Mode::Multiple).unwrap();
        assert_eq!(fields, Vec::<Vec<AttrChar>>::new());
        let fields = expand(&env, r#"x"$@""#, Mode::Multiple).unwrap();
        assert_eq!(values(&fields), [r#"x"""#]);
    }

    #[test]
    fn dollar_without_name_is_literal() {
        let env = Env::new_virtual();
        let fields = expand(&env, r#"$ "$""#, Mode::Multiple).unwrap();
        assert_eq!(values(&fields), [r#"$ "$""#]);
        assert_eq!(fields[0][0].origin, Origin::Literal);
    }

    #[test]
    fn tilde_expands_to_home() {
        let mut env = Env::new_virtual();
        env.variables.assign(HOME, "/home/user");
        let fields = expand(&env, "~/a", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["/home/user/a"]);
        assert_eq!(fields[0][0].origin, Origin::HardExpansion);
        let fields = expand(&env, "~user", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["~user"]);
        let fields = expand(&env, "a~", Mode::Multiple).unwrap();
        assert_eq!(values(&fields), ["a~"]);
    }

    #[test]
    fn unclosed_brace_is_bad_substitution() {
        let env = Env::new_virtual();
        let error = expand(&env, "${abc", Mode::Multiple).unwrap_err();
        assert_matches!(error, ErrorCause::BadSubstitution(text) => assert_eq!(text, "${abc"));
    }

    #[test]
    fn invalid_name_is_bad_substitution() {
        let env = Env::new_virtual();
        let error = expand(&env, "${a-b}", Mode::Multiple).unwrap_err();
        assert_matches!(error, ErrorCause::BadSubstitution(text) => assert_eq!(text, "${a-b}"));
        let error = expand(&env, "${}", Mode::Multiple).unwrap_err();
        assert_matches!(error, ErrorCause::BadSubstitution(_));
    }
}
