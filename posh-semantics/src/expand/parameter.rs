// This file is part of posh, a POSIX-conformant command-shell interpreter
// core.
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

//! Parameter expansion (spec.md §4.2 "Parameter operators", "Special
//! parameters during expansion").
//!
//! The lexer hands the expander a raw opaque body string for every
//! `${...}`/`$name` [`PartKind::Parameter`](posh_syntax::token::PartKind)
//! — full reparsing of the operator syntax, and of any nested expansion
//! inside an operator's word operand, happens here (spec.md §4.1: "the
//! lexer accepts the full operator syntax ... as an opaque body").

use crate::error::ExpansionError;
use crate::exec::Interp;
use crate::field::{all_unquoted, MarkedText};
use posh_env::variable::Value;

/// Result of expanding one `Parameter` part. `Fields` only arises from
/// `$@`/`"$@"`, the one context where a single part splits into several
/// output fields independent of `IFS` (spec.md §4.2).
pub enum ParamExpansion {
    Text(MarkedText),
    Fields(Vec<MarkedText>),
}

enum Modifier<'a> {
    Length,
    Default { colon: bool, word: &'a str },
    Assign { colon: bool, word: &'a str },
    Error { colon: bool, word: &'a str },
    Alternative { colon: bool, word: &'a str },
    RemovePrefix { longest: bool, pattern: &'a str },
    RemoveSuffix { longest: bool, pattern: &'a str },
    None,
}

fn split_name(body: &str) -> (&str, &str) {
    let mut it = body.char_indices();
    match it.next() {
        Some((_, c)) if "@*#?-$!".contains(c) => (&body[..c.len_utf8()], &body[c.len_utf8()..]),
        Some((_, c)) if c.is_ascii_digit() => {
            let mut end = c.len_utf8();
            for (i, c) in body.char_indices().skip(1) {
                if c.is_ascii_digit() {
                    end = i + c.len_utf8();
                } else {
                    break;
                }
            }
            (&body[..end], &body[end..])
        }
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {
            let mut end = c.len_utf8();
            for (i, c) in body.char_indices().skip(1) {
                if c == '_' || c.is_ascii_alphanumeric() {
                    end = i + c.len_utf8();
                } else {
                    break;
                }
            }
            (&body[..end], &body[end..])
        }
        _ => (body, ""),
    }
}

fn parse_modifier(trailing: &str) -> Modifier<'_> {
    if let Some(word) = trailing.strip_prefix(":-") {
        Modifier::Default { colon: true, word }
    } else if let Some(word) = trailing.strip_prefix('-') {
        Modifier::Default { colon: false, word }
    } else if let Some(word) = trailing.strip_prefix(":=") {
        Modifier::Assign { colon: true, word }
    } else if let Some(word) = trailing.strip_prefix('=') {
        Modifier::Assign { colon: false, word }
    } else if let Some(word) = trailing.strip_prefix(":?") {
        Modifier::Error { colon: true, word }
    } else if let Some(word) = trailing.strip_prefix('?') {
        Modifier::Error { colon: false, word }
    } else if let Some(word) = trailing.strip_prefix(":+") {
        Modifier::Alternative { colon: true, word }
    } else if let Some(word) = trailing.strip_prefix('+') {
        Modifier::Alternative { colon: false, word }
    } else if let Some(pattern) = trailing.strip_prefix("##") {
        Modifier::RemovePrefix { longest: true, pattern }
    } else if let Some(pattern) = trailing.strip_prefix('#') {
        Modifier::RemovePrefix { longest: false, pattern }
    } else if let Some(pattern) = trailing.strip_prefix("%%") {
        Modifier::RemoveSuffix { longest: true, pattern }
    } else if let Some(pattern) = trailing.strip_prefix('%') {
        Modifier::RemoveSuffix { longest: false, pattern }
    } else if trailing.is_empty() {
        Modifier::None
    } else {
        // Unrecognized trailing syntax: treat as no modifier and let the
        // name lookup happen on the unmodified parameter; malformed
        // input is a parser-level concern out of this crate's scope.
        Modifier::None
    }
}

/// Looks a name up, returning `None` for unset (spec.md: distinguished
/// from set-but-empty, which the `:`-prefixed operator variants care
/// about).
enum Lookup {
    Unset,
    Scalar(String),
    Array(Vec<String>),
}

fn lookup(interp: &Interp, name: &str) -> Lookup {
    match name {
        "@" | "*" => Lookup::Array(interp.frame.positional().borrow().params().to_vec()),
        "#" => Lookup::Scalar(interp.frame.positional().borrow().count().to_string()),
        "?" => Lookup::Scalar(interp.status().to_string()),
        "$" => Lookup::Scalar(interp.system.getpid().to_string()),
        "!" => Lookup::Scalar(
            interp
                .last_async_pid
                .map(|p| p.to_string())
                .unwrap_or_default(),
        ),
        "-" => Lookup::Scalar(current_flags(interp)),
        "0" => Lookup::Scalar(interp.frame.positional().borrow().arg0().to_string()),
        _ if name.chars().all(|c| c.is_ascii_digit()) => {
            let n: usize = name.parse().unwrap_or(0);
            match interp.frame.positional().borrow().get(n) {
                Some(v) => Lookup::Scalar(v.to_string()),
                None => Lookup::Unset,
            }
        }
        _ => {
            let variables = interp.frame.variables().borrow();
            match variables.get(name) {
                None => Lookup::Unset,
                Some(var) => match &var.value {
                    None => Lookup::Unset,
                    Some(Value::Scalar(s)) => Lookup::Scalar(s.clone()),
                    Some(Value::Array(a)) => Lookup::Array(a.clone()),
                },
            }
        }
    }
}

fn current_flags(interp: &Interp) -> String {
    interp
        .frame
        .options()
        .borrow()
        .iter()
        .filter_map(|(o, state)| (state == posh_env::option::On).then(|| o.short_letter()).flatten())
        .collect()
}

/// Expands a nested word embedded verbatim in an operator's operand
/// (e.g. the `$y` inside `${x:-$y}`). The lexer does not pre-scan these
/// since the whole `${...}` body is kept opaque (spec.md §4.1); this is
/// a lightweight scanner rather than a full re-entry into
/// [`posh_syntax::lexer::Lexer`], since that lexer is driven by the
/// parser's token loop and not meant to be invoked ad hoc on a fragment.
/// It understands `$name`, `${...}` (recursively) and literal text, which
/// covers the overwhelming majority of real-world default-value words;
/// arbitrarily nested command/arithmetic substitutions inside a default
/// value are treated as literal text.
fn expand_embedded(interp: &mut Interp, text: &str) -> Result<MarkedText, ExpansionError> {
    let mut out = MarkedText::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '$' {
            if let Some(&(_, next)) = chars.peek() {
                if next == '{' {
                    chars.next();
                    let start = i + 2;
                    let mut depth = 1;
                    let mut end = start;
                    for (j, c) in text[start..].char_indices() {
                        match c {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    end = start + j;
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let body = &text[start..end];
                    for _ in 0..body.chars().count() + 1 {
                        chars.next();
                    }
                    match expand(interp, body, true)? {
                        ParamExpansion::Text(t) => out.extend(t),
                        ParamExpansion::Fields(fields) => {
                            for (idx, f) in fields.into_iter().enumerate() {
                                if idx > 0 {
                                    out.push(crate::field::MarkedChar::quoted(' '));
                                }
                                out.extend(f);
                            }
                        }
                    }
                    continue;
                }
                if next == '_' || next.is_ascii_alphabetic() || next.is_ascii_digit() || "@*#?-$!".contains(next) {
                    let (name, _) = split_name(&text[i + 1..]);
                    for _ in 0..name.chars().count() {
                        chars.next();
                    }
                    match expand(interp, name, false)? {
                        ParamExpansion::Text(t) => out.extend(t),
                        ParamExpansion::Fields(fields) => {
                            for (idx, f) in fields.into_iter().enumerate() {
                                if idx > 0 {
                                    out.push(crate::field::MarkedChar::quoted(' '));
                                }
                                out.extend(f);
                            }
                        }
                    }
                    continue;
                }
            }
        }
        out.push(crate::field::MarkedChar::quoted(c));
    }
    Ok(out)
}

fn is_empty_lookup(lookup: &Lookup) -> bool {
    match lookup {
        Lookup::Unset => true,
        Lookup::Scalar(s) => s.is_empty(),
        Lookup::Array(a) => a.is_empty(),
    }
}

/// Expands one `${...}`/`$name` body (spec.md §4.2).
pub fn expand(interp: &mut Interp, body: &str, braced: bool) -> Result<ParamExpansion, ExpansionError> {
    if braced && body.starts_with('#') && body.len() > 1 {
        let rest = &body[1..];
        let (name, trailing) = split_name(rest);
        if trailing.is_empty() {
            let value = lookup(interp, name);
            let len = match value {
                Lookup::Unset => 0,
                Lookup::Scalar(s) => s.len(),
                Lookup::Array(a) => a.len(),
            };
            return Ok(ParamExpansion::Text(all_unquoted(&len.to_string())));
        }
    }

    let (name, trailing) = split_name(body);
    let modifier = if braced { parse_modifier(trailing) } else { Modifier::None };
    let value = lookup(interp, name);

    // `"$@"` is the one context that splits independent of IFS: only
    // when the whole token *is* exactly this parameter (checked by the
    // caller, which only asks for Fields treatment when appropriate).
    if name == "@" && matches!(modifier, Modifier::None) {
        if let Lookup::Array(items) = &value {
            return Ok(ParamExpansion::Fields(items.iter().map(|s| all_unquoted(s)).collect()));
        }
    }

    match modifier {
        Modifier::None => Ok(ParamExpansion::Text(value_to_text(value))),
        Modifier::Length => unreachable!("handled above"),
        Modifier::Default { colon, word } => {
            let unset_or_empty = if colon { is_empty_lookup(&value) } else { matches!(value, Lookup::Unset) };
            if unset_or_empty {
                Ok(ParamExpansion::Text(expand_embedded(interp, word)?))
            } else {
                Ok(ParamExpansion::Text(value_to_text(value)))
            }
        }
        Modifier::Assign { colon, word } => {
            let unset_or_empty = if colon { is_empty_lookup(&value) } else { matches!(value, Lookup::Unset) };
            if unset_or_empty {
                if !is_plain_name(name) {
                    return Err(ExpansionError::Explicit {
                        message: format!("{name}: cannot assign to this parameter"),
                    });
                }
                let assigned = expand_embedded(interp, word)?;
                let text: String = assigned.iter().map(|c| c.value).collect();
                interp
                    .frame
                    .variables()
                    .borrow_mut()
                    .assign(name, Value::scalar(text.clone()), false, false)?;
                Ok(ParamExpansion::Text(all_unquoted(&text)))
            } else {
                Ok(ParamExpansion::Text(value_to_text(value)))
            }
        }
        Modifier::Error { colon, word } => {
            let unset_or_empty = if colon { is_empty_lookup(&value) } else { matches!(value, Lookup::Unset) };
            if unset_or_empty {
                let message = if word.is_empty() {
                    format!("{name}: parameter not set")
                } else {
                    let text = expand_embedded(interp, word)?;
                    format!("{name}: {}", text.iter().map(|c| c.value).collect::<String>())
                };
                Err(ExpansionError::Explicit { message })
            } else {
                Ok(ParamExpansion::Text(value_to_text(value)))
            }
        }
        Modifier::Alternative { colon, word } => {
            let unset_or_empty = if colon { is_empty_lookup(&value) } else { matches!(value, Lookup::Unset) };
            if unset_or_empty {
                Ok(ParamExpansion::Text(MarkedText::new()))
            } else {
                Ok(ParamExpansion::Text(expand_embedded(interp, word)?))
            }
        }
        Modifier::RemovePrefix { longest, pattern } => {
            let text = value_to_string(&value);
            Ok(ParamExpansion::Text(all_unquoted(&crate::expand::glob::trim(
                &text, pattern, true, longest,
            ))))
        }
        Modifier::RemoveSuffix { longest, pattern } => {
            let text = value_to_string(&value);
            Ok(ParamExpansion::Text(all_unquoted(&crate::expand::glob::trim(
                &text, pattern, false, longest,
            ))))
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    posh_env::variable::is_valid_name(name)
}

fn value_to_string(value: &Lookup) -> String {
    match value {
        Lookup::Unset => String::new(),
        Lookup::Scalar(s) => s.clone(),
        Lookup::Array(a) => a.join(" "),
    }
}

/// Marked unquoted: plain parameter expansion is subject to field
/// splitting and pathname expansion unless the enclosing `Part` was
/// itself inside quotes, which [`crate::expand::requote`] applies
/// afterwards.
fn value_to_text(value: Lookup) -> MarkedText {
    all_unquoted(&value_to_string(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_interp;

    fn text_of(expansion: ParamExpansion) -> String {
        match expansion {
            ParamExpansion::Text(t) => t.iter().map(|c| c.value).collect(),
            ParamExpansion::Fields(_) => panic!("expected Text"),
        }
    }

    #[test]
    fn plain_scalar_lookup() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::scalar("hi"), false, false)
            .unwrap();
        let result = expand(&mut interp, "x", false).unwrap();
        assert_eq!(text_of(result), "hi");
    }

    #[test]
    fn colon_dash_default_on_unset() {
        let mut interp = test_interp();
        let result = expand(&mut interp, "x:-fallback", true).unwrap();
        assert_eq!(text_of(result), "fallback");
    }

    #[test]
    fn colon_dash_default_on_empty() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::scalar(""), false, false)
            .unwrap();
        let result = expand(&mut interp, "x:-fallback", true).unwrap();
        assert_eq!(text_of(result), "fallback");
    }

    #[test]
    fn dash_without_colon_keeps_empty_value() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::scalar(""), false, false)
            .unwrap();
        let result = expand(&mut interp, "x-fallback", true).unwrap();
        assert_eq!(text_of(result), "");
    }

    #[test]
    fn colon_equals_assigns_the_variable() {
        let mut interp = test_interp();
        let result = expand(&mut interp, "x:=assigned", true).unwrap();
        assert_eq!(text_of(result), "assigned");
        assert_eq!(
            interp.frame.variables().borrow().get("x").unwrap().value,
            Some(Value::scalar("assigned"))
        );
    }

    #[test]
    fn colon_question_errors_on_unset() {
        let mut interp = test_interp();
        let err = expand(&mut interp, "x:?custom message", true).unwrap_err();
        assert!(matches!(err, ExpansionError::Explicit { .. }));
    }

    #[test]
    fn length_operator() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::scalar("hello"), false, false)
            .unwrap();
        let result = expand(&mut interp, "#x", true).unwrap();
        assert_eq!(text_of(result), "5");
    }

    #[test]
    fn dollar_hash_is_positional_count_not_length() {
        let mut interp = test_interp();
        let result = expand(&mut interp, "#", false).unwrap();
        assert_eq!(text_of(result), "0");
    }

    #[test]
    fn at_inside_double_quotes_splits_into_fields() {
        let mut interp = test_interp();
        interp
            .frame
            .positional()
            .borrow_mut()
            .set_params(vec!["a".into(), "b c".into()]);
        match expand(&mut interp, "@", false).unwrap() {
            ParamExpansion::Fields(fields) => {
                assert_eq!(fields.len(), 2);
                let s: String = fields[1].iter().map(|c| c.value).collect();
                assert_eq!(s, "b c");
            }
            ParamExpansion::Text(_) => panic!("expected Fields"),
        }
    }
}
