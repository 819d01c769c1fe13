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

//! The expander (spec.md §4.2): drives a [`posh_syntax::ast::Word`]
//! through parameter/command/arithmetic/tilde substitution, field
//! splitting, pathname expansion, and quote removal, in that order.

pub mod arithmetic;
pub mod command_subst;
pub mod glob;
pub mod parameter;
pub mod split;
pub mod tilde;

use crate::error::ExpansionError;
use crate::exec::Interp;
use crate::field::{Field, MarkedChar, MarkedText};
use posh_syntax::ast::{AssignValue, Word};
use posh_syntax::token::{Part, PartKind, Quoting};

/// Marks every character in `text` quoted if `quoting` says the part it
/// came from was inside quotes, otherwise leaves it as produced (so an
/// unquoted substitution stays subject to splitting/globbing).
fn requote(mut text: MarkedText, quoting: Quoting) -> MarkedText {
    if quoting.is_quoted() {
        for c in &mut text {
            c.quoted = true;
        }
    }
    text
}

fn read_ifs(interp: &Interp) -> String {
    let variables = interp.frame.variables().borrow();
    match variables.get("IFS") {
        None => split::DEFAULT_IFS.to_string(),
        Some(var) => match &var.value {
            Some(posh_env::variable::Value::Scalar(s)) => s.clone(),
            _ => String::new(),
        },
    }
}

/// Expands a word's parts into one merged [`MarkedText`], without field
/// splitting or pathname expansion (used for contexts where a word is a
/// single semantic unit regardless of `$IFS`: assignment values, case
/// patterns, here-document delimiters).
pub fn expand_parts(interp: &mut Interp, parts: &[Part]) -> Result<MarkedText, ExpansionError> {
    let mut out = MarkedText::new();
    for part in parts {
        match &part.kind {
            PartKind::Literal(s) => {
                if part.quoting.is_quoted() {
                    out.extend(crate::field::all_quoted(s));
                } else {
                    out.extend(crate::field::all_unquoted(s));
                }
            }
            PartKind::Parameter { body, braced } => match parameter::expand(interp, body, *braced)? {
                parameter::ParamExpansion::Text(t) => out.extend(requote(t, part.quoting)),
                parameter::ParamExpansion::Fields(fields) => {
                    for (i, f) in fields.into_iter().enumerate() {
                        if i > 0 {
                            out.push(MarkedChar::quoted(' '));
                        }
                        out.extend(requote(f, part.quoting));
                    }
                }
            },
            PartKind::CommandSubstitution { body, .. } => {
                let t = command_subst::expand(interp, body, &part.location)?;
                out.extend(requote(t, part.quoting));
            }
            PartKind::Arithmetic { body } => {
                let n = arithmetic::expand(interp, body)?;
                out.extend(requote(crate::field::all_unquoted(&n.to_string()), part.quoting));
            }
            PartKind::Tilde { body } => {
                out.extend(tilde::expand(interp, body));
            }
        }
    }
    Ok(out)
}

/// True if `$@` unsplit splicing applies: the word is exactly the
/// special parameter `@` and nothing else (spec.md §4.2 "`\"$@\"`
/// splices the positional parameters as independent fields").
fn bare_at_splice(interp: &mut Interp, word: &Word) -> Result<std::option::Option<Vec<Field>>, ExpansionError> {
    let [part] = word.parts.as_slice() else {
        return Ok(None);
    };
    let PartKind::Parameter { body, braced: false } = &part.kind else {
        return Ok(None);
    };
    if body != "@" {
        return Ok(None);
    }
    let items = interp.frame.positional().borrow().params().to_vec();
    Ok(Some(items.into_iter().map(Field).collect()))
}

/// Expands one command-line word into its resulting fields (spec.md
/// §4.2: substitution, then field splitting, then pathname expansion,
/// then quote removal).
pub fn expand_word(interp: &mut Interp, word: &Word) -> Result<Vec<Field>, ExpansionError> {
    if let Some(fields) = bare_at_splice(interp, word)? {
        return Ok(fields);
    }

    let merged = expand_parts(interp, &word.parts)?;
    let had_quotes = word.parts.iter().any(|p| p.quoting.is_quoted());

    let ifs = read_ifs(interp);
    let mut marked_fields = split::split(&merged, &ifs);
    if marked_fields.is_empty() && had_quotes {
        marked_fields.push(MarkedText::new());
    }

    let noglob = interp.frame.options().borrow().is_on(posh_env::option::NoGlob);
    let cwd = interp.frame.cwd().borrow().clone();
    let mut fields = Vec::new();
    for text in marked_fields {
        if !noglob {
            let matches = glob::expand_pattern(&text, &cwd);
            if !matches.is_empty() {
                fields.extend(matches.into_iter().map(Field));
                continue;
            }
        }
        fields.push(Field::from(text));
    }
    Ok(fields)
}

/// Expands a whole word list (e.g. a simple command's argument words),
/// concatenating every word's resulting fields in order.
pub fn expand_words(interp: &mut Interp, words: &[Word]) -> Result<Vec<Field>, ExpansionError> {
    let mut fields = Vec::new();
    for word in words {
        fields.extend(expand_word(interp, word)?);
    }
    Ok(fields)
}

/// Expands a word used as a redirection target: substitution, quote
/// removal, no field splitting or pathname expansion, and an error if
/// the result does not collapse to exactly one field (spec.md §4.2
/// "ambiguous redirect").
pub fn expand_redirection_target(interp: &mut Interp, word: &Word) -> Result<Field, ExpansionError> {
    let merged = expand_parts(interp, &word.parts)?;
    Ok(Field::from(merged))
}

/// Expands an assignment's right-hand side: substitution and quote
/// removal, no field splitting or pathname expansion.
pub fn expand_assignment_value(interp: &mut Interp, value: &AssignValue) -> Result<posh_env::variable::Value, ExpansionError> {
    match value {
        AssignValue::Scalar(word) => {
            let merged = expand_parts(interp, &word.parts)?;
            Ok(posh_env::variable::Value::Scalar(Field::from(merged).0))
        }
        AssignValue::Array(words) => {
            let mut items = Vec::new();
            for word in words {
                for field in expand_word(interp, word)? {
                    items.push(field.0);
                }
            }
            Ok(posh_env::variable::Value::Array(items))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_interp;
    use posh_env::variable::Value;
    use posh_syntax::token::Quoting as SynQuoting;
    use posh_syntax::source::Location;

    fn literal(s: &str, quoting: SynQuoting) -> Part {
        Part {
            kind: PartKind::Literal(s.to_string()),
            quoting,
            location: Location::dummy("test"),
        }
    }

    #[test]
    fn plain_word_splits_on_ifs() {
        let mut interp = test_interp();
        let word = Word {
            parts: vec![literal("a  b", SynQuoting::UNQUOTED)],
            location: Location::dummy("test"),
        };
        let fields = expand_word(&mut interp, &word).unwrap();
        assert_eq!(fields, vec![Field::from("a"), Field::from("b")]);
    }

    #[test]
    fn quoted_word_is_not_split() {
        let mut interp = test_interp();
        let word = Word {
            parts: vec![literal("a  b", SynQuoting::DOUBLE)],
            location: Location::dummy("test"),
        };
        let fields = expand_word(&mut interp, &word).unwrap();
        assert_eq!(fields, vec![Field::from("a  b")]);
    }

    #[test]
    fn assignment_value_is_not_split() {
        let mut interp = test_interp();
        let value = AssignValue::Scalar(Word {
            parts: vec![literal("a b", SynQuoting::UNQUOTED)],
            location: Location::dummy("test"),
        });
        let result = expand_assignment_value(&mut interp, &value).unwrap();
        assert_eq!(result, Value::scalar("a b"));
    }

    #[test]
    fn bare_dollar_at_splices_positional_params() {
        let mut interp = test_interp();
        interp
            .frame
            .positional()
            .borrow_mut()
            .set_params(vec!["one".into(), "two three".into()]);
        let word = Word {
            parts: vec![Part {
                kind: PartKind::Parameter {
                    body: "@".to_string(),
                    braced: false,
                },
                quoting: SynQuoting::UNQUOTED,
                location: Location::dummy("test"),
            }],
            location: Location::dummy("test"),
        };
        let fields = expand_word(&mut interp, &word).unwrap();
        assert_eq!(fields, vec![Field::from("one"), Field::from("two three")]);
    }
}
