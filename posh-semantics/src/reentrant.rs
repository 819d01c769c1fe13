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

//! Re-entrant text-to-[`List`] conversion for the two places this crate
//! must turn a raw string back into something runnable: a command
//! substitution body (spec.md §4.2) and a trap action body (spec.md
//! §4.5). Both are required to run through *this* shell's own executor —
//! not a different program — so that unexported variables, functions and
//! aliases stay visible, which only holds if nothing ever calls `exec*`
//! on a separate binary.
//!
//! `posh-syntax` deliberately ships no parser (its own module docs: "This
//! crate does not implement a parser"), so this is not that parser: it
//! builds only a `;`/newline-separated sequence of simple commands
//! (assignment-prefixes plus command words), reusing the crate's own
//! [`Lexer`] for tokenizing and word-part scanning. Pipes, `&&`/`||`,
//! `&`, subshells, redirections and compound commands in a substituted
//! or trapped body are rejected with a clear error rather than silently
//! misread; SPEC_FULL.md does not require more than this for either
//! caller, and growing a second general-purpose grammar parser here
//! would duplicate the one the surrounding system already owns.

use crate::error::ExpansionError;
use posh_syntax::ast::{AndOrList, Assign, AssignValue, Command, Item, List, Pipeline, SimpleCommand, Word};
use posh_syntax::lexer::Lexer;
use posh_syntax::source::Source;
use posh_syntax::token::{Classification, PartKind, Token};

/// Parses `body` as a bounded sequence of simple commands (see module
/// docs for exactly what is and is not accepted).
pub fn parse_simple_command_sequence(source: Source, body: &str) -> Result<List, ExpansionError> {
    let mut lexer = Lexer::new(source, body);
    let mut items = Vec::new();
    let mut assigns = Vec::new();
    let mut words = Vec::new();

    loop {
        let token = lexer
            .next_token()
            .map_err(|e| ExpansionError::Explicit { message: e.to_string() })?;
        match token.classification {
            Classification::EndOfInput => {
                flush(&mut items, &mut assigns, &mut words);
                return Ok(List(items));
            }
            Classification::Newline => flush(&mut items, &mut assigns, &mut words),
            Classification::Operator if token.location.fragment() == ";" => {
                flush(&mut items, &mut assigns, &mut words);
            }
            Classification::Operator | Classification::Keyword => {
                return Err(unsupported(token.location.fragment()));
            }
            Classification::IoNumber => return Err(unsupported("redirection")),
            Classification::AssignmentWord => assigns.push(to_assign(token)),
            Classification::Word => words.push(Word {
                parts: token.parts,
                location: token.location,
            }),
        }
    }
}

fn flush(items: &mut Vec<Item>, assigns: &mut Vec<Assign>, words: &mut Vec<Word>) {
    if assigns.is_empty() && words.is_empty() {
        return;
    }
    let simple = SimpleCommand {
        assigns: std::mem::take(assigns),
        words: std::mem::take(words),
        redirs: Vec::new(),
    };
    let pipeline = Pipeline {
        commands: vec![std::rc::Rc::new(Command::Simple(simple))],
        negation: false,
    };
    let and_or = AndOrList {
        first: pipeline,
        rest: Vec::new(),
    };
    items.push(Item {
        and_or: std::rc::Rc::new(and_or),
        is_async: false,
    });
}

/// Splits an `AssignmentWord` token's leading `NAME=` literal prefix from
/// its value. The lexer only marks a token as an assignment-word when its
/// first part is an unquoted `Literal` containing the `=` (see
/// `posh_syntax::lexer::find_assignment_eq`), so the split below always
/// finds one.
fn to_assign(mut token: Token) -> Assign {
    let first = token.parts.remove(0);
    let PartKind::Literal(text) = first.kind else {
        unreachable!("lexer only marks Literal-prefixed tokens as assignment words")
    };
    let eq = text.find('=').expect("assignment word contains '='");
    let name = text[..eq].to_string();
    let mut value_parts = vec![posh_syntax::token::Part {
        kind: PartKind::Literal(text[eq + 1..].to_string()),
        quoting: first.quoting,
        location: first.location,
    }];
    value_parts.extend(token.parts);
    Assign {
        location: token.location.clone(),
        name,
        value: AssignValue::Scalar(Word {
            parts: value_parts,
            location: token.location,
        }),
    }
}

fn unsupported(fragment: &str) -> ExpansionError {
    ExpansionError::Explicit {
        message: format!(
            "unsupported syntax in command substitution or trap action: {fragment:?} \
             (only `;`/newline-separated simple commands are supported here)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> List {
        parse_simple_command_sequence(Source::Unknown, body).unwrap()
    }

    #[test]
    fn single_simple_command() {
        let list = parse("echo hi");
        assert_eq!(list.0.len(), 1);
        let Command::Simple(cmd) = &*list.0[0].and_or.first.commands[0] else {
            panic!("expected simple command");
        };
        assert_eq!(cmd.words[0].as_literal().as_deref(), Some("echo"));
        assert_eq!(cmd.words[1].as_literal().as_deref(), Some("hi"));
    }

    #[test]
    fn assignment_prefix_is_split_on_first_equals() {
        let list = parse("x=1");
        let Command::Simple(cmd) = &*list.0[0].and_or.first.commands[0] else {
            panic!("expected simple command");
        };
        assert_eq!(cmd.assigns[0].name, "x");
        let AssignValue::Scalar(value) = &cmd.assigns[0].value else {
            panic!("expected scalar value");
        };
        assert_eq!(value.as_literal().as_deref(), Some("1"));
    }

    #[test]
    fn semicolon_separates_commands() {
        let list = parse("x=1; echo $x");
        assert_eq!(list.0.len(), 2);
    }

    #[test]
    fn pipe_is_rejected() {
        let err = parse_simple_command_sequence(Source::Unknown, "a | b").unwrap_err();
        assert!(matches!(err, ExpansionError::Explicit { .. }));
    }

    #[test]
    fn empty_body_is_an_empty_list() {
        let list = parse("");
        assert!(list.0.is_empty());
    }
}
