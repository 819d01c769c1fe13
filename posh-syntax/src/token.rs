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

//! The [`Token`] and [`Part`] data model produced by the lexer.
//!
//! A `Token` is a lexical unit recognized in the source. A word token
//! carries an ordered sequence of [`Part`]s instead of a plain `String`,
//! because each fragment of a word may need independent expansion
//! treatment later. See `spec.md` §3 "Token" / "Invariants on Parts".

use crate::source::Location;

/// What kind of token this is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    /// An ordinary word, possibly subject to expansion.
    Word,
    /// A word recognized as `name=value` at a command-word position.
    AssignmentWord,
    /// A control operator (`|`, `||`, `&&`, `;`, `;;`, `&`, `(`, `)`) or a
    /// redirection operator (`<`, `<<`, `<<-`, `<&`, `>`, `>>`, `>&`, `>|`,
    /// `<>`).
    Operator,
    /// A word recognized as a reserved word (`if`, `then`, …) because it
    /// appears unquoted, unexpanded, at a command-word position.
    Keyword,
    /// A single newline, which in POSIX shell grammar is a command
    /// separator distinct from other whitespace.
    Newline,
    /// An unquoted digit run immediately preceding `<` or `>`.
    IoNumber,
    /// End of input.
    EndOfInput,
}

/// Whether a fragment of text was seen inside quotes, and which kind.
///
/// Both flags set means the fragment came from inside single quotes (where
/// POSIX says the result behaves as if also double-quoted for expansion
/// purposes). Only `was_double_quoted` means the fragment is inside double
/// quotes but was itself produced by an expansion that the double quotes
/// still suppress splitting/globbing for. Neither flag means the fragment
/// is unquoted and is subject to field splitting and pathname expansion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Quoting {
    pub was_single_quoted: bool,
    pub was_double_quoted: bool,
}

impl Quoting {
    pub const UNQUOTED: Quoting = Quoting {
        was_single_quoted: false,
        was_double_quoted: false,
    };

    pub const SINGLE: Quoting = Quoting {
        was_single_quoted: true,
        was_double_quoted: true,
    };

    pub const DOUBLE: Quoting = Quoting {
        was_single_quoted: false,
        was_double_quoted: true,
    };

    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.was_single_quoted || self.was_double_quoted
    }
}

/// A fragment of a word.
///
/// Invariants (spec.md §3): a `Literal` under single quotes carries
/// `Quoting::SINGLE` and is never field-split; a `Literal` under double
/// quotes carries `Quoting::DOUBLE` only; `Parameter`, `CommandSubstitution`,
/// `Arithmetic` and `Tilde` parts never carry `was_single_quoted` since the
/// lexer does not open those sub-modes while scanning single-quoted text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PartKind {
    /// Plain text with no further expansion.
    Literal(String),
    /// `$name`, `${...}`, special/positional parameters. The raw opaque
    /// body (including any `${` `}` modifier syntax) is kept verbatim; it
    /// is reparsed by the expander (spec.md §4.1 "full operator syntax …
    /// is accepted by the lexer as an opaque body").
    Parameter { body: String, braced: bool },
    /// `$(...)` or `` `...` ``. `backquoted` distinguishes the two forms,
    /// which differ in backslash-escape handling at sub-lex time.
    CommandSubstitution { body: String, backquoted: bool },
    /// `$((...))`.
    Arithmetic { body: String },
    /// A leading `~` or `~name` tilde prefix.
    Tilde { body: String },
}

/// One fragment of a word, with its source position and quoting
/// provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    pub kind: PartKind,
    pub quoting: Quoting,
    pub location: Location,
}

impl Part {
    #[must_use]
    pub fn literal(text: impl Into<String>, quoting: Quoting, location: Location) -> Self {
        Part {
            kind: PartKind::Literal(text.into()),
            quoting,
            location,
        }
    }

    /// A literal part can never carry single-quote provenance without also
    /// carrying double-quote provenance (see module docs); this asserts
    /// that invariant for literals built outside the lexer (e.g. in tests).
    #[must_use]
    pub fn is_provenance_valid(&self) -> bool {
        match &self.kind {
            PartKind::Literal(_) => true,
            _ => !self.quoting.was_single_quoted,
        }
    }
}

/// A lexical token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub classification: Classification,
    /// The parts making up a word. Empty for operators, keywords and
    /// newlines, which carry their text in `location.fragment()` instead.
    pub parts: Vec<Part>,
    pub location: Location,
    /// Set when any part needs parameter/command/arithmetic/tilde
    /// expansion (i.e. is not a plain `Literal`).
    pub needs_expansion: bool,
    /// Set unless the whole token is fully double- or single-quoted, or
    /// consists of a single `Parameter` part for `"$@"`-style expansion
    /// that is handled specially by the expander.
    pub needs_field_splitting: bool,
    /// Set when the token (after expansion) may contain unquoted glob
    /// metacharacters.
    pub needs_pathname_expansion: bool,
}

impl Token {
    /// Builds a word token from its parts, deriving the three "needs"
    /// flags from their content (spec.md §3).
    #[must_use]
    pub fn word(parts: Vec<Part>, location: Location) -> Self {
        let needs_expansion = parts
            .iter()
            .any(|p| !matches!(p.kind, PartKind::Literal(_)));
        let fully_quoted = !parts.is_empty() && parts.iter().all(|p| p.quoting.is_quoted());
        let needs_pathname_expansion = !fully_quoted;
        Token {
            classification: Classification::Word,
            parts,
            location,
            needs_expansion,
            needs_field_splitting: !fully_quoted,
            needs_pathname_expansion,
        }
    }

    #[must_use]
    pub fn operator(location: Location) -> Self {
        Token {
            classification: Classification::Operator,
            parts: Vec::new(),
            location,
            needs_expansion: false,
            needs_field_splitting: false,
            needs_pathname_expansion: false,
        }
    }

    #[must_use]
    pub fn keyword(location: Location) -> Self {
        Token {
            classification: Classification::Keyword,
            ..Token::operator(location)
        }
    }

    #[must_use]
    pub fn newline(location: Location) -> Self {
        Token {
            classification: Classification::Newline,
            ..Token::operator(location)
        }
    }

    #[must_use]
    pub fn io_number(location: Location) -> Self {
        Token {
            classification: Classification::IoNumber,
            ..Token::operator(location)
        }
    }

    #[must_use]
    pub fn end_of_input(location: Location) -> Self {
        Token {
            classification: Classification::EndOfInput,
            ..Token::operator(location)
        }
    }

    /// Reclassifies a `Word` token as an `AssignmentWord` in place.
    ///
    /// Called by the parser (external collaborator) once it knows it is at
    /// a command-word position and the token matched `name=value`; kept
    /// here because the invariant it enforces (assignment words cannot
    /// need pathname expansion on the `name=` prefix) belongs to the token
    /// model.
    pub fn mark_assignment(&mut self) {
        debug_assert_eq!(self.classification, Classification::Word);
        self.classification = Classification::AssignmentWord;
    }

    /// True if every part is a `Literal` (no expansion needed at all).
    #[must_use]
    pub fn is_plain_literal(&self) -> bool {
        !self.needs_expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::dummy(s)
    }

    #[test]
    fn single_quoted_literal_is_not_field_split() {
        let part = Part::literal("a b", Quoting::SINGLE, loc("'a b'"));
        let token = Token::word(vec![part], loc("'a b'"));
        assert!(!token.needs_field_splitting);
        assert!(!token.needs_pathname_expansion);
        assert!(!token.needs_expansion);
    }

    #[test]
    fn unquoted_parameter_needs_expansion_and_splitting() {
        let part = Part {
            kind: PartKind::Parameter {
                body: "x".into(),
                braced: false,
            },
            quoting: Quoting::UNQUOTED,
            location: loc("$x"),
        };
        let token = Token::word(vec![part], loc("$x"));
        assert!(token.needs_expansion);
        assert!(token.needs_field_splitting);
        assert!(token.needs_pathname_expansion);
    }

    #[test]
    fn provenance_invariant_holds_for_non_literal_parts() {
        let part = Part {
            kind: PartKind::Tilde { body: String::new() },
            quoting: Quoting::UNQUOTED,
            location: loc("~"),
        };
        assert!(part.is_provenance_valid());
    }
}
