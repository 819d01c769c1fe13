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

//! The intermediate "marked" text the expander works with, and the plain
//! [`Field`] it ultimately produces (spec.md §4.2 "Quote removal").
//!
//! Every expansion stage (parameter lookup, command substitution,
//! arithmetic, tilde, field splitting, pathname expansion) operates on
//! [`MarkedChar`] sequences so each character keeps its "was this byte
//! quoted" provenance until quote removal, the final stage, drops it.

/// One character of a word mid-expansion, carrying its quoting
/// provenance (spec.md §3 "Invariants on Parts"; §4.2's splitting and
/// globbing rules both key off `quoted`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MarkedChar {
    pub value: char,
    /// True if this character came from inside quotes (single, double,
    /// or a backslash escape) and must not participate in field
    /// splitting or be treated as a glob metacharacter.
    pub quoted: bool,
}

impl MarkedChar {
    #[must_use]
    pub fn quoted(value: char) -> Self {
        MarkedChar { value, quoted: true }
    }

    #[must_use]
    pub fn unquoted(value: char) -> Self {
        MarkedChar { value, quoted: false }
    }
}

/// A run of [`MarkedChar`]s: a word, or one of the fields it splits into.
pub type MarkedText = Vec<MarkedChar>;

/// Builds a [`MarkedText`] from a plain string, all marked as `quoted`
/// (used for literal text under single or double quotes, and for tilde
/// expansion results, which POSIX exempts from splitting/globbing
/// regardless of quoting).
#[must_use]
pub fn all_quoted(s: &str) -> MarkedText {
    s.chars().map(MarkedChar::quoted).collect()
}

/// Builds a [`MarkedText`] from a plain string, all marked unquoted
/// (used for literal parts outside any quotes).
#[must_use]
pub fn all_unquoted(s: &str) -> MarkedText {
    s.chars().map(MarkedChar::unquoted).collect()
}

/// A fully expanded field, as the executor sees it: quote markers have
/// been stripped (spec.md §4.2 "Quote removal" — "a `Field` downstream
/// of the expander is a plain `String`").
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Field(pub String);

impl Field {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<MarkedText> for Field {
    fn from(text: MarkedText) -> Self {
        Field(text.into_iter().map(|c| c.value).collect())
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field(s.to_string())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
