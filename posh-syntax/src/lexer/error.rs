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

//! Lexer error taxonomy (spec.md §4.1 "Failure semantics", §7
//! `SyntaxError`).

use crate::source::Location;
use thiserror::Error;

/// Cause of a lexical error. All variants correspond to
/// `spec.md`'s `INCOMPLETE` condition: "request more input when
/// interactive; error when at EOF".
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LexError {
    #[error("unterminated single-quoted string")]
    UnterminatedSingleQuote,
    #[error("unterminated double-quoted string")]
    UnterminatedDoubleQuote,
    #[error("unterminated parameter expansion")]
    UnterminatedParameterExpansion,
    #[error("unterminated command substitution")]
    UnterminatedCommandSubstitution,
    #[error("unterminated arithmetic expansion")]
    UnterminatedArithmeticExpansion,
    #[error("here-document delimiter `{delimiter}` not found before end of input")]
    UnterminatedHereDocument { delimiter: String },
    #[error("invalid here-document delimiter")]
    InvalidHereDocDelimiter,
}

/// A lexical error together with where it occurred.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: LexError,
    pub location: Location,
}

pub type Result<T> = std::result::Result<T, Error>;
