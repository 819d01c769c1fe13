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

//! Lexer and abstract syntax tree data types for a POSIX shell.
//!
//! This crate covers the lexical layer of the shell language: the
//! [`lexer`] module turns source text into a stream of [`token::Token`]s,
//! and the [`ast`] module defines the tree shape an (out-of-scope) parser
//! builds from that stream. [`source`] tracks where every token and AST
//! node came from so diagnostics can point back at the original script.
//!
//! This crate does not implement a parser: `token`/`lexer` and `ast` are
//! a shared vocabulary between a parser and the rest of the shell, not a
//! parser itself.

pub mod ast;
pub mod lexer;
pub mod source;
pub mod token;
