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

//! Source locations used to tag tokens, AST nodes and diagnostics.
//!
//! A [`Location`] identifies a byte range in a [`Source`] so that errors
//! reported deep inside the expander or executor can still be rendered
//! against the original script text.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// Origin of the characters the lexer consumed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Top-level script file, read from the given name (`-` for stdin).
    Script { name: Rc<str> },
    /// `-c command` argument on the shell command line.
    CommandLine,
    /// Body of a `$( … )` or backquote command substitution.
    CommandSubstitution { parent: Box<Location> },
    /// Body of a `$(( … ))` arithmetic expansion.
    Arithmetic { parent: Box<Location> },
    /// Source read by the `.` (dot) built-in.
    DotScript { name: Rc<str>, parent: Box<Location> },
    /// Source synthesized by `eval`.
    Eval { parent: Box<Location> },
    /// A trap action being executed as if it were read from input.
    Trap { parent: Box<Location> },
    /// Location is not tracked (e.g. an AST built directly from `&str`).
    Unknown,
}

/// A piece of source code: the full text plus where it came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Code {
    /// Where this text came from.
    pub source: Rc<Source>,
    /// The text itself.
    pub value: Rc<str>,
    /// Line number (1-based) of the first character of `value` within a
    /// larger logical input stream, used only for diagnostics.
    pub start_line: u32,
}

/// A span of source code, used to annotate tokens, AST nodes and errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// The code this location refers into.
    pub code: Rc<Code>,
    /// Byte range within `code.value`.
    pub range: Range<usize>,
}

impl Location {
    /// Creates a location with [`Source::Unknown`] spanning the whole text.
    ///
    /// Useful for tests and for ASTs parsed directly from a `&str` with no
    /// surrounding script context.
    #[must_use]
    pub fn dummy<S: Into<String>>(text: S) -> Self {
        let value: Rc<str> = Rc::from(text.into());
        let code = Rc::new(Code {
            source: Rc::new(Source::Unknown),
            value: Rc::clone(&value),
            start_line: 1,
        });
        Location {
            range: 0..value.len(),
            code,
        }
    }

    /// Returns the substring this location points at.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.code.value[self.range.clone()]
    }

    /// 1-based line number of the start of this location, counted by
    /// newlines in `code.value` preceding `range.start`.
    #[must_use]
    pub fn line(&self) -> u32 {
        let preceding = &self.code.value[..self.range.start.min(self.code.value.len())];
        self.code.start_line + preceding.matches('\n').count() as u32
    }

    /// 1-based column number (in bytes) of the start of this location.
    #[must_use]
    pub fn column(&self) -> u32 {
        let preceding = &self.code.value[..self.range.start.min(self.code.value.len())];
        match preceding.rfind('\n') {
            Some(i) => (self.range.start - i) as u32,
            None => self.range.start as u32 + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line(), self.column())
    }
}

#[cfg(feature = "annotate")]
pub mod annotate {
    //! Conversion of [`Location`] into `annotate-snippets` builder values.
    //!
    //! This crate never renders a diagnostic itself (no terminal or ANSI
    //! concerns): it only hands a host CLI the pieces it needs
    //! (`source_name`, `line`, `column`, `range`, `label`) to build a
    //! [`annotate_snippets::Snippet`].
    use super::Location;

    /// Plain-data description of a single annotation, independent of any
    /// particular rendering backend.
    #[derive(Clone, Debug)]
    pub struct Annotation {
        pub source_name: String,
        pub line: u32,
        pub column: u32,
        pub range: std::ops::Range<usize>,
        pub label: String,
    }

    impl Annotation {
        /// Builds an annotation from a location and a message.
        #[must_use]
        pub fn new(location: &Location, label: impl Into<String>) -> Self {
            Annotation {
                source_name: format!("{:?}", location.code.source),
                line: location.line(),
                column: location.column(),
                range: location.range.clone(),
                label: label.into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_location_spans_whole_text() {
        let loc = Location::dummy("echo hi");
        assert_eq!(loc.fragment(), "echo hi");
        assert_eq!(loc.line(), 1);
        assert_eq!(loc.column(), 1);
    }

    #[test]
    fn line_and_column_after_newlines() {
        let value: Rc<str> = Rc::from("a\nbc\ndef");
        let code = Rc::new(Code {
            source: Rc::new(Source::Unknown),
            value: Rc::clone(&value),
            start_line: 1,
        });
        let loc = Location {
            range: 7..8,
            code,
        };
        assert_eq!(loc.fragment(), "f");
        assert_eq!(loc.line(), 3);
        assert_eq!(loc.column(), 3);
    }
}
