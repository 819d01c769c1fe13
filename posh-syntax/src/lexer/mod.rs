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

//! Mode-stack tokenizer (spec.md §4.1).
//!
//! [`Lexer::next_token`] is the single entry point the (external) parser
//! calls repeatedly to obtain a stream of [`Token`]s (spec.md §6:
//! "The parser is given a `next_token()` callback").

pub mod error;
mod expansion;
mod heredoc;
pub mod keyword;
pub mod mode;
pub mod operator;
mod quote;

pub use error::{Error, LexError, Result};
pub use heredoc::PendingHereDoc;
pub use mode::{Mode, ModeStack};

use crate::source::{Code, Location, Source};
use crate::token::{Classification, Part, PartKind, Quoting, Token};
use std::rc::Rc;

/// A mode-stack tokenizer over a single [`Code`] buffer.
///
/// The lexer is deliberately synchronous (no async `Input` abstraction):
/// per SPEC_FULL.md §5, this core's concurrency model is plain blocking
/// calls, and a script's full text is available up front once read by the
/// (out-of-scope) input/CLI layer. Interactive incremental reads are
/// supported by [`Lexer::feed`], which appends more text and lets an
/// in-flight scan that hit end-of-input resume.
#[derive(Clone, Debug)]
pub struct Lexer {
    code: Rc<Code>,
    pos: usize,
    pub(crate) modes: ModeStack,
    pending_heredocs: Vec<PendingHereDoc>,
    /// True at the start of a command (start of input, or just after a
    /// command separator/operator/keyword that introduces a new command),
    /// used to decide keyword and assignment-word recognition.
    at_command_position: bool,
    /// Set by a just-matched `<<`/`<<-` operator; the next word scanned
    /// becomes that here-document's delimiter (spec.md §4.1 "Heredoc").
    pending_heredoc_tabs: Option<bool>,
}

impl Lexer {
    /// Creates a lexer over the given source text.
    #[must_use]
    pub fn new(source: Source, text: impl Into<String>) -> Self {
        let value: Rc<str> = Rc::from(text.into());
        let code = Rc::new(Code {
            source: Rc::new(source),
            value,
            start_line: 1,
        });
        Lexer {
            code,
            pos: 0,
            modes: ModeStack::default(),
            pending_heredocs: Vec::new(),
            at_command_position: true,
            pending_heredoc_tabs: None,
        }
    }

    /// Appends more text to the end of the buffer, for interactive use
    /// when a scan ran out of input mid-token (spec.md §4.1 "request more
    /// input when interactive").
    pub fn feed(&mut self, more: &str) {
        let mut combined = String::with_capacity(self.code.value.len() + more.len());
        combined.push_str(&self.code.value);
        combined.push_str(more);
        self.code = Rc::new(Code {
            source: Rc::clone(&self.code.source),
            value: Rc::from(combined),
            start_line: self.code.start_line,
        });
    }

    #[must_use]
    pub(crate) fn rest(&self) -> &str {
        &self.code.value[self.pos..]
    }

    #[must_use]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[must_use]
    pub(crate) fn peek2(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.code.value.len()
    }

    pub(crate) fn location_from(&self, start: usize) -> Location {
        Location {
            code: Rc::clone(&self.code),
            range: start..self.pos,
        }
    }

    pub(crate) fn location_here(&self) -> Location {
        self.location_from(self.pos)
    }

    pub(crate) fn code_value_range(&self, start: usize, end: usize) -> String {
        self.code.value[start..end].to_string()
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Produces the next token. See module docs.
    pub fn next_token(&mut self) -> Result<Token> {
        if self.modes.top() == Mode::Normal {
            self.skip_blanks_and_comments();
        }

        if self.at_end() {
            return Ok(Token::end_of_input(self.location_here()));
        }

        let c = self.peek().unwrap();

        if c == '\n' {
            let start = self.pos;
            self.advance();
            if !self.pending_heredocs.is_empty() {
                self.collect_pending_heredocs()?;
            }
            self.at_command_position = true;
            return Ok(Token::newline(self.location_from(start)));
        }

        if operator::starts_operator(c) {
            if let Some(op) = operator::match_operator(self.rest()) {
                let start = self.pos;
                self.pos += op.len();
                self.at_command_position = matches!(op, "|" | "||" | "&&" | ";" | "(" | "&");
                match op {
                    "<<" => self.pending_heredoc_tabs = Some(false),
                    "<<-" => self.pending_heredoc_tabs = Some(true),
                    _ => {}
                }
                return Ok(Token::operator(self.location_from(start)));
            }
        }

        // An unquoted digit run immediately before `<`/`>` is an io-number
        // (spec.md §4.1).
        if c.is_ascii_digit() {
            let mut la = self.rest().chars();
            let mut n = 0usize;
            while la.next().is_some_and(|d| d.is_ascii_digit()) {
                n += 1;
            }
            let after: Vec<char> = self.rest().chars().skip(n).take(2).collect();
            if matches!(after.first(), Some('<') | Some('>')) {
                let start = self.pos;
                self.pos += n;
                return Ok(Token::io_number(self.location_from(start)));
            }
        }

        let start = self.pos;
        let parts = self.scan_word_parts(WordContext::Normal)?;
        let mut token = Token::word(parts, self.location_from(start));

        if let Some(remove_leading_tabs) = self.pending_heredoc_tabs.take() {
            let delimiter = concat_literal(&token);
            let delimiter_was_quoted = token.parts.iter().any(|p| p.quoting.is_quoted());
            self.queue_heredoc(delimiter, delimiter_was_quoted, remove_leading_tabs);
            self.at_command_position = false;
            return Ok(token);
        }

        if self.at_command_position {
            if let Some(literal) = token.is_plain_literal().then(|| concat_literal(&token)) {
                if keyword::is_keyword(&literal) {
                    token.classification = Classification::Keyword;
                    // Every keyword is immediately followed by the start of
                    // a new command or command list (`in`'s word list is
                    // the one near-exception; the parser, not the lexer,
                    // is responsible for not misreading a pattern word as
                    // a keyword there).
                    self.at_command_position = true;
                    return Ok(token);
                }
            }
            if let Some(eq) = find_assignment_eq(&token) {
                if eq > 0 {
                    token.mark_assignment();
                }
            }
        }
        self.at_command_position = false;

        Ok(token)
    }

    /// Registers a here-document operator's delimiter so its body is
    /// collected at the next logical-line boundary (spec.md §4.1
    /// "Heredoc").
    pub(crate) fn queue_heredoc(
        &mut self,
        delimiter: String,
        delimiter_was_quoted: bool,
        remove_leading_tabs: bool,
    ) -> usize {
        self.pending_heredocs.push(PendingHereDoc {
            delimiter,
            delimiter_was_quoted,
            remove_leading_tabs,
            body: None,
        });
        self.pending_heredocs.len() - 1
    }

    /// Takes ownership of the collected here-document bodies, in the
    /// order they were queued, clearing the pending queue.
    pub fn take_heredocs(&mut self) -> Vec<PendingHereDoc> {
        std::mem::take(&mut self.pending_heredocs)
    }
}

/// Where a word is being scanned from, so `$@`/field boundaries and
/// tilde-expansion opportunities can differ slightly by caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WordContext {
    Normal,
    DoubleQuoted,
    ParamExpBraced,
    Backtick,
}

fn concat_literal(token: &Token) -> String {
    let mut s = String::new();
    for part in &token.parts {
        if let PartKind::Literal(text) = &part.kind {
            s.push_str(text);
        }
    }
    s
}

/// Finds the byte offset of the `=` that turns a word into an
/// assignment-word: the prefix up to it must be a valid variable name and
/// the word must not need pathname expansion through that prefix
/// (spec.md §4.1: "A word that contains an unquoted `=` after a valid
/// variable-name prefix, at command position, becomes an assignment-word").
fn find_assignment_eq(token: &Token) -> Option<usize> {
    // Only a token whose first part is a plain, unquoted literal can
    // start with a bare `name=`.
    let first = token.parts.first()?;
    let PartKind::Literal(text) = &first.kind else {
        return None;
    };
    if first.quoting.is_quoted() {
        return None;
    }
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let valid_start = bytes[0] == b'_' || bytes[0].is_ascii_alphabetic();
    if !valid_start {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'=' {
        Some(i)
    } else {
        None
    }
}

fn make_part(kind: PartKind, quoting: Quoting, location: Location) -> Part {
    Part {
        kind,
        quoting,
        location,
    }
}

pub(crate) use make_part as part;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Classification;

    fn tokens(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(Source::Unknown, src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex ok");
            let done = tok.classification == Classification::EndOfInput;
            out.push(tok);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_command_tokenizes() {
        let toks = tokens("echo hello");
        assert_eq!(toks.len(), 3); // echo, hello, EOF
        assert_eq!(toks[0].classification, Classification::Word);
        assert_eq!(concat_literal(&toks[0]), "echo");
        assert_eq!(concat_literal(&toks[1]), "hello");
    }

    #[test]
    fn operators_are_maximal_munch() {
        let toks = tokens("a>>b");
        assert_eq!(concat_literal(&toks[0]), "a");
        assert_eq!(toks[1].classification, Classification::Operator);
        assert_eq!(toks[1].location.fragment(), ">>");
    }

    #[test]
    fn io_number_before_redirection() {
        let toks = tokens("2>file");
        assert_eq!(toks[0].classification, Classification::IoNumber);
        assert_eq!(toks[1].location.fragment(), ">");
    }

    #[test]
    fn keyword_recognized_at_command_position() {
        let toks = tokens("while true");
        assert_eq!(toks[0].classification, Classification::Keyword);
        assert_eq!(concat_literal(&toks[1]), "true");
    }

    #[test]
    fn assignment_word_recognized() {
        let toks = tokens("x=1 echo");
        assert_eq!(toks[0].classification, Classification::AssignmentWord);
        assert_eq!(toks[1].classification, Classification::Word);
    }

    #[test]
    fn single_quoted_word_is_one_literal_part() {
        let toks = tokens("'a b'");
        assert_eq!(toks[0].parts.len(), 1);
        assert_eq!(concat_literal(&toks[0]), "a b");
        assert!(!toks[0].needs_field_splitting);
    }
}
