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

//! Here-document collection (spec.md §4.1 "Heredoc").
//!
//! A `<<` or `<<-` operator queues a delimiter; its body text is only
//! collected once the current logical line ends, since POSIX allows
//! several here-documents to share one line (`cmd <<A <<B`) and the
//! bodies follow in order after the newline that ends the command line.

use super::{Lexer, Result};
use crate::lexer::error::LexError;

/// A here-document whose delimiter has been seen but whose body may not
/// have been collected yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingHereDoc {
    pub delimiter: String,
    /// Whether the delimiter word contained any quoted part; if so, the
    /// body is not subject to expansion (spec.md §4.1).
    pub delimiter_was_quoted: bool,
    /// True for `<<-`: leading tabs are stripped from the delimiter line
    /// and every body line before comparison/storage.
    pub remove_leading_tabs: bool,
    pub body: Option<String>,
}

impl Lexer {
    /// Collects the body of every here-document queued since the last
    /// collection, in the order their operators appeared.
    pub(crate) fn collect_pending_heredocs(&mut self) -> Result<()> {
        for i in 0..self.pending_heredocs.len() {
            if self.pending_heredocs[i].body.is_some() {
                continue;
            }
            let delimiter = self.pending_heredocs[i].delimiter.clone();
            let strip_tabs = self.pending_heredocs[i].remove_leading_tabs;
            let body = self.collect_one_heredoc_body(&delimiter, strip_tabs)?;
            self.pending_heredocs[i].body = Some(body);
        }
        Ok(())
    }

    fn collect_one_heredoc_body(&mut self, delimiter: &str, strip_tabs: bool) -> Result<String> {
        let mut body = String::new();
        loop {
            if self.at_end() {
                return Err(self.error_here(LexError::UnterminatedHereDocument {
                    delimiter: delimiter.to_string(),
                }));
            }
            let line_start = self.pos;
            while !matches!(self.peek(), None | Some('\n')) {
                self.advance();
            }
            let raw_line = self.code_value_range(line_start, self.pos);
            let had_newline = self.eat('\n');
            let content: &str = if strip_tabs {
                raw_line.trim_start_matches('\t')
            } else {
                raw_line.as_str()
            };
            if content == delimiter {
                return Ok(body);
            }
            if !had_newline {
                return Err(self.error_here(LexError::UnterminatedHereDocument {
                    delimiter: delimiter.to_string(),
                }));
            }
            body.push_str(content);
            body.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    #[test]
    fn collects_body_up_to_delimiter() {
        let mut lexer = Lexer::new(Source::Unknown, "line one\nline two\nEOF\nnext");
        lexer.queue_heredoc("EOF".into(), false, false);
        lexer.collect_pending_heredocs().unwrap();
        let docs = lexer.take_heredocs();
        assert_eq!(docs[0].body.as_deref(), Some("line one\nline two\n"));
        assert_eq!(lexer.rest(), "next");
    }

    #[test]
    fn dash_variant_strips_leading_tabs() {
        let mut lexer = Lexer::new(Source::Unknown, "\tindented\n\tEOF\n");
        lexer.queue_heredoc("EOF".into(), false, true);
        lexer.collect_pending_heredocs().unwrap();
        let docs = lexer.take_heredocs();
        assert_eq!(docs[0].body.as_deref(), Some("indented\n"));
    }

    #[test]
    fn missing_delimiter_is_an_error() {
        let mut lexer = Lexer::new(Source::Unknown, "body with no terminator\n");
        lexer.queue_heredoc("EOF".into(), false, false);
        let err = lexer.collect_pending_heredocs().unwrap_err();
        assert_eq!(
            err.cause,
            LexError::UnterminatedHereDocument {
                delimiter: "EOF".into()
            }
        );
    }
}
