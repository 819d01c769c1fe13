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

//! Word-part scanning: the main driver that turns a run of characters into
//! [`Part`]s, plus single/double-quote handling (spec.md §4.1).

use super::operator;
use super::{part, Error, Lexer, Mode, Result, WordContext};
use crate::lexer::error::LexError;
use crate::token::{Part, PartKind, Quoting};

impl Lexer {
    pub(crate) fn error_here(&self, cause: LexError) -> Error {
        Error {
            cause,
            location: self.location_here(),
        }
    }

    fn flush_literal(
        &self,
        parts: &mut Vec<Part>,
        literal: &mut String,
        start: usize,
        quoting: Quoting,
    ) {
        if !literal.is_empty() {
            parts.push(part(
                PartKind::Literal(std::mem::take(literal)),
                quoting,
                self.location_from(start),
            ));
        }
    }

    /// Scans the parts of a word (or a double-quoted/braced/backquoted
    /// sub-region when `ctx` is not `Normal`), stopping before the
    /// character that ends it without consuming it — except for the
    /// terminator of `DoubleQuoted`, which this function consumes itself
    /// since it owns both ends of that sub-region.
    pub(crate) fn scan_word_parts(&mut self, ctx: WordContext) -> Result<Vec<Part>> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut literal_start = self.pos;
        let base_quoting = match ctx {
            WordContext::DoubleQuoted => Quoting::DOUBLE,
            _ => Quoting::UNQUOTED,
        };

        loop {
            let Some(c) = self.peek() else {
                return match ctx {
                    WordContext::Normal => {
                        self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                        Ok(parts)
                    }
                    WordContext::DoubleQuoted => Err(self.error_here(LexError::UnterminatedDoubleQuote)),
                    WordContext::ParamExpBraced => {
                        Err(self.error_here(LexError::UnterminatedParameterExpansion))
                    }
                    WordContext::Backtick => {
                        Err(self.error_here(LexError::UnterminatedCommandSubstitution))
                    }
                };
            };

            match ctx {
                WordContext::Normal => {
                    if c.is_whitespace() || operator::starts_operator(c) {
                        break;
                    }
                }
                WordContext::DoubleQuoted => {
                    if c == '"' {
                        self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                        self.advance();
                        return Ok(parts);
                    }
                }
                WordContext::ParamExpBraced => {
                    if c == '}' {
                        break;
                    }
                }
                WordContext::Backtick => {
                    if c == '`' {
                        break;
                    }
                }
            }

            if c == '\\' {
                let escapable = match ctx {
                    WordContext::DoubleQuoted => matches!(
                        self.peek2(),
                        Some('$') | Some('`') | Some('"') | Some('\\') | Some('\n')
                    ),
                    _ => self.peek2().is_some(),
                };
                if escapable {
                    if literal.is_empty() {
                        literal_start = self.pos;
                    }
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        if escaped != '\n' {
                            literal.push(escaped);
                        }
                    }
                    continue;
                }
            }

            if c == '\'' && ctx != WordContext::DoubleQuoted {
                self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                let start = self.pos;
                self.advance();
                let text = self.scan_single_quoted_body()?;
                parts.push(part(
                    PartKind::Literal(text),
                    Quoting::SINGLE,
                    self.location_from(start),
                ));
                literal_start = self.pos;
                continue;
            }

            if c == '"' && ctx != WordContext::DoubleQuoted {
                self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                self.advance();
                self.modes.push(Mode::DoubleQuoted);
                let inner = self.scan_word_parts(WordContext::DoubleQuoted)?;
                self.modes.pop();
                parts.extend(inner);
                literal_start = self.pos;
                continue;
            }

            if c == '$' {
                self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                if let Some(p) = self.scan_dollar(base_quoting)? {
                    parts.push(p);
                }
                literal_start = self.pos;
                continue;
            }

            if c == '`' && ctx != WordContext::Backtick {
                self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
                let start = self.pos;
                self.advance();
                let body = self.scan_backtick_body()?;
                parts.push(part(
                    PartKind::CommandSubstitution {
                        body,
                        backquoted: true,
                    },
                    base_quoting,
                    self.location_from(start),
                ));
                literal_start = self.pos;
                continue;
            }

            if c == '~' && literal.is_empty() && parts.is_empty() && ctx != WordContext::DoubleQuoted {
                let start = self.pos;
                self.advance();
                let mut name = String::new();
                while let Some(nc) = self.peek() {
                    if nc == '/' || nc.is_whitespace() || nc == ':' || operator::starts_operator(nc) {
                        break;
                    }
                    name.push(nc);
                    self.advance();
                }
                parts.push(part(
                    PartKind::Tilde { body: name },
                    base_quoting,
                    self.location_from(start),
                ));
                literal_start = self.pos;
                continue;
            }

            if literal.is_empty() {
                literal_start = self.pos;
            }
            literal.push(c);
            self.advance();
        }

        self.flush_literal(&mut parts, &mut literal, literal_start, base_quoting);
        Ok(parts)
    }

    /// Scans a single-quoted body after the opening `'` has been consumed.
    /// No character is special inside single quotes but the closing `'`
    /// itself (spec.md §4.1).
    fn scan_single_quoted_body(&mut self) -> Result<String> {
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_here(LexError::UnterminatedSingleQuote)),
                Some('\'') => {
                    self.advance();
                    return Ok(s);
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    #[test]
    fn double_quoted_word_keeps_parameter_part() {
        let mut lexer = Lexer::new(Source::Unknown, "\"a$b c\"");
        let parts = lexer.scan_word_parts(WordContext::Normal).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0].kind, PartKind::Literal(ref s) if s == "a"));
        assert!(matches!(parts[1].kind, PartKind::Parameter { ref body, braced: false } if body == "b"));
        assert!(matches!(parts[2].kind, PartKind::Literal(ref s) if s == " c"));
        assert!(parts[0].quoting.was_double_quoted);
    }

    #[test]
    fn unterminated_single_quote_errors() {
        let mut lexer = Lexer::new(Source::Unknown, "'abc");
        let err = lexer.scan_word_parts(WordContext::Normal).unwrap_err();
        assert_eq!(err.cause, LexError::UnterminatedSingleQuote);
    }

    #[test]
    fn tilde_prefix_only_recognized_at_word_start() {
        let mut lexer = Lexer::new(Source::Unknown, "~foo/bar");
        let parts = lexer.scan_word_parts(WordContext::Normal).unwrap();
        assert!(matches!(parts[0].kind, PartKind::Tilde { ref body } if body == "foo"));
        assert!(matches!(parts[1].kind, PartKind::Literal(ref s) if s == "/bar"));
    }
}
