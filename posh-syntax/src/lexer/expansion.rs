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

//! `$`/backquote sub-lexing.
//!
//! The lexer does not interpret the inside of `${...}`, `$(...)` or
//! `$((...))`: it only finds the matching close, tracking nested
//! parentheses/braces and quotes so an embedded `}`/`)` inside a literal or
//! quoted string doesn't end the expansion early. The raw body text is
//! handed to the expander verbatim (spec.md §4.1, §4.2).

use super::{part, Lexer, Mode, Result};
use crate::lexer::error::LexError;
use crate::token::{Part, PartKind, Quoting};

fn is_special_parameter(c: char) -> bool {
    matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!')
}

impl Lexer {
    /// Called with the lexer positioned at an unconsumed `$`. Returns the
    /// resulting part, or `None` if `$` was immediately followed by
    /// nothing expandable (a trailing lone `$`, kept as a literal).
    pub(crate) fn scan_dollar(&mut self, quoting: Quoting) -> Result<Option<Part>> {
        let start = self.pos;
        self.advance();

        match (self.peek(), self.peek2()) {
            (Some('('), Some('(')) => {
                self.advance();
                self.advance();
                self.modes.push(Mode::ArithExp);
                let body = self.scan_arithmetic_body();
                self.modes.pop();
                let body = body?;
                Ok(Some(part(
                    PartKind::Arithmetic { body },
                    quoting,
                    self.location_from(start),
                )))
            }
            (Some('('), _) => {
                self.advance();
                self.modes.push(Mode::CmdSubstParen);
                let body = self.scan_paren_balanced_body();
                self.modes.pop();
                let body = body?;
                Ok(Some(part(
                    PartKind::CommandSubstitution {
                        body,
                        backquoted: false,
                    },
                    quoting,
                    self.location_from(start),
                )))
            }
            (Some('{'), _) => {
                self.advance();
                self.modes.push(Mode::ParamExpBraced);
                let body = self.scan_balanced_braces();
                self.modes.pop();
                let body = body?;
                Ok(Some(part(
                    PartKind::Parameter { body, braced: true },
                    quoting,
                    self.location_from(start),
                )))
            }
            (Some(c), _) if is_special_parameter(c) || c.is_ascii_digit() => {
                self.advance();
                Ok(Some(part(
                    PartKind::Parameter {
                        body: c.to_string(),
                        braced: false,
                    },
                    quoting,
                    self.location_from(start),
                )))
            }
            (Some(c), _) if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while let Some(nc) = self.peek() {
                    if nc == '_' || nc.is_ascii_alphanumeric() {
                        name.push(nc);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Ok(Some(part(
                    PartKind::Parameter {
                        body: name,
                        braced: false,
                    },
                    quoting,
                    self.location_from(start),
                )))
            }
            _ => Ok(Some(part(
                PartKind::Literal("$".into()),
                quoting,
                self.location_from(start),
            ))),
        }
    }

    /// Scans the body of `${...}` after the opening brace, consuming the
    /// closing brace. Tracks nested braces and quoted text.
    fn scan_balanced_braces(&mut self) -> Result<String> {
        let start = self.pos;
        let mut depth = 1u32;
        loop {
            match self.peek() {
                None => return Err(self.error_here(LexError::UnterminatedParameterExpansion)),
                Some('{') => {
                    depth += 1;
                    self.advance();
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        let body = self.rest_before(start);
                        self.advance();
                        return Ok(body);
                    }
                    self.advance();
                }
                Some('\'') => self.skip_quoted_in_body('\'', LexError::UnterminatedParameterExpansion)?,
                Some('"') => self.skip_quoted_in_body('"', LexError::UnterminatedParameterExpansion)?,
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scans the body of `$(...)` after the opening paren, consuming the
    /// closing paren.
    fn scan_paren_balanced_body(&mut self) -> Result<String> {
        let start = self.pos;
        let mut depth = 1u32;
        loop {
            match self.peek() {
                None => return Err(self.error_here(LexError::UnterminatedCommandSubstitution)),
                Some('(') => {
                    depth += 1;
                    self.advance();
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        let body = self.rest_before(start);
                        self.advance();
                        return Ok(body);
                    }
                    self.advance();
                }
                Some('\'') => self.skip_quoted_in_body('\'', LexError::UnterminatedCommandSubstitution)?,
                Some('"') => self.skip_quoted_in_body('"', LexError::UnterminatedCommandSubstitution)?,
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scans the body of `$((...))` after the opening `((`, consuming the
    /// closing `))`. Nested, unmatched single parens inside the expression
    /// (e.g. `$(( (1) ))`) are tracked so the first `)` doesn't end it.
    fn scan_arithmetic_body(&mut self) -> Result<String> {
        let start = self.pos;
        let mut depth = 0u32;
        loop {
            match self.peek() {
                None => return Err(self.error_here(LexError::UnterminatedArithmeticExpansion)),
                Some('(') => {
                    depth += 1;
                    self.advance();
                }
                Some(')') => {
                    if depth == 0 && self.peek2() == Some(')') {
                        let body = self.rest_before(start);
                        self.advance();
                        self.advance();
                        return Ok(body);
                    }
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scans the body of a backquoted command substitution after the
    /// opening backtick, consuming the closing one. `\` `` ` `` ``, `\$`
    /// and `\\` are unescaped one level per POSIX; any other backslash is
    /// kept literally for the expander to see.
    pub(crate) fn scan_backtick_body(&mut self) -> Result<String> {
        let mut body = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_here(LexError::UnterminatedCommandSubstitution)),
                Some('`') => {
                    self.advance();
                    return Ok(body);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c @ ('`' | '$' | '\\')) => {
                            body.push(c);
                            self.advance();
                        }
                        Some(c) => {
                            body.push('\\');
                            body.push(c);
                            self.advance();
                        }
                        None => return Err(self.error_here(LexError::UnterminatedCommandSubstitution)),
                    }
                }
                Some(c) => {
                    body.push(c);
                    self.advance();
                }
            }
        }
    }

    fn rest_before(&self, start: usize) -> String {
        self.code_value_range(start, self.pos)
    }

    fn skip_quoted_in_body(&mut self, quote: char, on_eof: LexError) -> Result<()> {
        self.advance();
        loop {
            match self.peek() {
                None => return Err(self.error_here(on_eof)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(());
                }
                Some('\\') if quote == '"' => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
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
    use crate::token::PartKind;

    #[test]
    fn command_substitution_balances_nested_parens() {
        let mut lexer = Lexer::new(Source::Unknown, "$(echo (x))");
        let p = lexer.scan_dollar(Quoting::UNQUOTED).unwrap().unwrap();
        assert!(matches!(p.kind, PartKind::CommandSubstitution { ref body, backquoted: false } if body == "echo (x)"));
    }

    #[test]
    fn arithmetic_expansion_captures_body() {
        let mut lexer = Lexer::new(Source::Unknown, "$((1 + 2))");
        let p = lexer.scan_dollar(Quoting::UNQUOTED).unwrap().unwrap();
        assert!(matches!(p.kind, PartKind::Arithmetic { ref body } if body == "1 + 2"));
    }

    #[test]
    fn braced_parameter_expansion_allows_quoted_close_brace() {
        let mut lexer = Lexer::new(Source::Unknown, r#"${x:-"}"}"#);
        let p = lexer.scan_dollar(Quoting::UNQUOTED).unwrap().unwrap();
        assert!(matches!(p.kind, PartKind::Parameter { ref body, braced: true } if body == r#"x:-"}""#));
    }
}
